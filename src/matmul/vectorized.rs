//! i-k-j multiply with the inner loop done eight columns at a time.
//!
//! For each `A[i][k]` the scalar is broadcast once, then every full group of
//! eight in row `k` of `B` is fused-multiply-added into row `i` of `C`.
//! Columns past the last full group are finished with scalar code.

use log::debug;

use super::assert_shapes;
use crate::simd::{portable, Backend, SimdVec};

/// Accumulates `C += A * B` using 8-lane FMA on the widest backend the CPU
/// supports.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_vectorized(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    assert_shapes(a, b, c, m, n, p);

    let backend = Backend::detect();
    debug!("vectorized kernel on {backend} backend for {m}x{n}x{p}");

    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        // SAFETY: `detect` only reports AVX2+FMA when the CPU has both.
        Backend::Avx2Fma => unsafe { vectorized_avx2(a, b, c, m, n, p) },
        // SAFETY: the portable vector has no CPU requirements, and shapes
        // were checked above.
        _ => unsafe { vectorized_body::<portable::F32x8>(a, b, c, m, n, p) },
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2,fma")]
unsafe fn vectorized_avx2(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    vectorized_body::<crate::simd::avx2::f32x8::F32x8>(a, b, c, m, n, p)
}

/// # Safety
///
/// The CPU must support `V`'s instruction set. Buffer lengths must already
/// have been checked against `m`, `n`, `p`.
#[inline(always)]
unsafe fn vectorized_body<V: SimdVec>(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
) {
    let full = p - p % V::LANES;

    for i in 0..m {
        let a_row = &a[i * n..(i + 1) * n];
        let c_row = &mut c[i * p..(i + 1) * p];

        for (k, &a_ik) in a_row.iter().enumerate() {
            let b_row = &b[k * p..(k + 1) * p];
            let a_vec = V::splat(a_ik);

            for j in (0..full).step_by(V::LANES) {
                let acc = V::load(c_row.as_ptr().add(j));
                let b_vec = V::load(b_row.as_ptr().add(j));
                acc.fmadd(a_vec, b_vec).store_at(c_row.as_mut_ptr().add(j));
            }

            for j in full..p {
                c_row[j] += a_ik * b_row[j];
            }
        }
    }
}
