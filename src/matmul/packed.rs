//! GotoBLAS-style packed GEMM with an 8x8 register micro-kernel.
//!
//! ```text
//! for jc in 0..p step NC                 B panel columns
//!   for pc in 0..n step KC               shared inner block
//!     pack B[pc.., jc..] into KC x 8 slivers
//!     for ic in 0..m step MC             A panel rows
//!       pack A[ic.., pc..] into 8 x KC slivers
//!       for each 8x8 tile of C[ic.., jc..]
//!         micro-kernel: tile += A sliver * B sliver
//! ```
//!
//! Packing copies each sliver into contiguous aligned memory so the
//! micro-kernel reads both operands at unit stride. Partial slivers at the
//! matrix edge are zero-padded to full width; their tiles are computed into a
//! scratch buffer and only the valid region is added to `C`.

use log::{debug, warn};

use super::reference::reference_accumulate;
use super::{assert_shapes, FallbackReason, Plan};
use crate::config::{EdgePolicy, PackedConfig};
use crate::simd::{portable, Backend, SimdVec};
use crate::utils::AlignedVec;
use crate::{KC, MC, MR, NC, NR, PANEL_ALIGNMENT};

/// Accumulates `C += A * B` with packing and the 8x8 micro-kernel. Any shape
/// is accepted; edges are zero-padded.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_packed(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    matmul_packed_with(&PackedConfig::default(), a, b, c, m, n, p);
}

/// [`matmul_packed`] with an explicit edge policy.
///
/// Under [`EdgePolicy::Fallback`], shapes with a dimension that is not a
/// multiple of 8 run on [`reference_accumulate`] instead.
pub fn matmul_packed_with(
    config: &PackedConfig,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
) {
    assert_shapes(a, b, c, m, n, p);

    if let Plan::Fallback(reason) = plan(config, m, n, p) {
        warn!("packed kernel: {reason}, using reference kernel");
        reference_accumulate(a, b, c, m, n, p);
        return;
    }
    if m == 0 || n == 0 || p == 0 {
        return;
    }

    let backend = Backend::detect();
    debug!("packed kernel on {backend} backend for {m}x{n}x{p}");

    match backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        // SAFETY: `detect` only reports AVX2+FMA when the CPU has both.
        Backend::Avx2Fma => unsafe { packed_avx2(a, b, c, m, n, p) },
        // SAFETY: shapes were checked above.
        _ => unsafe { packed_body::<portable::F32x8>(a, b, c, m, n, p) },
    }
}

/// How the packed kernel will run `m x n x p` under `config`.
pub fn plan(config: &PackedConfig, m: usize, n: usize, p: usize) -> Plan {
    match config.edge {
        EdgePolicy::Pad => Plan::Direct,
        EdgePolicy::Fallback if m % MR == 0 && n % MR == 0 && p % NR == 0 => Plan::Direct,
        EdgePolicy::Fallback => Plan::Fallback(FallbackReason::Misaligned { m, n, p }),
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "avx2,fma")]
unsafe fn packed_avx2(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    packed_body::<crate::simd::avx2::f32x8::F32x8>(a, b, c, m, n, p)
}

/// # Safety
///
/// The CPU must support `V`'s instruction set. Buffer lengths must already
/// have been checked against `m`, `n`, `p`, and all three must be non-zero.
#[inline(always)]
unsafe fn packed_body<V: SimdVec>(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
) {
    debug_assert_eq!(V::LANES, NR);

    let kc_max = KC.min(n);
    let mut a_pack = AlignedVec::zeroed(MC.min(m).next_multiple_of(MR) * kc_max, PANEL_ALIGNMENT);
    let mut b_pack = AlignedVec::zeroed(NC.min(p).next_multiple_of(NR) * kc_max, PANEL_ALIGNMENT);

    for jc in (0..p).step_by(NC) {
        let nc = NC.min(p - jc);
        for pc in (0..n).step_by(KC) {
            let kc = KC.min(n - pc);
            pack_b(b, p, pc, jc, kc, nc, &mut b_pack);

            for ic in (0..m).step_by(MC) {
                let mc = MC.min(m - ic);
                pack_a(a, n, ic, pc, mc, kc, &mut a_pack);

                for jr in (0..nc).step_by(NR) {
                    let nr = NR.min(nc - jr);
                    let b_sliver = &b_pack[(jr / NR) * kc * NR..];

                    for ir in (0..mc).step_by(MR) {
                        let mr = MR.min(mc - ir);
                        let a_sliver = &a_pack[(ir / MR) * MR * kc..];
                        let c_offset = (ic + ir) * p + jc + jr;

                        if mr == MR && nr == NR {
                            micro_kernel::<V>(
                                kc,
                                a_sliver.as_ptr(),
                                b_sliver.as_ptr(),
                                c[c_offset..].as_mut_ptr(),
                                p,
                            );
                        } else {
                            let mut tile = [0.0f32; MR * NR];
                            micro_kernel::<V>(
                                kc,
                                a_sliver.as_ptr(),
                                b_sliver.as_ptr(),
                                tile.as_mut_ptr(),
                                NR,
                            );
                            for r in 0..mr {
                                let row = c_offset + r * p;
                                for (dst, src) in c[row..row + nr].iter_mut().zip(&tile[r * NR..]) {
                                    *dst += src;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Copies rows `ic..ic + mc`, columns `pc..pc + kc` of `A` (row stride
/// `lda`) into `MR`-row slivers. Sliver `s` is row-major `MR x kc` and starts
/// at `s * MR * kc`. Rows past `mc` are written as zeros.
pub(crate) fn pack_a(
    a: &[f32],
    lda: usize,
    ic: usize,
    pc: usize,
    mc: usize,
    kc: usize,
    out: &mut [f32],
) {
    let slivers = mc.div_ceil(MR);
    for (s, sliver) in out[..slivers * MR * kc].chunks_exact_mut(MR * kc).enumerate() {
        for (r, dst) in sliver.chunks_exact_mut(kc).enumerate() {
            let row = s * MR + r;
            if row < mc {
                let src = (ic + row) * lda + pc;
                dst.copy_from_slice(&a[src..src + kc]);
            } else {
                dst.fill(0.0);
            }
        }
    }
}

/// Copies rows `pc..pc + kc`, columns `jc..jc + nc` of `B` (row stride
/// `ldb`) into `NR`-column slivers. Sliver `s` is row-major `kc x NR` and
/// starts at `s * kc * NR`. Columns past `nc` are written as zeros.
pub(crate) fn pack_b(
    b: &[f32],
    ldb: usize,
    pc: usize,
    jc: usize,
    kc: usize,
    nc: usize,
    out: &mut [f32],
) {
    let slivers = nc.div_ceil(NR);
    for (s, sliver) in out[..slivers * kc * NR].chunks_exact_mut(kc * NR).enumerate() {
        let cols = NR.min(nc - s * NR);
        for (k, dst) in sliver.chunks_exact_mut(NR).enumerate() {
            let src = (pc + k) * ldb + jc + s * NR;
            dst[..cols].copy_from_slice(&b[src..src + cols]);
            dst[cols..].fill(0.0);
        }
    }
}

/// `C[0..MR, 0..NR] += A_sliver * B_sliver` with the whole tile held in
/// `MR` vector registers.
///
/// # Safety
///
/// * `a` must be readable for `MR * kc` values, `b` for `kc * NR`.
/// * Each of the `MR` rows `c + r * ldc .. c + r * ldc + NR` must be writable.
/// * The CPU must support `V`'s instruction set.
#[inline(always)]
pub(crate) unsafe fn micro_kernel<V: SimdVec>(
    kc: usize,
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    ldc: usize,
) {
    let mut acc = [V::zeros(); MR];
    for (r, row) in acc.iter_mut().enumerate() {
        *row = V::load(c.add(r * ldc));
    }

    for k in 0..kc {
        let b_vec = V::load(b.add(k * NR));
        for (r, row) in acc.iter_mut().enumerate() {
            let a_vec = V::splat(*a.add(r * kc + k));
            *row = row.fmadd(a_vec, b_vec);
        }
    }

    for (r, row) in acc.iter().enumerate() {
        row.store_at(c.add(r * ldc));
    }
}
