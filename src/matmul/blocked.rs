//! Cache-blocked multiply: the i-k-j loop restricted to `TILE`-sized cubes so
//! the working set of `A`, `B` and `C` tiles stays in L1.

use super::assert_shapes;
use crate::TILE;

/// Largest power-of-two edge `e` such that one `e x e` tile each of `A`, `B`
/// and `C` fits in `bytes` of cache. Never less than 1.
pub const fn tile_edge_for_cache(bytes: usize) -> usize {
    let bytes_per_edge_squared = 3 * std::mem::size_of::<f32>();
    let mut edge: usize = 1;
    loop {
        let next = edge * 2;
        let needed = match next.checked_mul(next) {
            Some(square) => square.checked_mul(bytes_per_edge_squared),
            None => None,
        };
        match needed {
            Some(needed) if needed <= bytes => edge = next,
            _ => return edge,
        }
    }
}

/// Accumulates `C += A * B` over `TILE x TILE x TILE` blocks.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_blocked(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    matmul_blocked_tiled(a, b, c, m, n, p, TILE);
}

/// [`matmul_blocked`] with an explicit tile edge. Tiles at the matrix edge
/// are clipped to the remaining extent.
///
/// # Panics
///
/// Panics if `tile` is zero or the buffer lengths do not match.
pub fn matmul_blocked_tiled(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
    tile: usize,
) {
    assert!(tile > 0, "tile size must be positive");
    assert_shapes(a, b, c, m, n, p);

    for i0 in (0..m).step_by(tile) {
        let i_end = (i0 + tile).min(m);
        for k0 in (0..n).step_by(tile) {
            let k_end = (k0 + tile).min(n);
            for j0 in (0..p).step_by(tile) {
                let j_end = (j0 + tile).min(p);

                for i in i0..i_end {
                    let c_row = &mut c[i * p + j0..i * p + j_end];
                    for k in k0..k_end {
                        let a_ik = a[i * n + k];
                        let b_row = &b[k * p + j0..k * p + j_end];
                        for (c_ij, &b_kj) in c_row.iter_mut().zip(b_row) {
                            *c_ij += a_ik * b_kj;
                        }
                    }
                }
            }
        }
    }
}
