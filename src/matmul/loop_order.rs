//! i-k-j loop order: the innermost loop walks rows of `B` and `C`
//! sequentially instead of striding down a column of `B`.

use super::assert_shapes;

/// Accumulates `C += A * B` in i-k-j order.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_loop_order(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    assert_shapes(a, b, c, m, n, p);
    loop_order_rows(a, b, c, 0, n, p);
}

/// Runs the i-k-j loop over the rows of `C` held in `c_rows`, whose first row
/// is row `first_row` of the full output.
///
/// Shared by the threaded kernels, which hand each worker a disjoint run of
/// output rows.
#[inline]
pub(crate) fn loop_order_rows(
    a: &[f32],
    b: &[f32],
    c_rows: &mut [f32],
    first_row: usize,
    n: usize,
    p: usize,
) {
    if p == 0 {
        return;
    }
    for (local, c_row) in c_rows.chunks_exact_mut(p).enumerate() {
        let i = first_row + local;
        let a_row = &a[i * n..(i + 1) * n];
        for (k, &a_ik) in a_row.iter().enumerate() {
            let b_row = &b[k * p..(k + 1) * p];
            for (c_ij, &b_kj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ik * b_kj;
            }
        }
    }
}
