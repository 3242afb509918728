//! Strassen's seven-product recursion.
//!
//! Each level splits `A`, `B` and `C` into quadrants (views, no copies) and
//! forms seven half-size products instead of eight:
//!
//! ```text
//! M1 = (A11 + A22)(B11 + B22)     C11 += M1 + M4 - M5 + M7
//! M2 = (A21 + A22) B11            C12 += M3 + M5
//! M3 = A11 (B12 - B22)            C21 += M2 + M4
//! M4 = A22 (B21 - B11)            C22 += M1 - M2 + M3 + M6
//! M5 = (A11 + A12) B22
//! M6 = (A21 - A11)(B11 + B12)
//! M7 = (A12 - A22)(B21 + B22)
//! ```
//!
//! Recursion stops once the side is at or below the threshold, where a plain
//! i-k-j loop takes over. Operand sums and the `M` products live in freshly
//! allocated buffers that are dropped as soon as the level returns.

use log::{debug, warn};

use super::reference::reference_accumulate;
use super::{assert_shapes, FallbackReason, Plan};
use crate::config::{SizePolicy, StrassenConfig};
use crate::matrix::{MatView, MatViewMut, Matrix};

/// Accumulates `C += A * B` for square operands using the default threshold.
/// Sides that do not halve evenly are zero-padded; non-square shapes run on
/// the reference kernel.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_strassen(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    matmul_strassen_with(&StrassenConfig::default(), a, b, c, m, n, p);
}

/// [`matmul_strassen`] with an explicit threshold and size policy.
pub fn matmul_strassen_with(
    config: &StrassenConfig,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    m: usize,
    n: usize,
    p: usize,
) {
    assert_shapes(a, b, c, m, n, p);
    let threshold = config.threshold.max(1);

    match plan(config, m, n, p) {
        Plan::Fallback(reason) => {
            warn!("strassen: {reason}, using reference kernel");
            reference_accumulate(a, b, c, m, n, p);
        }
        Plan::Direct => {
            let mut out = MatViewMut::new(c, m, m);
            strassen_into(MatView::new(a, m, m), MatView::new(b, m, m), &mut out, threshold);
        }
        Plan::Padded { side } => {
            debug!("strassen: padding {m}x{m} to {side}x{side}");
            let a_padded = Matrix::padded_from(MatView::new(a, m, m), side);
            let b_padded = Matrix::padded_from(MatView::new(b, m, m), side);
            let mut c_padded = Matrix::zeros(side, side);
            strassen_into(
                a_padded.view(),
                b_padded.view(),
                &mut c_padded.view_mut(),
                threshold,
            );
            MatViewMut::new(c, m, m).add_assign(c_padded.view().sub(0, 0, m, m));
        }
    }
}

/// How Strassen will run `m x n x p` under `config`.
pub fn plan(config: &StrassenConfig, m: usize, n: usize, p: usize) -> Plan {
    if m != n || n != p {
        return Plan::Fallback(FallbackReason::NotSquare { m, n, p });
    }
    let side = m;

    match config.size_policy {
        SizePolicy::RequirePowerOfTwo => {
            if side == 0 || side.is_power_of_two() {
                Plan::Direct
            } else {
                Plan::Fallback(FallbackReason::NotPowerOfTwo { side })
            }
        }
        SizePolicy::Pad => match padded_side(side, config.threshold.max(1)) {
            padded if padded == side => Plan::Direct,
            padded => Plan::Padded { side: padded },
        },
    }
}

/// Smallest side `>= side` that halves evenly at every level until it is at
/// or below `threshold`.
///
/// Halving `side` with rounding up `L` times reaches a base size `s0`; the
/// answer is `s0 << L`. This pads far less than rounding up to a power of
/// two, e.g. 100 with threshold 16 becomes 104 rather than 128.
pub fn padded_side(side: usize, threshold: usize) -> usize {
    let threshold = threshold.max(1);
    let mut chunk = side;
    let mut levels = 0;
    while chunk > threshold {
        chunk = chunk.div_ceil(2);
        levels += 1;
    }
    chunk << levels
}

fn strassen_into(a: MatView<'_>, b: MatView<'_>, c: &mut MatViewMut<'_>, threshold: usize) {
    let side = a.rows();
    // Odd sides above the threshold never reach here through `plan`.
    if side <= threshold || side % 2 != 0 {
        multiply_views(a, b, c);
        return;
    }

    let [a11, a12, a21, a22] = a.quadrants();
    let [b11, b12, b21, b22] = b.quadrants();
    let half = side / 2;

    let m1 = product(
        Matrix::sum_of(a11, a22).view(),
        Matrix::sum_of(b11, b22).view(),
        threshold,
    );
    let m2 = product(Matrix::sum_of(a21, a22).view(), b11, threshold);
    let m3 = product(a11, Matrix::difference_of(b12, b22).view(), threshold);
    let m4 = product(a22, Matrix::difference_of(b21, b11).view(), threshold);
    let m5 = product(Matrix::sum_of(a11, a12).view(), b22, threshold);
    let m6 = product(
        Matrix::difference_of(a21, a11).view(),
        Matrix::sum_of(b11, b12).view(),
        threshold,
    );
    let m7 = product(
        Matrix::difference_of(a12, a22).view(),
        Matrix::sum_of(b21, b22).view(),
        threshold,
    );

    c.sub_mut(0, 0, half, half)
        .add_combination(&[(1.0, &m1), (1.0, &m4), (-1.0, &m5), (1.0, &m7)]);
    c.sub_mut(0, half, half, half)
        .add_combination(&[(1.0, &m3), (1.0, &m5)]);
    c.sub_mut(half, 0, half, half)
        .add_combination(&[(1.0, &m2), (1.0, &m4)]);
    c.sub_mut(half, half, half, half)
        .add_combination(&[(1.0, &m1), (-1.0, &m2), (1.0, &m3), (1.0, &m6)]);
}

fn product(x: MatView<'_>, y: MatView<'_>, threshold: usize) -> Matrix {
    let mut out = Matrix::zeros(x.rows(), y.cols());
    strassen_into(x, y, &mut out.view_mut(), threshold);
    out
}

/// Base case: i-k-j accumulation over strided views.
fn multiply_views(a: MatView<'_>, b: MatView<'_>, c: &mut MatViewMut<'_>) {
    for i in 0..a.rows() {
        let c_row = c.row_mut(i);
        for (k, &a_ik) in a.row(i).iter().enumerate() {
            for (c_ij, &b_kj) in c_row.iter_mut().zip(b.row(k)) {
                *c_ij += a_ik * b_kj;
            }
        }
    }
}
