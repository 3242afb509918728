//! Textbook i-j-k multiply. Every other kernel is checked against this one.

use super::assert_shapes;

/// Computes `C = A * B` with one scalar accumulator per output element.
///
/// Unlike the other kernels this *overwrites* `C`, so its previous contents
/// do not matter. Per element, the products are summed in ascending `k`.
///
/// # Panics
///
/// Panics if the buffer lengths do not match `m`, `n`, `p`.
pub fn matmul_reference(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    assert_shapes(a, b, c, m, n, p);
    for i in 0..m {
        for j in 0..p {
            c[i * p + j] = dot_column(a, b, i, j, n, p);
        }
    }
}

/// Like [`matmul_reference`] but adds into `C`.
///
/// This is what kernels substitute when they cannot handle a shape, so the
/// accumulate contract holds on every path.
pub fn reference_accumulate(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
    assert_shapes(a, b, c, m, n, p);
    for i in 0..m {
        for j in 0..p {
            c[i * p + j] += dot_column(a, b, i, j, n, p);
        }
    }
}

#[inline(always)]
fn dot_column(a: &[f32], b: &[f32], i: usize, j: usize, n: usize, p: usize) -> f32 {
    let mut sum = 0.0f32;
    for k in 0..n {
        sum += a[i * n + k] * b[k * p + j];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_product() {
        // [1 2 3]   [ 7  8]   [ 58  64]
        // [4 5 6] * [ 9 10] = [139 154]
        //           [11 12]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut c = [f32::NAN; 4];
        matmul_reference(&a, &b, &mut c, 2, 3, 2);
        assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_overwrites_output() {
        let a = [2.0];
        let b = [3.0];
        let mut c = [100.0];
        matmul_reference(&a, &b, &mut c, 1, 1, 1);
        assert_eq!(c, [6.0]);
    }

    #[test]
    fn test_accumulate_adds() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        let mut c = [10.0];
        reference_accumulate(&a, &b, &mut c, 1, 2, 1);
        assert_eq!(c, [21.0]);
    }

    #[test]
    fn test_zero_inner_dimension() {
        let mut c = [5.0; 6];
        matmul_reference(&[], &[], &mut c, 2, 0, 3);
        assert_eq!(c, [0.0; 6]);

        let mut c = [5.0; 6];
        reference_accumulate(&[], &[], &mut c, 2, 0, 3);
        assert_eq!(c, [5.0; 6]);
    }
}
