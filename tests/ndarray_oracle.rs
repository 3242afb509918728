//! Cross-checks against ndarray's matrix product, which shares no code with
//! this crate.

use ndarray::Array2;
use sgemm_lab::utils::{random_vec, seeded_rng, verify, zeros};
use sgemm_lab::{matmul_reference, Kernel};

fn ndarray_product(a: &[f32], b: &[f32], m: usize, n: usize, p: usize) -> Vec<f32> {
    let a = Array2::from_shape_vec((m, n), a.to_vec()).unwrap();
    let b = Array2::from_shape_vec((n, p), b.to_vec()).unwrap();
    a.dot(&b).iter().copied().collect()
}

#[test]
fn test_reference_matches_ndarray() {
    let mut rng = seeded_rng(55);
    for (m, n, p) in [(1, 1, 1), (4, 4, 4), (13, 29, 7), (64, 48, 80)] {
        let a = random_vec(m * n, &mut rng);
        let b = random_vec(n * p, &mut rng);
        let expected = ndarray_product(&a, &b, m, n, p);

        let mut c = zeros(m * p);
        matmul_reference(&a, &b, &mut c, m, n, p);
        assert!(verify(&expected, &c, 1e-4), "{m}x{n}x{p}");
    }
}

#[test]
fn test_all_kernels_match_ndarray() {
    let (m, n, p) = (96, 80, 72);
    let mut rng = seeded_rng(56);
    let a = random_vec(m * n, &mut rng);
    let b = random_vec(n * p, &mut rng);
    let expected = ndarray_product(&a, &b, m, n, p);

    for kernel in Kernel::ALL {
        let mut c = zeros(m * p);
        kernel.multiply(&a, &b, &mut c, m, n, p);
        assert!(verify(&expected, &c, 1e-4), "{kernel}");
    }
}
