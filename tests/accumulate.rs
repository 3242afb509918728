use sgemm_lab::utils::{random_vec, seeded_rng, verify, zeros};
use sgemm_lab::{
    matmul_reference, EdgePolicy, Kernel, KernelConfig, PackedConfig, DEFAULT_TOLERANCE,
};

fn check_accumulates(config: &KernelConfig, m: usize, n: usize, p: usize, tolerance: f32) {
    let mut rng = seeded_rng(31);
    let a = random_vec(m * n, &mut rng);
    let b = random_vec(n * p, &mut rng);
    let prior = random_vec(m * p, &mut rng);

    let mut product = zeros(m * p);
    matmul_reference(&a, &b, &mut product, m, n, p);
    let expected: Vec<f32> = product.iter().zip(&prior).map(|(x, y)| x + y).collect();

    for kernel in Kernel::ALL {
        let mut c = prior.clone();
        kernel.multiply_with(config, &a, &b, &mut c, m, n, p);
        if kernel.accumulates() {
            assert!(
                verify(&expected, &c, tolerance),
                "{kernel} did not add into C for {m}x{n}x{p}"
            );
        } else {
            assert!(
                verify(&product, &c, tolerance),
                "{kernel} did not overwrite C"
            );
        }
    }
}

#[test]
fn test_accumulate_direct_paths() {
    check_accumulates(&KernelConfig::default(), 16, 16, 16, DEFAULT_TOLERANCE);
    check_accumulates(&KernelConfig::default(), 11, 6, 13, DEFAULT_TOLERANCE);
}

#[test]
fn test_accumulate_padded_and_fallback_paths() {
    // Strassen pads 67 to 68 with a threshold of 32 and recurses twice.
    let mut config = KernelConfig::default();
    config.strassen.threshold = 32;
    check_accumulates(&config, 67, 67, 67, 1e-3);

    // Packed and Strassen both hand these shapes to the reference kernel.
    let config = KernelConfig {
        packed: PackedConfig {
            edge: EdgePolicy::Fallback,
        },
        ..Default::default()
    };
    check_accumulates(&config, 7, 9, 5, DEFAULT_TOLERANCE);
}
