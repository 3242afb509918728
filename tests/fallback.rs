use sgemm_lab::utils::{random_vec, seeded_rng, verify, zeros};
use sgemm_lab::{
    matmul_packed, matmul_reference, EdgePolicy, FallbackReason, Kernel, KernelConfig,
    PackedConfig, Plan, SizePolicy, StrassenConfig, DEFAULT_TOLERANCE,
};

fn inputs(m: usize, n: usize, p: usize) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let mut rng = seeded_rng(77);
    let a = random_vec(m * n, &mut rng);
    let b = random_vec(n * p, &mut rng);
    let mut expected = zeros(m * p);
    matmul_reference(&a, &b, &mut expected, m, n, p);
    (a, b, expected)
}

#[test]
fn test_packed_7x7x7_both_policies() {
    let (a, b, expected) = inputs(7, 7, 7);

    let mut c = zeros(49);
    matmul_packed(&a, &b, &mut c, 7, 7, 7);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
    assert_eq!(Kernel::Packed.plan(7, 7, 7), Plan::Direct);

    let config = KernelConfig {
        packed: PackedConfig {
            edge: EdgePolicy::Fallback,
        },
        ..Default::default()
    };
    assert_eq!(
        Kernel::Packed.plan_with(&config, 7, 7, 7),
        Plan::Fallback(FallbackReason::Misaligned { m: 7, n: 7, p: 7 })
    );
    let mut c = zeros(49);
    Kernel::Packed.multiply_with(&config, &a, &b, &mut c, 7, 7, 7);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
}

#[test]
fn test_strassen_6x6_power_of_two_policy() {
    let (a, b, expected) = inputs(6, 6, 6);
    let config = KernelConfig {
        strassen: StrassenConfig {
            threshold: 2,
            size_policy: SizePolicy::RequirePowerOfTwo,
        },
        ..Default::default()
    };

    assert_eq!(
        Kernel::Strassen.plan_with(&config, 6, 6, 6),
        Plan::Fallback(FallbackReason::NotPowerOfTwo { side: 6 })
    );
    let mut c = zeros(36);
    Kernel::Strassen.multiply_with(&config, &a, &b, &mut c, 6, 6, 6);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
}

#[test]
fn test_strassen_6x6_pad_policy() {
    let (a, b, expected) = inputs(6, 6, 6);
    let mut config = KernelConfig::default();
    config.strassen.threshold = 2;

    // 6 -> 3 -> 2: padded to 8.
    assert_eq!(
        Kernel::Strassen.plan_with(&config, 6, 6, 6),
        Plan::Padded { side: 8 }
    );
    let mut c = zeros(36);
    Kernel::Strassen.multiply_with(&config, &a, &b, &mut c, 6, 6, 6);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
}

#[test]
fn test_strassen_8x8_threshold_4() {
    let (a, b, expected) = inputs(8, 8, 8);
    let mut config = KernelConfig::default();
    config.strassen.threshold = 4;

    assert_eq!(Kernel::Strassen.plan_with(&config, 8, 8, 8), Plan::Direct);
    let mut c = zeros(64);
    Kernel::Strassen.multiply_with(&config, &a, &b, &mut c, 8, 8, 8);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
}

#[test]
fn test_strassen_non_square() {
    let (a, b, expected) = inputs(5, 8, 3);
    assert_eq!(
        Kernel::Strassen.plan(5, 8, 3),
        Plan::Fallback(FallbackReason::NotSquare { m: 5, n: 8, p: 3 })
    );
    let mut c = zeros(15);
    Kernel::Strassen.multiply(&a, &b, &mut c, 5, 8, 3);
    assert!(verify(&expected, &c, DEFAULT_TOLERANCE));
}

#[test]
fn test_default_threshold_padding() {
    assert_eq!(Kernel::Strassen.plan(64, 64, 64), Plan::Direct);
    assert_eq!(Kernel::Strassen.plan(70, 70, 70), Plan::Direct);
    assert_eq!(Kernel::Strassen.plan(67, 67, 67), Plan::Padded { side: 68 });

    let (a, b, expected) = inputs(67, 67, 67);
    let mut c = zeros(67 * 67);
    Kernel::Strassen.multiply(&a, &b, &mut c, 67, 67, 67);
    assert!(verify(&expected, &c, 1e-3));
}
