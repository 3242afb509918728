//! Timing and verification driver behind the `sgemm-lab` binary.
//!
//! For each problem size the harness generates seeded inputs, computes the
//! reference result once (small sizes only), then times every kernel on a
//! freshly zeroed output and reports the best time, GFLOPS and whether the
//! result matches the reference.

use std::fmt;
use std::time::Instant;

use log::debug;

use crate::config::KernelConfig;
use crate::error::{config_error, element_count, Result};
use crate::matmul::{check_shapes, reference::matmul_reference, Kernel, Plan};
use crate::simd::Backend;
use crate::utils::{max_abs_diff, random_vec, seeded_rng, verify, zeros};
use crate::{DEFAULT_SEED, DEFAULT_TOLERANCE};

/// Problem sizes `(m, n, p)` run when none are given.
pub const DEFAULT_SIZES: [(usize, usize, usize); 4] = [
    (128, 128, 128),
    (256, 256, 256),
    (512, 512, 512),
    (1024, 1024, 1024),
];

/// Largest dimension for which the reference result is computed.
pub const VERIFY_LIMIT: usize = 512;

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub sizes: Vec<(usize, usize, usize)>,
    /// Timed runs per kernel; the minimum is reported.
    pub iterations: usize,
    pub seed: u64,
    pub tolerance: f32,
    /// Sizes with any dimension above this are timed but not verified.
    pub verify_limit: usize,
    pub kernel: KernelConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            sizes: DEFAULT_SIZES.to_vec(),
            iterations: 3,
            seed: DEFAULT_SEED,
            tolerance: DEFAULT_TOLERANCE,
            verify_limit: VERIFY_LIMIT,
            kernel: KernelConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(config_error("iterations must be at least 1"));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(config_error(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        self.kernel.validate()
    }
}

/// Outcome of comparing a kernel's output with the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Status {
    Pass,
    Fail { max_diff: f32 },
    /// The size was above the verification limit.
    Unverified,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => f.write_str("PASS"),
            Status::Fail { max_diff } => write!(f, "FAIL (max diff {max_diff:.3e})"),
            Status::Unverified => f.write_str("N/A"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct KernelResult {
    pub kernel: Kernel,
    pub plan: Plan,
    /// Fastest of the timed runs.
    pub seconds: f64,
    pub gflops: f64,
    pub status: Status,
}

#[derive(Clone, Debug)]
pub struct SizeReport {
    pub m: usize,
    pub n: usize,
    pub p: usize,
    pub backend: Backend,
    pub results: Vec<KernelResult>,
}

impl SizeReport {
    /// True unless some kernel was verified and failed.
    pub fn all_passed(&self) -> bool {
        self.results
            .iter()
            .all(|r| !matches!(r.status, Status::Fail { .. }))
    }
}

/// Runs every kernel on every configured size.
pub fn run_comparison(config: &BenchConfig) -> Result<Vec<SizeReport>> {
    config.validate()?;
    config
        .sizes
        .iter()
        .map(|&(m, n, p)| run_size(config, m, n, p))
        .collect()
}

/// Runs every kernel on one `m x n x p` problem.
pub fn run_size(config: &BenchConfig, m: usize, n: usize, p: usize) -> Result<SizeReport> {
    let mut rng = seeded_rng(config.seed);
    let a = random_vec(element_count(m, n)?, &mut rng);
    let b = random_vec(element_count(n, p)?, &mut rng);
    let mut c = zeros(element_count(m, p)?);
    check_shapes(&a, &b, &c, m, n, p)?;

    let reference = if m.max(n).max(p) <= config.verify_limit {
        let mut expected = zeros(m * p);
        matmul_reference(&a, &b, &mut expected, m, n, p);
        Some(expected)
    } else {
        debug!("{m}x{n}x{p} is above the verification limit, skipping reference");
        None
    };

    let flops = 2.0 * m as f64 * n as f64 * p as f64;
    let mut results = Vec::with_capacity(Kernel::ALL.len());

    for kernel in Kernel::ALL {
        if config.iterations > 1 {
            c.fill(0.0);
            kernel.multiply_with(&config.kernel, &a, &b, &mut c, m, n, p);
        }

        let mut best = f64::INFINITY;
        for _ in 0..config.iterations {
            c.fill(0.0);
            let start = Instant::now();
            kernel.multiply_with(&config.kernel, &a, &b, &mut c, m, n, p);
            best = best.min(start.elapsed().as_secs_f64());
        }

        let gflops = if flops == 0.0 { 0.0 } else { flops / best / 1e9 };
        let status = match &reference {
            Some(expected) if verify(expected, &c, config.tolerance) => Status::Pass,
            Some(expected) => Status::Fail {
                max_diff: max_abs_diff(expected, &c).unwrap_or(f32::NAN),
            },
            None => Status::Unverified,
        };
        debug!("{m}x{n}x{p} {kernel}: {best:.6}s, {status}");

        results.push(KernelResult {
            kernel,
            plan: kernel.plan_with(&config.kernel, m, n, p),
            seconds: best,
            gflops,
            status,
        });
    }

    Ok(SizeReport {
        m,
        n,
        p,
        backend: Backend::detect(),
        results,
    })
}

/// Formats one report as a fixed-width table.
pub fn render_table(report: &SizeReport) -> String {
    let mut lines = vec![
        format!(
            "Matrix size: {}x{} * {}x{} (SIMD: {})",
            report.m, report.n, report.n, report.p, report.backend
        ),
        format!(
            "{:<25}{:<15}{:<15}{:<28}Plan",
            "Method", "Time (s)", "GFLOPS", "Status"
        ),
        "-".repeat(90),
    ];
    lines.extend(report.results.iter().map(|result| {
        format!(
            "{:<25}{:<15.4}{:<15.2}{:<28}{}",
            result.kernel.name(),
            result.seconds,
            result.gflops,
            result.status.to_string(),
            result.plan
        )
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matmul::FallbackReason;

    fn small_config(sizes: Vec<(usize, usize, usize)>) -> BenchConfig {
        BenchConfig {
            sizes,
            iterations: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_every_kernel_passes() {
        let reports = run_comparison(&small_config(vec![(16, 16, 16), (5, 9, 3)])).unwrap();
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.results.len(), Kernel::ALL.len());
            assert!(report.all_passed());
            for result in &report.results {
                assert_eq!(result.status, Status::Pass, "{}", result.kernel);
                assert!(result.seconds >= 0.0);
            }
        }

        let strassen = &reports[1].results[7];
        assert_eq!(strassen.kernel, Kernel::Strassen);
        assert_eq!(
            strassen.plan,
            Plan::Fallback(FallbackReason::NotSquare { m: 5, n: 9, p: 3 })
        );
    }

    #[test]
    fn test_large_sizes_are_unverified() {
        let config = BenchConfig {
            verify_limit: 4,
            ..small_config(vec![(8, 8, 8)])
        };
        let reports = run_comparison(&config).unwrap();
        assert!(reports[0]
            .results
            .iter()
            .all(|r| r.status == Status::Unverified));
    }

    #[test]
    fn test_invalid_config() {
        let config = BenchConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(run_comparison(&config).is_err());

        let config = BenchConfig {
            tolerance: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_render_table() {
        let reports = run_comparison(&small_config(vec![(8, 8, 8)])).unwrap();
        let table = render_table(&reports[0]);
        assert!(table.starts_with("Matrix size: 8x8 * 8x8"));
        for kernel in Kernel::ALL {
            assert!(table.contains(kernel.name()), "missing {kernel}");
        }
        assert_eq!(table.matches("PASS").count(), Kernel::ALL.len());

        // Title, header, rule, then one row per kernel.
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3 + Kernel::ALL.len());
        assert!(lines[1].starts_with("Method"));
        assert!(lines[2].chars().all(|ch| ch == '-'));
        assert!(lines[3].starts_with(Kernel::Reference.name()));
        assert!(lines[3].ends_with("direct"));
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Pass.to_string(), "PASS");
        assert_eq!(Status::Unverified.to_string(), "N/A");
        assert!(Status::Fail { max_diff: 0.5 }.to_string().starts_with("FAIL"));
    }
}
