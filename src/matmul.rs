//! Matrix multiplication kernels and the common dispatch layer.
//!
//! Every kernel has the shape of [`MultiplyFn`]: operands are borrowed
//! immutably, the output mutably, and nothing is retained after the call.
//! Buffers are row-major: `a` is `m x n`, `b` is `n x p`, `c` is `m x p`.

use std::fmt;

use crate::config::KernelConfig;
use crate::error::{element_count, shape_error, Result};

pub mod blocked;
pub mod dynamic;
pub mod loop_order;
pub mod packed;
pub mod reference;
pub mod strassen;
pub mod threaded;
pub mod vectorized;

/// The signature shared by every kernel: `multiply(a, b, c, m, n, p)`.
pub type MultiplyFn = fn(&[f32], &[f32], &mut [f32], usize, usize, usize);

/// The fixed set of kernel variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// [`reference::matmul_reference`]: i-j-k, overwrites `C`.
    Reference,
    /// [`loop_order::matmul_loop_order`]: i-k-j.
    LoopOrder,
    /// [`blocked::matmul_blocked`]: i-k-j over `TILE`-sized cubes.
    Blocked,
    /// [`vectorized::matmul_vectorized`]: i-k-j with 8-lane FMA.
    Vectorized,
    /// [`threaded::matmul_threaded`]: one scoped thread per row range.
    Threaded,
    /// [`dynamic::matmul_dynamic`]: row chunks on a rayon pool.
    Dynamic,
    /// [`packed::matmul_packed`]: packed panels and an 8x8 micro-kernel.
    Packed,
    /// [`strassen::matmul_strassen`]: seven-product recursion.
    Strassen,
}

impl Kernel {
    pub const ALL: [Kernel; 8] = [
        Kernel::Reference,
        Kernel::LoopOrder,
        Kernel::Blocked,
        Kernel::Vectorized,
        Kernel::Threaded,
        Kernel::Dynamic,
        Kernel::Packed,
        Kernel::Strassen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Reference => "reference (i-j-k)",
            Kernel::LoopOrder => "loop order (i-k-j)",
            Kernel::Blocked => "cache blocked",
            Kernel::Vectorized => "vectorized",
            Kernel::Threaded => "threads (static)",
            Kernel::Dynamic => "rayon (dynamic)",
            Kernel::Packed => "packed 8x8",
            Kernel::Strassen => "strassen",
        }
    }

    /// The kernel's entry point with default configuration.
    pub fn function(self) -> MultiplyFn {
        match self {
            Kernel::Reference => reference::matmul_reference,
            Kernel::LoopOrder => loop_order::matmul_loop_order,
            Kernel::Blocked => blocked::matmul_blocked,
            Kernel::Vectorized => vectorized::matmul_vectorized,
            Kernel::Threaded => threaded::matmul_threaded,
            Kernel::Dynamic => dynamic::matmul_dynamic,
            Kernel::Packed => packed::matmul_packed,
            Kernel::Strassen => strassen::matmul_strassen,
        }
    }

    /// Whether the kernel adds into `C` (caller must zero it) rather than
    /// overwriting it.
    pub fn accumulates(self) -> bool {
        self != Kernel::Reference
    }

    /// What the kernel will do for these dimensions under `config`.
    pub fn plan_with(self, config: &KernelConfig, m: usize, n: usize, p: usize) -> Plan {
        match self {
            Kernel::Packed => packed::plan(&config.packed, m, n, p),
            Kernel::Strassen => strassen::plan(&config.strassen, m, n, p),
            _ => Plan::Direct,
        }
    }

    pub fn plan(self, m: usize, n: usize, p: usize) -> Plan {
        self.plan_with(&KernelConfig::default(), m, n, p)
    }

    /// Runs the kernel with explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the buffer lengths do not match `m`, `n`, `p`.
    pub fn multiply_with(
        self,
        config: &KernelConfig,
        a: &[f32],
        b: &[f32],
        c: &mut [f32],
        m: usize,
        n: usize,
        p: usize,
    ) {
        match self {
            Kernel::Threaded => threaded::matmul_threaded_with(&config.parallel, a, b, c, m, n, p),
            Kernel::Dynamic => dynamic::matmul_dynamic_with(&config.parallel, a, b, c, m, n, p),
            Kernel::Packed => packed::matmul_packed_with(&config.packed, a, b, c, m, n, p),
            Kernel::Strassen => strassen::matmul_strassen_with(&config.strassen, a, b, c, m, n, p),
            other => (other.function())(a, b, c, m, n, p),
        }
    }

    /// Runs the kernel with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the buffer lengths do not match `m`, `n`, `p`.
    pub fn multiply(self, a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, p: usize) {
        (self.function())(a, b, c, m, n, p)
    }

    /// Validates shapes and configuration, then runs the kernel.
    pub fn try_multiply_with(
        self,
        config: &KernelConfig,
        a: &[f32],
        b: &[f32],
        c: &mut [f32],
        m: usize,
        n: usize,
        p: usize,
    ) -> Result<()> {
        check_shapes(a, b, c, m, n, p)?;
        config.validate()?;
        self.multiply_with(config, a, b, c, m, n, p);
        Ok(())
    }

    pub fn try_multiply(
        self,
        a: &[f32],
        b: &[f32],
        c: &mut [f32],
        m: usize,
        n: usize,
        p: usize,
    ) -> Result<()> {
        self.try_multiply_with(&KernelConfig::default(), a, b, c, m, n, p)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `(name, entry point)` for every kernel, in comparison order.
pub fn registry() -> [(&'static str, MultiplyFn); 8] {
    Kernel::ALL.map(|kernel| (kernel.name(), kernel.function()))
}

/// How a kernel will execute a given shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plan {
    /// The kernel's own algorithm runs on the inputs as given.
    Direct,
    /// Inputs are zero-padded to a `side x side` square first.
    Padded { side: usize },
    /// The whole multiply is handed to the reference kernel.
    Fallback(FallbackReason),
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Direct => f.write_str("direct"),
            Plan::Padded { side } => write!(f, "padded to {side}"),
            Plan::Fallback(reason) => write!(f, "fallback: {reason}"),
        }
    }
}

/// Why a kernel substituted the reference kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// Strassen needs `m == n == p`.
    NotSquare { m: usize, n: usize, p: usize },
    /// Strassen under [`SizePolicy::RequirePowerOfTwo`](crate::SizePolicy).
    NotPowerOfTwo { side: usize },
    /// Packed kernel under [`EdgePolicy::Fallback`](crate::EdgePolicy) with a
    /// dimension that is not a multiple of the micro-tile.
    Misaligned { m: usize, n: usize, p: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotSquare { m, n, p } => {
                write!(f, "{m}x{n} * {n}x{p} is not square")
            }
            FallbackReason::NotPowerOfTwo { side } => {
                write!(f, "side {side} is not a power of two")
            }
            FallbackReason::Misaligned { m, n, p } => write!(
                f,
                "dimensions ({m}, {n}, {p}) are not multiples of {}",
                crate::MR
            ),
        }
    }
}

/// Checks that `a`, `b` and `c` have the lengths `m x n`, `n x p`, `m x p`.
pub fn check_shapes(a: &[f32], b: &[f32], c: &[f32], m: usize, n: usize, p: usize) -> Result<()> {
    let expected_a = element_count(m, n)?;
    if a.len() != expected_a {
        return Err(shape_error("A", expected_a, a.len()));
    }
    let expected_b = element_count(n, p)?;
    if b.len() != expected_b {
        return Err(shape_error("B", expected_b, b.len()));
    }
    let expected_c = element_count(m, p)?;
    if c.len() != expected_c {
        return Err(shape_error("C", expected_c, c.len()));
    }
    Ok(())
}

/// Panicking form of [`check_shapes`], used at every kernel entry point.
#[inline]
pub(crate) fn assert_shapes(a: &[f32], b: &[f32], c: &[f32], m: usize, n: usize, p: usize) {
    if let Err(err) = check_shapes(a, b, c, m, n, p) {
        panic!("{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GemmError;

    #[test]
    fn test_check_shapes() {
        let a = vec![0.0; 6];
        let b = vec![0.0; 12];
        let c = vec![0.0; 8];
        assert!(check_shapes(&a, &b, &c, 2, 3, 4).is_ok());
        assert_eq!(
            check_shapes(&a, &b, &c[..7], 2, 3, 4),
            Err(GemmError::ShapeMismatch {
                operand: "C",
                expected: 8,
                actual: 7
            })
        );
        assert!(check_shapes(&a, &b[..11], &c, 2, 3, 4).is_err());
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn test_kernel_rejects_bad_shape() {
        let a = vec![0.0; 6];
        let b = vec![0.0; 12];
        let mut c = vec![0.0; 7];
        Kernel::LoopOrder.multiply(&a, &b, &mut c, 2, 3, 4);
    }

    #[test]
    fn test_try_multiply_reports_error() {
        let a = vec![0.0; 5];
        let b = vec![0.0; 12];
        let mut c = vec![0.0; 8];
        for kernel in Kernel::ALL {
            let result = kernel.try_multiply(&a, &b, &mut c, 2, 3, 4);
            assert!(
                matches!(result, Err(GemmError::ShapeMismatch { operand: "A", .. })),
                "{kernel}: {result:?}"
            );
        }
    }

    #[test]
    fn test_registry_order_and_names() {
        let entries = registry();
        assert_eq!(entries.len(), Kernel::ALL.len());
        for ((name, _), kernel) in entries.iter().zip(Kernel::ALL) {
            assert_eq!(*name, kernel.name());
        }
        assert!(!Kernel::Reference.accumulates());
        assert!(Kernel::Strassen.accumulates());
    }

    #[test]
    fn test_plans() {
        assert_eq!(Kernel::LoopOrder.plan(7, 7, 7), Plan::Direct);
        assert_eq!(Kernel::Packed.plan(7, 7, 7), Plan::Direct);
        assert_eq!(
            Kernel::Strassen.plan(4, 5, 6),
            Plan::Fallback(FallbackReason::NotSquare { m: 4, n: 5, p: 6 })
        );
        assert_eq!(
            format!("{}", Plan::Fallback(FallbackReason::NotPowerOfTwo { side: 6 })),
            "fallback: side 6 is not a power of two"
        );
    }
}
