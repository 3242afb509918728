//! Single-precision matrix multiplication strategies, side by side.
//!
//! Every kernel computes `C = A * B` for row-major `A (m x n)`, `B (n x p)`
//! and `C (m x p)` through the same signature, so they can be timed and
//! checked against one another:
//!
//! | Kernel | Strategy |
//! |---|---|
//! | [`matmul_reference`] | i-j-k triple loop, scalar accumulator. The oracle. |
//! | [`matmul_loop_order`] | i-k-j, sequential rows of B and C |
//! | [`matmul_blocked`] | i-k-j inside `TILE`-sized cubes |
//! | [`matmul_vectorized`] | i-k-j with 8-lane FMA, scalar column remainder |
//! | [`matmul_threaded`] | static row partition over scoped threads |
//! | [`matmul_dynamic`] | row chunks scheduled on a rayon pool |
//! | [`matmul_packed`] | GotoBLAS-style packing + 8x8 register micro-kernel |
//! | [`matmul_strassen`] | 7-product recursive decomposition |
//!
//! All kernels except the reference *accumulate* into `C`: zero it first.
//!
//! ```
//! use sgemm_lab::{matmul_packed, matmul_reference, utils::{random_vec, seeded_rng, verify}};
//!
//! let (m, n, p) = (16, 24, 8);
//! let mut rng = seeded_rng(42);
//! let a = random_vec(m * n, &mut rng);
//! let b = random_vec(n * p, &mut rng);
//!
//! let mut expected = vec![0.0; m * p];
//! matmul_reference(&a, &b, &mut expected, m, n, p);
//!
//! let mut c = vec![0.0; m * p];
//! matmul_packed(&a, &b, &mut c, m, n, p);
//! assert!(verify(&expected, &c, 1e-4));
//! ```

pub mod config;
pub mod error;
pub mod harness;
pub mod matmul;
pub mod matrix;
pub mod simd;
pub mod utils;

pub use config::{EdgePolicy, KernelConfig, PackedConfig, ParallelConfig, SizePolicy, StrassenConfig};
pub use error::{GemmError, Result};
pub use matmul::{
    blocked::matmul_blocked,
    dynamic::matmul_dynamic,
    loop_order::matmul_loop_order,
    packed::matmul_packed,
    reference::{matmul_reference, reference_accumulate},
    registry,
    strassen::matmul_strassen,
    threaded::matmul_threaded,
    vectorized::matmul_vectorized,
    FallbackReason, Kernel, MultiplyFn, Plan,
};
pub use matrix::{MatView, MatViewMut, Matrix};

/// SIMD lane width in `f32` elements (one 256-bit register).
pub const LANES: usize = 8;

/// Micro-kernel tile height (rows of C held in registers).
pub const MR: usize = 8;
/// Micro-kernel tile width (columns of C per register).
pub const NR: usize = 8;

/// Row macro-block: an `MC x KC` packed A panel (256 KiB) targets L2.
pub const MC: usize = 256;
/// Inner-dimension macro-block shared by the A and B panels.
pub const KC: usize = 256;
/// Column macro-block: a `KC x NC` packed B panel (128 KiB).
pub const NC: usize = 128;

/// Byte alignment of packed panels.
pub const PANEL_ALIGNMENT: usize = 32;

/// L1 data cache size the cache-blocked kernel is tuned for.
pub const L1_DATA_BYTES: usize = 32 * 1024;

/// Cube edge of the cache-blocked kernel: 32, since three 32x32 `f32` tiles
/// (12 KiB) fit in [`L1_DATA_BYTES`] and three 64x64 tiles (48 KiB) do not.
pub const TILE: usize = matmul::blocked::tile_edge_for_cache(L1_DATA_BYTES);

/// Strassen sides at or below this run the triple loop.
pub const STRASSEN_THRESHOLD: usize = 64;

/// Worker count when the platform cannot report its parallelism.
pub const DEFAULT_THREADS: usize = 4;

/// Rows per task for the dynamically scheduled kernel.
pub const DYNAMIC_CHUNK_ROWS: usize = 4;

/// Absolute per-element tolerance when comparing against the reference.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Seed for reproducible inputs.
pub const DEFAULT_SEED: u64 = 42;
