//! Runtime knobs for the kernels that have a choice to make.
//!
//! Block sizes are compile-time constants at the crate root; what lives here
//! are policies (what to do with awkward shapes) and thread counts.

use crate::error::{config_error, Result};
use crate::{DYNAMIC_CHUNK_ROWS, STRASSEN_THRESHOLD};

/// How the packed kernel treats dimensions that are not multiples of 8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Zero-pad partial slivers while packing and clip the tile write-back.
    #[default]
    Pad,
    /// Run the whole multiply on the reference kernel instead.
    Fallback,
}

/// How Strassen treats square sides that do not halve evenly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizePolicy {
    /// Zero-pad to the smallest side that halves evenly down to the threshold.
    #[default]
    Pad,
    /// Only accept power-of-two sides; anything else uses the reference kernel.
    RequirePowerOfTwo,
}

/// Settings for the packed micro-kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedConfig {
    /// What to do when `m`, `n` or `p` is not a multiple of the 8x8 tile.
    pub edge: EdgePolicy,
}

/// Settings for the Strassen recursion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrassenConfig {
    /// Sides at or below this size run the triple loop directly.
    pub threshold: usize,
    /// What to do with sides that do not halve evenly down to `threshold`.
    pub size_policy: SizePolicy,
}

impl Default for StrassenConfig {
    fn default() -> Self {
        StrassenConfig {
            threshold: STRASSEN_THRESHOLD,
            size_policy: SizePolicy::default(),
        }
    }
}

impl StrassenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(config_error("strassen threshold must be at least 1"));
        }
        Ok(())
    }
}

/// Settings shared by the statically and dynamically scheduled kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Worker count. `None` means the machine's available parallelism for
    /// the static kernel and the global rayon pool for the dynamic one.
    pub threads: Option<usize>,
    /// Rows per task handed out by the dynamic scheduler.
    pub chunk_rows: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            threads: None,
            chunk_rows: DYNAMIC_CHUNK_ROWS,
        }
    }
}

impl ParallelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(config_error("thread count must be at least 1"));
        }
        if self.chunk_rows == 0 {
            return Err(config_error("chunk_rows must be at least 1"));
        }
        Ok(())
    }
}

/// Settings for every kernel, passed through [`Kernel::multiply_with`].
///
/// [`Kernel::multiply_with`]: crate::matmul::Kernel::multiply_with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KernelConfig {
    /// Used by [`Kernel::Packed`](crate::Kernel::Packed).
    pub packed: PackedConfig,
    /// Used by [`Kernel::Strassen`](crate::Kernel::Strassen).
    pub strassen: StrassenConfig,
    /// Used by [`Kernel::Threaded`](crate::Kernel::Threaded) and
    /// [`Kernel::Dynamic`](crate::Kernel::Dynamic).
    pub parallel: ParallelConfig,
}

impl KernelConfig {
    pub fn validate(&self) -> Result<()> {
        self.strassen.validate()?;
        self.parallel.validate()
    }
}
