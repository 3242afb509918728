//! SIMD backends for the vectorized and packed kernels.
//!
//! The instruction set is picked at runtime instead of through build-time
//! `cfg` flags, so one binary runs correctly on any x86_64 CPU and on other
//! architectures.

use std::fmt;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod avx2;

pub mod portable;

pub mod traits;

pub use traits::SimdVec;

/// The vector implementation a kernel call will run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 256-bit AVX2 registers with FMA3.
    Avx2Fma,
    /// Array-based lanes, any CPU.
    Portable,
}

impl Backend {
    /// Picks the best backend supported by the running CPU.
    pub fn detect() -> Backend {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Backend::Avx2Fma;
            }
        }

        Backend::Portable
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Avx2Fma => "avx2+fma",
            Backend::Portable => "portable",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
