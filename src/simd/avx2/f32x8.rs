//! AVX2 8-lane f32 SIMD vector implementation.
//!
//! `F32x8` wraps Intel's `__m256` register. Every method is `#[inline(always)]`
//! so that, once inlined into a `#[target_feature(enable = "avx2,fma")]`
//! function, it lowers to a single AVX2/FMA instruction.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: AVX2 and FMA3 (Intel Haswell, AMD Excavator and later)
//! - **Runtime Detection**: callers must check [`Backend::detect`] before use
//!
//! [`Backend::detect`]: crate::simd::Backend::detect

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::traits::SimdVec;

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl SimdVec for F32x8 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zeros() -> Self {
        Self {
            elements: _mm256_setzero_ps(),
        }
    }

    /// Uses `_mm256_set1_ps` to broadcast the scalar.
    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: _mm256_set1_ps(value),
        }
    }

    /// Uses the `_mm256_loadu_ps` intrinsic.
    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        Self {
            elements: _mm256_loadu_ps(ptr),
        }
    }

    /// Uses the `_mm256_storeu_ps` intrinsic.
    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }

    /// Uses `_mm256_fmadd_ps`: `a * b + self` with a single rounding.
    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        Self {
            elements: _mm256_fmadd_ps(a.elements, b.elements, self.elements),
        }
    }
}
