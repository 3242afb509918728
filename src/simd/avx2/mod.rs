//! AVX2 SIMD implementations for 256-bit vector operations.
//!
//! Available on x86 and x86_64 targets. Nothing in here may run before
//! [`Backend::detect`](crate::simd::Backend::detect) has confirmed AVX2 and
//! FMA support; the kernels call these types only from functions compiled
//! with `#[target_feature(enable = "avx2,fma")]`.
//!
//! # Available Types
//!
//! - [`f32x8::F32x8`]: 256-bit vector containing 8 packed single-precision values

pub mod f32x8;
