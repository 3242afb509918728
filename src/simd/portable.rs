//! Portable 8-lane vector used when AVX2/FMA is not available.
//!
//! Lanes live in a plain array and each operation is a per-lane loop, which
//! the compiler is free to auto-vectorize. `fmadd` uses [`f32::mul_add`] so
//! rounding matches the hardware FMA path.

use crate::simd::traits::SimdVec;

const LANE_COUNT: usize = 8;

/// Array-backed stand-in for an 8-lane SIMD register.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct F32x8 {
    pub elements: [f32; LANE_COUNT],
}

impl SimdVec for F32x8 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    unsafe fn zeros() -> Self {
        Self {
            elements: [0.0; LANE_COUNT],
        }
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        Self {
            elements: [value; LANE_COUNT],
        }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const f32) -> Self {
        let mut elements = [0.0; LANE_COUNT];
        std::ptr::copy_nonoverlapping(ptr, elements.as_mut_ptr(), LANE_COUNT);
        Self { elements }
    }

    #[inline(always)]
    unsafe fn store_at(&self, ptr: *mut f32) {
        std::ptr::copy_nonoverlapping(self.elements.as_ptr(), ptr, LANE_COUNT);
    }

    #[inline(always)]
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self {
        let mut elements = self.elements;
        for (lane, acc) in elements.iter_mut().enumerate() {
            *acc = a.elements[lane].mul_add(b.elements[lane], *acc);
        }
        Self { elements }
    }
}
