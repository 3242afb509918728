use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Compares two buffers element by element.
///
/// Returns `false` immediately when the lengths differ, otherwise `true` iff
/// every `|expected[i] - actual[i]| <= tolerance`. A `NaN` on either side
/// never compares equal.
pub fn verify(expected: &[f32], actual: &[f32], tolerance: f32) -> bool {
    if expected.len() != actual.len() {
        return false;
    }

    expected
        .iter()
        .zip(actual)
        .all(|(e, a)| (e - a).abs() <= tolerance)
}

/// Largest absolute element-wise difference, or `None` on length mismatch.
pub fn max_abs_diff(expected: &[f32], actual: &[f32]) -> Option<f32> {
    if expected.len() != actual.len() {
        return None;
    }

    Some(
        expected
            .iter()
            .zip(actual)
            .fold(0.0f32, |max, (e, a)| max.max((e - a).abs())),
    )
}

/// Builds the generator used for matrix inputs. Owned and passed in by the
/// caller; there is no process-wide generator.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fills `buf` with values drawn uniformly from `[-1.0, 1.0]`.
pub fn fill_random<R: Rng + ?Sized>(buf: &mut [f32], rng: &mut R) {
    for value in buf.iter_mut() {
        *value = rng.random_range(-1.0f32..=1.0);
    }
}

/// A fresh buffer of `len` values drawn uniformly from `[-1.0, 1.0]`.
pub fn random_vec<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    let mut buf = vec![0.0f32; len];
    fill_random(&mut buf, rng);
    buf
}

/// A zero-filled buffer of `len` elements.
#[inline(always)]
pub fn zeros(len: usize) -> Vec<f32> {
    vec![0.0f32; len]
}

/// Zero-initialized, over-aligned `f32` scratch buffer.
///
/// Used for packed GEMM panels so that every sliver starts on a 32-byte
/// boundary. Memory is released with the same layout it was allocated with.
pub struct AlignedVec {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: `AlignedVec` uniquely owns its allocation, like `Vec<f32>`.
unsafe impl Send for AlignedVec {}
unsafe impl Sync for AlignedVec {}

impl AlignedVec {
    /// Allocates `len` zeroed elements aligned to `align` bytes.
    ///
    /// # Panics
    ///
    /// * If `align` is not a power of two or is smaller than `f32`'s alignment.
    /// * If `len * size_of::<f32>()` overflows.
    /// * If memory allocation fails (via the global allocation error handler).
    pub fn zeroed(len: usize, align: usize) -> Self {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        assert!(align >= std::mem::align_of::<f32>());

        let size_bytes = match len.checked_mul(std::mem::size_of::<f32>()) {
            Some(s) => s,
            None => panic!("Total size calculation overflowed for {len} f32 elements"),
        };

        let layout = match Layout::from_size_align(size_bytes, align) {
            Ok(l) => l,
            Err(_) => panic!("Failed to create Layout with size {size_bytes} and alignment {align}"),
        };

        if layout.size() == 0 {
            return AlignedVec {
                ptr: NonNull::dangling(),
                len: 0,
                layout,
            };
        }

        let ptr = unsafe { alloc_zeroed(layout) as *mut f32 };

        let ptr = match NonNull::new(ptr) {
            Some(p) => p,
            None => handle_alloc_error(layout),
        };

        AlignedVec { ptr, len, layout }
    }

    /// Alignment in bytes this buffer was allocated with.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for AlignedVec {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl Deref for AlignedVec {
    type Target = [f32];
    fn deref(&self) -> &Self::Target {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_within_tolerance() {
        let expected = [1.0f32, 2.0, 3.0];
        let actual = [1.00005f32, 1.99995, 3.0];
        assert!(verify(&expected, &actual, 1e-4));
        assert!(!verify(&expected, &actual, 1e-6));
    }

    #[test]
    fn test_verify_length_mismatch() {
        assert!(!verify(&[1.0, 2.0], &[1.0], 1.0));
        assert!(verify(&[], &[], 1e-4));
    }

    #[test]
    fn test_verify_rejects_nan() {
        assert!(!verify(&[f32::NAN], &[f32::NAN], 1e-4));
    }

    #[test]
    fn test_max_abs_diff() {
        assert_eq!(max_abs_diff(&[1.0, -2.0], &[1.5, -2.25]), Some(0.5));
        assert_eq!(max_abs_diff(&[1.0], &[]), None);
    }

    #[test]
    fn test_random_values_in_range_and_reproducible() {
        let mut rng_a = seeded_rng(42);
        let mut rng_b = seeded_rng(42);
        let a = random_vec(1000, &mut rng_a);
        let b = random_vec(1000, &mut rng_b);

        assert_eq!(a, b, "same seed must give same values");
        assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(a.iter().any(|&v| v != a[0]), "values should not be constant");
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = random_vec(16, &mut seeded_rng(1));
        let b = random_vec(16, &mut seeded_rng(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_aligned_vec_zeroed_and_aligned() {
        let mut buf = AlignedVec::zeroed(100, 32);
        assert_eq!(buf.len(), 100);
        assert_eq!(buf.alignment(), 32);
        assert_eq!(buf.as_ptr() as usize % 32, 0);
        assert!(buf.iter().all(|&v| v == 0.0));

        buf[99] = 4.0;
        assert_eq!(buf[99], 4.0);
    }

    #[test]
    fn test_aligned_vec_empty() {
        let buf = AlignedVec::zeroed(0, 32);
        assert!(buf.is_empty());
    }
}
