/// An 8-lane `f32` vector as seen by the GEMM kernels.
///
/// Kernel bodies are written once, generic over this trait, and instantiated
/// for the AVX2 register type or for the portable array type depending on
/// what the CPU reports at runtime.
pub trait SimdVec: Copy {
    /// Number of `f32` lanes.
    const LANES: usize;

    /// A vector with every lane set to zero.
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set backing `Self`.
    unsafe fn zeros() -> Self;

    /// Broadcasts `value` into every lane.
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set backing `Self`.
    unsafe fn splat(value: f32) -> Self;

    /// Loads `LANES` contiguous values starting at `ptr`. No alignment required.
    ///
    /// # Safety
    ///
    /// `ptr..ptr + LANES` must be readable.
    unsafe fn load(ptr: *const f32) -> Self;

    /// Stores all lanes to `ptr..ptr + LANES`. No alignment required.
    ///
    /// # Safety
    ///
    /// `ptr..ptr + LANES` must be writable.
    unsafe fn store_at(&self, ptr: *mut f32);

    /// Returns `self + a * b`, rounded once.
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set backing `Self`.
    unsafe fn fmadd(&self, a: Self, b: Self) -> Self;
}
