//! Row-major dense matrices and non-owning rectangular views into them.
//!
//! Element `(i, j)` of a `rows x cols` buffer lives at offset `i * cols + j`.
//! Views carry their parent's row stride, so a quadrant or tile can be read
//! (or written, for [`MatViewMut`]) in place without copying.

use rand::Rng;

use crate::error::{element_count, shape_error, Result};
use crate::utils::fill_random;

/// An owned, dense, row-major `f32` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size, size);
        for i in 0..size {
            matrix.set(i, i, 1.0);
        }
        matrix
    }

    /// A matrix of values drawn uniformly from `[-1.0, 1.0]`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut matrix = Self::zeros(rows, cols);
        fill_random(&mut matrix.data, rng);
        matrix
    }

    /// Wraps an existing row-major buffer, checking its length.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let expected = element_count(rows, cols)?;
        if data.len() != expected {
            return Err(shape_error("matrix", expected, data.len()));
        }
        Ok(Matrix { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        self.data[i * self.cols + j] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn view(&self) -> MatView<'_> {
        MatView::new(&self.data, self.rows, self.cols)
    }

    pub fn view_mut(&mut self) -> MatViewMut<'_> {
        MatViewMut::new(&mut self.data, self.rows, self.cols)
    }

    /// Element-wise `x + y` into a new matrix.
    pub fn sum_of(x: MatView<'_>, y: MatView<'_>) -> Self {
        Self::combine(x, y, |a, b| a + b)
    }

    /// Element-wise `x - y` into a new matrix.
    pub fn difference_of(x: MatView<'_>, y: MatView<'_>) -> Self {
        Self::combine(x, y, |a, b| a - b)
    }

    fn combine(x: MatView<'_>, y: MatView<'_>, op: impl Fn(f32, f32) -> f32) -> Self {
        assert_eq!(
            (x.rows(), x.cols()),
            (y.rows(), y.cols()),
            "operands must have the same shape"
        );

        let mut out = Self::zeros(x.rows(), x.cols());
        for i in 0..x.rows() {
            let dst = &mut out.data[i * x.cols()..(i + 1) * x.cols()];
            for ((d, &a), &b) in dst.iter_mut().zip(x.row(i)).zip(y.row(i)) {
                *d = op(a, b);
            }
        }
        out
    }

    /// Copies `src` into the top-left corner of a zeroed `side x side` matrix.
    pub fn padded_from(src: MatView<'_>, side: usize) -> Self {
        assert!(src.rows() <= side && src.cols() <= side);

        let mut out = Self::zeros(side, side);
        for i in 0..src.rows() {
            out.data[i * side..i * side + src.cols()].copy_from_slice(src.row(i));
        }
        out
    }

    /// Renders the top-left 5x5 corner, for eyeballing results.
    pub fn preview(&self, name: &str) -> String {
        let mut out = format!("Matrix {name} ({}x{}):\n", self.rows, self.cols);
        for i in 0..self.rows.min(5) {
            for j in 0..self.cols.min(5) {
                out.push_str(&format!("{:>9.3}", self.get(i, j)));
            }
            if self.cols > 5 {
                out.push_str(" ...");
            }
            out.push('\n');
        }
        if self.rows > 5 {
            out.push_str("...\n");
        }
        out
    }
}

/// Read-only rectangular window into a row-major buffer.
///
/// Described by the parent buffer, the offset of the window's origin, its
/// extent and the parent's row stride.
#[derive(Clone, Copy, Debug)]
pub struct MatView<'a> {
    data: &'a [f32],
    offset: usize,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<'a> MatView<'a> {
    /// Views a whole `rows x cols` buffer.
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> Self {
        assert!(data.len() >= rows * cols, "buffer too small for view");
        MatView {
            data,
            offset: 0,
            rows,
            cols,
            stride: cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[self.offset + i * self.stride + j]
    }

    /// Row `i` of the window as a contiguous slice.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [f32] {
        debug_assert!(i < self.rows);
        let start = self.offset + i * self.stride;
        &self.data[start..start + self.cols]
    }

    /// Narrows the view to `rows x cols` starting at `(row, col)`.
    pub fn sub(&self, row: usize, col: usize, rows: usize, cols: usize) -> MatView<'a> {
        assert!(
            row + rows <= self.rows && col + cols <= self.cols,
            "sub-view out of bounds"
        );
        MatView {
            data: self.data,
            offset: self.offset + row * self.stride + col,
            rows,
            cols,
            stride: self.stride,
        }
    }

    /// Splits an even-sized view into `[top-left, top-right, bottom-left, bottom-right]`.
    pub fn quadrants(&self) -> [MatView<'a>; 4] {
        assert!(
            self.rows % 2 == 0 && self.cols % 2 == 0,
            "quadrants need even dimensions"
        );
        let (h, w) = (self.rows / 2, self.cols / 2);
        [
            self.sub(0, 0, h, w),
            self.sub(0, w, h, w),
            self.sub(h, 0, h, w),
            self.sub(h, w, h, w),
        ]
    }

    /// Copies the window into a contiguous owned matrix.
    pub fn to_matrix(&self) -> Matrix {
        let mut out = Matrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            out.data[i * self.cols..(i + 1) * self.cols].copy_from_slice(self.row(i));
        }
        out
    }
}

/// Exclusive writable window into a row-major buffer.
#[derive(Debug)]
pub struct MatViewMut<'a> {
    data: &'a mut [f32],
    offset: usize,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<'a> MatViewMut<'a> {
    pub fn new(data: &'a mut [f32], rows: usize, cols: usize) -> Self {
        assert!(data.len() >= rows * cols, "buffer too small for view");
        MatViewMut {
            data,
            offset: 0,
            rows,
            cols,
            stride: cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        debug_assert!(i < self.rows);
        let start = self.offset + i * self.stride;
        &mut self.data[start..start + self.cols]
    }

    /// Reborrows a sub-window. The parent is unusable while it is alive.
    pub fn sub_mut(&mut self, row: usize, col: usize, rows: usize, cols: usize) -> MatViewMut<'_> {
        assert!(
            row + rows <= self.rows && col + cols <= self.cols,
            "sub-view out of bounds"
        );
        MatViewMut {
            data: &mut *self.data,
            offset: self.offset + row * self.stride + col,
            rows,
            cols,
            stride: self.stride,
        }
    }

    /// Adds `src` element-wise into this window.
    pub fn add_assign(&mut self, src: MatView<'_>) {
        assert_eq!((self.rows, self.cols), (src.rows(), src.cols()));
        for i in 0..self.rows {
            for (d, &s) in self.row_mut(i).iter_mut().zip(src.row(i)) {
                *d += s;
            }
        }
    }

    /// Adds `Σ sign·term` element-wise into this window. Terms are summed
    /// left to right before the single add into the destination.
    pub fn add_combination(&mut self, terms: &[(f32, &Matrix)]) {
        for (_, term) in terms {
            assert_eq!((self.rows, self.cols), (term.rows(), term.cols()));
        }
        let cols = self.cols;
        for i in 0..self.rows {
            let dst = self.row_mut(i);
            for (j, d) in dst.iter_mut().enumerate() {
                let mut value = 0.0f32;
                for (sign, term) in terms {
                    value += sign * term.data[i * cols + j];
                }
                *d += value;
            }
        }
    }
}
