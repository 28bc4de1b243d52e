//! MIMO Matrix Primitives
//!
//! Three-dimensional complex matrix arrays indexed as (row, column, page),
//! where a page is one subcarrier / resource block / subband slice. All pages
//! of one array share the same row/column dimensions.

mod backend;
mod cov;
mod sinr;
mod whitened;

pub use cov::CovMat;
pub use sinr::SinrMatrix;
pub use whitened::WhitenedChannel;

pub(crate) use backend::dominant_left_singular_vector;

use ndarray::{s, Array2, Array3, ArrayView2};
use num_complex::Complex64;

/// Complex scalar used throughout the MIMO computations
pub type Complex = Complex64;

/// 3-D array of complex matrices: (rows, columns, pages)
///
/// Algebraic operations (multiply, transpose, averaging) produce new arrays;
/// arrays are only mutated in place through the explicit accumulation
/// operations used while building covariance matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrixArray {
    data: Array3<Complex>,
}

impl ComplexMatrixArray {
    /// Create a zero-initialized matrix array
    pub fn new(rows: usize, cols: usize, pages: usize) -> Self {
        assert!(
            rows > 0 && cols > 0 && pages > 0,
            "Matrix array dimensions must not be 0: ({}, {}, {})",
            rows,
            cols,
            pages
        );
        Self {
            data: Array3::zeros((rows, cols, pages)),
        }
    }

    /// Create a matrix array from a function of (row, col, page)
    pub fn from_fn<F>(rows: usize, cols: usize, pages: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> Complex,
    {
        assert!(rows > 0 && cols > 0 && pages > 0, "Dimensions must not be 0");
        Self {
            data: Array3::from_shape_fn((rows, cols, pages), |(i, j, p)| f(i, j, p)),
        }
    }

    /// Stack a list of single-page matrices into one multi-page array
    pub fn from_pages(pages: &[ComplexMatrixArray]) -> Self {
        assert!(!pages.is_empty(), "Cannot join an empty page list");
        let rows = pages[0].num_rows();
        let cols = pages[0].num_cols();
        for page in pages {
            assert_eq!(page.num_rows(), rows, "All pages must have equal rows");
            assert_eq!(page.num_cols(), cols, "All pages must have equal cols");
            assert_eq!(page.num_pages(), 1, "Joining requires single-page inputs");
        }
        Self::from_fn(rows, cols, pages.len(), |i, j, p| pages[p][(i, j, 0)])
    }

    /// Stack of per-page identity matrices
    pub fn identity(dim: usize, pages: usize) -> Self {
        Self::from_fn(dim, dim, pages, |i, j, _| {
            if i == j {
                Complex::new(1.0, 0.0)
            } else {
                Complex::new(0.0, 0.0)
            }
        })
    }

    /// Number of rows in each page
    pub fn num_rows(&self) -> usize {
        self.data.shape()[0]
    }

    /// Number of columns in each page
    pub fn num_cols(&self) -> usize {
        self.data.shape()[1]
    }

    /// Number of pages (frequency bins)
    pub fn num_pages(&self) -> usize {
        self.data.shape()[2]
    }

    /// View of one page as a 2-D matrix
    pub fn page(&self, page: usize) -> ArrayView2<'_, Complex> {
        assert!(
            page < self.num_pages(),
            "Page {} out of bounds (have {})",
            page,
            self.num_pages()
        );
        self.data.slice(s![.., .., page])
    }

    /// Overwrite one page from a 2-D matrix
    pub fn set_page(&mut self, page: usize, values: &Array2<Complex>) {
        assert!(page < self.num_pages(), "Page {} out of bounds", page);
        assert_eq!(values.nrows(), self.num_rows(), "Page rows must match");
        assert_eq!(values.ncols(), self.num_cols(), "Page cols must match");
        self.data.slice_mut(s![.., .., page]).assign(values);
    }

    /// Page-wise matrix product: `self[p] * rhs[p]` for every page
    pub fn matmul(&self, rhs: &ComplexMatrixArray) -> ComplexMatrixArray {
        assert_eq!(
            self.num_cols(),
            rhs.num_rows(),
            "Inner dimensions must match for multiplication: {} vs {}",
            self.num_cols(),
            rhs.num_rows()
        );
        assert_eq!(
            self.num_pages(),
            rhs.num_pages(),
            "Page counts must match for multiplication"
        );
        let mut res = ComplexMatrixArray::new(self.num_rows(), rhs.num_cols(), self.num_pages());
        for p in 0..self.num_pages() {
            let prod = self.page(p).dot(&rhs.page(p));
            res.set_page(p, &prod);
        }
        res
    }

    /// Page-wise conjugate transpose
    pub fn hermitian_transpose(&self) -> ComplexMatrixArray {
        ComplexMatrixArray::from_fn(
            self.num_cols(),
            self.num_rows(),
            self.num_pages(),
            |i, j, p| self[(j, i, p)].conj(),
        )
    }

    /// Broadcast a single-page matrix to `n` identical pages
    pub fn make_n_copies(&self, n: usize) -> ComplexMatrixArray {
        assert_eq!(self.num_pages(), 1, "Broadcasting requires a single-page input");
        ComplexMatrixArray::from_fn(self.num_rows(), self.num_cols(), n, |i, j, _| {
            self[(i, j, 0)]
        })
    }

    /// Arithmetic mean of all pages, as a single-page matrix
    pub fn page_mean(&self) -> ComplexMatrixArray {
        let n = self.num_pages() as f64;
        ComplexMatrixArray::from_fn(self.num_rows(), self.num_cols(), 1, |i, j, _| {
            let mut sum = Complex::new(0.0, 0.0);
            for p in 0..self.num_pages() {
                sum += self[(i, j, p)];
            }
            sum / n
        })
    }

    /// Per-page determinants
    ///
    /// Closed form for 1x1 and 2x2 pages; larger pages require the dense
    /// linear algebra backend.
    pub fn determinants(&self) -> Vec<Complex> {
        assert_eq!(
            self.num_rows(),
            self.num_cols(),
            "Determinant requires square pages: {}x{}",
            self.num_rows(),
            self.num_cols()
        );
        (0..self.num_pages())
            .map(|p| match self.num_rows() {
                1 => self[(0, 0, p)],
                2 => self[(0, 0, p)] * self[(1, 1, p)] - self[(0, 1, p)] * self[(1, 0, p)],
                _ => backend::determinant(self.page(p)),
            })
            .collect()
    }

    /// Squared Frobenius norm of one page
    pub fn page_norm_sqr(&self, page: usize) -> f64 {
        self.page(page).iter().map(|v| v.norm_sqr()).sum()
    }
}

impl std::ops::Index<(usize, usize, usize)> for ComplexMatrixArray {
    type Output = Complex;

    fn index(&self, (row, col, page): (usize, usize, usize)) -> &Complex {
        &self.data[[row, col, page]]
    }
}

impl std::ops::IndexMut<(usize, usize, usize)> for ComplexMatrixArray {
    fn index_mut(&mut self, (row, col, page): (usize, usize, usize)) -> &mut Complex {
        &mut self.data[[row, col, page]]
    }
}
