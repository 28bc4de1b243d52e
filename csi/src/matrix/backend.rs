//! Dense Linear Algebra Backend
//!
//! Bridges matrix pages to nalgebra for the decompositions needed by true
//! MIMO: Cholesky whitening, MMSE inversion, SVD, and Hermitian
//! eigendecomposition. Compiled only with the `mimo` feature; without it,
//! every entry point aborts at first use while the SISO (1x1) closed-form
//! paths elsewhere remain fully functional.

use super::Complex;
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "mimo")]
mod imp {
    use super::*;
    use nalgebra::{Cholesky, DMatrix, SymmetricEigen, SVD};

    fn to_dmatrix(view: ArrayView2<Complex>) -> DMatrix<Complex> {
        DMatrix::from_fn(view.nrows(), view.ncols(), |i, j| view[(i, j)])
    }

    fn from_dmatrix(m: &DMatrix<Complex>) -> Array2<Complex> {
        Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
    }

    /// Whitening transform of one page: `L^-1 * chan`, with L the lower
    /// Cholesky factor of the covariance matrix.
    pub fn whiten_page(cov: ArrayView2<Complex>, chan: ArrayView2<Complex>) -> Array2<Complex> {
        let chol = Cholesky::new(to_dmatrix(cov))
            .expect("Interference covariance matrix must be positive definite");
        let sol = chol
            .l()
            .solve_lower_triangular(&to_dmatrix(chan))
            .expect("Cholesky factor must be invertible");
        from_dmatrix(&sol)
    }

    /// MSE matrix of an MMSE receiver for one page: `inv(I + chanCov)`
    pub fn mmse_page(chan_cov: ArrayView2<Complex>) -> Array2<Complex> {
        let n = chan_cov.nrows();
        let t = to_dmatrix(chan_cov) + DMatrix::<Complex>::identity(n, n);
        let inv = Cholesky::new(t)
            .expect("I + chanCov must be positive definite")
            .inverse();
        from_dmatrix(&inv)
    }

    /// Eigenvalue magnitudes of a Hermitian page, in descending order
    pub fn hermitian_eigenvalues_desc(m: ArrayView2<Complex>) -> Vec<f64> {
        let eigen = SymmetricEigen::new(to_dmatrix(m));
        let mut vals: Vec<f64> = eigen.eigenvalues.iter().map(|v| v.abs()).collect();
        vals.sort_by(|a, b| b.partial_cmp(a).expect("Eigenvalues must not be NaN"));
        vals
    }

    /// Numerical rank: number of singular values above `rel_threshold` times
    /// the largest singular value
    pub fn svd_rank(m: ArrayView2<Complex>, rel_threshold: f64) -> usize {
        let svd = SVD::new(to_dmatrix(m), false, false);
        let max_sv = svd.singular_values.iter().cloned().fold(0.0, f64::max);
        if max_sv == 0.0 {
            return 0;
        }
        svd.singular_values
            .iter()
            .filter(|&&sv| sv > rel_threshold * max_sv)
            .count()
    }

    /// Right singular vectors of one page, as columns ordered by decreasing
    /// singular value; dimensions (ncols, min(nrows, ncols))
    pub fn svd_right_vectors(m: ArrayView2<Complex>) -> Array2<Complex> {
        let svd = SVD::new(to_dmatrix(m), false, true);
        let v = svd
            .v_t
            .expect("SVD was computed with right singular vectors")
            .adjoint();
        let order = sv_order_desc(svd.singular_values.as_slice());
        Array2::from_shape_fn((v.nrows(), v.ncols()), |(i, j)| v[(i, order[j])])
    }

    /// Left singular vector associated with the largest singular value
    pub fn dominant_left_singular_vector(m: ArrayView2<Complex>) -> Vec<Complex> {
        let svd = SVD::new(to_dmatrix(m), true, false);
        let u = svd.u.expect("SVD was computed with left singular vectors");
        let order = sv_order_desc(svd.singular_values.as_slice());
        u.column(order[0]).iter().cloned().collect()
    }

    /// Determinant of one page
    pub fn determinant(m: ArrayView2<Complex>) -> Complex {
        to_dmatrix(m).determinant()
    }

    fn sv_order_desc(singular_values: &[f64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..singular_values.len()).collect();
        order.sort_by(|&a, &b| {
            singular_values[b]
                .partial_cmp(&singular_values[a])
                .expect("Singular values must not be NaN")
        });
        order
    }
}

#[cfg(not(feature = "mimo"))]
mod imp {
    use super::*;

    const BACKEND_MISSING: &str =
        "MIMO matrix operations require the 'mimo' feature (dense linear algebra backend); \
         only the SISO 1x1 paths are available in this build";

    pub fn whiten_page(_cov: ArrayView2<Complex>, _chan: ArrayView2<Complex>) -> Array2<Complex> {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn mmse_page(_chan_cov: ArrayView2<Complex>) -> Array2<Complex> {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn hermitian_eigenvalues_desc(_m: ArrayView2<Complex>) -> Vec<f64> {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn svd_rank(_m: ArrayView2<Complex>, _rel_threshold: f64) -> usize {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn svd_right_vectors(_m: ArrayView2<Complex>) -> Array2<Complex> {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn dominant_left_singular_vector(_m: ArrayView2<Complex>) -> Vec<Complex> {
        panic!("{}", BACKEND_MISSING);
    }

    pub fn determinant(_m: ArrayView2<Complex>) -> Complex {
        panic!("{}", BACKEND_MISSING);
    }
}

pub(crate) use imp::*;
