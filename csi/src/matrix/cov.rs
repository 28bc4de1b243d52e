//! Interference-Plus-Noise Covariance Matrices

use super::{backend, Complex, ComplexMatrixArray, WhitenedChannel};

/// Interference-plus-noise covariance of a MIMO signal, one square
/// (nRxPorts x nRxPorts) matrix page per frequency bin
///
/// Built by seeding the white-noise diagonal and accumulating the outer
/// products of the interfering signals' effective channels, which keeps each
/// page Hermitian positive semi-definite.
#[derive(Debug, Clone, PartialEq)]
pub struct CovMat(ComplexMatrixArray);

impl CovMat {
    /// Create a zero covariance for `num_rx_ports` receive ports
    pub fn new(num_rx_ports: usize, pages: usize) -> Self {
        Self(ComplexMatrixArray::new(num_rx_ports, num_rx_ports, pages))
    }

    /// Wrap an existing matrix array; pages must be square
    pub fn from_matrix(mat: ComplexMatrixArray) -> Self {
        assert_eq!(
            mat.num_rows(),
            mat.num_cols(),
            "Covariance pages must be square: {}x{}",
            mat.num_rows(),
            mat.num_cols()
        );
        Self(mat)
    }

    /// Add white noise of the given variance to the diagonal of every page
    pub fn add_white_noise(&mut self, variance: f64) {
        assert!(variance >= 0.0, "Noise variance must not be negative");
        for p in 0..self.num_pages() {
            for i in 0..self.num_rows() {
                self.0[(i, i, p)] += Complex::new(variance, 0.0);
            }
        }
    }

    /// Add an interference signal: `self += rhs * rhs^H`, page-wise
    ///
    /// `rhs` is the interferer's full channel matrix including precoding.
    pub fn add_interference_signal(&mut self, rhs: &ComplexMatrixArray) {
        self.accumulate(rhs, 1.0);
    }

    /// Subtract an interference signal: `self -= rhs * rhs^H`, page-wise
    pub fn subtract_interference_signal(&mut self, rhs: &ComplexMatrixArray) {
        self.accumulate(rhs, -1.0);
    }

    fn accumulate(&mut self, rhs: &ComplexMatrixArray, sign: f64) {
        assert_eq!(
            rhs.num_rows(),
            self.num_rows(),
            "Interference signal has {} rows but covariance has {} ports",
            rhs.num_rows(),
            self.num_rows()
        );
        assert_eq!(
            rhs.num_pages(),
            self.num_pages(),
            "Interference signal page count must match covariance"
        );
        for p in 0..self.num_pages() {
            for i in 0..self.num_rows() {
                for j in 0..self.num_rows() {
                    let mut outer = Complex::new(0.0, 0.0);
                    for t in 0..rhs.num_cols() {
                        outer += rhs[(i, t, p)] * rhs[(j, t, p)].conj();
                    }
                    self.0[(i, j, p)] += sign * outer;
                }
            }
        }
    }

    /// Calculate the interference-normalized (whitened) channel matrix
    ///
    /// For a 1x1 channel this is the closed form `h / sqrt(Re(cov))` per
    /// page. The general case solves `L^-1 * H` with L the lower Cholesky
    /// factor of the covariance and requires the dense linear algebra
    /// backend (`mimo` feature).
    pub fn calc_intf_norm_channel(&self, chan_mat: &ComplexMatrixArray) -> WhitenedChannel {
        assert_eq!(
            chan_mat.num_rows(),
            self.num_rows(),
            "Channel matrix has {} rows but covariance has {} ports",
            chan_mat.num_rows(),
            self.num_rows()
        );
        assert_eq!(
            chan_mat.num_pages(),
            self.num_pages(),
            "Channel matrix page count must match covariance"
        );

        if chan_mat.num_rows() == 1 && chan_mat.num_cols() == 1 {
            let res = ComplexMatrixArray::from_fn(1, 1, chan_mat.num_pages(), |_, _, p| {
                let power = self.0[(0, 0, p)].re;
                assert!(power > 0.0, "Interference-plus-noise power must be positive");
                chan_mat[(0, 0, p)] / power.sqrt()
            });
            return WhitenedChannel::from_matrix(res);
        }

        let mut res = ComplexMatrixArray::new(
            chan_mat.num_rows(),
            chan_mat.num_cols(),
            chan_mat.num_pages(),
        );
        for p in 0..chan_mat.num_pages() {
            let page = backend::whiten_page(self.page(p), chan_mat.page(p));
            res.set_page(p, &page);
        }
        WhitenedChannel::from_matrix(res)
    }
}

impl std::ops::Deref for CovMat {
    type Target = ComplexMatrixArray;

    fn deref(&self) -> &ComplexMatrixArray {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_add_subtract_interference_roundtrip() {
        let mut cov = CovMat::new(2, 3);
        cov.add_white_noise(1.0);
        let reference = cov.clone();

        let sig = ComplexMatrixArray::from_fn(2, 1, 3, |i, _, p| {
            Complex::new((i + p) as f64, 0.5 * i as f64)
        });
        cov.add_interference_signal(&sig);
        assert_ne!(cov, reference);
        cov.subtract_interference_signal(&sig);

        for p in 0..3 {
            for i in 0..2 {
                for j in 0..2 {
                    assert_relative_eq!(
                        cov[(i, j, p)].re,
                        reference[(i, j, p)].re,
                        epsilon = 1e-12
                    );
                    assert_relative_eq!(
                        cov[(i, j, p)].im,
                        reference[(i, j, p)].im,
                        epsilon = 1e-12
                    );
                }
            }
        }
    }

    #[test]
    fn test_outer_product_accumulation() {
        // Signal [1; j] on a single page: outer product is [[1, -j], [j, 1]]
        let mut cov = CovMat::new(2, 1);
        let sig = ComplexMatrixArray::from_fn(2, 1, 1, |i, _, _| {
            if i == 0 {
                Complex::new(1.0, 0.0)
            } else {
                Complex::new(0.0, 1.0)
            }
        });
        cov.add_interference_signal(&sig);

        assert_relative_eq!(cov[(0, 0, 0)].re, 1.0);
        assert_relative_eq!(cov[(0, 1, 0)].im, -1.0);
        assert_relative_eq!(cov[(1, 0, 0)].im, 1.0);
        assert_relative_eq!(cov[(1, 1, 0)].re, 1.0);
    }

    #[test]
    fn test_siso_whitening_closed_form() {
        let mut cov = CovMat::new(1, 2);
        cov.add_white_noise(4.0);
        let chan = ComplexMatrixArray::from_fn(1, 1, 2, |_, _, p| {
            Complex::new(2.0 * (p + 1) as f64, 0.0)
        });
        let whitened = cov.calc_intf_norm_channel(&chan);
        assert_relative_eq!(whitened[(0, 0, 0)].re, 1.0);
        assert_relative_eq!(whitened[(0, 0, 1)].re, 2.0);
    }

    #[test]
    #[should_panic(expected = "rows but covariance")]
    fn test_dimension_mismatch_panics() {
        let cov = CovMat::new(2, 1);
        let chan = ComplexMatrixArray::new(3, 2, 1);
        let _ = cov.calc_intf_norm_channel(&chan);
    }
}
