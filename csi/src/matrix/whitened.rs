//! Interference-Normalized Channel Matrices
//!
//! Stores the channel after whitening the interference: `H_w = L^-1 * H`,
//! with L the lower Cholesky factor of the interference covariance R. With
//! the whitened channel, the receive signal `Y = H*P*S + W` becomes
//! `L^-1*Y = H_w*P*S + W_e` where `W_e` has an identity covariance, so all
//! SINR computation can ignore the interference color. For SISO this reduces
//! to `h / sqrt(interfPlusNoisePower)` and the SINR equals `|H_w|^2`.

use super::{backend, Complex, ComplexMatrixArray, SinrMatrix};

// Calibrated weights of the capacity-increment rank rule; obtained via
// linear regression against exhaustive-search rank decisions.
const RANK_INCREMENT_COEFFS: [f64; 4] = [0.0, 1.84181129, 0.11705455, 1.39847256];

/// Channel matrix after interference whitening, one (nRxPorts x nTxPorts)
/// page per frequency bin
#[derive(Debug, Clone, PartialEq)]
pub struct WhitenedChannel(ComplexMatrixArray);

impl WhitenedChannel {
    /// Wrap a whitened channel matrix array
    pub fn from_matrix(mat: ComplexMatrixArray) -> Self {
        Self(mat)
    }

    /// Compute the per-layer SINR when a specific precoder is applied
    ///
    /// The MSE matrix of an MMSE receiver is `inv(I + P^H * H_w^H * H_w * P)`
    /// per page; each diagonal MSE element `m` maps to an SINR of `1/m - 1`.
    /// Returns a (rank x pages) matrix.
    pub fn compute_sinr_for_precoding(&self, prec_mats: &ComplexMatrixArray) -> SinrMatrix {
        assert_eq!(
            prec_mats.num_rows(),
            self.num_cols(),
            "Precoding matrix has {} rows but channel has {} transmit ports",
            prec_mats.num_rows(),
            self.num_cols()
        );
        assert_eq!(
            prec_mats.num_pages(),
            self.num_pages(),
            "Precoding matrix page count must match channel"
        );

        let rank = prec_mats.num_cols();
        let pages = self.num_pages();
        let mse = self.compute_mse(prec_mats);

        SinrMatrix::from_fn(rank, pages, |layer, p| {
            // Guard near-zero MSE so an ideal noise-free channel cannot
            // propagate inf/NaN into the CQI selection
            let m = mse[(layer, layer, p)].re.max(f64::EPSILON);
            (1.0 / m - 1.0).max(0.0)
        })
    }

    /// MSE matrix of an MMSE receiver, (rank x rank) per page
    fn compute_mse(&self, prec_mats: &ComplexMatrixArray) -> ComplexMatrixArray {
        if self.num_rows() == 1 && self.num_cols() == 1 && prec_mats.num_cols() == 1 {
            // SISO closed form: mse = 1 / (1 + |h*p|^2)
            return ComplexMatrixArray::from_fn(1, 1, self.num_pages(), |_, _, p| {
                let hp = self.0[(0, 0, p)] * prec_mats[(0, 0, p)];
                Complex::new(1.0 / (1.0 + hp.norm_sqr()), 0.0)
            });
        }

        let chan_prec = self.0.matmul(prec_mats);
        let chan_cov = chan_prec.hermitian_transpose().matmul(&chan_prec);
        let rank = prec_mats.num_cols();
        let mut res = ComplexMatrixArray::new(rank, rank, self.num_pages());
        for p in 0..self.num_pages() {
            let page = backend::mmse_page(chan_cov.page(p));
            res.set_page(p, &page);
        }
        res
    }

    /// Arithmetic mean of all pages: the wideband-averaged channel
    pub fn wideband_channel(&self) -> WhitenedChannel {
        WhitenedChannel(self.0.page_mean())
    }

    /// Channel correlation `H_w^H * H_w`, one (nTxPorts x nTxPorts) page per
    /// frequency bin
    pub fn channel_correlation(&self) -> WhitenedChannel {
        WhitenedChannel(self.0.hermitian_transpose().matmul(&self.0))
    }

    /// Rank from the capacity-increment rule over the per-page eigenvalues
    /// of a channel correlation matrix
    pub fn sasaoka_wideband_rank(&self) -> u8 {
        let pages = self.num_pages();
        let min_dim = self
            .num_rows()
            .min(self.num_cols())
            .min(RANK_INCREMENT_COEFFS.len());

        // Eigenvalue magnitudes per subband, descending
        let eigenvalues: Vec<Vec<f64>> = (0..pages)
            .map(|p| backend::hermitian_eigenvalues_desc(self.page(p)))
            .collect();

        // Average capacity increment of each additional stream
        let mut rank_capacity_increase = vec![0.0; min_dim];
        for (rank, inc) in rank_capacity_increase.iter_mut().enumerate() {
            let cap: f64 = eigenvalues
                .iter()
                .map(|ev| (1.0 + ev[rank] / (rank + 1) as f64).log2())
                .sum();
            *inc = cap / pages as f64;
        }
        if rank_capacity_increase[0] == 0.0 {
            return 1;
        }

        let mut rank_d = 1.0;
        for rank in 0..min_dim {
            rank_d +=
                (rank_capacity_increase[rank] / rank_capacity_increase[0])
                    * RANK_INCREMENT_COEFFS[rank];
        }
        rank_d.round() as u8
    }

    /// Rank maximizing the waterfilling capacity over the first page's
    /// eigenvalues; ties keep the larger rank
    pub fn waterfilling_wideband_rank(&self, max_rank: u8, thr: f64) -> u8 {
        assert!(max_rank >= 1, "maxRank should be equal or greater to 1");
        assert!(thr > 0.0, "Waterfilling threshold must be positive");
        let eigenvalues = backend::hermitian_eigenvalues_desc(self.page(0));
        let max_rank = max_rank.min(eigenvalues.len() as u8);

        let mut best_rank = 0;
        let mut best_capacity = 0.0;
        for rank in 1..=max_rank {
            let mut capacity = 0.0;
            for stream in 0..rank as usize {
                capacity += (1.0 + eigenvalues[stream] / rank as f64 / thr).log2();
            }
            if capacity >= best_capacity {
                best_rank = rank;
                best_capacity = capacity;
            }
        }
        best_rank
    }

    /// Numerical rank of the first page via SVD with a relative singular
    /// value threshold; a threshold of 0 falls back to machine epsilon
    pub fn eigen_wideband_rank(&self, thr: f64) -> u8 {
        let thr = if thr == 0.0 { f64::EPSILON } else { thr };
        backend::svd_rank(self.page(0), thr) as u8
    }

    /// Per-page numerical ranks via SVD
    pub fn eigen_subband_ranks(&self, thr: f64) -> Vec<u8> {
        let thr = if thr == 0.0 { f64::EPSILON } else { thr };
        (0..self.num_pages())
            .map(|p| backend::svd_rank(self.page(p), thr) as u8)
            .collect()
    }

    /// Optimal (codebook-free) precoding matrices for a given rank: the
    /// first `rank` right singular vectors of each page
    pub fn extract_optimal_precoding_matrices(&self, rank: u8) -> ComplexMatrixArray {
        assert!(rank > 0, "Rank should be greater than 0");
        let rank = rank as usize;
        assert!(
            rank <= self.num_rows().min(self.num_cols()),
            "Rank {} exceeds channel dimensions {}x{}",
            rank,
            self.num_rows(),
            self.num_cols()
        );

        let mut opt_precoders = ComplexMatrixArray::new(self.num_cols(), rank, self.num_pages());
        for p in 0..self.num_pages() {
            let v = backend::svd_right_vectors(self.page(p));
            for i in 0..self.num_cols() {
                for j in 0..rank {
                    opt_precoders[(i, j, p)] = v[(i, j)];
                }
            }
        }
        opt_precoders
    }
}

impl std::ops::Deref for WhitenedChannel {
    type Target = ComplexMatrixArray;

    fn deref(&self) -> &ComplexMatrixArray {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::super::CovMat;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_siso_sinr_closed_form() {
        // h = 3 after whitening, p = 1: sinr = |h|^2 = 9
        let chan = WhitenedChannel::from_matrix(ComplexMatrixArray::from_fn(1, 1, 2, |_, _, _| {
            Complex::new(3.0, 0.0)
        }));
        let prec = ComplexMatrixArray::from_fn(1, 1, 2, |_, _, _| Complex::new(1.0, 0.0));
        let sinr = chan.compute_sinr_for_precoding(&prec);
        assert_eq!(sinr.rank(), 1);
        assert_eq!(sinr.num_rbs(), 2);
        assert_relative_eq!(sinr[(0, 0)], 9.0, epsilon = 1e-9);
        assert_relative_eq!(sinr[(0, 1)], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wideband_channel_is_page_mean() {
        let chan = WhitenedChannel::from_matrix(ComplexMatrixArray::from_fn(
            1,
            1,
            4,
            |_, _, p| Complex::new(p as f64, 0.0),
        ));
        let wb = chan.wideband_channel();
        assert_eq!(wb.num_pages(), 1);
        assert_relative_eq!(wb[(0, 0, 0)].re, 1.5);
    }

    #[cfg(feature = "mimo")]
    mod mimo {
        use super::*;
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        fn random_channel(rng: &mut StdRng, rows: usize, cols: usize, pages: usize)
            -> ComplexMatrixArray
        {
            ComplexMatrixArray::from_fn(rows, cols, pages, |_, _, _| {
                Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            })
        }

        /// Positive-definite covariance: white noise plus random outer products
        fn random_covariance(rng: &mut StdRng, ports: usize, pages: usize) -> CovMat {
            let mut cov = CovMat::new(ports, pages);
            cov.add_white_noise(0.5);
            let interferer = random_channel(rng, ports, 2, pages);
            cov.add_interference_signal(&interferer);
            cov
        }

        /// Dense inverse via Gaussian elimination, for test verification only
        fn invert_page(m: &ComplexMatrixArray, page: usize) -> Vec<Vec<Complex>> {
            let n = m.num_rows();
            let mut a: Vec<Vec<Complex>> = (0..n)
                .map(|i| {
                    (0..n)
                        .map(|j| m[(i, j, page)])
                        .chain((0..n).map(|j| {
                            if i == j {
                                Complex::new(1.0, 0.0)
                            } else {
                                Complex::new(0.0, 0.0)
                            }
                        }))
                        .collect()
                })
                .collect();
            for col in 0..n {
                let pivot_row = (col..n)
                    .max_by(|&a_row, &b_row| {
                        a[a_row][col]
                            .norm()
                            .partial_cmp(&a[b_row][col].norm())
                            .unwrap()
                    })
                    .unwrap();
                a.swap(col, pivot_row);
                let pivot = a[col][col];
                for v in a[col].iter_mut() {
                    *v /= pivot;
                }
                for row in 0..n {
                    if row != col {
                        let factor = a[row][col];
                        for k in 0..2 * n {
                            let sub = factor * a[col][k];
                            a[row][k] -= sub;
                        }
                    }
                }
            }
            a.iter().map(|row| row[n..].to_vec()).collect()
        }

        #[test]
        fn test_whitening_identity() {
            // Defining identity of the whitening transform:
            // H_w^H * H_w == H^H * inv(R) * H
            let mut rng = StdRng::seed_from_u64(7);
            for &(rows, cols) in &[(1usize, 1usize), (2, 2), (4, 2)] {
                let pages = 3;
                let cov = random_covariance(&mut rng, rows, pages);
                let chan = random_channel(&mut rng, rows, cols, pages);

                let whitened = cov.calc_intf_norm_channel(&chan);
                let lhs = whitened.hermitian_transpose().matmul(&whitened);

                for p in 0..pages {
                    let r_inv = invert_page(&cov, p);
                    for i in 0..cols {
                        for j in 0..cols {
                            // rhs = H^H * inv(R) * H at (i, j)
                            let mut rhs = Complex::new(0.0, 0.0);
                            for a_idx in 0..rows {
                                for b_idx in 0..rows {
                                    rhs += chan[(a_idx, i, p)].conj()
                                        * r_inv[a_idx][b_idx]
                                        * chan[(b_idx, j, p)];
                                }
                            }
                            assert_relative_eq!(lhs[(i, j, p)].re, rhs.re, epsilon = 1e-9);
                            assert_relative_eq!(lhs[(i, j, p)].im, rhs.im, epsilon = 1e-9);
                        }
                    }
                }
            }
        }

        #[test]
        fn test_sinr_non_negative() {
            let mut rng = StdRng::seed_from_u64(12);
            for _ in 0..20 {
                let chan = WhitenedChannel::from_matrix(random_channel(&mut rng, 2, 4, 5));
                let prec = random_channel(&mut rng, 4, 2, 5);
                let sinr = chan.compute_sinr_for_precoding(&prec);
                for layer in 0..sinr.rank() as usize {
                    for rb in 0..sinr.num_rbs() {
                        assert!(sinr[(layer, rb)] >= 0.0);
                        assert!(sinr[(layer, rb)].is_finite());
                    }
                }
            }
        }

        #[test]
        fn test_eigen_rank_detects_structure() {
            // Rank-1 channel: outer product of two vectors
            let u = [Complex::new(1.0, 0.0), Complex::new(0.5, 0.5)];
            let v = [
                Complex::new(1.0, 0.0),
                Complex::new(0.0, 1.0),
                Complex::new(-1.0, 0.0),
                Complex::new(0.5, 0.0),
            ];
            let chan = WhitenedChannel::from_matrix(ComplexMatrixArray::from_fn(
                2,
                4,
                1,
                |i, j, _| u[i] * v[j],
            ));
            assert_eq!(chan.eigen_wideband_rank(1e-6), 1);

            let mut rng = StdRng::seed_from_u64(3);
            let full = WhitenedChannel::from_matrix(random_channel(&mut rng, 2, 4, 1));
            assert_eq!(full.eigen_wideband_rank(1e-6), 2);
        }

        #[test]
        fn test_waterfilling_rank_bounds() {
            let mut rng = StdRng::seed_from_u64(4);
            let chan = WhitenedChannel::from_matrix(random_channel(&mut rng, 4, 4, 2));
            let corr = chan.channel_correlation();
            for thr in [0.1, 1.0, 10.0] {
                let rank = corr.waterfilling_wideband_rank(4, thr);
                assert!((1..=4).contains(&rank));
            }
        }

        #[test]
        fn test_optimal_precoders_dimensions() {
            let mut rng = StdRng::seed_from_u64(5);
            let chan = WhitenedChannel::from_matrix(random_channel(&mut rng, 2, 4, 3));
            let corr = chan.channel_correlation();
            let prec = corr.extract_optimal_precoding_matrices(2);
            assert_eq!(prec.num_rows(), 4);
            assert_eq!(prec.num_cols(), 2);
            assert_eq!(prec.num_pages(), 3);
            // Singular vector columns are unit norm
            for p in 0..3 {
                for j in 0..2 {
                    let norm: f64 = (0..4).map(|i| prec[(i, j, p)].norm_sqr()).sum();
                    assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
                }
            }
        }
    }
}
