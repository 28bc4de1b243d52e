//! Search-Free Precoding Estimation
//!
//! Instead of scanning the codebook, the dominant transmit direction is
//! estimated from a higher-order SVD of the channel tensor: the first left
//! singular vector of the transmit-port mode unfolding. The DFT phase
//! progressions along the horizontal and vertical port axes and the
//! polarization co-phasing are read off that vector and mapped to the
//! nearest codebook indices (i11, i12, i2). Only the ranks and the
//! secondary-beam index i13 are searched exhaustively afterwards.
//!
//! Requires the Type-I single-panel codebook, whose beam indices the phase
//! estimates map onto.

use super::{CqiFeedback, PmSearch, PmiUpdate, PrecMatParams};
use crate::codebook::Codebook;
use crate::matrix::{Complex, ComplexMatrixArray, WhitenedChannel};
use common::wrap_to_2pi;
use ndarray::Array2;
use std::f64::consts::PI;
use tracing::debug;

impl PmSearch {
    pub(super) fn create_cqi_feedback_maleki(
        &mut self,
        rb_chan: &WhitenedChannel,
        pmi_update: PmiUpdate,
    ) -> CqiFeedback {
        let sb_chan = self.subband_downsampling(rb_chan);

        if pmi_update.update_wb {
            let (n1, n2, o1, o2) = match self.codebook(1) {
                Codebook::SinglePanel(cb) => (cb.n1(), cb.n2(), cb.o1(), cb.o2()),
                _ => panic!("Search-free estimation requires the single-panel codebook"),
            };

            // Dominant transmit direction from the tensor decomposition
            let u = dominant_tx_direction(&sb_chan);

            // Phase progressions along the vertical axis, the horizontal
            // axis, and across the polarization boundary
            let len = u.len();
            let half = n1 * n2;
            let mut vertical = Complex::new(0.0, 0.0);
            for k in 0..n2.saturating_sub(1) {
                vertical += u[k].conj() * u[(k + 1) % len];
            }
            let mut horizontal = Complex::new(0.0, 0.0);
            for k in 0..n2 {
                horizontal += u[k].conj() * u[(k + n2) % len];
            }
            let mut co_phase = Complex::new(0.0, 0.0);
            for k in 0..n1 {
                co_phase += u[k].conj() * u[(k + half) % len];
            }
            let theta_m = wrap_to_2pi(vertical.arg());
            let theta_l = wrap_to_2pi(horizontal.arg());
            let phi_n = wrap_to_2pi(co_phase.arg());

            // DFT coefficients mapping the phase estimates to i11, i12, i2
            let m = (theta_m * (n2 * o2) as f64 / (2.0 * PI)) as usize;
            let l = (theta_l * (n1 * o1) as f64 / (2.0 * PI)) as usize;
            let n = (phi_n * 2.0 / PI) as usize;

            // Residual exhaustive search over the ranks and the
            // secondary-beam index i13 only
            let mut best: Option<(u8, usize, f64, ComplexMatrixArray)> = None;
            for rank in self.ranks.clone() {
                let cb = match self.codebook(rank) {
                    Codebook::SinglePanel(cb) => cb,
                    _ => panic!("Search-free estimation requires the single-panel codebook"),
                };
                let i11 = l.min(cb.num_i11() - 1);
                let i12 = m.min(cb.num_i12() - 1);
                let i2 = n.min(cb.num_i2() - 1);
                let num_i11 = cb.num_i11();
                for i13 in 0..cb.num_i13() {
                    let prec_mat = cb
                        .base_prec_mat_from_index(i11, i12, i13, i2)
                        .make_n_copies(rb_chan.num_pages());
                    let cap: f64 = self
                        .compute_capacity_for_precoders(rb_chan, std::slice::from_ref(&prec_mat))
                        .sum();
                    if best.as_ref().map_or(true, |(_, _, best_cap, _)| cap > *best_cap) {
                        best = Some((rank, i12 * num_i11 + i11, cap, prec_mat));
                    }
                }
            }
            let (rank, wb_pmi, cap, prec_mat) =
                best.expect("Rank set always yields at least one candidate");
            debug!(
                "Search-free estimation: rank {}, i1 {} (capacity {:.2})",
                rank, wb_pmi, cap
            );
            self.period_max_rank = rank;
            self.set_prec_params(
                rank,
                PrecMatParams {
                    wb_pmi,
                    sb_pmis: vec![],
                    sb_prec_mat: prec_mat,
                    perf_metric: cap,
                },
            );
        } else if pmi_update.update_sb {
            // Fall back to the regular subband search for the previously
            // found rank and wideband index
            let rank = self.period_max_rank;
            let wb_pmi = self
                .prec_params(rank)
                .expect("Subband update requires previous wideband precoders")
                .wb_pmi;
            let params = self.find_opt_subband_precoding(rb_chan, wb_pmi, rank);
            self.set_prec_params(rank, params);
        }

        self.create_cqi_for_rank(self.period_max_rank, rb_chan)
    }
}

/// First left singular vector of the transmit-port mode unfolding of the
/// channel tensor: the factor of the higher-order SVD associated with the
/// transmit-antenna dimension
fn dominant_tx_direction(sb_chan: &WhitenedChannel) -> Vec<Complex> {
    let rows = sb_chan.num_rows();
    let cols = sb_chan.num_cols();
    let pages = sb_chan.num_pages();

    // Unfold to (nTxPorts x nRxPorts*nPages)
    let unfolding = Array2::from_shape_fn((cols, rows * pages), |(t, rp)| {
        let r = rp % rows;
        let p = rp / rows;
        sb_chan[(r, t, p)]
    });
    crate::matrix::dominant_left_singular_vector(unfolding.view())
}

#[cfg(all(test, feature = "mimo"))]
mod tests {
    use super::super::testutil::{make_search, synthetic_signal, NUM_PRBS};
    use super::super::{PmiUpdate, SearchStrategy};

    #[test]
    fn test_feedback_is_well_formed() {
        let mut pm = make_search(SearchStrategy::Maleki);
        let fb = pm.create_cqi_feedback(&synthetic_signal(10.0), PmiUpdate::default());

        assert!((1..=2).contains(&fb.rank));
        assert!(fb.wb_cqi > 0);
        assert!(fb.tb_size > 0);
        assert_eq!(fb.prec_mat.num_rows(), 4);
        assert_eq!(fb.prec_mat.num_pages(), NUM_PRBS);
    }

    #[test]
    fn test_estimation_never_beats_exhaustive_search() {
        // The search-free estimate quantizes continuous phase estimates, so
        // at equal rank it cannot beat the exhaustive codebook scan
        let signal = synthetic_signal(10.0);
        let mut maleki = make_search(SearchStrategy::Maleki);
        let mut full = make_search(SearchStrategy::Full);
        let m_fb = maleki.create_cqi_feedback(&signal, PmiUpdate::default());
        let f_fb = full.create_cqi_feedback(&signal, PmiUpdate::default());
        assert!(m_fb.wb_cqi > 0);
        if m_fb.rank == f_fb.rank {
            assert!(m_fb.wb_cqi <= f_fb.wb_cqi);
        }
    }

    #[test]
    fn test_subband_update_falls_back_to_regular_search() {
        let mut pm = make_search(SearchStrategy::Maleki);
        let signal = synthetic_signal(10.0);
        let cold = pm.create_cqi_feedback(&signal, PmiUpdate::default());
        let sb_only = pm.create_cqi_feedback(
            &signal,
            PmiUpdate {
                update_wb: false,
                update_sb: true,
            },
        );
        assert_eq!(sb_only.rank, cold.rank);
        assert_eq!(sb_only.wb_pmi, cold.wb_pmi);
    }
}
