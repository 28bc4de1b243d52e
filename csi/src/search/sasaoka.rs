//! Mutual-Information Precoding Search
//!
//! Same wideband/subband loop structure as the exhaustive search, but the
//! per-subband metric is the closed-form mutual information
//! `log2 det(I + P^H * Hcorr * P)` on the channel correlation, and the rank
//! is fixed per period by the capacity-increment rule instead of being
//! searched over.

use super::{CqiFeedback, PmSearch, PmiUpdate, PrecMatParams};
use crate::matrix::{ComplexMatrixArray, WhitenedChannel};
use tracing::debug;

impl PmSearch {
    pub(super) fn create_cqi_feedback_sasaoka(
        &mut self,
        rb_chan: &WhitenedChannel,
        pmi_update: PmiUpdate,
    ) -> CqiFeedback {
        let sb_chan = self.subband_downsampling(rb_chan);

        if pmi_update.update_wb {
            let rank = self.select_rank(&sb_chan);
            self.period_max_rank = rank;
            debug!("Mutual-information search: rank {} for this period", rank);

            let num_i1 = self.codebook(rank).num_i1();
            let mut opt: Option<PrecMatParams> = None;
            for i1 in 0..num_i1 {
                let params = self.find_opt_subband_precoding_mi(&sb_chan, i1, rank);
                if opt
                    .as_ref()
                    .map_or(true, |best| params.perf_metric > best.perf_metric)
                {
                    opt = Some(params);
                }
            }
            self.set_prec_params(rank, opt.expect("Codebook enumerates at least one i1"));
        } else if pmi_update.update_sb {
            let rank = self.period_max_rank;
            let wb_pmi = self
                .prec_params(rank)
                .expect("Subband update requires previous wideband precoders")
                .wb_pmi;
            let params = self.find_opt_subband_precoding_mi(&sb_chan, wb_pmi, rank);
            self.set_prec_params(rank, params);
        }

        self.create_cqi_for_rank(self.period_max_rank, rb_chan)
    }

    /// Find the optimal subband precoding for a fixed wideband index using
    /// the mutual-information metric
    fn find_opt_subband_precoding_mi(
        &self,
        sb_chan: &WhitenedChannel,
        i1: usize,
        rank: u8,
    ) -> PrecMatParams {
        // Channel correlation shared by all candidate precoders
        let h_corr = sb_chan.channel_correlation();

        let cb = self.codebook(rank);
        let num_i2 = cb.num_i2();
        let num_subbands = sb_chan.num_pages();

        // Per subband: the best (i2, metric, precoder) seen so far
        let mut max_i2s: Vec<Option<(usize, f64, ComplexMatrixArray)>> = vec![None; num_subbands];
        for i2 in 0..num_i2 {
            let base_prec_mat = cb.base_prec_mat(i1, i2);
            let extended = base_prec_mat.make_n_copies(num_subbands);

            // Mutual information of all subbands at once:
            // det(I + P^H * Hcorr * P) per page
            let gram = extended.hermitian_transpose().matmul(&h_corr).matmul(&extended);
            let det = add_identity(&gram).determinants();

            for sb in 0..num_subbands {
                let mi = det[sb].norm().max(0.0).log2();
                if max_i2s[sb].as_ref().map_or(true, |(_, best, _)| mi > *best) {
                    max_i2s[sb] = Some((i2, mi, base_prec_mat.clone()));
                }
            }
        }

        // Assemble the per-subband winners into the full W1*W2 matrix
        let winners: Vec<(usize, f64, ComplexMatrixArray)> = max_i2s
            .into_iter()
            .map(|w| w.expect("Every subband sees at least one candidate"))
            .collect();
        let pages: Vec<ComplexMatrixArray> = winners.iter().map(|w| w.2.clone()).collect();
        let complete_prec_mat = ComplexMatrixArray::from_pages(&pages);

        // Mutual information of the assembled precoder over the whole band
        let gram = complete_prec_mat
            .hermitian_transpose()
            .matmul(&h_corr)
            .matmul(&complete_prec_mat);
        let det = add_identity(&gram).determinants();
        let mi: f64 = det.iter().map(|d| d.norm().log2()).sum();

        PrecMatParams {
            wb_pmi: i1,
            sb_pmis: winners.iter().map(|w| w.0).collect(),
            sb_prec_mat: complete_prec_mat,
            perf_metric: mi,
        }
    }
}

/// `I + m`, page-wise
fn add_identity(m: &ComplexMatrixArray) -> ComplexMatrixArray {
    let eye = ComplexMatrixArray::identity(m.num_rows(), m.num_pages());
    ComplexMatrixArray::from_fn(m.num_rows(), m.num_cols(), m.num_pages(), |i, j, p| {
        m[(i, j, p)] + eye[(i, j, p)]
    })
}

#[cfg(all(test, feature = "mimo"))]
mod tests {
    use super::super::testutil::{make_search, synthetic_signal, NUM_PRBS};
    use super::super::{PmSearchConfig, PmiUpdate, RankTechnique, SearchStrategy};
    use crate::amc::Amc;
    use crate::PmSearch;
    use common::{AntennaPorts, SubbandSize};

    fn make_sasaoka() -> PmSearch {
        let config = PmSearchConfig {
            strategy: SearchStrategy::Sasaoka,
            subband_size: SubbandSize::Rb4,
            rank_technique: RankTechnique::Sasaoka,
            ..Default::default()
        };
        PmSearch::new(
            config,
            AntennaPorts::new(2, 1, true),
            2,
            Box::new(Amc::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_feedback_is_well_formed() {
        let mut pm = make_sasaoka();
        let fb = pm.create_cqi_feedback(&synthetic_signal(10.0), PmiUpdate::default());

        assert!((1..=2).contains(&fb.rank));
        assert!(fb.wb_pmi < pm.codebook(fb.rank).num_i1());
        assert!(fb.wb_cqi > 0);
        assert!(fb.tb_size > 0);
        assert_eq!(fb.prec_mat.num_pages(), NUM_PRBS);
        assert_eq!(fb.sb_pmis.len(), 3);
    }

    #[test]
    fn test_mi_metric_tracks_capacity_metric() {
        // The mutual-information metric ranks precoders like the MMSE
        // capacity on a well-conditioned channel, up to CQI quantization
        let signal = synthetic_signal(5.0);
        let mut sasaoka = make_sasaoka();
        let mut full = make_search(SearchStrategy::Full);
        let s_fb = sasaoka.create_cqi_feedback(&signal, PmiUpdate::default());
        let f_fb = full.create_cqi_feedback(&signal, PmiUpdate::default());
        if s_fb.rank == f_fb.rank {
            assert!((s_fb.wb_cqi as i32 - f_fb.wb_cqi as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_subband_update_keeps_rank_and_wideband_pmi() {
        let mut pm = make_sasaoka();
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
