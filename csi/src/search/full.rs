//! Exhaustive Precoding Search
//!
//! Loops over all ranks and, when a PMI update is requested, over every
//! wideband index i1 and every subband index i2 of the codebook. Per
//! subband, the i2 maximizing the Shannon capacity is kept; per rank, the i1
//! with the largest summed capacity wins; among ranks, the one with the
//! largest achievable TB size is reported.

use super::{CqiFeedback, PmSearch, PmiUpdate, PrecMatParams};
use crate::matrix::{ComplexMatrixArray, WhitenedChannel};
use ndarray::Array2;
use tracing::debug;

impl PmSearch {
    pub(super) fn create_cqi_feedback_full(
        &mut self,
        rb_chan: &WhitenedChannel,
        pmi_update: PmiUpdate,
    ) -> CqiFeedback {
        // Update the stored precoders if an update was requested
        self.conditionally_update_precoding(rb_chan, pmi_update);

        // Apply each rank's optimal precoder to the current channel and
        // create a CQI candidate; skip higher ranks as soon as one cannot
        // sustain the link, but always keep at least one candidate
        let mut candidates: Vec<CqiFeedback> = vec![];
        for &rank in &self.ranks {
            let cqi_msg = self.create_cqi_for_rank(rank, rb_chan);
            let link_lost = cqi_msg.wb_cqi == 0;
            candidates.push(cqi_msg);
            if link_lost {
                if candidates.len() >= 2 {
                    candidates.pop();
                }
                break;
            }
        }

        // The rank with the largest expected TB size wins; the first such
        // rank on a tie
        let mut best = 0;
        for (idx, cand) in candidates.iter().enumerate() {
            if cand.tb_size > candidates[best].tb_size {
                best = idx;
            }
        }
        debug!(
            "Full search selected rank {} (TBS {} bytes)",
            candidates[best].rank, candidates[best].tb_size
        );
        candidates.swap_remove(best)
    }

    /// Update the wideband and/or subband PMI, or neither
    fn conditionally_update_precoding(
        &mut self,
        rb_chan: &WhitenedChannel,
        pmi_update: PmiUpdate,
    ) {
        if pmi_update.update_wb {
            self.update_all_precoding(rb_chan);
        } else if pmi_update.update_sb {
            self.update_subband_precoding(rb_chan);
        }
    }

    /// For all ranks, re-derive the optimal wideband and subband precoders
    fn update_all_precoding(&mut self, rb_chan: &WhitenedChannel) {
        let sb_chan = self.subband_downsampling(rb_chan);
        for rank in self.ranks.clone() {
            // Loop over the wideband precoding indices i1 and keep the
            // parameters with the best summed capacity
            let num_i1 = self.codebook(rank).num_i1();
            let mut opt: Option<PrecMatParams> = None;
            for i1 in 0..num_i1 {
                let params = self.find_opt_subband_precoding(&sb_chan, i1, rank);
                if opt
                    .as_ref()
                    .map_or(true, |best| params.perf_metric > best.perf_metric)
                {
                    opt = Some(params);
                }
            }
            self.set_prec_params(rank, opt.expect("Codebook enumerates at least one i1"));
        }
    }

    /// For all ranks, re-optimize the subband PMI for the previously found
    /// wideband PMI
    fn update_subband_precoding(&mut self, rb_chan: &WhitenedChannel) {
        let sb_chan = self.subband_downsampling(rb_chan);
        for rank in self.ranks.clone() {
            let wb_pmi = self
                .prec_params(rank)
                .expect("Subband update requires previous wideband precoders")
                .wb_pmi;
            let params = self.find_opt_subband_precoding(&sb_chan, wb_pmi, rank);
            self.set_prec_params(rank, params);
        }
    }

    /// Find the optimal subband precoding for a fixed wideband index
    ///
    /// Evaluates every subband index i2 on every subband and assembles the
    /// per-subband winners into one precoding matrix.
    pub(super) fn find_opt_subband_precoding(
        &self,
        sb_chan: &WhitenedChannel,
        i1: usize,
        rank: u8,
    ) -> PrecMatParams {
        let num_subbands = sb_chan.num_pages();
        let all_prec_mats = self.create_subband_precoders(i1, rank, num_subbands);
        let subband_metric = self.compute_capacity_for_precoders(sb_chan, &all_prec_mats);
        let num_i2 = all_prec_mats.len();

        let mut sb_pmis = vec![0usize; num_subbands];
        let mut opt_subband_metric = vec![0.0f64; num_subbands];
        let mut opt_prec_mat = all_prec_mats[0].clone();
        for sb in 0..num_subbands {
            // The optimal subband PMI value for this subband
            for i2 in 0..num_i2 {
                if subband_metric[(sb, i2)] > opt_subband_metric[sb] {
                    sb_pmis[sb] = i2;
                    opt_subband_metric[sb] = subband_metric[(sb, i2)];
                }
            }
            for i in 0..opt_prec_mat.num_rows() {
                for j in 0..opt_prec_mat.num_cols() {
                    opt_prec_mat[(i, j, sb)] = all_prec_mats[sb_pmis[sb]][(i, j, sb)];
                }
            }
        }
        let wideband_metric: f64 = opt_subband_metric.iter().sum();

        PrecMatParams {
            wb_pmi: i1,
            sb_pmis,
            sb_prec_mat: opt_prec_mat,
            perf_metric: wideband_metric,
        }
    }

    /// All candidate subband precoding matrices for a fixed i1 and rank,
    /// one entry per i2, each broadcast over all subbands
    fn create_subband_precoders(
        &self,
        i1: usize,
        rank: u8,
        num_subbands: usize,
    ) -> Vec<ComplexMatrixArray> {
        let cb = self.codebook(rank);
        (0..cb.num_i2())
            .map(|i2| cb.base_prec_mat(i1, i2).make_n_copies(num_subbands))
            .collect()
    }

    /// Shannon capacity of each candidate precoder on each subband:
    /// a (numSubbands x numI2) matrix of sum log2(1 + SINR) over the layers
    pub(super) fn compute_capacity_for_precoders(
        &self,
        sb_chan: &WhitenedChannel,
        all_prec_mats: &[ComplexMatrixArray],
    ) -> Array2<f64> {
        let num_subbands = sb_chan.num_pages();
        let num_i2 = all_prec_mats.len();
        let mut subband_cap = Array2::zeros((num_subbands, num_i2));
        for (i2, sb_prec_mat) in all_prec_mats.iter().enumerate() {
            let sinr = sb_chan.compute_sinr_for_precoding(sb_prec_mat);
            for sb in 0..num_subbands {
                let mut cap = 0.0;
                for layer in 0..sinr.rank() as usize {
                    cap += (1.0 + sinr[(layer, sb)]).log2();
                }
                subband_cap[(sb, i2)] = cap;
            }
        }
        subband_cap
    }
}
