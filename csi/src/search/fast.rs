//! Two-Stage Precoding Search
//!
//! Avoids the exhaustive per-subband search while scanning wideband indices:
//! the rank is chosen by the configured rank-selection technique, the
//! wideband index i1 is chosen against the wideband-averaged channel only
//! (a single page), and the expensive per-subband i2 search runs once, for
//! the winning i1.

use super::{CqiFeedback, PmSearch, PmiUpdate};
use crate::matrix::WhitenedChannel;
use tracing::debug;

impl PmSearch {
    pub(super) fn create_cqi_feedback_fast(
        &mut self,
        rb_chan: &WhitenedChannel,
        pmi_update: PmiUpdate,
    ) -> CqiFeedback {
        let sb_chan = self.subband_downsampling(rb_chan);

        if pmi_update.update_wb {
            let rank = self.select_rank(&sb_chan);
            self.period_max_rank = rank;

            // Stage one: scan i1 on the wideband-averaged channel, where
            // the subband search degenerates to a single page
            let wb_chan = sb_chan.wideband_channel();
            let num_i1 = self.codebook(rank).num_i1();
            let mut best_i1 = 0;
            let mut best_metric = f64::NEG_INFINITY;
            for i1 in 0..num_i1 {
                let params = self.find_opt_subband_precoding(&wb_chan, i1, rank);
                if params.perf_metric > best_metric {
                    best_i1 = i1;
                    best_metric = params.perf_metric;
                }
            }
            debug!(
                "Fast search: rank {}, wideband i1 {} of {}",
                rank, best_i1, num_i1
            );

            // Stage two: full subband i2 search only for the winning i1
            let params = self.find_opt_subband_precoding(&sb_chan, best_i1, rank);
            self.set_prec_params(rank, params);
        } else if pmi_update.update_sb {
            let rank = self.period_max_rank;
            let wb_pmi = self
                .prec_params(rank)
                .expect("Subband update requires previous wideband precoders")
                .wb_pmi;
            let params = self.find_opt_subband_precoding(&sb_chan, wb_pmi, rank);
            self.set_prec_params(rank, params);
        }

        self.create_cqi_for_rank(self.period_max_rank, rb_chan)
    }
}
