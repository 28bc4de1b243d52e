//! Precoding Matrix Search
//!
//! Given the consolidated channel and interference observation of one
//! feedback period, the search selects the MIMO rank, the wideband and
//! per-subband precoding indices, and derives the CQI/MCS/TB-size feedback.
//!
//! All strategies share one state machine across calls: on a wideband
//! update, rank and all precoding indices are re-derived from scratch; on a
//! subband-only update, the previously selected rank and wideband index are
//! kept and only the per-subband index is re-optimized; with no update, the
//! previous precoders are reused. The CQI is always recomputed against the
//! current channel, even when the PMI is stale. The first call after setup
//! always performs a full search.

mod fast;
mod full;
mod ideal;
mod maleki;
mod sasaoka;

use crate::amc::LinkAdaptation;
use crate::codebook::{Codebook, CodebookConfig, CodebookKind};
use crate::matrix::{ComplexMatrixArray, WhitenedChannel};
use crate::signal::MimoSignal;
use crate::CsiError;
use common::{AntennaPorts, SubbandSize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reduction of a group of PRBs to one representative subband page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownsamplingTechnique {
    /// Take the first PRB of each subband
    FirstPrb,
    /// Take a random PRB within each subband
    RandomPrb,
    /// Average all PRBs of each subband
    AveragePrb,
}

/// Technique used to select the MIMO rank for a feedback period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankTechnique {
    /// Numerical rank of the wideband channel via SVD with a threshold
    Svd,
    /// Rank maximizing the waterfilling capacity
    WaterFilling,
    /// Capacity-increment heuristic
    Sasaoka,
}

/// The fixed set of search strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Exhaustive search over all ranks and codebook indices
    Full,
    /// Wideband index chosen against the wideband-averaged channel only
    Fast,
    /// Codebook bypassed; per-subband optimal precoders from the SVD
    Ideal,
    /// Mutual-information metric with the capacity-increment rank rule
    Sasaoka,
    /// Search-free index estimation from a tensor decomposition
    Maleki,
}

/// Defines whether PMI values are updated or previous values are reused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PmiUpdate {
    /// Re-derive rank, wideband index, and subband indices
    pub update_wb: bool,
    /// Re-optimize only the per-subband indices
    pub update_sb: bool,
}

/// Configuration of the precoding search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmSearchConfig {
    /// Which search strategy to run
    pub strategy: SearchStrategy,
    /// Which codebook implementation to enumerate
    pub codebook: CodebookKind,
    /// Size of each subband in RBs
    pub subband_size: SubbandSize,
    /// Reject subband sizes that are not 3GPP-legal for the bandwidth
    pub enforce_subband_size: bool,
    /// How each subband is reduced to one representative PRB
    pub downsampling: DownsamplingTechnique,
    /// How the MIMO rank is selected (Fast/Sasaoka strategies)
    pub rank_technique: RankTechnique,
    /// Threshold of the rank selection technique
    pub rank_threshold: f64,
    /// Upper bound on the UE's supported rank
    pub rank_limit: u8,
    /// Clamp subband CQIs to [wbCqi - 1, wbCqi + 2], modeling the 2-bit
    /// differential CQI signaling
    pub subband_cqi_clamping: bool,
    /// Seed of the random PRB downsampling draws
    pub downsampling_seed: u64,
}

impl Default for PmSearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Full,
            codebook: CodebookKind::TypeOneSinglePanel,
            subband_size: SubbandSize::Rb1,
            enforce_subband_size: false,
            downsampling: DownsamplingTechnique::FirstPrb,
            rank_technique: RankTechnique::Svd,
            rank_threshold: 0.0,
            rank_limit: u8::MAX,
            subband_cqi_clamping: true,
            downsampling_seed: 1,
        }
    }
}

/// Result of a subband search for one rank and wideband index
#[derive(Debug, Clone)]
pub(crate) struct PrecMatParams {
    /// Wideband PMI (i1)
    pub wb_pmi: usize,
    /// Subband PMI values (i2), one per subband
    pub sb_pmis: Vec<usize>,
    /// Precoding matrix (nGnbPorts x rank x nSubbands)
    pub sb_prec_mat: ComplexMatrixArray,
    /// Performance metric (e.g. sum capacity) used to compare candidate
    /// wideband indices
    pub perf_metric: f64,
}

/// CQI/PMI/RI feedback produced once per UE per feedback period
#[derive(Debug, Clone)]
pub struct CqiFeedback {
    /// Selected MCS
    pub mcs: u8,
    /// Selected rank (number of MIMO layers)
    pub rank: u8,
    /// Wideband PMI (i1)
    pub wb_pmi: usize,
    /// Wideband CQI
    pub wb_cqi: u8,
    /// Subband CQI values
    pub sb_cqis: Vec<u8>,
    /// Subband PMI values (i2)
    pub sb_pmis: Vec<usize>,
    /// Full precoding matrix (nGnbPorts x rank x nRbs)
    pub prec_mat: ComplexMatrixArray,
    /// Expected transport block size in bytes
    pub tb_size: u32,
}

/// Per-rank search state: the codebook and the last found precoders
struct RankParams {
    codebook: Codebook,
    prec: Option<PrecMatParams>,
}

/// Precoding matrix search for one UE
///
/// Each UE owns exactly one instance; there is no shared mutable state
/// between UEs and one feedback computation runs to completion before the
/// next starts.
pub struct PmSearch {
    config: PmSearchConfig,
    n_gnb_ports: usize,
    n_rx_ports: usize,
    amc: Box<dyn LinkAdaptation>,
    /// The set of ranks for which precoders are computed (1..=maxRank)
    ranks: Vec<u8>,
    /// Per-rank state, indexed by rank - 1; bounds fixed at setup
    rank_params: Vec<RankParams>,
    /// Rank selected by the last wideband update (0 before the first)
    period_max_rank: u8,
    rng: StdRng,
}

impl PmSearch {
    /// Create a search instance for one UE
    ///
    /// Builds one codebook per rank up to
    /// `min(numUePorts, numGnbPorts, rankLimit)`; an unsupported
    /// geometry/rank combination is a configuration error.
    pub fn new(
        config: PmSearchConfig,
        gnb_ports: AntennaPorts,
        num_ue_ports: usize,
        amc: Box<dyn LinkAdaptation>,
    ) -> Result<Self, CsiError> {
        if num_ue_ports == 0 {
            return Err(CsiError::InvalidConfiguration(
                "UE must have at least one receive port".into(),
            ));
        }
        if config.rank_limit == 0 {
            return Err(CsiError::InvalidConfiguration(
                "Rank limit must be at least 1".into(),
            ));
        }
        if config.rank_technique == RankTechnique::WaterFilling && config.rank_threshold <= 0.0 {
            return Err(CsiError::InvalidConfiguration(
                "Waterfilling rank selection requires a positive threshold".into(),
            ));
        }
        let n_gnb_ports = gnb_ports.total_ports();
        if n_gnb_ports == 0 {
            return Err(CsiError::InvalidConfiguration(
                "gNB must have at least one port".into(),
            ));
        }

        let max_rank = num_ue_ports
            .min(n_gnb_ports)
            .min(config.rank_limit as usize) as u8;
        let ranks: Vec<u8> = (1..=max_rank).collect();
        let mut rank_params = Vec::with_capacity(max_rank as usize);
        for &rank in &ranks {
            let codebook = Codebook::new(CodebookConfig {
                kind: config.codebook,
                ports: gnb_ports,
                rank,
            })?;
            rank_params.push(RankParams {
                codebook,
                prec: None,
            });
        }

        let rng = StdRng::seed_from_u64(config.downsampling_seed);
        Ok(Self {
            config,
            n_gnb_ports,
            n_rx_ports: num_ue_ports,
            amc,
            ranks,
            rank_params,
            period_max_rank: 0,
            rng,
        })
    }

    /// The subband size in number of RBs
    pub fn subband_size(&self) -> usize {
        self.config.subband_size.as_rbs()
    }

    /// Create CQI feedback with the optimal rank, PMI, and CQI values
    ///
    /// The optimal rank is the one maximizing the achievable TB size when
    /// using the optimal PMI. Which PMI values are re-derived is controlled
    /// by `pmi_update`; the returned CQI always reflects the current
    /// channel.
    pub fn create_cqi_feedback(
        &mut self,
        rx_signal: &MimoSignal,
        pmi_update: PmiUpdate,
    ) -> CqiFeedback {
        assert_eq!(
            rx_signal.chan_mat.num_rows(),
            self.n_rx_ports,
            "Channel matrix has {} rows but UE has {} ports",
            rx_signal.chan_mat.num_rows(),
            self.n_rx_ports
        );
        assert_eq!(
            rx_signal.chan_mat.num_cols(),
            self.n_gnb_ports,
            "Channel matrix has {} cols but gNB has {} ports",
            rx_signal.chan_mat.num_cols(),
            self.n_gnb_ports
        );
        if self.config.enforce_subband_size {
            assert!(
                self.config.subband_size.is_legal_for(rx_signal.chan_mat.num_pages()),
                "Subband size {} is not 3GPP-legal for {} PRBs",
                self.subband_size(),
                rx_signal.chan_mat.num_pages()
            );
        }

        // Whiten the channel against the interference-plus-noise covariance
        let rb_chan = rx_signal.cov_mat.calc_intf_norm_channel(&rx_signal.chan_mat);

        let update = self.effective_update(pmi_update);
        match self.config.strategy {
            SearchStrategy::Full => self.create_cqi_feedback_full(&rb_chan, update),
            SearchStrategy::Fast => self.create_cqi_feedback_fast(&rb_chan, update),
            SearchStrategy::Ideal => self.create_cqi_feedback_ideal(&rb_chan, update),
            SearchStrategy::Sasaoka => self.create_cqi_feedback_sasaoka(&rb_chan, update),
            SearchStrategy::Maleki => self.create_cqi_feedback_maleki(&rb_chan, update),
        }
    }

    /// Force a full search on the first call of a strategy, before any
    /// precoders exist
    fn effective_update(&self, requested: PmiUpdate) -> PmiUpdate {
        let cold = match self.config.strategy {
            SearchStrategy::Full | SearchStrategy::Ideal => self
                .ranks
                .iter()
                .any(|&rank| self.prec_params(rank).is_none()),
            SearchStrategy::Fast | SearchStrategy::Sasaoka | SearchStrategy::Maleki => {
                self.period_max_rank == 0 || self.prec_params(self.period_max_rank).is_none()
            }
        };
        if cold {
            debug!("No previous precoders; forcing a wideband update");
            PmiUpdate {
                update_wb: true,
                update_sb: false,
            }
        } else {
            requested
        }
    }

    /// Partition the per-PRB channel into subbands and reduce each to one
    /// representative page using the configured technique
    pub fn subband_downsampling(&mut self, rb_chan: &WhitenedChannel) -> WhitenedChannel {
        let sb_size = self.subband_size();
        let num_prbs = rb_chan.num_pages();
        if sb_size == 1 {
            return rb_chan.clone();
        }
        let num_subbands = common::num_subbands(num_prbs, sb_size);

        let mut res =
            ComplexMatrixArray::new(rb_chan.num_rows(), rb_chan.num_cols(), num_subbands);
        for sb in 0..num_subbands {
            let start = sb * sb_size;
            let len = sb_size.min(num_prbs - start);
            match self.config.downsampling {
                DownsamplingTechnique::FirstPrb => {
                    let page = rb_chan.page(start).to_owned();
                    res.set_page(sb, &page);
                }
                DownsamplingTechnique::RandomPrb => {
                    let offset = self.rng.gen_range(0..len);
                    let page = rb_chan.page(start + offset).to_owned();
                    res.set_page(sb, &page);
                }
                DownsamplingTechnique::AveragePrb => {
                    for i in 0..rb_chan.num_rows() {
                        for j in 0..rb_chan.num_cols() {
                            let mut sum = crate::matrix::Complex::new(0.0, 0.0);
                            for p in start..start + len {
                                sum += rb_chan[(i, j, p)];
                            }
                            res[(i, j, sb)] = sum / len as f64;
                        }
                    }
                }
            }
        }
        WhitenedChannel::from_matrix(res)
    }

    /// Broadcast per-subband precoding matrices back to per-PRB pages
    /// (nearest-subband expansion, not interpolation)
    pub fn subband_upsampling(
        &self,
        prec_mat: &ComplexMatrixArray,
        num_prbs: usize,
    ) -> ComplexMatrixArray {
        if prec_mat.num_pages() == num_prbs {
            return prec_mat.clone();
        }
        let sb_size = self.subband_size();
        let num_subbands = prec_mat.num_pages();
        assert_eq!(
            num_subbands,
            common::num_subbands(num_prbs, sb_size),
            "Precoding matrix has {} pages but {} PRBs form {} subbands",
            num_subbands,
            num_prbs,
            common::num_subbands(num_prbs, sb_size)
        );
        ComplexMatrixArray::from_fn(
            prec_mat.num_rows(),
            prec_mat.num_cols(),
            num_prbs,
            |i, j, p| {
                let sb = (p / sb_size).min(num_subbands - 1);
                prec_mat[(i, j, sb)]
            },
        )
    }

    /// Select the MIMO rank for this period, bounded by
    /// `min(numUePorts, numGnbPorts, rankLimit)`
    pub fn select_rank(&self, sb_chan: &WhitenedChannel) -> u8 {
        let max_rank = *self.ranks.last().expect("Rank set is never empty");
        if max_rank == 1 {
            return 1;
        }
        let rank = match self.config.rank_technique {
            RankTechnique::Svd => sb_chan
                .wideband_channel()
                .eigen_wideband_rank(self.config.rank_threshold),
            RankTechnique::WaterFilling => sb_chan
                .wideband_channel()
                .channel_correlation()
                .waterfilling_wideband_rank(max_rank, self.config.rank_threshold),
            RankTechnique::Sasaoka => sb_chan.channel_correlation().sasaoka_wideband_rank(),
        };
        rank.clamp(1, max_rank)
    }

    /// Create the CQI feedback message for one rank from its stored
    /// precoders, recomputing the SINR against the current channel
    fn create_cqi_for_rank(&self, rank: u8, rb_chan: &WhitenedChannel) -> CqiFeedback {
        let opt_prec = self
            .prec_params(rank)
            .expect("Tried to create a CQI message but precoding matrix does not exist");

        // Upsample the subband precoding matrix to full RB resolution
        let rb_prec_mat = self.subband_upsampling(&opt_prec.sb_prec_mat, rb_chan.num_pages());

        // Recompute the SINR for the current channel (for all RBs)
        let sinr_mat = rb_chan.compute_sinr_for_precoding(&rb_prec_mat);

        // Determine the achievable MCS, CQI values, and TB size
        let mut mcs_params = self.amc.max_mcs_params(&sinr_mat, self.subband_size());

        // Clamp subband CQI according to the 3GPP 2-bit overhead limit
        if self.config.subband_cqi_clamping {
            for sb_cqi in &mut mcs_params.sb_cqis {
                let diff = *sb_cqi as i32 - mcs_params.wb_cqi as i32;
                if diff > 2 {
                    *sb_cqi = mcs_params.wb_cqi + 2;
                } else if diff < -1 {
                    *sb_cqi = mcs_params.wb_cqi - 1;
                }
            }
        }

        CqiFeedback {
            mcs: mcs_params.mcs,
            rank,
            wb_pmi: opt_prec.wb_pmi,
            wb_cqi: mcs_params.wb_cqi,
            sb_cqis: mcs_params.sb_cqis,
            sb_pmis: opt_prec.sb_pmis.clone(),
            prec_mat: rb_prec_mat,
            tb_size: mcs_params.tb_size,
        }
    }

    fn codebook(&self, rank: u8) -> &Codebook {
        assert!(
            rank >= 1 && rank as usize <= self.rank_params.len(),
            "Rank {} outside the configured range 1..={}",
            rank,
            self.rank_params.len()
        );
        &self.rank_params[rank as usize - 1].codebook
    }

    fn prec_params(&self, rank: u8) -> Option<&PrecMatParams> {
        if rank == 0 || rank as usize > self.rank_params.len() {
            return None;
        }
        self.rank_params[rank as usize - 1].prec.as_ref()
    }

    fn set_prec_params(&mut self, rank: u8, params: PrecMatParams) {
        assert!(
            rank >= 1 && rank as usize <= self.rank_params.len(),
            "Rank {} outside the configured range 1..={}",
            rank,
            self.rank_params.len()
        );
        self.rank_params[rank as usize - 1].prec = Some(params);
    }
}

#[cfg(all(test, feature = "mimo"))]
pub(crate) mod testutil {
    use super::*;
    use crate::amc::Amc;
    use crate::matrix::{Complex, CovMat};
    use crate::signal::MimoSignalChunk;
    use common::Rnti;
    use std::time::Duration;

    pub(crate) const NUM_PRBS: usize = 12;

    /// Deterministic full-rank channel: two clearly separated spatial
    /// directions with per-PRB phase progression, scaled by `gain`
    pub(crate) fn synthetic_signal(gain: f64) -> MimoSignal {
        let chan_mat = ComplexMatrixArray::from_fn(2, 4, NUM_PRBS, |i, j, p| {
            let phase =
                2.0 * std::f64::consts::PI * ((i + 1) * j) as f64 / 8.0 + 0.05 * p as f64;
            let amplitude = gain * if i == 0 { 1.0 } else { 0.8 };
            amplitude * Complex::new(phase.cos(), phase.sin())
        });
        let mut interf_cov = CovMat::new(2, NUM_PRBS);
        interf_cov.add_white_noise(1.0);
        let chunk = MimoSignalChunk {
            chan_mat,
            interf_cov,
            rnti: Rnti::new(1),
            duration: Duration::from_millis(1),
        };
        MimoSignal::new(&[chunk])
    }

    /// A 4-port dual-polarized gNB and a 2-port UE over 12 PRBs with
    /// 4-RB subbands
    pub(crate) fn make_search(strategy: SearchStrategy) -> PmSearch {
        let config = PmSearchConfig {
            strategy,
            subband_size: SubbandSize::Rb4,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amc::Amc;
    use crate::matrix::Complex;
    use approx::assert_relative_eq;

    fn make_search(subband_size: SubbandSize, technique: DownsamplingTechnique) -> PmSearch {
        let config = PmSearchConfig {
            subband_size,
            downsampling: technique,
            ..Default::default()
        };
        PmSearch::new(
            config,
            AntennaPorts::new(2, 1, false),
            2,
            Box::new(Amc::default()),
        )
        .unwrap()
    }

    fn ramp_channel(num_prbs: usize) -> WhitenedChannel {
        WhitenedChannel::from_matrix(ComplexMatrixArray::from_fn(2, 2, num_prbs, |i, j, p| {
            Complex::new(p as f64, (i + j) as f64)
        }))
    }

    #[test]
    fn test_downsampling_dimensions() {
        for (num_prbs, sb_size, expected) in [
            (10usize, SubbandSize::Rb4, 3usize),
            (8, SubbandSize::Rb4, 2),
            (273, SubbandSize::Rb16, 18),
            (12, SubbandSize::Rb1, 12),
        ] {
            let mut pm = make_search(sb_size, DownsamplingTechnique::FirstPrb);
            let down = pm.subband_downsampling(&ramp_channel(num_prbs));
            assert_eq!(down.num_rows(), 2, "Rows must match");
            assert_eq!(down.num_cols(), 2, "Cols must match");
            assert_eq!(down.num_pages(), expected, "Pages must match after downsampling");
        }
    }

    /// With the FirstPrb technique, subband boundaries at {0, 4, 8} must be
    /// copied literally
    #[test]
    fn test_downsampling_first_prb_values() {
        let mut pm = make_search(SubbandSize::Rb4, DownsamplingTechnique::FirstPrb);
        let down = pm.subband_downsampling(&ramp_channel(10));
        for (sb, prb) in [(0usize, 0usize), (1, 4), (2, 8)] {
            assert_relative_eq!(down[(0, 0, sb)].re, prb as f64);
        }
    }

    #[test]
    fn test_downsampling_average_prb_values() {
        let mut pm = make_search(SubbandSize::Rb4, DownsamplingTechnique::AveragePrb);
        let down = pm.subband_downsampling(&ramp_channel(10));
        // Group means of the page ramp: {0..3} -> 1.5, {4..7} -> 5.5, {8, 9} -> 8.5
        assert_relative_eq!(down[(0, 0, 0)].re, 1.5);
        assert_relative_eq!(down[(0, 0, 1)].re, 5.5);
        assert_relative_eq!(down[(0, 0, 2)].re, 8.5);
    }

    #[test]
    fn test_downsampling_random_prb_stays_in_group() {
        let mut pm = make_search(SubbandSize::Rb4, DownsamplingTechnique::RandomPrb);
        let down = pm.subband_downsampling(&ramp_channel(10));
        // The ramp encodes the PRB index in the real part
        let group_ranges = [(0.0, 3.0), (4.0, 7.0), (8.0, 9.0)];
        for (sb, (lo, hi)) in group_ranges.iter().enumerate() {
            let v = down[(0, 0, sb)].re;
            assert!(v >= *lo && v <= *hi, "Subband {} drew PRB {} outside its group", sb, v);
        }
    }

    /// Downsampling followed by upsampling restores the original shape, and
    /// FirstPrb makes PRB p carry the value of PRB floor(p/sbSize)*sbSize
    #[test]
    fn test_down_up_round_trip() {
        let num_prbs = 10;
        let mut pm = make_search(SubbandSize::Rb4, DownsamplingTechnique::FirstPrb);
        let down = pm.subband_downsampling(&ramp_channel(num_prbs));
        let up = pm.subband_upsampling(&down, num_prbs);
        assert_eq!(up.num_rows(), 2);
        assert_eq!(up.num_cols(), 2);
        assert_eq!(up.num_pages(), num_prbs);
        for p in 0..num_prbs {
            let source_prb = (p / 4) * 4;
            assert_relative_eq!(up[(0, 0, p)].re, source_prb as f64);
        }
    }

    #[test]
    fn test_upsampling_identity_at_rb_resolution() {
        let pm = make_search(SubbandSize::Rb4, DownsamplingTechnique::FirstPrb);
        let prec = ComplexMatrixArray::from_fn(2, 1, 10, |_, _, p| Complex::new(p as f64, 0.0));
        let up = pm.subband_upsampling(&prec, 10);
        assert_eq!(up, prec);
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let bad_rank_limit = PmSearchConfig {
            rank_limit: 0,
            ..Default::default()
        };
        assert!(PmSearch::new(
            bad_rank_limit,
            AntennaPorts::new(2, 1, false),
            2,
            Box::new(Amc::default())
        )
        .is_err());

        let bad_waterfilling = PmSearchConfig {
            rank_technique: RankTechnique::WaterFilling,
            rank_threshold: 0.0,
            ..Default::default()
        };
        assert!(PmSearch::new(
            bad_waterfilling,
            AntennaPorts::new(2, 1, false),
            2,
            Box::new(Amc::default())
        )
        .is_err());
    }

    #[test]
    #[should_panic(expected = "not 3GPP-legal")]
    fn test_enforced_subband_size_panics_on_mismatch() {
        let config = PmSearchConfig {
            subband_size: SubbandSize::Rb4,
            enforce_subband_size: true,
            ..Default::default()
        };
        let mut pm = PmSearch::new(
            config,
            AntennaPorts::new(2, 1, false),
            2,
            Box::new(Amc::default()),
        )
        .unwrap();

        // 10 PRBs only allow subband size 1
        let chunk = crate::signal::MimoSignalChunk {
            chan_mat: ComplexMatrixArray::from_fn(2, 2, 10, |_, _, _| Complex::new(1.0, 0.0)),
            interf_cov: {
                let mut cov = crate::matrix::CovMat::new(2, 10);
                cov.add_white_noise(1.0);
                cov
            },
            rnti: common::Rnti::new(1),
            duration: std::time::Duration::from_millis(1),
        };
        let signal = MimoSignal::new(&[chunk]);
        let _ = pm.create_cqi_feedback(&signal, PmiUpdate::default());
    }
}
