//! Adaptive Modulation and Coding
//!
//! Maps per-layer-per-RB SINR values into {MCS, wideband CQI, subband CQIs,
//! transport block size}. The precoding search treats this mapping as an
//! injected policy: any [`LinkAdaptation`] implementation can be supplied.
//! The default [`Amc`] uses a Shannon-gap model: the achievable spectral
//! efficiency is `log2(1 + sinr / gamma)` with the SNR gap
//! `gamma = -ln(5 * BER) / 1.5`.

use crate::matrix::SinrMatrix;
use crate::mcs_tables::{self, McsTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of subcarriers in one resource block
const SUBCARRIERS_PER_RB: u32 = 12;
/// CRC length attached to a transport block, in bytes
const CRC_LEN_BYTES: u32 = 24 / 8;

/// Link adaptation result for one SINR matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McsParams {
    /// Selected MCS index
    pub mcs: u8,
    /// Wideband CQI (0 means the link cannot be sustained)
    pub wb_cqi: u8,
    /// One CQI value per subband
    pub sb_cqis: Vec<u8>,
    /// Achievable transport block size in bytes
    pub tb_size: u32,
}

/// Maps an SINR matrix into MCS/CQI/TB-size feedback
pub trait LinkAdaptation {
    /// Find the maximum supportable MCS and the corresponding CQI values
    /// for an SINR matrix, with one subband CQI per `subband_size` RBs
    fn max_mcs_params(&self, sinr_mat: &SinrMatrix, subband_size: usize) -> McsParams;
}

/// Configuration of the Shannon-gap AMC model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmcConfig {
    /// Target BER defining the SNR gap (default 0.00005)
    pub ber: f64,
    /// MCS/CQI table family to use
    pub mcs_table: McsTable,
    /// Subcarriers per RB carrying reference signals instead of data
    pub num_ref_sc_per_rb: u8,
}

impl Default for AmcConfig {
    fn default() -> Self {
        Self {
            ber: 0.00005,
            mcs_table: McsTable::Table2,
            num_ref_sc_per_rb: 1,
        }
    }
}

/// Shannon-gap adaptive modulation and coding model
#[derive(Debug, Clone)]
pub struct Amc {
    config: AmcConfig,
    /// SNR gap to capacity for the configured BER
    gamma: f64,
}

impl Amc {
    /// Create an AMC model from its configuration
    pub fn new(config: AmcConfig) -> Self {
        assert!(
            config.ber > 0.0 && config.ber < 0.2,
            "BER target must be in (0, 0.2)"
        );
        assert!(
            (config.num_ref_sc_per_rb as u32) < SUBCARRIERS_PER_RB,
            "Reference subcarriers must leave room for data"
        );
        let gamma = -(5.0 * config.ber).ln() / 1.5;
        Self { config, gamma }
    }

    /// Spectral efficiency achievable at the given linear SINR
    pub fn spectral_efficiency(&self, sinr: f64) -> f64 {
        (1.0 + sinr / self.gamma).log2()
    }

    /// Largest CQI whose spectral efficiency does not exceed `se`
    pub fn cqi_from_spectral_efficiency(&self, se: f64) -> u8 {
        assert!(se >= 0.0, "negative spectral efficiency = {}", se);
        let table = mcs_tables::spectral_efficiency_cqi_table(self.config.mcs_table);
        let mut cqi = 0;
        while cqi < 15 && table[cqi + 1] < se {
            cqi += 1;
        }
        cqi as u8
    }

    /// Largest MCS whose spectral efficiency does not exceed `se`
    pub fn mcs_from_spectral_efficiency(&self, se: f64) -> u8 {
        assert!(se >= 0.0, "negative spectral efficiency = {}", se);
        let table = mcs_tables::spectral_efficiency_mcs_table(self.config.mcs_table);
        let mut mcs = 0;
        while mcs + 1 < table.len() && table[mcs + 1] < se {
            mcs += 1;
        }
        mcs as u8
    }

    /// MCS corresponding to a CQI value
    pub fn mcs_from_cqi(&self, cqi: u8) -> u8 {
        assert!(cqi <= 15, "CQI must be in [0..15], got {}", cqi);
        let se = mcs_tables::spectral_efficiency_for_cqi(cqi, self.config.mcs_table);
        let table = mcs_tables::spectral_efficiency_mcs_table(self.config.mcs_table);
        let mut mcs = 0;
        while mcs + 1 < table.len() && table[mcs + 1] <= se {
            mcs += 1;
        }
        mcs as u8
    }

    /// Payload in bytes carried by `nprb` RBs over `rank` layers at the
    /// given MCS, with the transport block CRC subtracted
    pub fn payload_size_bytes(&self, mcs: u8, nprb: u32, rank: u8) -> u32 {
        assert!(
            mcs <= mcs_tables::max_mcs(self.config.mcs_table),
            "MCS {} exceeds maximum of the configured table",
            mcs
        );
        let useful_sc = SUBCARRIERS_PER_RB - self.config.num_ref_sc_per_rb as u32;
        let num_re = useful_sc * nprb * rank as u32;
        let se = mcs_tables::spectral_efficiency_for_mcs(mcs, self.config.mcs_table);
        let payload = (se * num_re as f64 / 8.0).floor() as u32;
        payload.saturating_sub(CRC_LEN_BYTES)
    }
}

impl Default for Amc {
    fn default() -> Self {
        Self::new(AmcConfig::default())
    }
}

impl LinkAdaptation for Amc {
    fn max_mcs_params(&self, sinr_mat: &SinrMatrix, subband_size: usize) -> McsParams {
        assert!(subband_size > 0, "Subband size must not be 0");
        let rank = sinr_mat.rank() as usize;
        let num_rbs = sinr_mat.num_rbs();
        let num_subbands = num_rbs.div_ceil(subband_size);

        // Per-subband mean spectral efficiency over all layers; zero-SINR
        // entries carry no signal and are skipped
        let mut sb_cqis = Vec::with_capacity(num_subbands);
        let mut wb_se_sum = 0.0;
        let mut wb_count = 0usize;
        for sb in 0..num_subbands {
            let rb_start = sb * subband_size;
            let rb_end = (rb_start + subband_size).min(num_rbs);
            let mut se_sum = 0.0;
            let mut count = 0usize;
            for rb in rb_start..rb_end {
                for layer in 0..rank {
                    let sinr = sinr_mat[(layer, rb)];
                    if sinr > 0.0 {
                        se_sum += self.spectral_efficiency(sinr);
                        count += 1;
                    }
                }
            }
            wb_se_sum += se_sum;
            wb_count += count;
            let sb_cqi = if count == 0 {
                0
            } else {
                self.cqi_from_spectral_efficiency(se_sum / count as f64)
            };
            sb_cqis.push(sb_cqi);
        }

        if wb_count == 0 {
            return McsParams {
                mcs: 0,
                wb_cqi: 0,
                sb_cqis,
                tb_size: 0,
            };
        }

        let wb_se = wb_se_sum / wb_count as f64;
        let wb_cqi = self.cqi_from_spectral_efficiency(wb_se);
        let mcs = self.mcs_from_spectral_efficiency(wb_se);
        let tb_size = if wb_cqi == 0 {
            0
        } else {
            self.payload_size_bytes(mcs, num_rbs as u32, rank as u8)
        };

        debug!(
            "AMC: rank {} over {} RBs -> wbCqi {}, MCS {}, TBS {} bytes",
            rank, num_rbs, wb_cqi, mcs, tb_size
        );

        McsParams {
            mcs,
            wb_cqi,
            sb_cqis,
            tb_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gamma_from_ber() {
        let amc = Amc::default();
        assert_relative_eq!(amc.gamma, -(5.0 * 0.00005_f64).ln() / 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cqi_mcs_scan_boundaries() {
        let amc = Amc::default();
        assert_eq!(amc.cqi_from_spectral_efficiency(0.0), 0);
        assert_eq!(amc.cqi_from_spectral_efficiency(100.0), 15);
        assert_eq!(amc.mcs_from_spectral_efficiency(100.0), 27);
        // Just below the CQI-1 entry of Table 2 (0.15)
        assert_eq!(amc.cqi_from_spectral_efficiency(0.14), 0);
        assert_eq!(amc.cqi_from_spectral_efficiency(0.16), 1);
    }

    #[test]
    fn test_mcs_from_cqi_monotonic() {
        let amc = Amc::default();
        let mut prev = 0;
        for cqi in 0..=15 {
            let mcs = amc.mcs_from_cqi(cqi);
            assert!(mcs >= prev);
            prev = mcs;
        }
        assert_eq!(amc.mcs_from_cqi(0), 0);
    }

    #[test]
    fn test_payload_scales_with_rank_and_rbs() {
        let amc = Amc::default();
        let one = amc.payload_size_bytes(10, 50, 1);
        let two = amc.payload_size_bytes(10, 50, 2);
        let wide = amc.payload_size_bytes(10, 100, 1);
        assert!(two > one);
        assert!(wide > one);
    }

    #[test]
    fn test_max_mcs_params_uniform_sinr() {
        let amc = Amc::default();
        let sinr = SinrMatrix::from_fn(2, 8, |_, _| 100.0);
        let params = amc.max_mcs_params(&sinr, 4);
        assert_eq!(params.sb_cqis.len(), 2);
        assert_eq!(params.sb_cqis[0], params.wb_cqi);
        assert!(params.wb_cqi > 0);
        assert!(params.tb_size > 0);
    }

    #[test]
    fn test_max_mcs_params_zero_sinr_is_cqi0() {
        let amc = Amc::default();
        let sinr = SinrMatrix::new(2, 8);
        let params = amc.max_mcs_params(&sinr, 4);
        assert_eq!(params.wb_cqi, 0);
        assert_eq!(params.mcs, 0);
        assert_eq!(params.tb_size, 0);
        assert!(params.sb_cqis.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_higher_sinr_never_lowers_the_feedback() {
        let amc = Amc::default();
        let mut prev_tbs = 0;
        let mut prev_cqi = 0;
        for sinr_db in [-10.0, 0.0, 10.0, 20.0, 30.0] {
            let sinr_lin = common::db_to_lin(sinr_db);
            let sinr = SinrMatrix::from_fn(1, 10, |_, _| sinr_lin);
            let params = amc.max_mcs_params(&sinr, 4);
            assert!(params.wb_cqi >= prev_cqi);
            assert!(params.tb_size >= prev_tbs);
            prev_cqi = params.wb_cqi;
            prev_tbs = params.tb_size;
        }
    }
}
