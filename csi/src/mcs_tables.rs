//! MCS and CQI Tables per 3GPP TS 38.214
//!
//! Static MCS-to-modulation-order, MCS-to-code-rate, and CQI-to-spectral-
//! efficiency mappings. Two MCS tables are supported:
//! - Table 1: TS 38.214 Table 5.1.3.1-1 (up to 64QAM, MCS 0-28)
//! - Table 2: TS 38.214 Table 5.1.3.1-2 (up to 256QAM, MCS 0-27)
//!
//! The CQI tables are TS 38.214 Tables 5.2.2.1-2 and 5.2.2.1-3. Table
//! mismatches against the published standard are bugs; the values below are
//! transcriptions, not targets for tuning.

use serde::{Deserialize, Serialize};

/// Selects between the 64QAM and 256QAM table families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McsTable {
    /// TS 38.214 Tables 5.1.3.1-1 / 5.2.2.1-2 (up to 64QAM)
    Table1,
    /// TS 38.214 Tables 5.1.3.1-2 / 5.2.2.1-3 (up to 256QAM)
    Table2,
}

/// Modulation orders (Q_m) for MCS Table 1 (TS 38.214 Table 5.1.3.1-1)
const MCS_M_TABLE1: [u8; 29] = [
    // QPSK (Q_m = 2)
    2, 2, 2, 2, 2, 2, 2, 2, 2, 2, //
    // 16QAM (Q_m = 4)
    4, 4, 4, 4, 4, 4, 4, //
    // 64QAM (Q_m = 6)
    6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
];

/// Effective code rates for MCS Table 1, as R*1024/1024 rounded to two
/// decimal places (e.g. MCS 0 has R*1024 = 120, so ECR = 0.12)
const MCS_ECR_TABLE1: [f64; 29] = [
    // QPSK (Q_m = 2): MCS 0-9
    0.12, 0.15, 0.19, 0.25, 0.30, 0.37, 0.44, 0.51, 0.59, 0.66, //
    // 16QAM (Q_m = 4): MCS 10-16
    0.33, 0.37, 0.42, 0.48, 0.54, 0.60, 0.64, //
    // 64QAM (Q_m = 6): MCS 17-28
    0.43, 0.46, 0.50, 0.55, 0.60, 0.65, 0.70, 0.75, 0.80, 0.85, 0.89, 0.93,
];

/// Spectral efficiency (Q_m * R) for MCS Table 1
const SPECTRAL_EFFICIENCY_FOR_MCS1: [f64; 29] = [
    // QPSK (Q_m = 2): MCS 0-9
    0.23, 0.31, 0.38, 0.49, 0.60, 0.74, 0.88, 1.03, 1.18, 1.33, //
    // 16QAM (Q_m = 4): MCS 10-16
    1.33, 1.48, 1.70, 1.91, 2.16, 2.41, 2.57, //
    // 64QAM (Q_m = 6): MCS 17-28
    2.57, 2.73, 3.03, 3.32, 3.61, 3.90, 4.21, 4.52, 4.82, 5.12, 5.33, 5.55,
];

/// Spectral efficiency for CQI Table 1 (TS 38.214 Table 5.2.2.1-2);
/// CQI 0 is out of range
const SPECTRAL_EFFICIENCY_FOR_CQI1: [f64; 16] = [
    0.0, 0.15, 0.23, 0.38, 0.60, 0.88, 1.18, 1.48, 1.91, 2.41, 2.73, 3.32, 3.90, 4.52, 5.12, 5.55,
];

/// Modulation orders (Q_m) for MCS Table 2 (TS 38.214 Table 5.1.3.1-2)
const MCS_M_TABLE2: [u8; 28] = [
    // QPSK (Q_m = 2)
    2, 2, 2, 2, 2, //
    // 16QAM (Q_m = 4)
    4, 4, 4, 4, 4, 4, //
    // 64QAM (Q_m = 6)
    6, 6, 6, 6, 6, 6, 6, 6, 6, //
    // 256QAM (Q_m = 8)
    8, 8, 8, 8, 8, 8, 8, 8,
];

/// Effective code rates for MCS Table 2
const MCS_ECR_TABLE2: [f64; 28] = [
    // QPSK (Q_m = 2): MCS 0-4
    0.12, 0.19, 0.30, 0.44, 0.59, //
    // 16QAM (Q_m = 4): MCS 5-10
    0.37, 0.42, 0.48, 0.54, 0.60, 0.64, //
    // 64QAM (Q_m = 6): MCS 11-19
    0.46, 0.50, 0.55, 0.60, 0.65, 0.70, 0.75, 0.80, 0.85, //
    // 256QAM (Q_m = 8): MCS 20-27
    0.67, 0.69, 0.74, 0.77, 0.82, 0.86, 0.90, 0.93,
];

/// Spectral efficiency (Q_m * R) for MCS Table 2
const SPECTRAL_EFFICIENCY_FOR_MCS2: [f64; 28] = [
    // QPSK (Q_m = 2): MCS 0-4
    0.23, 0.38, 0.60, 0.88, 1.18, //
    // 16QAM (Q_m = 4): MCS 5-10
    1.48, 1.70, 1.91, 2.16, 2.41, 2.57, //
    // 64QAM (Q_m = 6): MCS 11-19
    2.73, 3.03, 3.32, 3.61, 3.90, 4.21, 4.52, 4.82, 5.12, //
    // 256QAM (Q_m = 8): MCS 20-27
    5.33, 5.55, 5.89, 6.23, 6.57, 6.91, 7.16, 7.41,
];

/// Spectral efficiency for CQI Table 2 (TS 38.214 Table 5.2.2.1-3);
/// CQI 0 is out of range
const SPECTRAL_EFFICIENCY_FOR_CQI2: [f64; 16] = [
    0.0, 0.15, 0.38, 0.88, 1.48, 1.91, 2.41, 2.73, 3.32, 3.90, 4.52, 5.12, 5.55, 6.23, 6.91, 7.41,
];

/// Modulation order (Q_m) for an MCS index
pub fn modulation_order(mcs: u8, table: McsTable) -> u8 {
    let mcs_m = mcs_m_table(table);
    assert!(
        (mcs as usize) < mcs_m.len(),
        "MCS {} out of range for {:?}",
        mcs,
        table
    );
    mcs_m[mcs as usize]
}

/// Effective code rate (a value between 0 and 1) for an MCS index
pub fn code_rate(mcs: u8, table: McsTable) -> f64 {
    let ecr = match table {
        McsTable::Table1 => &MCS_ECR_TABLE1[..],
        McsTable::Table2 => &MCS_ECR_TABLE2[..],
    };
    assert!(
        (mcs as usize) < ecr.len(),
        "MCS {} out of range for {:?}",
        mcs,
        table
    );
    ecr[mcs as usize]
}

/// Spectral efficiency (Q_m * R) for an MCS index
pub fn spectral_efficiency_for_mcs(mcs: u8, table: McsTable) -> f64 {
    let se = spectral_efficiency_mcs_table(table);
    assert!(
        (mcs as usize) < se.len(),
        "MCS {} out of range for {:?}",
        mcs,
        table
    );
    se[mcs as usize]
}

/// Spectral efficiency for a CQI index (0-15)
pub fn spectral_efficiency_for_cqi(cqi: u8, table: McsTable) -> f64 {
    let se = spectral_efficiency_cqi_table(table);
    assert!(
        (cqi as usize) < se.len(),
        "CQI {} out of range for {:?}",
        cqi,
        table
    );
    se[cqi as usize]
}

/// Largest valid MCS index of a table (28 for Table 1, 27 for Table 2)
pub fn max_mcs(table: McsTable) -> u8 {
    (mcs_m_table(table).len() - 1) as u8
}

pub(crate) fn spectral_efficiency_mcs_table(table: McsTable) -> &'static [f64] {
    match table {
        McsTable::Table1 => &SPECTRAL_EFFICIENCY_FOR_MCS1,
        McsTable::Table2 => &SPECTRAL_EFFICIENCY_FOR_MCS2,
    }
}

pub(crate) fn spectral_efficiency_cqi_table(table: McsTable) -> &'static [f64] {
    match table {
        McsTable::Table1 => &SPECTRAL_EFFICIENCY_FOR_CQI1,
        McsTable::Table2 => &SPECTRAL_EFFICIENCY_FOR_CQI2,
    }
}

fn mcs_m_table(table: McsTable) -> &'static [u8] {
    match table {
        McsTable::Table1 => &MCS_M_TABLE1,
        McsTable::Table2 => &MCS_M_TABLE2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_table_sizes() {
        assert_eq!(max_mcs(McsTable::Table1), 28);
        assert_eq!(max_mcs(McsTable::Table2), 27);
    }

    #[test]
    fn test_modulation_boundaries() {
        // Table 1: QPSK up to MCS 9, 16QAM from 10, 64QAM from 17
        assert_eq!(modulation_order(9, McsTable::Table1), 2);
        assert_eq!(modulation_order(10, McsTable::Table1), 4);
        assert_eq!(modulation_order(17, McsTable::Table1), 6);
        // Table 2 reaches 256QAM from MCS 20
        assert_eq!(modulation_order(19, McsTable::Table2), 6);
        assert_eq!(modulation_order(20, McsTable::Table2), 8);
    }

    #[test]
    fn test_spectral_efficiency_is_qm_times_rate() {
        for table in [McsTable::Table1, McsTable::Table2] {
            for mcs in 0..=max_mcs(table) {
                let qm = modulation_order(mcs, table) as f64;
                let se = spectral_efficiency_for_mcs(mcs, table);
                // Values are rounded to two decimals, so allow that much slack
                assert_relative_eq!(se, qm * code_rate(mcs, table), epsilon = 0.02);
            }
        }
    }

    #[test]
    fn test_cqi_tables_are_monotonic() {
        for table in [McsTable::Table1, McsTable::Table2] {
            let mut prev = -1.0;
            for cqi in 0..=15u8 {
                let se = spectral_efficiency_for_cqi(cqi, table);
                assert!(se > prev, "CQI table must be strictly increasing");
                prev = se;
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_mcs_panics() {
        let _ = modulation_order(29, McsTable::Table1);
    }
}
