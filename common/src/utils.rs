//! Common Utilities
//!
//! Provides utility functions used across the CSI feedback implementation

use tracing::trace;

/// Convert a power ratio from dB to linear units
pub fn db_to_lin(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Convert a power ratio from linear units to dB
pub fn lin_to_db(lin: f64) -> f64 {
    10.0 * lin.log10()
}

/// Number of subbands covering `num_prbs` resource blocks
///
/// The last subband may be smaller than `subband_size` when `num_prbs` is not
/// a multiple of it.
pub fn num_subbands(num_prbs: usize, subband_size: usize) -> usize {
    assert!(subband_size > 0, "Subband size must not be 0");
    let n = num_prbs.div_ceil(subband_size);

    trace!(
        "Computed {} subbands for {} PRBs with subband size {}",
        n,
        num_prbs,
        subband_size
    );

    n
}

/// Wrap an angle in radians into [0, 2*pi)
pub fn wrap_to_2pi(angle: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let wrapped = angle.rem_euclid(two_pi);
    if wrapped == two_pi {
        0.0
    } else {
        wrapped
    }
}
