//! Common Types for 5G NR CSI Feedback
//!
//! Defines fundamental types used throughout the feedback computation stack

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Radio Network Temporary Identifier (RNTI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rnti(pub u16);

impl Rnti {
    /// Create a new RNTI
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the RNTI value
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Antenna port geometry of a uniform planar array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntennaPorts {
    /// Number of ports in the horizontal direction (N1)
    pub num_h_ports: usize,
    /// Number of ports in the vertical direction (N2)
    pub num_v_ports: usize,
    /// True when the array is dual-polarized
    pub is_dual_pol: bool,
}

impl AntennaPorts {
    /// Create a new antenna port geometry
    pub fn new(num_h_ports: usize, num_v_ports: usize, is_dual_pol: bool) -> Self {
        Self {
            num_h_ports,
            num_v_ports,
            is_dual_pol,
        }
    }

    /// Total number of CSI-RS ports (doubled for dual polarization)
    pub fn total_ports(&self) -> usize {
        let single_pol = self.num_h_ports * self.num_v_ports;
        if self.is_dual_pol {
            2 * single_pol
        } else {
            single_pol
        }
    }
}

/// Subband sizes (in resource blocks) per 3GPP TS 38.214 Table 5.2.1.4-2
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize,
)]
pub enum SubbandSize {
    /// 1 RB (narrow bandwidth parts)
    Rb1 = 1,
    /// 4 RBs
    Rb4 = 4,
    /// 8 RBs
    Rb8 = 8,
    /// 16 RBs
    Rb16 = 16,
    /// 32 RBs
    Rb32 = 32,
}

impl SubbandSize {
    /// Get the subband size in number of resource blocks
    pub fn as_rbs(&self) -> usize {
        *self as usize
    }

    /// Legal subband sizes for a bandwidth part of `num_prbs` resource blocks
    pub fn legal_for(num_prbs: usize) -> &'static [SubbandSize] {
        match num_prbs {
            0..=23 => &[SubbandSize::Rb1],
            24..=72 => &[SubbandSize::Rb4, SubbandSize::Rb8],
            73..=144 => &[SubbandSize::Rb8, SubbandSize::Rb16],
            145..=274 => &[SubbandSize::Rb16],
            275 => &[SubbandSize::Rb16, SubbandSize::Rb32],
            _ => &[SubbandSize::Rb32],
        }
    }

    /// Check whether this subband size is legal for the given bandwidth
    pub fn is_legal_for(&self, num_prbs: usize) -> bool {
        Self::legal_for(num_prbs).contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_ports() {
        assert_eq!(AntennaPorts::new(2, 1, false).total_ports(), 2);
        assert_eq!(AntennaPorts::new(2, 1, true).total_ports(), 4);
        assert_eq!(AntennaPorts::new(4, 2, true).total_ports(), 16);
    }

    #[test]
    fn test_subband_size_value() {
        assert_eq!(SubbandSize::Rb1.as_rbs(), 1);
        assert_eq!(SubbandSize::Rb32.as_rbs(), 32);
    }

    #[test]
    fn test_legal_subband_sizes() {
        assert_eq!(SubbandSize::legal_for(10), &[SubbandSize::Rb1]);
        assert_eq!(SubbandSize::legal_for(52), &[SubbandSize::Rb4, SubbandSize::Rb8]);
        assert_eq!(SubbandSize::legal_for(106), &[SubbandSize::Rb8, SubbandSize::Rb16]);
        assert_eq!(SubbandSize::legal_for(200), &[SubbandSize::Rb16]);
        assert_eq!(SubbandSize::legal_for(275), &[SubbandSize::Rb16, SubbandSize::Rb32]);
        assert_eq!(SubbandSize::legal_for(300), &[SubbandSize::Rb32]);

        assert!(SubbandSize::Rb4.is_legal_for(24));
        assert!(!SubbandSize::Rb4.is_legal_for(23));
        assert!(!SubbandSize::Rb4.is_legal_for(73));
    }
}
