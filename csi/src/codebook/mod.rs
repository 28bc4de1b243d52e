//! 3GPP Type-I Precoding Codebooks
//!
//! Deterministic enumeration of the precoding matrices of 3GPP TS 38.214,
//! Rel. 15, Sec. 5.2.2.2.1. A codebook is parameterized by the antenna port
//! geometry and the MIMO rank, and produces (nPorts x rank) precoding
//! matrices indexed by a wideband index i1 and a subband index i2.

mod single_panel;
mod two_port;

pub use single_panel::SinglePanelCodebook;
pub use two_port::TwoPortCodebook;

use crate::matrix::ComplexMatrixArray;
use crate::CsiError;
use common::AntennaPorts;
use serde::{Deserialize, Serialize};

/// Selects the codebook implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodebookKind {
    /// Closed-form table for up to two ports (Table 5.2.2.2.1-1)
    TwoPort,
    /// Type-I single-panel codebook for up to 32 ports (Tables 5.2.2.2.1-5
    /// through -8)
    TypeOneSinglePanel,
}

/// Construction parameters of a codebook
///
/// All parameters must be known before the index spaces can be derived, so a
/// codebook is built in a single step from this config and is immutable
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodebookConfig {
    /// Which codebook implementation to use
    pub kind: CodebookKind,
    /// Antenna port geometry of the transmitter
    pub ports: AntennaPorts,
    /// Number of MIMO layers
    pub rank: u8,
}

/// A constructed, immutable precoding codebook
///
/// The set of implementations is closed (fixed by the standard), so the
/// variants are dispatched through this enum.
#[derive(Debug, Clone)]
pub enum Codebook {
    TwoPort(TwoPortCodebook),
    SinglePanel(SinglePanelCodebook),
}

impl Codebook {
    /// Build and initialize a codebook from its construction parameters
    pub fn new(config: CodebookConfig) -> Result<Self, CsiError> {
        match config.kind {
            CodebookKind::TwoPort => Ok(Codebook::TwoPort(TwoPortCodebook::new(config)?)),
            CodebookKind::TypeOneSinglePanel => {
                Ok(Codebook::SinglePanel(SinglePanelCodebook::new(config)?))
            }
        }
    }

    /// Number of wideband (i1) indices
    pub fn num_i1(&self) -> usize {
        match self {
            Codebook::TwoPort(cb) => cb.num_i1(),
            Codebook::SinglePanel(cb) => cb.num_i1(),
        }
    }

    /// Number of subband (i2) indices
    pub fn num_i2(&self) -> usize {
        match self {
            Codebook::TwoPort(cb) => cb.num_i2(),
            Codebook::SinglePanel(cb) => cb.num_i2(),
        }
    }

    /// Total number of antenna ports
    pub fn num_ports(&self) -> usize {
        match self {
            Codebook::TwoPort(cb) => cb.num_ports(),
            Codebook::SinglePanel(cb) => cb.num_ports(),
        }
    }

    /// The rank this codebook was built for
    pub fn rank(&self) -> u8 {
        match self {
            Codebook::TwoPort(cb) => cb.rank(),
            Codebook::SinglePanel(cb) => cb.rank(),
        }
    }

    /// Get the (nPorts x rank) precoding matrix for a codebook index pair
    ///
    /// Panics when `i1 >= num_i1()` or `i2 >= num_i2()`.
    pub fn base_prec_mat(&self, i1: usize, i2: usize) -> ComplexMatrixArray {
        assert!(
            i1 < self.num_i1(),
            "Wideband index {} out of range (codebook has {})",
            i1,
            self.num_i1()
        );
        assert!(
            i2 < self.num_i2(),
            "Subband index {} out of range (codebook has {})",
            i2,
            self.num_i2()
        );
        match self {
            Codebook::TwoPort(cb) => cb.base_prec_mat(i1, i2),
            Codebook::SinglePanel(cb) => cb.base_prec_mat(i1, i2),
        }
    }
}
