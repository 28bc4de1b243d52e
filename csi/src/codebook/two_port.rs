//! Two-Port Codebook
//!
//! Closed-form precoding table for one or two antenna ports, following 3GPP
//! TS 38.214, Rel. 15, Table 5.2.2.2.1-1. The two-port matrices apply a
//! quadrant phase rotation phi in {1, j, -1, -j} selected by the subband
//! index.

use super::CodebookConfig;
use crate::matrix::{Complex, ComplexMatrixArray};
use crate::CsiError;
use std::f64::consts::PI;

/// Codebook for up to two antenna ports
#[derive(Debug, Clone)]
pub struct TwoPortCodebook {
    n_ports: usize,
    rank: u8,
    num_i2: usize,
}

impl TwoPortCodebook {
    /// Build the codebook; the geometry must have one or two total ports
    pub fn new(config: CodebookConfig) -> Result<Self, CsiError> {
        let n_ports = config.ports.total_ports();
        if n_ports == 0 || n_ports > 2 {
            return Err(CsiError::UnsupportedCodebook(format!(
                "Two-port codebook requires 1 or 2 ports, got {}",
                n_ports
            )));
        }
        if config.rank == 0 || config.rank as usize > n_ports {
            return Err(CsiError::UnsupportedCodebook(format!(
                "Rank {} is not supported with {} ports",
                config.rank, n_ports
            )));
        }

        let num_i2 = match (n_ports, config.rank) {
            (1, _) => 1,
            (2, 1) => 4,
            (2, 2) => 2,
            _ => unreachable!(),
        };
        Ok(Self {
            n_ports,
            rank: config.rank,
            num_i2,
        })
    }

    /// Number of wideband indices; the two-port table has no wideband
    /// component
    pub fn num_i1(&self) -> usize {
        1
    }

    /// Number of subband indices
    pub fn num_i2(&self) -> usize {
        self.num_i2
    }

    /// Total number of antenna ports
    pub fn num_ports(&self) -> usize {
        self.n_ports
    }

    /// The rank this codebook was built for
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Get the (nPorts x rank) precoding matrix for a codebook index pair
    pub fn base_prec_mat(&self, i1: usize, i2: usize) -> ComplexMatrixArray {
        assert!(i1 < self.num_i1(), "Wideband index {} out of range", i1);
        assert!(i2 < self.num_i2, "Subband index {} out of range", i2);

        if self.n_ports == 1 {
            let mut res = ComplexMatrixArray::new(1, 1, 1);
            res[(0, 0, 0)] = Complex::new(1.0, 0.0);
            return res;
        }

        let phase = PI * i2 as f64 / 2.0;
        let phi = Complex::new(phase.cos(), phase.sin());
        let normalizer = 1.0 / ((self.n_ports * self.rank as usize) as f64).sqrt();

        let mut res = ComplexMatrixArray::new(2, self.rank as usize, 1);
        res[(0, 0, 0)] = Complex::new(normalizer, 0.0);
        res[(1, 0, 0)] = normalizer * phi;
        if self.rank == 2 {
            res[(0, 1, 0)] = Complex::new(normalizer, 0.0);
            res[(1, 1, 0)] = -normalizer * phi;
        }
        res
    }
}
