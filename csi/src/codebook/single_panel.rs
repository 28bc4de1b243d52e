//! Type-I Single-Panel Codebook
//!
//! Implementation of the Type-I single-panel codebook of 3GPP TS 38.214,
//! Rel. 15, Sec. 5.2.2.2.1, codebook mode 1, up to rank 4 and 32 ports.
//! Codebook mode 1 means the per-subband index i2 only controls the phase
//! shift of the second polarization.
//!
//! Plain references like 5.2.2.2.1-x refer to 3GPP TS 38.214, Rel. 15,
//! Table 5.2.2.2.1-x.

use super::CodebookConfig;
use crate::matrix::{Complex, ComplexMatrixArray};
use crate::CsiError;
use std::f64::consts::PI;

// For each rank -> for each layer/column in the precoding matrix W: the
// index of the beamforming vector in the unique-vector list built by
// create_unique_bfvs()
const UNIQUE_BFV_INDS_PER_RANK: [&[usize]; 4] = [
    &[0],          // 5.2.2.2.1-5
    &[0, 1],       // 5.2.2.2.1-6
    &[0, 1, 0],    // 5.2.2.2.1-7 (both cases nPorts<16 and >=16)
    &[0, 1, 0, 1], // 5.2.2.2.1-8 (both cases nPorts<16 and >=16)
];

// For each rank -> for each layer/column in the precoding matrix W: the sign
// before phi_n (+1 / -1) in the lower half of W (second polarization)
const SIGN_PHI_N_PER_RANK: [&[f64]; 4] = [
    &[1.0],                   // 5.2.2.2.1-5
    &[1.0, -1.0],             // 5.2.2.2.1-6
    &[1.0, 1.0, -1.0],        // 5.2.2.2.1-7 (both cases nPorts<16 and >=16)
    &[1.0, 1.0, -1.0, -1.0],  // 5.2.2.2.1-8 (both cases nPorts<16 and >=16)
];

/// Type-I single-panel codebook for a fixed antenna geometry and rank
#[derive(Debug, Clone)]
pub struct SinglePanelCodebook {
    n1: usize,
    n2: usize,
    is_dual_pol: bool,
    rank: u8,
    n_ports: usize,

    /// Oversampling in the n1-direction (typically horizontal)
    o1: usize,
    /// Oversampling in the n2-direction (typically vertical)
    o2: usize,

    num_i11: usize,
    num_i12: usize,
    num_i13: usize,
    num_i1: usize,
    num_i2: usize,

    /// Mapping from i13 to the k1 factor (multiplied by o1)
    k1_factors: Vec<usize>,
    /// Mapping from i13 to the k2 factor (multiplied by o2)
    k2_factors: Vec<usize>,

    /// For each column in W, the beamforming vector index
    unique_bfv_inds: Vec<usize>,
    /// For each column in W, the sign before phi_n
    sign_phi_n: Vec<f64>,
}

impl SinglePanelCodebook {
    /// Build the codebook; derives the oversampling factors and index space
    /// sizes from the geometry and rank
    pub fn new(config: CodebookConfig) -> Result<Self, CsiError> {
        let n1 = config.ports.num_h_ports;
        let n2 = config.ports.num_v_ports;
        let is_dual_pol = config.ports.is_dual_pol;
        let rank = config.rank;

        if rank == 0 {
            return Err(CsiError::UnsupportedCodebook("Rank must not be 0".into()));
        }
        if rank > 4 {
            return Err(CsiError::UnsupportedCodebook(
                "This implementation supports at most rank 4 MIMO".into(),
            ));
        }

        let n_ports = config.ports.total_ports();
        if n_ports == 0 {
            return Err(CsiError::UnsupportedCodebook(
                "Number of CSI-RS ports must not be 0".into(),
            ));
        }
        if !is_dual_pol && n_ports > 2 {
            return Err(CsiError::UnsupportedCodebook(
                "For > 2 antenna ports, dual polarization is required".into(),
            ));
        }
        if n_ports > 32 {
            return Err(CsiError::UnsupportedCodebook(
                "Number of CSI-RS ports must not be greater than 32".into(),
            ));
        }
        if rank as usize > n_ports {
            return Err(CsiError::UnsupportedCodebook(format!(
                "Rank {} exceeds the number of ports {}",
                rank, n_ports
            )));
        }

        let o1 = if n1 > 1 { 4 } else { 1 };
        let o2 = if n2 > 1 { 4 } else { 1 };

        let mut cb = Self {
            n1,
            n2,
            is_dual_pol,
            rank,
            n_ports,
            o1,
            o2,
            num_i11: 0,
            num_i12: 0,
            num_i13: 0,
            num_i1: 0,
            num_i2: 0,
            k1_factors: vec![],
            k2_factors: vec![],
            unique_bfv_inds: vec![],
            sign_phi_n: vec![],
        };
        cb.init_num_i11()?;
        cb.init_num_i12();
        cb.init_num_i13()?;
        cb.init_num_i1();
        cb.init_num_i2();
        cb.init_w_params();
        Ok(cb)
    }

    /// Number of composite wideband indices (unique i11, i12, i13 triples)
    pub fn num_i1(&self) -> usize {
        self.num_i1
    }

    /// Number of subband indices (phase offsets for the second polarization)
    pub fn num_i2(&self) -> usize {
        self.num_i2
    }

    /// Number of i11 indices (horizontal beam directions)
    pub fn num_i11(&self) -> usize {
        self.num_i11
    }

    /// Number of i12 indices (vertical beam directions)
    pub fn num_i12(&self) -> usize {
        self.num_i12
    }

    /// Number of i13 indices (co-phasing shifts for a secondary beam); 1
    /// when there is no secondary beam (e.g., rank 1)
    pub fn num_i13(&self) -> usize {
        self.num_i13
    }

    /// Total number of antenna ports
    pub fn num_ports(&self) -> usize {
        self.n_ports
    }

    /// The rank this codebook was built for
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Number of horizontal ports (N1)
    pub fn n1(&self) -> usize {
        self.n1
    }

    /// Number of vertical ports (N2)
    pub fn n2(&self) -> usize {
        self.n2
    }

    /// Oversampling factor in the n1-direction
    pub fn o1(&self) -> usize {
        self.o1
    }

    /// Oversampling factor in the n2-direction
    pub fn o2(&self) -> usize {
        self.o2
    }

    /// Get the (nPorts x rank) precoding matrix for a composite wideband
    /// index i1 and subband index i2
    pub fn base_prec_mat(&self, i1: usize, i2: usize) -> ComplexMatrixArray {
        assert!(i1 < self.num_i1, "Wideband index {} out of range", i1);
        assert!(i2 < self.num_i2, "Subband index {} out of range", i2);
        let i11 = self.map_to_i11(i1);
        let i12 = self.map_to_i12(i1);
        let i13 = self.map_to_i13(i1);
        self.base_prec_mat_from_index(i11, i12, i13, i2)
    }

    /// Get the (nPorts x rank) precoding matrix from the individual beam
    /// indices
    pub fn base_prec_mat_from_index(
        &self,
        i11: usize,
        i12: usize,
        i13: usize,
        i2: usize,
    ) -> ComplexMatrixArray {
        if self.n_ports == 1 {
            let mut res = ComplexMatrixArray::new(1, 1, 1);
            res[(0, 0, 0)] = Complex::new(1.0, 0.0);
            return res;
        }

        // n_ports is even; the upper half of the ports carries the first
        // polarization angle
        let rank = self.rank as usize;
        let mut prec_mat = ComplexMatrixArray::new(self.n_ports, rank, 1);
        let phase = PI * i2 as f64 / 2.0;
        let phi_n = Complex::new(phase.cos(), phase.sin()); // phi_n as defined in 5.2.2.2.1
        let normalizer = 1.0 / ((self.n_ports * rank) as f64).sqrt();
        let unique_bfvs = self.create_unique_bfvs(i11, i12, i13);
        for layer in 0..rank {
            // The beamforming vector for the first polarization
            let v = &unique_bfvs[self.unique_bfv_inds[layer]];
            assert_eq!(
                v.len(),
                self.n_ports / 2,
                "Size of a per-polarization beamforming vector must be nPorts/2"
            );
            for (v_idx, &value) in v.iter().enumerate() {
                // Fill in W for both the first and the second polarization
                prec_mat[(v_idx, layer, 0)] = normalizer * value;
                prec_mat[(v_idx + v.len(), layer, 0)] =
                    normalizer * self.sign_phi_n[layer] * phi_n * value;
            }
        }
        prec_mat
    }

    fn init_num_i11(&mut self) -> Result<(), CsiError> {
        if !self.is_dual_pol && (self.n1 == 2) && (self.n2 == 1) {
            // Two antenna ports, covered by 5.2.2.2.1-1. Iteration over the
            // entries of 5.2.2.2.1-1 is interpreted as i2; i1 remains 1.
            self.num_i11 = 1;
        } else if self.is_rank34_and_at_least_16_ports() {
            // Lower part of 5.2.2.2.1-7 and 5.2.2.2.1-8
            if self.n1 <= 2 {
                return Err(CsiError::UnsupportedCodebook(
                    "Rank 3-4 with at least 16 ports requires N1 > 2".into(),
                ));
            }
            self.num_i11 = self.n1 * self.o1 / 2;
        } else {
            // Default number of beams in the horizontal direction
            self.num_i11 = self.n1 * self.o1;
        }
        Ok(())
    }

    fn init_num_i12(&mut self) {
        if !self.is_dual_pol && (self.n1 == 1) && (self.n2 == 2) {
            // Two antenna ports, covered by 5.2.2.2.1-1
            self.num_i12 = 1;
        } else {
            // Default number of beams in the vertical direction
            self.num_i12 = self.n2 * self.o2;
        }
    }

    fn init_num_i13(&mut self) -> Result<(), CsiError> {
        self.init_k1_k2()?;

        if self.rank == 1 {
            self.num_i13 = 1;
        } else if !self.k1_factors.is_empty() {
            self.num_i13 = self.k1_factors.len();
        } else if self.is_rank34_and_at_least_16_ports() {
            // Rank 3 or 4 with >= 16 ports: lower part of tables
            // 5.2.2.2.1-7 and 5.2.2.2.1-8
            self.num_i13 = 4;
        } else {
            return Err(CsiError::UnsupportedCodebook(
                "Unsupported configuration".into(),
            ));
        }
        Ok(())
    }

    fn init_k1_k2(&mut self) -> Result<(), CsiError> {
        if self.rank == 1 || self.is_rank34_and_at_least_16_ports() {
            // No k1-k2; for >= 16 ports, i13 is mapped to theta values
            // multiplied with v-tilde instead
            self.k1_factors = vec![];
            self.k2_factors = vec![];
            Ok(())
        } else if self.rank == 2 {
            self.init_k1_k2_rank2()
        } else if self.is_rank34_and_below_16_ports() {
            self.init_k1_k2_rank34()
        } else {
            Err(CsiError::UnsupportedCodebook(
                "Codebook configuration not supported".into(),
            ))
        }
    }

    fn init_k1_k2_rank2(&mut self) -> Result<(), CsiError> {
        // The factors before O1 and O2 in Table 5.2.2.2.1-3
        if self.n1 > self.n2 && self.n2 > 1 {
            self.k1_factors = vec![0, 1, 0, 2];
            self.k2_factors = vec![0, 0, 1, 0];
        } else if self.n1 == self.n2 {
            self.k1_factors = vec![0, 1, 0, 1];
            self.k2_factors = vec![0, 0, 1, 1];
        } else if self.n1 == 2 && self.n2 == 1 {
            self.k1_factors = vec![0, 1];
            self.k2_factors = vec![0, 0];
        } else if self.n1 > 2 && self.n2 == 1 {
            self.k1_factors = vec![0, 1, 2, 3];
            self.k2_factors = vec![0, 0, 0, 0];
        } else {
            return Err(CsiError::UnsupportedCodebook(format!(
                "Invalid n1-n2 configuration: ({}, {})",
                self.n1, self.n2
            )));
        }
        Ok(())
    }

    fn init_k1_k2_rank34(&mut self) -> Result<(), CsiError> {
        // The factors before O1 and O2 in Table 5.2.2.2.1-4
        match (self.n1, self.n2) {
            (2, 1) => {
                self.k1_factors = vec![1];
                self.k2_factors = vec![0];
            }
            (4, 1) => {
                self.k1_factors = vec![1, 2, 3];
                self.k2_factors = vec![0, 0, 0];
            }
            (6, 1) => {
                self.k1_factors = vec![1, 2, 3, 4];
                self.k2_factors = vec![0, 0, 0, 0];
            }
            (2, 2) => {
                self.k1_factors = vec![1, 0, 1];
                self.k2_factors = vec![0, 1, 1];
            }
            (3, 2) => {
                self.k1_factors = vec![1, 0, 1, 2];
                self.k2_factors = vec![0, 1, 1, 0];
            }
            _ => {
                return Err(CsiError::UnsupportedCodebook(format!(
                    "Invalid n1-n2 configuration: ({}, {})",
                    self.n1, self.n2
                )));
            }
        }
        Ok(())
    }

    fn init_num_i1(&mut self) {
        self.num_i1 = self.num_i11 * self.num_i12 * self.num_i13;
    }

    fn init_num_i2(&mut self) {
        if self.n_ports == 1 {
            self.num_i2 = 1;
        } else if self.rank == 1 {
            self.num_i2 = 4; // 5.2.2.2.1-1 (left) or 5.2.2.2.1-5
        } else {
            self.num_i2 = 2; // 5.2.2.2.1-1 (right), 5.2.2.2.1-6, -7, -8
        }
    }

    fn init_w_params(&mut self) {
        let rank = self.rank as usize;
        self.unique_bfv_inds = UNIQUE_BFV_INDS_PER_RANK[rank - 1].to_vec();
        self.sign_phi_n = SIGN_PHI_N_PER_RANK[rank - 1].to_vec();
        if self.n_ports == 2 && self.rank == 2 {
            // With two ports the unique-vector list has a single entry
            self.unique_bfv_inds = vec![0, 0];
        }
    }

    /// Map a composite i1 index to i11 (horizontal beam direction)
    ///
    /// i1 is defined as a vector of indices in TS 38.214; it is mapped here
    /// to a unique integer as i1 = i11 + numI11 * (i12 + numI12 * i13), with
    /// i13 = 0 when not defined. The ordering is an arbitrary choice: it
    /// does not matter when performing a full search over all indices.
    fn map_to_i11(&self, i1: usize) -> usize {
        i1 % self.num_i11
    }

    /// Map a composite i1 index to i12 (vertical beam direction)
    fn map_to_i12(&self, i1: usize) -> usize {
        (i1 / self.num_i11) % self.num_i12
    }

    /// Map a composite i1 index to i13 (co-phasing of a secondary beam)
    fn map_to_i13(&self, i1: usize) -> usize {
        let i13 = i1 / (self.num_i11 * self.num_i12);
        assert!(i13 < self.num_i13, "i13 index {} out of range", i13);
        i13
    }

    /// Map an i13 index to k1 (horizontal offset of the secondary beam)
    fn map_to_k1(&self, i13: usize) -> usize {
        assert!(
            !self.k1_factors.is_empty(),
            "Cannot get k1 value for this configuration"
        );
        self.k1_factors[i13] * self.o1
    }

    /// Map an i13 index to k2 (vertical offset of the secondary beam)
    fn map_to_k2(&self, i13: usize) -> usize {
        assert!(
            !self.k2_factors.is_empty(),
            "Cannot get k2 value for this configuration"
        );
        self.k2_factors[i13] * self.o2
    }

    /// Create the list of distinct beamforming vectors used for the first
    /// polarization (each of size nPorts/2)
    ///
    /// For 2 ports this is the single scalar 1.0. For rank 1 it is v_{l,m}
    /// (5.2.2.2.1-5). For rank 2, or ranks 3-4 with less than 16 ports, it
    /// is v_{l,m} and v_{l',m'} selected via the k1/k2 offsets (5.2.2.2.1-6
    /// and the upper parts of -7/-8). For ranks 3-4 with at least 16 ports
    /// it is the two concatenated vectors [v~; theta_p*v~] and
    /// [v~; -theta_p*v~] (the lower parts of -7/-8).
    fn create_unique_bfvs(&self, i11: usize, i12: usize, i13: usize) -> Vec<Vec<Complex>> {
        assert!(
            self.n_ports > 1,
            "Cannot use multiple polarizations for a single-port codebook"
        );

        if self.n_ports == 2 {
            // For 2 ports there is only a single wideband value
            vec![vec![Complex::new(1.0, 0.0)]]
        } else if self.rank == 1 {
            vec![self.create_vec_v(i11, i12)] // v_{l,m} in 5.2.2.2.1-5
        } else if self.rank == 2 || self.is_rank34_and_below_16_ports() {
            // 5.2.2.2.1-6, and upper parts of 5.2.2.2.1-7, 5.2.2.2.1-8
            let k1 = self.map_to_k1(i13);
            let k2 = self.map_to_k2(i13);
            vec![
                self.create_vec_v(i11, i12),           // v_{l,m}
                self.create_vec_v(i11 + k1, i12 + k2), // v_{l',m'}
            ]
        } else {
            // Lower parts of 5.2.2.2.1-7, 5.2.2.2.1-8
            let v_tilde = self.create_vec_v_tilde(i11, i12);
            let phase = PI * i13 as f64 / 4.0;
            let theta_p = Complex::new(phase.cos(), phase.sin());
            vec![
                concat_v_tilde_theta_v_tilde(&v_tilde, theta_p),
                concat_v_tilde_theta_v_tilde(&v_tilde, -theta_p),
            ]
        }
    }

    /// Create the vector v_{l,m} as given in TS 38.214, Sec. 5.2.2.2.1
    fn create_vec_v(&self, l: usize, m: usize) -> Vec<Complex> {
        let mut vec_h = Vec::with_capacity(self.n1);
        for i in 0..self.n1 {
            let phase = (2.0 * PI * (l * i) as f64) / (self.o1 * self.n1) as f64;
            vec_h.push(Complex::new(phase.cos(), phase.sin()));
        }
        kronecker_product(&vec_h, &self.create_vec_u(m))
    }

    /// Create the vector tilde{v}_{l,m} as given in TS 38.214, Sec. 5.2.2.2.1
    fn create_vec_v_tilde(&self, l: usize, m: usize) -> Vec<Complex> {
        let mut vec_h = Vec::with_capacity(self.n1 / 2);
        for i in 0..self.n1 / 2 {
            let phase = (4.0 * PI * (l * i) as f64) / (self.o1 * self.n1) as f64;
            vec_h.push(Complex::new(phase.cos(), phase.sin()));
        }
        kronecker_product(&vec_h, &self.create_vec_u(m))
    }

    /// Create the vector u_m as given in TS 38.214, Sec. 5.2.2.2.1
    fn create_vec_u(&self, m: usize) -> Vec<Complex> {
        if self.n2 == 1 {
            return vec![Complex::new(1.0, 0.0)];
        }
        let mut vec_u = Vec::with_capacity(self.n2);
        for i in 0..self.n2 {
            let phase = (2.0 * PI * (m * i) as f64) / (self.o2 * self.n2) as f64;
            vec_u.push(Complex::new(phase.cos(), phase.sin()));
        }
        vec_u
    }

    /// Rank 3 or 4 with fewer than 16 ports (upper parts of Tables
    /// 5.2.2.2.1-7, 5.2.2.2.1-8)
    fn is_rank34_and_below_16_ports(&self) -> bool {
        (self.rank == 3 || self.rank == 4) && self.n_ports < 16
    }

    /// Rank 3 or 4 with at least 16 ports (lower parts of Tables
    /// 5.2.2.2.1-7, 5.2.2.2.1-8)
    fn is_rank34_and_at_least_16_ports(&self) -> bool {
        (self.rank == 3 || self.rank == 4) && self.n_ports >= 16
    }
}

/// Concatenate [vTilde; signedTheta * vTilde]
fn concat_v_tilde_theta_v_tilde(v_tilde: &[Complex], signed_theta: Complex) -> Vec<Complex> {
    let mut v_concat = v_tilde.to_vec();
    v_concat.extend(v_tilde.iter().map(|el| el * signed_theta));
    v_concat
}

/// Kronecker product of two vectors: each element of vecA multiplied with
/// the whole of vecB
fn kronecker_product(vec_a: &[Complex], vec_b: &[Complex]) -> Vec<Complex> {
    let mut v = Vec::with_capacity(vec_a.len() * vec_b.len());
    for elem_a in vec_a {
        for elem_b in vec_b {
            v.push(elem_a * elem_b);
        }
    }
    v
}
