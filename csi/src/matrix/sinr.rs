//! Per-Layer SINR Matrices

use ndarray::Array2;

/// SINR values of a MIMO reception, one row per spatial layer and one column
/// per resource block
#[derive(Debug, Clone, PartialEq)]
pub struct SinrMatrix {
    data: Array2<f64>,
}

impl SinrMatrix {
    /// Create a zero-initialized SINR matrix
    pub fn new(rank: usize, num_rbs: usize) -> Self {
        assert!(rank > 0 && num_rbs > 0, "SINR matrix dimensions must not be 0");
        Self {
            data: Array2::zeros((rank, num_rbs)),
        }
    }

    /// Create an SINR matrix from a function of (layer, rb)
    pub fn from_fn<F>(rank: usize, num_rbs: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        assert!(rank > 0 && num_rbs > 0, "SINR matrix dimensions must not be 0");
        Self {
            data: Array2::from_shape_fn((rank, num_rbs), |(l, rb)| f(l, rb)),
        }
    }

    /// Number of MIMO layers
    pub fn rank(&self) -> u8 {
        self.data.nrows() as u8
    }

    /// Number of resource blocks
    pub fn num_rbs(&self) -> usize {
        self.data.ncols()
    }

    /// Linearize into a vector with the layer index varying fastest within
    /// each RB, matching the layer-to-codeword mapping of 3GPP TS 38.211
    /// Table 7.3.1.3-1
    pub fn vectorize(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.data.len());
        for rb in 0..self.num_rbs() {
            for layer in 0..self.data.nrows() {
                values.push(self.data[(layer, rb)]);
            }
        }
        values
    }
}

impl std::ops::Index<(usize, usize)> for SinrMatrix {
    type Output = f64;

    fn index(&self, (layer, rb): (usize, usize)) -> &f64 {
        &self.data[(layer, rb)]
    }
}

impl std::ops::IndexMut<(usize, usize)> for SinrMatrix {
    fn index_mut(&mut self, (layer, rb): (usize, usize)) -> &mut f64 {
        &mut self.data[(layer, rb)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let m = SinrMatrix::new(2, 5);
        assert_eq!(m.rank(), 2);
        assert_eq!(m.num_rbs(), 5);
    }

    #[test]
    fn test_vectorize_is_layer_major_per_rb() {
        let m = SinrMatrix::from_fn(2, 3, |l, rb| (10 * rb + l) as f64);
        assert_eq!(m.vectorize(), vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0]);
    }
}
