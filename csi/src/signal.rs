//! MIMO Signal Chunk Aggregation
//!
//! Receptions arrive as per-transmission chunks, each carrying the channel
//! matrix and the interference-plus-noise covariance observed while that
//! transmission was active. The chunks collected over one feedback period
//! are consolidated into a single representative channel matrix and a single
//! averaged covariance matrix before the precoding search runs.

use crate::matrix::{ComplexMatrixArray, CovMat, SinrMatrix};
use common::Rnti;
use std::time::Duration;
use tracing::trace;

/// One channel observation from a received transmission burst
#[derive(Debug, Clone)]
pub struct MimoSignalChunk {
    /// Channel matrix (nRxPorts x nTxPorts x nRbs)
    pub chan_mat: ComplexMatrixArray,
    /// Interference-plus-noise covariance during this chunk
    pub interf_cov: CovMat,
    /// Identity of the transmitting peer
    pub rnti: Rnti,
    /// Time this observation was valid for
    pub duration: Duration,
}

/// One SINR observation from a received transmission burst
#[derive(Debug, Clone)]
pub struct MimoSinrChunk {
    /// SINR values (rank x nRbs)
    pub sinr_mat: SinrMatrix,
    /// Identity of the transmitting peer
    pub rnti: Rnti,
    /// Time this observation was valid for
    pub duration: Duration,
}

/// Callback receiving all signal chunks of one period
pub type MimoSignalChunksCallback = Box<dyn FnMut(&[MimoSignalChunk])>;
/// Callback receiving all SINR chunks of one period
pub type MimoSinrChunksCallback = Box<dyn FnMut(&[MimoSinrChunk])>;

/// Buffers the chunks of one feedback period and hands the complete list to
/// registered callbacks
///
/// Chunks are only buffered, never reduced on the fly: the consolidation
/// needs all chunks at once to decide which chunk occupied each subcarrier.
#[derive(Default)]
pub struct MimoChunkProcessor {
    signal_chunks: Vec<MimoSignalChunk>,
    sinr_chunks: Vec<MimoSinrChunk>,
    signal_callbacks: Vec<MimoSignalChunksCallback>,
    sinr_callbacks: Vec<MimoSinrChunksCallback>,
}

impl MimoChunkProcessor {
    /// Create a processor with no registered callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for the complete signal chunk list of a period
    pub fn add_signal_callback(&mut self, callback: MimoSignalChunksCallback) {
        self.signal_callbacks.push(callback);
    }

    /// Register a callback for the complete SINR chunk list of a period
    pub fn add_sinr_callback(&mut self, callback: MimoSinrChunksCallback) {
        self.sinr_callbacks.push(callback);
    }

    /// Clear all buffered chunks; must be called at every period boundary
    pub fn start(&mut self) {
        self.signal_chunks.clear();
        self.sinr_chunks.clear();
    }

    /// Buffer one channel observation
    pub fn evaluate_signal_chunk(&mut self, chunk: MimoSignalChunk) {
        trace!(
            "Buffering signal chunk for RNTI {} ({} RBs, {:?})",
            chunk.rnti.value(),
            chunk.chan_mat.num_pages(),
            chunk.duration
        );
        self.signal_chunks.push(chunk);
    }

    /// Buffer one SINR observation
    pub fn evaluate_sinr_chunk(&mut self, chunk: MimoSinrChunk) {
        self.sinr_chunks.push(chunk);
    }

    /// Invoke all registered callbacks with the buffered chunk lists
    pub fn end(&mut self) {
        for cb in &mut self.signal_callbacks {
            cb(&self.signal_chunks);
        }
        for cb in &mut self.sinr_callbacks {
            cb(&self.sinr_chunks);
        }
    }
}

/// Duration-weighted average of the SINR chunks of one period
pub fn average_sinr(chunks: &[MimoSinrChunk]) -> SinrMatrix {
    assert!(!chunks.is_empty(), "Cannot average an empty SINR chunk list");
    let rank = chunks[0].sinr_mat.rank() as usize;
    let num_rbs = chunks[0].sinr_mat.num_rbs();
    let mut total_time = 0.0;
    let mut sum = SinrMatrix::new(rank, num_rbs);
    for chunk in chunks {
        assert_eq!(chunk.sinr_mat.rank() as usize, rank, "SINR ranks must match");
        assert_eq!(chunk.sinr_mat.num_rbs(), num_rbs, "SINR RB counts must match");
        let dt = chunk.duration.as_secs_f64();
        total_time += dt;
        for l in 0..rank {
            for rb in 0..num_rbs {
                sum[(l, rb)] += chunk.sinr_mat[(l, rb)] * dt;
            }
        }
    }
    assert!(total_time > 0.0, "Total chunk duration must be positive");
    SinrMatrix::from_fn(rank, num_rbs, |l, rb| sum[(l, rb)] / total_time)
}

/// Consolidated channel and covariance of one feedback period
///
/// Each peer's scheduled resource blocks are disjoint in frequency, so the
/// channel consolidation is a disjoint union: every page takes the content
/// of a chunk whose page is non-zero (the last such chunk wins on overlap).
/// Interference and noise are present across the whole band, so the
/// covariance is instead the duration-weighted mean over all chunks.
#[derive(Debug, Clone)]
pub struct MimoSignal {
    /// Consolidated channel matrix (nRxPorts x nTxPorts x nRbs)
    pub chan_mat: ComplexMatrixArray,
    /// Averaged interference-plus-noise covariance
    pub cov_mat: CovMat,
}

impl MimoSignal {
    /// Consolidate the signal chunks of one feedback period
    pub fn new(chunks: &[MimoSignalChunk]) -> Self {
        assert!(!chunks.is_empty(), "Cannot consolidate an empty chunk list");
        let rows = chunks[0].chan_mat.num_rows();
        let cols = chunks[0].chan_mat.num_cols();
        let pages = chunks[0].chan_mat.num_pages();
        for chunk in chunks {
            assert_eq!(chunk.chan_mat.num_rows(), rows, "Chunk channel rows must match");
            assert_eq!(chunk.chan_mat.num_cols(), cols, "Chunk channel cols must match");
            assert_eq!(chunk.chan_mat.num_pages(), pages, "Chunk channel pages must match");
            assert_eq!(
                chunk.interf_cov.num_rows(),
                rows,
                "Chunk covariance ports must match channel rows"
            );
            assert_eq!(
                chunk.interf_cov.num_pages(),
                pages,
                "Chunk covariance pages must match channel"
            );
        }

        // Channel: disjoint union of the non-zero pages
        let mut chan_mat = ComplexMatrixArray::new(rows, cols, pages);
        for chunk in chunks {
            for p in 0..pages {
                if chunk.chan_mat.page_norm_sqr(p) > 0.0 {
                    let page = chunk.chan_mat.page(p).to_owned();
                    chan_mat.set_page(p, &page);
                }
            }
        }

        // Covariance: duration-weighted mean over all chunks
        let mut total_time = 0.0;
        let mut cov_sum = ComplexMatrixArray::new(rows, rows, pages);
        for chunk in chunks {
            let dt = chunk.duration.as_secs_f64();
            total_time += dt;
            for p in 0..pages {
                for i in 0..rows {
                    for j in 0..rows {
                        cov_sum[(i, j, p)] += chunk.interf_cov[(i, j, p)] * dt;
                    }
                }
            }
        }
        assert!(total_time > 0.0, "Total chunk duration must be positive");
        let cov_mat = CovMat::from_matrix(ComplexMatrixArray::from_fn(
            rows,
            rows,
            pages,
            |i, j, p| cov_sum[(i, j, p)] / total_time,
        ));

        Self { chan_mat, cov_mat }
    }
}
