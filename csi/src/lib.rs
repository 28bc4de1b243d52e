//! 5G NR MIMO CSI Feedback Library
//!
//! This crate computes CQI/PMI/RI feedback for 5G NR MIMO links according to
//! 3GPP TS 38.214: Type-I codebook enumeration, interference whitening,
//! precoding matrix search, and link adaptation.
//!
//! The pipeline runs in four stages:
//! 1. Per-reception channel and interference observations are buffered and
//!    consolidated into a single MIMO signal ([`signal`]).
//! 2. The channel is whitened against the interference-plus-noise covariance
//!    ([`matrix`]).
//! 3. A precoding search strategy selects rank and wideband/subband precoding
//!    indices from a codebook ([`search`], [`codebook`]).
//! 4. Link adaptation maps the resulting SINR into CQI/MCS and a transport
//!    block size ([`amc`]).

pub mod amc;
pub mod codebook;
pub mod matrix;
pub mod mcs_tables;
pub mod search;
pub mod signal;

use thiserror::Error;

/// Errors raised while configuring the feedback computation
///
/// Runtime contract violations (dimension mismatches, out-of-range codebook
/// indices) are not represented here: they panic, since a wrong-shaped
/// precoding matrix would silently corrupt everything downstream.
#[derive(Error, Debug)]
pub enum CsiError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported codebook geometry: {0}")]
    UnsupportedCodebook(String),
}

pub use amc::{Amc, AmcConfig, LinkAdaptation, McsParams};
pub use codebook::{Codebook, CodebookConfig, CodebookKind};
pub use matrix::{Complex, ComplexMatrixArray, CovMat, SinrMatrix, WhitenedChannel};
pub use search::{
    CqiFeedback, DownsamplingTechnique, PmSearch, PmSearchConfig, PmiUpdate, RankTechnique,
    SearchStrategy,
};
pub use signal::{MimoChunkProcessor, MimoSignal, MimoSignalChunk, MimoSinrChunk};
