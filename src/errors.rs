/// Error types for graph configuration and overlap loading.
/// Invariant violations inside the pipeline are not represented here, they panic.

use crate::best_edge::{PACKED_EDGE_BITS, PACKED_WORD_BITS};

/// Rejected construction parameters. Fatal at start-up.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("packed edge needs {needed} bits but only {available} are available")]
    EdgePacking { needed: u32, available: u32 },
    #[error("graph error rate {0} is outside [0, 0.4095]")]
    ErrorRate(f64),
    #[error("deviation multiplier {0} must be non-negative")]
    Deviation(f64),
    #[error("minimum overlap fraction {0} is outside [0, 1]")]
    MinOverlapFraction(f64),
    #[error("lopsided difference {0} must be non-negative")]
    LopsidedDiff(f64),
}

impl ConfigError {
    /// Start-up check mirroring the compile-time assertion on the packed edge.
    pub fn check_edge_packing() -> Result<(), ConfigError> {
        if PACKED_EDGE_BITS > PACKED_WORD_BITS {
            return Err(ConfigError::EdgePacking { needed: PACKED_EDGE_BITS, available: PACKED_WORD_BITS });
        }
        Ok(())
    }
}

/// Errors returned while building, saving or loading an overlap store.
#[derive(thiserror::Error, Debug)]
pub enum OverlapStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("malformed PAF record on line {0}")]
    MalformedPaf(usize),
    #[error("read {name} has length {length}, above the supported maximum {max}")]
    ReadTooLong { name: String, length: u32, max: u32 },
    #[error("read {name} reported with lengths {first} and {second}")]
    InconsistentLength { name: String, first: u32, second: u32 },
    #[error("too many reads, read ids are limited to {0}")]
    TooManyReads(u32),
}

/// Errors from building a graph: bad parameters, or failure to write its reports.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}
