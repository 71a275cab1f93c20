use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum DdmhashError {
    #[error("cache size {0} is not a positive multiple of the node size")]
    InvalidCacheSize(u64),

    #[error("dataset size {0} is not a positive multiple of the mix width")]
    InvalidDataSize(u64),

    #[error("DAG generation cancelled by the progress callback")]
    Cancelled,

    #[error("could not recreate DAG file after finding one with unexpected size")]
    DagMismatch,

    #[error("could not memory-map DAG file: {0}")]
    Mmap(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DdmhashError>;
