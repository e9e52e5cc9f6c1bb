use thiserror::Error;

/// Errors produced by the containers in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A full scan of the probe sequence found neither a free slot nor the key.
    #[error("hash table is full: no free slot on the probe sequence (capacity {capacity})")]
    CapacityExhausted { capacity: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
