//! # FNV-1a Hasher
//!
//! A 64-bit FNV-1a (Fowler–Noll–Vo) hasher with no per-instance seed. Every
//! `FnvBuildHasher` produces the same hash for the same input, so tables built with it
//! lay out their slots identically from run to run, which is handy for debugging dumps
//! and reproducible tests.
//!
//! **Note**: FNV is not cryptographically secure and offers no protection against
//! hash flooding. Prefer the default `RandomState` when keys come from untrusted input.

use std::hash::{BuildHasher, Hasher};

const FNV64_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV64_PRIME: u64 = 0x100000001b3;

/// Builds [`FnvHasher`]s. Stateless; all instances are interchangeable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnvBuildHasher;

impl BuildHasher for FnvBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::default()
    }
}

/// Streaming 64-bit FNV-1a state.
#[derive(Debug, Clone, Copy)]
pub struct FnvHasher {
    state: u64,
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self {
            state: FNV64_OFFSET_BASIS,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            // xor first, then multiply (the "a" variant)
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(FNV64_PRIME);
        }
    }
}

/// One-shot 64-bit FNV-1a of `data`.
pub fn fnv1a_64(data: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(data);
    hasher.finish()
}
