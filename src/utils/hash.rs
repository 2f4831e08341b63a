//! Hashing utilities using FxHash.
//!
//! Fast and deterministic. Used for self-write detection in the watcher
//! and for config change detection, never for anything security related.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_deterministic() {
        assert_eq!(compute("body{}"), compute("body{}"));
        assert_ne!(compute("body{}"), compute("p{}"));
    }
}
