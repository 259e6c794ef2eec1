//! Provide `FixedHasher` and `NoOpHasher`.
//!
//! `FixedHasher` is based on `foldhash` with a fixed seed, so the same keys
//! always hash the same way across runs.
//!
//! `NoOpHasher` passes a single `u64` through, it is meant for keys that
//! already are well distributed hashes, such as [`TypeId`](core::any::TypeId).

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHasher

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x7E11_15C0_DE5E_ED01);

/// A hasher whose result only depends on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use trellis_utils::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("node");
/// let b = FixedHashState.hash_one("node");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHasher

/// A hasher that keeps the last written `u64` as the hash.
///
/// Other writes fold the bytes in, so a single `write_u32(10)`
/// and a single `write_u64(10)` produce the same hash.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Hash state producing [`NoOpHasher`]s.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use trellis_utils::hash::NoOpHashState;
///
/// let mut hasher = NoOpHashState.build_hasher();
/// 7_u64.hash(&mut hasher);
/// assert_eq!(hasher.finish(), 7);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hash, Hasher};

    use super::{FixedHashState, NoOpHashState};

    #[test]
    fn fixed_state_is_stable() {
        let first = FixedHashState.hash_one(("demo.Person", 3_u32));
        let second = FixedHashState.hash_one(("demo.Person", 3_u32));
        assert_eq!(first, second);
        assert_ne!(first, FixedHashState.hash_one(("demo.Person", 4_u32)));
    }

    #[test]
    fn noop_widths_agree() {
        let mut narrow = NoOpHashState.build_hasher();
        10_u32.hash(&mut narrow);
        let mut wide = NoOpHashState.build_hasher();
        10_u64.hash(&mut wide);
        assert_eq!(narrow.finish(), wide.finish());
    }
}
