//! Generated identifiers for anonymous blocks.
//!
//! The parser never creates ids itself; callers pass an [`IdGenerator`] so
//! tests and tools can make block keys reproducible with [`SeededIds`].

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A source of unique block identifiers.
pub trait IdGenerator {
    /// Produce the next identifier.
    fn next_id(&mut self) -> String;
}

/// Random version-4 UUIDs from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        uuid()
    }
}

/// Deterministic version-4 UUIDs from a seeded generator.
///
/// Two generators built from the same seed produce the same sequence.
#[derive(Debug, Clone)]
pub struct SeededIds {
    rng: StdRng,
}

impl SeededIds {
    /// Create a generator from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IdGenerator for SeededIds {
    fn next_id(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        format_uuid(bytes)
    }
}

/// A fresh random version-4 UUID string.
#[must_use]
pub fn uuid() -> String {
    format_uuid(rand::random::<[u8; 16]>())
}

/// Format 16 random bytes as an RFC 4122 version-4 UUID
/// (`xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`).
#[must_use]
pub fn format_uuid(mut bytes: [u8; 16]) -> String {
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let mut out = String::with_capacity(36);
    for (index, byte) in bytes.iter().enumerate() {
        if matches!(index, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uuid_sets_version_and_variant() {
        let id = format_uuid([0xff; 16]);
        assert_eq!(id, "ffffffff-ffff-4fff-bfff-ffffffffffff");
        let id = format_uuid([0; 16]);
        assert_eq!(id, "00000000-0000-4000-8000-000000000000");
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let mut a = SeededIds::new(7);
        let mut b = SeededIds::new(7);
        assert_eq!(a.next_id(), b.next_id());
        assert_ne!(a.next_id(), SeededIds::new(8).next_id());
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let mut ids = RandomIds;
        assert_ne!(ids.next_id(), ids.next_id());
        assert_eq!(uuid().len(), 36);
    }
}
