// @awa-component: QRY-IdGenerator
//
//! Client-side correlation ids.
//!
//! Ids are RFC 4122 version-4 shaped (`xxxxxxxx-xxxx-4xxx-[89ab]xxx-xxxxxxxxxxxx`).
//! They correlate a shopper's requests and beacon events; they are not
//! security tokens.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::{Builder, Uuid};

/// A source of fresh correlation ids.
pub trait IdSource {
    /// Return a new id. Never fails.
    fn next_id(&mut self) -> String;
}

/// Production id source backed by `Uuid::new_v4`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic id source for tests and reproducible dry runs.
///
/// Draws 16 bytes per id from a seeded `StdRng`; version and variant bits
/// are stamped by `uuid::Builder`.
#[derive(Debug, Clone)]
pub struct SeededIds {
    rng: StdRng,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IdSource for SeededIds {
    fn next_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.random();
        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

/// Generate a single random id.
pub fn generate_id() -> String {
    RandomIds.next_id()
}

/// Check that `id` has the 8-4-4-4-12 layout with version `4` and an RFC 4122 variant.
pub fn is_v4_shaped(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        let ok = match i {
            8 | 13 | 18 | 23 => *b == b'-',
            14 => *b == b'4',
            19 => matches!(b, b'8' | b'9' | b'a' | b'b'),
            _ => b.is_ascii_digit() || (b'a'..=b'f').contains(b),
        };
        if !ok {
            return false;
        }
    }
    true
}
