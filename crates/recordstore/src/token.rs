//! Unique-string token sources.
//!
//! The engine namespaces generated ids as `prefix + token`. The token
//! source is pluggable so tests can pin down the generated ids.

use std::sync::atomic::{AtomicU64, Ordering};

/// A zero-argument source of fresh random tokens.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> String;
}

/// Default token source: UUID v4 in simple (hyphen-free) format.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn token(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic token source for tests and seeding: `00000000`,
/// `00000001`, ...
#[derive(Debug, Default)]
pub struct SequenceTokenSource {
    counter: AtomicU64,
}

impl SequenceTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the sequence at the given value.
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl TokenSource for SequenceTokenSource {
    fn token(&self) -> String {
        format!("{:08}", self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_tokens_are_unique_and_simple() {
        let source = UuidTokenSource;
        let a = source.token();
        let b = source.token();

        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
    }

    #[test]
    fn test_sequence_tokens_are_deterministic() {
        let source = SequenceTokenSource::starting_at(7);

        assert_eq!(source.token(), "00000007");
        assert_eq!(source.token(), "00000008");
    }
}
