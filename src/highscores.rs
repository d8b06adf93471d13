//! Best-score records
//!
//! Each game mode keeps a single best value in the key-value store as a
//! decimal string. A missing or unparsable value reads as 0.

use crate::platform::KeyValueStore;

/// Storage key for the arcade's most coins in one session
pub const MAX_COINS_KEY: &str = "maxCoins";
/// Storage key for the flag quiz's longest streak
pub const QUIZ_BEST_KEY: &str = "flags_quiz_best_score";

/// A persisted best score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestScore {
    key: &'static str,
    value: u32,
}

impl BestScore {
    /// Read the best stored under `key`
    pub fn load(store: &(impl KeyValueStore + ?Sized), key: &'static str) -> Self {
        let value = match store.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring unparsable best score '{}' for {}", raw, key);
                0
            }),
            None => 0,
        };
        log::info!("Best score for {}: {}", key, value);
        Self { key, value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether `score` would replace the current best
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.value
    }

    /// Record `score`, writing it through immediately when it beats the
    /// current best. Returns `true` on a new best.
    pub fn submit(&mut self, score: u32, store: &mut (impl KeyValueStore + ?Sized)) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.value = score;
        store.set(self.key, &score.to_string());
        log::info!("New best for {}: {}", self.key, score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_missing_reads_zero() {
        let store = MemoryStore::new();
        assert_eq!(BestScore::load(&store, MAX_COINS_KEY).value(), 0);
    }

    #[test]
    fn test_garbage_reads_zero() {
        let store = MemoryStore::with_entries([(MAX_COINS_KEY, "lots")]);
        assert_eq!(BestScore::load(&store, MAX_COINS_KEY).value(), 0);
    }

    #[test]
    fn test_loads_stored_value() {
        let store = MemoryStore::with_entries([(QUIZ_BEST_KEY, "12")]);
        assert_eq!(BestScore::load(&store, QUIZ_BEST_KEY).value(), 12);
    }

    #[test]
    fn test_submit_only_persists_improvements() {
        let mut store = MemoryStore::with_entries([(MAX_COINS_KEY, "5")]);
        let mut best = BestScore::load(&store, MAX_COINS_KEY);

        assert!(!best.submit(5, &mut store));
        assert!(!best.submit(3, &mut store));
        assert_eq!(store.get(MAX_COINS_KEY).as_deref(), Some("5"));

        assert!(best.submit(7, &mut store));
        assert_eq!(best.value(), 7);
        assert_eq!(store.get(MAX_COINS_KEY).as_deref(), Some("7"));
    }
}
