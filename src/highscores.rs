//! Persisted best score
//!
//! Tracks the value last written to the store and only writes when a run
//! beats it. Storage failures are logged and play carries on.

use crate::persistence::HighScoreStore;

/// Owns a store and the last persisted best
#[derive(Debug)]
pub struct HighScoreKeeper<S: HighScoreStore> {
    store: S,
    persisted: u64,
}

impl<S: HighScoreStore> HighScoreKeeper<S> {
    /// Read the stored best once at startup
    pub fn load(store: S) -> Self {
        let persisted = store.load();
        Self { store, persisted }
    }

    /// Best score known to be on disk
    pub fn best(&self) -> u64 {
        self.persisted
    }

    /// Persist `score` if it beats the stored best. Returns whether a write
    /// succeeded.
    pub fn flush(&mut self, score: u64) -> bool {
        if score <= self.persisted {
            return false;
        }
        match self.store.save(score) {
            Ok(()) => {
                self.persisted = score;
                true
            }
            Err(e) => {
                log::warn!("Failed to save high score {}: {}", score, e);
                false
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{FileHighScoreStore, MemoryHighScoreStore};

    #[test]
    fn test_flush_only_when_higher() {
        let store = MemoryHighScoreStore {
            value: 300,
            ..Default::default()
        };
        let mut keeper = HighScoreKeeper::load(store);
        assert_eq!(keeper.best(), 300);

        assert!(!keeper.flush(200));
        assert!(!keeper.flush(300));
        assert!(keeper.flush(450));
        assert!(!keeper.flush(450));
        assert_eq!(keeper.best(), 450);
        assert_eq!(keeper.store().writes, 1);
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let store = MemoryHighScoreStore {
            fail_writes: true,
            ..Default::default()
        };
        let mut keeper = HighScoreKeeper::load(store);
        assert!(!keeper.flush(100));
        assert_eq!(keeper.best(), 0);
    }

    #[test]
    fn test_survives_restart_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best.txt");

        let mut first = HighScoreKeeper::load(FileHighScoreStore::new(&path));
        assert_eq!(first.best(), 0);
        assert!(first.flush(2_610));

        let second = HighScoreKeeper::load(FileHighScoreStore::new(&path));
        assert_eq!(second.best(), 2_610);
    }
}
