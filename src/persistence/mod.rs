//! High-score storage
//!
//! The file format is a single decimal integer. Anything unreadable counts
//! as zero; writes go to a temp file that is then renamed over the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where the best score lives between runs
pub trait HighScoreStore {
    /// Stored value, or 0 when missing or unreadable
    fn load(&self) -> u64;
    fn save(&mut self, score: u64) -> io::Result<()>;
}

/// Plain-text file store
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> u64 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high score at {}, starting fresh", self.path.display());
                return 0;
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.path.display(), e);
                return 0;
            }
        };
        match text.trim().parse::<u64>() {
            Ok(score) => {
                log::info!("Loaded high score {}", score);
                score
            }
            Err(e) => {
                log::warn!("Ignoring malformed high score file {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        let tmp = self.tmp_path();
        fs::write(&tmp, score.to_string())?;
        fs::rename(&tmp, &self.path)?;
        log::info!("High score {} saved to {}", score, self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    pub value: u64,
    /// Number of successful saves
    pub writes: usize,
    /// Make every save fail
    pub fail_writes: bool,
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u64 {
        self.value
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("store is read-only"));
        }
        self.value = score;
        self.writes += 1;
        Ok(())
    }
}
