use crate::PlayerId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cumulative results for one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u64,
    pub losses: u64,
}

/// Durable win/loss ledger.
///
/// The in-memory map is authoritative between flushes and flushing is a
/// no-op while nothing has changed. Storage is pretty-printed JSON so
/// operators can read and hand-edit it; a missing file is an empty
/// ledger, and persistence failures never block game resolution.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: BTreeMap<PlayerId, Record>,
    dirty: bool,
}

impl Ledger {
    /// Loads the ledger at `path`, treating a missing or unreadable file
    /// as a fresh start.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("[ledger] discarding unreadable stats at {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            records,
            dirty: false,
        }
    }
    /// A player's record, zero for players never seen.
    pub fn get(&self, player: PlayerId) -> Record {
        self.records.get(&player).copied().unwrap_or_default()
    }
    /// Credits a decisive outcome to winner and loser.
    pub fn record(&mut self, winner: PlayerId, loser: PlayerId) {
        self.records.entry(winner).or_default().wins += 1;
        self.records.entry(loser).or_default().losses += 1;
        self.dirty = true;
    }
    /// Writes the ledger out if anything changed since the last flush.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.records).expect("serialize ledger");
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        log::debug!("[ledger] flushed {} records to {}", self.records.len(), self.path.display());
        Ok(())
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
