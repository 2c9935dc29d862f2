//! File-backed persistence for the bounty ledger.
//!
//! The whole ledger is rewritten on every checkpoint. The new record is
//! written next to the old one and renamed over it, so a failed save leaves
//! the previous record intact.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use bounty_ledger::{BountyLedger, PlayerDirectory};
use bounty_types::Bounty;

use crate::error::StoreError;
use crate::record::{PostingRecord, RootRecord};

/// Why a persisted posting was not loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The line could not be parsed.
    Malformed,
    /// The wanted player no longer resolves to a live player.
    UnknownWanted,
    /// The posting carries no gold.
    ZeroReward,
    /// The posting time is in the future.
    PostedInFuture,
}

/// Postings and pool read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedLedger {
    /// Accepted postings, in record order.
    pub postings: Vec<Bounty>,
    /// Bonus pool balance from the root record.
    pub bonus_pool: u64,
    /// Number of posting lines that were skipped.
    pub dropped: usize,
}

/// Reads and writes the ledger record at a fixed path.
#[derive(Debug, Clone)]
pub struct BountyStore {
    path: PathBuf,
}

impl BountyStore {
    /// Create a store bound to a record path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    /// Read the record.
    ///
    /// A missing file is a fresh install and yields an empty ledger.
    /// Postings are kept only if the wanted player resolves, the reward is
    /// positive, and the posting time is not after `now`. Skipped lines are
    /// logged, never fatal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read,
    /// [`StoreError::MissingRoot`] if it is empty, or
    /// [`StoreError::Serialization`] if the root line is not valid.
    pub fn load(
        &self,
        directory: &dyn PlayerDirectory,
        now: DateTime<Utc>,
    ) -> Result<LoadedLedger, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No bounty record found, starting fresh");
                return Ok(LoadedLedger::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut lines = BufReader::new(file).lines();
        let root_line = lines.next().ok_or(StoreError::MissingRoot)??;
        let root: RootRecord = serde_json::from_str(&root_line)?;

        let mut loaded = LoadedLedger {
            bonus_pool: root.bonus_fund,
            ..LoadedLedger::default()
        };

        for (index, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // Root is line 1.
            let line_no = index.saturating_add(2);

            match accept(&line, directory, now) {
                Ok(bounty) => loaded.postings.push(bounty),
                Err((reason, detail)) => {
                    let err = StoreError::MalformedRecord {
                        line: line_no,
                        reason: detail,
                    };
                    tracing::warn!(
                        path = %self.path.display(),
                        reason = ?reason,
                        error = %err,
                        "Dropped persisted bounty"
                    );
                    loaded.dropped = loaded.dropped.saturating_add(1);
                }
            }
        }

        tracing::info!(
            path = %self.path.display(),
            postings = loaded.postings.len(),
            dropped = loaded.dropped,
            declared = root.count,
            bonus_pool = loaded.bonus_pool,
            "Bounty record loaded"
        );

        Ok(loaded)
    }

    /// Write the ledger, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialization`] if the
    /// record cannot be written. The previous record is left untouched.
    pub fn save(&self, ledger: &BountyLedger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        let result = write_record(&staging, ledger);
        if result.is_err() {
            // Best effort; the staging file is garbage either way.
            let _ = fs::remove_file(&staging);
            return result;
        }

        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::info!(
            path = %self.path.display(),
            postings = ledger.len(),
            bonus_pool = ledger.bonus_pool(),
            "Bounty record saved"
        );
        Ok(())
    }
}

/// Write the whole record to `staging` and flush it to disk.
fn write_record(staging: &Path, ledger: &BountyLedger) -> Result<(), StoreError> {
    let file = File::create(staging)?;
    let mut out = BufWriter::new(file);

    let root = RootRecord {
        count: u64::try_from(ledger.len()).unwrap_or(u64::MAX),
        bonus_fund: ledger.bonus_pool(),
    };
    serde_json::to_writer(&mut out, &root)?;
    out.write_all(b"\n")?;

    for bounty in ledger.postings() {
        serde_json::to_writer(&mut out, &PostingRecord::from_bounty(bounty))?;
        out.write_all(b"\n")?;
    }

    out.flush()?;
    out.get_ref().sync_all()?;
    Ok(())
}

/// Parse one posting line and apply the load filter.
fn accept(
    line: &str,
    directory: &dyn PlayerDirectory,
    now: DateTime<Utc>,
) -> Result<Bounty, (DropReason, String)> {
    let record: PostingRecord =
        serde_json::from_str(line).map_err(|e| (DropReason::Malformed, e.to_string()))?;
    let bounty = record
        .to_bounty(now)
        .map_err(|detail| (DropReason::Malformed, detail))?;

    if directory.resolve_live(bounty.wanted).is_none() {
        return Err((DropReason::UnknownWanted, bounty.wanted.to_string()));
    }
    if bounty.reward == 0 {
        return Err((DropReason::ZeroReward, bounty.wanted.to_string()));
    }
    if bounty.posted_at > now {
        return Err((DropReason::PostedInFuture, bounty.posted_at.to_rfc3339()));
    }

    Ok(bounty)
}
