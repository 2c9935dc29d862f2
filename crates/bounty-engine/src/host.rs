//! The checkpoint loop.
//!
//! The board sits behind a single [`Mutex`]. Commands and checkpoints take
//! the same lock, so a sweep and the save that follows it never interleave
//! with a posting or a collection.

use std::future::Future;
use std::time::Duration;

use bounty_core::{BountyBoard, NoticeBoard, Treasury};
use bounty_ledger::PlayerDirectory;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Run one checkpoint under the board lock. Returns whether the record
/// was saved.
pub async fn checkpoint<D, T, N>(board: &Mutex<BountyBoard<D, T, N>>) -> bool
where
    D: PlayerDirectory,
    T: Treasury,
    N: NoticeBoard,
{
    let mut board = board.lock().await;
    match board.on_checkpoint(Utc::now()) {
        Ok(summary) => {
            info!(
                expired = summary.sweep.expired,
                invalidated = summary.sweep.invalidated,
                gold_returned = summary.sweep.gold_returned,
                postings = board.ledger().len(),
                bonus_pool = board.ledger().bonus_pool(),
                balanced = summary.anomaly.is_none(),
                "Checkpoint complete"
            );
            true
        }
        Err(e) => {
            warn!(error = %e, "Checkpoint save failed, previous record kept");
            false
        }
    }
}

/// Checkpoint every `period` until `shutdown` resolves, then checkpoint
/// once more. Returns the number of checkpoints run.
pub async fn run_checkpoints<D, T, N, F>(
    board: &Mutex<BountyBoard<D, T, N>>,
    period: Duration,
    shutdown: F,
) -> u64
where
    D: PlayerDirectory,
    T: Treasury,
    N: NoticeBoard,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the board was just loaded.
    ticker.tick().await;

    tokio::pin!(shutdown);
    let mut runs = 0_u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                checkpoint(board).await;
                runs = runs.saturating_add(1);
            }
            () = &mut shutdown => break,
        }
    }

    info!("Shutdown requested, running final checkpoint");
    checkpoint(board).await;
    runs.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use bounty_core::{Bank, NoticeLog};
    use bounty_ledger::{LedgerRules, Roster};
    use bounty_store::BountyStore;

    use super::*;

    #[tokio::test]
    async fn final_checkpoint_runs_on_shutdown() {
        let dir = tempfile::tempdir().ok();
        let path = dir
            .as_ref()
            .map(|d| d.path().join("bounty.jsonl"))
            .unwrap_or_default();

        let board = Mutex::new(BountyBoard::new(
            LedgerRules::default(),
            BountyStore::new(path.clone()),
            Roster::new(),
            Bank::new(),
            NoticeLog::new(),
        ));
        board.lock().await.on_start(Utc::now());

        let runs = run_checkpoints(
            &board,
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_millis(35)),
        )
        .await;

        assert!(runs >= 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn failed_save_is_reported_not_fatal() {
        let dir = tempfile::tempdir().ok();
        let blocker = dir
            .as_ref()
            .map(|d| d.path().join("not-a-dir"))
            .unwrap_or_default();
        let _ = std::fs::write(&blocker, "file in the way");

        let board = Mutex::new(BountyBoard::new(
            LedgerRules::default(),
            BountyStore::new(blocker.join("bounty.jsonl")),
            Roster::new(),
            Bank::new(),
            NoticeLog::new(),
        ));

        assert!(!checkpoint(&board).await);
    }
}
