use std::sync::Arc;

use keepsake_db::Store;
use keepsake_types::ScoreEntry;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::validate::{NAME_AND_TIME_REQUIRED, TIME_NEGATIVE};

/// Append-only leaderboard of race times.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn Store>,
}

impl ScoreLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a new result. The stored name is trimmed.
    pub async fn record_score(&self, name: &str, time: i64) -> ApiResult<ScoreEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation(NAME_AND_TIME_REQUIRED));
        }
        if time < 0 {
            return Err(ApiError::validation(TIME_NEGATIVE));
        }

        let entry = self.store.insert_score(name, time).await?;
        info!(id = entry.id, time = entry.time, "Score recorded");
        Ok(entry)
    }

    /// The fastest time, or `None` when nobody has played yet.
    pub async fn best_score(&self) -> ApiResult<Option<ScoreEntry>> {
        Ok(self.store.best_score().await?)
    }

    /// Every score, fastest first; equal times keep submission order.
    pub async fn all_scores_ranked(&self) -> ApiResult<Vec<ScoreEntry>> {
        Ok(self.store.scores_ranked().await?)
    }
}
