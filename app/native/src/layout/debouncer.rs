//! Coalescing of rapid save requests.
//!
//! A live pane resize can produce dozens of saves per second. The debouncer
//! keeps only the newest pending save per project and writes it once the
//! project has been quiet for the settle time. The service itself does not
//! depend on it; saves issued directly are always safe.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::error::LayoutResult;
use super::ipc::SaveRequest;
use super::service::LayoutService;
use super::store::LayoutStore;
use super::tree::KnownPanes;

/// A save waiting for its project to settle.
#[derive(Debug)]
struct PendingSave {
    /// Bumped on every update; a timer only fires for the generation it was armed with.
    generation: u64,
    request: SaveRequest,
}

#[derive(Debug, Default)]
struct Pending {
    saves: HashMap<String, PendingSave>,
    next_generation: u64,
}

/// Per-project save debouncer.
///
/// Timers run on the Tokio runtime the debouncer is used from.
pub struct SaveDebouncer<S> {
    service: Arc<LayoutService<S>>,
    settle_time: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl<S: LayoutStore> SaveDebouncer<S> {
    /// Creates a debouncer writing through `service` after `settle_time` of quiet.
    #[must_use]
    pub fn new(service: Arc<LayoutService<S>>, settle_time: Duration) -> Self {
        Self {
            service,
            settle_time,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Number of projects with a save waiting.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.lock().saves.len() }

    /// Returns `true` if a save for `project` is waiting.
    #[must_use]
    pub fn is_pending(&self, project: &str) -> bool {
        self.pending.lock().saves.contains_key(project)
    }

    /// Queues `request`, replacing any save still waiting for the same project.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, request: SaveRequest) {
        let project = request.project_path.clone();
        let generation = {
            let mut pending = self.pending.lock();
            pending.next_generation += 1;
            let generation = pending.next_generation;
            pending.saves.insert(project.clone(), PendingSave { generation, request });
            generation
        };

        let pending = Arc::clone(&self.pending);
        let service = Arc::clone(&self.service);
        let settle_time = self.settle_time;

        tokio::spawn(async move {
            tokio::time::sleep(settle_time).await;

            let due = {
                let mut pending = pending.lock();
                match pending.saves.get(&project) {
                    Some(save) if save.generation == generation => pending.saves.remove(&project),
                    _ => None,
                }
            };

            if let Some(save) = due
                && let Err(err) = write(&service, save.request).await
            {
                tracing::warn!(project = %project, error = %err, "layout: debounced save failed");
            }
        });
    }

    /// Writes every waiting save immediately.
    ///
    /// All saves are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first storage error encountered.
    pub async fn flush(&self) -> LayoutResult<()> {
        let saves: Vec<PendingSave> =
            self.pending.lock().saves.drain().map(|(_, save)| save).collect();

        let mut first_error = None;
        for save in saves {
            if let Err(err) = write(&self.service, save.request).await {
                tracing::warn!(error = %err, "layout: flushed save failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

async fn write<S: LayoutStore>(
    service: &LayoutService<S>,
    request: SaveRequest,
) -> LayoutResult<()> {
    let known = request
        .known_pane_ids
        .filter(|ids| !ids.is_empty())
        .map(KnownPanes::new);

    service
        .save(
            &request.project_path,
            &request.layout,
            request.floating_panes,
            request.schema_version,
            known.as_ref(),
        )
        .await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::layout::geometry::{DisplayProvider, StaticDisplays};
    use crate::layout::service::LayoutSettings;
    use crate::layout::store::MemoryLayoutStore;

    const SETTLE: Duration = Duration::from_millis(300);

    fn debouncer() -> SaveDebouncer<MemoryLayoutStore> {
        let displays: Arc<dyn DisplayProvider> = Arc::new(StaticDisplays::default());
        let service =
            LayoutService::new(MemoryLayoutStore::new(), displays, LayoutSettings::default());
        SaveDebouncer::new(Arc::new(service), SETTLE)
    }

    fn save(project: &str, layout: &str) -> SaveRequest {
        SaveRequest {
            project_path: project.to_string(),
            layout: json!(layout),
            floating_panes: Some(vec![]),
            schema_version: None,
            known_pane_ids: None,
        }
    }

    fn stored_layout(
        debouncer: &SaveDebouncer<MemoryLayoutStore>,
        project: &str,
    ) -> Option<Value> {
        let bytes = debouncer.service.store().get(project)?;
        let record: Value = serde_json::from_slice(&bytes).ok()?;
        Some(record["layout"].clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_saves_coalesce_to_latest() {
        let debouncer = debouncer();

        debouncer.schedule(save("/p", "wizard"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(save("/p", "history"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(save("/p", "critique"));

        assert_eq!(debouncer.pending_len(), 1);
        assert!(stored_layout(&debouncer, "/p").is_none());

        tokio::time::sleep(SETTLE + Duration::from_millis(10)).await;

        assert_eq!(debouncer.pending_len(), 0);
        assert_eq!(stored_layout(&debouncer, "/p"), Some(json!("critique")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_projects_settle_independently() {
        let debouncer = debouncer();

        debouncer.schedule(save("/a", "wizard"));
        debouncer.schedule(save("/b", "history"));
        assert_eq!(debouncer.pending_len(), 2);

        tokio::time::sleep(SETTLE * 2).await;

        assert_eq!(stored_layout(&debouncer, "/a"), Some(json!("wizard")));
        assert_eq!(stored_layout(&debouncer, "/b"), Some(json!("history")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately() {
        let debouncer = debouncer();
        debouncer.schedule(save("/p", "analytics"));

        debouncer.flush().await.unwrap();

        assert!(!debouncer.is_pending("/p"));
        assert_eq!(stored_layout(&debouncer, "/p"), Some(json!("analytics")));

        // The timer finds nothing left to write.
        tokio::time::sleep(SETTLE * 2).await;
        assert_eq!(debouncer.service.store().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_reports_storage_error() {
        let debouncer = debouncer();
        debouncer.service.store().fail_writes(true);
        debouncer.schedule(save("/p", "analytics"));

        assert!(debouncer.flush().await.is_err());
        assert_eq!(debouncer.pending_len(), 0);
    }
}
