//! Background polling of watched projects.
//!
//! A single scheduler owns the set of watched project roots and a busy
//! flag. Every tick walks the projects sequentially and triggers a reload
//! for each; a tick that fires while a previous one is still running is a
//! silent no-op — ticks are never queued, so there is no backlog.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::DEFAULT_WATCH_INTERVAL_SECS;
use crate::knowledge::KnowledgeError;

/// Reload hook invoked by the scheduler for each watched project.
#[async_trait]
pub trait ProjectReloader: Send + Sync {
    async fn reload_project(&self, project: &str) -> Result<(), KnowledgeError>;
}

/// Owns the watched-project set and the process-wide busy flag.
pub struct WatchScheduler {
    projects: Mutex<BTreeSet<String>>,
    busy: AtomicBool,
    interval: Duration,
}

impl WatchScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            projects: Mutex::new(BTreeSet::new()),
            busy: AtomicBool::new(false),
            interval,
        }
    }

    /// Start watching a project root. Returns false if already watched.
    pub fn add_project(&self, project: impl Into<String>) -> bool {
        self.projects.lock().unwrap().insert(project.into())
    }

    /// Stop watching a project root. Returns false if it was not watched.
    pub fn remove_project(&self, project: &str) -> bool {
        self.projects.lock().unwrap().remove(project)
    }

    /// Snapshot of the watched project roots.
    pub fn list_projects(&self) -> Vec<String> {
        self.projects.lock().unwrap().iter().cloned().collect()
    }

    /// Run one poll tick: reload every watched project sequentially.
    ///
    /// Returns false without doing anything when a previous tick is still
    /// running. Reload failures are logged per project and never stop the
    /// sweep.
    pub async fn tick(&self, reloader: &dyn ProjectReloader) -> bool {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("poll tick skipped: previous tick still running");
            return false;
        }

        let projects = self.list_projects();
        for project in &projects {
            if let Err(e) = reloader.reload_project(project).await {
                warn!(project, error = %e, "watched reload failed");
            }
        }

        self.busy.store(false, Ordering::Release);
        true
    }

    /// Spawn the poll loop on the current tokio runtime. Abort the returned
    /// handle to stop watching.
    pub fn spawn(self: Arc<Self>, reloader: Arc<dyn ProjectReloader>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.tick(reloader.as_ref()).await;
            }
        })
    }
}

impl Default for WatchScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_WATCH_INTERVAL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingReloader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProjectReloader for CountingReloader {
        async fn reload_project(&self, _project: &str) -> Result<(), KnowledgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BlockingReloader {
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl ProjectReloader for BlockingReloader {
        async fn reload_project(&self, _project: &str) -> Result<(), KnowledgeError> {
            self.release.notified().await;
            Ok(())
        }
    }

    #[test]
    fn test_add_remove_list() {
        let scheduler = WatchScheduler::default();

        assert!(scheduler.add_project("/a"));
        assert!(!scheduler.add_project("/a"));
        assert!(scheduler.add_project("/b"));
        assert_eq!(scheduler.list_projects(), vec!["/a", "/b"]);

        assert!(scheduler.remove_project("/a"));
        assert!(!scheduler.remove_project("/a"));
        assert_eq!(scheduler.list_projects(), vec!["/b"]);
    }

    #[tokio::test]
    async fn test_tick_reloads_each_project() {
        let scheduler = WatchScheduler::default();
        scheduler.add_project("/a");
        scheduler.add_project("/b");

        let reloader = CountingReloader { calls: AtomicUsize::new(0) };
        assert!(scheduler.tick(&reloader).await);
        assert_eq!(reloader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_busy_tick_is_silent_noop() {
        let scheduler = Arc::new(WatchScheduler::default());
        scheduler.add_project("/a");

        let blocking = Arc::new(BlockingReloader { release: tokio::sync::Notify::new() });

        let running = {
            let scheduler = Arc::clone(&scheduler);
            let blocking = Arc::clone(&blocking);
            tokio::spawn(async move { scheduler.tick(blocking.as_ref()).await })
        };
        // Let the first tick take the busy flag and park in the reload.
        tokio::task::yield_now().await;

        let counting = CountingReloader { calls: AtomicUsize::new(0) };
        assert!(!scheduler.tick(&counting).await);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

        blocking.release.notify_one();
        assert!(running.await.unwrap());

        // The flag is released afterwards.
        assert!(scheduler.tick(&counting).await);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_sweep() {
        struct FailingReloader {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl ProjectReloader for FailingReloader {
            async fn reload_project(&self, _project: &str) -> Result<(), KnowledgeError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(KnowledgeError::Store("backend down".into()))
            }
        }

        let scheduler = WatchScheduler::default();
        scheduler.add_project("/a");
        scheduler.add_project("/b");

        let reloader = FailingReloader { calls: AtomicUsize::new(0) };
        assert!(scheduler.tick(&reloader).await);
        assert_eq!(reloader.calls.load(Ordering::SeqCst), 2);
    }
}
