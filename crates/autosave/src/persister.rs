//! Debounced persister
//!
//! Each persister is one tokio task that owns all of its state. Handles talk
//! to it over an unbounded channel, so `notify` never blocks. The task waits
//! on three things at once:
//! - commands from handles
//! - a single optional deadline (replacing it is how a countdown restarts)
//! - a single optional in-flight save
//!
//! Because the deadline and the in-flight save each occupy one slot, there is
//! never more than one pending countdown or one running save per persister.

use crate::config::AutosaveConfig;
use crate::draft::Draft;
use crate::status::{SaveFailure, SaveStatus};
use crate::target::SaveTarget;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::future::pending;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

enum Command<D> {
    Notify(D),
    Flush,
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running persister
///
/// Cheap to clone. When the last handle is dropped the task saves any
/// pending edit and exits; [`DebouncedPersister::shutdown`] does the same
/// but lets the caller wait for it.
pub struct DebouncedPersister<D> {
    commands: mpsc::UnboundedSender<Command<D>>,
    status: watch::Receiver<SaveStatus>,
    last_saved: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl<D: Draft> DebouncedPersister<D> {
    /// Start a persister task on the current tokio runtime
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn<T>(config: AutosaveConfig<D>, target: T) -> Self
    where
        T: SaveTarget<D>,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let last_saved = Arc::new(RwLock::new(None));

        debug!(interval = ?config.interval, "Starting autosave task");

        let worker = Worker {
            config,
            target: Arc::new(target),
            status: status_tx,
            last_saved: Arc::clone(&last_saved),
            draft: None,
            dirty: false,
            deadline: None,
            in_flight: None,
            retry_requested: false,
        };
        tokio::spawn(worker.run(command_rx));

        Self {
            commands,
            status,
            last_saved,
        }
    }

    /// Record a new draft snapshot and restart the countdown
    ///
    /// Returns immediately. If a save is running, the snapshot is kept and a
    /// new countdown starts once that save finishes.
    pub fn notify(&self, draft: D) {
        if self.commands.send(Command::Notify(draft)).is_err() {
            debug!("Autosave task has stopped; edit ignored");
        }
    }

    /// Save now instead of waiting for the countdown
    ///
    /// Does nothing if there is no unsaved content. This is also how a
    /// failed save is retried without a new edit.
    pub fn flush(&self) {
        if self.commands.send(Command::Flush).is_err() {
            debug!("Autosave task has stopped; flush ignored");
        }
    }

    /// Current status
    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Time of the most recent successful save
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        *self.last_saved.read()
    }

    /// Finish any running save, save pending edits, and stop the task
    pub async fn shutdown(self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown(reply_tx)).is_ok() {
            let _ = reply_rx.await;
        }
    }
}

impl<D> Clone for DebouncedPersister<D> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            status: self.status.clone(),
            last_saved: Arc::clone(&self.last_saved),
        }
    }
}

/// State owned by the persister task
struct Worker<D: Draft> {
    config: AutosaveConfig<D>,
    target: Arc<dyn SaveTarget<D>>,
    status: watch::Sender<SaveStatus>,
    last_saved: Arc<RwLock<Option<DateTime<Utc>>>>,

    /// Latest snapshot from the editor
    draft: Option<D>,
    /// Edits exist that no successful save has covered
    dirty: bool,
    /// When the current countdown ends
    deadline: Option<Instant>,
    in_flight: Option<BoxFuture<'static, anyhow::Result<()>>>,
    /// An edit or flush arrived while a save was in flight
    retry_requested: bool,
}

impl<D: Draft> Worker<D> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command<D>>) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Notify(draft)) => self.on_notify(draft),
                    Some(Command::Flush) => self.on_flush(),
                    Some(Command::Shutdown(reply)) => {
                        self.drain().await;
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.drain().await;
                        break;
                    }
                },
                result = wait_in_flight(&mut self.in_flight) => self.on_save_complete(result),
                () = wait_deadline(self.deadline) => {
                    self.deadline = None;
                    self.start_save();
                }
            }
        }
        debug!("Autosave task stopped");
    }

    fn on_notify(&mut self, draft: D) {
        let has_content = self.config.should_save(&draft);
        self.draft = Some(draft);
        self.dirty = true;

        if self.in_flight.is_some() {
            debug!("Edit arrived during save; queued for the next cycle");
            self.retry_requested = true;
            return;
        }

        self.deadline = Some(Instant::now() + self.config.interval);
        if has_content {
            self.set_status(SaveStatus::Dirty);
        }
    }

    fn on_flush(&mut self) {
        if self.in_flight.is_some() {
            self.retry_requested = true;
            return;
        }
        self.deadline = None;
        self.start_save();
    }

    /// Begin saving the latest snapshot, if there is anything worth saving
    fn start_save(&mut self) {
        if !self.dirty {
            return;
        }
        let Some(draft) = self.draft.clone() else {
            return;
        };

        if !self.config.should_save(&draft) {
            debug!("Draft has no content; skipping save");
            self.dirty = false;
            if *self.status.borrow() == SaveStatus::Dirty {
                self.set_status(SaveStatus::Idle);
            }
            return;
        }

        self.dirty = false;
        self.set_status(SaveStatus::Saving);
        let target = Arc::clone(&self.target);
        self.in_flight = Some(Box::pin(async move { target.save(draft).await }));
    }

    fn on_save_complete(&mut self, result: anyhow::Result<()>) {
        self.in_flight = None;

        match result {
            Ok(()) => {
                let at = Utc::now();
                *self.last_saved.write() = Some(at);
                info!(saved_at = %at, "Draft saved");
                self.set_status(SaveStatus::Saved { at });
            }
            Err(err) => {
                let failure = SaveFailure::from_error(&err);
                warn!(error = %failure.message, "Autosave failed; edits kept for the next attempt");
                self.dirty = true;
                self.set_status(SaveStatus::Failed(failure));
            }
        }

        if std::mem::take(&mut self.retry_requested) {
            self.deadline = Some(Instant::now() + self.config.interval);
            let has_content = self
                .draft
                .as_ref()
                .is_some_and(|draft| self.config.should_save(draft));
            if self.dirty && has_content {
                self.set_status(SaveStatus::Dirty);
            }
        }
    }

    /// Let the running save finish, then save whatever is still pending
    async fn drain(&mut self) {
        if let Some(save) = self.in_flight.take() {
            let result = save.await;
            self.on_save_complete(result);
        }

        self.deadline = None;
        self.retry_requested = false;
        self.start_save();

        if let Some(save) = self.in_flight.take() {
            let result = save.await;
            self.on_save_complete(result);
        }
        self.deadline = None;
    }

    fn set_status(&self, status: SaveStatus) {
        debug!(status = %status, "Autosave status changed");
        self.status.send_replace(status);
    }
}

async fn wait_in_flight(slot: &mut Option<BoxFuture<'static, anyhow::Result<()>>>) -> anyhow::Result<()> {
    match slot.as_mut() {
        Some(save) => save.await,
        None => pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    const INTERVAL: Duration = Duration::from_secs(30);

    /// Records every save and can be told to fail or to take a while
    #[derive(Clone, Default)]
    struct Recorder {
        saves: Arc<Mutex<Vec<(Instant, String)>>>,
        failures_left: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl Recorder {
        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn failing(times: usize) -> Self {
            let recorder = Self::default();
            recorder.failures_left.store(times, Ordering::SeqCst);
            recorder
        }

        fn drafts(&self) -> Vec<String> {
            self.saves.lock().iter().map(|(_, draft)| draft.clone()).collect()
        }

        fn times(&self) -> Vec<Instant> {
            self.saves.lock().iter().map(|(at, _)| *at).collect()
        }
    }

    #[async_trait]
    impl SaveTarget<String> for Recorder {
        async fn save(&self, draft: String) -> anyhow::Result<()> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            self.saves.lock().push((Instant::now(), draft));

            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            let fail = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if fail {
                anyhow::bail!("network unreachable");
            }
            Ok(())
        }
    }

    fn spawn(recorder: &Recorder) -> DebouncedPersister<String> {
        DebouncedPersister::spawn(
            AutosaveConfig::new().with_interval(INTERVAL),
            recorder.clone(),
        )
    }

    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_collapses_into_one_save() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        for i in 0..5 {
            persister.notify(format!("draft {i}"));
            sleep(Duration::from_secs(10)).await;
        }
        persister.notify("final".to_string());
        let last_edit = Instant::now();
        assert_eq!(persister.status(), SaveStatus::Dirty);

        sleep(Duration::from_secs(29)).await;
        assert!(recorder.drafts().is_empty());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(recorder.drafts(), vec!["final".to_string()]);
        assert_near(recorder.times()[0] - last_edit, INTERVAL);
        assert!(matches!(persister.status(), SaveStatus::Saved { .. }));
        assert!(persister.last_saved().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_editor_saves_nothing_more() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("once".to_string());
        sleep(Duration::from_secs(300)).await;
        assert_eq!(recorder.drafts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_save_waits_for_it() {
        let recorder = Recorder::slow(Duration::from_secs(5));
        let persister = spawn(&recorder);
        let start = Instant::now();

        persister.notify("first".to_string());
        sleep(Duration::from_secs(31)).await;
        assert_eq!(persister.status(), SaveStatus::Saving);

        // Save runs from t=30 to t=35
        persister.notify("second".to_string());
        sleep(Duration::from_secs(1)).await;
        assert_eq!(recorder.drafts().len(), 1);
        assert_eq!(persister.status(), SaveStatus::Saving);

        // First save done at t=35; the queued edit starts a fresh countdown
        sleep(Duration::from_secs(10)).await;
        assert_eq!(recorder.drafts().len(), 1);
        assert_eq!(persister.status(), SaveStatus::Dirty);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(recorder.drafts(), vec!["first".to_string(), "second".to_string()]);
        assert_near(recorder.times()[1] - start, Duration::from_secs(65));
        assert_eq!(recorder.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_draft_never_saves() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify(String::new());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(persister.status(), SaveStatus::Idle);

        sleep(Duration::from_secs(31)).await;
        assert!(recorder.drafts().is_empty());
        assert_eq!(persister.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_draft_keeps_previous_terminal_state() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("content".to_string());
        sleep(Duration::from_secs(31)).await;
        let saved = persister.status();
        assert!(matches!(saved, SaveStatus::Saved { .. }));

        persister.notify("   ".to_string());
        sleep(Duration::from_secs(31)).await;
        assert_eq!(persister.status(), saved);
        assert_eq!(recorder.drafts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_content_before_expiry_returns_to_idle() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("typo".to_string());
        sleep(Duration::from_secs(5)).await;
        assert_eq!(persister.status(), SaveStatus::Dirty);

        persister.notify(String::new());
        sleep(Duration::from_secs(31)).await;
        assert!(recorder.drafts().is_empty());
        assert_eq!(persister.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_edits_and_next_notify_retries() {
        let recorder = Recorder::failing(1);
        let persister = spawn(&recorder);

        persister.notify("draft".to_string());
        sleep(Duration::from_secs(31)).await;
        match persister.status() {
            SaveStatus::Failed(failure) => assert!(failure.message.contains("network unreachable")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(persister.last_saved().is_none());

        // No automatic retry
        sleep(Duration::from_secs(120)).await;
        assert_eq!(recorder.drafts().len(), 1);

        persister.notify("draft, edited".to_string());
        sleep(Duration::from_millis(1)).await;
        assert_eq!(persister.status(), SaveStatus::Dirty);

        sleep(Duration::from_secs(31)).await;
        assert_eq!(recorder.drafts(), vec!["draft".to_string(), "draft, edited".to_string()]);
        assert!(matches!(persister.status(), SaveStatus::Saved { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_retries_failed_save_without_new_edit() {
        let recorder = Recorder::failing(1);
        let persister = spawn(&recorder);

        persister.notify("draft".to_string());
        sleep(Duration::from_secs(31)).await;
        assert!(persister.status().is_failed());

        persister.flush();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(recorder.drafts(), vec!["draft".to_string(), "draft".to_string()]);
        assert!(matches!(persister.status(), SaveStatus::Saved { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_immediately_and_cancels_countdown() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("now please".to_string());
        persister.flush();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(recorder.drafts(), vec!["now please".to_string()]);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(recorder.drafts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_without_changes_is_a_no_op() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.flush();
        persister.notify(String::new());
        persister.flush();
        sleep(Duration::from_secs(60)).await;
        assert!(recorder.drafts().is_empty());
        assert_eq!(persister.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_saves_pending_edit() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("unsaved".to_string());
        persister.clone().shutdown().await;
        assert_eq!(recorder.drafts(), vec!["unsaved".to_string()]);

        // The task is gone; later edits go nowhere
        persister.notify("too late".to_string());
        sleep(Duration::from_secs(60)).await;
        assert_eq!(recorder.drafts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_in_flight_save() {
        let recorder = Recorder::slow(Duration::from_secs(5));
        let persister = spawn(&recorder);

        persister.notify("first".to_string());
        sleep(Duration::from_secs(31)).await;
        persister.notify("second".to_string());
        persister.shutdown().await;

        assert_eq!(recorder.drafts(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(recorder.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_handle_flushes() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);

        persister.notify("left open".to_string());
        drop(persister);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(recorder.drafts(), vec!["left open".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let recorder = Recorder::default();
        let persister = spawn(&recorder);
        let mut status = persister.subscribe();

        persister.notify("watched".to_string());
        status
            .wait_for(|s| matches!(s, SaveStatus::Saved { .. }))
            .await
            .unwrap();
        assert_eq!(recorder.drafts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_predicate() {
        let recorder = Recorder::default();
        let persister = DebouncedPersister::spawn(
            AutosaveConfig::new()
                .with_interval(INTERVAL)
                .with_should_save(|draft: &String| draft.len() > 5),
            recorder.clone(),
        );

        persister.notify("short".to_string());
        sleep(Duration::from_secs(31)).await;
        assert!(recorder.drafts().is_empty());

        persister.notify("long enough".to_string());
        sleep(Duration::from_secs(31)).await;
        assert_eq!(recorder.drafts(), vec!["long enough".to_string()]);
    }
}
