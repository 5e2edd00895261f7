//! Persister configuration

use crate::draft::Draft;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Quiet period used when none is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30_000);

/// Decides whether a draft is worth saving
pub type SavePredicate<D> = Arc<dyn Fn(&D) -> bool + Send + Sync>;

/// Configuration for a [`crate::DebouncedPersister`]
pub struct AutosaveConfig<D> {
    /// Quiet period after the last edit before a save starts (default: 30s)
    pub interval: Duration,
    should_save: Option<SavePredicate<D>>,
}

impl<D: Draft> AutosaveConfig<D> {
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            should_save: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the default [`Draft::has_content`] check
    pub fn with_should_save<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&D) -> bool + Send + Sync + 'static,
    {
        self.should_save = Some(Arc::new(predicate));
        self
    }

    pub fn should_save(&self, draft: &D) -> bool {
        match &self.should_save {
            Some(predicate) => predicate(draft),
            None => draft.has_content(),
        }
    }
}

impl<D: Draft> Default for AutosaveConfig<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for AutosaveConfig<D> {
    fn clone(&self) -> Self {
        Self {
            interval: self.interval,
            should_save: self.should_save.clone(),
        }
    }
}

impl<D> fmt::Debug for AutosaveConfig<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutosaveConfig")
            .field("interval", &self.interval)
            .field("custom_should_save", &self.should_save.is_some())
            .finish()
    }
}
