//! Save targets: where a draft goes when the persister decides to save
//!
//! The persister treats a target as a black box. Anything that can be
//! awaited and report success or an error will do.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Asynchronous save operation for drafts of type `D`
#[async_trait]
pub trait SaveTarget<D>: Send + Sync + 'static {
    async fn save(&self, draft: D) -> Result<()>;
}

/// Adapter turning an async closure into a [`SaveTarget`]
pub struct FnTarget<F>(F);

/// Wrap `f` so it can be used as a save target
///
/// ```no_run
/// use autosave::{save_fn, AutosaveConfig, DebouncedPersister};
///
/// # async fn demo() {
/// let persister = DebouncedPersister::spawn(
///     AutosaveConfig::new(),
///     save_fn(|draft: String| async move {
///         println!("saving {draft}");
///         Ok(())
///     }),
/// );
/// persister.notify("hello".to_string());
/// # }
/// ```
pub fn save_fn<D, F, Fut>(f: F) -> FnTarget<F>
where
    F: Fn(D) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnTarget(f)
}

#[async_trait]
impl<D, F, Fut> SaveTarget<D> for FnTarget<F>
where
    D: Send + 'static,
    F: Fn(D) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn save(&self, draft: D) -> Result<()> {
        (self.0)(draft).await
    }
}

/// Writes each draft as pretty-printed JSON to a single file
///
/// Writes go to a temporary file in the same directory, are fsynced, then
/// renamed over the target, so readers never see a partial draft.
#[derive(Debug, Clone)]
pub struct JsonFileTarget {
    path: PathBuf,
}

impl JsonFileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<D> SaveTarget<D> for JsonFileTarget
where
    D: Serialize + Send + 'static,
{
    async fn save(&self, draft: D) -> Result<()> {
        let data = serde_json::to_vec_pretty(&draft).context("Failed to serialize draft")?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || atomic_write(&path, &data))
            .await
            .context("Draft writer task panicked")?
    }
}

/// Write `data` to `target` via temp file + fsync + rename + directory fsync
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(data).context("Failed to write draft")?;
    tmp.as_file().sync_all().context("Failed to fsync draft")?;
    tmp.persist(target)
        .with_context(|| format!("Failed to move draft into place: {}", target.display()))?;
    sync_dir(dir)
}

/// Fsync a directory so a rename inside it survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    std::fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .with_context(|| format!("Failed to fsync directory: {}", dir.display()))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
