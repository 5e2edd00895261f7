//! Edit an event draft from stdin with autosave
//!
//! Each input line is `field: value`. `!flush` saves immediately. Lines
//! starting with `#` are ignored. On end of input the pending draft is saved
//! before exiting.

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use autosave::{AutosaveConfig, DebouncedPersister, EventDraft, JsonFileTarget, SaveStatus};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config: &SystemConfig, output: &Path, interval_ms: Option<u64>) -> Result<()> {
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.autosave_interval());

    let mut draft = load_existing(output)?;
    let persister = DebouncedPersister::spawn(
        AutosaveConfig::new().with_interval(interval),
        JsonFileTarget::new(output),
    );

    let final_status = persister.subscribe();
    let mut updates = persister.subscribe();
    let reporter = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let status = updates.borrow_and_update().clone();
            print_status(&status);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "!flush" {
            persister.flush();
            continue;
        }

        let Some((field, value)) = line.split_once(':') else {
            eprintln!("{} expected 'field: value', got {:?}", "warning:".yellow(), line);
            continue;
        };
        match draft.set_field(field, value) {
            Ok(()) => persister.notify(draft.clone()),
            Err(e) => eprintln!("{} {}", "warning:".yellow(), e),
        }
    }

    persister.shutdown().await;
    reporter.await.context("Status reporter panicked")?;

    let status = final_status.borrow().clone();
    if let SaveStatus::Failed(failure) = status {
        anyhow::bail!("Draft was not saved: {}", failure.message);
    }
    Ok(())
}

/// Resume from an existing draft file, if any
fn load_existing(path: &Path) -> Result<EventDraft> {
    if !path.exists() {
        return Ok(EventDraft::default());
    }
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read draft: {}", path.display()))?;
    serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse draft: {}", path.display()))
}

fn print_status(status: &SaveStatus) {
    match status {
        SaveStatus::Idle => println!("{}", status),
        SaveStatus::Dirty => println!("{}", status.yellow()),
        SaveStatus::Saving => println!("{}", status.dimmed()),
        SaveStatus::Saved { .. } => println!("{}", status.green()),
        SaveStatus::Failed(_) => println!("{}", status.red()),
    }
}
