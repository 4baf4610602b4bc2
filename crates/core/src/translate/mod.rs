//! Translation orchestration utilities.
//! This module wires subtitle parsing, remote translation calls and
//! checkpointed output writing.

use crate::{backup, srt};
use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

/// Default number of subtitles translated per remote call.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Delimiter between batch entries: a line containing exactly three hyphens.
pub const BATCH_DELIMITER: &str = "\n---\n";

pub mod anthropic;

/// Translates one block of text to a target language in a single attempt.
/// Retry and fallback live above this seam, so implementations only have
/// to report what the remote service actually returned.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `language`, returning the raw reply.
    async fn translate(&self, text: &str, language: &str) -> Result<String>;
}

/// Bounded retry schedule for remote calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up, including the first one.
    pub max_attempts: usize,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Options for one translation run.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Target language passed to the translator.
    pub language: String,
    /// Number of subtitles per batch.
    pub batch_size: usize,
    /// Pause inserted between batches to stay clear of rate limits.
    pub batch_pause: Duration,
    /// Retry schedule for each batch.
    pub retry: RetryPolicy,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            language: "French".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }
}

/// How a translation run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// All batches were translated and the output file written.
    Completed,
    /// An interrupt was observed; progress is kept in the sidecar file.
    Interrupted,
}

/// Translate a batch of texts with bounded retries and identity fallback.
/// The texts travel as one block joined by [`BATCH_DELIMITER`] and the
/// reply is split on the same delimiter. A reply that does not split into
/// exactly one part per entry counts as a failed attempt, so a service
/// that merges entries or adds commentary can never misalign the batch.
/// Once the budget is exhausted the original texts are returned unchanged;
/// no error escapes this function.
pub async fn translate_with_retry<T>(
    translator: &T,
    texts: &[String],
    language: &str,
    retry: &RetryPolicy,
) -> Vec<String>
where
    T: Translator + ?Sized,
{
    let combined = texts.join(BATCH_DELIMITER);
    for attempt in 1..=retry.max_attempts {
        match translator.translate(&combined, language).await {
            Ok(reply) => {
                let parts: Vec<&str> = reply.split(BATCH_DELIMITER).collect();
                if parts.len() == texts.len() {
                    return parts.iter().map(|p| p.trim().to_string()).collect();
                }
                warn!(
                    "translation attempt {attempt} returned {} parts for {} entries",
                    parts.len(),
                    texts.len()
                );
            }
            Err(err) => warn!("translation attempt {attempt} failed: {err:#}"),
        }
        if attempt < retry.max_attempts {
            debug!("retrying in {:?}", retry.delay);
            sleep(retry.delay).await;
        }
    }
    warn!(
        "translation failed after {} attempts, keeping original text",
        retry.max_attempts
    );
    texts.to_vec()
}

/// Translate an SRT file end to end and write the result to `output`.
/// A pre-existing output file is backed up first. Progress is written to
/// `<output>.progress` after every batch and the sidecar removed again on
/// success. The `interrupt` flag is consulted between batches only, so a
/// batch in flight always runs to completion before the run stops.
pub async fn translate_file<T>(
    input: &Path,
    output: &Path,
    translator: &T,
    options: &JobOptions,
    interrupt: &AtomicBool,
) -> Result<Outcome>
where
    T: Translator + ?Sized,
{
    trace!(
        "translate_file input={} output={}",
        input.display(),
        output.display()
    );
    info!("translating {} to {}", input.display(), output.display());
    if output.exists() {
        let backup_path = backup::create_backup(output)?;
        info!("created backup of existing output: {}", backup_path.display());
    }

    let content = fs::read_to_string(input)?;
    let subtitles = srt::parse(&content);
    let total = subtitles.len();
    info!("found {total} subtitles to translate");

    let progress_path = sidecar_path(output, ".progress");
    let batch_size = options.batch_size.max(1);
    let batch_count = total.div_ceil(batch_size);
    let mut translated: Vec<srt::Subtitle> = Vec::with_capacity(total);

    for (batch_index, batch) in subtitles.chunks(batch_size).enumerate() {
        if interrupt.load(Ordering::SeqCst) {
            info!("translation interrupted, saving progress");
            save_progress(&translated, &progress_path)?;
            info!("progress saved to {}", progress_path.display());
            return Ok(Outcome::Interrupted);
        }
        if batch_index > 0 {
            sleep(options.batch_pause).await;
        }
        let first = batch_index * batch_size + 1;
        let last = first + batch.len() - 1;
        info!(
            "translating batch {}/{batch_count} (subtitles {first}-{last})",
            batch_index + 1
        );
        let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
        let begin = Instant::now();
        let parts =
            translate_with_retry(translator, &texts, &options.language, &options.retry).await;
        debug!(
            "batch {} translated in {} ms",
            batch_index + 1,
            begin.elapsed().as_millis()
        );
        for (subtitle, text) in batch.iter().zip(parts) {
            translated.push(srt::Subtitle {
                text,
                ..subtitle.clone()
            });
        }
        save_progress(&translated, &progress_path)?;
        info!(
            "progress: {:.1}%",
            translated.len() as f64 * 100.0 / total as f64
        );
    }

    save_progress(&translated, output)?;
    if progress_path.exists() {
        fs::remove_file(&progress_path)?;
    }
    info!("translation completed, output saved to {}", output.display());
    Ok(Outcome::Completed)
}

/// Write the accumulated subtitles to `path` in SRT form.
/// The same serializer produces the progress sidecar and the final output,
/// so a salvaged sidecar is itself a valid SRT file.
fn save_progress(subtitles: &[srt::Subtitle], path: &Path) -> Result<()> {
    trace!("save_progress path={}", path.display());
    fs::write(path, srt::format(subtitles))?;
    Ok(())
}

/// Derive a sidecar path by appending `suffix` to the full file name.
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
