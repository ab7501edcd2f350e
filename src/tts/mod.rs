//! Speech synthesis adapter.
//!
//! Fetches synthesized audio for a classification announcement and stores it
//! as an on-disk artifact served from `/audio`. Synthesis is best-effort:
//! callers treat a failure as a degraded (audio-less) result, never as a
//! request failure.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::constants::{AUDIO_FILE_EXT, AUDIO_FILE_PREFIX, MIN_AUDIO_BYTES};
use crate::error::{AppError, Result};

const TTS_URL: &str = "https://translate.google.com/translate_tts";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A generated audio file on disk
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub filename: String,
    pub url: String,
}

/// Speech synthesis contract
///
/// A trait seam so tests can run the image path with a stub.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact>;
}

/// Google Translate TTS-backed synthesizer
pub struct GoogleTranslateTts {
    http_client: reqwest::Client,
    audio_dir: PathBuf,
}

impl GoogleTranslateTts {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        // The endpoint answers some requests with a redirect; follow one hop
        // at most.
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(1))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client for TTS adapter: {}", e);
                reqwest::Client::new()
            });

        Self {
            http_client,
            audio_dir: audio_dir.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "TTS text cannot be empty".to_string(),
            ));
        }

        let response = self
            .http_client
            .get(TTS_URL)
            .header("User-Agent", USER_AGENT)
            .query(&[("ie", "UTF-8"), ("q", text), ("tl", "en"), ("client", "tw-cm")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "TTS request failed with status {}",
                status
            )));
        }

        let audio = response.bytes().await?;
        if audio.len() < MIN_AUDIO_BYTES {
            return Err(AppError::Upstream(format!(
                "TTS response too small to be audio: {} bytes",
                audio.len()
            )));
        }

        tokio::fs::create_dir_all(&self.audio_dir).await?;

        let filename = generate_audio_filename();
        let filepath = self.audio_dir.join(&filename);

        if let Err(e) = tokio::fs::write(&filepath, &audio).await {
            // Best-effort removal of a partially written file
            if let Err(cleanup_err) = tokio::fs::remove_file(&filepath).await {
                tracing::warn!(
                    "Failed to clean up partial audio file {:?}: {}",
                    filepath,
                    cleanup_err
                );
            }
            return Err(e.into());
        }

        tracing::info!("Generated audio artifact {} ({} bytes)", filename, audio.len());

        Ok(AudioArtifact {
            url: format!("/audio/{}", filename),
            filename,
        })
    }
}

/// Build a unique artifact name: `tts_<millis>_<uuid fragment>.mp3`
fn generate_audio_filename() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}_{}{}",
        AUDIO_FILE_PREFIX,
        millis,
        &suffix[..6],
        AUDIO_FILE_EXT
    )
}

/// Whether a directory entry looks like one of our artifacts
fn is_audio_artifact(name: &str) -> bool {
    name.starts_with(AUDIO_FILE_PREFIX) && name.ends_with(AUDIO_FILE_EXT)
}

/// Delete synthesized audio files older than `max_age_hours`
///
/// Per-file failures are logged and skipped; the sweep always visits every
/// entry. Foreign files in the directory are never touched.
pub async fn sweep_expired(audio_dir: &Path, max_age_hours: u64) -> Result<usize> {
    let max_age = Duration::from_secs(max_age_hours * 3600);
    let mut removed = 0usize;

    let mut entries = match tokio::fs::read_dir(audio_dir).await {
        Ok(entries) => entries,
        // Nothing synthesized yet
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_audio_artifact(name) {
            continue;
        }

        let age = match entry.metadata().await.and_then(|m| m.modified()) {
            Ok(modified) => modified.elapsed().unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to stat audio file {}: {}", name, e);
                continue;
            }
        };

        if age > max_age {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    tracing::info!("Deleted expired audio file: {}", name);
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to delete audio file {}: {}", name, e);
                }
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_filenames_match_artifact_pattern() {
        let a = generate_audio_filename();
        let b = generate_audio_filename();

        assert!(is_audio_artifact(&a));
        assert!(is_audio_artifact(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_foreign_names_are_not_artifacts() {
        assert!(!is_audio_artifact("notes.txt"));
        assert!(!is_audio_artifact("tts_123.wav"));
        assert!(!is_audio_artifact("song.mp3"));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_stale_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        tokio::fs::write(dir.join("tts_1_abc123.mp3"), b"old audio")
            .await
            .unwrap();
        tokio::fs::write(dir.join("keep.txt"), b"not ours").await.unwrap();

        // Let the artifact's mtime fall behind "now"
        tokio::time::sleep(Duration::from_millis(50)).await;

        let removed = sweep_expired(dir, 0).await.unwrap();
        assert_eq!(removed, 1);

        assert!(!dir.join("tts_1_abc123.mp3").exists());
        assert!(dir.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        tokio::fs::write(dir.join("tts_2_def456.mp3"), b"fresh audio")
            .await
            .unwrap();

        let removed = sweep_expired(dir, 24).await.unwrap();
        assert_eq!(removed, 0);
        assert!(dir.join("tts_2_def456.mp3").exists());
    }

    #[tokio::test]
    async fn test_sweep_of_missing_directory_is_a_noop() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("never-created");

        let removed = sweep_expired(&missing, 24).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_text() {
        let temp_dir = TempDir::new().unwrap();
        let tts = GoogleTranslateTts::new(temp_dir.path());

        let err = tts.synthesize("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
