//! Persisting synthesized audio to a client-chosen path

use std::{io::Cursor, path::PathBuf};

use anyhow::Context;
use bytes::Bytes;

use crate::error::Result;

/// Write `audio` (a WAV buffer) to `path`
///
/// A path ending in `wav` receives the buffer unchanged; one ending in `pcm`
/// receives the raw little-endian 16-bit samples with the WAV header stripped.
///
/// # Errors
///
/// Returns an unclassified error if the buffer is not 16-bit WAV (for `pcm`)
/// or the file cannot be written
pub async fn save(path: &str, audio: Bytes) -> Result<()> {
    let path = PathBuf::from(path);

    let contents = if path.to_string_lossy().ends_with("pcm") {
        tokio::task::spawn_blocking(move || wav_to_pcm(&audio))
            .await
            .context("pcm conversion task failed")??
    } else {
        audio
    };

    tokio::fs::write(&path, &contents)
        .await
        .with_context(|| format!("failed to save audio to {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = contents.len(), "saved synthesized audio");

    Ok(())
}

/// Strip the WAV container, keeping interleaved `i16` samples as little-endian bytes
fn wav_to_pcm(wav: &[u8]) -> Result<Bytes> {
    let mut reader = hound::WavReader::new(Cursor::new(wav)).context("synthesized audio is not a WAV buffer")?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(anyhow::anyhow!(
            "cannot save {}-bit {:?} audio as pcm, expected 16-bit integer samples",
            spec.bits_per_sample,
            spec.sample_format
        )
        .into());
    }

    let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
    for sample in reader.samples::<i16>() {
        let sample = sample.context("corrupt sample in synthesized audio")?;
        pcm.extend_from_slice(&sample.to_le_bytes());
    }

    Ok(Bytes::from(pcm))
}
