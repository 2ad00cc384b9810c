//! Request-scoped connection handlers and the dispatch from engine type to handler family

use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::{
    audio,
    engine::{Engine, EngineFamily},
    error::{Result, TtsError},
    types::{SynthesisRequest, SynthesisResult},
};

/// Chunks buffered between the engine and a slow client before synthesis pauses
const STREAM_BUFFER_CHUNKS: usize = 4;

/// Build the full-buffer handler for `engine`
///
/// # Errors
///
/// Returns [`TtsError::UnsupportedEngine`] unless the engine is `python` or `inference`
pub fn offline_handler(engine: &Arc<dyn Engine>) -> Result<OfflineConnectionHandler> {
    ensure_family(engine, EngineFamily::Offline)?;

    Ok(OfflineConnectionHandler {
        engine: Arc::clone(engine),
    })
}

/// Build the chunked handler for `engine`
///
/// # Errors
///
/// Returns [`TtsError::UnsupportedEngine`] unless the engine is `online` or `online-onnx`
pub fn streaming_handler(engine: &Arc<dyn Engine>) -> Result<StreamingConnectionHandler> {
    ensure_family(engine, EngineFamily::Streaming)?;

    Ok(StreamingConnectionHandler {
        engine: Arc::clone(engine),
    })
}

fn ensure_family(engine: &Arc<dyn Engine>, family: EngineFamily) -> Result<()> {
    let engine_type = engine.engine_type();
    if engine_type.family() == family {
        return Ok(());
    }

    let (family, expected) = match family {
        EngineFamily::Offline => ("Offline", "python or inference"),
        EngineFamily::Streaming => ("Online", "online or online-onnx"),
    };

    Err(TtsError::UnsupportedEngine {
        family,
        expected,
        engine: engine.name().to_string(),
        engine_type: engine_type.to_string(),
    })
}

/// Binds one offline synthesis request to a shared engine
pub struct OfflineConnectionHandler {
    engine: Arc<dyn Engine>,
}

impl OfflineConnectionHandler {
    /// Synthesize the whole utterance, saving it first when the request asks to
    pub async fn run(self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        let result = self.engine.synthesize(request).await?;

        tracing::info!(
            engine = self.engine.name(),
            lang = %result.lang,
            sample_rate = result.sample_rate,
            duration = result.duration,
            bytes = result.audio.len(),
            "synthesis complete"
        );

        if let Some(ref path) = request.save_path {
            audio::save(path, result.audio.clone()).await?;
        }

        Ok(result)
    }
}

/// Binds one streaming synthesis request to a shared engine
pub struct StreamingConnectionHandler {
    engine: Arc<dyn Engine>,
}

impl StreamingConnectionHandler {
    /// Start synthesis and return its chunks as they are produced
    ///
    /// A producer task pulls from the engine into a bounded channel. When the
    /// returned stream is dropped (client gone) the producer stops and drops
    /// the engine stream with it.
    pub fn run(self, sentence: String, spk_id: u32) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER_CHUNKS);

        tokio::spawn(produce(self.engine, sentence, spk_id, tx));

        futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|chunk| (chunk, rx)) })
    }
}

async fn produce(engine: Arc<dyn Engine>, sentence: String, spk_id: u32, tx: mpsc::Sender<Result<Bytes>>) {
    let started = tokio::select! {
        () = tx.closed() => {
            tracing::debug!(engine = engine.name(), "client went away before synthesis started");
            return;
        }
        started = engine.synthesize_stream(&sentence, spk_id) => started,
    };

    let mut chunks = match started {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::error!(engine = engine.name(), error = %e, "failed to start streaming synthesis");
            let _ = tx.send(Err(e)).await;
            return;
        }
    };

    let mut sent = 0usize;

    loop {
        tokio::select! {
            () = tx.closed() => {
                tracing::debug!(engine = engine.name(), sent, "client went away, stopping synthesis");
                return;
            }
            next = chunks.next() => match next {
                Some(Ok(chunk)) => {
                    if tx.send(Ok(chunk)).await.is_err() {
                        tracing::debug!(engine = engine.name(), sent, "client went away, stopping synthesis");
                        return;
                    }
                    sent += 1;
                }
                Some(Err(e)) => {
                    tracing::error!(engine = engine.name(), sent, error = %e, "streaming synthesis failed");
                    let _ = tx.send(Err(e)).await;
                    return;
                }
                None => break,
            }
        }
    }

    tracing::info!(engine = engine.name(), chunks = sent, "streaming synthesis complete");
}
