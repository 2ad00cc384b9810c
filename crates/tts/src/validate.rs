//! Parameter checks run before any engine work

use crate::{
    error::{Result, TtsError},
    types::SynthesisRequest,
};

const SAMPLE_RATES: [u32; 3] = [0, 8000, 16000];
const SAVE_FORMATS: [&str; 2] = ["pcm", "wav"];

/// Validate a synthesis request, reporting the first rule it breaks
///
/// Rules are checked in order: speed, volume, sample rate, save path, text.
///
/// # Errors
///
/// Returns [`TtsError::InvalidParam`] with the message of the failing rule
pub fn validate(request: &SynthesisRequest) -> Result<()> {
    if !in_unit_range(request.speed) {
        return Err(invalid("invalid speed value, the value should be between 0 and 3."));
    }

    if !in_unit_range(request.volume) {
        return Err(invalid("invalid volume value, the value should be between 0 and 3."));
    }

    if !SAMPLE_RATES.contains(&request.sample_rate) {
        return Err(invalid(
            "invalid sample_rate value, the choice of value is 0, 8000, 16000.",
        ));
    }

    if let Some(ref path) = request.save_path
        && !SAVE_FORMATS.iter().any(|format| path.ends_with(format))
    {
        return Err(invalid("invalid save_path, saved audio formats support pcm and wav"));
    }

    if request.text.trim().is_empty() {
        return Err(invalid("invalid text, the text should not be empty."));
    }

    Ok(())
}

/// `0 < value <= 3`; NaN fails both comparisons
fn in_unit_range(value: f64) -> bool {
    value > 0.0 && value <= 3.0
}

fn invalid(message: &str) -> TtsError {
    TtsError::InvalidParam(message.to_string())
}
