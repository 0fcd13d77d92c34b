use crate::error::{AppError, Result};
use crate::model::Format;

/// Picks the first audio-only format in resolver order.
///
/// Later, possibly better, audio formats are never considered.
///
/// # Errors
/// `AppError::NotFound` when no format carries audio without video.
pub fn select_audio_format(formats: &[Format]) -> Result<&Format> {
    formats.iter().find(|f| f.is_audio_only()).ok_or_else(|| {
        AppError::NotFound(format!(
            "no audio-only format among {} formats",
            formats.len()
        ))
    })
}
