use serde_json::Value;
use thiserror::Error;

use super::{EventRecord, RawEvent};

/// A raw event that cannot become an [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Validate and canonicalize a raw observation.
///
/// `now_ms` is used as the observation time when the raw event carries none.
/// Blank strings count as missing.
pub fn normalize(raw: RawEvent, now_ms: i64) -> Result<EventRecord, ValidationError> {
    let series_id = required(raw.series_id, "seriesId")?;
    let season = required(raw.season, "season")?;
    let language = required(raw.language, "language")?.to_uppercase();

    let display_title = non_blank(raw.display_title).unwrap_or_else(|| series_id.clone());
    let source_url = non_blank(raw.source_url).unwrap_or_default();

    Ok(EventRecord {
        episode: parse_episode(raw.episode.as_ref()),
        observed_at: raw.observed_at.unwrap_or(now_ms),
        watch_duration_ms: raw.watch_duration_ms,
        series_id,
        display_title,
        season,
        language,
        source_url,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    non_blank(value).ok_or(ValidationError::MissingField(field))
}

fn parse_episode(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 1.0 {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    u32::try_from(number).ok().filter(|&n| n > 0)
}
