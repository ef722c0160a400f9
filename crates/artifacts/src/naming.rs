/// Result filename construction
///
/// Filenames follow `{label}_{timestamp}_{prompt prefix}_{extra}.{ext}`.
/// The timestamp has one-second resolution, so identical saves in the
/// same second may collide; no dedup is attempted.
use crate::OutputFormat;
use chrono::{DateTime, Utc};
use wavespeed_api::Capability;

/// How much of the prompt survives into the filename.
const PROMPT_PREFIX_CHARS: usize = 30;

/// Replace every character outside `[A-Za-z0-9 _-]` with `_`, collapse
/// runs of `_`, and trim leading/trailing `_`.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_underscore = false;

    for ch in raw.chars() {
        let mapped = if ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '-') {
            ch
        } else {
            '_'
        };
        if mapped == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(mapped);
    }

    out.trim_matches('_').to_string()
}

/// Build the filename for a saved result.
pub fn build_filename(
    capability: Capability,
    timestamp: DateTime<Utc>,
    prompt: &str,
    extra_info: &str,
    format: OutputFormat,
) -> String {
    let mut parts = vec![
        capability.label().to_string(),
        timestamp.format("%Y%m%d_%H%M%S").to_string(),
    ];

    let prefix: String = prompt.chars().take(PROMPT_PREFIX_CHARS).collect();
    let prefix = sanitize_component(&prefix);
    if !prefix.is_empty() {
        parts.push(prefix);
    }

    let extra = sanitize_component(extra_info);
    if !extra.is_empty() {
        parts.push(extra);
    }

    format!("{}.{}", parts.join("_"), format.extension())
}
