use serde_json::Value;
use std::io;

/// Request document piped into the command. A terminal or an empty pipe
/// yields `None` so callers can fall back to flags.
pub fn piped_json() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let text = io::read_to_string(io::stdin().lock())?;
    Ok(parse_piped(&text)?)
}

/// A leading byte-order mark and surrounding whitespace are ignored.
fn parse_piped(text: &str) -> Result<Option<Value>, String> {
    let body = text.trim_start_matches('\u{feff}').trim();
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| format!("stdin is not a JSON document: {e}"))
}
