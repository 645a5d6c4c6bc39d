pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed request from `--input`, else from piped stdin.
pub fn read_request<T: DeserializeOwned>(
    path: Option<&str>,
    command: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match stdin::piped_json()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Err(format!("{command}: --input is required (or pipe JSON on stdin)").into()),
    }
}
