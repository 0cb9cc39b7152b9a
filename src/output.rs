use crate::errors::CamscoutError;
use crate::model::Stream;
use std::path::Path;

/// Streams as pretty printed JSON
pub fn to_json(streams: &[Stream]) -> Result<String, CamscoutError> {
    Ok(serde_json::to_string_pretty(streams)?)
}

/// Write the streams to `path` as JSON, replacing any existing file
pub fn write_json(path: &Path, streams: &[Stream]) -> Result<(), CamscoutError> {
    std::fs::write(path, to_json(streams)?)?;
    Ok(())
}
