use crate::config::types::EntryConfig;
use crate::ConfigError;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::path::Path;
use url::Url;

/// Parsed configuration document
#[derive(Debug, Clone)]
pub struct Config {
    /// One entry per configured crawl target
    pub entrypoints: Vec<RawEntry>,
}

/// A single entrypoint blob from the configuration document
///
/// `raw` is the blob's verbatim JSON text. Two entries are considered the
/// same crawl target if and only if their raw text matches byte for byte.
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// Verbatim JSON text of the blob (reload identity key)
    pub raw: String,

    /// The common fields parsed out of the blob
    pub common: EntryConfig,
}

#[derive(Deserialize)]
struct ConfigDoc<'a> {
    #[serde(borrow)]
    entrypoints: Vec<&'a RawValue>,
}

/// Loads and parses a configuration file from the given path
///
/// Every entrypoint blob must carry a parseable `entry` URL; the rest of the
/// blob is validated later by the protocol crawler that consumes it.
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(ConfigError)` - Failed to read or parse the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let doc: ConfigDoc = serde_json::from_str(&content)?;

    let mut entrypoints = Vec::with_capacity(doc.entrypoints.len());
    for raw in doc.entrypoints {
        let common: EntryConfig = serde_json::from_str(raw.get())?;

        // Reject blobs whose entry URL does not even parse; protocol-specific
        // validation happens in the crawler constructors.
        Url::parse(&common.entry)
            .map_err(|e| ConfigError::InvalidEntry(format!("{}: {}", common.entry, e)))?;

        entrypoints.push(RawEntry {
            raw: raw.get().to_string(),
            common,
        });
    }

    Ok(Config { entrypoints })
}
