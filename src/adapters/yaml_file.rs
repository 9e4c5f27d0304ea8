// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML file overlay source adapter.
//!
//! This module provides an adapter that reads layer overlays from YAML files.

use crate::domain::{BrokerError, Result};
use crate::ports::{OverlayParser, OverlaySource};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML overlay files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SOURCE_NAME: &str = "yaml-file";

/// YAML parser implementation.
///
/// The parser keeps the nested structure of the document so it can be decoded
/// straight into a partial type with nested partials.
///
/// # Examples
///
/// ```rust
/// use layerbroker::adapters::YamlParser;
/// use layerbroker::ports::OverlayParser;
///
/// let parser = YamlParser::new();
/// let doc = parser.parse("database:\n  host: localhost\n  port: 5432").unwrap();
/// assert_eq!(doc["database"]["host"].as_str(), Some("localhost"));
/// assert_eq!(doc["database"]["port"].as_u64(), Some(5432));
/// ```
#[derive(Debug, Clone)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayParser for YamlParser {
    fn parse(&self, content: &str) -> Result<serde_yaml::Value> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| BrokerError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        match document {
            serde_yaml::Value::Mapping(_) | serde_yaml::Value::Null => Ok(document),
            other => Err(BrokerError::ParseError {
                message: format!(
                    "YAML overlay must be a mapping at the top level, found {}",
                    kind(&other)
                ),
                source: None,
            }),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

fn kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn file_label(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

fn source_error(message: String, source: Option<std::io::Error>) -> BrokerError {
    BrokerError::SourceError {
        source_name: SOURCE_NAME.to_string(),
        message,
        source: source.map(|e| Box::new(e) as _),
    }
}

/// Reads a file after checking it against the size limit.
pub(crate) fn read_limited(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| {
        source_error(
            format!("Failed to read file metadata: {}", file_label(path)),
            Some(e),
        )
    })?;

    if metadata.len() > MAX_YAML_FILE_SIZE {
        return Err(source_error(
            format!(
                "Overlay file too large: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_YAML_FILE_SIZE
            ),
            None,
        ));
    }

    fs::read_to_string(path).map_err(|e| {
        source_error(
            format!("Failed to read overlay file: {}", file_label(path)),
            Some(e),
        )
    })
}

/// Overlay source adapter for YAML files.
///
/// The adapter reads one YAML document and hands it out as an overlay for
/// whichever layer it is loaded into. Keys absent from the file leave the
/// corresponding fields unset, so they fall through to lower layers.
///
/// # Examples
///
/// ```rust,no_run
/// use layerbroker::adapters::YamlFileAdapter;
///
/// // Load from a specific file
/// let adapter = YamlFileAdapter::from_file("/path/to/config.yaml").unwrap();
///
/// // Load from default OS location
/// let adapter = YamlFileAdapter::from_default_location("myapp", "com.example").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileAdapter {
    /// Path to the YAML file, if the document came from disk
    file_path: Option<PathBuf>,
    document: serde_yaml::Value,
    parser: YamlParser,
}

impl YamlFileAdapter {
    /// Creates a new YAML file adapter from a specific file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref();
        let parser = YamlParser::new();

        let canonical_path = file_path.canonicalize().map_err(|e| {
            source_error(
                format!("Invalid or inaccessible path: {}", file_label(file_path)),
                Some(e),
            )
        })?;

        let content = read_limited(&canonical_path)?;
        let document = parser.parse(&content)?;
        tracing::debug!("Loaded YAML overlay from {}", canonical_path.display());

        Ok(Self {
            file_path: Some(canonical_path),
            document,
            parser,
        })
    }

    /// Creates an adapter from in-memory YAML text.
    ///
    /// Such an adapter has no file behind it; `reload` keeps the document as is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layerbroker::adapters::YamlFileAdapter;
    /// use layerbroker::ports::OverlaySource;
    ///
    /// let adapter = YamlFileAdapter::from_str("port: 9090").unwrap();
    /// assert_eq!(adapter.document().unwrap()["port"].as_u64(), Some(9090));
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let parser = YamlParser::new();
        let document = parser.parse(content)?;
        Ok(Self {
            file_path: None,
            document,
            parser,
        })
    }

    /// Creates a new YAML file adapter from the default OS-appropriate location.
    ///
    /// The file is `config.yaml` inside the application's configuration
    /// directory, as reported by the `directories` crate.
    pub fn from_default_location(app_name: &str, qualifier: &str) -> Result<Self> {
        Self::with_filename(app_name, qualifier, "config.yaml")
    }

    /// Creates a new YAML file adapter with a custom file name in the default location.
    pub fn with_filename(app_name: &str, qualifier: &str, filename: &str) -> Result<Self> {
        let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
            source_error("Failed to determine project directories".to_string(), None)
        })?;

        Self::from_file(proj_dirs.config_dir().join(filename))
    }

    /// Returns the path to the overlay file, if there is one.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl OverlaySource for YamlFileAdapter {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn document(&self) -> Result<serde_yaml::Value> {
        Ok(self.document.clone())
    }

    fn reload(&mut self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let content = read_limited(path)?;
        self.document = self.parser.parse(&content)?;
        tracing::debug!("Reloaded YAML overlay from {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ServerConfigPartial, TlsConfigPartial};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_parser_nested() {
        let parser = YamlParser::new();
        let yaml = r#"
database:
  host: localhost
  port: 5432
"#;
        let doc = parser.parse(yaml).unwrap();

        assert_eq!(doc["database"]["host"].as_str(), Some("localhost"));
        assert_eq!(doc["database"]["port"].as_u64(), Some(5432));
    }

    #[test]
    fn test_yaml_parser_empty_document() {
        let parser = YamlParser::new();
        assert!(parser.parse("").unwrap().is_null());
    }

    #[test]
    fn test_yaml_parser_rejects_scalar_document() {
        let parser = YamlParser::new();
        let err = parser.parse("just a string").unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_yaml_parser_invalid() {
        let parser = YamlParser::new();
        let result = parser.parse("invalid: yaml: content:");

        assert!(matches!(result, Err(BrokerError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_parser_supported_extensions() {
        let parser = YamlParser::default();
        let extensions = parser.supported_extensions();

        assert_eq!(extensions.len(), 2);
        assert!(parser.supports("config.yaml"));
        assert!(parser.supports("config.YML"));
        assert!(!parser.supports("config.toml"));
    }

    #[test]
    fn test_yaml_adapter_from_file_decodes_overlay() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "name: api\ntls:\n  cert: server.pem").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();
        assert_eq!(adapter.name(), "yaml-file");

        let overlay: ServerConfigPartial = adapter.overlay().unwrap();
        assert_eq!(overlay.name.as_deref(), Some("api"));
        assert_eq!(overlay.port, None);
        assert_eq!(
            overlay.tls,
            Some(TlsConfigPartial {
                cert: Some("server.pem".to_string()),
                verify: None,
            })
        );
    }

    #[test]
    fn test_yaml_adapter_type_mismatch() {
        let adapter = YamlFileAdapter::from_str("port: not-a-number").unwrap();
        let result = adapter.overlay::<ServerConfigPartial>();
        assert!(matches!(result, Err(BrokerError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_adapter_reload() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        fs::write(&path, "port: 1\n").unwrap();
        let mut adapter = YamlFileAdapter::from_file(&path).unwrap();
        let overlay: ServerConfigPartial = adapter.overlay().unwrap();
        assert_eq!(overlay.port, Some(1));

        fs::write(&path, "port: 2\n").unwrap();
        adapter.reload().unwrap();

        let overlay: ServerConfigPartial = adapter.overlay().unwrap();
        assert_eq!(overlay.port, Some(2));
    }

    #[test]
    fn test_yaml_adapter_reload_without_file() {
        let mut adapter = YamlFileAdapter::from_str("port: 1").unwrap();
        adapter.reload().unwrap();
        assert!(adapter.file_path().is_none());
        assert_eq!(adapter.document().unwrap()["port"].as_u64(), Some(1));
    }

    #[test]
    fn test_yaml_adapter_file_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "port: 1").unwrap();

        let adapter = YamlFileAdapter::from_file(temp_file.path()).unwrap();
        let expected = temp_file.path().canonicalize().unwrap();
        assert_eq!(adapter.file_path(), Some(expected.as_path()));
    }

    #[test]
    fn test_yaml_adapter_nonexistent_file() {
        let result = YamlFileAdapter::from_file("/nonexistent/path/to/config.yaml");
        assert!(matches!(result, Err(BrokerError::SourceError { .. })));
    }
}
