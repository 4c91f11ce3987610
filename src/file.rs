//! Reading a config file into a table.
//!
//! The format comes from the file extension. JSON and YAML documents are
//! read into a `serde_json::Value` first and then converted, so every format
//! ends up as the same `toml::Table` the store layers use. Keys are
//! lowercased on the way in.

use std::path::Path;

use toml::{Table, Value};

use crate::error::ConfigError;

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl Format {
    /// Pick a format from the path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Read and parse the file at `path`.
pub fn load_file(path: &Path) -> Result<Table, ConfigError> {
    let format = Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, format, path)
}

/// Parse file content already in memory. `path` is only used for errors.
pub fn parse(content: &str, format: Format, path: &Path) -> Result<Table, ConfigError> {
    let parse_error = |reason: String| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason,
    };

    let table = match format {
        Format::Toml => {
            toml::from_str::<Table>(content).map_err(|e| parse_error(e.to_string()))?
        }
        Format::Json => {
            let doc: serde_json::Value =
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            json_to_table(doc).ok_or_else(|| parse_error(TOP_LEVEL_NOT_MAP.into()))?
        }
        #[cfg(feature = "yaml")]
        Format::Yaml => {
            let doc: serde_json::Value =
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            match doc {
                // An empty YAML document is an empty config.
                serde_json::Value::Null => Table::new(),
                doc => {
                    json_to_table(doc).ok_or_else(|| parse_error(TOP_LEVEL_NOT_MAP.into()))?
                }
            }
        }
    };

    Ok(lowercase_keys(table))
}

const TOP_LEVEL_NOT_MAP: &str = "top-level value must be a map of keys";

fn json_to_table(doc: serde_json::Value) -> Option<Table> {
    match json_to_toml(doc)? {
        Value::Table(t) => Some(t),
        _ => None,
    }
}

/// `null` has no TOML counterpart and converts to `None`; nulls inside maps
/// and arrays are dropped.
fn json_to_toml(v: serde_json::Value) -> Option<Value> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(b)),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        }),
        serde_json::Value::String(s) => Some(Value::String(s)),
        serde_json::Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        serde_json::Value::Object(map) => Some(Value::Table(
            map.into_iter()
                .filter_map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
                .collect(),
        )),
    }
}

fn lowercase_keys(table: Table) -> Table {
    table
        .into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::Table(sub) => Value::Table(lowercase_keys(sub)),
                other => other,
            };
            (k.to_lowercase(), v)
        })
        .collect()
}

/// Normalize a caller-supplied key the same way file keys are normalized.
pub(crate) fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::write_file;
    use tempfile::TempDir;

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("a.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.ini")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn format_yaml_both_extensions() {
        assert_eq!(Format::from_path(Path::new("a.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.yml")), Some(Format::Yaml));
    }

    #[test]
    fn load_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.json", r#"{"server": {"port": 8080}}"#);
        let table = load_file(&path).unwrap();
        assert_eq!(table["server"]["port"].as_integer().unwrap(), 8080);
    }

    #[test]
    fn load_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.toml", "[server]\nport = 8080\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table["server"]["port"].as_integer().unwrap(), 8080);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.yml", "server:\n  port: 8080\n  hosts: [a, b]\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table["server"]["port"].as_integer().unwrap(), 8080);
        assert_eq!(table["server"]["hosts"].as_array().unwrap().len(), 2);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn empty_yaml_is_empty_table() {
        let table = parse("", Format::Yaml, Path::new("x.yaml")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn keys_are_lowercased() {
        let table =
            parse(r#"{"Server": {"Port": 1}}"#, Format::Json, Path::new("x.json")).unwrap();
        assert_eq!(table["server"]["port"].as_integer().unwrap(), 1);
    }

    #[test]
    fn json_nulls_are_dropped() {
        let table =
            parse(r#"{"a": null, "b": [1, null]}"#, Format::Json, Path::new("x.json")).unwrap();
        assert!(!table.contains_key("a"));
        assert_eq!(table["b"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn json_top_level_array_rejected() {
        let err = parse("[1, 2]", Format::Json, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn missing_file_is_io_error_naming_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.json", "{\"server\": ");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn unknown_extension_rejected_before_reading() {
        let err = load_file(Path::new("/nonexistent/settings.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }
}
