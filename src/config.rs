use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use toml::Table;

use crate::coerce;
use crate::env::{self, EnvSource, ProcessEnv};
use crate::error::ConfigError;
use crate::file::{self, Format, normalize_key};
use crate::tree::{Lookup, deep_merge, get_path, leaf_keys, lookup, set_path};
use crate::value::{self, Value};

/// Typed access to settings from a config file, the environment, explicit
/// sets and defaults.
///
/// Lookups resolve through four layers, highest priority first:
///
/// 1. values written with [`set`](Self::set)
/// 2. environment variables (bound with [`bind_env`](Self::bind_env), or the
///    automatic `KEY_SUBKEY` name)
/// 3. the file read by [`load_from_file`](Self::load_from_file)
/// 4. values written with [`set_default`](Self::set_default)
///
/// Keys are dotted paths and case-insensitive.
///
/// Mutating methods take `&mut self`. To share one instance between threads
/// that write, wrap it in a lock such as `RwLock<Config>`.
#[derive(Debug, Clone)]
pub struct Config<E: EnvSource = ProcessEnv> {
    env: E,
    env_prefix: Option<String>,
    defaults: Table,
    file: Table,
    overrides: Table,
    bindings: BTreeMap<String, Vec<String>>,
    config_file: Option<PathBuf>,
}

impl Config<ProcessEnv> {
    /// A config that overlays the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }
}

impl Default for Config<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> Config<E> {
    /// A config that reads environment variables from `env`.
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            env_prefix: None,
            defaults: Table::new(),
            file: Table::new(),
            overrides: Table::new(),
            bindings: BTreeMap::new(),
            config_file: None,
        }
    }

    /// Prefix automatic environment names: with prefix `myapp`, key
    /// `server.port` reads `MYAPP_SERVER_PORT`. An empty prefix clears it.
    ///
    /// Bindings made earlier keep the names they were bound with.
    pub fn set_env_prefix(&mut self, prefix: &str) {
        self.env_prefix = if prefix.is_empty() {
            None
        } else {
            Some(prefix.to_uppercase())
        };
    }

    /// Read `path` into the file layer, replacing any previously loaded file.
    ///
    /// The format comes from the extension (`.toml`, `.json`, `.yaml`, `.yml`).
    /// On error the store is left as it was.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let table = file::load_file(path).inspect_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "config file load failed");
        })?;

        tracing::debug!(
            path = %path.display(),
            keys = leaf_keys(&table).len(),
            "loaded config file"
        );
        self.file = table;
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Like [`load_from_file`](Self::load_from_file) for content already in
    /// memory. Leaves [`config_file`](Self::config_file) untouched.
    pub fn load_from_str(&mut self, content: &str, format: Format) -> Result<(), ConfigError> {
        let table = file::parse(content, format, Path::new("<string>"))?;
        tracing::debug!(
            format = ?format,
            keys = leaf_keys(&table).len(),
            "loaded config string"
        );
        self.file = table;
        Ok(())
    }

    /// The last file successfully loaded, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn get_string(&self, key: &str) -> String {
        self.find(key).map(|v| coerce::to_string(&v)).unwrap_or_default()
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.find(key).map(|v| coerce::to_int(&v)).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.find(key).map(|v| coerce::to_bool(&v)).unwrap_or_default()
    }

    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.find(key)
            .map(|v| coerce::to_string_slice(&v))
            .unwrap_or_default()
    }

    pub fn get_float(&self, key: &str) -> f64 {
        self.find(key).map(|v| coerce::to_float(&v)).unwrap_or_default()
    }

    /// The resolved value for `key` without coercion. Environment values are
    /// always [`Value::String`].
    pub fn get(&self, key: &str) -> Option<Value> {
        self.find(key).map(|v| Value::from(&v))
    }

    /// Set `key` for the rest of this config's life, above every other layer.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value: Value = value.into();
        set_path(&mut self.overrides, &normalize_key(key), value.into());
    }

    /// Set the value `key` falls back to when no other layer has it.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        let value: Value = value.into();
        set_path(&mut self.defaults, &normalize_key(key), value.into());
    }

    /// Whether any layer resolves `key`. An empty environment variable does
    /// not count.
    pub fn is_set(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Snapshot of every resolvable key as a nested map.
    pub fn all_settings(&self) -> BTreeMap<String, Value> {
        value::table_to_map(&self.merged(raw_env))
    }

    /// Every resolvable leaf key in dotted form, sorted.
    pub fn all_keys(&self) -> Vec<String> {
        leaf_keys(&self.merged(raw_env))
    }

    /// Tie a key to environment variables.
    ///
    /// `input[0]` is the key. With no further elements the variable is the
    /// key's automatic name (`server.port` → `SERVER_PORT`). Otherwise the
    /// remaining elements are variable names, tried in order. Binding a key
    /// again replaces its previous names.
    pub fn bind_env(&mut self, input: &[&str]) -> Result<(), ConfigError> {
        let Some((key, names)) = input.split_first() else {
            return Err(ConfigError::BindError("missing key to bind to".into()));
        };
        if key.is_empty() {
            return Err(ConfigError::BindError("key must not be empty".into()));
        }
        if let Some(empty) = names.iter().position(|n| n.is_empty()) {
            return Err(ConfigError::BindError(format!(
                "environment variable name {} for '{key}' is empty",
                empty + 1
            )));
        }

        let key = normalize_key(key);
        let names: Vec<String> = if names.is_empty() {
            vec![env::env_name(self.env_prefix.as_deref(), &key)]
        } else {
            names.iter().map(|n| n.to_string()).collect()
        };

        tracing::debug!(key = %key, vars = ?names, "bound environment variables");
        self.bindings.insert(key, names);
        Ok(())
    }

    /// Check that every key in `required` is set. The error names the first
    /// missing key, in iteration order.
    pub fn validate<I, S>(&self, required: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in required {
            let key = key.as_ref();
            if !self.is_set(key) {
                tracing::debug!(key, "required configuration key missing");
                return Err(ConfigError::MissingKey(key.to_string()));
            }
        }
        Ok(())
    }

    /// Deserialize all settings into `T`.
    ///
    /// An environment string replacing a string keeps its text. Otherwise it
    /// is read as bool, integer, float or string, whichever parses first, so
    /// numeric fields can come from the environment.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        toml::Value::Table(self.merged(typed_env))
            .try_into()
            .map_err(|e: toml::de::Error| {
                let reason = e.to_string();
                ConfigError::InvalidValue {
                    key: error_key(&reason).unwrap_or_else(|| "<settings>".into()),
                    reason: reason.trim_end().to_string(),
                }
            })
    }

    /// Resolve one key, walking the layers from the top. Only a key that
    /// touches a table in some layer needs the fully merged view.
    fn find(&self, key: &str) -> Option<toml::Value> {
        let key = normalize_key(key);
        if key.is_empty() {
            return None;
        }
        // A bound parent places its variable above every layer's subtree.
        if self.bindings.keys().any(|b| is_parent_of(b, &key)) {
            return self.find_merged(&key);
        }

        match lookup(&self.overrides, &key) {
            Lookup::Found(v) if v.is_table() => return self.find_merged(&key),
            Lookup::Found(v) => return Some(v.clone()),
            Lookup::Shadowed => return self.env_value(&key).map(toml::Value::String),
            Lookup::Missing => {}
        }

        let env = self.env_value(&key).map(toml::Value::String);
        for layer in [&self.file, &self.defaults] {
            match lookup(layer, &key) {
                Lookup::Found(v) if v.is_table() => return self.find_merged(&key),
                Lookup::Found(v) => return env.or_else(|| Some(v.clone())),
                Lookup::Shadowed => return env,
                Lookup::Missing => {}
            }
        }
        env
    }

    /// Resolve a normalized key against all layers merged. A key no layer
    /// knows about can still come from its environment variable.
    fn find_merged(&self, key: &str) -> Option<toml::Value> {
        let merged = self.merged(raw_env);
        get_path(&merged, key)
            .cloned()
            .or_else(|| self.env_value(key).map(toml::Value::String))
    }

    /// All layers merged. `env_value` turns a raw environment string into a
    /// stored value, given whatever the layers below hold for that key.
    fn merged(
        &self,
        env_value: impl Fn(&str, Option<&toml::Value>) -> toml::Value,
    ) -> Table {
        let lower = deep_merge(self.defaults.clone(), self.file.clone());
        let env_layer = self.env_layer(&lower, env_value);
        deep_merge(deep_merge(lower, env_layer), self.overrides.clone())
    }

    /// A table holding the environment value of every key known to `lower`,
    /// the explicit layer or the bindings.
    fn env_layer(
        &self,
        lower: &Table,
        env_value: impl Fn(&str, Option<&toml::Value>) -> toml::Value,
    ) -> Table {
        let mut keys = leaf_keys(lower);
        keys.extend(leaf_keys(&self.overrides));
        keys.extend(self.bindings.keys().cloned());
        keys.sort();
        keys.dedup();

        let mut layer = Table::new();
        for key in keys {
            if let Some(raw) = self.env_value(&key) {
                set_path(&mut layer, &key, env_value(&raw, get_path(lower, &key)));
            }
        }
        layer
    }

    /// The first non-empty variable bound to `key`, falling back to its
    /// automatic name when the key has no binding.
    fn env_value(&self, key: &str) -> Option<String> {
        let automatic;
        let names = match self.bindings.get(key) {
            Some(names) => names.as_slice(),
            None => {
                automatic = [env::env_name(self.env_prefix.as_deref(), key)];
                &automatic[..]
            }
        };
        names
            .iter()
            .filter_map(|name| self.env.var(name))
            .find(|v| !v.is_empty())
    }
}

/// Environment values as getters see them: the raw string.
fn raw_env(s: &str, _lower: Option<&toml::Value>) -> toml::Value {
    toml::Value::String(s.to_string())
}

/// Environment values as `extract` sees them: typed, unless they replace a
/// string.
fn typed_env(s: &str, lower: Option<&toml::Value>) -> toml::Value {
    match lower {
        Some(toml::Value::String(_)) => toml::Value::String(s.to_string()),
        _ => env::parse_env_value(s),
    }
}

fn is_parent_of(parent: &str, key: &str) -> bool {
    key.strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Pull the dotted field path out of a toml deserialization message, which
/// ends with a line like ``in `server.port` ``.
fn error_key(message: &str) -> Option<String> {
    message
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("in `")?.strip_suffix('`'))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
