//! Environment variable access.
//!
//! Nothing in this crate calls `std::env` directly. Reads go through an
//! [`EnvSource`], so tests can hand in a `HashMap` instead of mutating the
//! process environment.
//!
//! The free functions in this module read one variable and parse it, falling
//! back to the caller's default when the variable is unset, empty or does not
//! parse. Absence and parse failure look the same to the caller:
//!
//! ```
//! use std::collections::HashMap;
//! use keyfig::env::get_env_int;
//!
//! let env = HashMap::from([("PORT".to_string(), "abc".to_string())]);
//! assert_eq!(get_env_int(&env, "PORT", 9090), 9090);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::coerce;

/// Read-only lookup of environment variables by name.
pub trait EnvSource {
    /// The variable's value, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment. Variables that are not valid unicode read as
/// unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Read a variable, treating an empty value as unset.
fn non_empty(env: &impl EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|v| !v.is_empty())
}

pub fn get_env(env: &impl EnvSource, key: &str, default: &str) -> String {
    non_empty(env, key).unwrap_or_else(|| default.to_string())
}

/// Base-10 integer.
pub fn get_env_int(env: &impl EnvSource, key: &str, default: i64) -> i64 {
    non_empty(env, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Accepts `true`/`false`/`t`/`f`/`1`/`0` in any case. Forms like `yes` fall
/// back to `default`.
pub fn get_env_bool(env: &impl EnvSource, key: &str, default: bool) -> bool {
    non_empty(env, key)
        .and_then(|v| coerce::parse_bool(&v))
        .unwrap_or(default)
}

/// Splits on `,`. Elements are not trimmed.
pub fn get_env_string_slice(
    env: &impl EnvSource,
    key: &str,
    default: Vec<String>,
) -> Vec<String> {
    match non_empty(env, key) {
        Some(v) => v.split(',').map(str::to_string).collect(),
        None => default,
    }
}

pub fn get_env_float(env: &impl EnvSource, key: &str, default: f64) -> f64 {
    non_empty(env, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// The automatic variable name for a config key: optional prefix, dots
/// become underscores, everything uppercased.
///
/// `server.port` → `SERVER_PORT`, or `MYAPP_SERVER_PORT` with prefix `MYAPP`.
pub(crate) fn env_name(prefix: Option<&str>, key: &str) -> String {
    let name = key.replace('.', "_").to_uppercase();
    match prefix {
        Some(prefix) => format!("{prefix}_{name}"),
        None => name,
    }
}

/// Parse an env var value into a typed TOML value.
/// Tries: bool → integer → float → string.
///
/// Only used when extracting typed structs; getters see the raw string.
pub(crate) fn parse_env_value(s: &str) -> toml::Value {
    if s.eq_ignore_ascii_case("true") {
        return toml::Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return toml::Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    // Require a dot so "NaN" and "inf" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}
