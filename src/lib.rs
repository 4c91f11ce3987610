//! Typed key lookups over a config file, environment variables, explicit
//! sets and defaults.
//!
//! ```no_run
//! use keyfig::Config;
//!
//! let mut config = Config::new();
//! config.set_default("server.port", 8080);
//! config.load_from_file("app.toml")?;
//! config.validate(["database.url"])?;
//!
//! let port = config.get_int("server.port");
//! # Ok::<(), keyfig::ConfigError>(())
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Defaults              .set_default()
//!        ↑ overridden by
//! Config file           .load_from_file()
//!        ↑ overridden by
//! Environment vars      SERVER_PORT, or names given to .bind_env()
//!        ↑ overridden by
//! Explicit sets         .set()
//! ```
//!
//! Layers are sparse and deep-merged: setting `server.port` leaves a
//! file-provided `server.host` in place. A scalar in a higher layer hides a
//! table below it.
//!
//! # Keys
//!
//! Keys are dotted paths (`database.pool_size`) and case-insensitive. Keys
//! read from files are lowercased too, so `{"Server": {"Port": 1}}` answers
//! to `server.port`.
//!
//! # Environment variables
//!
//! Every lookup also checks the environment. The variable name is the key
//! uppercased with `.` replaced by `_`: `server.port` reads `SERVER_PORT`.
//! [`Config::set_env_prefix`] puts a prefix in front (`MYAPP_SERVER_PORT`),
//! and [`Config::bind_env`] maps a key to explicit variable names instead.
//! Empty variables count as unset.
//!
//! Environment values are strings; getters coerce them like any other value.
//! The environment is read through an [`EnvSource`], so tests can pass a
//! `HashMap` to [`Config::with_env`] rather than touching the process
//! environment.
//!
//! # Getters never fail
//!
//! `get_string`, `get_int`, `get_bool`, `get_float` and `get_string_slice`
//! return the type's zero value when a key is missing or its value cannot be
//! converted. Use [`Config::is_set`] or [`Config::validate`] when absence
//! matters. The same holds for the helpers in [`env`], which return the
//! caller's default on a missing or unparsable variable.
//!
//! # File formats
//!
//! Chosen by extension: `.toml`, `.json`, and `.yaml`/`.yml` (behind the
//! default `yaml` feature).
//!
//! # Errors
//!
//! Only loading, binding, validation and [`Config::extract`] fail. They
//! return [`ConfigError`], naming the offending path or key.
//!
//! # Threads
//!
//! Getters take `&self` and mutators `&mut self`. `Config<E>` is `Send` and
//! `Sync` whenever `E` is; share a writable instance behind an `RwLock`.

pub mod env;
pub mod error;
pub mod value;

mod coerce;
mod config;
mod file;
mod tree;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use env::{
    EnvSource, ProcessEnv, get_env, get_env_bool, get_env_float, get_env_int,
    get_env_string_slice,
};
pub use error::ConfigError;
pub use file::Format;
pub use value::Value;
