//! # Configuration
//!
//! A minimal, framework-agnostic configuration system based on a simple
//! string key/value store, mirroring `app.set()` / `app.get()`.
//!
//! Environment overrides follow the `PREFIX__SECTION__KEY` convention:
//! `VITRINE__HTTP__PORT=8080` becomes `http.port`. Applications call
//! [`Config::load_env`] with their prefix at startup; explicit `set()`
//! calls made before that act as defaults.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    ///
    /// Example: config.set("http.port", "5000")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Overlay values from the process environment.
    ///
    /// `VITRINE__MAIL__USER` with prefix `"VITRINE__"` lands as `mail.user`.
    pub fn load_env(&mut self, prefix: &str) {
        for (key, value) in std::env::vars() {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

/// An immutable copy of the config map, cheap to hand to adapters at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }
}
