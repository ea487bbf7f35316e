//! Driver options
//!
//! Options arrive as a single `key=value` string (entries separated by `,`
//! or `;`). The raw string is kept verbatim for provenance; parsed entries
//! are consulted by the registry (`mode`) and the drivers.

use crate::error::{StorageError, StorageResult};
use indexmap::IndexMap;

/// How the registry opens the target location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Create or truncate (`mode=w`)
    #[default]
    Overwrite,
    /// Fail if the location exists (`mode=x`)
    Exclusive,
}

/// Parsed driver options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    raw: Option<String>,
    entries: IndexMap<String, String>,
}

impl DriverOptions {
    /// No options
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse an options string
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidOption`] for entries without `=` or
    /// with an empty key, and for unsupported `mode` values
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let mut entries = IndexMap::new();
        for entry in raw.split(|c: char| c == ',' || c == ';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| StorageError::invalid_option(entry, "expected key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(StorageError::invalid_option(entry, "empty key"));
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        let options = Self {
            raw: Some(raw.to_string()),
            entries,
        };
        options.mode()?;
        Ok(options)
    }

    /// Parse an optional options string
    ///
    /// # Errors
    /// See [`DriverOptions::parse`]
    pub fn from_optional(raw: Option<&str>) -> StorageResult<Self> {
        raw.map_or_else(|| Ok(Self::none()), Self::parse)
    }

    /// The options string exactly as given
    #[inline]
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Value of an option
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Boolean option; `true`, `yes`, `1` and `on` are truthy
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1" | "on"))
    }

    /// Write mode requested by `mode`
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidOption`] for anything but `w` or `x`
    pub fn mode(&self) -> StorageResult<WriteMode> {
        match self.get("mode") {
            None | Some("w") => Ok(WriteMode::Overwrite),
            Some("x") => Ok(WriteMode::Exclusive),
            Some("a") => Err(StorageError::invalid_option("mode=a", "append is not supported")),
            Some(other) => Err(StorageError::invalid_option(
                format!("mode={other}"),
                "expected 'w' or 'x'",
            )),
        }
    }
}
