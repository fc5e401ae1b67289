//! The build environment
//!
//! A [`BuildEnv`] maps configuration variable names (like `CC` or `CFLAGS`)
//! to either a single string or an ordered list of strings. It is populated
//! once per configure run by the [`ConfigurationStep`](crate::step::ConfigurationStep)s,
//! then cached to disk and read by every compile/link rule afterwards.
use crate::prelude::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::system::Error;

/// Name of the cache file, relative to the build directory
pub static CACHE_FILE: &str = "env_cache.yml";

/// Name of the build directory, relative to the project root
pub static BUILD_DIR: &str = "build";

/// Value of one variable in the build environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    /// A single value, usually a path
    Str(String),
    /// Ordered list of values, usually flags
    List(Vec<String>),
}

impl EnvValue {
    /// Get the value as a string, if it's a single value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Get the value as a list, if it's a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Str(_) => None,
            Self::List(v) => Some(v),
        }
    }
}

impl std::fmt::Display for EnvValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(v) => write!(f, "{v:?}"),
        }
    }
}

/// Mapping of build configuration variables
///
/// Later writes to the same key replace earlier ones. Keys are kept sorted
/// so the cache file is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildEnv {
    vars: BTreeMap<String, EnvValue>,
}

impl BuildEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a single string value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), EnvValue::Str(value.into()));
    }

    /// Assign an ordered list, replacing whatever was there
    pub fn set_list<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.vars.insert(key.into(), EnvValue::List(values));
    }

    /// Append the values that are not already in the list
    ///
    /// A missing key starts as an empty list, and a single string
    /// value is turned into a one-element list first
    pub fn append_unique<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .vars
            .entry(key.into())
            .or_insert_with(|| EnvValue::List(vec![]));
        if let EnvValue::Str(s) = entry {
            let s = std::mem::take(s);
            *entry = EnvValue::List(vec![s]);
        }
        if let EnvValue::List(list) = entry {
            for value in values {
                let value = value.into();
                if !list.contains(&value) {
                    list.push(value);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_str)
    }

    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(EnvValue::as_list)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over the variable names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every variable of `other` into `self`, overwriting existing keys
    pub fn merge(&mut self, other: BuildEnv) {
        self.vars.extend(other.vars);
    }

    /// Load the environment from a cache file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        verboseln!("loading '{}'", path.display());
        let reader = system::buf_reader(path)?;
        serde_yaml_ng::from_reader(reader)
            .change_context_lazy(|| Error::ReadYaml(path.display().to_string()))
    }

    /// Save the environment to a cache file, creating the parent directory if needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        verboseln!("saving '{}'", path.display());
        if let Some(parent) = path.parent() {
            system::ensure_directory(parent)?;
        }
        let writer = system::buf_writer(path)?;
        serde_yaml_ng::to_writer(writer, self)
            .change_context_lazy(|| Error::WriteYaml(path.display().to_string()))
    }
}

/// Get the cache file path for a project root
pub fn cache_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(BUILD_DIR).into_joined(CACHE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let mut env = BuildEnv::new();
        env.set_list("CFLAGS", ["-O2"]);
        env.set_list("CFLAGS", ["-std=c11"]);
        assert_eq!(env.get_list("CFLAGS"), Some(&["-std=c11".to_string()][..]));

        env.set("CFLAGS", "x");
        assert_eq!(env.get_str("CFLAGS"), Some("x"));
        assert_eq!(env.get_list("CFLAGS"), None);
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_append_unique() {
        let mut env = BuildEnv::new();
        env.append_unique("LINKFLAGS", ["-static", "-g"]);
        env.append_unique("LINKFLAGS", ["-g", "-Wl,--gc-sections"]);
        assert_eq!(
            env.get_list("LINKFLAGS").unwrap(),
            ["-static", "-g", "-Wl,--gc-sections"]
        );
    }

    #[test]
    fn test_append_unique_to_string_value() {
        let mut env = BuildEnv::new();
        env.set("DEFINES", "STM32F429xx");
        env.append_unique("DEFINES", ["DEBUG", "STM32F429xx"]);
        assert_eq!(env.get_list("DEFINES").unwrap(), ["STM32F429xx", "DEBUG"]);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut env = BuildEnv::new();
        env.set("CC", "/old/gcc");
        env.set("AR", "/old/ar");
        let mut other = BuildEnv::new();
        other.set("CC", "/new/gcc");
        env.merge(other);
        assert_eq!(env.get_str("CC"), Some("/new/gcc"));
        assert_eq!(env.get_str("AR"), Some("/old/ar"));
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = cache_path(dir.path());
        let mut env = BuildEnv::new();
        env.set("CC_NAME", "armgcc");
        env.set_list("CFLAGS", ["-std=c11"]);
        env.set_list("INCLUDES", Vec::<String>::new());
        env.save(&path).unwrap();

        let loaded = BuildEnv::load(&path).unwrap();
        assert_eq!(loaded, env);
        assert_eq!(loaded.get_list("INCLUDES"), Some(&[][..]));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildEnv::load(cache_path(dir.path())).unwrap_err();
        assert!(matches!(err.current_context(), Error::ReadFile(_)));
    }
}
