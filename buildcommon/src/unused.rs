use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hintln;

/// Container for detecting and warning user about unknown config keys
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unused(BTreeMap<String, toml::Value>);

impl Unused {
    /// Keys that were not recognized, in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Print a warning for each unused key, prefixed with the section name
    pub fn check_prefixed(&self, prefix: &str) {
        for key in self.keys() {
            hintln!("Warning", "config `{}.{}` is unused", prefix, key);
        }
    }
}
