//! Importing flags from the process environment
use crate::prelude::*;

use std::collections::BTreeMap;

use crate::env::BuildEnv;
use crate::step::ConfigurationStep;
use crate::system::Error;

/// Process environment variable and the build variable it is appended to
pub static HOST_FLAG_VARS: &[(&str, &str)] = &[
    ("CPPFLAGS", "CPPFLAGS"),
    ("CFLAGS", "CFLAGS"),
    ("CXXFLAGS", "CXXFLAGS"),
    ("LINKFLAGS", "LINKFLAGS"),
    ("LDFLAGS", "LINKFLAGS"),
];

/// Step that appends user flags from environment variables like `CFLAGS`
///
/// Flags already in the build environment are not added again, so
/// applying this step more than once has no extra effect
#[derive(Debug, Clone, Default)]
pub struct HostFlags {
    vars: BTreeMap<String, String>,
}

impl HostFlags {
    /// Snapshot the relevant variables of the current process
    pub fn from_process() -> Self {
        Self::new(HOST_FLAG_VARS.iter().filter_map(|(var, _)| {
            std::env::var(var).ok().map(|value| (var.to_string(), value))
        }))
    }

    pub fn new(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }
}

impl ConfigurationStep for HostFlags {
    fn name(&self) -> &'static str {
        "host-flags"
    }

    fn apply(&self, env: &mut BuildEnv) -> Result<(), Error> {
        for (var, dest) in HOST_FLAG_VARS {
            let Some(value) = self.vars.get(*var) else {
                continue;
            };
            let flags = value.split_whitespace().collect::<Vec<_>>();
            if flags.is_empty() {
                continue;
            }
            infoln!("Using", "{}={}", var, value.trim());
            env.append_unique(*dest, flags);
        }
        Ok(())
    }
}
