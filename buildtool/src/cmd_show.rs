use buildcommon::prelude::*;

use std::path::Path;

use buildcommon::env::{self, BuildEnv};
use clap::Args;
use derive_more::derive::Deref;

use crate::cli::{CommonOptions, TopLevelOptions};
use crate::error::Error;

/// CLI Options for the show command
#[derive(Debug, Clone, PartialEq, Args, Deref)]
pub struct Options {
    /// Only print this variable
    pub key: Option<String>,

    /// Print as JSON instead of YAML
    #[clap(long)]
    pub json: bool,

    /// Common options
    #[deref]
    #[clap(flatten)]
    pub options: CommonOptions,
}

pub fn run(top: &TopLevelOptions, options: &Options) -> Result<(), Error> {
    let root = Path::new(&top.dir).to_abs().change_context(Error::Show)?;
    let cache = env::cache_path(&root);
    if !cache.exists() {
        errorln!("Missing", "{}", cache.rebase(&root).display());
        hintln!("Consider", "Run `stm32-configure configure` first");
    }
    let build_env = BuildEnv::load(&cache).change_context(Error::Show)?;

    let output = format_env(&build_env, options.key.as_deref(), options.json)?;
    print!("{}", output);
    Ok(())
}

/// Format the whole environment or one variable
fn format_env(build_env: &BuildEnv, key: Option<&str>, json: bool) -> Result<String, Error> {
    let mut output = match (key, json) {
        (Some(key), json) => {
            let value = build_env
                .get(key)
                .ok_or_else(|| report!(Error::NoSuchKey(key.to_string())))?;
            if json {
                serde_json::to_string_pretty(value).change_context(Error::Format)?
            } else {
                serde_yaml_ng::to_string(value).change_context(Error::Format)?
            }
        }
        (None, true) => serde_json::to_string_pretty(build_env).change_context(Error::Format)?,
        (None, false) => serde_yaml_ng::to_string(build_env).change_context(Error::Format)?,
    };
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildEnv {
        let mut build_env = BuildEnv::new();
        build_env.set("CC", "/usr/bin/arm-none-eabi-gcc");
        build_env.set_list("CFLAGS", ["-std=c11"]);
        build_env
    }

    #[test]
    fn test_format_key_json() {
        let output = format_env(&sample(), Some("CFLAGS"), true).unwrap();
        assert_eq!(output, "[\n  \"-std=c11\"\n]\n");
        let output = format_env(&sample(), Some("CC"), true).unwrap();
        assert_eq!(output, "\"/usr/bin/arm-none-eabi-gcc\"\n");
    }

    #[test]
    fn test_format_all_json() {
        let output = format_env(&sample(), None, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["CC"], "/usr/bin/arm-none-eabi-gcc");
        assert_eq!(value["CFLAGS"][0], "-std=c11");
    }

    #[test]
    fn test_format_all_yaml() {
        let output = format_env(&sample(), None, false).unwrap();
        let parsed: BuildEnv = serde_yaml_ng::from_str(&output).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_missing_key() {
        let err = format_env(&sample(), Some("LINKFLAGS"), false).unwrap_err();
        assert!(matches!(err.current_context(), Error::NoSuchKey(k) if k == "LINKFLAGS"));
    }
}
