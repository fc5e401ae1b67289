//! Project config read from `Stm32Conf.toml`
use crate::prelude::*;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::flags::{FlagConfig, FlagRegistrar, FlagSet, TargetConfig};
use crate::host::HostFlags;
use crate::step::Pipeline;
use crate::system::Error;
use crate::templates::CommandTemplates;
use crate::toolchain::{ToolchainConfig, ToolchainLocator};
use crate::unused::Unused;

/// Name of the optional project config file
pub static CONFIG_FILE: &str = "Stm32Conf.toml";

/// Config data read from `Stm32Conf.toml`. Every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// The `[toolchain]` section
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// The `[flags]` section
    #[serde(default)]
    pub flags: FlagConfig,

    /// The `[target]` section
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(flatten, default)]
    pub unused: Unused,
}

impl ProjectConfig {
    /// Load the config from the project root, or the default config
    /// if the root has no config file
    ///
    /// Prints formatted error message when failed
    pub fn load(root: impl AsRef<Path>) -> Result<Self, Error> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            verboseln!("no {} found, using defaults", CONFIG_FILE);
            return Ok(Self::default());
        }
        let config = system::read_file(&path)?;
        Self::parse(&config).change_context_lazy(|| Error::ReadConfig(path.display().to_string()))
    }

    /// Parse config from TOML text
    pub fn parse(config: &str) -> Result<Self, toml::de::Error> {
        // print pretty toml error
        let config: Self = toml::from_str(config).map_err(|e| {
            for line in e.to_string().lines() {
                errorln!("Error", "{}", line);
            }
            e
        })?;
        config.warn_unused();
        Ok(config)
    }

    /// Print a warning for each unknown key
    pub fn warn_unused(&self) {
        for key in self.unused.keys() {
            hintln!("Warning", "config `{}` is unused", key);
        }
        self.toolchain.unused.check_prefixed("toolchain");
        self.flags.unused.check_prefixed("flags");
        self.target.unused.check_prefixed("target");
    }

    /// Build the configure pipeline for a project root
    ///
    /// Flags are registered first, then the toolchain is located,
    /// then host flags and command templates are added
    pub fn pipeline(&self, root: &Path, host: HostFlags) -> Pipeline {
        let flags = FlagSet::from_config(&self.flags, &self.target);
        Pipeline::new()
            .step(FlagRegistrar::new(flags, root))
            .step(ToolchainLocator::from_config(&self.toolchain, root))
            .step(host)
            .step(CommandTemplates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = ProjectConfig::parse("").unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = ProjectConfig::parse(
            r#"
[toolchain]
prefix = "arm-none-eabi-"
search-paths = ["/opt/gcc-arm/bin"]
query-version = false

[flags]
common = ["<default>", "-DDEBUG"]
as = ["-x", "assembler-with-cpp"]

[target]
linker-script = "ld/STM32F429ZITX_FLASH.ld"
map-file = "firmware.map"
defines = ["<default>", "USE_HAL_DRIVER"]
"#,
        )
        .unwrap();

        assert_eq!(config.toolchain.search_paths, ["/opt/gcc-arm/bin"]);
        assert_eq!(config.toolchain.query_version, Some(false));
        assert_eq!(
            config.flags.as_,
            Some(vec!["-x".to_string(), "assembler-with-cpp".to_string()])
        );
        assert_eq!(config.target.map_file.as_deref(), Some("firmware.map"));
        assert_eq!(config.unused.keys().count(), 0);
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let config = ProjectConfig::parse(
            r#"
typo = 1
[flags]
cflags = ["-O2"]
"#,
        )
        .unwrap();
        assert_eq!(config.unused.keys().collect::<Vec<_>>(), ["typo"]);
        assert_eq!(config.flags.unused.keys().collect::<Vec<_>>(), ["cflags"]);
    }

    #[test]
    fn test_bad_type_is_error() {
        assert!(ProjectConfig::parse("[flags]\nc = \"-std=c11\"\n").is_err());
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProjectConfig::load(dir.path()).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[toolchain\n").unwrap();
        let err = ProjectConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err.current_context(), Error::ReadConfig(_)));
    }

    #[test]
    fn test_pipeline_order() {
        let config = ProjectConfig::default();
        let pipeline = config.pipeline(Path::new("/project"), HostFlags::default());
        assert_eq!(pipeline.names(), ["flags", "toolchain", "host-flags", "templates"]);
    }
}
