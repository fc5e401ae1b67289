//! Build flags
//!
//! The default lists here are what the STM32F429 firmware is built with.
//! They can be overridden per project in the `[flags]` section of
//! `Stm32Conf.toml`.

use crate::prelude::*;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::env::BuildEnv;
use crate::step::ConfigurationStep;
use crate::system::Error;
use crate::unused::Unused;

/// Default flags for `flags.common` (`CPPFLAGS`)
pub static DEFAULT_COMMON: &[&str] = &[
    // debug info, no optimization
    "-g",
    "-O0",
    // size optimization, paired with --gc-sections when linking
    "-ffunction-sections",
    "-fdata-sections",
    // warnings
    "-Wall",
    "-Wunused-parameter",
];

/// Default flags for `flags.c` (`CFLAGS`)
pub static DEFAULT_C: &[&str] = &["-std=c11"];

/// Default flags for `flags.cxx` (`CXXFLAGS`)
pub static DEFAULT_CXX: &[&str] = &["-std=c++17"];

/// Default flags for `flags.as` (`ASFLAGS`)
///
/// By default, also extends from `DEFAULT_COMMON`
pub static DEFAULT_AS: &[&str] = &[];

/// Default flags for `flags.ld` (`LINKFLAGS`)
///
/// The map file and linker script flags are appended after these
pub static DEFAULT_LD: &[&str] = &[
    "-Wl,--gc-sections",
    "-Wl,--print-memory-usage",
    // binutils 2.39+ warns "elf has a LOAD segment with RWX permissions"
    "-Wl,--no-warn-rwx-segments",
    "--specs=nosys.specs",
    "--specs=nano.specs",
    "-static",
];

/// Default flags for the archiver (`ARFLAGS`)
pub static DEFAULT_AR: &[&str] = &["rcs"];

/// Default preprocessor defines (`DEFINES`)
pub static DEFAULT_DEFINES: &[&str] = &["STM32F429xx"];

/// Default linker script, relative to the project root
pub static DEFAULT_LINKER_SCRIPT: &str = "lnk/STM32F429ZITX.ld";

/// Default link map output
pub static DEFAULT_MAP_FILE: &str = "stm32f429i-disc1.map";

/// Flags from configuration
///
/// `None` means to use the default list. Inside a list, the entry
/// `"<default>"` is replaced by the default list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagConfig {
    pub common: Option<Vec<String>>,
    pub c: Option<Vec<String>>,
    pub cxx: Option<Vec<String>>,
    #[serde(rename = "as")]
    pub as_: Option<Vec<String>>,
    pub ld: Option<Vec<String>>,

    #[serde(flatten, default)]
    pub unused: Unused,
}

/// Target settings from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Linker script, relative to the project root
    pub linker_script: Option<String>,
    /// Link map output file
    pub map_file: Option<String>,
    /// Preprocessor defines, supports `"<default>"`
    pub defines: Option<Vec<String>>,

    #[serde(flatten, default)]
    pub unused: Unused,
}

macro_rules! create_flags {
    ($field: expr, $default: ident extends $base: expr) => {
        match $field {
            None => $base
                .iter()
                .cloned()
                .chain($default.iter().map(|x| x.to_string()))
                .collect::<Vec<_>>(),
            Some(flags) => {
                let mut v = vec![];
                for flag in flags {
                    if flag == "<default>" {
                        v.extend($base.iter().cloned());
                        v.extend($default.iter().map(|x| x.to_string()));
                    } else {
                        v.push(flag.clone());
                    }
                }
                v
            }
        }
    };
    ($field: expr, $default: ident) => {
        create_flags!($field, $default extends Vec::<String>::new())
    };
}

/// Fully resolved flag lists, passed to [`FlagRegistrar`]
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSet {
    /// `CPPFLAGS`, used for C, C++ and assembly
    pub common: Vec<String>,
    pub c: Vec<String>,
    pub cxx: Vec<String>,
    /// `ASFLAGS`
    pub asm: Vec<String>,
    /// Linker flags before the map file and linker script
    pub ld: Vec<String>,
    pub ar: Vec<String>,
    pub defines: Vec<String>,
    /// Map file for `-Wl,-Map=`
    pub map_file: String,
    /// Linker script relative to the base directory, `/`-separated
    pub linker_script: String,
}

impl Default for FlagSet {
    fn default() -> Self {
        Self::from_config(&FlagConfig::default(), &TargetConfig::default())
    }
}

impl FlagSet {
    pub fn from_config(flags: &FlagConfig, target: &TargetConfig) -> Self {
        let common = create_flags!(&flags.common, DEFAULT_COMMON);
        let c = create_flags!(&flags.c, DEFAULT_C);
        let cxx = create_flags!(&flags.cxx, DEFAULT_CXX);
        let asm = create_flags!(&flags.as_, DEFAULT_AS extends common);
        let ld = create_flags!(&flags.ld, DEFAULT_LD);
        let defines = create_flags!(&target.defines, DEFAULT_DEFINES);

        Self {
            common,
            c,
            cxx,
            asm,
            ld,
            ar: DEFAULT_AR.iter().map(|x| x.to_string()).collect(),
            defines,
            map_file: target
                .map_file
                .clone()
                .unwrap_or_else(|| DEFAULT_MAP_FILE.to_string()),
            linker_script: target
                .linker_script
                .clone()
                .unwrap_or_else(|| DEFAULT_LINKER_SCRIPT.to_string()),
        }
    }

    /// Full `LINKFLAGS` list for the given absolute linker script path
    pub fn link_flags(&self, linker_script: &str) -> Vec<String> {
        let mut flags = self.ld.clone();
        flags.push(format!("-Wl,-Map={}", self.map_file));
        flags.push(format!("-T{}", linker_script));
        flags
    }
}

/// Step that installs the fixed compiler, assembler and linker flags
#[derive(Debug, Clone)]
pub struct FlagRegistrar {
    flags: FlagSet,
    base: PathBuf,
}

impl FlagRegistrar {
    /// `base` is the project directory the linker script is relative to
    pub fn new(flags: FlagSet, base: impl Into<PathBuf>) -> Self {
        Self {
            flags,
            base: base.into(),
        }
    }

    /// Absolute path of the linker script as `<abs base>/<linker script>`
    ///
    /// The base is not resolved through symlinks
    pub fn linker_script_path(&self) -> Result<String, Error> {
        let base = self.base.to_abs()?.to_utf8()?;
        Ok(format!("{}/{}", base, self.flags.linker_script))
    }
}

impl ConfigurationStep for FlagRegistrar {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn apply(&self, env: &mut BuildEnv) -> Result<(), Error> {
        let linker_script = self.linker_script_path()?;
        let flags = &self.flags;

        env.set_list("CPPFLAGS", flags.common.iter().cloned());
        env.set_list("ASFLAGS", flags.asm.iter().cloned());
        env.set_list("CFLAGS", flags.c.iter().cloned());
        env.set_list("CXXFLAGS", flags.cxx.iter().cloned());
        env.set_list("LINKFLAGS", flags.link_flags(&linker_script));
        env.set_list("ARFLAGS", flags.ar.iter().cloned());
        env.set_list("DEFINES", flags.defines.iter().cloned());
        env.set_list("INCLUDES", Vec::<String>::new());
        env.set("LINKER_SCRIPT", linker_script);

        verboseln!("CPPFLAGS = {}", flags.common.join(" "));
        verboseln!("LINKFLAGS = {}", env.get("LINKFLAGS").map(|v| v.to_string()).unwrap_or_default());
        infoln!("Flags", "registered compiler and linker flags");
        Ok(())
    }
}
