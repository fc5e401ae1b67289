//! Locating the arm-none-eabi cross toolchain
use crate::prelude::*;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::env::BuildEnv;
use crate::step::ConfigurationStep;
use crate::system::{Command, Error};
use crate::unused::Unused;

/// Default prefix of the cross tools
pub static DEFAULT_PREFIX: &str = "arm-none-eabi-";

/// Compiler identity recorded as `CC_NAME`
pub static CC_NAME: &str = "armgcc";

/// A tool role in the build environment and the executable that fills it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Variable the path is stored in
    pub var: &'static str,
    /// Executable name without the toolchain prefix
    pub program: &'static str,
}

/// Every tool the locator resolves. gcc is also the assembler and linker driver
pub static TOOLS: &[Tool] = &[
    Tool { var: "CC", program: "gcc" },
    Tool { var: "CXX", program: "g++" },
    Tool { var: "AR", program: "ar" },
    Tool { var: "AS", program: "gcc" },
    Tool { var: "LINK_CC", program: "gcc" },
    Tool { var: "OBJCOPY", program: "objcopy" },
];

/// Config in the `[toolchain]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolchainConfig {
    /// Prefix of the executables, `arm-none-eabi-` if not set
    pub prefix: Option<String>,

    /// Directories to search, relative to the project root.
    /// `PATH` is used when empty
    #[serde(default)]
    pub search_paths: Vec<String>,

    /// Run the compiler to get its version. On by default
    pub query_version: Option<bool>,

    #[serde(flatten, default)]
    pub unused: Unused,
}

/// Step that finds the cross tools and records their paths
#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    prefix: String,
    search_paths: Vec<PathBuf>,
    query_version: bool,
}

impl Default for ToolchainLocator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            search_paths: vec![],
            query_version: true,
        }
    }
}

impl ToolchainLocator {
    pub fn from_config(config: &ToolchainConfig, root: &Path) -> Self {
        Self {
            prefix: config
                .prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            search_paths: config.search_paths.iter().map(|p| root.join(p)).collect(),
            query_version: config.query_version.unwrap_or(true),
        }
    }

    /// Only search these directories instead of `PATH`
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query_version(mut self, query: bool) -> Self {
        self.query_version = query;
        self
    }

    /// Full executable name of a tool, e.g. `arm-none-eabi-gcc`
    pub fn program_name(&self, tool: &Tool) -> String {
        format!("{}{}", self.prefix, tool.program)
    }

    /// Find an executable in the search locations and make its path absolute
    pub fn find_program(&self, name: &str) -> Result<PathBuf, Error> {
        let found = if self.search_paths.is_empty() {
            which::which(name).ok()
        } else {
            self.search_paths
                .iter()
                .find_map(|dir| which::which_in(name, Some(dir), dir).ok())
        };

        match found {
            Some(path) => {
                // relative search directories give relative matches
                let path = path.to_abs()?;
                verboseln!("found {}: {}", name, path.display());
                Ok(path)
            }
            None => {
                let locations = if self.search_paths.is_empty() {
                    "PATH".to_string()
                } else {
                    self.search_paths
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                Err(report!(Error::ToolNotFound(name.to_string())))
                    .attach_printable(format!("searched: {}", locations))
            }
        }
    }

    /// Look up every tool without stopping at the first missing one
    pub fn find_all(&self) -> Vec<(&'static Tool, Result<PathBuf, Error>)> {
        TOOLS
            .iter()
            .map(|tool| (tool, self.find_program(&self.program_name(tool))))
            .collect()
    }

    /// Resolve all tools into a separate environment
    ///
    /// Fails on the first tool that cannot be found
    pub fn locate(&self) -> Result<BuildEnv, Error> {
        let mut staged = BuildEnv::new();
        for tool in TOOLS {
            let name = self.program_name(tool);
            let path = self.find_program(&name)?.to_utf8()?;
            staged.set(tool.var, path);
        }
        staged.set("CC_NAME", CC_NAME);

        Ok(staged)
    }
}

impl ConfigurationStep for ToolchainLocator {
    fn name(&self) -> &'static str {
        "toolchain"
    }

    fn apply(&self, env: &mut BuildEnv) -> Result<(), Error> {
        // nothing is committed until every tool and the version are known
        let mut staged = self.locate().map_err(|e| {
            if let Error::ToolNotFound(name) = e.current_context() {
                errorln!("Missing", "{}", name);
                hintln!("Fix", "Install the arm-none-eabi GCC toolchain and add it to PATH");
            }
            e
        })?;
        for tool in TOOLS {
            if let Some(path) = staged.get_str(tool.var) {
                infoln!("Found", "{}: {}", self.program_name(tool), path);
            }
        }

        if self.query_version {
            let cc = staged.get_str("CC").unwrap_or_default().to_string();
            let info = CcInfo::query(&cc)?;
            infoln!("Compiler", "gcc {}", info.version.join("."));
            info.write_to(&mut staged);
        }

        env.merge(staged);
        Ok(())
    }
}

/// Identity of the C compiler from its predefined macros
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcInfo {
    /// Major, minor and patch level
    pub version: [String; 3],
    /// `DEST_BINFMT`
    pub binfmt: Option<&'static str>,
    /// `DEST_CPU`
    pub cpu: Option<&'static str>,
}

/// Macros checked in order for `DEST_CPU`
static MACRO_TO_CPU: &[(&str, &str)] = &[
    ("__aarch64__", "aarch64"),
    ("__thumb__", "thumb"),
    ("__arm__", "arm"),
];

impl CcInfo {
    /// Run `<cc> -dM -E -` and parse the output
    pub fn query(cc: &str) -> Result<Self, Error> {
        let output = Command::new(cc)
            .args(args!["-dM", "-E", "-"])
            .null_stdin()
            .piped()
            .output()?;
        if let Err(e) = output.check() {
            output.dump_stderr("Error");
            return Err(e);
        }
        Self::parse(cc, &output.stdout_lossy())
    }

    /// Parse `#define` lines from the preprocessor
    pub fn parse(cc: &str, defines: &str) -> Result<Self, Error> {
        let macros = parse_defines(defines)?;
        if macros.contains_key("__clang__") {
            return Err(report!(Error::NotGcc(cc.to_string())))
                .attach_printable("compiler defines __clang__");
        }
        let major = match macros.get("__GNUC__") {
            Some(major) => major.clone(),
            None => {
                return Err(report!(Error::NotGcc(cc.to_string())))
                    .attach_printable("compiler does not define __GNUC__");
            }
        };
        let minor = macros.get("__GNUC_MINOR__").cloned().unwrap_or_else(|| "0".to_string());
        let patch = macros
            .get("__GNUC_PATCHLEVEL__")
            .cloned()
            .unwrap_or_else(|| "0".to_string());

        let binfmt = macros.contains_key("__ELF__").then_some("elf");
        let cpu = MACRO_TO_CPU
            .iter()
            .find(|(m, _)| macros.contains_key(*m))
            .map(|(_, cpu)| *cpu);

        Ok(Self {
            version: [major, minor, patch],
            binfmt,
            cpu,
        })
    }

    pub fn write_to(&self, env: &mut BuildEnv) {
        env.set_list("CC_VERSION", self.version.iter().cloned());
        if let Some(binfmt) = self.binfmt {
            env.set("DEST_BINFMT", binfmt);
        }
        if let Some(cpu) = self.cpu {
            env.set("DEST_CPU", cpu);
        }
    }
}

static DEFINE_REGEX: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^#define\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s+(.*))?$"));

fn parse_defines(output: &str) -> Result<FxHashMap<String, String>, Error> {
    let re = match DEFINE_REGEX.as_ref() {
        Ok(re) => re,
        Err(e) => return Err(report!(Error::DefineRegex)).attach_printable(e.to_string()),
    };
    let macros = output
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line.trim_end())?;
            let name = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).map(|v| v.as_str().trim()).unwrap_or("");
            Some((name, value.to_string()))
        })
        .collect();
    Ok(macros)
}
