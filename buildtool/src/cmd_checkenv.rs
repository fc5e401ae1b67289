use buildcommon::prelude::*;

use std::path::{Path, PathBuf};

use buildcommon::config::ProjectConfig;
use buildcommon::toolchain::{CcInfo, ToolchainLocator};
use clap::Args;
use derive_more::derive::Deref;

use crate::cli::{CommonOptions, TopLevelOptions};
use crate::error::Error;

/// CLI Options for the checkenv command
#[derive(Debug, Clone, PartialEq, Args, Deref)]
pub struct Options {
    /// Don't run the compiler to check its version
    #[clap(long)]
    pub no_version: bool,

    /// Common options
    #[deref]
    #[clap(flatten)]
    pub options: CommonOptions,
}

/// Look up every tool and report each one, instead of
/// stopping at the first missing tool like `configure` does
pub fn run(top: &TopLevelOptions, options: &Options) -> Result<(), Error> {
    let root = Path::new(&top.dir).to_abs().change_context(Error::CheckEnv)?;
    let config = ProjectConfig::load(&root).change_context(Error::CheckEnv)?;
    let locator = ToolchainLocator::from_config(&config.toolchain, &root);

    let checks = check_tools(&locator);
    let mut ok = checks.iter().all(|c| c.path.is_some());
    let cc = checks
        .into_iter()
        .find(|c| c.var == "CC")
        .and_then(|c| c.path);

    let query_version = config.toolchain.query_version.unwrap_or(true) && !options.no_version;
    if let (Some(cc), true) = (cc, query_version) {
        match CcInfo::query(&cc.display().to_string()) {
            Ok(info) => infoln!("OK", "gcc {}", info.version.join(".")),
            Err(e) => {
                ok = false;
                errorln!("Failed", "Cannot query compiler version");
                verboseln!("{:?}", e);
            }
        }
    }

    if !ok {
        errorln!("Failed", "Environment check");
        hintln!("Consider", "Install the arm-none-eabi GCC toolchain and add it to PATH");
        hintln!("Consider", "Or set `toolchain.search-paths` in Stm32Conf.toml");
        return Err(report!(Error::CheckEnv));
    }

    infoln!("Success", "Environment check OK");
    Ok(())
}

/// Lookup result of one tool
#[derive(Debug)]
struct ToolCheck {
    name: String,
    var: &'static str,
    path: Option<PathBuf>,
}

/// Look up and print every tool
fn check_tools(locator: &ToolchainLocator) -> Vec<ToolCheck> {
    locator
        .find_all()
        .into_iter()
        .map(|(tool, result)| {
            let name = locator.program_name(tool);
            let path = match result {
                Ok(path) => {
                    infoln!("OK", "{} ({}): {}", name, tool.var, path.display());
                    Some(path)
                }
                Err(e) => {
                    errorln!("Missing", "{} ({})", name, tool.var);
                    verboseln!("{:?}", e);
                    None
                }
            };
            ToolCheck {
                name,
                var: tool.var,
                path,
            }
        })
        .collect()
}
