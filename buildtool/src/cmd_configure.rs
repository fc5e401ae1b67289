use buildcommon::prelude::*;

use std::path::Path;
use std::time::Instant;

use buildcommon::config::ProjectConfig;
use buildcommon::env;
use buildcommon::host::HostFlags;

use crate::cli::TopLevelOptions;
use crate::error::Error;

error_context!(pub Configure, |r| -> Error {
    errorln!("Failed", "Configuring build environment");
    r.change_context(Error::Configure)
});

/// Run the configure pipeline and cache the result
///
/// The cache is only written when every step succeeded
pub fn run(top: &TopLevelOptions) -> ResultIn<(), Configure> {
    let start_time = Instant::now();

    let root = Path::new(&top.dir).to_abs()?;
    infoln!("Configuring", "{}", root.display());

    let config = ProjectConfig::load(&root)?;
    let pipeline = config.pipeline(&root, HostFlags::from_process());
    let build_env = pipeline.run()?;

    let cache = env::cache_path(&root);
    build_env.save(&cache)?;
    infoln!("Cached", "{}", cache.rebase(&root).display());

    let elapsed = start_time.elapsed();
    infoln!(
        "Finished",
        "{} variables in {:.2}s",
        build_env.len(),
        elapsed.as_secs_f32()
    );

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;

    use buildcommon::env::BuildEnv;
    use tempfile::TempDir;

    /// Project with a stub toolchain in `bin/` and a config pointing to it
    fn project(programs: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        for program in programs {
            let path = bin.join(format!("arm-none-eabi-{}", program));
            std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        std::fs::write(
            dir.path().join("Stm32Conf.toml"),
            "[toolchain]\nsearch-paths = [\"bin\"]\nquery-version = false\n",
        )
        .unwrap();
        dir
    }

    fn top(dir: &TempDir) -> TopLevelOptions {
        TopLevelOptions {
            dir: dir.path().display().to_string(),
        }
    }

    #[test]
    fn test_configure_writes_cache() {
        let dir = project(&["gcc", "g++", "ar", "objcopy"]);
        run(&top(&dir)).into_report().unwrap();

        let root = dir.path().to_abs().unwrap();
        let build_env = BuildEnv::load(env::cache_path(&root)).unwrap();
        let gcc = root.join("bin").join("arm-none-eabi-gcc").display().to_string();
        assert_eq!(build_env.get_str("CC"), Some(gcc.as_str()));
        assert_eq!(build_env.get_str("LINK_CC"), Some(gcc.as_str()));
        assert_eq!(build_env.get_str("CC_NAME"), Some("armgcc"));
        let script = format!("{}/lnk/STM32F429ZITX.ld", root.display());
        assert_eq!(build_env.get_str("LINKER_SCRIPT"), Some(script.as_str()));
        assert_eq!(build_env.get_list("CXXFLAGS").unwrap()[0], "-std=c++17");
        assert_eq!(build_env.get_list("CC_TGT_F").unwrap(), ["-c", "-o"]);
    }

    #[test]
    fn test_missing_tool_writes_no_cache() {
        let dir = project(&["gcc", "ar", "objcopy"]);
        assert!(run(&top(&dir)).into_report().is_err());

        let root = dir.path().to_abs().unwrap();
        assert!(!env::cache_path(&root).exists());
    }
}
