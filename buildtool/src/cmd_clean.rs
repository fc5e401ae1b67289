use buildcommon::prelude::*;

use std::path::Path;

use buildcommon::env;

use crate::cli::TopLevelOptions;
use crate::error::Error;

pub fn run(top: &TopLevelOptions) -> Result<(), Error> {
    let root = Path::new(&top.dir).to_abs().change_context(Error::Clean)?;
    let cache = env::cache_path(&root);

    match system::remove_file(&cache) {
        Ok(_) => {
            infoln!("Cleaned", "{}", cache.rebase(&root).display());
            Ok(())
        }
        Err(e) => {
            errorln!("Failed", "Cannot remove '{}'", cache.rebase(&root).display());
            Err(e).change_context(Error::Clean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = env::cache_path(dir.path());
        std::fs::create_dir_all(cache.parent().unwrap()).unwrap();
        std::fs::write(&cache, "CC: gcc\n").unwrap();

        let top = TopLevelOptions {
            dir: dir.path().display().to_string(),
        };
        run(&top).unwrap();
        assert!(!cache.exists());
        // nothing to clean is not an error
        run(&top).unwrap();
    }
}
