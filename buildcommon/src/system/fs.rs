use crate::prelude::*;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::Error;

/// Create file for buffered writing
pub fn buf_writer(path: impl AsRef<Path>) -> Result<BufWriter<File>, Error> {
    let path = path.as_ref();
    let file =
        File::create(path).change_context_lazy(|| Error::WriteFile(path.display().to_string()))?;
    Ok(BufWriter::new(file))
}

/// Open file for buffered reading
pub fn buf_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, Error> {
    let path = path.as_ref();
    let file =
        File::open(path).change_context_lazy(|| Error::ReadFile(path.display().to_string()))?;
    Ok(BufReader::new(file))
}

/// Read file as string
pub fn read_file(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    std::fs::read_to_string(path)
        .change_context_lazy(|| Error::ReadFile(path.display().to_string()))
}

/// Convenience wrapper for std::fs::remove_file
///
/// Removing a file that doesn't exist is not an error
pub fn remove_file(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    verboseln!("rm '{}'", path.display());
    if !path.exists() {
        return Ok(());
    }
    std::fs::remove_file(path).change_context_lazy(|| Error::RemoveFile(path.display().to_string()))
}

/// Convenience wrapper for std::fs::create_dir_all
pub fn ensure_directory(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    verboseln!("mkdir -p '{}'", path.display());
    std::fs::create_dir_all(path)
        .change_context_lazy(|| Error::CreateDirectory(path.display().to_string()))
}
