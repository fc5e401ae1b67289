use std::process::ExitStatus;

use error_stack::{report, Report};

/// Error messages
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A required cross tool is not in any search location
    #[error("cannot find program `{0}`")]
    ToolNotFound(String),
    #[error("`{0}` is not a GCC compiler")]
    NotGcc(String),
    #[error("failed to load project config `{0}`")]
    ReadConfig(String),
    #[error("failed to compile the #define parser")]
    DefineRegex,
    #[error("configuration step `{0}` failed")]
    Step(&'static str),

    // === path operations ===
    #[error("failed to resolve absolute path of `{0}`")]
    Canonicalize(String),
    #[error("path should be utf-8: {0}")]
    NotUTF8(String),

    // === file operations ===
    #[error("failed to read from `{0}`")]
    ReadFile(String),
    #[error("failed to read YAML from `{0}`")]
    ReadYaml(String),
    #[error("failed to write to `{0}`")]
    WriteFile(String),
    #[error("failed to write YAML to `{0}`")]
    WriteYaml(String),
    #[error("failed to remove file `{0}`")]
    RemoveFile(String),
    #[error("failed to create directory `{0}`")]
    CreateDirectory(String),

    // === process operations ===
    #[error("failed to spawn `{0}`")]
    Spawn(String),
    #[error("failed to execute `{0}`")]
    Subcommand(String),
    #[error("{0} exited with status: {1}")]
    ExitStatus(String, ExitStatus),
}

/// Marker trait for errors that can be used
/// in the context wrapper system
pub trait Context: error_stack::Context {}

/// Trait for wrapping execution with some context
pub trait ChangeContext: Sized {
    type Target: error_stack::Context;
    fn change_context(report: Report<impl Context>) -> Report<Self::Target>;
}

/// Wrapper for Report so we can implement our own traits
#[repr(transparent)]
pub struct ReportWrapper<CC: ChangeContext>(Report<CC::Target>);

/// A Result type that wraps errors with context
/// automatically when using the `?` operator
pub type ResultIn<T, C> = Result<T, ReportWrapper<C>>;

impl<E: Context, CC: ChangeContext> From<E> for ReportWrapper<CC> {
    #[track_caller]
    fn from(value: E) -> Self {
        Self(CC::change_context(report!(value)))
    }
}

impl<E: Context, CC: ChangeContext> From<Report<E>> for ReportWrapper<CC> {
    #[track_caller]
    fn from(value: Report<E>) -> Self {
        Self(CC::change_context(value))
    }
}

impl<CC: ChangeContext> From<ReportWrapper<CC>> for Report<CC::Target> {
    fn from(value: ReportWrapper<CC>) -> Report<CC::Target> {
        value.0
    }
}

/// Create a type and implement the ChangeContext trait for it
#[macro_export]
macro_rules! error_context {
    ($vis:vis $ty:ident, | $report:ident | -> $target:ty $body:block) => {
        $vis struct $ty;
        impl $crate::system::ChangeContext for $ty {
            type Target = $target;
            #[inline]
            fn change_context($report: error_stack::Report<impl $crate::system::Context>) -> error_stack::Report<$target> {
                $body
            }
        }
    };
}

/// Unwrap a [`ResultIn`] into a plain [`Report`] result
pub trait ResultInExt {
    type Ok;
    type Context: error_stack::Context;

    /// Get the wrapped report as a regular `error_stack` result
    fn into_report(self) -> Result<Self::Ok, Report<Self::Context>>;
}

impl<T, C: ChangeContext> ResultInExt for ResultIn<T, C> {
    type Ok = T;
    type Context = C::Target;

    #[inline]
    fn into_report(self) -> Result<T, Report<C::Target>> {
        self.map_err(|ReportWrapper(report)| report)
    }
}

impl Context for Error {}
