#[derive(Debug, thiserror::Error)]
pub enum Error {
    // configure
    #[error("failed to configure the build environment")]
    Configure,

    // checkenv
    #[error("environment check failed")]
    CheckEnv,

    // show
    #[error("failed to read the cached build environment")]
    Show,
    #[error("`{0}` is not in the build environment")]
    NoSuchKey(String),
    #[error("failed to format the build environment")]
    Format,

    // clean
    #[error("failed to clean")]
    Clean,
}
