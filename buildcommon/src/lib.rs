pub mod config;
pub mod env;
pub mod flags;
pub mod host;
pub mod print;
pub mod step;
pub mod system;
pub mod templates;
pub mod toolchain;
mod unused;
pub use unused::Unused;

pub mod prelude {
    pub use crate::system;
    pub use crate::system::{PathExt, ResultIn, ResultInExt};
    pub use crate::{args, error_context, errorln, hintln, infoln, verboseln};
    pub use error_stack::{report, Report, Result, ResultExt};
}
