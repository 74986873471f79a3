//! Error reporting for the Pug compiler.
//!
//! Every stage fails fast with a [`PugError`]: one code from the closed
//! [`ErrorCode`] catalogue, a message, and the template position. There is
//! no recovery; the first error aborts the compile.

mod error;
mod error_code;

pub use error::{PugError, PugResult};
pub use error_code::ErrorCode;
