mod fs;
#[cfg(feature = "download")]
mod http;
mod names;

pub(crate) use fs::*;
#[cfg(feature = "download")]
pub(crate) use http::*;
pub use names::*;
