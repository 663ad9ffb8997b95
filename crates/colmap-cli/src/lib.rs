//! Library side of the `colmap` command-line tool.

pub mod logging;
pub mod session;
