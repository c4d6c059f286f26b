//! One module per subcommand, each exposing an `execute` function.

pub mod check;
pub mod decrypt;
pub mod encrypt;
pub mod init;
pub mod keys;
