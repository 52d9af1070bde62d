pub mod bits;
pub mod cli;
pub mod core;
pub mod error;


pub use self::cli::{Input, Mode, Options, Parsed, parse_args, usage};
pub use self::core::*;
pub use self::error::BinecError;
