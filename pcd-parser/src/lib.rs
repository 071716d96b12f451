pub mod error;
pub mod parsers;
pub mod reader;

pub use error::ParseError;
