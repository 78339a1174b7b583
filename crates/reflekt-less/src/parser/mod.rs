//! LESS parser module.

/// Parse options.
pub mod options;
/// Block-structure parser.
pub mod parser;

pub use options::{DEFAULT_MAX_DEPTH, ParseOptions};
pub use parser::{Parser, RawBlock, RawDeclaration, RawTree};
