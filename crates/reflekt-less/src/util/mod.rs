//! Small helpers shared by the parser and the value normalizer.
//!
//! Everything here is a pure function except the id generators, which are
//! injected into the parser so anonymous block keys can be made
//! deterministic.

pub mod args;
pub mod ids;
pub mod keywords;
pub mod strings;

pub use args::{argument_list, function_arguments, matching_paren, split_top_level_commas, trim_whitespace};
pub use ids::{IdGenerator, RandomIds, SeededIds, uuid};
pub use keywords::parse_keyword;
pub use strings::{
    escape_name, has_prefix, prefix_ordered_keys, prefix_rank, strip_quotes, strip_vendor_prefix, to_camel_case,
    unescape, unquote, vendor_prefix,
};
