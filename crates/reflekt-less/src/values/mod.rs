//! Value normalization: typed values, colors, keywords and variables.

pub mod color;
pub mod normalize;
pub mod substitute;
pub mod value;

pub use color::{Color, color_from_function};
pub use normalize::{declaration_key, normalize_value, resolve_value};
pub use substitute::{MAX_SUBSTITUTION_DEPTH, MAX_SUBSTITUTION_TOKENS, VariableDef, VariableScope, substitute_variables};
pub use value::{GlobalKeyword, Keyword, Number, Unit, Value};
