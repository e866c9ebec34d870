//! AbiWord parsing module.
//!
//! The driver walks the XML once per pass and dispatches every element to
//! the active collector by its [`Token`].

mod abw_parser;
pub mod attrs;
pub mod list_resolver;
mod options;
mod token;

pub use abw_parser::AbwParser;
pub use list_resolver::resolve_list_ids;
pub use options::{ErrorMode, ParseOptions};
pub use token::Token;
