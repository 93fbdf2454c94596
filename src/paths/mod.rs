//! Path representations shared by every resolver in the crate.
//!
//! - [segment]: the in-memory [ParsedPath] model
//! - [expression]: the normalized `$['a'][0]` notation used as Content Source Map keys
//! - [studio]: the `a[0].b` notation used by editing tools
pub mod expression;
pub mod segment;
pub mod studio;

pub use expression::{parse_expression, to_expression, to_mapping_key};
pub use segment::{KeyedSegment, ParsedPath, PathSegment};
pub use studio::{
    from_studio_path, parse_studio_path, parse_studio_path_to_parsed, parsed_to_studio_string,
    studio_path_to_string, to_studio_path, StudioPath, StudioSegment,
};
