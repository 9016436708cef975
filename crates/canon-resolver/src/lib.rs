//! Priority-ordered resolution of canonical fields.
//!
//! A priority schema describes, for every output field, the ordered list of
//! dotted paths to try in a merged source record. Resolution walks the
//! schema and builds a canonical tree whose leaves carry the chosen value and
//! the name of the source it came from.

mod error;
mod path;
mod resolve;
mod schema;

pub use error::ResolveError;
pub use path::{lookup, KeyPath};
pub use resolve::{resolve, CanonicalField};
pub use schema::{LayeredSchema, PrioritySchema, ACCUMULATE_SUFFIX};
