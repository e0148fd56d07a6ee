//! iCalendar serialization (RFC 5545).
//!
//! This module provides serializers for iCalendar content:
//! - Escape: TEXT value escaping
//! - Fold: Content line folding at 75 octets
//! - Serializer: Full document serialization in insertion order

mod escape;
mod fold;
mod serializer;

pub use escape::{escape_text, escape_text_list};
pub use fold::fold_line;
pub use serializer::{Serializer, serialize, serialize_component, serialize_property};
