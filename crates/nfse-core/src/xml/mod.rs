//! XML element tree and tolerant field location.

mod locator;
mod tree;

pub use locator::{ElementPath, FieldLocator, FieldQuery, NamespaceSet};
pub use tree::{Descendants, Element, QName};
