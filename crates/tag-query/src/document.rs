//! The document capability predicates are evaluated against.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// A record exposing named string attributes.
///
/// In a browser host this is a thumbnail element and its `data-*`
/// attributes; anything that can look up a string by name will do.
pub trait Document {
    /// Returns the value of an attribute, or `None` if it is absent.
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> Document for HashMap<String, String, S> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Document for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<D: Document + ?Sized> Document for &D {
    fn attribute(&self, name: &str) -> Option<&str> {
        (**self).attribute(name)
    }
}
