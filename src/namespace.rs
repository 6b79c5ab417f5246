//! Namespace prefix allocation for one emission pass.
//!
//! A URI is bound to exactly one prefix for the whole document and a prefix
//! is never bound to two URIs. The `xmlns:` declaration is attached to the
//! element that first needs the URI and is inherited by its descendants; a
//! later element outside that subtree declares the same binding again.

use std::collections::HashMap;

/// A namespace declared by field metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceRef {
    uri: String,
    prefix: Option<String>,
}

impl NamespaceRef {
    pub fn new(uri: impl Into<String>) -> Self {
        NamespaceRef {
            uri: uri.into(),
            prefix: None,
        }
    }

    /// Namespace with a preferred prefix. The hint is honoured unless another
    /// URI already took the prefix in the same document.
    pub fn with_prefix(uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        NamespaceRef {
            uri: uri.into(),
            prefix: Some(prefix.into()),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn prefix_hint(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

/// Per-document table of prefix bindings and open declaration scopes.
#[derive(Debug, Default)]
pub struct NamespaceTable {
    prefixes: HashMap<String, String>,
    owners: HashMap<String, String>,
    scopes: Vec<Vec<String>>,
    generated: usize,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix bound to `ns.uri()`, assigning one on first encounter.
    pub fn resolve(&mut self, ns: &NamespaceRef) -> String {
        if let Some(prefix) = self.prefixes.get(ns.uri()) {
            return prefix.clone();
        }
        let prefix = match ns.prefix_hint() {
            Some(hint) if !self.owners.contains_key(hint) => hint.to_owned(),
            _ => self.generate(),
        };
        self.prefixes.insert(ns.uri().to_owned(), prefix.clone());
        self.owners.insert(prefix.clone(), ns.uri().to_owned());
        prefix
    }

    /// True when no open element has declared `uri` yet.
    pub fn is_first_use(&self, uri: &str) -> bool {
        !self
            .scopes
            .iter()
            .any(|scope| scope.iter().any(|declared| declared == uri))
    }

    /// Start the scope of the element being opened.
    pub fn open_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Record that the innermost open element declares `uri`.
    pub fn declare(&mut self, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(uri.to_owned());
        }
    }

    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    fn generate(&mut self) -> String {
        loop {
            let candidate = format!("ns{}", self.generated);
            self.generated += 1;
            if !self.owners.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// Whether `name` is usable as an unprefixed XML name (an NCName).
pub(crate) fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Whether `prefix` may be bound by metadata. Prefixes starting with `xml`
/// are reserved.
pub(crate) fn is_bindable_prefix(prefix: &str) -> bool {
    is_ncname(prefix) && !is_reserved_name(prefix)
}

/// Names starting with `xml`, in any case, are reserved. This includes `xmlns`.
pub(crate) fn is_reserved_name(name: &str) -> bool {
    name.get(..3).is_some_and(|head| head.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_used_and_reused() {
        let mut table = NamespaceTable::new();
        let ns = NamespaceRef::with_prefix("foo", "ns");
        assert_eq!(table.resolve(&ns), "ns");
        assert_eq!(table.resolve(&ns), "ns");
        assert_eq!(table.resolve(&NamespaceRef::new("foo")), "ns");
    }

    #[test]
    fn test_taken_hint_falls_back_to_generated_prefix() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.resolve(&NamespaceRef::with_prefix("foo", "ns")), "ns");
        assert_eq!(table.resolve(&NamespaceRef::with_prefix("bar", "ns")), "ns0");
        assert_eq!(table.resolve(&NamespaceRef::new("baz")), "ns1");
    }

    #[test]
    fn test_generated_prefix_skips_hinted_ones() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.resolve(&NamespaceRef::with_prefix("a", "ns0")), "ns0");
        assert_eq!(table.resolve(&NamespaceRef::new("b")), "ns1");
    }

    #[test]
    fn test_declarations_follow_element_scopes() {
        let mut table = NamespaceTable::new();
        table.open_scope();
        assert!(table.is_first_use("foo"));
        table.declare("foo");
        table.open_scope();
        assert!(!table.is_first_use("foo"));
        table.declare("bar");
        table.close_scope();
        assert!(table.is_first_use("bar"));
        assert!(!table.is_first_use("foo"));
        table.close_scope();
        assert!(table.is_first_use("foo"));
    }

    #[test]
    fn test_prefix_validation() {
        assert!(is_bindable_prefix("ns"));
        assert!(is_bindable_prefix("a-b.c_1"));
        assert!(!is_bindable_prefix(""));
        assert!(!is_bindable_prefix("1ns"));
        assert!(!is_bindable_prefix("xmlns"));
        assert!(!is_bindable_prefix("XMLfoo"));
        assert!(!is_bindable_prefix("a:b"));
        assert!(is_reserved_name("xmlns"));
        assert!(is_reserved_name("Xml"));
        assert!(!is_reserved_name("xm"));
        assert!(!is_reserved_name("éxml"));
    }
}
