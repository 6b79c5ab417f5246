//! # parsnip
//!
//! Declarative XML serialization. Each composite type describes its fields
//! once; an adapter built from that description writes any value of the type
//! as a well-formed XML element, recursing into nested types.
//!
//! ## Field mapping
//!
//! | Field type | Default role | Output |
//! |------------|--------------|--------|
//! | primitive, `String`, fieldless enum | attribute | `name="value"` |
//! | same, marked `text` | text | character data of the element |
//! | same, marked `tag` | tag | `<name>value</name>` |
//! | composite (`#[derive(Xml)]` struct) | nested | `<name ...>...</name>` via its own adapter |
//! | `Vec<T>` and other sequences | collection | one `<name>` element per item |
//! | `Option<T>` | as `T` | nothing when `None` |
//!
//! Attributes and children are written in declaration order. An element
//! with no text or children is self-closing (`<Name a="1" />`).
//!
//! ## Example
//!
//! ```rust
//! use parsnip::Xml;
//!
//! #[derive(Xml)]
//! struct Feed {
//!     version: u32,
//!     #[xml(tag)]
//!     title: String,
//!     #[xml(name = "entry")]
//!     entries: Vec<Entry>,
//! }
//!
//! #[derive(Xml)]
//! struct Entry {
//!     id: u64,
//!     #[xml(text)]
//!     summary: Option<String>,
//! }
//!
//! let feed = Feed {
//!     version: 2,
//!     title: "News & Notes".into(),
//!     entries: vec![
//!         Entry { id: 1, summary: Some("first".into()) },
//!         Entry { id: 2, summary: None },
//!     ],
//! };
//!
//! let xml = Xml::default();
//! assert_eq!(
//!     xml.to_xml(&feed).unwrap(),
//!     "<Feed version=\"2\"><title>News &amp; Notes</title>\
//!      <entry id=\"1\">first</entry><entry id=\"2\" /></Feed>"
//! );
//! ```

extern crate self as parsnip;

pub mod adapter;
mod classify;
pub mod descriptor;
mod engine;
pub mod error;
pub mod namespace;
pub mod object;
mod registry;
pub mod text;
pub mod value;
pub mod writer;

pub use adapter::{Adapter, Xml, XmlBuilder};
pub use descriptor::{ClassDescriptor, FieldDescriptor, Role};
pub use error::{Error, Result};
pub use namespace::{NamespaceRef, NamespaceTable};
pub use object::{FieldSpec, Fields, RoleHint, XmlObject};
pub use text::{TextSerializer, to_text};
pub use value::{ConvertedType, ObjectType, Shape, Value, XmlValue};

#[cfg(feature = "derive")]
pub use parsnip_derive::Xml;
