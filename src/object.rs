//! Field metadata supplied by composite types.
//!
//! A composite type lists its fields, in declaration order, through
//! [`XmlObject::describe`]. `#[derive(Xml)]` writes that method; it can also
//! be written by hand:
//!
//! ```rust
//! use parsnip::{Fields, XmlObject};
//!
//! struct Link {
//!     href: String,
//!     label: String,
//! }
//!
//! impl XmlObject for Link {
//!     fn element_name() -> &'static str {
//!         "link"
//!     }
//!
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields.field("href", |l: &Self| &l.href);
//!         fields.field("label", |l: &Self| &l.label).text();
//!     }
//! }
//!
//! let xml = parsnip::Xml::default();
//! let link = Link { href: "/a?b&c".into(), label: "A".into() };
//! assert_eq!(xml.to_xml(&link).unwrap(), r#"<link href="/a?b&amp;c">A</link>"#);
//! ```

use crate::error::Result;
use crate::namespace::NamespaceRef;
use crate::text::to_text;
use crate::value::{ConvertedType, Shape, Value, XmlValue};
use serde::Serialize;
use std::any::Any;

/// A composite type with its own XML element.
pub trait XmlObject: Sized + 'static {
    /// Element name used when a value of this type is the document root.
    fn element_name() -> &'static str;

    /// List the fields of the type, in declaration order.
    fn describe(fields: &mut Fields<Self>);
}

/// Role requested by the metadata. `Auto` leaves the choice to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleHint {
    #[default]
    Auto,
    Attribute,
    Text,
    Tag,
}

pub(crate) trait ReadField<T>: Send + Sync {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>>;
}

struct Accessor<T, F: ?Sized> {
    get: fn(&T) -> &F,
}

impl<T, F: XmlValue + ?Sized + 'static> ReadField<T> for Accessor<T, F> {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        (self.get)(object).to_value()
    }
}

struct SerdeAccessor<T, F: ?Sized> {
    get: fn(&T) -> &F,
}

impl<T, F: Serialize + ?Sized + 'static> ReadField<T> for SerdeAccessor<T, F> {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        to_text((self.get)(object)).map(Value::from_text)
    }
}

struct ConvertedAccessor<T, F> {
    get: fn(&T) -> &F,
}

impl<T, F: Any> ReadField<T> for ConvertedAccessor<T, F> {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        Ok(Value::Converted((self.get)(object)))
    }
}

struct OptionalConvertedAccessor<T, F> {
    get: fn(&T) -> &Option<F>,
}

impl<T, F: Any> ReadField<T> for OptionalConvertedAccessor<T, F> {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        Ok(match (self.get)(object) {
            Some(value) => Value::Converted(value),
            None => Value::Absent,
        })
    }
}

struct ConvertedItemsAccessor<T, F> {
    get: fn(&T) -> &Vec<F>,
}

impl<T, F: Any> ReadField<T> for ConvertedItemsAccessor<T, F> {
    fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        let items = (self.get)(object)
            .iter()
            .map(|item| Value::Converted(item))
            .collect();
        Ok(Value::Sequence(items))
    }
}

/// Metadata for one declared field, before classification.
pub struct FieldSpec<T> {
    pub(crate) source: &'static str,
    pub(crate) name: Option<String>,
    pub(crate) hint: RoleHint,
    pub(crate) namespace: Option<NamespaceRef>,
    pub(crate) shape: Shape,
    pub(crate) reader: Box<dyn ReadField<T>>,
}

impl<T> FieldSpec<T> {
    /// Write the field as an attribute of the element.
    pub fn attribute(&mut self) -> &mut Self {
        self.hint = RoleHint::Attribute;
        self
    }

    /// Write the field as the element's character data.
    pub fn text(&mut self) -> &mut Self {
        self.hint = RoleHint::Text;
        self
    }

    /// Write the field as a child element (one per item for sequences).
    pub fn tag(&mut self) -> &mut Self {
        self.hint = RoleHint::Tag;
        self
    }

    /// Override the emitted name. For sequences this names each item.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn namespace(&mut self, namespace: NamespaceRef) -> &mut Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn hint(&self) -> RoleHint {
        self.hint
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

/// Collects the [`FieldSpec`]s of one type.
pub struct Fields<T> {
    specs: Vec<FieldSpec<T>>,
}

impl<T: 'static> Fields<T> {
    pub(crate) fn new() -> Self {
        Fields { specs: Vec::new() }
    }

    fn push(&mut self, source: &'static str, shape: Shape, reader: Box<dyn ReadField<T>>) -> &mut FieldSpec<T> {
        self.specs.push(FieldSpec {
            source,
            name: None,
            hint: RoleHint::Auto,
            namespace: None,
            shape,
            reader,
        });
        let last = self.specs.len() - 1;
        &mut self.specs[last]
    }

    /// Declare a field whose type implements [`XmlValue`].
    pub fn field<F: XmlValue + ?Sized + 'static>(
        &mut self,
        source: &'static str,
        get: fn(&T) -> &F,
    ) -> &mut FieldSpec<T> {
        self.push(source, F::shape(), Box::new(Accessor { get }))
    }

    /// Declare a scalar field formatted through its `serde::Serialize` impl.
    ///
    /// Only the value tells whether it serializes as a scalar, so a type that
    /// serializes as a sequence or map builds fine and fails every write
    /// with [`Error::Unsupported`](crate::Error::Unsupported).
    pub fn serialized<F: Serialize + ?Sized + 'static>(
        &mut self,
        source: &'static str,
        get: fn(&T) -> &F,
    ) -> &mut FieldSpec<T> {
        self.push(source, Shape::Scalar, Box::new(SerdeAccessor { get }))
    }

    /// Declare a field formatted by the converter registered for `F`.
    pub fn converted<F: Any>(&mut self, source: &'static str, get: fn(&T) -> &F) -> &mut FieldSpec<T> {
        self.push(
            source,
            Shape::Converted(ConvertedType::of::<F>()),
            Box::new(ConvertedAccessor { get }),
        )
    }

    /// Like [`Fields::converted`] for a field that may be absent.
    pub fn converted_opt<F: Any>(
        &mut self,
        source: &'static str,
        get: fn(&T) -> &Option<F>,
    ) -> &mut FieldSpec<T> {
        self.push(
            source,
            Shape::Converted(ConvertedType::of::<F>()),
            Box::new(OptionalConvertedAccessor { get }),
        )
    }

    /// A collection whose items are each formatted by the converter for `F`.
    pub fn converted_seq<F: Any>(
        &mut self,
        source: &'static str,
        get: fn(&T) -> &Vec<F>,
    ) -> &mut FieldSpec<T> {
        self.push(
            source,
            Shape::Sequence(Box::new(Shape::Converted(ConvertedType::of::<F>()))),
            Box::new(ConvertedItemsAccessor { get }),
        )
    }

    pub(crate) fn into_specs(self) -> Vec<FieldSpec<T>> {
        self.specs
    }
}
