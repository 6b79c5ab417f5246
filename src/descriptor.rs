use crate::error::Result;
use crate::namespace::NamespaceRef;
use crate::object::ReadField;
use crate::registry::ConvertFn;
use crate::value::{ObjectType, Value};
use std::fmt;
use std::sync::Arc;

/// How a field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `name="value"` on the element's opening tag.
    Attribute,
    /// Character data of the element.
    Text,
    /// A leaf child element holding the value as text.
    Tag,
    /// One child element per item of a sequence.
    CollectionTag,
    /// A child element written by the field type's own adapter.
    Nested,
}

/// What writes the value (or each item, for collections).
#[derive(Clone)]
pub(crate) enum Target {
    Scalar,
    Object(ObjectType),
    Converted(Arc<ConvertFn>),
}

/// One classified field.
pub struct FieldDescriptor<T> {
    pub(crate) source: &'static str,
    pub(crate) name: String,
    pub(crate) role: Role,
    pub(crate) namespace: Option<NamespaceRef>,
    pub(crate) target: Target,
    pub(crate) reader: Box<dyn ReadField<T>>,
}

impl<T> FieldDescriptor<T> {
    /// The declared field this descriptor was built from.
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn namespace(&self) -> Option<&NamespaceRef> {
        self.namespace.as_ref()
    }

    /// Type of the nested element, or of each item for collections of
    /// composites.
    pub fn object_type(&self) -> Option<&ObjectType> {
        match &self.target {
            Target::Object(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn read<'a>(&self, object: &'a T) -> Result<Value<'a>> {
        self.reader.read(object)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("source", &self.source)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

/// The ordered, immutable field list of one type.
pub struct ClassDescriptor<T> {
    pub(crate) element: &'static str,
    pub(crate) fields: Vec<FieldDescriptor<T>>,
}

impl<T> ClassDescriptor<T> {
    /// Element name used when the type is the document root.
    pub fn element(&self) -> &'static str {
        self.element
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub fn field(&self, source: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.source == source)
    }
}

impl<T> fmt::Debug for ClassDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("element", &self.element)
            .field("fields", &self.fields)
            .finish()
    }
}
