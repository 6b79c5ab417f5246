//! Recursive XML emission.
//!
//! For one element: read every field, bind the namespaces its own name, its
//! attributes and its child names need, write the opening tag (namespace
//! declarations first, then attributes in declaration order), and either
//! self-close or write text and children in declaration order before the end
//! tag. Child elements of composite types go back through the registry.

use crate::descriptor::{ClassDescriptor, FieldDescriptor, Role, Target};
use crate::error::{Error, Result};
use crate::namespace::{NamespaceRef, NamespaceTable};
use crate::registry::Registry;
use crate::value::{ObjectType, Value};
use crate::writer::XmlWriter;
use std::any::Any;
use std::borrow::Cow;

/// Name of the element being written and the namespace of the field that
/// introduced it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementName<'n> {
    pub(crate) local: &'n str,
    pub(crate) namespace: Option<&'n NamespaceRef>,
}

/// State of one emission pass. Never shared between passes.
pub(crate) struct Emitter<'r> {
    registry: &'r Registry,
    namespaces: NamespaceTable,
    writer: XmlWriter,
}

impl<'r> Emitter<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Emitter {
            registry,
            namespaces: NamespaceTable::new(),
            writer: XmlWriter::new(),
        }
    }

    pub(crate) fn write_root<T>(&mut self, class: &ClassDescriptor<T>, value: &T) -> Result<()> {
        if self.registry.declaration() {
            self.writer.declaration();
        }
        let name = ElementName {
            local: class.element(),
            namespace: None,
        };
        self.write_element(class, value, name)
    }

    pub(crate) fn finish(self) -> String {
        self.writer.into_string()
    }

    pub(crate) fn write_element<T>(
        &mut self,
        class: &ClassDescriptor<T>,
        value: &T,
        name: ElementName<'_>,
    ) -> Result<()> {
        let values = class
            .fields()
            .iter()
            .map(|field| field.read(value))
            .collect::<Result<Vec<_>>>()?;

        self.namespaces.open_scope();
        let result = self.write_fields(class.fields(), &values, name);
        self.namespaces.close_scope();
        result
    }

    fn write_fields<T>(
        &mut self,
        fields: &[FieldDescriptor<T>],
        values: &[Value<'_>],
        name: ElementName<'_>,
    ) -> Result<()> {
        let present = || fields.iter().zip(values).filter(|(_, value)| value.is_present());
        let attributes = present().filter(|(field, _)| field.role == Role::Attribute);
        let children = present().filter(|(field, _)| field.role != Role::Attribute);

        let mut declarations = Vec::new();
        let needed = name
            .namespace
            .into_iter()
            .chain(attributes.clone().filter_map(|(field, _)| field.namespace()))
            .chain(children.clone().filter_map(|(field, _)| field.namespace()));
        for ns in needed {
            let prefix = self.namespaces.resolve(ns);
            if self.namespaces.is_first_use(ns.uri()) {
                self.namespaces.declare(ns.uri());
                declarations.push((prefix, ns.uri()));
            }
        }

        let qname = self.qualify(name.local, name.namespace);
        self.writer.open_start(&qname);
        for (prefix, uri) in &declarations {
            self.writer.attribute(&format!("xmlns:{prefix}"), uri)?;
        }
        for (field, value) in attributes {
            if let Some(text) = text_of(&field.target, value)? {
                let attr = self.qualify(&field.name, field.namespace());
                self.writer.attribute(&attr, &text)?;
            }
        }

        if children.clone().next().is_none() {
            self.writer.close_empty();
            return Ok(());
        }
        self.writer.close_start();
        for (field, value) in children {
            self.write_child(field, value)?;
        }
        self.writer.end(&qname);
        Ok(())
    }

    fn write_child<T>(&mut self, field: &FieldDescriptor<T>, value: &Value<'_>) -> Result<()> {
        match field.role {
            Role::Text => {
                if let Some(text) = text_of(&field.target, value)? {
                    self.writer.text(&text)?;
                }
                Ok(())
            }
            Role::CollectionTag => match value {
                Value::Sequence(items) => items
                    .iter()
                    .filter(|item| item.is_present())
                    .try_for_each(|item| self.write_item(field, item)),
                _ => self.write_item(field, value),
            },
            Role::Tag | Role::Nested => self.write_item(field, value),
            Role::Attribute => Ok(()),
        }
    }

    /// One child element named after `field`.
    fn write_item<T>(&mut self, field: &FieldDescriptor<T>, value: &Value<'_>) -> Result<()> {
        let name = ElementName {
            local: &field.name,
            namespace: field.namespace(),
        };
        match (&field.target, value) {
            (Target::Object(ty), Value::Object(object)) => self.write_object(ty, *object, name),
            (target, value) => {
                if let Some(text) = text_of(target, value)? {
                    let qname = self.qualify(name.local, name.namespace);
                    self.writer.leaf(&qname, &text)?;
                }
                Ok(())
            }
        }
    }

    fn write_object(&mut self, ty: &ObjectType, object: &dyn Any, name: ElementName<'_>) -> Result<()> {
        let adapter = self.registry.resolve(ty)?;
        adapter.write(self, object, name)
    }

    fn qualify(&mut self, local: &str, namespace: Option<&NamespaceRef>) -> String {
        match namespace {
            Some(ns) => format!("{}:{local}", self.namespaces.resolve(ns)),
            None => local.to_owned(),
        }
    }
}

/// Text of a scalar or converted value; `None` when absent.
fn text_of<'v>(target: &Target, value: &'v Value<'_>) -> Result<Option<Cow<'v, str>>> {
    match (target, value) {
        (_, Value::Absent) => Ok(None),
        (_, Value::Text(text)) => Ok(Some(Cow::Borrowed(&**text))),
        (Target::Converted(convert), Value::Converted(object)) => {
            (convert.as_ref())(*object).map(|text| Some(Cow::Owned(text)))
        }
        (_, Value::Converted(_)) => Err(Error::Unsupported("converted value without a converter")),
        (_, Value::Object(_)) => Err(Error::Unsupported("composite value")),
        (_, Value::Sequence(_)) => Err(Error::Unsupported("sequence")),
    }
}
