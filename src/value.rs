//! The value model seen by the field classifier and the emitter.
//!
//! Every field type implements [`XmlValue`], which answers two questions:
//! what the type *is* ([`Shape`], used once when a descriptor is built) and
//! what one instance *holds* ([`Value`], read on every emission).

use crate::error::Result;
use crate::object::XmlObject;
use crate::registry::{ErasedAdapter, Registry};
use crate::text::to_text;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Static description of a field type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Anything with a textual form: primitives, strings, enums.
    Scalar,
    /// A composite type with its own adapter.
    Object(ObjectType),
    /// A type formatted by a converter registered on the registry builder.
    Converted(ConvertedType),
    /// An ordered sequence of items of the inner shape.
    Sequence(Box<Shape>),
}

impl Shape {
    pub fn object<T: XmlObject>() -> Shape {
        Shape::Object(ObjectType::of::<T>())
    }

    pub fn sequence_of<T: XmlValue + ?Sized>() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }
}

/// Lazy handle to a composite type. Holding one never builds the adapter;
/// the registry does that the first time a value of the type is emitted.
#[derive(Clone, Copy)]
pub struct ObjectType {
    id: TypeId,
    name: &'static str,
    build: fn(&Registry) -> Result<Arc<dyn ErasedAdapter>>,
}

impl ObjectType {
    pub fn of<T: XmlObject>() -> Self {
        ObjectType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            build: crate::registry::build_erased::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The Rust type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build(&self, registry: &Registry) -> Result<Arc<dyn ErasedAdapter>> {
        (self.build)(registry)
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectType").field(&self.name).finish()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Identity of a type handled by a registered converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl ConvertedType {
    pub fn of<T: Any>() -> Self {
        ConvertedType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// What one field of one instance holds.
pub enum Value<'a> {
    Absent,
    Text(Cow<'a, str>),
    Object(&'a dyn Any),
    Converted(&'a dyn Any),
    Sequence(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    /// Whether the value produces any output at all.
    pub fn is_present(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::Sequence(items) => items.iter().any(Value::is_present),
            _ => true,
        }
    }

    pub(crate) fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) => Value::Text(Cow::Owned(text)),
            None => Value::Absent,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("Absent"),
            Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
            Value::Converted(_) => f.write_str("Converted(..)"),
            Value::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
        }
    }
}

/// A type that can appear as a field of an [`XmlObject`].
///
/// Implemented for primitives, `String`, `Option`, common sequences and smart
/// pointers; `#[derive(Xml)]` implements it for structs and fieldless enums.
pub trait XmlValue {
    fn shape() -> Shape;

    fn to_value(&self) -> Result<Value<'_>>;
}

macro_rules! scalar_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl XmlValue for $t {
                fn shape() -> Shape {
                    Shape::Scalar
                }

                fn to_value(&self) -> Result<Value<'_>> {
                    to_text(self).map(Value::from_text)
                }
            }
        )*
    };
}

scalar_value!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
);

impl XmlValue for String {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn to_value(&self) -> Result<Value<'_>> {
        Ok(Value::Text(Cow::Borrowed(self.as_str())))
    }
}

impl XmlValue for str {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn to_value(&self) -> Result<Value<'_>> {
        Ok(Value::Text(Cow::Borrowed(self)))
    }
}

impl XmlValue for Cow<'static, str> {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn to_value(&self) -> Result<Value<'_>> {
        Ok(Value::Text(Cow::Borrowed(self.as_ref())))
    }
}

impl<T: XmlValue> XmlValue for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        match self {
            Some(value) => value.to_value(),
            None => Ok(Value::Absent),
        }
    }
}

macro_rules! pointer_value {
    ($($p:ident),*) => {
        $(
            impl<T: XmlValue + ?Sized> XmlValue for $p<T> {
                fn shape() -> Shape {
                    T::shape()
                }

                fn to_value(&self) -> Result<Value<'_>> {
                    (**self).to_value()
                }
            }
        )*
    };
}

pointer_value!(Box, Arc, Rc);

fn sequence_value<'a, T: XmlValue + 'a>(items: impl Iterator<Item = &'a T>) -> Result<Value<'a>> {
    items
        .map(|item| item.to_value())
        .collect::<Result<Vec<_>>>()
        .map(Value::Sequence)
}

impl<T: XmlValue> XmlValue for Vec<T> {
    fn shape() -> Shape {
        Shape::sequence_of::<T>()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        sequence_value(self.iter())
    }
}

impl<T: XmlValue> XmlValue for [T] {
    fn shape() -> Shape {
        Shape::sequence_of::<T>()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        sequence_value(self.iter())
    }
}

impl<T: XmlValue, const N: usize> XmlValue for [T; N] {
    fn shape() -> Shape {
        Shape::sequence_of::<T>()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        sequence_value(self.iter())
    }
}

impl<T: XmlValue> XmlValue for VecDeque<T> {
    fn shape() -> Shape {
        Shape::sequence_of::<T>()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        sequence_value(self.iter())
    }
}

impl<T: XmlValue> XmlValue for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::sequence_of::<T>()
    }

    fn to_value(&self) -> Result<Value<'_>> {
        sequence_value(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_and_pointers_forward_shape() {
        assert!(matches!(<Option<Box<u8>>>::shape(), Shape::Scalar));
        assert!(matches!(
            <Option<Vec<String>>>::shape(),
            Shape::Sequence(inner) if matches!(*inner, Shape::Scalar)
        ));
        assert!(matches!(
            <Vec<Vec<u8>>>::shape(),
            Shape::Sequence(inner) if matches!(*inner, Shape::Sequence(_))
        ));
    }

    #[test]
    fn test_presence() {
        assert!(!Option::<u8>::None.to_value().unwrap().is_present());
        assert!(!Vec::<u8>::new().to_value().unwrap().is_present());
        assert!(!vec![None::<u8>, None].to_value().unwrap().is_present());
        assert!(vec![None, Some(1u8)].to_value().unwrap().is_present());
        assert!(String::new().to_value().unwrap().is_present());
    }
}
