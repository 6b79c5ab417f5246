//! Public entry points: the [`Xml`] registry handle, its builder, and typed
//! [`Adapter`]s.

use crate::descriptor::ClassDescriptor;
use crate::engine::Emitter;
use crate::error::{Error, Result};
use crate::object::XmlObject;
use crate::registry::{ClassAdapter, ConvertFn, Registry};
use crate::value::ObjectType;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::trace;

/// Configures an [`Xml`] registry before any adapter is built.
///
/// ```rust
/// use parsnip::Xml;
///
/// struct Celsius(f64);
///
/// let xml = Xml::builder()
///     .converter(|c: &Celsius| format!("{:.1}C", c.0))
///     .declaration(true)
///     .build();
/// # let _ = xml;
/// ```
#[derive(Default)]
pub struct XmlBuilder {
    converters: HashMap<TypeId, Arc<ConvertFn>>,
    declaration: bool,
}

impl XmlBuilder {
    /// Format every field of type `T` marked as converted with `convert`.
    /// A later registration for the same type replaces the earlier one.
    pub fn converter<T, F>(mut self, convert: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let erased = move |value: &dyn Any| {
            value
                .downcast_ref::<T>()
                .map(&convert)
                .ok_or(Error::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                })
        };
        self.converters.insert(TypeId::of::<T>(), Arc::new(erased));
        self
    }

    /// Prefix every document with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn declaration(mut self, enabled: bool) -> Self {
        self.declaration = enabled;
        self
    }

    pub fn build(self) -> Xml {
        Xml {
            registry: Arc::new(Registry::new(self.converters, self.declaration)),
        }
    }
}

/// A registry of adapters. Cloning is cheap and shares the cache.
#[derive(Clone, Default)]
pub struct Xml {
    registry: Arc<Registry>,
}

impl Xml {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> XmlBuilder {
        XmlBuilder::default()
    }

    /// The adapter for `T`, built on first request and cached afterwards.
    pub fn adapter<T: XmlObject>(&self) -> Result<Adapter<T>> {
        let class = self
            .registry
            .resolve(&ObjectType::of::<T>())?
            .into_any()
            .downcast::<ClassAdapter<T>>()
            .map_err(|_| Error::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(Adapter {
            registry: self.registry.clone(),
            class,
        })
    }

    /// Shorthand for `self.adapter::<T>()?.to_xml(value)`.
    pub fn to_xml<T: XmlObject>(&self, value: &T) -> Result<String> {
        self.adapter::<T>()?.to_xml(value)
    }

    /// Drop every cached adapter. Adapters already handed out keep working.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Number of adapters built and cached so far.
    pub fn cached(&self) -> usize {
        self.registry.cached()
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Xml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xml")
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

/// Writes values of one type as XML documents.
pub struct Adapter<T> {
    registry: Arc<Registry>,
    class: Arc<ClassAdapter<T>>,
}

impl<T: XmlObject> Adapter<T> {
    pub fn descriptor(&self) -> &ClassDescriptor<T> {
        &self.class.class
    }

    /// Serialize `value` into a complete document with one root element.
    pub fn to_xml(&self, value: &T) -> Result<String> {
        trace!(ty = std::any::type_name::<T>(), "writing xml document");
        let mut emitter = Emitter::new(&self.registry);
        emitter.write_root(self.descriptor(), value)?;
        Ok(emitter.finish())
    }

    /// Serialize `value` into a freshly allocated UTF-8 byte vector.
    pub fn to_vec(&self, value: &T) -> Result<Vec<u8>> {
        self.to_xml(value).map(String::into_bytes)
    }

    /// Serialize `value` and write the document into `writer`.
    pub fn to_writer<W: Write>(&self, mut writer: W, value: &T) -> Result<()> {
        let document = self.to_xml(value)?;
        writer.write_all(document.as_bytes())?;
        Ok(())
    }

    /// Whether both handles share the same cached adapter.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.class, &other.class)
    }
}

impl<T> Clone for Adapter<T> {
    fn clone(&self) -> Self {
        Adapter {
            registry: self.registry.clone(),
            class: self.class.clone(),
        }
    }
}

impl<T> fmt::Debug for Adapter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Adapter").field(&self.class.class).finish()
    }
}
