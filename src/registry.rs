//! Adapter cache.
//!
//! One adapter per concrete type, built on first request and shared for the
//! life of the registry. Lookups after warm-up take a read lock and a
//! `OnceLock` read; a build holds only its own slot's mutex, so concurrent
//! requests for the same type wait for the in-flight build instead of
//! building twice.
//!
//! Building an adapter never resolves the adapters of nested field types.
//! Those are looked up here when a value of them is first written, so a type
//! may refer to itself, directly or through other types.

use crate::classify::classify;
use crate::descriptor::ClassDescriptor;
use crate::engine::{ElementName, Emitter};
use crate::error::{Error, Result};
use crate::object::XmlObject;
use crate::value::{ConvertedType, ObjectType};
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

pub(crate) type ConvertFn = dyn Fn(&dyn Any) -> Result<String> + Send + Sync;

/// Type-erased view of a built adapter.
pub(crate) trait ErasedAdapter: Send + Sync + 'static {
    fn write(&self, emitter: &mut Emitter<'_>, value: &dyn Any, name: ElementName<'_>) -> Result<()>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

pub(crate) struct ClassAdapter<T> {
    pub(crate) class: ClassDescriptor<T>,
}

impl<T: XmlObject> ErasedAdapter for ClassAdapter<T> {
    fn write(&self, emitter: &mut Emitter<'_>, value: &dyn Any, name: ElementName<'_>) -> Result<()> {
        let value = value.downcast_ref::<T>().ok_or(Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })?;
        emitter.write_element(&self.class, value, name)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub(crate) fn build_erased<T: XmlObject>(registry: &Registry) -> Result<Arc<dyn ErasedAdapter>> {
    let class = classify::<T>(registry)?;
    debug!(
        ty = std::any::type_name::<T>(),
        fields = class.fields().len(),
        "built xml adapter"
    );
    Ok(Arc::new(ClassAdapter { class }))
}

#[derive(Default)]
struct Slot {
    adapter: OnceLock<Arc<dyn ErasedAdapter>>,
    building: Mutex<()>,
}

#[derive(Default)]
pub(crate) struct Registry {
    adapters: RwLock<HashMap<TypeId, Arc<Slot>>>,
    converters: HashMap<TypeId, Arc<ConvertFn>>,
    declaration: bool,
}

impl Registry {
    pub(crate) fn new(converters: HashMap<TypeId, Arc<ConvertFn>>, declaration: bool) -> Self {
        Registry {
            adapters: RwLock::new(HashMap::new()),
            converters,
            declaration,
        }
    }

    /// Adapter for `ty`, building it on first use. A failed build leaves
    /// nothing behind; the next request tries again.
    pub(crate) fn resolve(&self, ty: &ObjectType) -> Result<Arc<dyn ErasedAdapter>> {
        let slot = self.slot(ty.id());
        if let Some(adapter) = slot.adapter.get() {
            trace!(ty = ty.name(), "xml adapter cache hit");
            return Ok(adapter.clone());
        }

        let _building = slot.building.lock();
        if let Some(adapter) = slot.adapter.get() {
            return Ok(adapter.clone());
        }
        match ty.build(self) {
            Ok(adapter) => Ok(slot.adapter.get_or_init(|| adapter).clone()),
            Err(err) => {
                debug!(ty = ty.name(), error = %err, "failed to build xml adapter");
                Err(err)
            }
        }
    }

    fn slot(&self, id: TypeId) -> Arc<Slot> {
        if let Some(slot) = self.adapters.read().get(&id) {
            return slot.clone();
        }
        self.adapters.write().entry(id).or_default().clone()
    }

    pub(crate) fn converter(&self, ty: &ConvertedType) -> Option<Arc<ConvertFn>> {
        self.converters.get(&ty.id).cloned()
    }

    pub(crate) fn declaration(&self) -> bool {
        self.declaration
    }

    pub(crate) fn clear(&self) {
        self.adapters.write().clear();
    }

    pub(crate) fn cached(&self) -> usize {
        self.adapters
            .read()
            .values()
            .filter(|slot| slot.adapter.get().is_some())
            .count()
    }
}
