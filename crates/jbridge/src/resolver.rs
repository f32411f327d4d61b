//! Class, field and method resolution with process-lifetime caches
//!
//! Classes are cached by [`Type`] and by the global reference the cache
//! owns; fields and methods are cached per class by descriptor. A handle
//! the cache does not own is matched against the owned globals with the
//! runtime's identity check, never by pointer value. Nothing is ever evicted:
//! a resolved class is assumed to stay loaded for as long as the resolver
//! lives. Class handles are promoted to global references on first lookup
//! and intentionally never released.

use std::ffi::{c_void, CString};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use tracing::{debug, warn};

use jbridge_sys::jclass;

use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::env::Env;
use crate::error::JniError;
use crate::refs::ObjectHandle;
use crate::types::Type;

/// A raw class, field or method handle that is valid on every thread.
///
/// Only used for global class references and member IDs, which the runtime
/// guarantees are not thread-affine. A local reference may be freed and its
/// slot reused for another class, so it never becomes a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RawHandle(pub(crate) *mut c_void);

// SAFETY: see the type docs; local references are never stored here.
unsafe impl Send for RawHandle {}
unsafe impl Sync for RawHandle {}

static SHARED: Lazy<Resolver> = Lazy::new(Resolver::new);

pub(crate) fn clear_pending(env: &mut Env<'_>) {
    if env.exception_check() {
        env.exception_clear();
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Top-level class cache.
#[derive(Default)]
pub struct Resolver {
    classes: DashMap<Type, Arc<ResolvedClass>>,
    by_handle: DashMap<RawHandle, Arc<ResolvedClass>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide resolver.
    pub fn shared() -> &'static Resolver {
        &SHARED
    }

    /// Number of distinct classes resolved so far.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Resolve a class or array type. `None` if the runtime cannot find it;
    /// any pending lookup error is cleared.
    pub fn try_find_class(&self, env: &mut Env<'_>, ty: &Type) -> Option<Arc<ResolvedClass>> {
        if let Some(class) = self.classes.get(ty) {
            return Some(class.value().clone());
        }
        let name = ty.lookup_name()?;
        let c_name = CString::new(name.as_str()).ok()?;
        let local = env.boundary().find_class(&c_name);
        if local.is_null() {
            clear_pending(env);
            debug!(class = %name, "class not found");
            return None;
        }
        debug!(class = %name, "class cache miss");
        let resolved = self.canonicalize(env, local, ty.clone());
        env.boundary().delete_local_ref(local);
        resolved
    }

    /// Like [`try_find_class`](Self::try_find_class) for classes that must
    /// exist.
    ///
    /// # Panics
    ///
    /// Panics if the class cannot be resolved.
    #[track_caller]
    pub fn find_class(&self, env: &mut Env<'_>, ty: &Type) -> Arc<ResolvedClass> {
        match self.try_find_class(env, ty) {
            Some(class) => class,
            None => panic!("{}", JniError::ClassNotFound(ty.to_string())),
        }
    }

    /// Resolve the class behind a class handle obtained elsewhere, such as
    /// a callback's `jclass` argument. The handle is not consumed.
    pub fn class_for_handle(
        &self,
        env: &mut Env<'_>,
        class: ObjectHandle,
    ) -> Option<Arc<ResolvedClass>> {
        if class.is_null() {
            return None;
        }
        if let Some(hit) = self.lookup_handle(env, class.as_raw()) {
            return Some(hit);
        }
        let ty = self.class_type_of(env, class.as_raw())?;
        if let Some(existing) = self.classes.get(&ty).map(|c| c.value().clone()) {
            return Some(existing);
        }
        self.canonicalize(env, class.as_raw(), ty)
    }

    /// Resolve the runtime class of an object.
    pub fn class_of(&self, env: &mut Env<'_>, obj: ObjectHandle) -> Option<Arc<ResolvedClass>> {
        if obj.is_null() {
            return None;
        }
        let local = env.boundary().get_object_class(obj.as_raw());
        if local.is_null() {
            clear_pending(env);
            return None;
        }
        // SAFETY: the runtime just returned this local reference.
        let resolved = self.class_for_handle(env, unsafe { ObjectHandle::from_raw(local) });
        env.boundary().delete_local_ref(local);
        resolved
    }

    /// Component class of an array class. `None` for non-array classes and
    /// primitive components. A successful lookup is cached on the array
    /// class; a failed one is retried on the next call.
    pub fn component_class(
        &self,
        env: &mut Env<'_>,
        array_class: &ResolvedClass,
    ) -> Option<Arc<ResolvedClass>> {
        if let Some(component) = array_class.component.get() {
            return Some(component.clone());
        }
        let component = array_class.ty.component()?;
        let class = self.try_find_class(env, &component)?;
        Some(array_class.component.get_or_init(|| class).clone())
    }

    /// Existing wrapper for a raw class handle. A global the cache owns
    /// matches directly; anything else is compared against every owned
    /// global by identity.
    fn lookup_handle(&self, env: &mut Env<'_>, raw: jclass) -> Option<Arc<ResolvedClass>> {
        if let Some(hit) = self.by_handle.get(&RawHandle(raw)).map(|c| c.value().clone()) {
            return Some(hit);
        }
        let owned: Vec<Arc<ResolvedClass>> =
            self.by_handle.iter().map(|c| c.value().clone()).collect();
        owned
            .into_iter()
            .find(|class| env.boundary().is_same_object(raw, class.handle.0))
    }

    /// Reuse the wrapper already registered for the class behind `raw`, or
    /// promote `raw` to a global reference and register a new one. Only the
    /// global is recorded. Does not delete `raw`.
    fn canonicalize(&self, env: &mut Env<'_>, raw: jclass, ty: Type) -> Option<Arc<ResolvedClass>> {
        if let Some(existing) = self.lookup_handle(env, raw) {
            let canonical = self.classes.entry(ty).or_insert(existing).value().clone();
            return Some(canonical);
        }

        let global = env.boundary().new_global_ref(raw);
        if global.is_null() {
            warn!(class = %ty, "could not create a global reference for class");
            return None;
        }

        let class = Arc::new(ResolvedClass::new(ty.clone(), RawHandle(global)));
        let lost_to = match self.classes.entry(ty) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(class.clone());
                None
            }
        };

        match lost_to {
            Some(winner) => {
                warn!(class = %winner.ty, "lost class insertion race");
                env.boundary().delete_global_ref(global);
                Some(winner)
            }
            None => {
                self.by_handle.insert(RawHandle(global), class.clone());
                Some(class)
            }
        }
    }

    /// Ask the runtime for a class's name via `Class.getName()`.
    fn class_type_of(&self, env: &mut Env<'_>, class: jclass) -> Option<Type> {
        let class_class = self.try_find_class(env, &Type::class("java/lang/Class"))?;
        let get_name = MethodDescriptor::builder()
            .name("getName")
            .returns(Type::string())
            .build()
            .ok()?;
        let method = class_class.try_find_method(env, &get_name)?;
        // SAFETY: `class` is a live class reference supplied by the caller.
        let receiver = unsafe { ObjectHandle::from_raw(class) };
        let name_handle = method.call_object(env, Some(receiver), |_| {}).ok()?;
        if name_handle.is_null() {
            return None;
        }
        let name = crate::string::read_string(env, name_handle);
        env.boundary().delete_local_ref(name_handle.as_raw());
        let name = name.ok()?;
        if name.starts_with('[') {
            Type::from_signature(&name.replace('.', "/")).ok()
        } else {
            Some(Type::class(&name))
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("classes", &self.classes.len())
            .finish()
    }
}

// ============================================================================
// ResolvedClass
// ============================================================================

/// A class handle plus its field and method caches.
///
/// Exactly one instance exists per class within a [`Resolver`].
pub struct ResolvedClass {
    pub(crate) ty: Type,
    pub(crate) handle: RawHandle,
    fields: DashMap<FieldDescriptor, Arc<ResolvedField>>,
    methods: DashMap<MethodDescriptor, Arc<ResolvedMethod>>,
    component: OnceCell<Arc<ResolvedClass>>,
}

impl ResolvedClass {
    fn new(ty: Type, handle: RawHandle) -> Self {
        Self {
            ty,
            handle,
            fields: DashMap::new(),
            methods: DashMap::new(),
            component: OnceCell::new(),
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The global class reference owned by the cache.
    pub fn handle(&self) -> ObjectHandle {
        // SAFETY: a global reference that is never deleted.
        unsafe { ObjectHandle::from_raw(self.handle.0) }
    }

    pub fn cached_field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn cached_method_count(&self) -> usize {
        self.methods.len()
    }

    /// Resolve a field, consulting the cache first. Static and instance
    /// fields use distinct lookup entry points.
    pub fn try_find_field(
        &self,
        env: &mut Env<'_>,
        descriptor: &FieldDescriptor,
    ) -> Option<Arc<ResolvedField>> {
        if let Some(field) = self.fields.get(descriptor) {
            return Some(field.value().clone());
        }
        let name = CString::new(descriptor.name()).ok()?;
        let sig = CString::new(descriptor.signature()).ok()?;
        let id = env
            .boundary()
            .get_field_id(self.handle.0, &name, &sig, descriptor.is_static());
        if id.is_null() {
            clear_pending(env);
            debug!(class = %self.ty, field = %descriptor, "field not found");
            return None;
        }
        debug!(class = %self.ty, field = %descriptor, "field cache miss");

        let field = Arc::new(ResolvedField {
            descriptor: descriptor.clone(),
            id: RawHandle(id),
            owner: self.handle,
        });
        let cached = match self.fields.entry(descriptor.clone()) {
            Entry::Occupied(entry) => {
                warn!(class = %self.ty, field = %descriptor, "lost field insertion race");
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(field).value().clone(),
        };
        Some(cached)
    }

    /// # Panics
    ///
    /// Panics if the field does not exist.
    #[track_caller]
    pub fn find_field(&self, env: &mut Env<'_>, descriptor: &FieldDescriptor) -> Arc<ResolvedField> {
        match self.try_find_field(env, descriptor) {
            Some(field) => field,
            None => panic!(
                "{} in {}",
                JniError::FieldNotFound {
                    name: descriptor.name().to_string(),
                    signature: descriptor.signature().to_string(),
                },
                self.ty
            ),
        }
    }

    /// Resolve a method, consulting the cache first. Static methods use the
    /// static lookup entry point.
    pub fn try_find_method(
        &self,
        env: &mut Env<'_>,
        descriptor: &MethodDescriptor,
    ) -> Option<Arc<ResolvedMethod>> {
        if let Some(method) = self.methods.get(descriptor) {
            return Some(method.value().clone());
        }
        let name = CString::new(descriptor.name()).ok()?;
        let sig = CString::new(descriptor.signature()).ok()?;
        let id = env
            .boundary()
            .get_method_id(self.handle.0, &name, &sig, descriptor.is_static());
        if id.is_null() {
            clear_pending(env);
            debug!(class = %self.ty, method = %descriptor, "method not found");
            return None;
        }
        debug!(class = %self.ty, method = %descriptor, "method cache miss");

        let method = Arc::new(ResolvedMethod {
            descriptor: descriptor.clone(),
            id: RawHandle(id),
            owner: self.handle,
        });
        let cached = match self.methods.entry(descriptor.clone()) {
            Entry::Occupied(entry) => {
                warn!(class = %self.ty, method = %descriptor, "lost method insertion race");
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(method).value().clone(),
        };
        Some(cached)
    }

    /// # Panics
    ///
    /// Panics if the method does not exist.
    #[track_caller]
    pub fn find_method(
        &self,
        env: &mut Env<'_>,
        descriptor: &MethodDescriptor,
    ) -> Arc<ResolvedMethod> {
        match self.try_find_method(env, descriptor) {
            Some(method) => method,
            None => panic!(
                "{} in {}",
                JniError::MethodNotFound {
                    name: descriptor.name().to_string(),
                    signature: descriptor.signature().to_string(),
                },
                self.ty
            ),
        }
    }
}

impl std::fmt::Debug for ResolvedClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedClass")
            .field("ty", &self.ty)
            .field("handle", &self.handle.0)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

// ============================================================================
// Resolved members
// ============================================================================

/// A field descriptor bound to its field ID and owning class.
#[derive(Debug)]
pub struct ResolvedField {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) id: RawHandle,
    pub(crate) owner: RawHandle,
}

impl ResolvedField {
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> jbridge_sys::jfieldID {
        self.id.0
    }

    /// Global reference to the declaring class.
    pub fn owner(&self) -> ObjectHandle {
        // SAFETY: the owner's global reference is never deleted.
        unsafe { ObjectHandle::from_raw(self.owner.0) }
    }
}

/// A method descriptor bound to its method ID and owning class.
#[derive(Debug)]
pub struct ResolvedMethod {
    pub(crate) descriptor: MethodDescriptor,
    pub(crate) id: RawHandle,
    pub(crate) owner: RawHandle,
}

impl ResolvedMethod {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> jbridge_sys::jmethodID {
        self.id.0
    }

    /// Global reference to the declaring class.
    pub fn owner(&self) -> ObjectHandle {
        // SAFETY: the owner's global reference is never deleted.
        unsafe { ObjectHandle::from_raw(self.owner.0) }
    }
}
