//! Object handles and owning references
//!
//! [`ObjectHandle`] is a borrowed, possibly-null view of a managed object.
//! [`ObjectRef`] owns one global, local or weak reference and must be given
//! back with [`ObjectRef::delete`]. `delete` consumes the value, so a second
//! delete of the same reference does not compile:
//!
//! ```compile_fail
//! use jbridge::{Env, ObjectRef};
//!
//! fn release_twice(env: &mut Env<'_>, r: ObjectRef) {
//!     r.delete(env);
//!     r.delete(env);
//! }
//! ```

use std::mem::ManuallyDrop;
use std::ptr;
use std::sync::Arc;

use jbridge_sys::jobject;
use tracing::{debug, warn};

use crate::descriptor::MethodDescriptor;
use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::resolver::{ResolvedClass, Resolver};
use crate::string::read_string;
use crate::types::{JavaType, Type};

// ============================================================================
// ObjectHandle
// ============================================================================

/// Non-owning, possibly-null handle to a managed object.
///
/// Handles carry no lifetime of their own; they stay valid for as long as
/// whatever reference backs them does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectHandle(jobject);

impl ObjectHandle {
    pub const NULL: ObjectHandle = ObjectHandle(ptr::null_mut());

    /// # Safety
    ///
    /// `raw` must be null or a reference the runtime handed out that is
    /// still live.
    pub unsafe fn from_raw(raw: jobject) -> Self {
        ObjectHandle(raw)
    }

    pub fn as_raw(self) -> jobject {
        self.0
    }

    /// The only validity predicate there is.
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    pub fn is_instance_of(self, env: &mut Env<'_>, class: &ResolvedClass) -> bool {
        env.boundary().is_instance_of(self.0, class.handle().as_raw())
    }

    /// Identity comparison performed by the runtime.
    pub fn is_same(self, env: &mut Env<'_>, other: ObjectHandle) -> bool {
        env.boundary().is_same_object(self.0, other.0)
    }

    /// The object's runtime class, canonicalized through the shared
    /// resolver. `None` for null.
    pub fn class_of(self, env: &mut Env<'_>) -> Option<Arc<ResolvedClass>> {
        Resolver::shared().class_of(env, self)
    }

    /// The object's `toString()`, resolved through the shared resolver.
    /// A null handle, or a null result, reads as `"null"`.
    pub fn to_string(self, env: &mut Env<'_>) -> JniResult<String> {
        self.to_string_in(env, Resolver::shared())
    }

    /// [`to_string`](Self::to_string) against a specific resolver.
    pub fn to_string_in(self, env: &mut Env<'_>, resolver: &Resolver) -> JniResult<String> {
        if self.is_null() {
            return Ok("null".to_string());
        }
        let object = resolver
            .try_find_class(env, &Type::object())
            .ok_or_else(|| JniError::ClassNotFound(Type::object().to_string()))?;
        let descriptor = MethodDescriptor::builder()
            .name("toString")
            .returns(Type::string())
            .build()?;
        let method = object
            .try_find_method(env, &descriptor)
            .ok_or_else(|| JniError::MethodNotFound {
                name: descriptor.name().to_string(),
                signature: descriptor.signature().to_string(),
            })?;

        let text = method.call_object(env, Some(self), |_| {})?;
        if text.is_null() {
            return Ok("null".to_string());
        }
        let result = read_string(env, text);
        env.boundary().delete_local_ref(text.as_raw());
        result
    }

    /// `Some(self)` if the object is an instance of `class`. Null casts to
    /// null.
    pub fn cast(self, env: &mut Env<'_>, class: &ResolvedClass) -> Option<ObjectHandle> {
        if self.is_null() || self.is_instance_of(env, class) {
            Some(self)
        } else {
            None
        }
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        ObjectHandle::NULL
    }
}

impl JavaType for ObjectHandle {
    fn java_type() -> Type {
        Type::object()
    }
}

// ============================================================================
// ObjectRef
// ============================================================================

/// Kind of an owning reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Global,
    Local,
    Weak,
}

/// An owned reference with exactly one deletion obligation.
///
/// Dropping an `ObjectRef` without calling [`delete`](Self::delete) leaks
/// the reference and logs a warning.
#[must_use = "an ObjectRef must be released with `delete`"]
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectRef {
    kind: RefKind,
    handle: ObjectHandle,
}

impl ObjectRef {
    /// Create a new reference of `kind` to `handle`.
    ///
    /// Returns `None` for a null handle, a weak referent that has been
    /// collected, or reference-table exhaustion.
    pub fn promote(env: &mut Env<'_>, handle: ObjectHandle, kind: RefKind) -> Option<ObjectRef> {
        if handle.is_null() {
            return None;
        }
        let boundary = env.boundary();
        let raw = match kind {
            RefKind::Global => boundary.new_global_ref(handle.0),
            RefKind::Local => boundary.new_local_ref(handle.0),
            RefKind::Weak => boundary.new_weak_global_ref(handle.0),
        };
        if raw.is_null() {
            debug!(?kind, "reference creation returned null");
            return None;
        }
        Some(ObjectRef {
            kind,
            handle: ObjectHandle(raw),
        })
    }

    /// Take ownership of a reference the runtime already created.
    ///
    /// # Safety
    ///
    /// `raw` must be a live reference of `kind` that nothing else will
    /// delete.
    pub unsafe fn from_raw(kind: RefKind, raw: jobject) -> Option<ObjectRef> {
        if raw.is_null() {
            return None;
        }
        Some(ObjectRef {
            kind,
            handle: ObjectHandle(raw),
        })
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// Borrowed handle. For weak references the referent may already be
    /// gone; promote to `Global` or `Local` before use.
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Release the reference. Consumes `self`.
    pub fn delete(self, env: &mut Env<'_>) {
        let this = ManuallyDrop::new(self);
        let boundary = env.boundary();
        match this.kind {
            RefKind::Global => boundary.delete_global_ref(this.handle.0),
            RefKind::Local => boundary.delete_local_ref(this.handle.0),
            RefKind::Weak => boundary.delete_weak_global_ref(this.handle.0),
        }
    }

    /// Give up ownership without deleting, e.g. to return a local
    /// reference from a native method.
    pub fn into_raw(self) -> jobject {
        let this = ManuallyDrop::new(self);
        this.handle.0
    }

    /// Wrap a global or weak reference for use from other threads.
    pub fn into_shared(self) -> Result<SharedRef, ObjectRef> {
        match self.kind {
            RefKind::Global | RefKind::Weak => Ok(SharedRef(self)),
            RefKind::Local => Err(self),
        }
    }
}

impl Drop for ObjectRef {
    fn drop(&mut self) {
        warn!(kind = ?self.kind, handle = ?self.handle.0, "ObjectRef dropped without delete; reference leaked");
    }
}

// ============================================================================
// SharedRef
// ============================================================================

/// A global or weak [`ObjectRef`] that may cross threads.
#[must_use = "a SharedRef must be released with `delete`"]
#[derive(Debug)]
pub struct SharedRef(ObjectRef);

// SAFETY: global and weak references are valid on every attached thread.
unsafe impl Send for SharedRef {}
unsafe impl Sync for SharedRef {}

impl SharedRef {
    pub fn kind(&self) -> RefKind {
        self.0.kind
    }

    pub fn handle(&self) -> ObjectHandle {
        self.0.handle
    }

    pub fn delete(self, env: &mut Env<'_>) {
        self.0.delete(env)
    }

    pub fn into_inner(self) -> ObjectRef {
        self.0
    }
}
