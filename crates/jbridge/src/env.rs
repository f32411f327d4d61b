//! The environment context handed to every boundary operation

use std::ffi::CString;
use std::marker::PhantomData;

use crate::boundary::Boundary;
use crate::error::{JniError, JniResult};
use crate::refs::ObjectHandle;
use crate::string::to_modified_utf8;
use crate::vm;

/// Scope-bound access to one thread's environment.
///
/// An `Env` exclusively borrows its [`Boundary`] and is neither `Send` nor
/// `Sync`, so it cannot leave the thread or scope that created it. Obtain
/// one from [`vm::with_env`], an attach guard, or a native-method callback.
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<jbridge::Env<'static>>();
/// ```
pub struct Env<'a> {
    boundary: &'a mut dyn Boundary,
    _not_send: PhantomData<*mut ()>,
}

impl<'a> Env<'a> {
    /// Wrap a boundary for the duration of a borrow.
    pub fn new(boundary: &'a mut dyn Boundary) -> Self {
        Self {
            boundary,
            _not_send: PhantomData,
        }
    }

    /// Direct access to the raw entry points.
    pub fn boundary(&mut self) -> &mut (dyn Boundary + 'a) {
        self.boundary
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    pub fn exception_check(&mut self) -> bool {
        self.boundary.exception_check()
    }

    pub fn exception_clear(&mut self) {
        self.boundary.exception_clear()
    }

    pub fn exception_describe(&mut self) {
        self.boundary.exception_describe()
    }

    /// Clear and return the pending throwable as a local handle.
    pub fn take_exception(&mut self) -> Option<ObjectHandle> {
        if !self.boundary.exception_check() {
            return None;
        }
        let throwable = self.boundary.exception_occurred();
        self.boundary.exception_clear();
        // SAFETY: the runtime just returned this handle.
        let handle = unsafe { ObjectHandle::from_raw(throwable) };
        (!handle.is_null()).then_some(handle)
    }

    /// `Err(JavaException)` if an exception is pending. The exception stays
    /// pending so it propagates if the native frame returns.
    pub fn check_exception(&mut self) -> JniResult<()> {
        if self.boundary.exception_check() {
            if vm::config().describe_exceptions {
                self.boundary.exception_describe();
            }
            Err(JniError::JavaException)
        } else {
            Ok(())
        }
    }

    /// Raise a new exception of class `class_name` (internal or dotted name).
    /// Both strings cross the boundary as modified UTF-8.
    pub fn throw_new(&mut self, class_name: &str, message: &str) -> JniResult<()> {
        let name = CString::new(to_modified_utf8(&class_name.replace('.', "/")))?;
        let message = CString::new(to_modified_utf8(message))?;
        let class = self.boundary.find_class(&name);
        if class.is_null() {
            self.boundary.exception_clear();
            return Err(JniError::ClassNotFound(class_name.to_string()));
        }
        let status = self.boundary.throw_new(class, &message);
        self.boundary.delete_local_ref(class);
        if status == jbridge_sys::JNI_OK {
            Ok(())
        } else {
            Err(JniError::Other(format!("ThrowNew failed with status {}", status)))
        }
    }
}

impl std::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}
