//! Native method registration and callback marshaling
//!
//! [`ResolvedClass::register_natives`] binds Rust functions to `native`
//! methods. The `#[native_method]` attribute generates the `extern "system"`
//! wrapper and the matching descriptor; the traits here tell it how each
//! Rust type crosses the boundary.

use std::ffi::{c_void, CString};
use std::panic::{self, AssertUnwindSafe};

use jbridge_sys::{
    jboolean, jbyte, jchar, jdouble, jfloat, jint, jlong, jobject, jshort, JNIEnv,
    JNINativeMethod, JNI_FALSE, JNI_OK, JNI_TRUE,
};
use tracing::{debug, error};

use crate::descriptor::{CallKind, MethodDescriptor};
use crate::dispatch::normalize_char;
use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::refs::{ObjectHandle, ObjectRef};
use crate::resolver::ResolvedClass;
use crate::types::{JavaType, Type};
use crate::vm::{callback_scope, panic_message};

/// Class thrown when a native method panics or returns an error.
pub const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";

// ============================================================================
// NativeMethod
// ============================================================================

/// A descriptor paired with the function implementing it.
#[derive(Debug, Clone)]
pub struct NativeMethod {
    descriptor: MethodDescriptor,
    fn_ptr: *mut c_void,
}

impl NativeMethod {
    /// # Safety
    ///
    /// `fn_ptr` must be an `extern "system"` function whose parameters are
    /// the environment, the receiver or class, and then the raw types of
    /// `descriptor`'s parameters, and whose return type matches.
    pub unsafe fn new(descriptor: MethodDescriptor, fn_ptr: *mut c_void) -> Self {
        Self { descriptor, fn_ptr }
    }

    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub fn fn_ptr(&self) -> *mut c_void {
        self.fn_ptr
    }
}

impl ResolvedClass {
    /// Bind one native method.
    ///
    /// # Safety
    ///
    /// See [`NativeMethod::new`].
    pub unsafe fn register_native(
        &self,
        env: &mut Env<'_>,
        descriptor: &MethodDescriptor,
        fn_ptr: *mut c_void,
    ) -> JniResult<()> {
        self.register_natives(env, &[NativeMethod::new(descriptor.clone(), fn_ptr)])
    }

    /// Bind several native methods in one call.
    pub fn register_natives(&self, env: &mut Env<'_>, methods: &[NativeMethod]) -> JniResult<()> {
        let mut names = Vec::with_capacity(methods.len());
        let mut signatures = Vec::with_capacity(methods.len());
        for method in methods {
            names.push(CString::new(method.descriptor.name())?);
            signatures.push(CString::new(method.descriptor.signature())?);
        }
        let table: Vec<JNINativeMethod> = methods
            .iter()
            .zip(names.iter().zip(&signatures))
            .map(|(method, (name, signature))| JNINativeMethod {
                name: name.as_ptr() as *mut _,
                signature: signature.as_ptr() as *mut _,
                fnPtr: method.fn_ptr,
            })
            .collect();

        let status = env.boundary().register_natives(self.handle().as_raw(), &table);
        if status != JNI_OK {
            crate::resolver::clear_pending(env);
            return Err(JniError::RegisterFailed {
                class: self.ty().to_string(),
                status,
            });
        }
        debug!(class = %self.ty(), count = methods.len(), "registered native methods");
        Ok(())
    }

    /// Unbind every native method of this class.
    pub fn unregister_natives(&self, env: &mut Env<'_>) -> JniResult<()> {
        let status = env.boundary().unregister_natives(self.handle().as_raw());
        if status != JNI_OK {
            return Err(JniError::RegisterFailed {
                class: self.ty().to_string(),
                status,
            });
        }
        debug!(class = %self.ty(), "unregistered native methods");
        Ok(())
    }
}

// ============================================================================
// Marshaling traits
// ============================================================================

/// A parameter type of a native method.
pub trait NativeArg: JavaType {
    /// Representation the runtime passes
    type Raw: Copy;

    /// # Safety
    ///
    /// `raw` must be a value the runtime passed for this parameter.
    unsafe fn from_raw(raw: Self::Raw) -> Self;
}

/// A return type of a native method.
pub trait NativeReturn {
    type Raw: Copy;

    fn java_type() -> Type;

    /// Returned when the body panicked.
    fn zero() -> Self::Raw;

    fn into_raw(self, env: &mut Env<'_>) -> Self::Raw;
}

macro_rules! native_scalar {
    ($($rust:ty => $raw:ty),* $(,)?) => {
        $(
            impl NativeArg for $rust {
                type Raw = $raw;

                unsafe fn from_raw(raw: $raw) -> Self {
                    raw
                }
            }

            impl NativeReturn for $rust {
                type Raw = $raw;

                fn java_type() -> Type {
                    <$rust as JavaType>::java_type()
                }

                fn zero() -> $raw {
                    <$raw>::default()
                }

                fn into_raw(self, _env: &mut Env<'_>) -> $raw {
                    self
                }
            }
        )*
    };
}

native_scalar! {
    i8 => jbyte,
    i16 => jshort,
    i32 => jint,
    i64 => jlong,
    f32 => jfloat,
    f64 => jdouble,
}

impl NativeArg for bool {
    type Raw = jboolean;

    unsafe fn from_raw(raw: jboolean) -> Self {
        raw != JNI_FALSE
    }
}

impl NativeReturn for bool {
    type Raw = jboolean;

    fn java_type() -> Type {
        Type::BOOLEAN
    }

    fn zero() -> jboolean {
        JNI_FALSE
    }

    fn into_raw(self, _env: &mut Env<'_>) -> jboolean {
        if self {
            JNI_TRUE
        } else {
            JNI_FALSE
        }
    }
}

impl NativeArg for char {
    type Raw = jchar;

    unsafe fn from_raw(raw: jchar) -> Self {
        normalize_char(raw)
    }
}

impl NativeReturn for char {
    type Raw = jchar;

    fn java_type() -> Type {
        Type::CHAR
    }

    fn zero() -> jchar {
        0
    }

    /// Characters outside the BMP become U+FFFD.
    fn into_raw(self, _env: &mut Env<'_>) -> jchar {
        u16::try_from(u32::from(self)).unwrap_or(0xFFFD)
    }
}

impl NativeArg for ObjectHandle {
    type Raw = jobject;

    unsafe fn from_raw(raw: jobject) -> Self {
        ObjectHandle::from_raw(raw)
    }
}

impl NativeReturn for ObjectHandle {
    type Raw = jobject;

    fn java_type() -> Type {
        Type::object()
    }

    fn zero() -> jobject {
        std::ptr::null_mut()
    }

    fn into_raw(self, _env: &mut Env<'_>) -> jobject {
        self.as_raw()
    }
}

/// Returning an `ObjectRef` hands its reference to the caller.
impl NativeReturn for ObjectRef {
    type Raw = jobject;

    fn java_type() -> Type {
        Type::object()
    }

    fn zero() -> jobject {
        std::ptr::null_mut()
    }

    fn into_raw(self, _env: &mut Env<'_>) -> jobject {
        ObjectRef::into_raw(self)
    }
}

impl NativeReturn for () {
    type Raw = ();

    fn java_type() -> Type {
        Type::VOID
    }

    fn zero() {}

    fn into_raw(self, _env: &mut Env<'_>) {}
}

/// An error becomes a `RuntimeException` unless an exception is already
/// pending, which then propagates as is.
impl<T: NativeReturn> NativeReturn for JniResult<T> {
    type Raw = T::Raw;

    fn java_type() -> Type {
        T::java_type()
    }

    fn zero() -> T::Raw {
        T::zero()
    }

    fn into_raw(self, env: &mut Env<'_>) -> T::Raw {
        match self {
            Ok(value) => value.into_raw(env),
            Err(JniError::JavaException) if env.exception_check() => T::zero(),
            Err(e) => {
                throw_runtime_exception(env, &e.to_string());
                T::zero()
            }
        }
    }
}

// ============================================================================
// Declared signatures
// ============================================================================

/// Descriptor for a native method declared with an explicit signature, such
/// as `(Ljava/lang/String;)Ljava/lang/String;` where the Rust function only
/// sees `ObjectHandle`.
///
/// `rust_params` and `rust_return` are the types the Rust signature maps
/// to. Primitives must agree exactly. Any declared class or array type is
/// accepted where the Rust side takes a reference.
pub fn descriptor_with_signature(
    name: &str,
    signature: &str,
    call_kind: CallKind,
    rust_params: &[Type],
    rust_return: Type,
) -> JniResult<MethodDescriptor> {
    let descriptor = MethodDescriptor::parse(name, signature, call_kind)?;
    let declared = descriptor.parameter_types();
    if declared.len() != rust_params.len() {
        return Err(JniError::InvalidDescriptor(format!(
            "{}{} declares {} parameters, the Rust function takes {}",
            name,
            signature,
            declared.len(),
            rust_params.len()
        )));
    }
    for (index, (declared, rust)) in declared.iter().zip(rust_params).enumerate() {
        if !compatible(declared, rust) {
            return Err(JniError::InvalidDescriptor(format!(
                "{}{} declares parameter {} as {}, the Rust function takes {}",
                name, signature, index, declared, rust
            )));
        }
    }
    if !compatible(descriptor.return_type(), &rust_return) {
        return Err(JniError::InvalidDescriptor(format!(
            "{}{} returns {}, the Rust function returns {}",
            name,
            signature,
            descriptor.return_type(),
            rust_return
        )));
    }
    Ok(descriptor)
}

fn compatible(declared: &Type, rust: &Type) -> bool {
    if declared.is_reference() && rust.is_reference() {
        true
    } else {
        declared == rust
    }
}

fn throw_runtime_exception(env: &mut Env<'_>, message: &str) {
    if env.exception_check() {
        env.exception_clear();
    }
    if let Err(e) = env.throw_new(RUNTIME_EXCEPTION, message) {
        error!(error = %e, message, "could not raise exception from native method");
    }
}

/// Entry point used by generated native wrappers.
///
/// Runs `body` with the callback's environment. A panic is rethrown as a
/// `RuntimeException` and the zero value is returned.
///
/// # Safety
///
/// `raw` must be the environment pointer of the current native call.
#[doc(hidden)]
pub unsafe fn dispatch_native<R: NativeReturn>(
    raw: *mut JNIEnv,
    name: &'static str,
    body: impl FnOnce(&mut Env<'_>) -> R,
) -> R::Raw {
    let outcome = callback_scope(raw, |env| {
        match panic::catch_unwind(AssertUnwindSafe(|| body(env))) {
            Ok(value) => value.into_raw(env),
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(method = name, panic = %message, "native method panicked");
                throw_runtime_exception(env, &format!("{} panicked: {}", name, message));
                R::zero()
            }
        }
    });
    outcome.unwrap_or_else(R::zero)
}
