//! jbridge: typed bindings to a managed runtime through its native ABI
//!
//! This crate provides:
//! - A type and descriptor model that synthesizes and parses signatures
//! - A caching resolver for classes, fields and methods
//! - Typed method dispatch over the static, virtual and non-virtual families
//! - Owning references with a single, statically enforced delete
//! - Array access by element or through a scoped critical-section pin
//! - Thread attachment, load/unload hooks and native registration
//! - `toString` and `java.lang.Runtime` queries on top of the above
//!
//! # Example
//!
//! ```no_run
//! use jbridge::{vm, CallKind, MethodDescriptor, Resolver, Type};
//!
//! # fn main() -> jbridge::JniResult<()> {
//! let abs = MethodDescriptor::builder()
//!     .name("abs")
//!     .returns(Type::INT)
//!     .param(Type::INT)
//!     .call_kind(CallKind::Static)
//!     .build()?;
//!
//! let result = vm::with_env(|env| {
//!     let math = Resolver::shared().find_class(env, &Type::class("java.lang.Math"));
//!     let method = math.find_method(env, &abs);
//!     method.call_int(env, None, |args| {
//!         args.put(-7);
//!     })
//! })??;
//! assert_eq!(result, 7);
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]

pub mod array;
pub mod boundary;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod invocation;
pub mod jni_env;
pub mod native;
pub mod refs;
pub mod resolver;
pub mod runtime;
pub mod string;
pub mod types;
pub mod vm;

pub use jbridge_sys as sys;

pub use array::{ArrayElement, ObjectArray, PinGuard, PrimitiveArray};
pub use boundary::Boundary;
pub use config::JniConfig;
pub use descriptor::{
    parse_method_signature, CallKind, FieldDescriptor, FieldDescriptorBuilder, MethodDescriptor,
    MethodDescriptorBuilder,
};
pub use dispatch::{ArgumentBuffer, Value};
pub use env::Env;
pub use error::{JniError, JniResult};
pub use invocation::{AbortHook, ExitHook, VmOptions};
pub use jni_env::JniEnv;
pub use native::{NativeArg, NativeMethod, NativeReturn};
pub use refs::{ObjectHandle, ObjectRef, RefKind, SharedRef};
pub use resolver::{ResolvedClass, ResolvedField, ResolvedMethod, Resolver};
pub use runtime::ManagedRuntime;
pub use string::{new_string, read_string, string_length};
pub use types::{ArrayType, ClassType, JavaType, PrimitiveKind, ReturnKind, Type};
pub use vm::{AttachGuard, JavaVm};

#[cfg(feature = "macros")]
pub use jbridge_native::{native_method, on_load};
