// jbridge-native: attribute macros for native libraries built on jbridge
//
// Provides proc-macros for generating boundary entry points:
// - #[native_method] - Wraps a Rust function as an extern "system" native method
// - #[on_load] - Exports JNI_OnLoad / JNI_OnUnload around an initializer
//
// Example:
// ```
// use jbridge::{native_method, on_load, Env, JniResult, ObjectHandle};
//
// #[native_method(static_method)]
// fn add(env: &mut Env<'_>, class: ObjectHandle, a: i32, b: i32) -> i32 {
//     a + b
// }
//
// #[on_load]
// fn init(env: &mut Env<'_>) -> JniResult<()> {
//     Ok(())
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn};

mod load;
mod method;

/// Marks a Rust function as the implementation of a native method.
///
/// The first parameter receives the environment (`&mut Env<'_>`) and the
/// second the receiver, or the class for `static_method`. Every later
/// parameter and the return type must implement `NativeArg` and
/// `NativeReturn`.
///
/// Generates:
/// - `<name>_native`: the `extern "system"` entry point. A panic in the body
///   is rethrown as `java.lang.RuntimeException` and the zero value returned.
/// - `<name>_descriptor()`: the `MethodDescriptor` matching the signature
/// - `<name>_native_method()`: both, ready for `register_natives`
///
/// Object parameters and results derive as `java.lang.Object`. Pass
/// `signature = "..."` to register the declared types instead; the
/// descriptor function then fails if the signature disagrees with the Rust
/// parameter count or primitive types.
///
/// # Example
///
/// ```ignore
/// #[native_method(name = "length", static_method)]
/// fn string_length(env: &mut Env<'_>, class: ObjectHandle, s: ObjectHandle) -> JniResult<i32> {
///     jbridge::string_length(env, s).map(|n| n as i32)
/// }
/// ```
#[proc_macro_attribute]
pub fn native_method(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    method::NativeMethodArgs::parse(attr.into())
        .and_then(|args| method::expand_native_method(args, input))
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Exports `JNI_OnLoad` and `JNI_OnUnload` for this library.
///
/// Must be applied to a function taking `&mut Env<'_>` and returning
/// `JniResult<()>`. `JNI_OnLoad` registers the VM, runs the function and
/// returns the configured interface version, or `JNI_ERR` if the function
/// fails. `JNI_OnUnload` runs the callbacks registered with
/// `jbridge::vm::on_teardown`.
///
/// # Example
///
/// ```ignore
/// #[on_load]
/// fn init(env: &mut Env<'_>) -> JniResult<()> {
///     let class = Resolver::shared().find_class(env, &Type::class("com.example.Math"));
///     class.register_natives(env, &[add_native_method()?])
/// }
/// ```
#[proc_macro_attribute]
pub fn on_load(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    load::expand_on_load(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
