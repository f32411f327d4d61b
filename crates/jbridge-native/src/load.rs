// #[on_load] proc-macro implementation
//
// Generates the library's JNI_OnLoad and JNI_OnUnload exports.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ItemFn, Result};

/// Expands the #[on_load] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[on_load]
/// fn init(env: &mut Env<'_>) -> JniResult<()> {
///     register(env)
/// }
///
/// // Output:
/// fn init(env: &mut Env<'_>) -> JniResult<()> {
///     register(env)
/// }
///
/// #[no_mangle]
/// pub unsafe extern "system" fn JNI_OnLoad(vm: *mut JavaVM, _: *mut c_void) -> jint {
///     jbridge::vm::on_load_with(vm, init)
/// }
///
/// #[no_mangle]
/// pub unsafe extern "system" fn JNI_OnUnload(vm: *mut JavaVM, _: *mut c_void) {
///     jbridge::vm::on_unload(vm)
/// }
/// ```
pub fn expand_on_load(func: ItemFn) -> Result<TokenStream> {
    let sig = &func.sig;
    let func_name = &sig.ident;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "Load initializer cannot be async",
        ));
    }

    if sig.inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "Load initializer must take exactly one parameter: the environment",
        ));
    }

    if matches!(sig.output, syn::ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            sig,
            "Load initializer must return JniResult<()>",
        ));
    }

    let expanded = quote! {
        #func

        /// Called by the runtime when this library is loaded.
        #[no_mangle]
        #[allow(non_snake_case, unused_unsafe, clippy::missing_safety_doc)]
        pub unsafe extern "system" fn JNI_OnLoad(
            vm: *mut ::jbridge::sys::JavaVM,
            _reserved: *mut ::std::ffi::c_void,
        ) -> ::jbridge::sys::jint {
            unsafe { ::jbridge::vm::on_load_with(vm, #func_name) }
        }

        /// Called by the runtime when this library's class loader is
        /// collected.
        #[no_mangle]
        #[allow(non_snake_case, unused_unsafe, clippy::missing_safety_doc)]
        pub unsafe extern "system" fn JNI_OnUnload(
            vm: *mut ::jbridge::sys::JavaVM,
            _reserved: *mut ::std::ffi::c_void,
        ) {
            unsafe { ::jbridge::vm::on_unload(vm) }
        }
    };

    Ok(expanded)
}
