// #[native_method] proc-macro implementation
//
// Generates the extern "system" wrapper and descriptor for a native method.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::Parser;
use syn::{ItemFn, LitStr, Result};

/// Arguments of `#[native_method(...)]`.
#[derive(Debug, Default)]
pub struct NativeMethodArgs {
    /// Runtime-side method name; defaults to the Rust function name
    pub name: Option<LitStr>,
    /// Register as a static method
    pub is_static: bool,
    /// Declared signature; defaults to one derived from the Rust types
    pub signature: Option<LitStr>,
}

impl NativeMethodArgs {
    pub fn parse(attr: TokenStream) -> Result<Self> {
        let mut args = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("name") {
                args.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("static_method") {
                args.is_static = true;
                Ok(())
            } else if meta.path.is_ident("signature") {
                args.signature = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(
                    "expected `name = \"...\"`, `signature = \"...\"` or `static_method`",
                ))
            }
        });
        parser.parse2(attr)?;
        Ok(args)
    }
}

/// Expands the #[native_method] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[native_method(static_method)]
/// fn add(env: &mut Env<'_>, class: ObjectHandle, a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// // Output (abridged):
/// fn add(...) -> i32 { a + b }
///
/// pub unsafe extern "system" fn add_native(
///     env: *mut JNIEnv,
///     class: jobject,
///     a: jint,
///     b: jint,
/// ) -> jint { /* dispatch_native(...) */ }
///
/// pub fn add_descriptor() -> JniResult<MethodDescriptor> { /* (II)I */ }
/// pub fn add_native_method() -> JniResult<NativeMethod> { ... }
/// ```
pub fn expand_native_method(args: NativeMethodArgs, func: ItemFn) -> Result<TokenStream> {
    let sig = &func.sig;
    let func_name = &sig.ident;
    let vis = &func.vis;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "native methods cannot be async",
        ));
    }
    if sig.generics.type_params().next().is_some() || sig.generics.const_params().next().is_some()
    {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "native methods cannot be generic",
        ));
    }

    let mut names = Vec::new();
    let mut types = Vec::new();
    for arg in &sig.inputs {
        match arg {
            syn::FnArg::Typed(pat_type) => {
                if let syn::Pat::Ident(pat_ident) = &*pat_type.pat {
                    names.push(pat_ident.ident.clone());
                    types.push((*pat_type.ty).clone());
                } else {
                    return Err(syn::Error::new_spanned(
                        arg,
                        "Only simple identifiers are supported as arguments",
                    ));
                }
            }
            syn::FnArg::Receiver(_) => {
                return Err(syn::Error::new_spanned(
                    arg,
                    "Methods (self) are not supported in #[native_method]",
                ));
            }
        }
    }

    if names.len() < 2 {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "a native method takes the environment and the receiver (or class) first",
        ));
    }

    // The environment is supplied by the wrapper; the rest arrive raw.
    let raw_names = &names[1..];
    let raw_types = &types[1..];
    let param_types = &types[2..];

    let ret = match &sig.output {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => quote! { #ty },
    };

    let java_name = match &args.name {
        Some(name) => name.value(),
        None => func_name.to_string(),
    };
    let call_kind = if args.is_static {
        quote! { ::jbridge::CallKind::Static }
    } else {
        quote! { ::jbridge::CallKind::Virtual }
    };

    let descriptor_body = match &args.signature {
        Some(signature) => quote! {
            ::jbridge::native::descriptor_with_signature(
                #java_name,
                #signature,
                #call_kind,
                &[ #( <#param_types as ::jbridge::JavaType>::java_type() ),* ],
                <#ret as ::jbridge::native::NativeReturn>::java_type(),
            )
        },
        None => quote! {
            ::jbridge::MethodDescriptor::builder()
                .name(#java_name)
                .returns(<#ret as ::jbridge::native::NativeReturn>::java_type())
                #( .param(<#param_types as ::jbridge::JavaType>::java_type()) )*
                .call_kind(#call_kind)
                .build()
        },
    };

    let native_name = format_ident!("{}_native", func_name);
    let descriptor_name = format_ident!("{}_descriptor", func_name);
    let method_name = format_ident!("{}_native_method", func_name);

    let expanded = quote! {
        #func

        #[allow(non_snake_case, unused_unsafe, clippy::missing_safety_doc)]
        #vis unsafe extern "system" fn #native_name(
            __jbridge_env: *mut ::jbridge::sys::JNIEnv,
            #( #raw_names: <#raw_types as ::jbridge::native::NativeArg>::Raw ),*
        ) -> <#ret as ::jbridge::native::NativeReturn>::Raw {
            unsafe {
                ::jbridge::native::dispatch_native::<#ret>(
                    __jbridge_env,
                    #java_name,
                    move |__jbridge_scope| {
                        #(
                            let #raw_names = unsafe {
                                <#raw_types as ::jbridge::native::NativeArg>::from_raw(#raw_names)
                            };
                        )*
                        #func_name(__jbridge_scope, #(#raw_names),*)
                    },
                )
            }
        }

        /// Descriptor registered for this method.
        #vis fn #descriptor_name() -> ::jbridge::JniResult<::jbridge::MethodDescriptor> {
            #descriptor_body
        }

        /// Descriptor and wrapper, ready for `register_natives`.
        #vis fn #method_name() -> ::jbridge::JniResult<::jbridge::NativeMethod> {
            let descriptor = #descriptor_name()?;
            // SAFETY: the wrapper was generated from the same signature.
            Ok(unsafe {
                ::jbridge::NativeMethod::new(descriptor, #native_name as *mut ::std::ffi::c_void)
            })
        }
    };

    Ok(expanded)
}
