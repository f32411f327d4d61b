//! Boundary trait: the raw entry points the binding layer calls
//!
//! Everything above this module talks to the runtime only through
//! [`Boundary`]. [`JniEnv`](crate::JniEnv) implements it over the real
//! function table; tests implement it with a recording fake.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;

use jbridge_sys::{
    jarray, jclass, jfieldID, jint, jmethodID, jobject, jsize, jstring, jthrowable, jvalue,
    JNINativeMethod, JavaVM,
};

use crate::types::{PrimitiveKind, ReturnKind};

/// Raw per-thread entry points.
///
/// Handles are passed through unchanged; a null handle means "not found" or
/// "failed" exactly as the runtime reports it. All methods take `&mut self`:
/// an environment is used by one caller at a time.
pub trait Boundary {
    // ========================================================================
    // Classes and objects
    // ========================================================================

    /// Look up a class by internal name. Returns a local reference.
    fn find_class(&mut self, name: &CStr) -> jclass;

    /// Class of an object. Returns a local reference.
    fn get_object_class(&mut self, obj: jobject) -> jclass;

    fn is_instance_of(&mut self, obj: jobject, class: jclass) -> bool;

    fn is_same_object(&mut self, a: jobject, b: jobject) -> bool;

    // ========================================================================
    // Member lookup
    // ========================================================================

    fn get_field_id(&mut self, class: jclass, name: &CStr, sig: &CStr, is_static: bool)
        -> jfieldID;

    fn get_method_id(
        &mut self,
        class: jclass,
        name: &CStr,
        sig: &CStr,
        is_static: bool,
    ) -> jmethodID;

    // ========================================================================
    // Calls
    // ========================================================================

    /// Virtual call family. `ret` selects the return-type entry point.
    fn call_method(
        &mut self,
        obj: jobject,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue;

    /// Non-virtual call family: `class`'s implementation on `obj`.
    fn call_nonvirtual_method(
        &mut self,
        obj: jobject,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue;

    /// Static call family.
    fn call_static_method(
        &mut self,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue;

    /// Allocate and run a constructor. Returns a local reference.
    fn new_object(&mut self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> jobject;

    // ========================================================================
    // Fields (`kind` is never `Void`)
    // ========================================================================

    fn get_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind) -> jvalue;

    fn set_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind, value: jvalue);

    fn get_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind) -> jvalue;

    fn set_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind, value: jvalue);

    // ========================================================================
    // References
    // ========================================================================

    fn new_global_ref(&mut self, obj: jobject) -> jobject;
    fn delete_global_ref(&mut self, obj: jobject);
    fn new_local_ref(&mut self, obj: jobject) -> jobject;
    fn delete_local_ref(&mut self, obj: jobject);
    fn new_weak_global_ref(&mut self, obj: jobject) -> jobject;
    fn delete_weak_global_ref(&mut self, obj: jobject);

    // ========================================================================
    // Strings
    // ========================================================================

    /// Create a string from modified UTF-8.
    fn new_string_utf(&mut self, utf: &CStr) -> jstring;

    /// Borrow a string's modified UTF-8 bytes. Must be released.
    fn get_string_utf_chars(&mut self, s: jstring) -> *const c_char;

    fn release_string_utf_chars(&mut self, s: jstring, chars: *const c_char);

    /// Length in UTF-16 code units.
    fn get_string_length(&mut self, s: jstring) -> jsize;

    // ========================================================================
    // Arrays
    // ========================================================================

    fn get_array_length(&mut self, array: jarray) -> jsize;

    /// `kind` is never `Void`.
    fn new_primitive_array(&mut self, kind: PrimitiveKind, len: jsize) -> jarray;

    fn new_object_array(&mut self, len: jsize, element_class: jclass, init: jobject) -> jarray;

    fn get_object_array_element(&mut self, array: jarray, index: jsize) -> jobject;

    fn set_object_array_element(&mut self, array: jarray, index: jsize, value: jobject);

    /// Enter a critical section over the array's storage.
    fn get_primitive_array_critical(&mut self, array: jarray) -> *mut c_void;

    /// Leave the critical section entered by the matching pin.
    fn release_primitive_array_critical(&mut self, array: jarray, elems: *mut c_void, mode: jint);

    // ========================================================================
    // Native methods
    // ========================================================================

    fn register_natives(&mut self, class: jclass, methods: &[JNINativeMethod]) -> jint;

    fn unregister_natives(&mut self, class: jclass) -> jint;

    // ========================================================================
    // Exceptions
    // ========================================================================

    fn exception_check(&mut self) -> bool;

    /// Pending throwable as a local reference, or null.
    fn exception_occurred(&mut self) -> jthrowable;

    fn exception_describe(&mut self);

    fn exception_clear(&mut self);

    fn throw_new(&mut self, class: jclass, message: &CStr) -> jint;

    // ========================================================================
    // VM
    // ========================================================================

    /// The VM this environment belongs to, or null.
    fn get_java_vm(&mut self) -> *mut JavaVM;
}
