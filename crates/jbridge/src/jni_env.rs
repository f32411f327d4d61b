//! [`Boundary`] over the runtime's real function table

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use jbridge_sys::{
    jarray, jclass, jfieldID, jint, jmethodID, jobject, jsize, jstring, jthrowable, jvalue,
    JNIEnv, JNINativeInterface_, JNINativeMethod, JavaVM, JNI_FALSE, JNI_OK,
};

use crate::boundary::Boundary;
use crate::types::{PrimitiveKind, ReturnKind};

/// A raw environment pointer for the current thread.
///
/// Not `Send`: the pointer is only meaningful on the thread the runtime
/// handed it to.
#[derive(Debug)]
pub struct JniEnv {
    raw: NonNull<JNIEnv>,
}

impl JniEnv {
    /// Wrap a raw environment pointer. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// `raw` must point at a valid environment for the calling thread and
    /// stay valid for as long as the returned value is used.
    pub unsafe fn from_raw(raw: *mut JNIEnv) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    pub fn as_raw(&self) -> *mut JNIEnv {
        self.raw.as_ptr()
    }

    fn table(&self) -> &JNINativeInterface_ {
        // SAFETY: from_raw's contract guarantees a live table.
        unsafe { &**self.raw.as_ptr() }
    }
}

#[cold]
#[inline(never)]
fn missing_entry(name: &'static str) -> ! {
    panic!("function table has no entry for {}", name)
}

#[cold]
#[inline(never)]
fn void_value() -> ! {
    panic!("void is not a value type")
}

/// Call a function-table slot with the environment pointer prepended.
macro_rules! call {
    ($self:ident . $slot:ident ( $($arg:expr),* $(,)? )) => {{
        let f = match $self.table().$slot {
            Some(f) => f,
            None => missing_entry(stringify!($slot)),
        };
        // SAFETY: the table belongs to this thread's environment and the
        // arguments follow the slot's ABI signature.
        unsafe { f($self.raw.as_ptr() $(, $arg)*) }
    }};
}

impl Boundary for JniEnv {
    fn find_class(&mut self, name: &CStr) -> jclass {
        call!(self.FindClass(name.as_ptr()))
    }

    fn get_object_class(&mut self, obj: jobject) -> jclass {
        call!(self.GetObjectClass(obj))
    }

    fn is_instance_of(&mut self, obj: jobject, class: jclass) -> bool {
        call!(self.IsInstanceOf(obj, class)) != JNI_FALSE
    }

    fn is_same_object(&mut self, a: jobject, b: jobject) -> bool {
        call!(self.IsSameObject(a, b)) != JNI_FALSE
    }

    fn get_field_id(
        &mut self,
        class: jclass,
        name: &CStr,
        sig: &CStr,
        is_static: bool,
    ) -> jfieldID {
        if is_static {
            call!(self.GetStaticFieldID(class, name.as_ptr(), sig.as_ptr()))
        } else {
            call!(self.GetFieldID(class, name.as_ptr(), sig.as_ptr()))
        }
    }

    fn get_method_id(
        &mut self,
        class: jclass,
        name: &CStr,
        sig: &CStr,
        is_static: bool,
    ) -> jmethodID {
        if is_static {
            call!(self.GetStaticMethodID(class, name.as_ptr(), sig.as_ptr()))
        } else {
            call!(self.GetMethodID(class, name.as_ptr(), sig.as_ptr()))
        }
    }

    fn call_method(
        &mut self,
        obj: jobject,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue {
        let a = args.as_ptr();
        match ret {
            ReturnKind::Object => jvalue { l: call!(self.CallObjectMethodA(obj, method, a)) },
            ReturnKind::Boolean => jvalue { z: call!(self.CallBooleanMethodA(obj, method, a)) },
            ReturnKind::Byte => jvalue { b: call!(self.CallByteMethodA(obj, method, a)) },
            ReturnKind::Char => jvalue { c: call!(self.CallCharMethodA(obj, method, a)) },
            ReturnKind::Short => jvalue { s: call!(self.CallShortMethodA(obj, method, a)) },
            ReturnKind::Int => jvalue { i: call!(self.CallIntMethodA(obj, method, a)) },
            ReturnKind::Long => jvalue { j: call!(self.CallLongMethodA(obj, method, a)) },
            ReturnKind::Float => jvalue { f: call!(self.CallFloatMethodA(obj, method, a)) },
            ReturnKind::Double => jvalue { d: call!(self.CallDoubleMethodA(obj, method, a)) },
            ReturnKind::Void => {
                call!(self.CallVoidMethodA(obj, method, a));
                jvalue::default()
            }
        }
    }

    fn call_nonvirtual_method(
        &mut self,
        obj: jobject,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue {
        let a = args.as_ptr();
        match ret {
            ReturnKind::Object => jvalue {
                l: call!(self.CallNonvirtualObjectMethodA(obj, class, method, a)),
            },
            ReturnKind::Boolean => jvalue {
                z: call!(self.CallNonvirtualBooleanMethodA(obj, class, method, a)),
            },
            ReturnKind::Byte => jvalue {
                b: call!(self.CallNonvirtualByteMethodA(obj, class, method, a)),
            },
            ReturnKind::Char => jvalue {
                c: call!(self.CallNonvirtualCharMethodA(obj, class, method, a)),
            },
            ReturnKind::Short => jvalue {
                s: call!(self.CallNonvirtualShortMethodA(obj, class, method, a)),
            },
            ReturnKind::Int => jvalue {
                i: call!(self.CallNonvirtualIntMethodA(obj, class, method, a)),
            },
            ReturnKind::Long => jvalue {
                j: call!(self.CallNonvirtualLongMethodA(obj, class, method, a)),
            },
            ReturnKind::Float => jvalue {
                f: call!(self.CallNonvirtualFloatMethodA(obj, class, method, a)),
            },
            ReturnKind::Double => jvalue {
                d: call!(self.CallNonvirtualDoubleMethodA(obj, class, method, a)),
            },
            ReturnKind::Void => {
                call!(self.CallNonvirtualVoidMethodA(obj, class, method, a));
                jvalue::default()
            }
        }
    }

    fn call_static_method(
        &mut self,
        class: jclass,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue {
        let a = args.as_ptr();
        match ret {
            ReturnKind::Object => jvalue { l: call!(self.CallStaticObjectMethodA(class, method, a)) },
            ReturnKind::Boolean => jvalue {
                z: call!(self.CallStaticBooleanMethodA(class, method, a)),
            },
            ReturnKind::Byte => jvalue { b: call!(self.CallStaticByteMethodA(class, method, a)) },
            ReturnKind::Char => jvalue { c: call!(self.CallStaticCharMethodA(class, method, a)) },
            ReturnKind::Short => jvalue { s: call!(self.CallStaticShortMethodA(class, method, a)) },
            ReturnKind::Int => jvalue { i: call!(self.CallStaticIntMethodA(class, method, a)) },
            ReturnKind::Long => jvalue { j: call!(self.CallStaticLongMethodA(class, method, a)) },
            ReturnKind::Float => jvalue { f: call!(self.CallStaticFloatMethodA(class, method, a)) },
            ReturnKind::Double => jvalue {
                d: call!(self.CallStaticDoubleMethodA(class, method, a)),
            },
            ReturnKind::Void => {
                call!(self.CallStaticVoidMethodA(class, method, a));
                jvalue::default()
            }
        }
    }

    fn new_object(&mut self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> jobject {
        call!(self.NewObjectA(class, ctor, args.as_ptr()))
    }

    fn get_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind) -> jvalue {
        match kind {
            ReturnKind::Object => jvalue { l: call!(self.GetObjectField(obj, field)) },
            ReturnKind::Boolean => jvalue { z: call!(self.GetBooleanField(obj, field)) },
            ReturnKind::Byte => jvalue { b: call!(self.GetByteField(obj, field)) },
            ReturnKind::Char => jvalue { c: call!(self.GetCharField(obj, field)) },
            ReturnKind::Short => jvalue { s: call!(self.GetShortField(obj, field)) },
            ReturnKind::Int => jvalue { i: call!(self.GetIntField(obj, field)) },
            ReturnKind::Long => jvalue { j: call!(self.GetLongField(obj, field)) },
            ReturnKind::Float => jvalue { f: call!(self.GetFloatField(obj, field)) },
            ReturnKind::Double => jvalue { d: call!(self.GetDoubleField(obj, field)) },
            ReturnKind::Void => void_value(),
        }
    }

    fn set_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind, value: jvalue) {
        // The union read happens inside `call!`; the caller tagged `value` with `kind`.
        match kind {
            ReturnKind::Object => call!(self.SetObjectField(obj, field, value.l)),
            ReturnKind::Boolean => call!(self.SetBooleanField(obj, field, value.z)),
            ReturnKind::Byte => call!(self.SetByteField(obj, field, value.b)),
            ReturnKind::Char => call!(self.SetCharField(obj, field, value.c)),
            ReturnKind::Short => call!(self.SetShortField(obj, field, value.s)),
            ReturnKind::Int => call!(self.SetIntField(obj, field, value.i)),
            ReturnKind::Long => call!(self.SetLongField(obj, field, value.j)),
            ReturnKind::Float => call!(self.SetFloatField(obj, field, value.f)),
            ReturnKind::Double => call!(self.SetDoubleField(obj, field, value.d)),
            ReturnKind::Void => void_value(),
        }
    }

    fn get_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind) -> jvalue {
        match kind {
            ReturnKind::Object => jvalue { l: call!(self.GetStaticObjectField(class, field)) },
            ReturnKind::Boolean => jvalue { z: call!(self.GetStaticBooleanField(class, field)) },
            ReturnKind::Byte => jvalue { b: call!(self.GetStaticByteField(class, field)) },
            ReturnKind::Char => jvalue { c: call!(self.GetStaticCharField(class, field)) },
            ReturnKind::Short => jvalue { s: call!(self.GetStaticShortField(class, field)) },
            ReturnKind::Int => jvalue { i: call!(self.GetStaticIntField(class, field)) },
            ReturnKind::Long => jvalue { j: call!(self.GetStaticLongField(class, field)) },
            ReturnKind::Float => jvalue { f: call!(self.GetStaticFloatField(class, field)) },
            ReturnKind::Double => jvalue { d: call!(self.GetStaticDoubleField(class, field)) },
            ReturnKind::Void => void_value(),
        }
    }

    fn set_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind, value: jvalue) {
        // The union read happens inside `call!`; the caller tagged `value` with `kind`.
        match kind {
            ReturnKind::Object => call!(self.SetStaticObjectField(class, field, value.l)),
            ReturnKind::Boolean => call!(self.SetStaticBooleanField(class, field, value.z)),
            ReturnKind::Byte => call!(self.SetStaticByteField(class, field, value.b)),
            ReturnKind::Char => call!(self.SetStaticCharField(class, field, value.c)),
            ReturnKind::Short => call!(self.SetStaticShortField(class, field, value.s)),
            ReturnKind::Int => call!(self.SetStaticIntField(class, field, value.i)),
            ReturnKind::Long => call!(self.SetStaticLongField(class, field, value.j)),
            ReturnKind::Float => call!(self.SetStaticFloatField(class, field, value.f)),
            ReturnKind::Double => call!(self.SetStaticDoubleField(class, field, value.d)),
            ReturnKind::Void => void_value(),
        }
    }

    fn new_global_ref(&mut self, obj: jobject) -> jobject {
        call!(self.NewGlobalRef(obj))
    }

    fn delete_global_ref(&mut self, obj: jobject) {
        call!(self.DeleteGlobalRef(obj))
    }

    fn new_local_ref(&mut self, obj: jobject) -> jobject {
        call!(self.NewLocalRef(obj))
    }

    fn delete_local_ref(&mut self, obj: jobject) {
        call!(self.DeleteLocalRef(obj))
    }

    fn new_weak_global_ref(&mut self, obj: jobject) -> jobject {
        call!(self.NewWeakGlobalRef(obj))
    }

    fn delete_weak_global_ref(&mut self, obj: jobject) {
        call!(self.DeleteWeakGlobalRef(obj))
    }

    fn new_string_utf(&mut self, utf: &CStr) -> jstring {
        call!(self.NewStringUTF(utf.as_ptr()))
    }

    fn get_string_utf_chars(&mut self, s: jstring) -> *const c_char {
        call!(self.GetStringUTFChars(s, ptr::null_mut()))
    }

    fn release_string_utf_chars(&mut self, s: jstring, chars: *const c_char) {
        call!(self.ReleaseStringUTFChars(s, chars))
    }

    fn get_string_length(&mut self, s: jstring) -> jsize {
        call!(self.GetStringLength(s))
    }

    fn get_array_length(&mut self, array: jarray) -> jsize {
        call!(self.GetArrayLength(array))
    }

    fn new_primitive_array(&mut self, kind: PrimitiveKind, len: jsize) -> jarray {
        match kind {
            PrimitiveKind::Boolean => call!(self.NewBooleanArray(len)),
            PrimitiveKind::Byte => call!(self.NewByteArray(len)),
            PrimitiveKind::Char => call!(self.NewCharArray(len)),
            PrimitiveKind::Short => call!(self.NewShortArray(len)),
            PrimitiveKind::Int => call!(self.NewIntArray(len)),
            PrimitiveKind::Long => call!(self.NewLongArray(len)),
            PrimitiveKind::Float => call!(self.NewFloatArray(len)),
            PrimitiveKind::Double => call!(self.NewDoubleArray(len)),
            PrimitiveKind::Void => void_value(),
        }
    }

    fn new_object_array(&mut self, len: jsize, element_class: jclass, init: jobject) -> jarray {
        call!(self.NewObjectArray(len, element_class, init))
    }

    fn get_object_array_element(&mut self, array: jarray, index: jsize) -> jobject {
        call!(self.GetObjectArrayElement(array, index))
    }

    fn set_object_array_element(&mut self, array: jarray, index: jsize, value: jobject) {
        call!(self.SetObjectArrayElement(array, index, value))
    }

    fn get_primitive_array_critical(&mut self, array: jarray) -> *mut c_void {
        call!(self.GetPrimitiveArrayCritical(array, ptr::null_mut()))
    }

    fn release_primitive_array_critical(&mut self, array: jarray, elems: *mut c_void, mode: jint) {
        call!(self.ReleasePrimitiveArrayCritical(array, elems, mode))
    }

    fn register_natives(&mut self, class: jclass, methods: &[JNINativeMethod]) -> jint {
        call!(self.RegisterNatives(class, methods.as_ptr(), methods.len() as jint))
    }

    fn unregister_natives(&mut self, class: jclass) -> jint {
        call!(self.UnregisterNatives(class))
    }

    fn exception_check(&mut self) -> bool {
        call!(self.ExceptionCheck()) != JNI_FALSE
    }

    fn exception_occurred(&mut self) -> jthrowable {
        call!(self.ExceptionOccurred())
    }

    fn exception_describe(&mut self) {
        call!(self.ExceptionDescribe())
    }

    fn exception_clear(&mut self) {
        call!(self.ExceptionClear())
    }

    fn throw_new(&mut self, class: jclass, message: &CStr) -> jint {
        call!(self.ThrowNew(class, message.as_ptr()))
    }

    fn get_java_vm(&mut self) -> *mut JavaVM {
        let mut vm: *mut JavaVM = ptr::null_mut();
        if call!(self.GetJavaVM(&mut vm)) == JNI_OK {
            vm
        } else {
            ptr::null_mut()
        }
    }
}
