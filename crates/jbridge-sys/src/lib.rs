//! Raw definitions of the managed runtime's native embedding ABI.
//!
//! Layout follows the runtime's `jni.h` header for version 1.8 and later.
//! Newer runtimes only append slots to the end of the function tables, so
//! a table declared here stays valid against any later runtime.
//!
//! Every callable slot is an `Option<fn>` so that an all-zero table is a
//! valid value. Variadic and `va_list` entry points are kept as opaque
//! pointer padding; use the `*A` variants that take a `jvalue` array.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_char;

// ============================================================================
// Primitive Types
// ============================================================================

pub type jint = i32;
pub type jlong = i64;
pub type jbyte = i8;
pub type jboolean = u8;
pub type jchar = u16;
pub type jshort = i16;
pub type jfloat = f32;
pub type jdouble = f64;
pub type jsize = jint;

// ============================================================================
// Reference Types
// ============================================================================

pub type jobject = *mut c_void;
pub type jclass = jobject;
pub type jstring = jobject;
pub type jarray = jobject;
pub type jthrowable = jobject;
pub type jweak = jobject;

pub type jobjectArray = jarray;
pub type jbooleanArray = jarray;
pub type jbyteArray = jarray;
pub type jcharArray = jarray;
pub type jshortArray = jarray;
pub type jintArray = jarray;
pub type jlongArray = jarray;
pub type jfloatArray = jarray;
pub type jdoubleArray = jarray;

/// Opaque method identifier. Valid for as long as the declaring class is loaded.
pub type jmethodID = *mut c_void;
/// Opaque field identifier. Valid for as long as the declaring class is loaded.
pub type jfieldID = *mut c_void;

/// One argument slot of an `*A` call.
#[repr(C)]
#[derive(Copy, Clone)]
pub union jvalue {
    pub z: jboolean,
    pub b: jbyte,
    pub c: jchar,
    pub s: jshort,
    pub i: jint,
    pub j: jlong,
    pub f: jfloat,
    pub d: jdouble,
    pub l: jobject,
}

impl Default for jvalue {
    fn default() -> Self {
        jvalue { j: 0 }
    }
}

// ============================================================================
// Constants
// ============================================================================

pub const JNI_OK: jint = 0;
pub const JNI_ERR: jint = -1;
pub const JNI_EDETACHED: jint = -2;
pub const JNI_EVERSION: jint = -3;
pub const JNI_ENOMEM: jint = -4;
pub const JNI_EEXIST: jint = -5;
pub const JNI_EINVAL: jint = -6;

pub const JNI_TRUE: jboolean = 1;
pub const JNI_FALSE: jboolean = 0;

/// Release mode: copy back and keep the buffer.
pub const JNI_COMMIT: jint = 1;
/// Release mode: free the buffer without copying back.
pub const JNI_ABORT: jint = 2;

pub const JNI_VERSION_1_1: jint = 0x0001_0001;
pub const JNI_VERSION_1_2: jint = 0x0001_0002;
pub const JNI_VERSION_1_4: jint = 0x0001_0004;
pub const JNI_VERSION_1_6: jint = 0x0001_0006;
pub const JNI_VERSION_1_8: jint = 0x0001_0008;
pub const JNI_VERSION_9: jint = 0x0009_0000;
pub const JNI_VERSION_10: jint = 0x000a_0000;
pub const JNI_VERSION_19: jint = 0x0013_0000;
pub const JNI_VERSION_21: jint = 0x0015_0000;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum jobjectRefType {
    JNIInvalidRefType = 0,
    JNILocalRefType = 1,
    JNIGlobalRefType = 2,
    JNIWeakGlobalRefType = 3,
}

/// Entry passed to `RegisterNatives`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct JNINativeMethod {
    pub name: *mut c_char,
    pub signature: *mut c_char,
    pub fnPtr: *mut c_void,
}

// ============================================================================
// JNINativeInterface_ (the per-thread function table)
// ============================================================================

/// A `JNIEnv` is a pointer to the function table; entry points receive a
/// pointer to it.
pub type JNIEnv = *const JNINativeInterface_;

/// The per-thread function table. 236 slots; field order is ABI.
#[repr(C)]
pub struct JNINativeInterface_ {
    // Reserved
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,
    pub reserved3: *mut c_void,

    // Version and class definition
    pub GetVersion: Option<unsafe extern "system" fn(env: *mut JNIEnv) -> jint>,
    pub DefineClass: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            name: *const c_char,
            loader: jobject,
            buf: *const jbyte,
            len: jsize,
        ) -> jclass,
    >,
    pub FindClass: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            name: *const c_char,
        ) -> jclass,
    >,

    // Reflection bridges and hierarchy
    pub FromReflectedMethod: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            method: jobject,
        ) -> jmethodID,
    >,
    pub FromReflectedField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            field: jobject,
        ) -> jfieldID,
    >,
    pub ToReflectedMethod: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            cls: jclass,
            methodID: jmethodID,
            isStatic: jboolean,
        ) -> jobject,
    >,
    pub GetSuperclass: Option<unsafe extern "system" fn(env: *mut JNIEnv, sub: jclass) -> jclass>,
    pub IsAssignableFrom: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            sub: jclass,
            sup: jclass,
        ) -> jboolean,
    >,
    pub ToReflectedField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            cls: jclass,
            fieldID: jfieldID,
            isStatic: jboolean,
        ) -> jobject,
    >,

    // Exceptions
    pub Throw: Option<unsafe extern "system" fn(env: *mut JNIEnv, obj: jthrowable) -> jint>,
    pub ThrowNew: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            msg: *const c_char,
        ) -> jint,
    >,
    pub ExceptionOccurred: Option<unsafe extern "system" fn(env: *mut JNIEnv) -> jthrowable>,
    pub ExceptionDescribe: Option<unsafe extern "system" fn(env: *mut JNIEnv)>,
    pub ExceptionClear: Option<unsafe extern "system" fn(env: *mut JNIEnv)>,
    pub FatalError: Option<unsafe extern "system" fn(env: *mut JNIEnv, msg: *const c_char)>,

    // Local frames and references
    pub PushLocalFrame: Option<unsafe extern "system" fn(env: *mut JNIEnv, capacity: jint) -> jint>,
    pub PopLocalFrame: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            result: jobject,
        ) -> jobject,
    >,
    pub NewGlobalRef: Option<unsafe extern "system" fn(env: *mut JNIEnv, lobj: jobject) -> jobject>,
    pub DeleteGlobalRef: Option<unsafe extern "system" fn(env: *mut JNIEnv, gref: jobject)>,
    pub DeleteLocalRef: Option<unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject)>,
    pub IsSameObject: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj1: jobject,
            obj2: jobject,
        ) -> jboolean,
    >,
    pub NewLocalRef: Option<unsafe extern "system" fn(env: *mut JNIEnv, ref_: jobject) -> jobject>,
    pub EnsureLocalCapacity: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            capacity: jint,
        ) -> jint,
    >,

    // Object construction
    pub AllocObject: Option<unsafe extern "system" fn(env: *mut JNIEnv, clazz: jclass) -> jobject>,
    pub NewObject: *mut c_void, // variadic
    pub NewObjectV: *mut c_void, // va_list
    pub NewObjectA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jobject,
    >,
    pub GetObjectClass: Option<unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject) -> jclass>,
    pub IsInstanceOf: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
        ) -> jboolean,
    >,

    // Instance method calls
    pub GetMethodID: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            name: *const c_char,
            sig: *const c_char,
        ) -> jmethodID,
    >,
    pub CallObjectMethod: *mut c_void, // variadic
    pub CallObjectMethodV: *mut c_void, // va_list
    pub CallObjectMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jobject,
    >,
    pub CallBooleanMethod: *mut c_void, // variadic
    pub CallBooleanMethodV: *mut c_void, // va_list
    pub CallBooleanMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jboolean,
    >,
    pub CallByteMethod: *mut c_void, // variadic
    pub CallByteMethodV: *mut c_void, // va_list
    pub CallByteMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jbyte,
    >,
    pub CallCharMethod: *mut c_void, // variadic
    pub CallCharMethodV: *mut c_void, // va_list
    pub CallCharMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jchar,
    >,
    pub CallShortMethod: *mut c_void, // variadic
    pub CallShortMethodV: *mut c_void, // va_list
    pub CallShortMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jshort,
    >,
    pub CallIntMethod: *mut c_void, // variadic
    pub CallIntMethodV: *mut c_void, // va_list
    pub CallIntMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jint,
    >,
    pub CallLongMethod: *mut c_void, // variadic
    pub CallLongMethodV: *mut c_void, // va_list
    pub CallLongMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jlong,
    >,
    pub CallFloatMethod: *mut c_void, // variadic
    pub CallFloatMethodV: *mut c_void, // va_list
    pub CallFloatMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jfloat,
    >,
    pub CallDoubleMethod: *mut c_void, // variadic
    pub CallDoubleMethodV: *mut c_void, // va_list
    pub CallDoubleMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jdouble,
    >,
    pub CallVoidMethod: *mut c_void, // variadic
    pub CallVoidMethodV: *mut c_void, // va_list
    pub CallVoidMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            methodID: jmethodID,
            args: *const jvalue,
        ),
    >,

    // Non-virtual method calls
    pub CallNonvirtualObjectMethod: *mut c_void, // variadic
    pub CallNonvirtualObjectMethodV: *mut c_void, // va_list
    pub CallNonvirtualObjectMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jobject,
    >,
    pub CallNonvirtualBooleanMethod: *mut c_void, // variadic
    pub CallNonvirtualBooleanMethodV: *mut c_void, // va_list
    pub CallNonvirtualBooleanMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jboolean,
    >,
    pub CallNonvirtualByteMethod: *mut c_void, // variadic
    pub CallNonvirtualByteMethodV: *mut c_void, // va_list
    pub CallNonvirtualByteMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jbyte,
    >,
    pub CallNonvirtualCharMethod: *mut c_void, // variadic
    pub CallNonvirtualCharMethodV: *mut c_void, // va_list
    pub CallNonvirtualCharMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jchar,
    >,
    pub CallNonvirtualShortMethod: *mut c_void, // variadic
    pub CallNonvirtualShortMethodV: *mut c_void, // va_list
    pub CallNonvirtualShortMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jshort,
    >,
    pub CallNonvirtualIntMethod: *mut c_void, // variadic
    pub CallNonvirtualIntMethodV: *mut c_void, // va_list
    pub CallNonvirtualIntMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jint,
    >,
    pub CallNonvirtualLongMethod: *mut c_void, // variadic
    pub CallNonvirtualLongMethodV: *mut c_void, // va_list
    pub CallNonvirtualLongMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jlong,
    >,
    pub CallNonvirtualFloatMethod: *mut c_void, // variadic
    pub CallNonvirtualFloatMethodV: *mut c_void, // va_list
    pub CallNonvirtualFloatMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jfloat,
    >,
    pub CallNonvirtualDoubleMethod: *mut c_void, // variadic
    pub CallNonvirtualDoubleMethodV: *mut c_void, // va_list
    pub CallNonvirtualDoubleMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jdouble,
    >,
    pub CallNonvirtualVoidMethod: *mut c_void, // variadic
    pub CallNonvirtualVoidMethodV: *mut c_void, // va_list
    pub CallNonvirtualVoidMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ),
    >,

    // Instance fields
    pub GetFieldID: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            name: *const c_char,
            sig: *const c_char,
        ) -> jfieldID,
    >,
    pub GetObjectField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jobject,
    >,
    pub GetBooleanField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jboolean,
    >,
    pub GetByteField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jbyte,
    >,
    pub GetCharField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jchar,
    >,
    pub GetShortField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jshort,
    >,
    pub GetIntField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jint,
    >,
    pub GetLongField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jlong,
    >,
    pub GetFloatField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jfloat,
    >,
    pub GetDoubleField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
        ) -> jdouble,
    >,
    pub SetObjectField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jobject,
        ),
    >,
    pub SetBooleanField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jboolean,
        ),
    >,
    pub SetByteField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jbyte,
        ),
    >,
    pub SetCharField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jchar,
        ),
    >,
    pub SetShortField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jshort,
        ),
    >,
    pub SetIntField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jint,
        ),
    >,
    pub SetLongField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jlong,
        ),
    >,
    pub SetFloatField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jfloat,
        ),
    >,
    pub SetDoubleField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
            fieldID: jfieldID,
            val: jdouble,
        ),
    >,

    // Static method calls
    pub GetStaticMethodID: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            name: *const c_char,
            sig: *const c_char,
        ) -> jmethodID,
    >,
    pub CallStaticObjectMethod: *mut c_void, // variadic
    pub CallStaticObjectMethodV: *mut c_void, // va_list
    pub CallStaticObjectMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jobject,
    >,
    pub CallStaticBooleanMethod: *mut c_void, // variadic
    pub CallStaticBooleanMethodV: *mut c_void, // va_list
    pub CallStaticBooleanMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jboolean,
    >,
    pub CallStaticByteMethod: *mut c_void, // variadic
    pub CallStaticByteMethodV: *mut c_void, // va_list
    pub CallStaticByteMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jbyte,
    >,
    pub CallStaticCharMethod: *mut c_void, // variadic
    pub CallStaticCharMethodV: *mut c_void, // va_list
    pub CallStaticCharMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jchar,
    >,
    pub CallStaticShortMethod: *mut c_void, // variadic
    pub CallStaticShortMethodV: *mut c_void, // va_list
    pub CallStaticShortMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jshort,
    >,
    pub CallStaticIntMethod: *mut c_void, // variadic
    pub CallStaticIntMethodV: *mut c_void, // va_list
    pub CallStaticIntMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jint,
    >,
    pub CallStaticLongMethod: *mut c_void, // variadic
    pub CallStaticLongMethodV: *mut c_void, // va_list
    pub CallStaticLongMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jlong,
    >,
    pub CallStaticFloatMethod: *mut c_void, // variadic
    pub CallStaticFloatMethodV: *mut c_void, // va_list
    pub CallStaticFloatMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jfloat,
    >,
    pub CallStaticDoubleMethod: *mut c_void, // variadic
    pub CallStaticDoubleMethodV: *mut c_void, // va_list
    pub CallStaticDoubleMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ) -> jdouble,
    >,
    pub CallStaticVoidMethod: *mut c_void, // variadic
    pub CallStaticVoidMethodV: *mut c_void, // va_list
    pub CallStaticVoidMethodA: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methodID: jmethodID,
            args: *const jvalue,
        ),
    >,

    // Static fields
    pub GetStaticFieldID: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            name: *const c_char,
            sig: *const c_char,
        ) -> jfieldID,
    >,
    pub GetStaticObjectField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jobject,
    >,
    pub GetStaticBooleanField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jboolean,
    >,
    pub GetStaticByteField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jbyte,
    >,
    pub GetStaticCharField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jchar,
    >,
    pub GetStaticShortField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jshort,
    >,
    pub GetStaticIntField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jint,
    >,
    pub GetStaticLongField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jlong,
    >,
    pub GetStaticFloatField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jfloat,
    >,
    pub GetStaticDoubleField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
        ) -> jdouble,
    >,
    pub SetStaticObjectField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jobject,
        ),
    >,
    pub SetStaticBooleanField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jboolean,
        ),
    >,
    pub SetStaticByteField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jbyte,
        ),
    >,
    pub SetStaticCharField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jchar,
        ),
    >,
    pub SetStaticShortField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jshort,
        ),
    >,
    pub SetStaticIntField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jint,
        ),
    >,
    pub SetStaticLongField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jlong,
        ),
    >,
    pub SetStaticFloatField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jfloat,
        ),
    >,
    pub SetStaticDoubleField: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            fieldID: jfieldID,
            value: jdouble,
        ),
    >,

    // Strings
    pub NewString: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            unicode: *const jchar,
            len: jsize,
        ) -> jstring,
    >,
    pub GetStringLength: Option<unsafe extern "system" fn(env: *mut JNIEnv, str: jstring) -> jsize>,
    pub GetStringChars: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            isCopy: *mut jboolean,
        ) -> *const jchar,
    >,
    pub ReleaseStringChars: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            chars: *const jchar,
        ),
    >,
    pub NewStringUTF: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            utf: *const c_char,
        ) -> jstring,
    >,
    pub GetStringUTFLength: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
        ) -> jsize,
    >,
    pub GetStringUTFChars: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            isCopy: *mut jboolean,
        ) -> *const c_char,
    >,
    pub ReleaseStringUTFChars: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            chars: *const c_char,
        ),
    >,

    // Arrays
    pub GetArrayLength: Option<unsafe extern "system" fn(env: *mut JNIEnv, array: jarray) -> jsize>,
    pub NewObjectArray: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            len: jsize,
            clazz: jclass,
            init: jobject,
        ) -> jobjectArray,
    >,
    pub GetObjectArrayElement: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jobjectArray,
            index: jsize,
        ) -> jobject,
    >,
    pub SetObjectArrayElement: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jobjectArray,
            index: jsize,
            val: jobject,
        ),
    >,
    pub NewBooleanArray: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            len: jsize,
        ) -> jbooleanArray,
    >,
    pub NewByteArray: Option<unsafe extern "system" fn(env: *mut JNIEnv, len: jsize) -> jbyteArray>,
    pub NewCharArray: Option<unsafe extern "system" fn(env: *mut JNIEnv, len: jsize) -> jcharArray>,
    pub NewShortArray: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            len: jsize,
        ) -> jshortArray,
    >,
    pub NewIntArray: Option<unsafe extern "system" fn(env: *mut JNIEnv, len: jsize) -> jintArray>,
    pub NewLongArray: Option<unsafe extern "system" fn(env: *mut JNIEnv, len: jsize) -> jlongArray>,
    pub NewFloatArray: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            len: jsize,
        ) -> jfloatArray,
    >,
    pub NewDoubleArray: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            len: jsize,
        ) -> jdoubleArray,
    >,
    pub GetBooleanArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbooleanArray,
            isCopy: *mut jboolean,
        ) -> *mut jboolean,
    >,
    pub GetByteArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbyteArray,
            isCopy: *mut jboolean,
        ) -> *mut jbyte,
    >,
    pub GetCharArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jcharArray,
            isCopy: *mut jboolean,
        ) -> *mut jchar,
    >,
    pub GetShortArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jshortArray,
            isCopy: *mut jboolean,
        ) -> *mut jshort,
    >,
    pub GetIntArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jintArray,
            isCopy: *mut jboolean,
        ) -> *mut jint,
    >,
    pub GetLongArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jlongArray,
            isCopy: *mut jboolean,
        ) -> *mut jlong,
    >,
    pub GetFloatArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jfloatArray,
            isCopy: *mut jboolean,
        ) -> *mut jfloat,
    >,
    pub GetDoubleArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jdoubleArray,
            isCopy: *mut jboolean,
        ) -> *mut jdouble,
    >,
    pub ReleaseBooleanArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbooleanArray,
            elems: *mut jboolean,
            mode: jint,
        ),
    >,
    pub ReleaseByteArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbyteArray,
            elems: *mut jbyte,
            mode: jint,
        ),
    >,
    pub ReleaseCharArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jcharArray,
            elems: *mut jchar,
            mode: jint,
        ),
    >,
    pub ReleaseShortArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jshortArray,
            elems: *mut jshort,
            mode: jint,
        ),
    >,
    pub ReleaseIntArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jintArray,
            elems: *mut jint,
            mode: jint,
        ),
    >,
    pub ReleaseLongArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jlongArray,
            elems: *mut jlong,
            mode: jint,
        ),
    >,
    pub ReleaseFloatArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jfloatArray,
            elems: *mut jfloat,
            mode: jint,
        ),
    >,
    pub ReleaseDoubleArrayElements: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jdoubleArray,
            elems: *mut jdouble,
            mode: jint,
        ),
    >,
    pub GetBooleanArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbooleanArray,
            start: jsize,
            len: jsize,
            buf: *mut jboolean,
        ),
    >,
    pub GetByteArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbyteArray,
            start: jsize,
            len: jsize,
            buf: *mut jbyte,
        ),
    >,
    pub GetCharArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jcharArray,
            start: jsize,
            len: jsize,
            buf: *mut jchar,
        ),
    >,
    pub GetShortArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jshortArray,
            start: jsize,
            len: jsize,
            buf: *mut jshort,
        ),
    >,
    pub GetIntArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jintArray,
            start: jsize,
            len: jsize,
            buf: *mut jint,
        ),
    >,
    pub GetLongArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jlongArray,
            start: jsize,
            len: jsize,
            buf: *mut jlong,
        ),
    >,
    pub GetFloatArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jfloatArray,
            start: jsize,
            len: jsize,
            buf: *mut jfloat,
        ),
    >,
    pub GetDoubleArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jdoubleArray,
            start: jsize,
            len: jsize,
            buf: *mut jdouble,
        ),
    >,
    pub SetBooleanArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbooleanArray,
            start: jsize,
            len: jsize,
            buf: *const jboolean,
        ),
    >,
    pub SetByteArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jbyteArray,
            start: jsize,
            len: jsize,
            buf: *const jbyte,
        ),
    >,
    pub SetCharArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jcharArray,
            start: jsize,
            len: jsize,
            buf: *const jchar,
        ),
    >,
    pub SetShortArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jshortArray,
            start: jsize,
            len: jsize,
            buf: *const jshort,
        ),
    >,
    pub SetIntArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jintArray,
            start: jsize,
            len: jsize,
            buf: *const jint,
        ),
    >,
    pub SetLongArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jlongArray,
            start: jsize,
            len: jsize,
            buf: *const jlong,
        ),
    >,
    pub SetFloatArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jfloatArray,
            start: jsize,
            len: jsize,
            buf: *const jfloat,
        ),
    >,
    pub SetDoubleArrayRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jdoubleArray,
            start: jsize,
            len: jsize,
            buf: *const jdouble,
        ),
    >,

    // Natives, monitors and the VM
    pub RegisterNatives: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
            methods: *const JNINativeMethod,
            nMethods: jint,
        ) -> jint,
    >,
    pub UnregisterNatives: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            clazz: jclass,
        ) -> jint,
    >,
    pub MonitorEnter: Option<unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject) -> jint>,
    pub MonitorExit: Option<unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject) -> jint>,
    pub GetJavaVM: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            vm: *mut *mut JavaVM,
        ) -> jint,
    >,

    // Regions and critical sections
    pub GetStringRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            start: jsize,
            len: jsize,
            buf: *mut jchar,
        ),
    >,
    pub GetStringUTFRegion: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
            start: jsize,
            len: jsize,
            buf: *mut c_char,
        ),
    >,
    pub GetPrimitiveArrayCritical: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jarray,
            isCopy: *mut jboolean,
        ) -> *mut c_void,
    >,
    pub ReleasePrimitiveArrayCritical: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            array: jarray,
            carray: *mut c_void,
            mode: jint,
        ),
    >,
    pub GetStringCritical: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            string: jstring,
            isCopy: *mut jboolean,
        ) -> *const jchar,
    >,
    pub ReleaseStringCritical: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            string: jstring,
            cstring: *const jchar,
        ),
    >,

    // Weak references and pending-exception check
    pub NewWeakGlobalRef: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
        ) -> jweak,
    >,
    pub DeleteWeakGlobalRef: Option<unsafe extern "system" fn(env: *mut JNIEnv, ref_: jweak)>,
    pub ExceptionCheck: Option<unsafe extern "system" fn(env: *mut JNIEnv) -> jboolean>,

    // Direct buffers, reference types and later additions
    pub NewDirectByteBuffer: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            address: *mut c_void,
            capacity: jlong,
        ) -> jobject,
    >,
    pub GetDirectBufferAddress: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            buf: jobject,
        ) -> *mut c_void,
    >,
    pub GetDirectBufferCapacity: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            buf: jobject,
        ) -> jlong,
    >,
    pub GetObjectRefType: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
        ) -> jobjectRefType,
    >,
    pub GetModule: Option<unsafe extern "system" fn(env: *mut JNIEnv, clazz: jclass) -> jobject>,
    pub IsVirtualThread: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            obj: jobject,
        ) -> jboolean,
    >,
    pub GetStringUTFLengthAsLong: Option<
        unsafe extern "system" fn(
            env: *mut JNIEnv,
            str: jstring,
        ) -> jlong,
    >,
}

// ============================================================================
// JNIInvokeInterface_ (the process-wide VM table)
// ============================================================================

pub type JavaVM = *const JNIInvokeInterface_;

#[repr(C)]
pub struct JNIInvokeInterface_ {
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,

    pub DestroyJavaVM: Option<unsafe extern "system" fn(vm: *mut JavaVM) -> jint>,
    pub AttachCurrentThread: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, args: *mut c_void) -> jint,
    >,
    pub DetachCurrentThread: Option<unsafe extern "system" fn(vm: *mut JavaVM) -> jint>,
    pub GetEnv: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint,
    >,
    pub AttachCurrentThreadAsDaemon: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, args: *mut c_void) -> jint,
    >,
}

#[repr(C)]
pub struct JavaVMAttachArgs {
    pub version: jint,
    pub name: *mut c_char,
    pub group: jobject,
}

#[repr(C)]
pub struct JavaVMOption {
    pub optionString: *mut c_char,
    pub extraInfo: *mut c_void,
}

#[repr(C)]
pub struct JavaVMInitArgs {
    pub version: jint,
    pub nOptions: jint,
    pub options: *mut JavaVMOption,
    pub ignoreUnrecognized: jboolean,
}

// ============================================================================
// Invocation API exports of the runtime library
// ============================================================================

/// Symbol name of [`JNI_CreateJavaVM_t`] in the runtime library.
pub const JNI_CREATE_JAVA_VM: &[u8] = b"JNI_CreateJavaVM\0";
/// Symbol name of [`JNI_GetCreatedJavaVMs_t`] in the runtime library.
pub const JNI_GET_CREATED_JAVA_VMS: &[u8] = b"JNI_GetCreatedJavaVMs\0";

pub type JNI_CreateJavaVM_t = unsafe extern "system" fn(
    pvm: *mut *mut JavaVM,
    penv: *mut *mut c_void,
    args: *mut c_void,
) -> jint;

pub type JNI_GetCreatedJavaVMs_t =
    unsafe extern "system" fn(vmBuf: *mut *mut JavaVM, bufLen: jsize, nVMs: *mut jsize) -> jint;
