//! A real function table backed by thread-local state
//!
//! Drives the `JniEnv` boundary and generated native wrappers through the
//! same raw entry points a runtime would provide. Only the slots these
//! tests need are filled in; any other slot panics through `JniEnv`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use jbridge::sys::{
    jboolean, jclass, jint, jmethodID, jobject, jsize, jstring, jthrowable, jvalue, JNIEnv,
    JNINativeInterface_, JNINativeMethod, JNI_FALSE, JNI_OK, JNI_TRUE,
};
use jbridge::{Env, JniEnv};

#[derive(Default)]
struct RuntimeState {
    next: usize,
    classes: HashMap<String, usize>,
    methods: HashMap<(String, String), usize>,
    strings: HashMap<usize, CString>,
    pending: Option<(String, String)>,
    registered: Vec<(String, String, usize)>,
    deleted: usize,
    referents: HashMap<usize, usize>,
}

impl RuntimeState {
    fn fresh(&mut self) -> usize {
        self.next += 0x10;
        0x8000 + self.next
    }

    /// A fresh reference to whatever `target` refers to.
    fn reference_to(&mut self, target: usize) -> usize {
        let referent = self.referent(target);
        let handle = self.fresh();
        self.referents.insert(handle, referent);
        handle
    }

    fn referent(&self, handle: usize) -> usize {
        self.referents.get(&handle).copied().unwrap_or(handle)
    }

    fn class_name(&self, class: jclass) -> String {
        let class = self.referent(class as usize);
        self.classes
            .iter()
            .find(|(_, h)| **h == class)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }
}

thread_local! {
    static STATE: RefCell<RuntimeState> = RefCell::new(RuntimeState::default());
}

fn state<R>(f: impl FnOnce(&mut RuntimeState) -> R) -> R {
    STATE.with(|s| f(&mut s.borrow_mut()))
}

fn text(raw: *const c_char) -> String {
    unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
}

// ============================================================================
// Setup and inspection
// ============================================================================

pub fn define_class(name: &str) -> jclass {
    state(|s| {
        let handle = s.fresh();
        s.classes.insert(name.to_string(), handle);
        handle as jclass
    })
}

pub fn define_method(name: &str, sig: &str) -> jmethodID {
    state(|s| {
        let id = s.fresh();
        s.methods.insert((name.to_string(), sig.to_string()), id);
        id as jmethodID
    })
}

/// Class and message of the pending exception.
pub fn pending() -> Option<(String, String)> {
    state(|s| s.pending.clone())
}

pub fn registered() -> Vec<(String, String, usize)> {
    state(|s| s.registered.clone())
}

pub fn deleted_refs() -> usize {
    state(|s| s.deleted)
}

// ============================================================================
// Entry points
// ============================================================================

unsafe extern "system" fn find_class(_env: *mut JNIEnv, name: *const c_char) -> jclass {
    let name = text(name);
    state(|s| match s.classes.get(&name).copied() {
        Some(h) => s.reference_to(h) as jclass,
        None => {
            s.pending = Some(("java/lang/NoClassDefFoundError".to_string(), name));
            ptr::null_mut()
        }
    })
}

unsafe extern "system" fn new_global_ref(_env: *mut JNIEnv, obj: jobject) -> jobject {
    state(|s| s.reference_to(obj as usize) as jobject)
}

unsafe extern "system" fn is_same_object(_env: *mut JNIEnv, a: jobject, b: jobject) -> jboolean {
    if state(|s| s.referent(a as usize) == s.referent(b as usize)) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

unsafe extern "system" fn delete_ref(_env: *mut JNIEnv, _obj: jobject) {
    state(|s| s.deleted += 1);
}

unsafe extern "system" fn get_method_id(
    _env: *mut JNIEnv,
    _class: jclass,
    name: *const c_char,
    sig: *const c_char,
) -> jmethodID {
    let key = (text(name), text(sig));
    state(|s| match s.methods.get(&key) {
        Some(&id) => id as jmethodID,
        None => {
            s.pending = Some(("java/lang/NoSuchMethodError".to_string(), key.0));
            ptr::null_mut()
        }
    })
}

/// Every static int method adds its two arguments.
unsafe extern "system" fn call_static_int(
    _env: *mut JNIEnv,
    _class: jclass,
    _method: jmethodID,
    args: *const jvalue,
) -> jint {
    unsafe { (*args).i + (*args.add(1)).i }
}

unsafe extern "system" fn exception_check(_env: *mut JNIEnv) -> jboolean {
    if state(|s| s.pending.is_some()) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

unsafe extern "system" fn exception_occurred(_env: *mut JNIEnv) -> jthrowable {
    if state(|s| s.pending.is_some()) {
        0xE000 as jthrowable
    } else {
        ptr::null_mut()
    }
}

unsafe extern "system" fn exception_describe(_env: *mut JNIEnv) {}

unsafe extern "system" fn exception_clear(_env: *mut JNIEnv) {
    state(|s| s.pending = None);
}

unsafe extern "system" fn throw_new(_env: *mut JNIEnv, class: jclass, msg: *const c_char) -> jint {
    let message = text(msg);
    state(|s| {
        let class = s.class_name(class);
        s.pending = Some((class, message));
    });
    JNI_OK
}

unsafe extern "system" fn new_string_utf(_env: *mut JNIEnv, utf: *const c_char) -> jstring {
    let bytes = unsafe { CStr::from_ptr(utf) }.to_owned();
    state(|s| {
        let handle = s.fresh();
        s.strings.insert(handle, bytes);
        handle as jstring
    })
}

unsafe extern "system" fn get_string_utf_chars(
    _env: *mut JNIEnv,
    string: jstring,
    _is_copy: *mut jboolean,
) -> *const c_char {
    state(|s| {
        s.strings
            .get(&(string as usize))
            .map_or(ptr::null(), |c| c.as_ptr())
    })
}

unsafe extern "system" fn release_string_utf_chars(
    _env: *mut JNIEnv,
    _string: jstring,
    _chars: *const c_char,
) {
}

unsafe extern "system" fn get_string_length(_env: *mut JNIEnv, string: jstring) -> jsize {
    state(|s| {
        s.strings.get(&(string as usize)).map_or(0, |c| {
            // Stored text is plain UTF-8 for the strings these tests use.
            c.to_string_lossy().encode_utf16().count() as jsize
        })
    })
}

unsafe extern "system" fn register_natives(
    _env: *mut JNIEnv,
    _class: jclass,
    methods: *const JNINativeMethod,
    count: jint,
) -> jint {
    let methods = unsafe { std::slice::from_raw_parts(methods, count as usize) };
    let entries: Vec<_> = methods
        .iter()
        .map(|m| (text(m.name), text(m.signature), m.fnPtr as usize))
        .collect();
    state(|s| s.registered.extend(entries));
    JNI_OK
}

// ============================================================================
// RawEnv
// ============================================================================

/// An environment pointer whose table dispatches into this module.
pub struct RawEnv {
    _table: Box<JNINativeInterface_>,
    env: Box<JNIEnv>,
}

impl RawEnv {
    pub fn new() -> Self {
        // SAFETY: an all-zero table is all `None` slots and null reserved
        // pointers.
        let mut table: Box<JNINativeInterface_> = Box::new(unsafe { std::mem::zeroed() });
        table.FindClass = Some(find_class);
        table.NewGlobalRef = Some(new_global_ref);
        table.IsSameObject = Some(is_same_object);
        table.DeleteGlobalRef = Some(delete_ref);
        table.DeleteLocalRef = Some(delete_ref);
        table.GetMethodID = Some(get_method_id);
        table.GetStaticMethodID = Some(get_method_id);
        table.CallStaticIntMethodA = Some(call_static_int);
        table.ExceptionCheck = Some(exception_check);
        table.ExceptionOccurred = Some(exception_occurred);
        table.ExceptionDescribe = Some(exception_describe);
        table.ExceptionClear = Some(exception_clear);
        table.ThrowNew = Some(throw_new);
        table.NewStringUTF = Some(new_string_utf);
        table.GetStringUTFChars = Some(get_string_utf_chars);
        table.ReleaseStringUTFChars = Some(release_string_utf_chars);
        table.GetStringLength = Some(get_string_length);
        table.RegisterNatives = Some(register_natives);
        let env = Box::new(&*table as *const JNINativeInterface_);
        Self { _table: table, env }
    }

    pub fn as_raw(&mut self) -> *mut JNIEnv {
        &mut *self.env
    }

    pub fn with_env<R>(&mut self, f: impl FnOnce(&mut Env<'_>) -> R) -> R {
        let mut jni = unsafe { JniEnv::from_raw(self.as_raw()) }.unwrap();
        let mut env = Env::new(&mut jni);
        f(&mut env)
    }
}
