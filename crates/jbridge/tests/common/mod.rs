//! Recording fake of the boundary shared by the integration tests

#![allow(dead_code)]

pub mod runtime;

use std::collections::{HashMap, HashSet};
use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use jbridge::sys::{
    jarray, jclass, jfieldID, jint, jmethodID, jobject, jsize, jstring, jthrowable, jvalue,
    JNINativeMethod, JavaVM, JNI_ERR, JNI_OK,
};
use jbridge::{Boundary, Env, PrimitiveKind, RefKind, ReturnKind};

/// Call family of a method invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Static,
    Virtual,
    NonVirtual,
}

/// One boundary entry point invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FindClass(String),
    GetObjectClass,
    IsInstanceOf,
    IsSameObject,
    GetFieldId { name: String, sig: String, is_static: bool },
    GetMethodId { name: String, sig: String, is_static: bool },
    Invoke { family: Family, ret: ReturnKind },
    NewObject,
    GetField { kind: ReturnKind, is_static: bool },
    SetField { kind: ReturnKind, is_static: bool },
    NewRef(RefKind),
    DeleteRef(RefKind),
    NewString(String),
    GetStringChars,
    ReleaseStringChars,
    GetStringLength,
    GetArrayLength,
    NewPrimitiveArray(PrimitiveKind, jsize),
    NewObjectArray(jsize),
    GetObjectArrayElement(jsize),
    SetObjectArrayElement(jsize),
    Pin,
    Unpin(jint),
    RegisterNatives(Vec<(String, String)>),
    UnregisterNatives,
    ExceptionCheck,
    ExceptionOccurred,
    ExceptionDescribe,
    ExceptionClear,
    ThrowNew(String),
    GetJavaVm,
}

type MethodImpl = Box<dyn FnMut(&[jvalue]) -> jvalue>;

struct FakeArray {
    kind: PrimitiveKind,
    len: usize,
    // u64 storage keeps every element type aligned.
    words: Vec<u64>,
}

/// A boundary backed by in-memory tables.
///
/// Handles are distinct fake pointers. Every class lookup and every new
/// reference is a fresh pointer mapped to the object it refers to, so only
/// `IsSameObject` sees through references. While an array is pinned, any
/// call other than the matching release panics.
pub struct FakeBoundary {
    pub calls: Vec<Call>,
    next_handle: usize,
    identity: HashMap<usize, usize>,
    /// Every reference passed to a delete entry point, in order.
    pub deleted: Vec<jobject>,
    /// Raw message bytes of every `ThrowNew`.
    pub thrown: Vec<Vec<u8>>,
    classes: HashMap<String, jclass>,
    object_classes: HashMap<usize, jclass>,
    instances: HashSet<(usize, usize)>,
    fields: HashMap<(String, String, bool), jfieldID>,
    methods: HashMap<(String, String, bool), jmethodID>,
    method_impls: HashMap<usize, MethodImpl>,
    field_values: HashMap<(usize, usize), jvalue>,
    arrays: HashMap<usize, FakeArray>,
    object_arrays: HashMap<usize, Vec<jobject>>,
    strings: HashMap<usize, Vec<u8>>,
    borrowed_chars: HashMap<usize, CString>,
    pub last_args: Vec<jvalue>,
    pub pending: bool,
    throwable: jthrowable,
    pinned: Option<usize>,
    pub refuse_refs: bool,
    pub register_status: jint,
}

impl Default for FakeBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBoundary {
    pub fn new() -> Self {
        let mut fake = Self {
            calls: Vec::new(),
            next_handle: 0x1000,
            identity: HashMap::new(),
            deleted: Vec::new(),
            thrown: Vec::new(),
            classes: HashMap::new(),
            object_classes: HashMap::new(),
            instances: HashSet::new(),
            fields: HashMap::new(),
            methods: HashMap::new(),
            method_impls: HashMap::new(),
            field_values: HashMap::new(),
            arrays: HashMap::new(),
            object_arrays: HashMap::new(),
            strings: HashMap::new(),
            borrowed_chars: HashMap::new(),
            last_args: Vec::new(),
            pending: false,
            throwable: ptr::null_mut(),
            pinned: None,
            refuse_refs: false,
            register_status: JNI_OK,
        };
        fake.throwable = fake.fresh();
        fake
    }

    pub fn env(&mut self) -> Env<'_> {
        Env::new(self)
    }

    /// A new distinct handle value.
    pub fn fresh(&mut self) -> *mut c_void {
        self.next_handle += 0x10;
        self.next_handle as *mut c_void
    }

    /// The object a handle or reference refers to.
    pub fn identity(&self, handle: *mut c_void) -> usize {
        let raw = handle as usize;
        self.identity.get(&raw).copied().unwrap_or(raw)
    }

    /// A fresh reference to the same object as `obj`.
    fn reference_to(&mut self, obj: jobject) -> jobject {
        let target = self.identity(obj);
        let reference = self.fresh();
        self.identity.insert(reference as usize, target);
        reference
    }

    /// Point an existing handle value at whatever `target` refers to, as the
    /// runtime does when it hands out a freed local slot again.
    pub fn rebind(&mut self, handle: *mut c_void, target: *mut c_void) {
        let referent = self.identity(target);
        self.identity.insert(handle as usize, referent);
    }

    /// Make `name` resolvable and return its class handle.
    pub fn add_class(&mut self, name: &str) -> jclass {
        let handle = self.fresh();
        self.classes.insert(name.to_string(), handle);
        handle
    }

    /// Make `name` resolve to the same class as `handle`.
    pub fn alias_class(&mut self, name: &str, handle: jclass) {
        let class = self.identity(handle) as jclass;
        self.classes.insert(name.to_string(), class);
    }

    /// A new object of `class`.
    pub fn add_object(&mut self, class: jclass) -> jobject {
        let class = self.identity(class) as jclass;
        let obj = self.fresh();
        self.object_classes.insert(obj as usize, class);
        self.instances.insert((obj as usize, class as usize));
        obj
    }

    pub fn add_field(&mut self, name: &str, sig: &str, is_static: bool) -> jfieldID {
        let id = self.fresh();
        self.fields
            .insert((name.to_string(), sig.to_string(), is_static), id);
        id
    }

    pub fn add_method(&mut self, name: &str, sig: &str, is_static: bool) -> jmethodID {
        let id = self.fresh();
        self.methods
            .insert((name.to_string(), sig.to_string(), is_static), id);
        id
    }

    /// Register a method whose invocation is computed by `body`.
    pub fn add_method_impl(
        &mut self,
        name: &str,
        sig: &str,
        is_static: bool,
        body: impl FnMut(&[jvalue]) -> jvalue + 'static,
    ) -> jmethodID {
        let id = self.add_method(name, sig, is_static);
        self.method_impls.insert(id as usize, Box::new(body));
        id
    }

    pub fn field_value(&self, obj: jobject, field: jfieldID) -> Option<jvalue> {
        self.field_values
            .get(&(self.identity(obj), field as usize))
            .copied()
    }

    pub fn string_contents(&self, s: jstring) -> Option<&[u8]> {
        self.strings.get(&self.identity(s)).map(Vec::as_slice)
    }

    pub fn add_string(&mut self, modified_utf8: &[u8]) -> jstring {
        let s = self.fresh();
        self.strings.insert(s as usize, modified_utf8.to_vec());
        s
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn count_where(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&mut self, call: Call) {
        if self.pinned.is_some() && !matches!(call, Call::Unpin(_)) {
            panic!("{:?} issued while an array is pinned", call);
        }
        self.calls.push(call);
    }

    fn invoke(&mut self, family: Family, method: jmethodID, args: &[jvalue], ret: ReturnKind) -> jvalue {
        self.record(Call::Invoke { family, ret });
        self.last_args = args.to_vec();
        match self.method_impls.get_mut(&(method as usize)) {
            Some(body) => body(args),
            None => jvalue::default(),
        }
    }

    fn array_mut(&mut self, array: jarray) -> &mut FakeArray {
        let id = self.identity(array);
        match self.arrays.get_mut(&id) {
            Some(a) => a,
            None => panic!("{:?} is not a primitive array", array),
        }
    }
}

fn text(s: &CStr) -> String {
    s.to_string_lossy().into_owned()
}

impl Boundary for FakeBoundary {
    fn find_class(&mut self, name: &CStr) -> jclass {
        let name = text(name);
        self.record(Call::FindClass(name.clone()));
        match self.classes.get(&name).copied() {
            Some(class) => self.reference_to(class),
            None => {
                self.pending = true;
                ptr::null_mut()
            }
        }
    }

    fn get_object_class(&mut self, obj: jobject) -> jclass {
        self.record(Call::GetObjectClass);
        match self.object_classes.get(&self.identity(obj)).copied() {
            Some(class) => self.reference_to(class),
            None => ptr::null_mut(),
        }
    }

    fn is_instance_of(&mut self, obj: jobject, class: jclass) -> bool {
        self.record(Call::IsInstanceOf);
        let key = (self.identity(obj), self.identity(class));
        self.instances.contains(&key)
    }

    fn is_same_object(&mut self, a: jobject, b: jobject) -> bool {
        self.record(Call::IsSameObject);
        self.identity(a) == self.identity(b)
    }

    fn get_field_id(&mut self, _class: jclass, name: &CStr, sig: &CStr, is_static: bool) -> jfieldID {
        let key = (text(name), text(sig), is_static);
        self.record(Call::GetFieldId {
            name: key.0.clone(),
            sig: key.1.clone(),
            is_static,
        });
        match self.fields.get(&key) {
            Some(&id) => id,
            None => {
                self.pending = true;
                ptr::null_mut()
            }
        }
    }

    fn get_method_id(&mut self, _class: jclass, name: &CStr, sig: &CStr, is_static: bool) -> jmethodID {
        let key = (text(name), text(sig), is_static);
        self.record(Call::GetMethodId {
            name: key.0.clone(),
            sig: key.1.clone(),
            is_static,
        });
        match self.methods.get(&key) {
            Some(&id) => id,
            None => {
                self.pending = true;
                ptr::null_mut()
            }
        }
    }

    fn call_method(&mut self, _obj: jobject, method: jmethodID, args: &[jvalue], ret: ReturnKind) -> jvalue {
        self.invoke(Family::Virtual, method, args, ret)
    }

    fn call_nonvirtual_method(
        &mut self,
        _obj: jobject,
        _class: jclass,
        method: jmethodID,
        args: &[jvalue],
        ret: ReturnKind,
    ) -> jvalue {
        self.invoke(Family::NonVirtual, method, args, ret)
    }

    fn call_static_method(&mut self, _class: jclass, method: jmethodID, args: &[jvalue], ret: ReturnKind) -> jvalue {
        self.invoke(Family::Static, method, args, ret)
    }

    fn new_object(&mut self, class: jclass, ctor: jmethodID, args: &[jvalue]) -> jobject {
        self.record(Call::NewObject);
        self.last_args = args.to_vec();
        if let Some(body) = self.method_impls.get_mut(&(ctor as usize)) {
            body(args);
        }
        self.add_object(class)
    }

    fn get_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind) -> jvalue {
        self.record(Call::GetField { kind, is_static: false });
        self.field_value(obj, field).unwrap_or_default()
    }

    fn set_field(&mut self, obj: jobject, field: jfieldID, kind: ReturnKind, value: jvalue) {
        self.record(Call::SetField { kind, is_static: false });
        let key = (self.identity(obj), field as usize);
        self.field_values.insert(key, value);
    }

    fn get_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind) -> jvalue {
        self.record(Call::GetField { kind, is_static: true });
        self.field_value(class, field).unwrap_or_default()
    }

    fn set_static_field(&mut self, class: jclass, field: jfieldID, kind: ReturnKind, value: jvalue) {
        self.record(Call::SetField { kind, is_static: true });
        let key = (self.identity(class), field as usize);
        self.field_values.insert(key, value);
    }

    fn new_global_ref(&mut self, obj: jobject) -> jobject {
        self.record(Call::NewRef(RefKind::Global));
        if self.refuse_refs {
            ptr::null_mut()
        } else {
            self.reference_to(obj)
        }
    }

    fn delete_global_ref(&mut self, obj: jobject) {
        self.record(Call::DeleteRef(RefKind::Global));
        self.deleted.push(obj);
    }

    fn new_local_ref(&mut self, obj: jobject) -> jobject {
        self.record(Call::NewRef(RefKind::Local));
        if self.refuse_refs {
            ptr::null_mut()
        } else {
            self.reference_to(obj)
        }
    }

    fn delete_local_ref(&mut self, obj: jobject) {
        self.record(Call::DeleteRef(RefKind::Local));
        self.deleted.push(obj);
    }

    fn new_weak_global_ref(&mut self, obj: jobject) -> jobject {
        self.record(Call::NewRef(RefKind::Weak));
        if self.refuse_refs {
            ptr::null_mut()
        } else {
            self.reference_to(obj)
        }
    }

    fn delete_weak_global_ref(&mut self, obj: jobject) {
        self.record(Call::DeleteRef(RefKind::Weak));
        self.deleted.push(obj);
    }

    fn new_string_utf(&mut self, utf: &CStr) -> jstring {
        self.record(Call::NewString(text(utf)));
        self.add_string(utf.to_bytes())
    }

    fn get_string_utf_chars(&mut self, s: jstring) -> *const c_char {
        self.record(Call::GetStringChars);
        let Some(bytes) = self.strings.get(&self.identity(s)) else {
            return ptr::null();
        };
        let chars = CString::new(bytes.clone()).unwrap_or_default();
        let raw = chars.as_ptr();
        self.borrowed_chars.insert(raw as usize, chars);
        raw
    }

    fn release_string_utf_chars(&mut self, _s: jstring, chars: *const c_char) {
        self.record(Call::ReleaseStringChars);
        assert!(
            self.borrowed_chars.remove(&(chars as usize)).is_some(),
            "released chars that were not borrowed"
        );
    }

    fn get_string_length(&mut self, s: jstring) -> jsize {
        self.record(Call::GetStringLength);
        let bytes = self.strings.get(&self.identity(s)).cloned().unwrap_or_default();
        // Fake strings hold BMP text only.
        String::from_utf8_lossy(&bytes).encode_utf16().count() as jsize
    }

    fn get_array_length(&mut self, array: jarray) -> jsize {
        self.record(Call::GetArrayLength);
        let id = self.identity(array);
        if let Some(a) = self.arrays.get(&id) {
            return a.len as jsize;
        }
        self.object_arrays
            .get(&id)
            .map_or(0, |a| a.len() as jsize)
    }

    fn new_primitive_array(&mut self, kind: PrimitiveKind, len: jsize) -> jarray {
        self.record(Call::NewPrimitiveArray(kind, len));
        let len = len as usize;
        let bytes = kind.size() * len;
        let array = self.fresh();
        self.arrays.insert(
            array as usize,
            FakeArray {
                kind,
                len,
                words: vec![0; bytes.div_ceil(8).max(1)],
            },
        );
        array
    }

    fn new_object_array(&mut self, len: jsize, _element_class: jclass, init: jobject) -> jarray {
        self.record(Call::NewObjectArray(len));
        let array = self.fresh();
        self.object_arrays
            .insert(array as usize, vec![init; len as usize]);
        array
    }

    fn get_object_array_element(&mut self, array: jarray, index: jsize) -> jobject {
        self.record(Call::GetObjectArrayElement(index));
        self.object_arrays[&self.identity(array)][index as usize]
    }

    fn set_object_array_element(&mut self, array: jarray, index: jsize, value: jobject) {
        self.record(Call::SetObjectArrayElement(index));
        let id = self.identity(array);
        if let Some(elements) = self.object_arrays.get_mut(&id) {
            elements[index as usize] = value;
        }
    }

    fn get_primitive_array_critical(&mut self, array: jarray) -> *mut c_void {
        self.record(Call::Pin);
        let elems = self.array_mut(array).words.as_mut_ptr().cast::<c_void>();
        self.pinned = Some(self.identity(array));
        elems
    }

    fn release_primitive_array_critical(&mut self, array: jarray, elems: *mut c_void, mode: jint) {
        self.record(Call::Unpin(mode));
        let id = self.identity(array);
        assert_eq!(self.pinned.take(), Some(id), "unpin without matching pin");
        let expected = self.array_mut(array).words.as_mut_ptr().cast::<c_void>();
        assert_eq!(elems, expected, "unpin with a foreign pointer");
    }

    fn register_natives(&mut self, _class: jclass, methods: &[JNINativeMethod]) -> jint {
        let entries = methods
            .iter()
            .map(|m| unsafe {
                (
                    CStr::from_ptr(m.name).to_string_lossy().into_owned(),
                    CStr::from_ptr(m.signature).to_string_lossy().into_owned(),
                )
            })
            .collect();
        self.record(Call::RegisterNatives(entries));
        if self.register_status != JNI_OK {
            self.pending = true;
        }
        self.register_status
    }

    fn unregister_natives(&mut self, _class: jclass) -> jint {
        self.record(Call::UnregisterNatives);
        JNI_OK
    }

    fn exception_check(&mut self) -> bool {
        self.record(Call::ExceptionCheck);
        self.pending
    }

    fn exception_occurred(&mut self) -> jthrowable {
        self.record(Call::ExceptionOccurred);
        if self.pending {
            self.throwable
        } else {
            ptr::null_mut()
        }
    }

    fn exception_describe(&mut self) {
        self.record(Call::ExceptionDescribe);
    }

    fn exception_clear(&mut self) {
        self.record(Call::ExceptionClear);
        self.pending = false;
    }

    fn throw_new(&mut self, class: jclass, message: &CStr) -> jint {
        self.record(Call::ThrowNew(text(message)));
        self.thrown.push(message.to_bytes().to_vec());
        if class.is_null() {
            return JNI_ERR;
        }
        self.pending = true;
        JNI_OK
    }

    fn get_java_vm(&mut self) -> *mut JavaVM {
        self.record(Call::GetJavaVm);
        ptr::null_mut()
    }
}

impl FakeBoundary {
    pub fn array_kind(&self, array: jarray) -> Option<PrimitiveKind> {
        self.arrays.get(&self.identity(array)).map(|a| a.kind)
    }
}
