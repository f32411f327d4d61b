//! Attach scopes and load hooks against an in-process invoke interface

use std::cell::{Cell, RefCell};
use std::ffi::{c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::Arc;
use std::thread;

use jbridge::sys::{
    jint, JNIEnv, JNIInvokeInterface_, JNINativeInterface_, JavaVM, JavaVMAttachArgs,
    JNI_EDETACHED, JNI_ERR, JNI_OK,
};
use jbridge::{vm, JavaVm, JniConfig, JniError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

// ============================================================================
// Fake invoke interface
// ============================================================================

thread_local! {
    static ATTACHED: Cell<bool> = const { Cell::new(false) };
    static ATTACHES: Cell<usize> = const { Cell::new(0) };
    static DETACHES: Cell<usize> = const { Cell::new(0) };
    static THREAD_NAME: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Leaked VM and environment pointers, stored as addresses so the statics
/// are `Sync`.
struct FakeVm {
    vm: usize,
    env: usize,
}

static FAKE: Lazy<FakeVm> = Lazy::new(|| {
    let table = Box::leak(Box::new(JNIInvokeInterface_ {
        reserved0: ptr::null_mut(),
        reserved1: ptr::null_mut(),
        reserved2: ptr::null_mut(),
        DestroyJavaVM: Some(destroy_vm),
        AttachCurrentThread: Some(attach_thread),
        DetachCurrentThread: Some(detach_thread),
        GetEnv: Some(get_env),
        AttachCurrentThreadAsDaemon: Some(attach_thread),
    }));
    let vm: &mut JavaVM = Box::leak(Box::new(table as *const JNIInvokeInterface_));
    // Nothing in these tests calls through the environment's table.
    let env: &mut JNIEnv = Box::leak(Box::new(ptr::null::<JNINativeInterface_>()));
    FakeVm {
        vm: vm as *mut JavaVM as usize,
        env: env as *mut JNIEnv as usize,
    }
});

fn raw_vm() -> *mut JavaVM {
    FAKE.vm as *mut JavaVM
}

fn raw_env() -> *mut JNIEnv {
    FAKE.env as *mut JNIEnv
}

fn fake_vm() -> JavaVm {
    vm::configure(JniConfig::new().with_thread_name("jbridge-test"));
    unsafe { JavaVm::from_raw(raw_vm()) }.unwrap()
}

unsafe extern "system" fn destroy_vm(_vm: *mut JavaVM) -> jint {
    JNI_OK
}

unsafe extern "system" fn get_env(_vm: *mut JavaVM, penv: *mut *mut c_void, _version: jint) -> jint {
    if ATTACHED.get() {
        unsafe { *penv = raw_env().cast() };
        JNI_OK
    } else {
        unsafe { *penv = ptr::null_mut() };
        JNI_EDETACHED
    }
}

unsafe extern "system" fn attach_thread(
    _vm: *mut JavaVM,
    penv: *mut *mut c_void,
    args: *mut c_void,
) -> jint {
    let args = unsafe { &*args.cast::<JavaVMAttachArgs>() };
    let name = if args.name.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(args.name) }.to_string_lossy().into_owned())
    };
    THREAD_NAME.with(|n| *n.borrow_mut() = name);
    ATTACHED.set(true);
    ATTACHES.set(ATTACHES.get() + 1);
    unsafe { *penv = raw_env().cast() };
    JNI_OK
}

unsafe extern "system" fn detach_thread(_vm: *mut JavaVM) -> jint {
    if !ATTACHED.replace(false) {
        return JNI_EDETACHED;
    }
    DETACHES.set(DETACHES.get() + 1);
    JNI_OK
}

// ============================================================================
// Attach Scope Tests
// ============================================================================

#[test]
fn test_scope_attaches_and_detaches_once() {
    let jvm = fake_vm();
    {
        let mut guard = jvm.attach().unwrap();
        assert!(guard.owns_attachment());
        assert!(ATTACHED.get());
        let _env = guard.env();
    }

    assert_eq!(ATTACHES.get(), 1);
    assert_eq!(DETACHES.get(), 1);
    assert!(!ATTACHED.get());
    assert_eq!(
        THREAD_NAME.with(|n| n.borrow().clone()).as_deref(),
        Some("jbridge-test")
    );
}

#[test]
fn test_already_attached_thread_stays_attached() {
    let jvm = fake_vm();
    ATTACHED.set(true);

    let owned = jvm.with_env(|_| ()).and_then(|()| jvm.attach().map(|g| g.owns_attachment()));
    assert_eq!(owned, Ok(false));
    assert_eq!(ATTACHES.get(), 0);
    assert_eq!(DETACHES.get(), 0);
    assert!(ATTACHED.get());
}

#[test]
fn test_nested_scope_is_context_in_use() {
    let jvm = fake_vm();
    let guard = jvm.attach().unwrap();
    assert_eq!(jvm.attach().unwrap_err(), JniError::ContextInUse);
    assert_eq!(jvm.with_env(|_| ()), Err(JniError::ContextInUse));
    drop(guard);

    assert!(jvm.attach().is_ok());
    assert_eq!(ATTACHES.get(), 2);
    assert_eq!(DETACHES.get(), 2);
}

#[test]
fn test_scope_detaches_after_panic() {
    let jvm = fake_vm();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| jvm.with_env::<()>(|_| panic!("boom"))));
    assert!(outcome.is_err());

    assert_eq!(DETACHES.get(), 1);
    assert!(!ATTACHED.get());
    // The scope flag was reset as well.
    assert!(jvm.attach().is_ok());
}

#[test]
fn test_callback_scope_nests_and_restores() {
    let jvm = fake_vm();
    let result = jvm.with_env(|_| {
        let inner = unsafe {
            vm::callback_scope(raw_env(), |_| jvm.attach().map(|_| ()))
        };
        let after = jvm.attach().map(|_| ());
        (inner, after)
    });

    let (inner, after) = result.unwrap();
    assert_eq!(inner, Some(Err(JniError::ContextInUse)));
    assert_eq!(after, Err(JniError::ContextInUse));
}

#[test]
fn test_detached_section_reattaches() {
    let jvm = fake_vm();
    let mut guard = jvm.attach().unwrap();

    let inside = guard
        .while_detached(|| {
            // Free to open a fresh scope while detached.
            let nested = jvm.with_env(|_| ATTACHED.get());
            (ATTACHED.get(), nested)
        })
        .unwrap();
    assert_eq!(inside, (false, Ok(true)));
    assert!(ATTACHED.get());
    assert!(guard.owns_attachment());
    {
        let _env = guard.env();
    }
    assert_eq!(jvm.attach().unwrap_err(), JniError::ContextInUse);
    drop(guard);

    assert_eq!(ATTACHES.get(), 3);
    assert_eq!(DETACHES.get(), 3);
    assert!(!ATTACHED.get());
}

#[test]
fn test_detached_section_reattaches_after_panic() {
    let jvm = fake_vm();
    let mut guard = jvm.attach().unwrap();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        guard.while_detached::<()>(|| panic!("blocking work failed"))
    }));
    assert!(outcome.is_err());
    assert!(ATTACHED.get());
    assert_eq!(ATTACHES.get(), 2);
    drop(guard);
    assert_eq!(DETACHES.get(), 2);
}

#[test]
fn test_refused_detach_skips_section() {
    let jvm = fake_vm();
    let mut guard = jvm.attach().unwrap();
    // Detached behind the guard's back, so the runtime refuses.
    ATTACHED.set(false);

    let mut ran = false;
    let result = guard.while_detached(|| ran = true);
    assert_eq!(result, Err(JniError::DetachFailed(JNI_EDETACHED)));
    assert!(!ran);
}

#[test]
fn test_registered_vm_scope() {
    let jvm = fake_vm();
    assert!(vm::register_vm(jvm));
    assert_eq!(vm::registered_vm(), Some(jvm));
    assert_eq!(vm::with_env(|_| 7), Ok(7));
    assert!(!ATTACHED.get());
}

#[test]
fn test_worker_threads_attach_independently() {
    let jvm = fake_vm();
    let _guard = jvm.attach().unwrap();

    let worker = thread::spawn(move || {
        let attached = jvm.with_env(|_| ATTACHED.get()).unwrap();
        (attached, ATTACHES.get(), DETACHES.get())
    });
    assert_eq!(worker.join().unwrap(), (true, 1, 1));
    assert!(ATTACHED.get());
}

// ============================================================================
// Load Hook Tests
// ============================================================================

#[test]
fn test_on_load_acknowledges_configured_version() {
    fake_vm();
    ATTACHED.set(true);
    let mut ran = false;

    let version = unsafe {
        vm::on_load_with(raw_vm(), |_| {
            ran = true;
            Ok(())
        })
    };

    assert!(ran);
    assert_eq!(version, vm::config().version);
    assert_eq!(vm::registered_vm().map(|v| v.as_raw()), Some(raw_vm()));
}

#[test]
fn test_on_load_rejects_second_vm() {
    assert!(vm::register_vm(fake_vm()));
    ATTACHED.set(true);
    // A second VM sharing the same invoke interface.
    let table = unsafe { *raw_vm() };
    let other: *mut JavaVM = Box::leak(Box::new(table));
    let mut ran = false;

    let status = unsafe {
        vm::on_load_with(other, |_| {
            ran = true;
            Ok(())
        })
    };

    assert_eq!(status, JNI_ERR);
    assert!(!ran);
    assert_eq!(vm::registered_vm().map(|v| v.as_raw()), Some(raw_vm()));
}

#[test]
fn test_on_load_failure_is_err() {
    fake_vm();
    ATTACHED.set(true);
    let failed = unsafe { vm::on_load_with(raw_vm(), |_| Err(JniError::Other("no".to_string()))) };
    let panicked = unsafe { vm::on_load_with(raw_vm(), |_| panic!("init exploded")) };

    assert_eq!(failed, JNI_ERR);
    assert_eq!(panicked, JNI_ERR);
}

#[test]
fn test_on_load_on_detached_thread_is_err() {
    fake_vm();
    let mut ran = false;
    let status = unsafe {
        vm::on_load_with(raw_vm(), |_| {
            ran = true;
            Ok(())
        })
    };
    assert_eq!(status, JNI_ERR);
    assert!(!ran);
}

#[test]
fn test_teardown_runs_each_callback_once_in_order() {
    fake_vm();
    ATTACHED.set(true);
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&order);
    vm::on_teardown(move |_| first.lock().push(1));
    vm::on_teardown(|_| panic!("teardown exploded"));
    let third = Arc::clone(&order);
    vm::on_teardown(move |_| third.lock().push(3));

    unsafe { vm::on_unload(raw_vm()) };
    assert_eq!(*order.lock(), [1, 3]);

    unsafe { vm::on_unload(raw_vm()) };
    assert_eq!(*order.lock(), [1, 3]);
}
