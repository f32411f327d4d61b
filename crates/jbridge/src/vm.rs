//! VM handle, thread attachment and the load/unload hooks
//!
//! The VM handle is process-wide and registered once, normally by
//! `JNI_OnLoad`. Environments are per thread: [`with_env`] attaches the
//! calling thread for the duration of a closure and detaches it afterwards
//! unless the thread was already attached on entry.

use std::cell::Cell;
use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::{self, NonNull};

use jbridge_sys::{
    jint, JNIEnv, JNIInvokeInterface_, JavaVM, JavaVMAttachArgs, JNI_EDETACHED, JNI_ERR, JNI_OK,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::config::JniConfig;
use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::jni_env::JniEnv;

// ============================================================================
// Process-wide state
// ============================================================================

static VM: OnceCell<JavaVm> = OnceCell::new();
static CONFIG: OnceCell<JniConfig> = OnceCell::new();

type TeardownFn = Box<dyn FnOnce(&mut Env<'_>) + Send>;
static TEARDOWN: Mutex<Vec<TeardownFn>> = parking_lot::const_mutex(Vec::new());

thread_local! {
    /// Set while an `Env` is live on this thread.
    static IN_SCOPE: Cell<bool> = const { Cell::new(false) };
}

/// Install the process-wide configuration. Returns `false` if a
/// configuration was already installed or read.
pub fn configure(config: JniConfig) -> bool {
    CONFIG.set(config).is_ok()
}

/// The installed configuration, or [`JniConfig::from_env`] if none was.
pub fn config() -> &'static JniConfig {
    CONFIG.get_or_init(JniConfig::from_env)
}

/// Record the process's VM. The first registration wins; registering the
/// same VM again is a no-op. Returns whether `vm` is now the registered VM.
pub fn register_vm(vm: JavaVm) -> bool {
    let registered = VM.get_or_init(|| vm);
    if registered.raw != vm.raw {
        warn!(existing = ?registered.raw, rejected = ?vm.raw, "a different VM is already registered");
        return false;
    }
    true
}

pub fn registered_vm() -> Option<JavaVm> {
    VM.get().copied()
}

// ============================================================================
// JavaVm
// ============================================================================

/// Handle to a running VM. Valid on every thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JavaVm {
    raw: NonNull<JavaVM>,
}

// SAFETY: the invoke interface is documented as callable from any thread.
unsafe impl Send for JavaVm {}
unsafe impl Sync for JavaVm {}

#[cold]
#[inline(never)]
fn missing_entry(name: &'static str) -> ! {
    panic!("invoke interface has no entry for {}", name)
}

macro_rules! invoke {
    ($self:ident . $slot:ident ( $($arg:expr),* $(,)? )) => {{
        let f = match $self.table().$slot {
            Some(f) => f,
            None => missing_entry(stringify!($slot)),
        };
        // SAFETY: the table belongs to a live VM and the arguments follow
        // the slot's ABI signature.
        unsafe { f($self.raw.as_ptr() $(, $arg)*) }
    }};
}

impl JavaVm {
    /// # Safety
    ///
    /// `raw` must be null or point at a live VM that outlives every use of
    /// the returned handle.
    pub unsafe fn from_raw(raw: *mut JavaVM) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    pub fn as_raw(&self) -> *mut JavaVM {
        self.raw.as_ptr()
    }

    fn table(&self) -> &JNIInvokeInterface_ {
        // SAFETY: from_raw's contract guarantees a live table.
        unsafe { &**self.raw.as_ptr() }
    }

    /// The current thread's environment, or `None` if it is not attached.
    pub fn get_env(&self, version: jint) -> JniResult<Option<JniEnv>> {
        let mut env: *mut c_void = ptr::null_mut();
        match invoke!(self.GetEnv(&mut env, version)) {
            // SAFETY: GetEnv succeeded, so `env` is this thread's environment.
            JNI_OK => Ok(unsafe { JniEnv::from_raw(env.cast::<JNIEnv>()) }),
            JNI_EDETACHED => Ok(None),
            status => Err(JniError::AttachFailed(status)),
        }
    }

    /// Attach the current thread, reusing an existing attachment. Fails with
    /// `ContextInUse` if an `Env` is already live on this thread.
    pub fn attach(&self) -> JniResult<AttachGuard> {
        if IN_SCOPE.with(Cell::get) {
            return Err(JniError::ContextInUse);
        }
        let config = config();
        let (env, owns_attachment) = match self.get_env(config.version)? {
            Some(env) => (env, false),
            None => (self.attach_current_thread(config)?, true),
        };
        IN_SCOPE.with(|s| s.set(true));
        Ok(AttachGuard {
            vm: *self,
            env: Some(env),
            owns_attachment,
            _not_send: PhantomData,
        })
    }

    fn attach_current_thread(&self, config: &JniConfig) -> JniResult<JniEnv> {
        let name = match &config.thread_name {
            Some(name) => Some(CString::new(name.as_str())?),
            None => None,
        };
        let mut args = JavaVMAttachArgs {
            version: config.version,
            name: name.as_ref().map_or(ptr::null_mut(), |n| n.as_ptr() as *mut _),
            group: ptr::null_mut(),
        };
        let args_ptr = (&mut args as *mut JavaVMAttachArgs).cast::<c_void>();
        let mut env: *mut c_void = ptr::null_mut();
        let status = if config.daemon {
            invoke!(self.AttachCurrentThreadAsDaemon(&mut env, args_ptr))
        } else {
            invoke!(self.AttachCurrentThread(&mut env, args_ptr))
        };
        if status != JNI_OK {
            error!(status, "failed to attach thread");
            return Err(JniError::AttachFailed(status));
        }
        trace!(daemon = config.daemon, name = ?config.thread_name, "attached thread");
        // SAFETY: attach succeeded, so `env` is this thread's environment.
        unsafe { JniEnv::from_raw(env.cast::<JNIEnv>()) }.ok_or(JniError::AttachFailed(status))
    }

    /// Run `f` with an attached environment. See [`with_env`].
    pub fn with_env<R>(&self, f: impl FnOnce(&mut Env<'_>) -> R) -> JniResult<R> {
        let mut guard = self.attach()?;
        let mut env = guard.env();
        Ok(f(&mut env))
    }

    /// Tear the VM down. Blocks until every non-daemon thread has exited.
    pub fn destroy(self) -> JniResult<()> {
        let status = invoke!(self.DestroyJavaVM());
        if status == JNI_OK {
            debug!(vm = ?self.raw, "destroyed VM");
            Ok(())
        } else {
            Err(JniError::VmFailed(status))
        }
    }
}

// ============================================================================
// AttachGuard
// ============================================================================

/// An attach scope on the current thread. Detaches on drop if the scope
/// performed the attach.
pub struct AttachGuard {
    vm: JavaVm,
    /// `None` once a reattach in `while_detached` has failed.
    env: Option<JniEnv>,
    owns_attachment: bool,
    _not_send: PhantomData<*mut ()>,
}

impl AttachGuard {
    /// # Panics
    ///
    /// Panics if [`while_detached`](Self::while_detached) could not attach
    /// the thread again.
    #[track_caller]
    pub fn env(&mut self) -> Env<'_> {
        match &mut self.env {
            Some(env) => Env::new(env),
            None => panic!("thread was not reattached after a detached section"),
        }
    }

    /// Detach the thread while `f` runs and attach it again afterwards, also
    /// when `f` unwinds. Meant for long blocking work that must not hold up
    /// the runtime. No `Env` from this guard can be live during `f`.
    ///
    /// Fails with `DetachFailed` without running `f` if the runtime refuses
    /// to detach, and with `AttachFailed` if it refuses to attach again.
    pub fn while_detached<R>(&mut self, f: impl FnOnce() -> R) -> JniResult<R> {
        let vm = self.vm;
        let status = invoke!(vm.DetachCurrentThread());
        if status != JNI_OK {
            warn!(status, "failed to detach thread");
            return Err(JniError::DetachFailed(status));
        }
        trace!("detached thread");
        IN_SCOPE.with(|s| s.set(false));

        let outcome = panic::catch_unwind(AssertUnwindSafe(f));

        let reattached = vm.attach_current_thread(config());
        IN_SCOPE.with(|s| s.set(true));
        let reattached = match reattached {
            Ok(env) => {
                self.env = Some(env);
                Ok(())
            }
            Err(e) => {
                self.env = None;
                self.owns_attachment = false;
                Err(e)
            }
        };
        match outcome {
            Ok(value) => reattached.map(|()| value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Whether dropping the guard detaches the thread.
    pub fn owns_attachment(&self) -> bool {
        self.owns_attachment
    }
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        IN_SCOPE.with(|s| s.set(false));
        if self.owns_attachment {
            let vm = self.vm;
            let status = invoke!(vm.DetachCurrentThread());
            if status == JNI_OK {
                trace!("detached thread");
            } else {
                warn!(status, "failed to detach thread");
            }
        }
    }
}

impl std::fmt::Debug for AttachGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachGuard")
            .field("vm", &self.vm)
            .field("owns_attachment", &self.owns_attachment)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Scoped entry points
// ============================================================================

/// Attach to the registered VM.
pub fn attach() -> JniResult<AttachGuard> {
    registered_vm().ok_or(JniError::VmNotRegistered)?.attach()
}

/// Run `f` on an attached environment of the registered VM.
///
/// The thread is attached before `f` runs and detached after it returns or
/// unwinds. A thread that was already attached on entry stays attached.
pub fn with_env<R>(f: impl FnOnce(&mut Env<'_>) -> R) -> JniResult<R> {
    registered_vm().ok_or(JniError::VmNotRegistered)?.with_env(f)
}

/// Run `f` with the environment the runtime passed into a native callback.
/// Returns `None` for a null pointer. Never detaches.
///
/// # Safety
///
/// `raw` must be the environment pointer of the current call.
pub unsafe fn callback_scope<R>(raw: *mut JNIEnv, f: impl FnOnce(&mut Env<'_>) -> R) -> Option<R> {
    let mut jni = JniEnv::from_raw(raw)?;
    let _scope = ScopeFlag::enter();
    let mut env = Env::new(&mut jni);
    Some(f(&mut env))
}

/// Marks the thread as holding an `Env` and restores the previous state on
/// exit, including unwinding.
struct ScopeFlag {
    previous: bool,
}

impl ScopeFlag {
    fn enter() -> Self {
        Self {
            previous: IN_SCOPE.with(|s| s.replace(true)),
        }
    }
}

impl Drop for ScopeFlag {
    fn drop(&mut self) {
        let previous = self.previous;
        IN_SCOPE.with(|s| s.set(previous));
    }
}

// ============================================================================
// Load / unload hooks
// ============================================================================

/// Body of `JNI_OnLoad` when there is no initializer.
///
/// # Safety
///
/// `raw` must be the VM pointer the runtime passed to `JNI_OnLoad`.
pub unsafe fn on_load(raw: *mut JavaVM) -> jint {
    on_load_with(raw, |_| Ok(()))
}

/// Body of `JNI_OnLoad`: register the VM, run `init` with the loading
/// thread's environment and acknowledge the configured version. Returns
/// `JNI_ERR` without running `init` if another VM is already registered or
/// no environment is available, and `JNI_ERR` if `init` fails or panics.
///
/// # Safety
///
/// `raw` must be the VM pointer the runtime passed to `JNI_OnLoad`.
pub unsafe fn on_load_with(raw: *mut JavaVM, init: impl FnOnce(&mut Env<'_>) -> JniResult<()>) -> jint {
    let Some(vm) = JavaVm::from_raw(raw) else {
        error!("JNI_OnLoad received a null VM");
        return JNI_ERR;
    };
    if !register_vm(vm) {
        error!(vm = ?vm.raw, "JNI_OnLoad received a VM other than the registered one");
        return JNI_ERR;
    }
    let version = config().version;

    let env = match vm.get_env(version) {
        Ok(Some(env)) => env,
        Ok(None) => {
            error!("JNI_OnLoad ran on a detached thread");
            return JNI_ERR;
        }
        Err(e) => {
            error!(error = %e, "GetEnv failed during load");
            return JNI_ERR;
        }
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback_scope(env.as_raw(), init)));
    match outcome {
        Ok(Some(Ok(()))) => {
            debug!(version, "library loaded");
            version
        }
        Ok(Some(Err(e))) => {
            error!(error = %e, "load initializer failed");
            JNI_ERR
        }
        Ok(None) => JNI_ERR,
        Err(payload) => {
            error!(panic = %panic_message(&*payload), "load initializer panicked");
            JNI_ERR
        }
    }
}

/// Register a callback for `JNI_OnUnload`. Callbacks run once each, in
/// registration order.
pub fn on_teardown(f: impl FnOnce(&mut Env<'_>) + Send + 'static) {
    TEARDOWN.lock().push(Box::new(f));
}

/// Body of `JNI_OnUnload`: run and drop the teardown callbacks. A panicking
/// callback is logged and the rest still run.
///
/// # Safety
///
/// `raw` must be the VM pointer the runtime passed to `JNI_OnUnload`.
pub unsafe fn on_unload(raw: *mut JavaVM) {
    let callbacks = std::mem::take(&mut *TEARDOWN.lock());
    if callbacks.is_empty() {
        return;
    }
    let env = JavaVm::from_raw(raw).and_then(|vm| vm.get_env(config().version).ok().flatten());
    let Some(env) = env else {
        warn!(count = callbacks.len(), "no environment during unload; teardown callbacks skipped");
        return;
    };
    callback_scope(env.as_raw(), |env| {
        for (index, callback) in callbacks.into_iter().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(env))) {
                warn!(index, panic = %panic_message(&*payload), "teardown callback panicked");
            }
        }
    });
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
