//! Invocation API: starting a VM from native code
//!
//! The runtime library is loaded at run time from a caller-supplied path.
//! Loaded libraries stay resident for the life of the process, since a VM
//! cannot outlive the code that implements it.

use std::ffi::{c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;

use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use jbridge_sys::{
    jint, jsize, JNI_CreateJavaVM_t, JNI_GetCreatedJavaVMs_t, JavaVM, JavaVMInitArgs,
    JavaVMOption, JNI_CREATE_JAVA_VM, JNI_FALSE, JNI_GET_CREATED_JAVA_VMS, JNI_OK, JNI_TRUE,
    JNI_VERSION_1_8,
};
use libloading::{Library, Symbol};
use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::error::{JniError, JniResult};
use crate::vm::{register_vm, JavaVm};

static LIBRARIES: Lazy<DashMap<PathBuf, Library>> = Lazy::new(DashMap::new);

/// Runs in place of the runtime's own process exit, with the exit code.
pub type ExitHook = unsafe extern "system" fn(code: jint);

/// Runs when the runtime aborts.
pub type AbortHook = unsafe extern "system" fn();

const EXIT_OPTION: &CStr = c"exit";
const ABORT_OPTION: &CStr = c"abort";

/// VM creation options
#[derive(Debug, Clone)]
pub struct VmOptions {
    /// Raw option strings such as `-Xmx512m` or `-Djava.class.path=...`
    pub options: Vec<String>,

    /// Skip options the runtime does not recognize instead of failing
    pub ignore_unrecognized: bool,

    /// Requested interface version
    pub version: jint,

    /// Passed as the `exit` option's extra info
    pub exit_hook: Option<ExitHook>,

    /// Passed as the `abort` option's extra info
    pub abort_hook: Option<AbortHook>,
}

impl Default for VmOptions {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            ignore_unrecognized: false,
            version: JNI_VERSION_1_8,
            exit_hook: None,
            abort_hook: None,
        }
    }
}

/// Option entries ready for `JavaVMInitArgs`. The entries point into
/// `strings`, so both live and die together.
struct RawOptions {
    _strings: Vec<CString>,
    entries: Vec<JavaVMOption>,
}

impl VmOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn class_path<P: AsRef<Path>>(self, entries: impl IntoIterator<Item = P>) -> Self {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let joined = entries
            .into_iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(separator);
        self.option(format!("-Djava.class.path={}", joined))
    }

    pub fn ignore_unrecognized(mut self, ignore: bool) -> Self {
        self.ignore_unrecognized = ignore;
        self
    }

    pub fn version(mut self, version: jint) -> Self {
        self.version = version;
        self
    }

    /// Have the runtime call `hook` instead of exiting the process.
    pub fn on_exit(mut self, hook: ExitHook) -> Self {
        self.exit_hook = Some(hook);
        self
    }

    /// Have the runtime call `hook` when it aborts.
    pub fn on_abort(mut self, hook: AbortHook) -> Self {
        self.abort_hook = Some(hook);
        self
    }

    /// String options in order, then the `exit` and `abort` hooks.
    fn to_raw(&self) -> JniResult<RawOptions> {
        let strings = self
            .options
            .iter()
            .map(|o| CString::new(o.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let mut entries: Vec<JavaVMOption> = strings
            .iter()
            .map(|s| JavaVMOption {
                optionString: s.as_ptr() as *mut _,
                extraInfo: ptr::null_mut(),
            })
            .collect();
        if let Some(hook) = self.exit_hook {
            entries.push(JavaVMOption {
                optionString: EXIT_OPTION.as_ptr() as *mut _,
                extraInfo: hook as *mut c_void,
            });
        }
        if let Some(hook) = self.abort_hook {
            entries.push(JavaVMOption {
                optionString: ABORT_OPTION.as_ptr() as *mut _,
                extraInfo: hook as *mut c_void,
            });
        }
        Ok(RawOptions {
            _strings: strings,
            entries,
        })
    }
}

fn library(path: &Path) -> JniResult<Ref<'static, PathBuf, Library>> {
    if let Some(lib) = LIBRARIES.get(path) {
        return Ok(lib);
    }
    // SAFETY: loading runs the library's initializers; the caller chose a
    // runtime library to load.
    let lib = unsafe { Library::new(path) }.map_err(|e| {
        error!(path = %path.display(), error = %e, "failed to load runtime library");
        JniError::LibraryLoad(format!("{}: {}", path.display(), e))
    })?;
    debug!(path = %path.display(), "loaded runtime library");
    LIBRARIES.entry(path.to_path_buf()).or_insert(lib);
    LIBRARIES
        .get(path)
        .ok_or_else(|| JniError::LibraryLoad(path.display().to_string()))
}

fn symbol_error(path: &Path, name: &[u8], e: libloading::Error) -> JniError {
    let name = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned();
    JniError::LibraryLoad(format!("{}: missing {}: {}", path.display(), name, e))
}

impl JavaVm {
    /// Load the runtime library at `library_path` and start a VM. The
    /// calling thread becomes attached and the VM is registered as the
    /// process VM.
    pub fn create(library_path: impl AsRef<Path>, options: &VmOptions) -> JniResult<JavaVm> {
        let path = library_path.as_ref();
        let lib = library(path)?;
        // SAFETY: the symbol has the invocation API's documented signature.
        let create: Symbol<JNI_CreateJavaVM_t> = unsafe { lib.get(JNI_CREATE_JAVA_VM) }
            .map_err(|e| symbol_error(path, JNI_CREATE_JAVA_VM, e))?;

        let mut raw_options = options.to_raw()?;
        let mut args = JavaVMInitArgs {
            version: options.version,
            nOptions: raw_options.entries.len() as jint,
            options: raw_options.entries.as_mut_ptr(),
            ignoreUnrecognized: if options.ignore_unrecognized {
                JNI_TRUE
            } else {
                JNI_FALSE
            },
        };

        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut env: *mut c_void = ptr::null_mut();
        // SAFETY: every pointer in `args` outlives the call.
        let status = unsafe {
            create(
                &mut vm,
                &mut env,
                (&mut args as *mut JavaVMInitArgs).cast::<c_void>(),
            )
        };
        if status != JNI_OK {
            error!(status, "JNI_CreateJavaVM failed");
            return Err(JniError::VmFailed(status));
        }
        // SAFETY: creation succeeded, so `vm` is live.
        let vm = unsafe { JavaVm::from_raw(vm) }
            .ok_or_else(|| JniError::AllocationFailed("VM".to_string()))?;
        register_vm(vm);
        debug!(options = raw_options.entries.len(), "created VM");
        Ok(vm)
    }

    /// VMs already running in this process, as reported by the library at
    /// `library_path`.
    pub fn created_vms(library_path: impl AsRef<Path>) -> JniResult<Vec<JavaVm>> {
        let path = library_path.as_ref();
        let lib = library(path)?;
        // SAFETY: the symbol has the invocation API's documented signature.
        let get_created: Symbol<JNI_GetCreatedJavaVMs_t> =
            unsafe { lib.get(JNI_GET_CREATED_JAVA_VMS) }
                .map_err(|e| symbol_error(path, JNI_GET_CREATED_JAVA_VMS, e))?;

        let mut count: jsize = 0;
        // SAFETY: a zero-length buffer is never written.
        let status = unsafe { get_created(ptr::null_mut(), 0, &mut count) };
        if status != JNI_OK {
            return Err(JniError::VmFailed(status));
        }
        if count <= 0 {
            return Ok(Vec::new());
        }

        let mut buffer: Vec<*mut JavaVM> = vec![ptr::null_mut(); count as usize];
        // SAFETY: `buffer` holds `count` slots.
        let status = unsafe { get_created(buffer.as_mut_ptr(), count, &mut count) };
        if status != JNI_OK {
            return Err(JniError::VmFailed(status));
        }
        buffer.truncate(count.max(0) as usize);
        // SAFETY: the runtime reported these VMs as live.
        Ok(buffer
            .into_iter()
            .filter_map(|raw| unsafe { JavaVm::from_raw(raw) })
            .collect())
    }
}
