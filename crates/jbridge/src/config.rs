//! Process-wide settings for attaching threads

use jbridge_sys::{jint, JNI_VERSION_1_8};

/// Environment variable naming attached threads.
pub const ENV_THREAD_NAME: &str = "JBRIDGE_THREAD_NAME";
/// Environment variable selecting daemon attachment.
pub const ENV_DAEMON: &str = "JBRIDGE_DAEMON";
/// Environment variable turning on `ExceptionDescribe` for pending errors.
pub const ENV_DESCRIBE_EXCEPTIONS: &str = "JBRIDGE_DESCRIBE_EXCEPTIONS";

/// Attach configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JniConfig {
    /// Interface version requested from `GetEnv` and returned by `JNI_OnLoad`
    pub version: jint,

    /// Name given to threads this layer attaches
    pub thread_name: Option<String>,

    /// Attach as daemon threads, which do not keep the VM alive
    pub daemon: bool,

    /// Print pending exceptions to the runtime's error stream before
    /// reporting them
    pub describe_exceptions: bool,
}

impl Default for JniConfig {
    fn default() -> Self {
        Self {
            version: JNI_VERSION_1_8,
            thread_name: None,
            daemon: false,
            describe_exceptions: false,
        }
    }
}

impl JniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `JBRIDGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup(ENV_THREAD_NAME).filter(|n| !n.trim().is_empty()) {
            self.thread_name = Some(name);
        }
        if let Some(value) = lookup(ENV_DAEMON) {
            self.daemon = is_truthy(&value);
        }
        if let Some(value) = lookup(ENV_DESCRIBE_EXCEPTIONS) {
            self.describe_exceptions = is_truthy(&value);
        }
        self
    }

    pub fn with_version(mut self, version: jint) -> Self {
        self.version = version;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    pub fn daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    pub fn describe_exceptions(mut self, describe: bool) -> Self {
        self.describe_exceptions = describe;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
