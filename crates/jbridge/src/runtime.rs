//! Queries against the running VM's `java.lang.Runtime`
//!
//! Every query fetches `Runtime.getRuntime()` afresh and releases the local
//! reference before returning, so nothing here outlives the `Env` it ran on.

use std::sync::Arc;

use tracing::debug;

use crate::descriptor::{CallKind, MethodDescriptor};
use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::refs::ObjectHandle;
use crate::resolver::{ResolvedClass, ResolvedMethod, Resolver};
use crate::types::Type;

const RUNTIME_CLASS: &str = "java/lang/Runtime";

/// Memory and processor figures reported by the VM, plus a collection
/// request.
#[derive(Clone, Copy, Debug)]
pub struct ManagedRuntime<'r> {
    resolver: &'r Resolver,
}

impl ManagedRuntime<'static> {
    /// Resolve through the process-wide resolver.
    pub fn shared() -> Self {
        Self::new(Resolver::shared())
    }
}

impl<'r> ManagedRuntime<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self { resolver }
    }

    /// `Runtime.availableProcessors()`
    pub fn available_processors(&self, env: &mut Env<'_>) -> JniResult<i32> {
        self.with_runtime(env, "availableProcessors", Type::INT, |method, env, runtime| {
            method.call_int(env, Some(runtime), |_| {})
        })
    }

    /// `Runtime.totalMemory()`, in bytes.
    pub fn total_memory(&self, env: &mut Env<'_>) -> JniResult<i64> {
        self.memory_figure(env, "totalMemory")
    }

    /// `Runtime.maxMemory()`, in bytes. `i64::MAX` means no limit.
    pub fn max_memory(&self, env: &mut Env<'_>) -> JniResult<i64> {
        self.memory_figure(env, "maxMemory")
    }

    /// `Runtime.freeMemory()`, in bytes.
    pub fn free_memory(&self, env: &mut Env<'_>) -> JniResult<i64> {
        self.memory_figure(env, "freeMemory")
    }

    /// Ask the VM to collect garbage. Returns once `Runtime.gc()` does.
    pub fn gc(&self, env: &mut Env<'_>) -> JniResult<()> {
        self.with_runtime(env, "gc", Type::VOID, |method, env, runtime| {
            method.call_void(env, Some(runtime), |_| {})
        })?;
        debug!("requested garbage collection");
        Ok(())
    }

    fn memory_figure(&self, env: &mut Env<'_>, name: &str) -> JniResult<i64> {
        self.with_runtime(env, name, Type::LONG, |method, env, runtime| {
            method.call_long(env, Some(runtime), |_| {})
        })
    }

    /// Resolve `name()` on `Runtime` and call it on the current runtime
    /// object, releasing that object afterwards.
    fn with_runtime<R>(
        &self,
        env: &mut Env<'_>,
        name: &str,
        returns: Type,
        call: impl FnOnce(&ResolvedMethod, &mut Env<'_>, ObjectHandle) -> JniResult<R>,
    ) -> JniResult<R> {
        let class_type = Type::class(RUNTIME_CLASS);
        let class = self
            .resolver
            .try_find_class(env, &class_type)
            .ok_or_else(|| JniError::ClassNotFound(class_type.to_string()))?;

        let get_runtime = MethodDescriptor::builder()
            .name("getRuntime")
            .returns(class_type.clone())
            .call_kind(CallKind::Static)
            .build()?;
        let query = MethodDescriptor::builder()
            .name(name)
            .returns(returns)
            .build()?;
        let get_runtime = find(env, &class, &get_runtime)?;
        let query = find(env, &class, &query)?;

        let runtime = get_runtime.call_object(env, None, |_| {})?;
        if runtime.is_null() {
            return Err(JniError::Other("Runtime.getRuntime() returned null".to_string()));
        }
        let result = call(&query, env, runtime);
        env.boundary().delete_local_ref(runtime.as_raw());
        result
    }
}

fn find(
    env: &mut Env<'_>,
    class: &ResolvedClass,
    descriptor: &MethodDescriptor,
) -> JniResult<Arc<ResolvedMethod>> {
    class
        .try_find_method(env, descriptor)
        .ok_or_else(|| JniError::MethodNotFound {
            name: descriptor.name().to_string(),
            signature: descriptor.signature().to_string(),
        })
}
