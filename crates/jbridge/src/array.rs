//! Array access: element-wise and pinned bulk transfer
//!
//! Primitive arrays offer two strategies. [`PrimitiveArray::get`] and
//! [`PrimitiveArray::set`] pin the array for a single element each time.
//! [`PrimitiveArray::pin`] hands out a [`PinGuard`] over the whole backing
//! store. The guard holds the environment's exclusive borrow, so no other
//! boundary call can be issued until it is dropped, and dropping it
//! releases the pin on every exit path:
//!
//! ```compile_fail
//! use jbridge::{Env, PrimitiveArray};
//!
//! fn overlap(env: &mut Env<'_>, array: PrimitiveArray<i32>) {
//!     let pinned = array.pin(env).unwrap();
//!     env.exception_check();
//!     drop(pinned);
//! }
//! ```

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::sync::Arc;

use jbridge_sys::{
    jarray, jboolean, jbyte, jchar, jdouble, jfloat, jint, jlong, jshort, jsize, JNI_ABORT,
    JNI_FALSE, JNI_TRUE,
};
use tracing::trace;

use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::refs::ObjectHandle;
use crate::resolver::{ResolvedClass, Resolver};
use crate::types::PrimitiveKind;

// ============================================================================
// Element types
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// A primitive that can be stored in a runtime array. `char` arrays are
/// accessed as UTF-16 code units (`u16`).
pub trait ArrayElement: Copy + sealed::Sealed {
    /// Storage representation inside the pinned buffer
    type Raw: Copy + Default;

    const KIND: PrimitiveKind;

    fn to_raw(self) -> Self::Raw;

    fn from_raw(raw: Self::Raw) -> Self;
}

macro_rules! array_element {
    ($($rust:ty => $raw:ty, $kind:ident;)*) => {
        $(
            impl sealed::Sealed for $rust {}

            impl ArrayElement for $rust {
                type Raw = $raw;
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                #[inline]
                fn to_raw(self) -> $raw {
                    self
                }

                #[inline]
                fn from_raw(raw: $raw) -> Self {
                    raw
                }
            }
        )*
    };
}

array_element! {
    i8 => jbyte, Byte;
    u16 => jchar, Char;
    i16 => jshort, Short;
    i32 => jint, Int;
    i64 => jlong, Long;
    f32 => jfloat, Float;
    f64 => jdouble, Double;
}

impl sealed::Sealed for bool {}

impl ArrayElement for bool {
    type Raw = jboolean;
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;

    #[inline]
    fn to_raw(self) -> jboolean {
        if self {
            JNI_TRUE
        } else {
            JNI_FALSE
        }
    }

    #[inline]
    fn from_raw(raw: jboolean) -> Self {
        raw != JNI_FALSE
    }
}

fn check_range(start: usize, count: usize, len: usize) -> JniResult<()> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(JniError::IndexOutOfBounds {
            index: start.max(len),
            len,
        }),
    }
}

fn array_len(env: &mut Env<'_>, array: jarray) -> usize {
    env.boundary().get_array_length(array).max(0) as usize
}

fn to_jsize(len: usize) -> JniResult<jsize> {
    jsize::try_from(len).map_err(|_| JniError::AllocationFailed(format!("array of length {}", len)))
}

// ============================================================================
// PrimitiveArray
// ============================================================================

/// A primitive array of element type `T`. Does not own a reference.
#[derive(Debug)]
pub struct PrimitiveArray<T: ArrayElement> {
    handle: ObjectHandle,
    _marker: PhantomData<T>,
}

impl<T: ArrayElement> Clone for PrimitiveArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ArrayElement> Copy for PrimitiveArray<T> {}

impl<T: ArrayElement> PrimitiveArray<T> {
    /// # Safety
    ///
    /// `handle` must be a non-null array whose component type is `T`.
    pub unsafe fn from_handle(handle: ObjectHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    /// Allocate a zero-filled array. Returns a local reference.
    pub fn new(env: &mut Env<'_>, len: usize) -> JniResult<Self> {
        let raw = env.boundary().new_primitive_array(T::KIND, to_jsize(len)?);
        env.check_exception()?;
        if raw.is_null() {
            return Err(JniError::AllocationFailed(format!(
                "{}[{}]",
                T::KIND.name(),
                len
            )));
        }
        // SAFETY: the runtime just created this array with component `T`.
        Ok(unsafe { Self::from_handle(ObjectHandle::from_raw(raw)) })
    }

    /// Allocate an array holding a copy of `values`.
    pub fn from_slice(env: &mut Env<'_>, values: &[T]) -> JniResult<Self> {
        let array = Self::new(env, values.len())?;
        let raw: Vec<T::Raw> = values.iter().map(|v| v.to_raw()).collect();
        array.copy_from(env, 0, &raw)?;
        Ok(array)
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn len(&self, env: &mut Env<'_>) -> usize {
        array_len(env, self.handle.as_raw())
    }

    pub fn is_empty(&self, env: &mut Env<'_>) -> bool {
        self.len(env) == 0
    }

    /// Read one element through a full pin round trip.
    pub fn get(&self, env: &mut Env<'_>, index: usize) -> JniResult<T> {
        let pinned = self.pin(env)?;
        match pinned.get(index) {
            Some(raw) => Ok(T::from_raw(*raw)),
            None => Err(JniError::IndexOutOfBounds {
                index,
                len: pinned.len(),
            }),
        }
    }

    /// Write one element through a full pin round trip.
    pub fn set(&self, env: &mut Env<'_>, index: usize, value: T) -> JniResult<()> {
        let mut pinned = self.pin(env)?;
        let len = pinned.len();
        if index >= len {
            pinned.abort();
            return Err(JniError::IndexOutOfBounds { index, len });
        }
        pinned[index] = value.to_raw();
        Ok(())
    }

    /// Enter a critical section over the backing store.
    pub fn pin<'e, 'a>(&self, env: &'e mut Env<'a>) -> JniResult<PinGuard<'e, 'a, T>> {
        let array = self.handle.as_raw();
        let len = array_len(env, array);
        let elems = env.boundary().get_primitive_array_critical(array);
        let Some(elems) = NonNull::new(elems.cast::<T::Raw>()) else {
            env.check_exception()?;
            return Err(JniError::PinFailed);
        };
        trace!(array = ?array, len, "pinned array");
        Ok(PinGuard {
            env,
            array,
            elems,
            len,
            mode: 0,
        })
    }

    /// Run `f` over the pinned elements.
    pub fn with_pinned<R>(
        &self,
        env: &mut Env<'_>,
        f: impl FnOnce(&mut [T::Raw]) -> R,
    ) -> JniResult<R> {
        let mut pinned = self.pin(env)?;
        Ok(f(&mut pinned))
    }

    /// Copy `dest.len()` elements starting at `start` out of the array.
    pub fn copy_into(&self, env: &mut Env<'_>, start: usize, dest: &mut [T::Raw]) -> JniResult<()> {
        let pinned = self.pin(env)?;
        check_range(start, dest.len(), pinned.len())?;
        let size = T::KIND.size();
        let byte_offset = size * start;
        let byte_len = size * dest.len();
        // SAFETY: the range was checked against the pinned length and the
        // buffers are distinct allocations.
        unsafe {
            let src = pinned.as_ptr().cast::<u8>().add(byte_offset);
            ptr::copy_nonoverlapping(src, dest.as_mut_ptr().cast::<u8>(), byte_len);
        }
        Ok(())
    }

    /// Copy `src` into the array starting at `start`.
    pub fn copy_from(&self, env: &mut Env<'_>, start: usize, src: &[T::Raw]) -> JniResult<()> {
        let mut pinned = self.pin(env)?;
        if let Err(e) = check_range(start, src.len(), pinned.len()) {
            pinned.abort();
            return Err(e);
        }
        let size = T::KIND.size();
        let byte_offset = size * start;
        let byte_len = size * src.len();
        // SAFETY: as in `copy_into`.
        unsafe {
            let dest = pinned.as_mut_ptr().cast::<u8>().add(byte_offset);
            ptr::copy_nonoverlapping(src.as_ptr().cast::<u8>(), dest, byte_len);
        }
        Ok(())
    }

    /// Copy the whole array out.
    pub fn to_vec(&self, env: &mut Env<'_>) -> JniResult<Vec<T>> {
        self.with_pinned(env, |elems| elems.iter().map(|raw| T::from_raw(*raw)).collect())
    }
}

// ============================================================================
// PinGuard
// ============================================================================

/// A pinned array's elements. Unpins on drop.
pub struct PinGuard<'e, 'a, T: ArrayElement> {
    env: &'e mut Env<'a>,
    array: jarray,
    elems: NonNull<T::Raw>,
    len: usize,
    mode: jint,
}

impl<T: ArrayElement> PinGuard<'_, '_, T> {
    pub fn as_ptr(&self) -> *const T::Raw {
        self.elems.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T::Raw {
        self.elems.as_ptr()
    }

    /// Unpin without writing changes back to the array.
    pub fn abort(mut self) {
        self.mode = JNI_ABORT;
    }
}

impl<T: ArrayElement> Deref for PinGuard<'_, '_, T> {
    type Target = [T::Raw];

    fn deref(&self) -> &[T::Raw] {
        // SAFETY: the runtime pinned `len` elements at `elems` until release.
        unsafe { std::slice::from_raw_parts(self.elems.as_ptr(), self.len) }
    }
}

impl<T: ArrayElement> DerefMut for PinGuard<'_, '_, T> {
    fn deref_mut(&mut self) -> &mut [T::Raw] {
        // SAFETY: as in `deref`; the guard is the only view of the buffer.
        unsafe { std::slice::from_raw_parts_mut(self.elems.as_ptr(), self.len) }
    }
}

impl<T: ArrayElement> Drop for PinGuard<'_, '_, T> {
    fn drop(&mut self) {
        self.env.boundary().release_primitive_array_critical(
            self.array,
            self.elems.as_ptr().cast(),
            self.mode,
        );
        trace!(array = ?self.array, mode = self.mode, "unpinned array");
    }
}

// ============================================================================
// ObjectArray
// ============================================================================

/// An array of references. Does not own a reference.
#[derive(Clone, Copy, Debug)]
pub struct ObjectArray {
    handle: ObjectHandle,
}

impl ObjectArray {
    /// # Safety
    ///
    /// `handle` must be a non-null reference array.
    pub unsafe fn from_handle(handle: ObjectHandle) -> Self {
        Self { handle }
    }

    /// Allocate an array of `len` elements of `element_class`, each set to
    /// `initial`. Returns a local reference.
    pub fn new(
        env: &mut Env<'_>,
        element_class: &ResolvedClass,
        len: usize,
        initial: ObjectHandle,
    ) -> JniResult<Self> {
        let raw = env.boundary().new_object_array(
            to_jsize(len)?,
            element_class.handle().as_raw(),
            initial.as_raw(),
        );
        env.check_exception()?;
        if raw.is_null() {
            return Err(JniError::AllocationFailed(format!(
                "{}[{}]",
                element_class.ty(),
                len
            )));
        }
        // SAFETY: the runtime just created this reference array.
        Ok(unsafe { Self::from_handle(ObjectHandle::from_raw(raw)) })
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn len(&self, env: &mut Env<'_>) -> usize {
        array_len(env, self.handle.as_raw())
    }

    pub fn is_empty(&self, env: &mut Env<'_>) -> bool {
        self.len(env) == 0
    }

    /// Element at `index` as a local reference.
    pub fn get(&self, env: &mut Env<'_>, index: usize) -> JniResult<ObjectHandle> {
        let len = self.len(env);
        check_range(index, 1, len).map_err(|_| JniError::IndexOutOfBounds { index, len })?;
        let raw = env
            .boundary()
            .get_object_array_element(self.handle.as_raw(), index as jsize);
        env.check_exception()?;
        // SAFETY: the runtime just returned this local reference.
        Ok(unsafe { ObjectHandle::from_raw(raw) })
    }

    pub fn set(&self, env: &mut Env<'_>, index: usize, value: ObjectHandle) -> JniResult<()> {
        let len = self.len(env);
        check_range(index, 1, len).map_err(|_| JniError::IndexOutOfBounds { index, len })?;
        env.boundary()
            .set_object_array_element(self.handle.as_raw(), index as jsize, value.as_raw());
        env.check_exception()
    }

    /// Component class of this array's runtime class, cached on that class.
    pub fn component_class(
        &self,
        env: &mut Env<'_>,
        resolver: &Resolver,
    ) -> Option<Arc<ResolvedClass>> {
        let class = resolver.class_of(env, self.handle)?;
        resolver.component_class(env, &class)
    }
}
