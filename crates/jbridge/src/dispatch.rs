//! Typed method invocation and field access
//!
//! The entry point is chosen along two axes: the descriptor's [`CallKind`]
//! picks the static, virtual or non-virtual family, and its return type
//! picks the [`ReturnKind`] within that family. Arguments go through an
//! [`ArgumentBuffer`] that checks each value against the next declared
//! parameter.

use jbridge_sys::{jchar, jvalue, JNI_FALSE, JNI_TRUE};

use crate::descriptor::{CallKind, MethodDescriptor};
use crate::env::Env;
use crate::error::{JniError, JniResult};
use crate::refs::{ObjectHandle, ObjectRef};
use crate::resolver::{ResolvedClass, ResolvedField, ResolvedMethod};
use crate::types::{ReturnKind, Type};

// ============================================================================
// Value
// ============================================================================

/// A marshaled value of any runtime type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Void,
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(ObjectHandle),
}

impl Value {
    pub fn kind(&self) -> ReturnKind {
        match self {
            Value::Void => ReturnKind::Void,
            Value::Boolean(_) => ReturnKind::Boolean,
            Value::Byte(_) => ReturnKind::Byte,
            Value::Char(_) => ReturnKind::Char,
            Value::Short(_) => ReturnKind::Short,
            Value::Int(_) => ReturnKind::Int,
            Value::Long(_) => ReturnKind::Long,
            Value::Float(_) => ReturnKind::Float,
            Value::Double(_) => ReturnKind::Double,
            Value::Object(_) => ReturnKind::Object,
        }
    }

    /// Whether this value can be passed where `ty` is declared. Object
    /// handles match any reference type; the runtime checks the class.
    pub fn matches(&self, ty: &Type) -> bool {
        self.kind() == ReturnKind::of(ty)
    }

    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Value::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    #[track_caller]
    pub(crate) fn to_jvalue(self) -> jvalue {
        match self {
            Value::Void => panic!("void cannot be passed as a value"),
            Value::Boolean(b) => jvalue {
                z: if b { JNI_TRUE } else { JNI_FALSE },
            },
            Value::Byte(b) => jvalue { b },
            Value::Char(c) => {
                let code = u32::from(c);
                assert!(
                    code <= 0xFFFF,
                    "char {:?} does not fit in one UTF-16 code unit",
                    c
                );
                jvalue { c: code as jchar }
            }
            Value::Short(s) => jvalue { s },
            Value::Int(i) => jvalue { i },
            Value::Long(j) => jvalue { j },
            Value::Float(f) => jvalue { f },
            Value::Double(d) => jvalue { d },
            Value::Object(handle) => jvalue { l: handle.as_raw() },
        }
    }

    /// # Safety
    ///
    /// `raw` must have been produced by an entry point of `kind`.
    pub(crate) unsafe fn from_jvalue(raw: jvalue, kind: ReturnKind) -> Value {
        match kind {
            ReturnKind::Void => Value::Void,
            ReturnKind::Boolean => Value::Boolean(raw.z != JNI_FALSE),
            ReturnKind::Byte => Value::Byte(raw.b),
            ReturnKind::Char => Value::Char(normalize_char(raw.c)),
            ReturnKind::Short => Value::Short(raw.s),
            ReturnKind::Int => Value::Int(raw.i),
            ReturnKind::Long => Value::Long(raw.j),
            ReturnKind::Float => Value::Float(raw.f),
            ReturnKind::Double => Value::Double(raw.d),
            ReturnKind::Object => Value::Object(ObjectHandle::from_raw(raw.l)),
        }
    }
}

/// Lone surrogates have no scalar value and become U+FFFD.
pub(crate) fn normalize_char(raw: jchar) -> char {
    char::from_u32(u32::from(raw)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

macro_rules! value_from {
    ($($rust:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$rust> for Value {
                fn from(v: $rust) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    ObjectHandle => Object,
}

impl From<&ObjectRef> for Value {
    fn from(r: &ObjectRef) -> Self {
        Value::Object(r.handle())
    }
}

// ============================================================================
// ArgumentBuffer
// ============================================================================

/// Argument slots for one call, checked against the descriptor in order.
pub struct ArgumentBuffer<'d> {
    descriptor: &'d MethodDescriptor,
    slots: Vec<jvalue>,
}

impl<'d> ArgumentBuffer<'d> {
    fn new(descriptor: &'d MethodDescriptor) -> Self {
        Self {
            descriptor,
            slots: Vec::with_capacity(descriptor.parameter_types().len()),
        }
    }

    /// Append the next argument.
    ///
    /// # Panics
    ///
    /// Panics if the value does not match the next declared parameter or
    /// every parameter has already been supplied.
    #[track_caller]
    pub fn put(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let index = self.slots.len();
        let params = self.descriptor.parameter_types();
        let Some(expected) = params.get(index) else {
            panic!(
                "too many arguments for {}: it takes {}",
                self.descriptor,
                params.len()
            );
        };
        if !value.matches(expected) {
            panic!(
                "argument {} of {} must be {}, got {:?}",
                index, self.descriptor, expected, value
            );
        }
        self.slots.push(value.to_jvalue());
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Parameters still to be supplied.
    pub fn remaining(&self) -> usize {
        self.descriptor.parameter_types().len() - self.slots.len()
    }

    #[track_caller]
    fn finish(self) -> Vec<jvalue> {
        let expected = self.descriptor.parameter_types().len();
        assert!(
            self.slots.len() == expected,
            "missing arguments for {}: {} of {} supplied",
            self.descriptor,
            self.slots.len(),
            expected
        );
        self.slots
    }
}

#[track_caller]
fn require_receiver(receiver: Option<ObjectHandle>, what: &dyn std::fmt::Display) -> ObjectHandle {
    match receiver {
        Some(obj) if !obj.is_null() => obj,
        _ => panic!("{} requires a non-null receiver", what),
    }
}

// ============================================================================
// Method calls
// ============================================================================

macro_rules! typed_calls {
    ($($name:ident => $kind:ident, $ty:ty, |$v:ident| $convert:expr;)*) => {
        $(
            #[track_caller]
            pub fn $name(
                &self,
                env: &mut Env<'_>,
                receiver: Option<ObjectHandle>,
                args: impl FnOnce(&mut ArgumentBuffer<'_>),
            ) -> JniResult<$ty> {
                let $v = self.invoke(env, receiver, Some(ReturnKind::$kind), args)?;
                // SAFETY: the entry point for this kind wrote this field.
                Ok(unsafe { $convert })
            }
        )*
    };
}

impl ResolvedMethod {
    /// Marshal arguments, select the entry point and call it. A pending
    /// exception after the call is reported as `JavaException` and left
    /// pending.
    #[track_caller]
    fn invoke(
        &self,
        env: &mut Env<'_>,
        receiver: Option<ObjectHandle>,
        expected: Option<ReturnKind>,
        build: impl FnOnce(&mut ArgumentBuffer<'_>),
    ) -> JniResult<jvalue> {
        let ret = ReturnKind::of(self.descriptor.return_type());
        if let Some(expected) = expected {
            assert!(
                expected == ret,
                "{} returns {}, not {:?}",
                self.descriptor,
                self.descriptor.return_type(),
                expected
            );
        }
        if self.descriptor.is_constructor() {
            panic!("constructors are invoked through ResolvedClass::new_object");
        }

        let mut buffer = ArgumentBuffer::new(&self.descriptor);
        build(&mut buffer);
        let args = buffer.finish();

        let boundary = env.boundary();
        let result = match self.descriptor.call_kind() {
            CallKind::Static => boundary.call_static_method(self.owner.0, self.id.0, &args, ret),
            CallKind::Virtual => {
                let obj = require_receiver(receiver, &self.descriptor);
                boundary.call_method(obj.as_raw(), self.id.0, &args, ret)
            }
            CallKind::NonVirtual => {
                let obj = require_receiver(receiver, &self.descriptor);
                boundary.call_nonvirtual_method(obj.as_raw(), self.owner.0, self.id.0, &args, ret)
            }
        };
        env.check_exception()?;
        Ok(result)
    }

    /// Call with the result tagged by the declared return type.
    #[track_caller]
    pub fn call(
        &self,
        env: &mut Env<'_>,
        receiver: Option<ObjectHandle>,
        args: impl FnOnce(&mut ArgumentBuffer<'_>),
    ) -> JniResult<Value> {
        let kind = ReturnKind::of(self.descriptor.return_type());
        let raw = self.invoke(env, receiver, None, args)?;
        // SAFETY: `invoke` used the entry point for `kind`.
        Ok(unsafe { Value::from_jvalue(raw, kind) })
    }

    #[track_caller]
    pub fn call_void(
        &self,
        env: &mut Env<'_>,
        receiver: Option<ObjectHandle>,
        args: impl FnOnce(&mut ArgumentBuffer<'_>),
    ) -> JniResult<()> {
        self.invoke(env, receiver, Some(ReturnKind::Void), args)?;
        Ok(())
    }

    typed_calls! {
        call_boolean => Boolean, bool, |v| v.z != JNI_FALSE;
        call_byte => Byte, i8, |v| v.b;
        call_char => Char, char, |v| normalize_char(v.c);
        call_short => Short, i16, |v| v.s;
        call_int => Int, i32, |v| v.i;
        call_long => Long, i64, |v| v.j;
        call_float => Float, f32, |v| v.f;
        call_double => Double, f64, |v| v.d;
        call_object => Object, ObjectHandle, |v| ObjectHandle::from_raw(v.l);
    }
}

impl ResolvedClass {
    /// Allocate an instance and run `constructor` on it. The result is a
    /// local reference.
    #[track_caller]
    pub fn new_object(
        &self,
        env: &mut Env<'_>,
        constructor: &ResolvedMethod,
        args: impl FnOnce(&mut ArgumentBuffer<'_>),
    ) -> JniResult<ObjectHandle> {
        assert!(
            constructor.descriptor.is_constructor(),
            "{} is not a constructor",
            constructor.descriptor
        );
        let mut buffer = ArgumentBuffer::new(&constructor.descriptor);
        args(&mut buffer);
        let args = buffer.finish();

        let raw = env
            .boundary()
            .new_object(self.handle.0, constructor.id.0, &args);
        env.check_exception()?;
        if raw.is_null() {
            return Err(JniError::AllocationFailed(format!("new {}", self.ty)));
        }
        // SAFETY: the runtime just returned this local reference.
        Ok(unsafe { ObjectHandle::from_raw(raw) })
    }
}

// ============================================================================
// Field access
// ============================================================================

macro_rules! typed_getters {
    ($($name:ident => $variant:ident, $ty:ty;)*) => {
        $(
            #[track_caller]
            pub fn $name(&self, env: &mut Env<'_>, receiver: Option<ObjectHandle>) -> JniResult<$ty> {
                match self.get(env, receiver)? {
                    Value::$variant(v) => Ok(v),
                    other => panic!("field {} holds {:?}, not {}", self.descriptor, other, stringify!($variant)),
                }
            }
        )*
    };
}

impl ResolvedField {
    /// Read the field. Static fields ignore `receiver`.
    #[track_caller]
    pub fn get(&self, env: &mut Env<'_>, receiver: Option<ObjectHandle>) -> JniResult<Value> {
        let kind = ReturnKind::of(self.descriptor.ty());
        let raw = if self.descriptor.is_static() {
            env.boundary().get_static_field(self.owner.0, self.id.0, kind)
        } else {
            let obj = require_receiver(receiver, &self.descriptor);
            env.boundary().get_field(obj.as_raw(), self.id.0, kind)
        };
        env.check_exception()?;
        // SAFETY: the getter for `kind` wrote this value.
        Ok(unsafe { Value::from_jvalue(raw, kind) })
    }

    /// Write the field. Static fields ignore `receiver`.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not match the field's type.
    #[track_caller]
    pub fn set(
        &self,
        env: &mut Env<'_>,
        receiver: Option<ObjectHandle>,
        value: impl Into<Value>,
    ) -> JniResult<()> {
        let value = value.into();
        if !value.matches(self.descriptor.ty()) {
            panic!(
                "field {} has type {}, got {:?}",
                self.descriptor,
                self.descriptor.ty(),
                value
            );
        }
        let kind = value.kind();
        let raw = value.to_jvalue();
        if self.descriptor.is_static() {
            env.boundary()
                .set_static_field(self.owner.0, self.id.0, kind, raw);
        } else {
            let obj = require_receiver(receiver, &self.descriptor);
            env.boundary().set_field(obj.as_raw(), self.id.0, kind, raw);
        }
        env.check_exception()
    }

    typed_getters! {
        get_boolean => Boolean, bool;
        get_byte => Byte, i8;
        get_char => Char, char;
        get_short => Short, i16;
        get_int => Int, i32;
        get_long => Long, i64;
        get_float => Float, f32;
        get_double => Double, f64;
        get_object => Object, ObjectHandle;
    }
}
