//! Runtime type model and the signature grammar
//!
//! A [`Type`] is either one of the nine primitive kinds, a class named by
//! its qualified name, or an array of either. Equality and hashing are
//! structural, so two values that encode to the same signature string are
//! the same key in every cache.

use std::fmt;
use std::sync::Arc;

use crate::error::{JniError, JniResult};

/// Maximum array rank the runtime accepts.
pub const MAX_ARRAY_DIMENSIONS: u8 = 255;

// ============================================================================
// Primitive kinds
// ============================================================================

/// The primitive types, `void` included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Void,
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Single-character signature code.
    pub const fn signature_char(self) -> char {
        match self {
            PrimitiveKind::Void => 'V',
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    pub fn from_signature_char(c: u8) -> Option<Self> {
        Some(match c {
            b'V' => PrimitiveKind::Void,
            b'Z' => PrimitiveKind::Boolean,
            b'B' => PrimitiveKind::Byte,
            b'C' => PrimitiveKind::Char,
            b'S' => PrimitiveKind::Short,
            b'I' => PrimitiveKind::Int,
            b'J' => PrimitiveKind::Long,
            b'F' => PrimitiveKind::Float,
            b'D' => PrimitiveKind::Double,
            _ => return None,
        })
    }

    /// Native storage size in bytes.
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Boolean | PrimitiveKind::Byte => 1,
            PrimitiveKind::Char | PrimitiveKind::Short => 2,
            PrimitiveKind::Int | PrimitiveKind::Float => 4,
            PrimitiveKind::Long | PrimitiveKind::Double => 8,
        }
    }

    /// Source-level keyword.
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

// ============================================================================
// Class and array types
// ============================================================================

/// A class named in internal (slash-separated) form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassType {
    internal_name: Arc<str>,
}

impl ClassType {
    /// Accepts `java.lang.String` or `java/lang/String`.
    pub fn new(name: &str) -> Self {
        Self {
            internal_name: Arc::from(name.replace('.', "/")),
        }
    }

    /// `java/lang/String`
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// `java.lang.String`
    pub fn qualified_name(&self) -> String {
        self.internal_name.replace('/', ".")
    }
}

impl fmt::Debug for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassType({})", self.internal_name)
    }
}

/// An array type, normalized so the element is never itself an array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Box<Type>,
    dimensions: u8,
}

impl ArrayType {
    /// Innermost non-array element type.
    pub fn element(&self) -> &Type {
        &self.element
    }

    pub fn dimensions(&self) -> u8 {
        self.dimensions
    }

    /// The type with one dimension removed.
    pub fn component(&self) -> Type {
        if self.dimensions == 1 {
            (*self.element).clone()
        } else {
            Type::Array(ArrayType {
                element: self.element.clone(),
                dimensions: self.dimensions - 1,
            })
        }
    }
}

// ============================================================================
// Type
// ============================================================================

/// A runtime type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Class(ClassType),
    Array(ArrayType),
}

impl Type {
    pub const VOID: Type = Type::Primitive(PrimitiveKind::Void);
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveKind::Boolean);
    pub const BYTE: Type = Type::Primitive(PrimitiveKind::Byte);
    pub const CHAR: Type = Type::Primitive(PrimitiveKind::Char);
    pub const SHORT: Type = Type::Primitive(PrimitiveKind::Short);
    pub const INT: Type = Type::Primitive(PrimitiveKind::Int);
    pub const LONG: Type = Type::Primitive(PrimitiveKind::Long);
    pub const FLOAT: Type = Type::Primitive(PrimitiveKind::Float);
    pub const DOUBLE: Type = Type::Primitive(PrimitiveKind::Double);

    /// Class type from a dotted or slashed qualified name.
    pub fn class(name: &str) -> Type {
        Type::Class(ClassType::new(name))
    }

    /// `java.lang.Object`
    pub fn object() -> Type {
        Type::class("java/lang/Object")
    }

    /// `java.lang.String`
    pub fn string() -> Type {
        Type::class("java/lang/String")
    }

    /// Array of `element` with `dimensions` more dimensions. Nested arrays
    /// are flattened, so `array_of(array_of(I, 1), 2)` has three dimensions.
    ///
    /// # Panics
    ///
    /// Panics on an array of `void` or a rank above [`MAX_ARRAY_DIMENSIONS`].
    #[track_caller]
    pub fn array_of(element: Type, dimensions: u8) -> Type {
        if dimensions == 0 {
            return element;
        }
        let (element, existing) = match element {
            Type::Array(array) => (array.element, array.dimensions),
            other => (Box::new(other), 0),
        };
        assert!(!element.is_void(), "array of void is not a valid type");
        let total = existing as u16 + dimensions as u16;
        assert!(
            total <= MAX_ARRAY_DIMENSIONS as u16,
            "array rank {} exceeds {}",
            total,
            MAX_ARRAY_DIMENSIONS
        );
        Type::Array(ArrayType {
            element,
            dimensions: total as u8,
        })
    }

    /// One-dimensional array of `self`.
    #[track_caller]
    pub fn array(self) -> Type {
        Type::array_of(self, 1)
    }

    /// Canonical signature string, e.g. `I`, `Ljava/lang/String;`, `[[D`.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    pub fn write_signature(&self, out: &mut String) {
        match self {
            Type::Primitive(kind) => out.push(kind.signature_char()),
            Type::Class(class) => {
                out.push('L');
                out.push_str(class.internal_name());
                out.push(';');
            }
            Type::Array(array) => {
                for _ in 0..array.dimensions {
                    out.push('[');
                }
                array.element.write_signature(out);
            }
        }
    }

    /// Native storage size: the primitive width, or pointer width for
    /// references.
    pub fn size(&self) -> usize {
        match self {
            Type::Primitive(kind) => kind.size(),
            Type::Class(_) | Type::Array(_) => std::mem::size_of::<jbridge_sys::jobject>(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        !self.is_primitive()
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn return_kind(&self) -> ReturnKind {
        ReturnKind::of(self)
    }

    /// Name accepted by the boundary's class lookup: the internal name for
    /// classes, the full signature for arrays, nothing for primitives.
    pub fn lookup_name(&self) -> Option<String> {
        match self {
            Type::Primitive(_) => None,
            Type::Class(class) => Some(class.internal_name().to_string()),
            Type::Array(_) => Some(self.signature()),
        }
    }

    /// Element type one dimension down, if this is an array.
    pub fn component(&self) -> Option<Type> {
        match self {
            Type::Array(array) => Some(array.component()),
            _ => None,
        }
    }

    /// Parse a single field signature such as `[Ljava/lang/String;`.
    pub fn from_signature(signature: &str) -> JniResult<Type> {
        let mut parser = SignatureParser::new(signature);
        let ty = parser.parse_type(true)?;
        parser.expect_end()?;
        Ok(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => f.write_str(kind.name()),
            Type::Class(class) => f.write_str(&class.qualified_name()),
            Type::Array(array) => {
                write!(f, "{}", array.element)?;
                for _ in 0..array.dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

impl From<PrimitiveKind> for Type {
    fn from(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }
}

// ============================================================================
// Return kinds
// ============================================================================

/// Which return-type-specific entry point a call or field access uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl ReturnKind {
    pub const ALL: [ReturnKind; 10] = [
        ReturnKind::Void,
        ReturnKind::Boolean,
        ReturnKind::Byte,
        ReturnKind::Char,
        ReturnKind::Short,
        ReturnKind::Int,
        ReturnKind::Long,
        ReturnKind::Float,
        ReturnKind::Double,
        ReturnKind::Object,
    ];

    pub fn of(ty: &Type) -> ReturnKind {
        match ty {
            Type::Primitive(kind) => match kind {
                PrimitiveKind::Void => ReturnKind::Void,
                PrimitiveKind::Boolean => ReturnKind::Boolean,
                PrimitiveKind::Byte => ReturnKind::Byte,
                PrimitiveKind::Char => ReturnKind::Char,
                PrimitiveKind::Short => ReturnKind::Short,
                PrimitiveKind::Int => ReturnKind::Int,
                PrimitiveKind::Long => ReturnKind::Long,
                PrimitiveKind::Float => ReturnKind::Float,
                PrimitiveKind::Double => ReturnKind::Double,
            },
            Type::Class(_) | Type::Array(_) => ReturnKind::Object,
        }
    }
}

// ============================================================================
// Rust type mapping
// ============================================================================

/// Maps a Rust type onto the runtime type it marshals as.
pub trait JavaType {
    fn java_type() -> Type;
}

macro_rules! impl_java_type {
    ($($rust:ty => $ty:expr),* $(,)?) => {
        $(
            impl JavaType for $rust {
                fn java_type() -> Type {
                    $ty
                }
            }
        )*
    };
}

impl_java_type! {
    () => Type::VOID,
    bool => Type::BOOLEAN,
    i8 => Type::BYTE,
    char => Type::CHAR,
    i16 => Type::SHORT,
    i32 => Type::INT,
    i64 => Type::LONG,
    f32 => Type::FLOAT,
    f64 => Type::DOUBLE,
}

// ============================================================================
// Signature parser
// ============================================================================

pub(crate) struct SignatureParser<'s> {
    input: &'s str,
    pos: usize,
}

impl<'s> SignatureParser<'s> {
    pub(crate) fn new(input: &'s str) -> Self {
        Self { input, pos: 0 }
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> JniError {
        JniError::InvalidSignature {
            signature: self.input.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn expect(&mut self, byte: u8) -> JniResult<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_at(self.pos, format!("expected '{}'", byte as char)))
        }
    }

    pub(crate) fn expect_end(&self) -> JniResult<()> {
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.error_at(self.pos, "trailing characters"))
        }
    }

    /// Parse one type. `void` is only accepted when `allow_void` is set and
    /// never as an array element.
    pub(crate) fn parse_type(&mut self, allow_void: bool) -> JniResult<Type> {
        let input = self.input;
        let start = self.pos;
        let mut dimensions: u32 = 0;
        while self.peek() == Some(b'[') {
            dimensions += 1;
            self.pos += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS as u32 {
            return Err(self.error_at(start, "too many array dimensions"));
        }

        let element_start = self.pos;
        let element = match self.peek() {
            None => return Err(self.error_at(self.pos, "unexpected end of signature")),
            Some(b'L') => {
                let rest = &input[self.pos + 1..];
                let end = rest
                    .find(';')
                    .ok_or_else(|| self.error_at(element_start, "unterminated class name"))?;
                let name = &rest[..end];
                if name.is_empty() || name.contains(['.', '[', '(', ')']) {
                    return Err(self.error_at(element_start + 1, "invalid class name"));
                }
                self.pos += end + 2;
                Type::class(name)
            }
            Some(c) => match PrimitiveKind::from_signature_char(c) {
                Some(kind) => {
                    self.pos += 1;
                    Type::Primitive(kind)
                }
                None => {
                    return Err(
                        self.error_at(self.pos, format!("unexpected character '{}'", c as char))
                    )
                }
            },
        };

        if element.is_void() && (dimensions > 0 || !allow_void) {
            return Err(self.error_at(element_start, "void is only valid as a return type"));
        }
        Ok(if dimensions == 0 {
            element
        } else {
            Type::array_of(element, dimensions as u8)
        })
    }
}
