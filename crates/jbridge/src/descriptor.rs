//! Field and method descriptors
//!
//! Descriptors are immutable once built and double as cache keys. Builders
//! validate names and types up front so nothing malformed reaches the
//! boundary's lookup functions.

use std::fmt;
use std::sync::Arc;

use crate::error::{JniError, JniResult};
use crate::types::{SignatureParser, Type};

/// Calling convention family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Static-call family, dispatched on the owning class.
    Static,
    /// Ordinary virtual dispatch on the receiver.
    #[default]
    Virtual,
    /// Invoke the owning class's implementation directly, bypassing overrides.
    NonVirtual,
}

fn validate_member_name(name: &str, what: &str) -> JniResult<()> {
    if name.trim().is_empty() {
        return Err(JniError::InvalidDescriptor(format!("{} name must be specified", what)));
    }
    if name == "<init>" || name == "<clinit>" {
        return Ok(());
    }
    if let Some(bad) = name.chars().find(|c| matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | '\0')) {
        return Err(JniError::InvalidDescriptor(format!(
            "{} name '{}' contains '{}'",
            what,
            name.escape_default(),
            bad.escape_default()
        )));
    }
    Ok(())
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// Name, type and staticness of a field.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: Arc<str>,
    ty: Type,
    is_static: bool,
    signature: Arc<str>,
}

impl FieldDescriptor {
    pub fn builder() -> FieldDescriptorBuilder {
        FieldDescriptorBuilder::default()
    }

    /// Instance field shorthand.
    pub fn new(name: &str, ty: Type) -> JniResult<Self> {
        Self::builder().name(name).ty(ty).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Field signature, e.g. `Ljava/lang/String;`.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FieldDescriptor({}{} {})",
            if self.is_static { "static " } else { "" },
            self.name,
            self.signature
        )
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldDescriptorBuilder {
    name: String,
    ty: Option<Type>,
    is_static: bool,
}

impl FieldDescriptorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn ty(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Copy every property from an existing descriptor.
    pub fn from_descriptor(descriptor: &FieldDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            ty: Some(descriptor.ty.clone()),
            is_static: descriptor.is_static,
        }
    }

    pub fn build(self) -> JniResult<FieldDescriptor> {
        validate_member_name(&self.name, "Field")?;
        let ty = self
            .ty
            .ok_or_else(|| JniError::InvalidDescriptor("Field type must be specified".to_string()))?;
        if ty.is_void() {
            return Err(JniError::InvalidDescriptor(format!(
                "Field '{}' cannot have type void",
                self.name
            )));
        }
        let signature = Arc::from(ty.signature());
        Ok(FieldDescriptor {
            name: Arc::from(self.name),
            ty,
            is_static: self.is_static,
            signature,
        })
    }
}

// ============================================================================
// MethodDescriptor
// ============================================================================

/// Name, return type, parameter types and call kind of a method.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    name: Arc<str>,
    return_type: Type,
    parameter_types: Arc<[Type]>,
    call_kind: CallKind,
    signature: Arc<str>,
}

impl MethodDescriptor {
    pub fn builder() -> MethodDescriptorBuilder {
        MethodDescriptorBuilder::default()
    }

    /// Constructor descriptor: `<init>` returning void.
    pub fn constructor(parameter_types: impl IntoIterator<Item = Type>) -> JniResult<Self> {
        Self::builder()
            .name("<init>")
            .params(parameter_types)
            .call_kind(CallKind::NonVirtual)
            .build()
    }

    /// Build from a method signature string such as `(ILjava/lang/String;)V`.
    pub fn parse(name: &str, signature: &str, call_kind: CallKind) -> JniResult<Self> {
        let (parameter_types, return_type) = parse_method_signature(signature)?;
        Self::builder()
            .name(name)
            .params(parameter_types)
            .returns(return_type)
            .call_kind(call_kind)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn parameter_types(&self) -> &[Type] {
        &self.parameter_types
    }

    pub fn call_kind(&self) -> CallKind {
        self.call_kind
    }

    pub fn is_static(&self) -> bool {
        self.call_kind == CallKind::Static
    }

    pub fn is_constructor(&self) -> bool {
        &*self.name == "<init>"
    }

    /// Method signature, e.g. `(II)I`.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodDescriptor({:?} {}{})", self.call_kind, self.name, self.signature)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

/// Builder for [`MethodDescriptor`]. Return type defaults to `void` and the
/// call kind to [`CallKind::Virtual`].
#[derive(Debug, Clone, Default)]
pub struct MethodDescriptorBuilder {
    name: String,
    return_type: Option<Type>,
    parameter_types: Vec<Type>,
    call_kind: CallKind,
}

impl MethodDescriptorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn returns(mut self, return_type: Type) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn param(mut self, ty: Type) -> Self {
        self.parameter_types.push(ty);
        self
    }

    pub fn params(mut self, types: impl IntoIterator<Item = Type>) -> Self {
        self.parameter_types.extend(types);
        self
    }

    pub fn call_kind(mut self, call_kind: CallKind) -> Self {
        self.call_kind = call_kind;
        self
    }

    pub fn from_descriptor(descriptor: &MethodDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            return_type: Some(descriptor.return_type.clone()),
            parameter_types: descriptor.parameter_types.to_vec(),
            call_kind: descriptor.call_kind,
        }
    }

    pub fn build(self) -> JniResult<MethodDescriptor> {
        validate_member_name(&self.name, "Method")?;
        let return_type = self.return_type.unwrap_or(Type::VOID);
        if let Some(index) = self.parameter_types.iter().position(Type::is_void) {
            return Err(JniError::InvalidDescriptor(format!(
                "Parameter {} of '{}' cannot be void",
                index, self.name
            )));
        }
        if self.name == "<init>" {
            if !return_type.is_void() {
                return Err(JniError::InvalidDescriptor(
                    "Constructors must return void".to_string(),
                ));
            }
            if self.call_kind == CallKind::Static {
                return Err(JniError::InvalidDescriptor(
                    "Constructors cannot be static".to_string(),
                ));
            }
        }

        let mut signature = String::from("(");
        for ty in &self.parameter_types {
            ty.write_signature(&mut signature);
        }
        signature.push(')');
        return_type.write_signature(&mut signature);

        Ok(MethodDescriptor {
            name: Arc::from(self.name),
            return_type,
            parameter_types: Arc::from(self.parameter_types),
            call_kind: self.call_kind,
            signature: Arc::from(signature),
        })
    }
}

/// Split `(params)ret` into its parameter and return types.
pub fn parse_method_signature(signature: &str) -> JniResult<(Vec<Type>, Type)> {
    let mut parser = SignatureParser::new(signature);
    parser.expect(b'(')?;
    let mut params = Vec::new();
    while parser.peek() != Some(b')') {
        params.push(parser.parse_type(false)?);
    }
    parser.expect(b')')?;
    let return_type = parser.parse_type(true)?;
    parser.expect_end()?;
    Ok((params, return_type))
}
