//! Kernel argument descriptors, as reported by the kernel-arg-info query.

use std::fmt;

use bitflags::bitflags;

/// Address space the argument lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressQualifier {
    #[default]
    Private,
    Global,
    Local,
    Constant,
}

/// Access qualifier, meaningful for image arguments only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessQualifier {
    #[default]
    None,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

bitflags! {
    /// `const` / `volatile` / `restrict` markers on the declared type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TypeQualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

/// One kernel argument's declaration: name, declared type name, and the
/// three qualifier families. The type name string is the registry key the
/// generator table is searched with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KernelArgInfo {
    pub name: String,
    pub type_name: String,
    pub address: AddressQualifier,
    pub access: AccessQualifier,
    pub qualifiers: TypeQualifiers,
}

impl KernelArgInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into(), ..Self::default() }
    }

    pub fn with_address(mut self, address: AddressQualifier) -> Self {
        self.address = address;
        self
    }

    pub fn with_access(mut self, access: AccessQualifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: TypeQualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    /// Pointer-typed arguments get a device buffer; everything else is
    /// passed by value.
    pub fn is_buffer(&self) -> bool {
        self.type_name.ends_with('*')
    }
}

impl fmt::Display for KernelArgInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_types_are_buffers() {
        assert!(KernelArgInfo::new("src", "float4*").is_buffer());
        assert!(!KernelArgInfo::new("x", "float4").is_buffer());
    }

    #[test]
    fn builder_sets_qualifiers() {
        let info = KernelArgInfo::new("img", "image2d_t")
            .with_access(AccessQualifier::ReadOnly)
            .with_address(AddressQualifier::Global)
            .with_qualifiers(TypeQualifiers::CONST | TypeQualifiers::RESTRICT);
        assert_eq!(info.access, AccessQualifier::ReadOnly);
        assert!(info.qualifiers.contains(TypeQualifiers::CONST));
        assert!(!info.qualifiers.contains(TypeQualifiers::VOLATILE));
    }

    #[test]
    fn display_reads_like_a_declaration() {
        let info = KernelArgInfo::new("dst", "int*");
        assert_eq!(info.to_string(), "int* dst");
    }
}
