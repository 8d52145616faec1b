//! Memory-layout rules for OpenCL scalar, vector, and test-struct types.
//!
//! The single rule with teeth: vector-of-3 types occupy and align as four
//! elements, per the OpenCL memory layout specification. Everything else
//! is `element size x vector size`.

use crate::error::{DataGenError, Result};

/// The OpenCL scalar element kinds the generators know how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ScalarKind {
    /// Host size in bytes, identical to the device-side `cl_*` size.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
        }
    }

    /// The OpenCL spelling (`uchar`, `float`, ...).
    pub fn cl_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::UChar => "uchar",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub const ALL: [ScalarKind; 11] = [
        Self::Bool,
        Self::Char,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Double,
    ];
}

/// Vector widths OpenCL defines for every scalar kind.
pub const VECTOR_SIZES: [usize; 6] = [1, 2, 3, 4, 8, 16];

/// Layout of a scalar or vector type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorLayout {
    pub kind: ScalarKind,
    pub vector_size: usize,
}

impl VectorLayout {
    pub fn new(kind: ScalarKind, vector_size: usize) -> Self {
        Self { kind, vector_size }
    }

    /// Elements actually occupied in memory: a 3-vector pads to 4.
    pub fn padded_elements(self) -> usize {
        if self.vector_size == 3 {
            4
        } else {
            self.vector_size
        }
    }

    /// Required alignment of one value, in bytes.
    pub fn alignment(self) -> usize {
        self.kind.size() * self.padded_elements()
    }

    /// Size of one stored value, in bytes (equals the alignment).
    pub fn value_size(self) -> usize {
        self.alignment()
    }

    /// Parse a declared type name like `float4`, `uchar16*`, or `int`.
    /// The trailing `*` (buffer marker) is ignored here; callers consult
    /// [`crate::arg_info::KernelArgInfo::is_buffer`] for that.
    pub fn parse(type_name: &str) -> Option<Self> {
        let base = type_name.trim_end_matches('*');
        for kind in ScalarKind::ALL {
            if let Some(rest) = base.strip_prefix(kind.cl_name()) {
                // The suffix must be a valid vector width; rejects "charlie".
                let vector_size = if rest.is_empty() {
                    1
                } else {
                    match rest.parse::<usize>() {
                        Ok(n) if VECTOR_SIZES.contains(&n) => n,
                        _ => continue,
                    }
                };
                return Some(Self::new(kind, vector_size));
            }
        }
        None
    }
}

/// The four aggregate types the SPIR kernels declare, with the original
/// suite's worst-case size and alignment decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructLayout {
    /// `struct { float4; int; }`, aligned to the float4 member.
    TypedefStructType,
    /// Five packed `cl_int` fields describing an image.
    ImageKernelData,
    /// `struct { double vec[16]; }`, worst-case aligned as one block.
    TestStruct,
    /// Per-work-item identification block of 19 `cl_uint`s, zero-filled.
    WorkItemData,
}

impl StructLayout {
    pub fn type_name(self) -> &'static str {
        match self {
            Self::TypedefStructType => "typedef_struct_type",
            Self::ImageKernelData => "image_kernel_data",
            Self::TestStruct => "testStruct",
            Self::WorkItemData => "work_item_data",
        }
    }

    /// Alignment rule: the size of the largest field.
    pub fn alignment(self) -> usize {
        match self {
            Self::TypedefStructType => 16, // sizeof(float) * 4
            Self::ImageKernelData => 4,
            Self::TestStruct => 128, // sizeof(double) * 16
            Self::WorkItemData => 4,
        }
    }

    /// Stored size per element.
    pub fn size(self) -> usize {
        match self {
            Self::TypedefStructType => 32, // float4 + int, padded to 2 blocks
            Self::ImageKernelData => 20,   // 5 x cl_int
            Self::TestStruct => 128,
            Self::WorkItemData => 76, // 1 + 6*3 cl_uints
        }
    }

    pub fn from_type_name(type_name: &str) -> Result<Self> {
        let base = type_name.trim_end_matches('*');
        match base {
            "typedef_struct_type" | "struct_type" => Ok(Self::TypedefStructType),
            "image_kernel_data" => Ok(Self::ImageKernelData),
            "testStruct" => Ok(Self::TestStruct),
            "work_item_data" => Ok(Self::WorkItemData),
            other => Err(DataGenError::NotImplemented(other.to_string())),
        }
    }
}
