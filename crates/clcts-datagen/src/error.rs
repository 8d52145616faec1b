//! Error types for kernel-argument generation.

use thiserror::Error;

/// Failures raised while synthesizing or binding kernel arguments.
///
/// All of these propagate up and fail the enclosing test; generation is
/// never retried with different parameters.
#[derive(Debug, Error)]
pub enum DataGenError {
    /// No generator is registered for the declared argument type.
    #[error("no generator for kernel argument type {type_name:?} (argument {arg_name:?})")]
    UnknownType { type_name: String, arg_name: String },

    /// The type is registered but generation is not implemented for it.
    #[error("kernel argument generator for {0:?} is not implemented")]
    NotImplemented(String),

    /// Aligned host allocation failed.
    #[error("aligned allocation of {size} bytes (align {align}) failed for {type_name}")]
    Allocation { type_name: String, size: usize, align: usize },

    /// A reference argument's byte size does not match the freshly derived layout.
    #[error("reference argument size {reference} does not match generated size {generated}")]
    ReferenceSizeMismatch { reference: usize, generated: usize },

    /// The requested channel order is not supported for the image type.
    #[error("channel order {order:?} is unsupported for {image_type:?} on this device")]
    UnsupportedChannelOrder { order: String, image_type: String },

    /// The work-size descriptor is malformed (dimension outside 1..=3).
    #[error("invalid work dimension {0} (must be 1..=3)")]
    InvalidWorkDim(u32),

    /// A native API call returned a non-success status code.
    #[error("{call} returned non-success status {code}")]
    Api { call: &'static str, code: i32 },
}

pub type Result<T> = std::result::Result<T, DataGenError>;

impl DataGenError {
    pub fn api(call: &'static str, code: i32) -> Self {
        Self::Api { call, code }
    }
}
