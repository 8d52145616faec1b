//! Kernel-argument data generation.
//!
//! Synthesizes deterministic, correctly laid out argument data for OpenCL
//! kernels from their declared argument types alone: scalars and vectors,
//! the suite's aggregate types, images, and samplers. The same seed always
//! produces the same bytes, and any generated value can be re-issued as a
//! byte-exact reference for a second kernel build, which is what makes
//! native-versus-portable-IR output comparison meaningful.
//!
//! Everything except [`bind`] is pure host logic and compiles without an
//! OpenCL runtime; enable the `driver` feature to turn values into device
//! objects.

pub mod arg_info;
pub mod arg_value;
#[cfg(feature = "driver")]
pub mod bind;
pub mod error;
pub mod generators;
pub mod image;
pub mod image_space;
pub mod layout;
pub mod limits;
pub mod registry;
pub mod rng;
pub mod sampler;
pub mod ulp;
pub mod work_size;

pub use arg_info::{AccessQualifier, AddressQualifier, KernelArgInfo, TypeQualifiers};
pub use arg_value::{AlignedBuffer, Comparison, KernelArgValue};
pub use error::{DataGenError, Result};
pub use generators::KernelArgGenerator;
pub use image::{ChannelOrder, ChannelType, ImageDesc, ImageFormat, ImageType};
pub use image_space::{ImageValuesEntry, ImageValuesGenerator};
pub use layout::{ScalarKind, StructLayout, VectorLayout};
pub use limits::{DeviceLimits, GenContext};
pub use registry::DataGenerator;
pub use rng::ArgRng;
pub use sampler::{AddressingMode, FilterMode, SamplerValue, SamplerValuesGenerator};
pub use ulp::{ulp_error_f32, ulp_error_f64};
pub use work_size::WorkSizeInfo;
