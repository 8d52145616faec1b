//! Per-type kernel-argument generators.
//!
//! Each generator synthesizes a correctly sized and aligned
//! [`KernelArgValue`] for one declared type family, either filled with
//! fresh random data or cloned byte-for-byte from a reference value (so a
//! portable-IR kernel run sees exactly the inputs its native counterpart
//! saw).

use crate::arg_info::{AddressQualifier, KernelArgInfo};
use crate::arg_value::{AlignedBuffer, KernelArgValue};
use crate::error::{DataGenError, Result};
use crate::image::{ChannelOrder, ChannelType, ImageDesc, ImageFormat, ImageType};
use crate::layout::{ScalarKind, StructLayout, VectorLayout};
use crate::limits::GenContext;
use crate::rng::ArgRng;
use crate::sampler::SamplerValue;

/// Strategy object producing argument values for one declared type family.
pub trait KernelArgGenerator: std::fmt::Debug + Send + Sync {
    fn generate(
        &self,
        ctx: &GenContext,
        info: &KernelArgInfo,
        rng: &mut ArgRng,
        reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue>;
}

/// Registered placeholder for types the suite knows about but cannot
/// synthesize yet; using one is a descriptive error, never silent data.
#[derive(Debug)]
pub struct NotImplementedGenerator;

impl KernelArgGenerator for NotImplementedGenerator {
    fn generate(
        &self,
        _ctx: &GenContext,
        info: &KernelArgInfo,
        _rng: &mut ArgRng,
        _reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        Err(DataGenError::NotImplemented(info.type_name.clone()))
    }
}

fn clone_reference(reference: &KernelArgValue, expected_size: usize) -> Result<AlignedBuffer> {
    let bytes = reference.bytes().ok_or(DataGenError::ReferenceSizeMismatch {
        reference: 0,
        generated: expected_size,
    })?;
    if bytes.len() != expected_size {
        return Err(DataGenError::ReferenceSizeMismatch {
            reference: bytes.len(),
            generated: expected_size,
        });
    }
    match reference {
        KernelArgValue::Value { data }
        | KernelArgValue::Buffer { data }
        | KernelArgValue::Image { data, .. } => Ok(data.clone()),
        _ => unreachable!("bytes() returned Some for a payload-free value"),
    }
}

// ── Scalars and vectors ──────────────────────────────────────────────────────

/// Generator for the scalar and vector numeric types.
#[derive(Debug)]
pub struct ScalarArgGenerator {
    layout: VectorLayout,
}

impl ScalarArgGenerator {
    pub fn new(layout: VectorLayout) -> Self {
        Self { layout }
    }

    fn fill(&self, buf: &mut [u8], rng: &mut ArgRng) {
        fill_scalars(self.layout.kind, buf, rng);
    }
}

/// Fill a byte buffer with type-appropriate random values.
fn fill_scalars(kind: ScalarKind, buf: &mut [u8], rng: &mut ArgRng) {
    let elem = kind.size();
    for chunk in buf.chunks_exact_mut(elem) {
        match kind {
            ScalarKind::Bool => chunk[0] = u8::from(rng.next_bool()),
            ScalarKind::Char => chunk[0] = rng.next_i8(i8::MIN, i8::MAX) as u8,
            ScalarKind::UChar => chunk[0] = rng.next_u8(0, u8::MAX),
            ScalarKind::Short => {
                chunk.copy_from_slice(&rng.next_i16(i16::MIN, i16::MAX).to_ne_bytes());
            }
            ScalarKind::UShort => {
                chunk.copy_from_slice(&rng.next_u16(0, u16::MAX).to_ne_bytes());
            }
            ScalarKind::Int => {
                chunk.copy_from_slice(&rng.next_i32(i32::MIN, i32::MAX).to_ne_bytes());
            }
            ScalarKind::UInt => {
                chunk.copy_from_slice(&rng.next_u32(0, u32::MAX).to_ne_bytes());
            }
            ScalarKind::Long => {
                chunk.copy_from_slice(&rng.next_i64(i64::MIN, i64::MAX).to_ne_bytes());
            }
            ScalarKind::ULong => {
                chunk.copy_from_slice(&rng.next_u64(0, u64::MAX).to_ne_bytes());
            }
            // The float ranges mirror the original generator table: large
            // enough to exercise the exponent, exactly representable.
            ScalarKind::Float => {
                chunk
                    .copy_from_slice(&rng.next_f32(-16_777_216.0, 16_777_216.0).to_ne_bytes());
            }
            ScalarKind::Double => {
                chunk
                    .copy_from_slice(&rng.next_f64(-16_777_216.0, 16_777_216.0).to_ne_bytes());
            }
        }
    }
}

impl KernelArgGenerator for ScalarArgGenerator {
    fn generate(
        &self,
        ctx: &GenContext,
        info: &KernelArgInfo,
        rng: &mut ArgRng,
        reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        let align = self.layout.alignment();

        if info.is_buffer() {
            let mut size = ctx.ws.flat_global_size()? * align;

            if info.address == AddressQualifier::Local {
                // Divide the remaining device local memory across the
                // kernel's __local arguments.
                if ctx.limits.num_local_args > 0 {
                    let per_arg =
                        (ctx.limits.available_local_mem() / u64::from(ctx.limits.num_local_args))
                            as usize;
                    size = size.min(per_arg);
                }
                return Ok(KernelArgValue::Local { size });
            }

            if info.address == AddressQualifier::Constant {
                size = size.min(ctx.limits.max_constant_buffer_size as usize);
            }

            let data = match reference {
                Some(r) => clone_reference(r, size)?,
                None => {
                    let mut buf = AlignedBuffer::new(size, align, &info.type_name)?;
                    self.fill(&mut buf, rng);
                    buf
                }
            };
            Ok(KernelArgValue::Buffer { data })
        } else {
            // By-value argument: one (padded) element.
            let size = self.layout.value_size();
            let data = match reference {
                Some(r) => clone_reference(r, size)?,
                None => {
                    let mut buf = AlignedBuffer::new(size, align, &info.type_name)?;
                    self.fill(&mut buf, rng);
                    buf
                }
            };
            Ok(KernelArgValue::Value { data })
        }
    }
}

// ── Structs ──────────────────────────────────────────────────────────────────

/// Generator for the suite's aggregate types.
#[derive(Debug)]
pub struct StructArgGenerator {
    layout: StructLayout,
}

impl StructArgGenerator {
    pub fn new(layout: StructLayout) -> Self {
        Self { layout }
    }

    fn fill(&self, buf: &mut [u8], rng: &mut ArgRng) {
        let stride = self.layout.size();
        for elem in buf.chunks_exact_mut(stride) {
            match self.layout {
                StructLayout::TypedefStructType => {
                    for i in 0..4 {
                        let v = rng.next_f32(-16_777_216.0, 16_777_216.0);
                        elem[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
                    }
                    let v = rng.next_i32(0, i32::MAX);
                    elem[16..20].copy_from_slice(&v.to_ne_bytes());
                    // Bytes 20..32 are struct padding, left zeroed.
                }
                StructLayout::ImageKernelData => {
                    for i in 0..5 {
                        let v = rng.next_i32(0, i32::MAX);
                        elem[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
                    }
                }
                StructLayout::TestStruct => {
                    for i in 0..16 {
                        // The original fills the double vector from the
                        // float range.
                        let v = f64::from(rng.next_f32(-16_777_216.0, 16_777_216.0));
                        elem[i * 8..i * 8 + 8].copy_from_slice(&v.to_ne_bytes());
                    }
                }
                // work_item_data is an output block; it starts zeroed.
                StructLayout::WorkItemData => {}
            }
        }
    }
}

impl KernelArgGenerator for StructArgGenerator {
    fn generate(
        &self,
        ctx: &GenContext,
        info: &KernelArgInfo,
        rng: &mut ArgRng,
        reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        let align = self.layout.alignment();
        let stride = self.layout.size();

        if info.is_buffer() {
            let mut size = ctx.ws.flat_global_size()? * stride;
            if info.address == AddressQualifier::Constant {
                // Cap at the constant buffer limit, on a whole-element
                // boundary.
                let cap = ctx.limits.max_constant_buffer_size as usize / stride * stride;
                size = size.min(cap.max(stride));
            }
            let data = match reference {
                Some(r) => clone_reference(r, size)?,
                None => {
                    let mut buf = AlignedBuffer::new(size, align, &info.type_name)?;
                    self.fill(&mut buf, rng);
                    buf
                }
            };
            Ok(KernelArgValue::Buffer { data })
        } else {
            let data = match reference {
                Some(r) => clone_reference(r, stride)?,
                None => {
                    let mut buf = AlignedBuffer::new(stride, align, &info.type_name)?;
                    self.fill(&mut buf, rng);
                    buf
                }
            };
            Ok(KernelArgValue::Value { data })
        }
    }
}

// ── Images ───────────────────────────────────────────────────────────────────

/// Generator for one image dimensionality and channel data type.
///
/// The channel order defaults to RGBA and can be re-pointed by the image
/// suites; [`ImageArgGenerator::supports`] validates an order against the
/// device's supported-format list before any device object is built.
#[derive(Debug, Clone)]
pub struct ImageArgGenerator {
    image_type: ImageType,
    channel_type: ChannelType,
    order: ChannelOrder,
    min_value: i8,
    max_value: i8,
}

impl ImageArgGenerator {
    pub fn new(image_type: ImageType, channel_type: ChannelType) -> Self {
        Self {
            image_type,
            channel_type,
            order: ChannelOrder::Rgba,
            min_value: i8::MIN,
            max_value: i8::MAX,
        }
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn set_channel_order(&mut self, order: ChannelOrder) {
        self.order = order;
    }

    pub fn format(&self) -> ImageFormat {
        ImageFormat { order: self.order, channel_type: self.channel_type }
    }

    /// Whether the device's supported-format list covers this generator's
    /// current format.
    pub fn supports(&self, supported: &[ImageFormat]) -> bool {
        supported.contains(&self.format())
    }
}

impl KernelArgGenerator for ImageArgGenerator {
    fn generate(
        &self,
        _ctx: &GenContext,
        info: &KernelArgInfo,
        rng: &mut ArgRng,
        reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        let desc = ImageDesc::for_type(self.image_type);
        let size = desc.byte_size();
        // RGBA channel stride of cl_int.
        let align = crate::image::PIXEL_BYTES;

        let data = match reference {
            Some(r) => clone_reference(r, size)?,
            None => {
                let mut buf = AlignedBuffer::new(size, align, &info.type_name)?;
                for b in buf.iter_mut() {
                    *b = rng.next_i8(self.min_value, self.max_value) as u8;
                }
                buf
            }
        };
        Ok(KernelArgValue::Image { data, format: self.format(), desc })
    }
}

// ── Samplers ─────────────────────────────────────────────────────────────────

/// Generator for `sampler_t` arguments with explicit settings.
#[derive(Debug, Default)]
pub struct SamplerArgGenerator {
    value: SamplerValue,
}

impl SamplerArgGenerator {
    pub fn new(value: SamplerValue) -> Self {
        Self { value }
    }
}

impl KernelArgGenerator for SamplerArgGenerator {
    fn generate(
        &self,
        _ctx: &GenContext,
        _info: &KernelArgInfo,
        _rng: &mut ArgRng,
        _reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        Ok(KernelArgValue::Sampler(self.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg_info::AccessQualifier;
    use crate::work_size::WorkSizeInfo;

    fn ctx() -> GenContext {
        GenContext::mock(WorkSizeInfo::one_dim(32))
    }

    fn rng() -> ArgRng {
        ArgRng::new(0x5eed)
    }

    #[test]
    fn by_value_vec3_pads_to_four_elements() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::Float, 3));
        let info = KernelArgInfo::new("v", "float3");
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        assert_eq!(value.size(), 16);
    }

    #[test]
    fn global_buffer_scales_with_flat_work_size() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::Int, 4));
        let info = KernelArgInfo::new("buf", "int4*").with_address(AddressQualifier::Global);
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        // 32 work items x int4.
        assert_eq!(value.size(), 32 * 16);
        assert!(matches!(value, KernelArgValue::Buffer { .. }));
    }

    #[test]
    fn constant_buffer_respects_device_cap() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::Double, 16));
        let info = KernelArgInfo::new("cbuf", "double16*").with_address(AddressQualifier::Constant);
        let mut context = ctx();
        context.limits.max_constant_buffer_size = 1024;
        let value = gen.generate(&context, &info, &mut rng(), None).unwrap();
        assert!(value.size() <= 1024);
    }

    #[test]
    fn local_buffer_carries_no_host_payload() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::Float, 1));
        let info = KernelArgInfo::new("scratch", "float*").with_address(AddressQualifier::Local);
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        assert!(matches!(value, KernelArgValue::Local { .. }));
        assert!(value.bytes().is_none());
    }

    #[test]
    fn local_buffer_divides_device_local_memory() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::Double, 16));
        let info = KernelArgInfo::new("scratch", "double16*").with_address(AddressQualifier::Local);
        let mut context = ctx();
        context.limits.local_mem_size = 4096;
        context.limits.num_local_args = 2;
        let value = gen.generate(&context, &info, &mut rng(), None).unwrap();
        assert!(value.size() <= 2048, "size {} exceeds per-arg share", value.size());
    }

    #[test]
    fn reference_clone_is_byte_identical() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::UInt, 2));
        let info = KernelArgInfo::new("buf", "uint2*").with_address(AddressQualifier::Global);
        let mut r = rng();
        let original = gen.generate(&ctx(), &info, &mut r, None).unwrap();
        let clone = gen.generate(&ctx(), &info, &mut r, Some(&original)).unwrap();
        assert_eq!(original.bytes(), clone.bytes());
    }

    #[test]
    fn reference_of_wrong_size_is_rejected() {
        let gen = ScalarArgGenerator::new(VectorLayout::new(ScalarKind::UInt, 2));
        let by_value = KernelArgInfo::new("x", "uint2");
        let as_buffer = KernelArgInfo::new("buf", "uint2*").with_address(AddressQualifier::Global);
        let mut r = rng();
        let small = gen.generate(&ctx(), &by_value, &mut r, None).unwrap();
        let err = gen.generate(&ctx(), &as_buffer, &mut r, Some(&small)).unwrap_err();
        assert!(matches!(err, DataGenError::ReferenceSizeMismatch { .. }));
    }

    #[test]
    fn struct_buffer_uses_struct_stride() {
        let gen = StructArgGenerator::new(StructLayout::TestStruct);
        let info = KernelArgInfo::new("s", "testStruct*").with_address(AddressQualifier::Global);
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        assert_eq!(value.size(), 32 * 128);
    }

    #[test]
    fn work_item_data_is_zero_filled() {
        let gen = StructArgGenerator::new(StructLayout::WorkItemData);
        let info =
            KernelArgInfo::new("wi", "work_item_data*").with_address(AddressQualifier::Global);
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        assert!(value.bytes().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn image_generator_fills_whole_payload() {
        let gen = ImageArgGenerator::new(ImageType::Image2d, ChannelType::Float);
        let info = KernelArgInfo::new("img", "image2d_t").with_access(AccessQualifier::ReadOnly);
        let value = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        let KernelArgValue::Image { desc, format, data } = value else {
            panic!("expected an image value");
        };
        assert_eq!(data.len(), desc.byte_size());
        assert_eq!(format.order, ChannelOrder::Rgba);
    }

    #[test]
    fn image_format_support_check() {
        let gen = ImageArgGenerator::new(ImageType::Image2d, ChannelType::Float)
            .with_channel_order(ChannelOrder::Intensity);
        let supported =
            [ImageFormat { order: ChannelOrder::Rgba, channel_type: ChannelType::Float }];
        assert!(!gen.supports(&supported));
        let supported =
            [ImageFormat { order: ChannelOrder::Intensity, channel_type: ChannelType::Float }];
        assert!(gen.supports(&supported));
    }

    #[test]
    fn sampler_generator_passes_its_settings_through() {
        let value = SamplerValue::default();
        let gen = SamplerArgGenerator::new(value);
        let info = KernelArgInfo::new("smp", "sampler_t");
        let out = gen.generate(&ctx(), &info, &mut rng(), None).unwrap();
        assert_eq!(out, KernelArgValue::Sampler(value));
    }

    #[test]
    fn not_implemented_generator_errors_descriptively() {
        let gen = NotImplementedGenerator;
        let info = KernelArgInfo::new("h", "half4");
        let err = gen.generate(&ctx(), &info, &mut rng(), None).unwrap_err();
        assert!(err.to_string().contains("half4"));
    }
}
