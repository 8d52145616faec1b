//! Type-name-keyed registry of kernel-argument generators.
//!
//! Lookup is exact-match first; failing that, the longest registered key
//! that prefixes the queried type name wins, so `image2d_float` falls back
//! to the `image2d` family rather than whatever registration order happens
//! to offer. Unknown types are a hard, descriptive error.

use std::collections::BTreeMap;

use crate::arg_info::KernelArgInfo;
use crate::arg_value::KernelArgValue;
use crate::error::{DataGenError, Result};
use crate::generators::{
    ImageArgGenerator, KernelArgGenerator, NotImplementedGenerator, SamplerArgGenerator,
    ScalarArgGenerator, StructArgGenerator,
};
use crate::image::{ChannelType, ImageType};
use crate::layout::{ScalarKind, StructLayout, VectorLayout, VECTOR_SIZES};
use crate::limits::GenContext;
use crate::rng::ArgRng;

/// Registry mapping declared kernel argument types to their generators.
pub struct DataGenerator {
    generators: BTreeMap<String, Box<dyn KernelArgGenerator>>,
}

impl std::fmt::Debug for DataGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGenerator").field("types", &self.generators.len()).finish()
    }
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::with_default_table()
    }
}

impl DataGenerator {
    /// An empty registry, for suites that register their own generators.
    pub fn empty() -> Self {
        Self { generators: BTreeMap::new() }
    }

    /// The full built-in type table: every scalar and vector spelling (by
    /// value and as a buffer), the aggregate types, images, and samplers.
    /// `half` is registered but deliberately unimplemented.
    pub fn with_default_table() -> Self {
        let mut reg = Self::empty();

        for kind in ScalarKind::ALL {
            // bool has no vector forms.
            let widths: &[usize] = if kind == ScalarKind::Bool { &[1] } else { &VECTOR_SIZES };
            for &width in widths {
                let name = if width == 1 {
                    kind.cl_name().to_string()
                } else {
                    format!("{}{width}", kind.cl_name())
                };
                let layout = VectorLayout::new(kind, width);
                reg.set(&name, Box::new(ScalarArgGenerator::new(layout)));
                reg.set(&format!("{name}*"), Box::new(ScalarArgGenerator::new(layout)));
            }
        }

        // half lacks a host-side representation here; registered so the
        // error names the type instead of claiming it is unknown.
        for &width in &VECTOR_SIZES {
            let name = if width == 1 { "half".to_string() } else { format!("half{width}") };
            reg.set(&name, Box::new(NotImplementedGenerator));
            reg.set(&format!("{name}*"), Box::new(NotImplementedGenerator));
        }

        for layout in [
            StructLayout::TypedefStructType,
            StructLayout::ImageKernelData,
            StructLayout::TestStruct,
            StructLayout::WorkItemData,
        ] {
            reg.set(layout.type_name(), Box::new(StructArgGenerator::new(layout)));
            reg.set(
                &format!("{}*", layout.type_name()),
                Box::new(StructArgGenerator::new(layout)),
            );
        }
        // The kernels spell the typedef'd struct both ways.
        reg.set("struct_type", Box::new(StructArgGenerator::new(StructLayout::TypedefStructType)));
        reg.set(
            "struct_type*",
            Box::new(StructArgGenerator::new(StructLayout::TypedefStructType)),
        );

        for ty in ImageType::ALL {
            // The bare `image*_t` spelling defaults to float channels.
            reg.set(
                &format!("{}_t", ty.base_name()),
                Box::new(ImageArgGenerator::new(ty, ChannelType::Float)),
            );
            for (suffix, channel) in [
                ("float", ChannelType::Float),
                ("int", ChannelType::SignedInt32),
                ("uint", ChannelType::UnsignedInt32),
            ] {
                reg.set(
                    &format!("{}_{suffix}", ty.base_name()),
                    Box::new(ImageArgGenerator::new(ty, channel)),
                );
            }
        }

        reg.set("sampler_t", Box::new(SamplerArgGenerator::default()));

        reg
    }

    /// Register or replace the generator for a type name.
    pub fn set(&mut self, type_name: &str, generator: Box<dyn KernelArgGenerator>) {
        self.generators.insert(type_name.to_string(), generator);
    }

    /// Find the generator for a declared argument type: exact match first,
    /// then the longest registered prefix of the name.
    pub fn lookup(&self, info: &KernelArgInfo) -> Result<&dyn KernelArgGenerator> {
        if let Some(g) = self.generators.get(&info.type_name) {
            return Ok(g.as_ref());
        }
        self.generators
            .iter()
            .filter(|(key, _)| info.type_name.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, g)| g.as_ref())
            .ok_or_else(|| DataGenError::UnknownType {
                type_name: info.type_name.clone(),
                arg_name: info.name.clone(),
            })
    }

    /// Generate a value for one argument, dispatching on its declared type.
    pub fn generate(
        &self,
        ctx: &GenContext,
        info: &KernelArgInfo,
        rng: &mut ArgRng,
        reference: Option<&KernelArgValue>,
    ) -> Result<KernelArgValue> {
        self.lookup(info)?.generate(ctx, info, rng, reference)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arg_info::AddressQualifier;
    use crate::work_size::WorkSizeInfo;

    fn ctx() -> GenContext {
        GenContext::mock(WorkSizeInfo::one_dim(16))
    }

    #[test]
    fn every_scalar_and_vector_spelling_is_registered() {
        let reg = DataGenerator::default();
        for name in ["char", "uchar2", "short3", "ushort4", "int8", "uint16", "long", "ulong2",
            "float4", "double16", "bool"]
        {
            let info = KernelArgInfo::new("x", name);
            assert!(reg.lookup(&info).is_ok(), "{name} missing");
            let buf = KernelArgInfo::new("x", &format!("{name}*"));
            assert!(reg.lookup(&buf).is_ok(), "{name}* missing");
        }
    }

    #[test]
    fn exact_match_wins_over_prefix() {
        let reg = DataGenerator::default();
        // "uchar2" is an exact key; it must not resolve via the "uchar"
        // prefix into a differently sized layout.
        let info = KernelArgInfo::new("x", "uchar2");
        let value = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap();
        assert_eq!(value.size(), 2);
    }

    #[test]
    fn typed_image_names_resolve() {
        let reg = DataGenerator::default();
        let info = KernelArgInfo::new("img", "image2d_array_float");
        let value = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap();
        let KernelArgValue::Image { desc, .. } = value else {
            panic!("expected an image value");
        };
        assert_eq!(desc.image_type, ImageType::Image2dArray);
    }

    #[test]
    fn longest_prefix_wins_over_shorter_registrations() {
        let mut reg = DataGenerator::empty();
        reg.set(
            "image2d",
            Box::new(ImageArgGenerator::new(ImageType::Image2d, ChannelType::Float)),
        );
        reg.set(
            "image2d_array",
            Box::new(ImageArgGenerator::new(ImageType::Image2dArray, ChannelType::Float)),
        );
        // Both keys prefix the query; the longer one must win regardless
        // of map order.
        let info = KernelArgInfo::new("img", "image2d_array_rgba");
        let value = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap();
        let KernelArgValue::Image { desc, .. } = value else {
            panic!("expected an image value");
        };
        assert_eq!(desc.image_type, ImageType::Image2dArray);
    }

    #[test]
    fn unknown_type_names_both_type_and_argument() {
        let reg = DataGenerator::default();
        let info = KernelArgInfo::new("mystery", "quux_t");
        let err = reg.lookup(&info).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("quux_t"));
        assert!(msg.contains("mystery"));
    }

    #[test]
    fn half_is_registered_but_unimplemented() {
        let reg = DataGenerator::default();
        let info = KernelArgInfo::new("h", "half4*");
        let err = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap_err();
        assert!(matches!(err, DataGenError::NotImplemented(_)));
    }

    #[test]
    fn struct_type_alias_resolves() {
        let reg = DataGenerator::default();
        let info =
            KernelArgInfo::new("s", "struct_type*").with_address(AddressQualifier::Global);
        let value = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap();
        assert_eq!(value.size(), 16 * StructLayout::TypedefStructType.size());
    }

    #[test]
    fn sampler_lookup() {
        let reg = DataGenerator::default();
        let info = KernelArgInfo::new("smp", "sampler_t");
        let value = reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).unwrap();
        assert!(matches!(value, KernelArgValue::Sampler(_)));
    }

    #[test]
    fn overriding_a_registration_replaces_it() {
        let mut reg = DataGenerator::default();
        reg.set("float*", Box::new(NotImplementedGenerator));
        let info = KernelArgInfo::new("buf", "float*").with_address(AddressQualifier::Global);
        assert!(reg.generate(&ctx(), &info, &mut ArgRng::new(1), None).is_err());
    }
}
