//! Per-kernel argument vectors for the native-versus-portable-IR runs.
//!
//! One `TestVectors` is generated from the kernel's declared arguments,
//! then cloned byte-for-byte for the second build of the same kernel.
//! After both runs the vectors are compared argument by argument.

use std::fmt;

use clcts_datagen::{
    ArgRng, Comparison, DataGenerator, GenContext, KernelArgInfo, KernelArgValue,
};
use tracing::debug;

use crate::error::Result;

/// The generated value for every argument of one kernel, in index order.
#[derive(Debug)]
pub struct TestVectors {
    args: Vec<(KernelArgInfo, KernelArgValue)>,
}

/// First difference found between two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorMismatch {
    pub arg_index: usize,
    pub arg_name: String,
    pub type_name: String,
    pub offset: usize,
}

impl fmt::Display for VectorMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "result diff in argument {} ({} {}) at offset {}",
            self.arg_index, self.type_name, self.arg_name, self.offset
        )
    }
}

impl TestVectors {
    /// Generate fresh values for every declared argument.
    pub fn generate(
        registry: &DataGenerator,
        ctx: &GenContext,
        infos: &[KernelArgInfo],
        rng: &mut ArgRng,
    ) -> Result<Self> {
        let mut args = Vec::with_capacity(infos.len());
        for info in infos {
            let value = registry.generate(ctx, info, rng, None)?;
            debug!(arg = %info, size = value.size(), "generated argument");
            args.push((info.clone(), value));
        }
        Ok(Self { args })
    }

    /// Clone through the registry's reference path, reproducing each
    /// argument byte-for-byte for the second kernel build.
    pub fn clone_for_replay(
        &self,
        registry: &DataGenerator,
        ctx: &GenContext,
        rng: &mut ArgRng,
    ) -> Result<Self> {
        let mut args = Vec::with_capacity(self.args.len());
        for (info, value) in &self.args {
            let clone = registry.generate(ctx, info, rng, Some(value))?;
            args.push((info.clone(), clone));
        }
        Ok(Self { args })
    }

    /// Compare two runs' vectors; `None` means every argument agrees
    /// within `ulps` for declared float/double buffers and byte-for-byte
    /// otherwise.
    pub fn compare(&self, other: &TestVectors, ulps: f32) -> Option<VectorMismatch> {
        for (index, ((info, lhs), (_, rhs))) in
            self.args.iter().zip(&other.args).enumerate()
        {
            if let Comparison::Mismatch { offset } = lhs.compare(rhs, &info.type_name, ulps) {
                return Some(VectorMismatch {
                    arg_index: index,
                    arg_name: info.name.clone(),
                    type_name: info.type_name.clone(),
                    offset,
                });
            }
        }
        if self.args.len() != other.args.len() {
            let index = self.args.len().min(other.args.len());
            return Some(VectorMismatch {
                arg_index: index,
                arg_name: String::new(),
                type_name: String::new(),
                offset: 0,
            });
        }
        None
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn infos(&self) -> impl Iterator<Item = &KernelArgInfo> {
        self.args.iter().map(|(info, _)| info)
    }

    pub fn values(&self) -> Vec<&KernelArgValue> {
        self.args.iter().map(|(_, v)| v).collect()
    }

    pub fn values_mut(&mut self) -> Vec<&mut KernelArgValue> {
        self.args.iter_mut().map(|(_, v)| v).collect()
    }

    /// Owned snapshot of the values, for the bind layer.
    pub fn into_parts(self) -> (Vec<KernelArgInfo>, Vec<KernelArgValue>) {
        self.args.into_iter().unzip()
    }

    pub fn from_parts(infos: Vec<KernelArgInfo>, values: Vec<KernelArgValue>) -> Self {
        Self { args: infos.into_iter().zip(values).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clcts_datagen::{AddressQualifier, WorkSizeInfo};

    fn fixture() -> (DataGenerator, GenContext, Vec<KernelArgInfo>) {
        let infos = vec![
            KernelArgInfo::new("src", "float4*").with_address(AddressQualifier::Global),
            KernelArgInfo::new("n", "uint"),
            KernelArgInfo::new("dst", "float*").with_address(AddressQualifier::Global),
        ];
        (DataGenerator::default(), GenContext::mock(WorkSizeInfo::one_dim(8)), infos)
    }

    #[test]
    fn replay_clone_compares_equal() {
        let (reg, ctx, infos) = fixture();
        let mut rng = ArgRng::new(99);
        let original = TestVectors::generate(&reg, &ctx, &infos, &mut rng).unwrap();
        let replay = original.clone_for_replay(&reg, &ctx, &mut rng).unwrap();
        assert_eq!(original.compare(&replay, 0.0), None);
    }

    #[test]
    fn independent_generations_differ() {
        let (reg, ctx, infos) = fixture();
        let a = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(1)).unwrap();
        let b = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(2)).unwrap();
        assert!(a.compare(&b, 0.0).is_some());
    }

    #[test]
    fn same_seed_generations_agree() {
        let (reg, ctx, infos) = fixture();
        let a = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(7)).unwrap();
        let b = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(7)).unwrap();
        assert_eq!(a.compare(&b, 0.0), None);
    }

    #[test]
    fn mismatch_names_the_argument() {
        let (reg, ctx, infos) = fixture();
        let a = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(7)).unwrap();
        let mut b = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(7)).unwrap();
        if let Some(bytes) = b.values_mut()[2].bytes_mut() {
            bytes[4] ^= 0xFF;
        }
        let mismatch = a.compare(&b, 0.0).expect("must differ");
        assert_eq!(mismatch.arg_index, 2);
        assert_eq!(mismatch.arg_name, "dst");
        assert_eq!(mismatch.offset, 4);
        assert!(mismatch.to_string().contains("float* dst"));
    }

    #[test]
    fn parts_round_trip() {
        let (reg, ctx, infos) = fixture();
        let v = TestVectors::generate(&reg, &ctx, &infos, &mut ArgRng::new(3)).unwrap();
        let (i, vals) = v.into_parts();
        let rebuilt = TestVectors::from_parts(i, vals);
        assert_eq!(rebuilt.len(), 3);
    }
}
