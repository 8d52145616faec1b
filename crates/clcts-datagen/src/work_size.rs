//! Work-size descriptor derived once per kernel.

use crate::error::{DataGenError, Result};

pub const MAX_WORK_DIM: usize = 3;

/// Work dimensionality plus per-dimension global/local sizes and offsets.
///
/// Derived from the kernel's compiled work-group-size attribute and the
/// device limits; lives for one test invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSizeInfo {
    pub work_dim: u32,
    pub global_work_offset: [usize; MAX_WORK_DIM],
    pub global_work_size: [usize; MAX_WORK_DIM],
    pub local_work_size: [usize; MAX_WORK_DIM],
}

impl Default for WorkSizeInfo {
    fn default() -> Self {
        Self {
            work_dim: 1,
            global_work_offset: [0; MAX_WORK_DIM],
            global_work_size: [1, 1, 1],
            local_work_size: [1, 1, 1],
        }
    }
}

impl WorkSizeInfo {
    /// One-dimensional range with the original suite's split rule: the
    /// local size is a quarter of the global size when it divides evenly,
    /// otherwise half.
    pub fn one_dim(global: usize) -> Self {
        let local = if global % 4 == 0 { global / 4 } else { global / 2 };
        Self {
            work_dim: 1,
            global_work_offset: [0; MAX_WORK_DIM],
            global_work_size: [global, 1, 1],
            local_work_size: [local.max(1), 1, 1],
        }
    }

    /// The flat element count across all active dimensions.
    pub fn flat_global_size(&self) -> Result<usize> {
        match self.work_dim {
            1 => Ok(self.global_work_size[0]),
            2 => Ok(self.global_work_size[0] * self.global_work_size[1]),
            3 => Ok(self.global_work_size[0]
                * self.global_work_size[1]
                * self.global_work_size[2]),
            other => Err(DataGenError::InvalidWorkDim(other)),
        }
    }

    /// Apply a compiled `reqd_work_group_size` attribute: the global sizes
    /// become the compiled sizes and local sizes are clamped to them.
    pub fn apply_compiled_work_group_size(&mut self, compiled: [usize; MAX_WORK_DIM]) {
        if compiled[0] == 0 {
            return;
        }
        self.global_work_size = compiled;
        for i in 0..MAX_WORK_DIM {
            if self.local_work_size[i] > compiled[i] {
                self.local_work_size[i] = compiled[i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_size_multiplies_active_dims() {
        let mut ws = WorkSizeInfo::default();
        ws.work_dim = 3;
        ws.global_work_size = [4, 5, 6];
        assert_eq!(ws.flat_global_size().unwrap(), 120);
    }

    #[test]
    fn flat_size_rejects_bad_dim() {
        let mut ws = WorkSizeInfo::default();
        ws.work_dim = 4;
        assert!(ws.flat_global_size().is_err());
    }

    #[test]
    fn one_dim_prefers_quarter_split() {
        let ws = WorkSizeInfo::one_dim(32);
        assert_eq!(ws.local_work_size[0], 8);
        let ws = WorkSizeInfo::one_dim(30);
        assert_eq!(ws.local_work_size[0], 15);
    }

    #[test]
    fn compiled_attribute_overrides_global_size() {
        let mut ws = WorkSizeInfo::one_dim(32);
        ws.apply_compiled_work_group_size([4, 1, 1]);
        assert_eq!(ws.global_work_size, [4, 1, 1]);
        assert_eq!(ws.local_work_size, [4, 1, 1]);
    }

    #[test]
    fn zero_compiled_attribute_is_ignored() {
        let mut ws = WorkSizeInfo::one_dim(32);
        let before = ws;
        ws.apply_compiled_work_group_size([0, 0, 0]);
        assert_eq!(ws, before);
    }
}
