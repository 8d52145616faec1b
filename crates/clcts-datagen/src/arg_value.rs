//! Kernel argument values: aligned host buffers and wrapped objects.
//!
//! A value lives for one test invocation; dropping it releases the host
//! allocation. Device-side objects are created at bind time (see the
//! `driver`-gated [`crate::bind`] module) so the pure layer stays
//! hardware-free.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{DataGenError, Result};
use crate::image::{ImageDesc, ImageFormat};
use crate::sampler::SamplerValue;
use crate::ulp::{ulp_error_f32, ulp_error_f64};

/// Host allocation honoring the OpenCL alignment rule for its type.
#[derive(Debug)]
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
}

// The buffer is plain bytes with unique ownership.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `size` zeroed bytes at the given power-of-two alignment.
    pub fn new(size: usize, align: usize, type_name: &str) -> Result<Self> {
        let align = align.max(1);
        debug_assert!(align.is_power_of_two());
        if size == 0 {
            return Ok(Self { ptr: NonNull::dangling(), size: 0, align });
        }
        let layout = Layout::from_size_align(size, align).map_err(|_| {
            DataGenError::Allocation { type_name: type_name.to_string(), size, align }
        })?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or_else(|| DataGenError::Allocation {
            type_name: type_name.to_string(),
            size,
            align,
        })?;
        Ok(Self { ptr, size, align })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Deref for AlignedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        if self.size == 0 {
            return &[];
        }
        // SAFETY: ptr is valid for size bytes for the lifetime of self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        if self.size == 0 {
            return &mut [];
        }
        // SAFETY: as above, and we hold unique ownership.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.size != 0 {
            // SAFETY: allocated in new() with this exact layout.
            let layout = Layout::from_size_align(self.size, self.align)
                .expect("layout was validated at allocation");
            unsafe { dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        let mut copy = Self::new(self.size, self.align, "clone")
            .expect("allocation succeeded once with this layout");
        copy.copy_from_slice(self);
        copy
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

/// Outcome of comparing two argument values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Match,
    /// First differing byte offset (or element offset for ULP compares).
    Mismatch { offset: usize },
}

impl Comparison {
    pub fn is_match(self) -> bool {
        self == Self::Match
    }
}

/// One kernel argument's value.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelArgValue {
    /// By-value scalar/vector/struct argument.
    Value { data: AlignedBuffer },
    /// Host payload destined for a `__global`/`__constant` device buffer.
    Buffer { data: AlignedBuffer },
    /// `__local` placeholder: size only, no host payload.
    Local { size: usize },
    /// Image payload plus its format and descriptor.
    Image { data: AlignedBuffer, format: ImageFormat, desc: ImageDesc },
    /// Sampler configuration.
    Sampler(SamplerValue),
}

impl KernelArgValue {
    /// The byte size the argument occupies host-side (local buffers report
    /// their device-side size).
    pub fn size(&self) -> usize {
        match self {
            Self::Value { data } | Self::Buffer { data } | Self::Image { data, .. } => data.len(),
            Self::Local { size } => *size,
            Self::Sampler(_) => std::mem::size_of::<usize>(),
        }
    }

    /// Host bytes, when the value carries any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Value { data } | Self::Buffer { data } | Self::Image { data, .. } => Some(data),
            Self::Local { .. } | Self::Sampler(_) => None,
        }
    }

    /// Mutable host bytes, for read-back after execution.
    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Value { data } | Self::Buffer { data } | Self::Image { data, .. } => {
                Some(&mut **data)
            }
            Self::Local { .. } | Self::Sampler(_) => None,
        }
    }

    /// Compare against another value of the same declared type.
    ///
    /// Declared `float*`/`double*` arguments compare element-wise within
    /// `ulps`; everything else is byte-exact. Mismatches report the first
    /// differing offset, matching the original harness's diagnostics.
    pub fn compare(&self, rhs: &KernelArgValue, type_name: &str, ulps: f32) -> Comparison {
        match (self, rhs) {
            (Self::Sampler(a), Self::Sampler(b)) => {
                if a == b {
                    Comparison::Match
                } else {
                    Comparison::Mismatch { offset: 0 }
                }
            }
            (Self::Local { size: a }, Self::Local { size: b }) => {
                if a == b {
                    Comparison::Match
                } else {
                    Comparison::Mismatch { offset: 0 }
                }
            }
            _ => {
                let (Some(a), Some(b)) = (self.bytes(), rhs.bytes()) else {
                    return Comparison::Mismatch { offset: 0 };
                };
                if a.len() != b.len() {
                    return Comparison::Mismatch { offset: a.len().min(b.len()) };
                }
                match type_name {
                    "float*" => compare_ulps_f32(a, b, ulps),
                    "double*" => compare_ulps_f64(a, b, ulps),
                    _ => compare_bytes(a, b),
                }
            }
        }
    }
}

fn compare_bytes(a: &[u8], b: &[u8]) -> Comparison {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        None => Comparison::Match,
        Some(offset) => Comparison::Mismatch { offset },
    }
}

fn compare_ulps_f32(a: &[u8], b: &[u8], ulps: f32) -> Comparison {
    for (i, (ca, cb)) in a.chunks_exact(4).zip(b.chunks_exact(4)).enumerate() {
        let l = f32::from_ne_bytes(ca.try_into().expect("4-byte chunk"));
        let r = f32::from_ne_bytes(cb.try_into().expect("4-byte chunk"));
        if ulp_error_f32(l, r).abs() > ulps {
            return Comparison::Mismatch { offset: i * 4 };
        }
    }
    Comparison::Match
}

fn compare_ulps_f64(a: &[u8], b: &[u8], ulps: f32) -> Comparison {
    for (i, (ca, cb)) in a.chunks_exact(8).zip(b.chunks_exact(8)).enumerate() {
        let l = f64::from_ne_bytes(ca.try_into().expect("8-byte chunk"));
        let r = f64::from_ne_bytes(cb.try_into().expect("8-byte chunk"));
        if ulp_error_f64(l, r).abs() > f64::from(ulps) {
            return Comparison::Mismatch { offset: i * 8 };
        }
    }
    Comparison::Match
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_from(bytes: &[u8], align: usize) -> AlignedBuffer {
        let mut buf = AlignedBuffer::new(bytes.len(), align, "test").unwrap();
        buf.copy_from_slice(bytes);
        buf
    }

    #[test]
    fn allocation_honors_alignment() {
        for align in [1usize, 4, 16, 64, 128] {
            let buf = AlignedBuffer::new(256, align, "int4").unwrap();
            assert_eq!(buf.as_ptr() as usize % align, 0, "align {align}");
            assert_eq!(buf.len(), 256);
        }
    }

    #[test]
    fn allocation_is_zeroed() {
        let buf = AlignedBuffer::new(64, 16, "float4").unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn clone_is_byte_identical() {
        let buf = buffer_from(&[1, 2, 3, 4, 5, 6, 7, 8], 8);
        assert_eq!(buf.clone(), buf);
    }

    #[test]
    fn zero_sized_buffer_is_safe() {
        let buf = AlignedBuffer::new(0, 16, "empty").unwrap();
        assert!(buf.is_empty());
        let _clone = buf.clone();
    }

    #[test]
    fn byte_compare_reports_first_difference() {
        let a = KernelArgValue::Buffer { data: buffer_from(&[0, 1, 2, 3], 4) };
        let b = KernelArgValue::Buffer { data: buffer_from(&[0, 1, 9, 3], 4) };
        assert_eq!(a.compare(&b, "uchar4*", 0.0), Comparison::Mismatch { offset: 2 });
        assert!(a.compare(&a.clone(), "uchar4*", 0.0).is_match());
    }

    #[test]
    fn float_compare_uses_ulps() {
        let x = 1.0f32;
        let y = f32::from_bits(x.to_bits() + 1);
        let a = KernelArgValue::Buffer { data: buffer_from(&x.to_ne_bytes(), 4) };
        let b = KernelArgValue::Buffer { data: buffer_from(&y.to_ne_bytes(), 4) };
        // One ulp apart: byte-wise different, but inside a 1-ulp tolerance.
        assert!(a.compare(&b, "float*", 1.0).is_match());
        assert_eq!(a.compare(&b, "float*", 0.5), Comparison::Mismatch { offset: 0 });
        // The same bits under a non-float declaration are a mismatch.
        assert_eq!(a.compare(&b, "uint*", 1.0), Comparison::Mismatch { offset: 0 });
    }

    #[test]
    fn double_compare_uses_ulps() {
        let x = 2.0f64;
        let y = f64::from_bits(x.to_bits() + 1);
        let a = KernelArgValue::Buffer { data: buffer_from(&x.to_ne_bytes(), 8) };
        let b = KernelArgValue::Buffer { data: buffer_from(&y.to_ne_bytes(), 8) };
        assert!(a.compare(&b, "double*", 1.0).is_match());
    }

    #[test]
    fn size_mismatch_is_a_mismatch() {
        let a = KernelArgValue::Buffer { data: buffer_from(&[0; 8], 4) };
        let b = KernelArgValue::Buffer { data: buffer_from(&[0; 4], 4) };
        assert!(!a.compare(&b, "int*", 0.0).is_match());
    }

    #[test]
    fn local_values_compare_by_size() {
        let a = KernelArgValue::Local { size: 1024 };
        let b = KernelArgValue::Local { size: 1024 };
        let c = KernelArgValue::Local { size: 512 };
        assert!(a.compare(&b, "int*", 0.0).is_match());
        assert!(!a.compare(&c, "int*", 0.0).is_match());
    }

    #[test]
    fn samplers_compare_by_settings() {
        let a = KernelArgValue::Sampler(SamplerValue::default());
        let b = KernelArgValue::Sampler(SamplerValue::default());
        assert!(a.compare(&b, "sampler_t", 0.0).is_match());
    }
}
