//! Device extension capability sets.

use std::fmt;

use bitflags::bitflags;
use tracing::debug;

bitflags! {
    /// The KHR extensions the side table can name as test prerequisites.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OclExtensions: u32 {
        const CL_KHR_INT64_BASE_ATOMICS = 1 << 0;
        const CL_KHR_INT64_EXTENDED_ATOMICS = 1 << 1;
        const CL_KHR_3D_IMAGE_WRITES = 1 << 2;
        const CL_KHR_FP16 = 1 << 3;
        const CL_KHR_GL_SHARING = 1 << 4;
        const CL_KHR_GL_EVENT = 1 << 5;
        const CL_KHR_D3D10_SHARING = 1 << 6;
        const CL_KHR_DX9_MEDIA_SHARING = 1 << 7;
        const CL_KHR_D3D11_SHARING = 1 << 8;
        const CL_KHR_DEPTH_IMAGES = 1 << 9;
        const CL_KHR_GL_DEPTH_IMAGES = 1 << 10;
        const CL_KHR_GL_MSAA_SHARING = 1 << 11;
        const CL_KHR_IMAGE2D_FROM_BUFFER = 1 << 12;
        const CL_KHR_INITIALIZE_MEMORY = 1 << 13;
        const CL_KHR_SPIR = 1 << 14;
        const CL_KHR_FP64 = 1 << 15;
        const CL_KHR_GLOBAL_INT32_BASE_ATOMICS = 1 << 16;
        const CL_KHR_GLOBAL_INT32_EXTENDED_ATOMICS = 1 << 17;
        const CL_KHR_LOCAL_INT32_BASE_ATOMICS = 1 << 18;
        const CL_KHR_LOCAL_INT32_EXTENDED_ATOMICS = 1 << 19;
        const CL_KHR_BYTE_ADDRESSABLE_STORE = 1 << 20;
        const CLES_KHR_INT64 = 1 << 21;
        const CLES_KHR_2D_IMAGE_ARRAY_WRITES = 1 << 22;
    }
}

const NAMES: &[(OclExtensions, &str)] = &[
    (OclExtensions::CL_KHR_INT64_BASE_ATOMICS, "cl_khr_int64_base_atomics"),
    (OclExtensions::CL_KHR_INT64_EXTENDED_ATOMICS, "cl_khr_int64_extended_atomics"),
    (OclExtensions::CL_KHR_3D_IMAGE_WRITES, "cl_khr_3d_image_writes"),
    (OclExtensions::CL_KHR_FP16, "cl_khr_fp16"),
    (OclExtensions::CL_KHR_GL_SHARING, "cl_khr_gl_sharing"),
    (OclExtensions::CL_KHR_GL_EVENT, "cl_khr_gl_event"),
    (OclExtensions::CL_KHR_D3D10_SHARING, "cl_khr_d3d10_sharing"),
    (OclExtensions::CL_KHR_DX9_MEDIA_SHARING, "cl_khr_dx9_media_sharing"),
    (OclExtensions::CL_KHR_D3D11_SHARING, "cl_khr_d3d11_sharing"),
    (OclExtensions::CL_KHR_DEPTH_IMAGES, "cl_khr_depth_images"),
    (OclExtensions::CL_KHR_GL_DEPTH_IMAGES, "cl_khr_gl_depth_images"),
    (OclExtensions::CL_KHR_GL_MSAA_SHARING, "cl_khr_gl_msaa_sharing"),
    (OclExtensions::CL_KHR_IMAGE2D_FROM_BUFFER, "cl_khr_image2d_from_buffer"),
    (OclExtensions::CL_KHR_INITIALIZE_MEMORY, "cl_khr_initialize_memory"),
    (OclExtensions::CL_KHR_SPIR, "cl_khr_spir"),
    (OclExtensions::CL_KHR_FP64, "cl_khr_fp64"),
    (OclExtensions::CL_KHR_GLOBAL_INT32_BASE_ATOMICS, "cl_khr_global_int32_base_atomics"),
    (
        OclExtensions::CL_KHR_GLOBAL_INT32_EXTENDED_ATOMICS,
        "cl_khr_global_int32_extended_atomics",
    ),
    (OclExtensions::CL_KHR_LOCAL_INT32_BASE_ATOMICS, "cl_khr_local_int32_base_atomics"),
    (
        OclExtensions::CL_KHR_LOCAL_INT32_EXTENDED_ATOMICS,
        "cl_khr_local_int32_extended_atomics",
    ),
    (OclExtensions::CL_KHR_BYTE_ADDRESSABLE_STORE, "cl_khr_byte_addressable_store"),
    (OclExtensions::CLES_KHR_INT64, "cles_khr_int64"),
    (OclExtensions::CLES_KHR_2D_IMAGE_ARRAY_WRITES, "cles_khr_2d_image_array_writes"),
];

impl OclExtensions {
    /// Look up a single extension name as it appears in a device
    /// extension string. Unknown names map to the empty set, so a side
    /// table can mention extensions this build does not track without
    /// breaking lookup. (The generated `from_name` matches flag
    /// identifiers instead.)
    pub fn from_extension_name(name: &str) -> Self {
        match NAMES.iter().find(|(_, n)| *n == name) {
            Some((flag, _)) => *flag,
            None => {
                if !name.is_empty() {
                    debug!(extension = name, "ignoring unrecognized extension name");
                }
                Self::empty()
            }
        }
    }

    /// Parse a whitespace-separated extension list, as reported by the
    /// device extensions query.
    pub fn from_extension_list(list: &str) -> Self {
        list.split_whitespace()
            .fold(Self::empty(), |acc, name| acc | Self::from_extension_name(name))
    }

    /// The capability set of a device, given its extension string and
    /// profile. Full-profile devices implicitly carry the embedded-profile
    /// `cles_khr_int64` and `cles_khr_2d_image_array_writes` capabilities.
    pub fn device_capabilities(extension_list: &str, profile: &str) -> Self {
        let mut caps = Self::from_extension_list(extension_list);
        if profile.trim_end_matches('\0') == "FULL_PROFILE" {
            caps |= Self::CLES_KHR_INT64 | Self::CLES_KHR_2D_IMAGE_ARRAY_WRITES;
        }
        caps
    }

    /// Whether this set covers every capability in `required`.
    pub fn supports(self, required: Self) -> bool {
        self.contains(required)
    }

    /// The capabilities in `required` this set lacks.
    pub fn missing(self, required: Self) -> Self {
        required - self
    }
}

impl fmt::Display for OclExtensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(*flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for (flag, name) in NAMES {
            assert_eq!(OclExtensions::from_extension_name(name), *flag);
        }
    }

    #[test]
    fn unknown_names_are_empty() {
        assert_eq!(
            OclExtensions::from_extension_name("cl_khr_made_up"),
            OclExtensions::empty()
        );
        assert_eq!(OclExtensions::from_extension_name(""), OclExtensions::empty());
    }

    #[test]
    fn extension_names_and_flag_identifiers_resolve_separately() {
        // The derived lookup takes flag identifiers; ours takes the
        // lowercase names devices report.
        assert_eq!(
            OclExtensions::from_name("CL_KHR_FP16"),
            Some(OclExtensions::CL_KHR_FP16)
        );
        assert_eq!(
            OclExtensions::from_extension_name("cl_khr_fp16"),
            OclExtensions::CL_KHR_FP16
        );
    }

    #[test]
    fn extension_list_parses_whitespace_separated() {
        let caps = OclExtensions::from_extension_list("cl_khr_spir  cl_khr_fp64\ncl_khr_fp16");
        assert!(caps.supports(OclExtensions::CL_KHR_SPIR | OclExtensions::CL_KHR_FP64));
        assert!(caps.supports(OclExtensions::CL_KHR_FP16));
        assert!(!caps.supports(OclExtensions::CL_KHR_GL_SHARING));
    }

    #[test]
    fn full_profile_implies_embedded_capabilities() {
        let caps = OclExtensions::device_capabilities("cl_khr_spir", "FULL_PROFILE");
        assert!(caps.supports(OclExtensions::CLES_KHR_INT64));
        assert!(caps.supports(OclExtensions::CLES_KHR_2D_IMAGE_ARRAY_WRITES));
        let embedded = OclExtensions::device_capabilities("cl_khr_spir", "EMBEDDED_PROFILE");
        assert!(!embedded.supports(OclExtensions::CLES_KHR_INT64));
    }

    #[test]
    fn missing_reports_only_the_gap() {
        let have = OclExtensions::CL_KHR_SPIR | OclExtensions::CL_KHR_FP64;
        let need = OclExtensions::CL_KHR_SPIR | OclExtensions::CL_KHR_FP16;
        assert_eq!(have.missing(need), OclExtensions::CL_KHR_FP16);
        assert!(!have.supports(need));
    }

    #[test]
    fn display_lists_lowercase_names() {
        let caps = OclExtensions::CL_KHR_SPIR | OclExtensions::CL_KHR_FP16;
        assert_eq!(caps.to_string(), "cl_khr_fp16 cl_khr_spir");
    }
}
