//! Image formats and descriptors with the suite's deterministic pitch rules.

/// Channel orders exercised by the image suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    A,
    R,
    Rx,
    Rg,
    Rgx,
    Ra,
    Rgb,
    Rgbx,
    Rgba,
    Argb,
    Bgra,
    Intensity,
    Luminance,
    Depth,
    DepthStencil,
}

impl ChannelOrder {
    /// The `cl_channel_order` enumerant.
    pub fn cl_code(self) -> u32 {
        match self {
            Self::R => 0x10B0,
            Self::A => 0x10B1,
            Self::Rg => 0x10B2,
            Self::Ra => 0x10B3,
            Self::Rgb => 0x10B4,
            Self::Rgba => 0x10B5,
            Self::Bgra => 0x10B6,
            Self::Argb => 0x10B7,
            Self::Intensity => 0x10B8,
            Self::Luminance => 0x10B9,
            Self::Rx => 0x10BA,
            Self::Rgx => 0x10BB,
            Self::Rgbx => 0x10BC,
            Self::Depth => 0x10BD,
            Self::DepthStencil => 0x10BE,
        }
    }

    /// The portable-IR module uses the same enumerant values.
    pub fn spir_code(self) -> u32 {
        self.cl_code()
    }

    /// Lower-case rendering used in generated test names.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::R => "cl_r",
            Self::A => "cl_a",
            Self::Rg => "cl_rg",
            Self::Ra => "cl_ra",
            Self::Rgb => "cl_rgb",
            Self::Rgba => "cl_rgba",
            Self::Bgra => "cl_bgra",
            Self::Argb => "cl_argb",
            Self::Intensity => "cl_intensity",
            Self::Luminance => "cl_luminance",
            Self::Rx => "cl_Rx",
            Self::Rgx => "cl_RGx",
            Self::Rgbx => "cl_RGBx",
            Self::Depth => "cl_depth",
            Self::DepthStencil => "cl_depth_stencil",
        }
    }

    pub const ALL: [ChannelOrder; 15] = [
        Self::A,
        Self::R,
        Self::Rx,
        Self::Rg,
        Self::Rgx,
        Self::Ra,
        Self::Rgb,
        Self::Rgbx,
        Self::Rgba,
        Self::Argb,
        Self::Bgra,
        Self::Intensity,
        Self::Luminance,
        Self::Depth,
        Self::DepthStencil,
    ];
}

/// Channel data types the generators produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    SignedInt32,
    UnsignedInt32,
    Float,
}

impl ChannelType {
    pub fn cl_code(self) -> u32 {
        match self {
            Self::SignedInt32 => 0x10D9,
            Self::UnsignedInt32 => 0x10DC,
            Self::Float => 0x10DE,
        }
    }

    pub fn spir_code(self) -> u32 {
        self.cl_code()
    }

    /// The element type name kernels see (`int`, `uint`, `float`).
    pub fn data_type_name(self) -> &'static str {
        match self {
            Self::SignedInt32 => "int",
            Self::UnsignedInt32 => "uint",
            Self::Float => "float",
        }
    }
}

/// Image dimensionalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Image1d,
    Image1dArray,
    Image1dBuffer,
    Image2d,
    Image2dArray,
    Image3d,
}

impl ImageType {
    /// The `cl_mem_object_type` enumerant.
    pub fn cl_code(self) -> u32 {
        match self {
            Self::Image2d => 0x10F1,
            Self::Image3d => 0x10F2,
            Self::Image2dArray => 0x10F3,
            Self::Image1d => 0x10F4,
            Self::Image1dArray => 0x10F5,
            Self::Image1dBuffer => 0x10F6,
        }
    }

    /// The kernel-side type spelling, without the `_t` suffix.
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Image1d => "image1d",
            Self::Image1dArray => "image1d_array",
            Self::Image1dBuffer => "image1d_buffer",
            Self::Image2d => "image2d",
            Self::Image2dArray => "image2d_array",
            Self::Image3d => "image3d",
        }
    }

    /// 1D-buffer images are created over a buffer object holding the
    /// payload; the descriptor names the buffer and carries no pitches or
    /// host pointer of its own.
    pub fn backed_by_buffer(self) -> bool {
        matches!(self, Self::Image1dBuffer)
    }

    pub const ALL: [ImageType; 6] = [
        Self::Image1d,
        Self::Image1dArray,
        Self::Image1dBuffer,
        Self::Image2d,
        Self::Image2dArray,
        Self::Image3d,
    ];
}

/// Image format: channel order plus channel data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
    pub order: ChannelOrder,
    pub channel_type: ChannelType,
}

/// Pixel stride the generators always use: RGBA channels of 4 bytes each.
pub const PIXEL_BYTES: usize = 16;

/// Image descriptor with the suite's fixed geometry and pitch rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub image_type: ImageType,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub array_size: usize,
    pub row_pitch: usize,
    /// Must stay zero for 1D and 2D images per the API spec.
    pub slice_pitch: usize,
}

impl ImageDesc {
    /// Build the descriptor for an image type with the suite's fixed
    /// geometry: width 32; 2D height 32; 3D depth 8; arrays of 8 (2D) or
    /// flat (1D).
    pub fn for_type(image_type: ImageType) -> Self {
        let width = 32;
        let row_pitch = width * PIXEL_BYTES;
        let (height, depth, array_size) = match image_type {
            ImageType::Image1d | ImageType::Image1dBuffer => (1, 1, 1),
            ImageType::Image1dArray => (1, 1, 1),
            ImageType::Image2d => (32, 1, 1),
            ImageType::Image2dArray => (32, 1, 8),
            ImageType::Image3d => (32, 8, 1),
        };
        // Slice pitch is not applicable to one- and two-dimensional
        // images (OpenCL 1.2 s5.3.1.2); arrays and 3D span whole slices.
        let slice_pitch = match image_type {
            ImageType::Image1d | ImageType::Image1dBuffer | ImageType::Image2d => 0,
            ImageType::Image1dArray | ImageType::Image2dArray | ImageType::Image3d => {
                height * row_pitch
            }
        };
        Self { image_type, width, height, depth, array_size, row_pitch, slice_pitch }
    }

    /// Total pixels across slices and array elements.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height * self.depth * self.array_size
    }

    /// Host allocation size for the image payload.
    pub fn byte_size(&self) -> usize {
        self.pixel_count() * PIXEL_BYTES
    }
}
