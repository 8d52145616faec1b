//! Enumerates the image test space: every channel order crossed with
//! every typed image generator.
//!
//! Suites walk this space, skip the combinations the format rules forbid,
//! and derive one test name per remaining entry.

use crate::image::{ChannelOrder, ChannelType, ImageType};

/// One (channel order, image type, channel data type) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageValuesEntry {
    pub order: ChannelOrder,
    pub image_type: ImageType,
    pub channel_type: ChannelType,
}

impl ImageValuesEntry {
    /// The registry key of the typed generator, e.g. `image2d_array_float`.
    pub fn generator_name(&self) -> String {
        format!("{}_{}", self.image_type.base_name(), self.channel_type.data_type_name())
    }

    /// The registry key of the untyped base generator, e.g. `image2d_t`.
    pub fn base_generator_name(&self) -> String {
        format!("{}_t", self.image_type.base_name())
    }

    /// The kernel-side type spelling.
    pub fn image_type_name(&self) -> String {
        self.base_generator_name()
    }

    /// The channel element type the kernel reads (`int`, `uint`, `float`).
    pub fn data_type_name(&self) -> &'static str {
        self.channel_type.data_type_name()
    }

    /// Whether the format rules allow this combination at all.
    ///
    /// Intensity and luminance images exist only with float channels;
    /// depth, depth-stencil, and the 3-channel/reordered packed orders
    /// need channel data types outside the generated set.
    pub fn is_legal(&self) -> bool {
        match self.order {
            ChannelOrder::Intensity | ChannelOrder::Luminance => {
                self.channel_type == ChannelType::Float
            }
            ChannelOrder::Depth
            | ChannelOrder::DepthStencil
            | ChannelOrder::Rgb
            | ChannelOrder::Rgbx
            | ChannelOrder::Argb
            | ChannelOrder::Bgra => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for ImageValuesEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.generator_name(), self.order.suffix())
    }
}

/// Iterates the full channel-order x typed-generator cross product.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageValuesGenerator;

impl ImageValuesGenerator {
    pub fn iter(self) -> impl Iterator<Item = ImageValuesEntry> {
        ChannelOrder::ALL.into_iter().flat_map(|order| {
            ImageType::ALL.into_iter().flat_map(move |image_type| {
                [ChannelType::Float, ChannelType::SignedInt32, ChannelType::UnsignedInt32]
                    .into_iter()
                    .map(move |channel_type| ImageValuesEntry { order, image_type, channel_type })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_the_full_cross_product() {
        let count = ImageValuesGenerator.iter().count();
        assert_eq!(count, 15 * 6 * 3);
    }

    #[test]
    fn names_compose_from_type_and_order() {
        let entry = ImageValuesEntry {
            order: ChannelOrder::Rgba,
            image_type: ImageType::Image2dArray,
            channel_type: ChannelType::UnsignedInt32,
        };
        assert_eq!(entry.generator_name(), "image2d_array_uint");
        assert_eq!(entry.base_generator_name(), "image2d_array_t");
        assert_eq!(entry.data_type_name(), "uint");
        assert_eq!(entry.to_string(), "image2d_array_uint_cl_rgba");
    }

    #[test]
    fn intensity_and_luminance_require_float_channels() {
        for order in [ChannelOrder::Intensity, ChannelOrder::Luminance] {
            for (channel, legal) in [
                (ChannelType::Float, true),
                (ChannelType::SignedInt32, false),
                (ChannelType::UnsignedInt32, false),
            ] {
                let entry = ImageValuesEntry {
                    order,
                    image_type: ImageType::Image2d,
                    channel_type: channel,
                };
                assert_eq!(entry.is_legal(), legal, "{order:?} {channel:?}");
            }
        }
    }

    #[test]
    fn packed_and_depth_orders_are_excluded() {
        for order in [
            ChannelOrder::Rgb,
            ChannelOrder::Rgbx,
            ChannelOrder::Argb,
            ChannelOrder::Bgra,
            ChannelOrder::Depth,
            ChannelOrder::DepthStencil,
        ] {
            let entry = ImageValuesEntry {
                order,
                image_type: ImageType::Image3d,
                channel_type: ChannelType::Float,
            };
            assert!(!entry.is_legal(), "{order:?}");
        }
    }

    #[test]
    fn simple_orders_are_legal_for_every_channel_type() {
        for order in [ChannelOrder::R, ChannelOrder::Rg, ChannelOrder::Rgba] {
            for channel in
                [ChannelType::Float, ChannelType::SignedInt32, ChannelType::UnsignedInt32]
            {
                let entry = ImageValuesEntry {
                    order,
                    image_type: ImageType::Image1d,
                    channel_type: channel,
                };
                assert!(entry.is_legal());
            }
        }
    }
}
