//! Sampler settings and the exhaustive sampler-value enumerator.

use std::fmt;

/// `cl_addressing_mode` choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    None,
    Clamp,
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

impl AddressingMode {
    pub fn cl_code(self) -> u32 {
        match self {
            Self::None => 0x1130,
            Self::ClampToEdge => 0x1131,
            Self::Clamp => 0x1132,
            Self::Repeat => 0x1133,
            Self::MirroredRepeat => 0x1134,
        }
    }

    pub const ALL: [AddressingMode; 5] =
        [Self::None, Self::Clamp, Self::ClampToEdge, Self::Repeat, Self::MirroredRepeat];
}

/// `cl_filter_mode` choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

impl FilterMode {
    pub fn cl_code(self) -> u32 {
        match self {
            Self::Nearest => 0x1140,
            Self::Linear => 0x1141,
        }
    }

    pub const ALL: [FilterMode; 2] = [Self::Nearest, Self::Linear];
}

/// A complete sampler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerValue {
    pub normalized: bool,
    pub addressing: AddressingMode,
    pub filter: FilterMode,
}

impl Default for SamplerValue {
    fn default() -> Self {
        Self { normalized: false, addressing: AddressingMode::None, filter: FilterMode::Nearest }
    }
}

impl SamplerValue {
    /// Pack into the bitmask encoding the SPIR kernels receive:
    /// addressing in the low bits, normalization at bit 3, filter at bit 4.
    pub fn to_bitmap(self) -> u32 {
        let norm = if self.normalized { 8 } else { 0 };
        let filter = match self.filter {
            FilterMode::Nearest => 0,
            FilterMode::Linear => 16,
        };
        let addressing = match self.addressing {
            AddressingMode::None => 0,
            AddressingMode::Clamp => 1,
            AddressingMode::ClampToEdge => 2,
            AddressingMode::Repeat => 3,
            AddressingMode::MirroredRepeat => 4,
        };
        norm | filter | addressing
    }
}

impl fmt::Display for SamplerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let norm = if self.normalized { "Normalized" } else { "Not Normalized" };
        let filter = match self.filter {
            FilterMode::Nearest => "Filter Nearest",
            FilterMode::Linear => "Filter Linear",
        };
        let addressing = match self.addressing {
            AddressingMode::None => "Address None",
            AddressingMode::Clamp => "Address clamp",
            AddressingMode::ClampToEdge => "Address clamp to edge",
            AddressingMode::Repeat => "Address repeat",
            AddressingMode::MirroredRepeat => "Address mirrored repeat",
        };
        write!(f, "({norm} | {filter} | {addressing})")
    }
}

/// Iterates every normalization x filter x addressing combination.
#[derive(Debug, Default, Clone, Copy)]
pub struct SamplerValuesGenerator;

impl SamplerValuesGenerator {
    pub fn iter(self) -> impl Iterator<Item = SamplerValue> {
        [true, false].into_iter().flat_map(|normalized| {
            FilterMode::ALL.into_iter().flat_map(move |filter| {
                AddressingMode::ALL
                    .into_iter()
                    .map(move |addressing| SamplerValue { normalized, addressing, filter })
            })
        })
    }
}
