//! Run configuration from environment variables and command-line overrides.
//!
//! The conformance runners honor three environment variables, matching the
//! original harness: `CL_DEVICE_TYPE`, `CL_DEVICE_INDEX`, and
//! `CL_PLATFORM_INDEX`. Command-line selectors win over the environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{HarnessError, Result};

pub const ENV_DEVICE_TYPE: &str = "CL_DEVICE_TYPE";
pub const ENV_DEVICE_INDEX: &str = "CL_DEVICE_INDEX";
pub const ENV_PLATFORM_INDEX: &str = "CL_PLATFORM_INDEX";

/// Device category used for platform enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceType {
    #[default]
    Default,
    Cpu,
    Gpu,
    Accelerator,
    Custom,
}

impl FromStr for DeviceType {
    type Err = HarnessError;

    /// Accepts both short spellings (`gpu`) and the full enum names the
    /// original harness took (`CL_DEVICE_TYPE_GPU`).
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" | "CL_DEVICE_TYPE_DEFAULT" => Ok(Self::Default),
            "cpu" | "CL_DEVICE_TYPE_CPU" => Ok(Self::Cpu),
            "gpu" | "CL_DEVICE_TYPE_GPU" => Ok(Self::Gpu),
            "accelerator" | "CL_DEVICE_TYPE_ACCELERATOR" => Ok(Self::Accelerator),
            "custom" | "CL_DEVICE_TYPE_CUSTOM" => Ok(Self::Custom),
            other => Err(HarnessError::UnknownDeviceType(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "CL_DEVICE_TYPE_DEFAULT",
            Self::Cpu => "CL_DEVICE_TYPE_CPU",
            Self::Gpu => "CL_DEVICE_TYPE_GPU",
            Self::Accelerator => "CL_DEVICE_TYPE_ACCELERATOR",
            Self::Custom => "CL_DEVICE_TYPE_CUSTOM",
        };
        f.write_str(name)
    }
}

/// Resolved harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub device_type: DeviceType,
    pub platform_index: usize,
    pub device_index: usize,
    /// Address-width override for SPIR binary selection (32 forces `.bc32`).
    pub address_bits: Option<u32>,
}

impl HarnessConfig {
    /// Read the three `CL_*` environment variables.
    ///
    /// Unset variables fall back to defaults; set-but-invalid values are
    /// errors, not silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(v) = env::var(ENV_DEVICE_TYPE) {
            cfg.device_type = v.parse()?;
        }
        if let Ok(v) = env::var(ENV_DEVICE_INDEX) {
            cfg.device_index = parse_index(ENV_DEVICE_INDEX, &v)?;
        }
        if let Ok(v) = env::var(ENV_PLATFORM_INDEX) {
            cfg.platform_index = parse_index(ENV_PLATFORM_INDEX, &v)?;
        }

        Ok(cfg)
    }
}

fn parse_index(name: &'static str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| HarnessError::InvalidIndex { name, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for k in [ENV_DEVICE_TYPE, ENV_DEVICE_INDEX, ENV_PLATFORM_INDEX] {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn device_type_short_spellings() {
        assert_eq!("gpu".parse::<DeviceType>().unwrap(), DeviceType::Gpu);
        assert_eq!("cpu".parse::<DeviceType>().unwrap(), DeviceType::Cpu);
        assert_eq!("accelerator".parse::<DeviceType>().unwrap(), DeviceType::Accelerator);
    }

    #[test]
    fn device_type_long_spellings() {
        assert_eq!(
            "CL_DEVICE_TYPE_GPU".parse::<DeviceType>().unwrap(),
            DeviceType::Gpu
        );
        assert_eq!(
            "CL_DEVICE_TYPE_DEFAULT".parse::<DeviceType>().unwrap(),
            DeviceType::Default
        );
    }

    #[test]
    fn device_type_rejects_unknown() {
        assert!("fpga".parse::<DeviceType>().is_err());
    }

    #[test]
    #[serial]
    fn env_defaults_when_unset() {
        clear_env();
        let cfg = HarnessConfig::from_env().unwrap();
        assert_eq!(cfg, HarnessConfig::default());
    }

    #[test]
    #[serial]
    fn env_indices_are_read() {
        clear_env();
        std::env::set_var(ENV_PLATFORM_INDEX, "2");
        std::env::set_var(ENV_DEVICE_INDEX, "1");
        let cfg = HarnessConfig::from_env().unwrap();
        assert_eq!(cfg.platform_index, 2);
        assert_eq!(cfg.device_index, 1);
        clear_env();
    }

    #[test]
    #[serial]
    fn env_bad_index_is_an_error() {
        clear_env();
        std::env::set_var(ENV_DEVICE_INDEX, "one");
        assert!(HarnessConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn env_device_type_is_read() {
        clear_env();
        std::env::set_var(ENV_DEVICE_TYPE, "CL_DEVICE_TYPE_CPU");
        let cfg = HarnessConfig::from_env().unwrap();
        assert_eq!(cfg.device_type, DeviceType::Cpu);
        clear_env();
    }
}
