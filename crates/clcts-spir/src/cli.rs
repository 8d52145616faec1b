//! The driver's documented command-line grammar.
//!
//! `clcts-spir [<suite name>] [<test name>] [pid<N>] [id<N>] [<device type>]
//! [w32] [no-unzip]` plus `-list`/`-h`/`--help`. Selector tokens are
//! recognized from the end of the line, so the positional suite and test
//! names always sit at the front. The grammar predates this
//! implementation and is kept verbatim; it is the interface conformance
//! scripts drive.

use std::str::FromStr;

use clcts_harness::{DeviceType, HarnessConfig};

use crate::bundle::SUITES;
use crate::error::{Result, SpirError};

/// Parsed driver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirCli {
    pub suite: Option<String>,
    pub test: Option<String>,
    pub config: HarnessConfig,
    /// Bundles are always used in place; the flag is accepted for
    /// compatibility with existing run scripts.
    pub no_unzip: bool,
    pub list: bool,
}

impl SpirCli {
    /// Parse `args` (without the program name) on top of the environment
    /// configuration. Command-line selectors win over the environment.
    pub fn parse(args: &[String]) -> Result<Self> {
        Self::parse_with_config(args, HarnessConfig::from_env()?)
    }

    pub fn parse_with_config(args: &[String], config: HarnessConfig) -> Result<Self> {
        let mut cli = Self {
            suite: None,
            test: None,
            config,
            no_unzip: false,
            list: false,
        };

        if matches!(args.first().map(String::as_str), Some("-list" | "-h" | "--help")) {
            cli.list = true;
            return Ok(cli);
        }

        let mut rest = args;

        // Trailing selectors; every form is re-checked each round, so
        // keywords and indices mix in any order.
        while let Some(last) = rest.last() {
            if let Ok(device_type) = DeviceType::from_str(last) {
                cli.config.device_type = device_type;
            } else if last == "w32" {
                cli.config.address_bits = Some(32);
            } else if last == "no-unzip" {
                cli.no_unzip = true;
            } else if let Some(index) = strip_indexed_token(Some(last), "pid")? {
                cli.config.platform_index = index;
            } else if let Some(index) = strip_indexed_token(Some(last), "id")? {
                cli.config.device_index = index;
            } else {
                break;
            }
            rest = &rest[..rest.len() - 1];
        }

        match rest.len() {
            0 => {}
            1 => cli.suite = Some(rest[0].clone()),
            2 => {
                cli.suite = Some(rest[0].clone());
                cli.test = Some(rest[1].clone());
            }
            _ => {
                return Err(SpirError::CmdLine(format!("unrecognized token {:?}", rest[2])));
            }
        }

        Ok(cli)
    }

    /// The `-h` text, ending with the sub-suite list.
    pub fn usage(program: &str) -> String {
        let mut text = format!(
            "Usage: {program} [<suite name>] [<test name>] [pid<num>] [id<num>] \
             [<device type>] [w32] [no-unzip]\n\
             \tpid<num>\tuse the platform at index <num> (default 0)\n\
             \tid<num>\t\tuse the device at index <num> (default 0)\n\
             \t<device type>\tcpu|gpu|accelerator|<CL_DEVICE_TYPE_*> (default CL_DEVICE_TYPE_DEFAULT)\n\
             \tw32\t\ttreat the device address width as 32 bits\n\
             \tno-unzip\trun against the bundles already on disk\n\
             Sub-suites:\n"
        );
        for suite in SUITES {
            text.push('\t');
            text.push_str(suite.name);
            text.push('\n');
        }
        text
    }
}

/// Match a trailing `id<N>`/`pid<N>` token; a matching prefix with a bad
/// number is a command-line error rather than a test name.
fn strip_indexed_token(token: Option<&String>, prefix: &str) -> Result<Option<usize>> {
    let Some(token) = token else { return Ok(None) };
    let Some(digits) = token.strip_prefix(prefix) else { return Ok(None) };
    if digits.is_empty() {
        return Ok(None);
    }
    match digits.parse::<usize>() {
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(SpirError::CmdLine(format!("bad index in token {token:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> Result<SpirCli> {
        let args: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        SpirCli::parse_with_config(&args, HarnessConfig::default())
    }

    #[test]
    fn empty_line_runs_everything() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.suite, None);
        assert_eq!(cli.test, None);
        assert!(!cli.list);
    }

    #[test]
    fn suite_and_test_are_positional() {
        let cli = parse(&["basic", "sample_test.cl_kernel"]).unwrap();
        assert_eq!(cli.suite.as_deref(), Some("basic"));
        assert_eq!(cli.test.as_deref(), Some("sample_test.cl_kernel"));
    }

    #[test]
    fn trailing_selectors_combine_in_any_order() {
        let cli = parse(&["basic", "pid1", "id2", "gpu", "w32", "no-unzip"]).unwrap();
        assert_eq!(cli.suite.as_deref(), Some("basic"));
        assert_eq!(cli.config.platform_index, 1);
        assert_eq!(cli.config.device_index, 2);
        assert_eq!(cli.config.device_type, DeviceType::Gpu);
        assert_eq!(cli.config.address_bits, Some(32));
        assert!(cli.no_unzip);

        let cli = parse(&["no-unzip", "w32", "cpu"]).unwrap();
        assert_eq!(cli.config.device_type, DeviceType::Cpu);
        assert!(cli.no_unzip);
    }

    #[test]
    fn indices_parse_after_keywords_too() {
        let cli = parse(&["basic", "id2", "pid1"]).unwrap();
        assert_eq!(cli.suite.as_deref(), Some("basic"));
        assert_eq!(cli.test, None);
        assert_eq!(cli.config.device_index, 2);
        assert_eq!(cli.config.platform_index, 1);

        let cli = parse(&["gpu", "id1", "w32", "pid2"]).unwrap();
        assert_eq!(cli.suite, None);
        assert_eq!(cli.config.device_type, DeviceType::Gpu);
        assert_eq!(cli.config.device_index, 1);
        assert_eq!(cli.config.platform_index, 2);
        assert_eq!(cli.config.address_bits, Some(32));
    }

    #[test]
    fn long_device_type_spellings_are_accepted() {
        let cli = parse(&["CL_DEVICE_TYPE_ACCELERATOR"]).unwrap();
        assert_eq!(cli.config.device_type, DeviceType::Accelerator);
    }

    #[test]
    fn help_flags_short_circuit() {
        for flag in ["-list", "-h", "--help"] {
            let cli = parse(&[flag]).unwrap();
            assert!(cli.list, "{flag}");
        }
    }

    #[test]
    fn usage_names_every_suite() {
        let text = SpirCli::usage("clcts-spir");
        assert!(text.contains("math_brute_force_double"));
        assert!(text.contains("pid<num>"));
    }

    #[test]
    fn too_many_positionals_is_an_error() {
        let err = parse(&["basic", "a_test", "another_test"]).unwrap_err();
        assert!(matches!(err, SpirError::CmdLine(_)));
    }

    #[test]
    fn bad_index_digits_are_an_error() {
        // A bare "id" has no digits and falls through to the suite slot.
        let cli = parse(&["id"]).unwrap();
        assert_eq!(cli.suite.as_deref(), Some("id"));
        assert!(matches!(parse(&["basic", "id2x"]), Err(SpirError::CmdLine(_))));
    }

    #[test]
    fn command_line_overrides_environment_config() {
        let mut config = HarnessConfig::default();
        config.device_type = DeviceType::Cpu;
        config.platform_index = 3;
        let args = vec!["gpu".to_string()];
        let cli = SpirCli::parse_with_config(&args, config).unwrap();
        assert_eq!(cli.config.device_type, DeviceType::Gpu);
        assert_eq!(cli.config.platform_index, 3);
    }
}
