//! Kernel bundles: per-suite directories of `.cl` sources and their
//! pre-built portable-IR `.bc32`/`.bc64` binaries.
//!
//! Bundles ship pre-extracted on disk; a missing file is a fatal setup
//! failure for the enclosing test, never a silent skip.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpirError};

/// One sub-suite: the public name and the bundle folder it reads from.
/// Several suites (the `_double` variants) share a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSuite {
    pub name: &'static str,
    pub folder: &'static str,
}

/// The sub-suite table, in execution order.
pub const SUITES: &[SubSuite] = &[
    SubSuite { name: "api", folder: "api" },
    SubSuite { name: "api_double", folder: "api" },
    SubSuite { name: "atomics", folder: "atomics" },
    SubSuite { name: "basic", folder: "basic" },
    SubSuite { name: "basic_double", folder: "basic" },
    SubSuite { name: "commonfns", folder: "commonfns" },
    SubSuite { name: "commonfns_double", folder: "commonfns" },
    SubSuite { name: "conversions", folder: "conversions" },
    SubSuite { name: "conversions_double", folder: "conversions" },
    SubSuite { name: "geometrics", folder: "geometrics" },
    SubSuite { name: "geometrics_double", folder: "geometrics" },
    SubSuite { name: "half", folder: "half" },
    SubSuite { name: "half_double", folder: "half" },
    SubSuite { name: "kernel_image_methods", folder: "kernel_image_methods" },
    SubSuite { name: "images_kernel_read_write", folder: "images_kernel_read_write" },
    SubSuite { name: "images_samplerlessRead", folder: "images_samplerlessRead" },
    SubSuite { name: "integer_ops", folder: "integer_ops" },
    SubSuite { name: "math_brute_force", folder: "math_brute_force" },
    SubSuite { name: "math_brute_force_double", folder: "math_brute_force" },
    SubSuite { name: "printf", folder: "printf" },
    SubSuite { name: "profiling", folder: "profiling" },
    SubSuite { name: "relationals", folder: "relationals" },
    SubSuite { name: "relationals_double", folder: "relationals" },
    SubSuite { name: "select", folder: "select" },
    SubSuite { name: "select_double", folder: "select" },
    SubSuite { name: "vec_align", folder: "vec_align" },
    SubSuite { name: "vec_align_double", folder: "vec_align" },
    SubSuite { name: "vec_step", folder: "vec_step" },
    SubSuite { name: "vec_step_double", folder: "vec_step" },
    SubSuite { name: "compile_and_link", folder: "compile_and_link" },
    SubSuite { name: "sampler_enumeration", folder: "sampler_enumeration" },
    SubSuite { name: "enum_values", folder: "enum_values" },
    SubSuite { name: "binary_type", folder: "binary_type" },
];

/// Look up a sub-suite by its public name.
pub fn find_suite(name: &str) -> Result<SubSuite> {
    SUITES
        .iter()
        .copied()
        .find(|s| s.name == name)
        .ok_or_else(|| SpirError::UnknownSuite(name.to_string()))
}

/// A suite's bundle directory.
#[derive(Debug, Clone)]
pub struct KernelBundle {
    dir: PathBuf,
}

impl KernelBundle {
    /// A bundle rooted at `base/<folder>`.
    pub fn new(base: &Path, folder: &str) -> Self {
        Self { dir: base.join(folder) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<test>.cl`.
    pub fn cl_path(&self, test_name: &str) -> PathBuf {
        self.dir.join(format!("{test_name}.cl"))
    }

    /// `<dir>/<test>.bc32` or `.bc64`, by device address width.
    pub fn bc_path(&self, test_name: &str, address_bits: u32) -> PathBuf {
        let ext = if address_bits == 32 { "bc32" } else { "bc64" };
        self.dir.join(format!("{test_name}.{ext}"))
    }

    /// `<dir>/<file>`, for embedded headers.
    pub fn header_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// The kernel name embedded in a test name: everything up to the
    /// first `.`.
    pub fn kernel_name(test_name: &str) -> &str {
        test_name.split('.').next().unwrap_or(test_name)
    }

    /// Load a `.cl` source as text.
    pub fn load_source(&self, test_name: &str) -> Result<String> {
        let path = self.cl_path(test_name);
        fs::read_to_string(&path).map_err(|source| SpirError::Bundle { path, source })
    }

    /// Load a portable-IR binary.
    pub fn load_binary(&self, test_name: &str, address_bits: u32) -> Result<Vec<u8>> {
        let path = self.bc_path(test_name, address_bits);
        fs::read(&path).map_err(|source| SpirError::Bundle { path, source })
    }

    /// The test names present in the bundle, from its `.cl` files, sorted.
    pub fn tests(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| SpirError::Bundle {
            path: self.dir.clone(),
            source,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SpirError::Bundle {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("cl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_lookup() {
        assert_eq!(find_suite("basic_double").unwrap().folder, "basic");
        assert!(matches!(find_suite("nonesuch"), Err(SpirError::UnknownSuite(_))));
    }

    #[test]
    fn double_variants_share_folders() {
        assert_eq!(
            find_suite("math_brute_force").unwrap().folder,
            find_suite("math_brute_force_double").unwrap().folder
        );
    }

    #[test]
    fn paths_compose_from_test_name_and_width() {
        let bundle = KernelBundle::new(Path::new("/work"), "basic");
        assert_eq!(bundle.cl_path("sample_test"), Path::new("/work/basic/sample_test.cl"));
        assert_eq!(
            bundle.bc_path("sample_test", 32),
            Path::new("/work/basic/sample_test.bc32")
        );
        assert_eq!(
            bundle.bc_path("sample_test", 64),
            Path::new("/work/basic/sample_test.bc64")
        );
    }

    #[test]
    fn kernel_name_stops_at_the_first_dot() {
        assert_eq!(KernelBundle::kernel_name("sin.math_kernel_float"), "sin");
        assert_eq!(KernelBundle::kernel_name("plain_test"), "plain_test");
    }

    #[test]
    fn missing_source_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = KernelBundle::new(dir.path(), "basic");
        let err = bundle.load_source("absent").unwrap_err();
        assert!(err.to_string().contains("absent.cl"));
    }

    #[test]
    fn tests_lists_cl_stems_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("basic");
        std::fs::create_dir(&folder).unwrap();
        for name in ["zeta.cl", "alpha.cl", "alpha.bc64", "notes.txt"] {
            std::fs::write(folder.join(name), b"").unwrap();
        }
        let bundle = KernelBundle::new(dir.path(), "basic");
        assert_eq!(bundle.tests().unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
