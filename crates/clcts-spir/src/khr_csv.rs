//! The `khr.csv` side table: per-test extension and image prerequisites.
//!
//! Each row names a (suite, test) pair, one required extension, and two
//! flags for image and 3D-image prerequisites. A `*` in the test column
//! matches every test of the suite. Required extensions accumulate across
//! all matching rows; the image flags come from the first matching row.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SpirError};
use crate::extensions::OclExtensions;

#[derive(Debug, Clone, PartialEq, Eq)]
struct KhrRow {
    suite: String,
    test: String,
    extension: String,
    images: bool,
    images_3d: bool,
}

impl KhrRow {
    fn matches(&self, suite: &str, test: &str) -> bool {
        self.suite == suite && (self.test == test || self.test == "*")
    }
}

/// Parsed side table, loaded once per run.
#[derive(Debug, Default)]
pub struct KhrSupport {
    rows: Vec<KhrRow>,
}

impl KhrSupport {
    /// Load and parse the table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SpirError::Bundle {
            path: path.to_path_buf(),
            source,
        })?;
        let mut rows = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            // Whitespace and quoting are cosmetic in this format.
            let cleaned: String =
                line.chars().filter(|c| !c.is_whitespace() && *c != '"').collect();
            if cleaned.is_empty() {
                continue;
            }
            let cols: Vec<&str> = cleaned.split(',').collect();
            if cols.len() < 5 {
                return Err(SpirError::Csv {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                    expected: 5,
                });
            }
            rows.push(KhrRow {
                suite: cols[0].to_string(),
                test: cols[1].to_string(),
                extension: cols[2].to_string(),
                images: cols[3] == "CL_TRUE",
                images_3d: cols[4] == "CL_TRUE",
            });
        }
        debug!(rows = rows.len(), path = %path.display(), "loaded prerequisite table");
        Ok(Self { rows })
    }

    /// Union of the required extensions of every matching row.
    pub fn required_extensions(&self, suite: &str, test: &str) -> OclExtensions {
        self.rows
            .iter()
            .filter(|r| r.matches(suite, test))
            .fold(OclExtensions::empty(), |acc, r| {
                acc | OclExtensions::from_extension_name(&r.extension)
            })
    }

    /// Whether the first matching row marks image support as required.
    pub fn is_images_required(&self, suite: &str, test: &str) -> bool {
        self.rows.iter().find(|r| r.matches(suite, test)).is_some_and(|r| r.images)
    }

    /// Whether the first matching row marks 3D image support as required.
    pub fn is_images_3d_required(&self, suite: &str, test: &str) -> bool {
        self.rows.iter().find(|r| r.matches(suite, test)).is_some_and(|r| r.images_3d)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table(contents: &str) -> KhrSupport {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        KhrSupport::load(file.path()).unwrap()
    }

    #[test]
    fn loads_and_counts_rows() {
        let khr = table(
            "api,test_a,cl_khr_fp64,CL_FALSE,CL_FALSE\n\
             basic,*,cl_khr_spir,CL_TRUE,CL_FALSE\n",
        );
        assert_eq!(khr.len(), 2);
    }

    #[test]
    fn missing_file_is_a_bundle_error() {
        let err = KhrSupport::load(Path::new("/nonexistent/khr.csv")).unwrap_err();
        assert!(matches!(err, SpirError::Bundle { .. }));
    }

    #[test]
    fn short_rows_are_rejected_with_line_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"api,test_a,cl_khr_fp64,CL_FALSE,CL_FALSE\napi,broken\n").unwrap();
        let err = KhrSupport::load(file.path()).unwrap_err();
        let SpirError::Csv { line, .. } = err else { panic!("expected a csv error") };
        assert_eq!(line, 2);
    }

    #[test]
    fn extensions_accumulate_across_matching_rows() {
        let khr = table(
            "math,sin.math_kernel,cl_khr_fp64,CL_FALSE,CL_FALSE\n\
             math,sin.math_kernel,cl_khr_fp16,CL_FALSE,CL_FALSE\n\
             math,other,cl_khr_spir,CL_FALSE,CL_FALSE\n",
        );
        let required = khr.required_extensions("math", "sin.math_kernel");
        assert_eq!(required, OclExtensions::CL_KHR_FP64 | OclExtensions::CL_KHR_FP16);
    }

    #[test]
    fn wildcard_test_matches_any_name() {
        let khr = table("images,*,cl_khr_3d_image_writes,CL_TRUE,CL_TRUE\n");
        assert_eq!(
            khr.required_extensions("images", "anything_at_all"),
            OclExtensions::CL_KHR_3D_IMAGE_WRITES
        );
        assert!(khr.is_images_required("images", "anything_at_all"));
        assert!(khr.is_images_3d_required("images", "anything_at_all"));
        assert!(!khr.is_images_required("other_suite", "anything_at_all"));
    }

    #[test]
    fn quotes_and_spaces_are_stripped() {
        let khr = table("\"api\", \"test_a\" , cl_khr_spir, CL_TRUE, CL_FALSE\n");
        assert!(khr.is_images_required("api", "test_a"));
        assert_eq!(khr.required_extensions("api", "test_a"), OclExtensions::CL_KHR_SPIR);
    }

    #[test]
    fn no_matching_row_means_no_prerequisites() {
        let khr = table("api,test_a,cl_khr_spir,CL_TRUE,CL_TRUE\n");
        assert_eq!(khr.required_extensions("api", "test_b"), OclExtensions::empty());
        assert!(!khr.is_images_required("api", "test_b"));
    }
}
