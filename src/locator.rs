// 📂 Artifact Locator - identifier → path
//
// The engine never builds paths itself; it asks a locator. Tests and
// alternative layouts swap in their own implementation.

use std::path::{Path, PathBuf};

/// Placeholder replaced by the group's file-naming code.
pub const CODE_PLACEHOLDER: &str = "{code}";

pub trait ArtifactLocator: Send + Sync {
    /// Path of the prediction export named by `file_code`.
    fn prediction_path(&self, file_code: &str) -> PathBuf;

    /// Path of the ground-truth table.
    fn ground_truth_path(&self) -> PathBuf;

    fn prediction_exists(&self, file_code: &str) -> bool {
        self.prediction_path(file_code).is_file()
    }
}

/// Everything under one directory, predictions named by a pattern
/// such as `output_{code}.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    root: PathBuf,
    pattern: String,
    ground_truth_file: PathBuf,
}

impl DirectoryLocator {
    pub fn new(root: impl Into<PathBuf>, pattern: &str, ground_truth_file: impl Into<PathBuf>) -> Self {
        DirectoryLocator {
            root: root.into(),
            pattern: pattern.to_string(),
            ground_truth_file: ground_truth_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name for a code, e.g. "OAK" → "output_OAK.csv".
    pub fn file_name(&self, file_code: &str) -> String {
        self.pattern.replace(CODE_PLACEHOLDER, file_code)
    }
}

impl ArtifactLocator for DirectoryLocator {
    fn prediction_path(&self, file_code: &str) -> PathBuf {
        self.root.join(self.file_name(file_code))
    }

    /// Relative ground-truth paths resolve against the root; absolute
    /// ones are used as given.
    fn ground_truth_path(&self) -> PathBuf {
        self.root.join(&self.ground_truth_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_path_from_pattern() {
        let locator = DirectoryLocator::new("/data", "output_{code}.csv", "data_ba-results.csv");

        assert_eq!(locator.file_name("OAK"), "output_OAK.csv");
        assert_eq!(locator.prediction_path("BOS"), PathBuf::from("/data/output_BOS.csv"));
        assert_eq!(locator.ground_truth_path(), PathBuf::from("/data/data_ba-results.csv"));
    }

    #[test]
    fn test_absolute_ground_truth_path() {
        let locator = DirectoryLocator::new("/data", "{code}.csv", "/elsewhere/results.csv");
        assert_eq!(locator.ground_truth_path(), PathBuf::from("/elsewhere/results.csv"));
    }

    #[test]
    fn test_prediction_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("output_COL.csv"), "Name,Optimization_Value\n").unwrap();
        let locator = DirectoryLocator::new(dir.path(), "output_{code}.csv", "results.csv");

        assert!(locator.prediction_exists("COL"));
        assert!(!locator.prediction_exists("BOS"));
    }
}
