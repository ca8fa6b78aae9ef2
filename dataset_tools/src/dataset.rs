//! Directory-organized datasets: one subdirectory per class, images inside.
//!
//! Classes are ordered alphabetically by directory name, so in a two-class
//! dataset the first directory is the negative class and the second the
//! positive one.

use classifier_service::upload::ImageExtension;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset directory not found: {0:?}")]
    NotADirectory(PathBuf),
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected {expected} class directories, found {found}: {names:?}")]
    ClassCount {
        expected: usize,
        found: usize,
        names: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledImage {
    pub path: PathBuf,
    pub class_index: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub root: PathBuf,
    pub class_names: Vec<String>,
    pub images: Vec<LabelledImage>,
}

impl Dataset {
    pub fn scan(root: &Path) -> Result<Self, DatasetError> {
        if !root.is_dir() {
            return Err(DatasetError::NotADirectory(root.to_path_buf()));
        }

        let mut class_dirs = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                class_dirs.push(entry.path());
            }
        }
        class_dirs.sort();

        let mut class_names = Vec::with_capacity(class_dirs.len());
        let mut images = Vec::new();
        for (class_index, class_dir) in class_dirs.iter().enumerate() {
            class_names.push(
                class_dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );

            let mut class_images = Vec::new();
            for entry in WalkDir::new(class_dir).follow_links(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable dataset entry: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if ImageExtension::from_filename(&name).is_none() {
                    tracing::debug!("Skipping non-image file {:?}", entry.path());
                    continue;
                }
                class_images.push(entry.into_path());
            }
            class_images.sort();

            images.extend(class_images.into_iter().map(|path| LabelledImage {
                path,
                class_index,
            }));
        }

        tracing::info!(
            "Found {} images in {} classes under {:?}",
            images.len(),
            class_names.len(),
            root
        );

        Ok(Self {
            root: root.to_path_buf(),
            class_names,
            images,
        })
    }

    /// Fails unless the dataset has exactly `expected` class directories.
    pub fn require_classes(&self, expected: usize) -> Result<(), DatasetError> {
        if self.class_names.len() != expected {
            return Err(DatasetError::ClassCount {
                expected,
                found: self.class_names.len(),
                names: self.class_names.clone(),
            });
        }
        Ok(())
    }

    pub fn class_count(&self, class_index: usize) -> usize {
        self.images
            .iter()
            .filter(|image| image.class_index == class_index)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_orders_classes_alphabetically() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("normal/nested")).unwrap();
        fs::create_dir_all(root.join("cancer")).unwrap();
        fs::write(root.join("normal/b.png"), b"x").unwrap();
        fs::write(root.join("normal/nested/a.JPG"), b"x").unwrap();
        fs::write(root.join("normal/notes.txt"), b"x").unwrap();
        fs::write(root.join("cancer/c.webp"), b"x").unwrap();
        fs::write(root.join("README.md"), b"x").unwrap();

        let dataset = Dataset::scan(root).unwrap();
        assert_eq!(dataset.class_names, vec!["cancer", "normal"]);
        assert_eq!(dataset.images.len(), 3);
        assert_eq!(dataset.class_count(0), 1);
        assert_eq!(dataset.class_count(1), 2);
        assert_eq!(dataset.images[0].path, root.join("cancer/c.webp"));
        assert!(dataset.require_classes(2).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_broken_links() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("cancer")).unwrap();
        fs::create_dir_all(root.join("normal")).unwrap();
        fs::write(root.join("cancer/a.png"), b"x").unwrap();
        fs::write(root.join("normal/b.png"), b"x").unwrap();
        std::os::unix::fs::symlink(root.join("gone.png"), root.join("normal/dangling.png"))
            .unwrap();
        std::os::unix::fs::symlink(root.join("normal"), root.join("normal/loop")).unwrap();

        let dataset = Dataset::scan(root).unwrap();
        assert_eq!(dataset.class_names, vec!["cancer", "normal"]);
        assert_eq!(
            dataset.images,
            vec![
                LabelledImage {
                    path: root.join("cancer/a.png"),
                    class_index: 0,
                },
                LabelledImage {
                    path: root.join("normal/b.png"),
                    class_index: 1,
                },
            ]
        );
    }

    #[test]
    fn test_require_classes() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("only")).unwrap();

        let dataset = Dataset::scan(temp.path()).unwrap();
        assert!(matches!(
            dataset.require_classes(2),
            Err(DatasetError::ClassCount {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp = tempdir().unwrap();
        let result = Dataset::scan(&temp.path().join("missing"));
        assert!(matches!(result, Err(DatasetError::NotADirectory(_))));
    }
}
