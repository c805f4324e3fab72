use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::class_unit::{parse_class, ClassUnit};

/// Recursively loads every `.class` file under `root`. Files that fail
/// to parse and directories that cannot be read are logged and skipped
/// so one bad artifact does not sink the whole analysis; only an
/// unreadable `root` is fatal.
pub fn scan_classes(root: &Path) -> Result<Vec<ClassUnit>> {
    let mut files = Vec::new();
    collect_class_files(root, &mut files)
        .with_context(|| format!("Failed to scan class directory {}", root.display()))?;
    files.sort();
    debug!(count = files.len(), "Discovered class files");

    let mut units = Vec::with_capacity(files.len());
    for file in files {
        match load_unit(&file) {
            Ok(unit) => units.push(unit),
            Err(e) => {
                error!(file = %file.display(), error = %e, "Skipping unreadable class file");
            }
        }
    }
    Ok(units)
}

/// Reads and parses a single `.class` file.
pub fn load_unit(path: &Path) -> Result<ClassUnit> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_class(&data, path).with_context(|| format!("Failed to parse {}", path.display()))
}

fn collect_class_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            // Unreadable subtrees are skipped; only the root read is
            // fatal to the scan.
            if let Err(e) = collect_class_files(&path, files) {
                error!(dir = %path.display(), error = %e, "Skipping unreadable directory");
            }
        } else if path.extension().is_some_and(|ext| ext == "class") {
            files.push(path);
        }
    }
    Ok(())
}
