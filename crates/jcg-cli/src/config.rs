use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Project configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub project_name: String,
    /// Directory containing the compiled .class files
    pub classes_dir: String,
    /// Root used to relativize source paths in artifacts (optional)
    pub source_root: Option<String>,
    /// Extract method bodies into artifacts (default true)
    pub extract_bodies: Option<bool>,
    /// Package prefixes excluded from the call graph (default java./javax.)
    pub stdlib_prefixes: Option<Vec<String>>,
    pub output: OutputConfig,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the config file (can be absolute or relative)
    /// * `base_path` - Optional base path for resolving relative paths in
    ///   config. If None, uses the directory of the config file as base.
    pub fn load(path: &str, base_path: Option<&Path>) -> Result<Self> {
        let config_path = Path::new(path);
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        let base =
            base_path.unwrap_or_else(|| config_path.parent().unwrap_or_else(|| Path::new(".")));

        config.resolve_relative_paths(base)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.project_name.is_empty() {
            anyhow::bail!("project_name cannot be empty");
        }

        let classes = Path::new(&self.classes_dir);
        if !classes.exists() {
            anyhow::bail!("classes_dir does not exist: {}", self.classes_dir);
        }
        if !classes.is_dir() {
            anyhow::bail!("classes_dir must be a directory: {}", self.classes_dir);
        }

        if let Some(ref source_root) = self.source_root {
            let path = Path::new(source_root);
            if !path.exists() {
                anyhow::bail!("source_root does not exist: {}", source_root);
            }
            if !path.is_dir() {
                anyhow::bail!("source_root must be a directory: {}", source_root);
            }
        }

        if let Some(ref prefixes) = self.stdlib_prefixes {
            if prefixes.iter().any(|prefix| prefix.is_empty()) {
                anyhow::bail!("stdlib_prefixes entries cannot be empty");
            }
        }

        if self.output.dir.is_empty() {
            anyhow::bail!("output.dir cannot be empty");
        }

        Ok(())
    }

    /// Resolves all relative paths in the config relative to the base path
    fn resolve_relative_paths(&mut self, base: &Path) -> Result<()> {
        self.classes_dir = resolve_path(base, &self.classes_dir, "classes_dir")?;
        if let Some(ref source_root) = self.source_root {
            self.source_root = Some(resolve_path(base, source_root, "source_root")?);
        }
        // The output directory may not exist yet; join without
        // canonicalizing.
        if !Path::new(&self.output.dir).is_absolute() {
            self.output.dir = base.join(&self.output.dir).to_string_lossy().to_string();
        }
        Ok(())
    }

    /// Fills in source_root by convention when unset: a `src` directory
    /// two levels above the classes dir, matching the `target/classes`
    /// and `build/classes` layouts of Maven and Gradle.
    pub fn auto_fill_source_root(&mut self) {
        if self.source_root.is_some() {
            return;
        }
        if let Some(found) = Self::auto_find_source_root(&self.classes_dir) {
            info!(source_root = %found, "Auto-detected source root");
            self.source_root = Some(found);
        }
    }

    fn auto_find_source_root(classes_dir: &str) -> Option<String> {
        let classes = Path::new(classes_dir);
        let project = classes.parent()?.parent()?;
        let candidate = project.join("src");
        if candidate.is_dir() {
            return Some(candidate.to_string_lossy().to_string());
        }
        debug!(classes_dir = %classes_dir, "No source root next to the build output");
        None
    }
}

/// Joins a relative path onto the base, canonicalizing when it exists
fn resolve_path(base: &Path, value: &str, field: &str) -> Result<String> {
    let path = Path::new(value);
    if path.is_absolute() {
        return Ok(value.to_string());
    }
    let joined = base.join(value);
    let resolved = if joined.exists() {
        joined
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}: {}", field, value))?
    } else {
        joined
    };
    Ok(resolved.to_string_lossy().to_string())
}
