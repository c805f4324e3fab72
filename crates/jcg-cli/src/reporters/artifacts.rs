use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use jcg_adapter_spring::{MethodBodyExtractor, SpringAnalysis};
use jcg_core::models::{Endpoint, MethodInfo};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` so
/// endpoint keys survive as file names.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Counts reported once generation finishes
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactSummary {
    pub endpoints_detected: usize,
    pub endpoints_written: usize,
    pub bodies_loaded: usize,
}

/// Writes the JSON artifacts for a finished analysis
pub struct ArtifactGenerator<'a> {
    analysis: &'a SpringAnalysis,
    output_dir: PathBuf,
    source_root: Option<PathBuf>,
    bodies: Option<&'a MethodBodyExtractor>,
}

impl<'a> ArtifactGenerator<'a> {
    pub fn new(analysis: &'a SpringAnalysis, output_dir: PathBuf) -> Self {
        Self {
            analysis,
            output_dir,
            source_root: None,
            bodies: None,
        }
    }

    /// Root used to shorten `filePath` entries in body bundles.
    pub fn with_source_root(mut self, source_root: PathBuf) -> Self {
        self.source_root = Some(source_root);
        self
    }

    pub fn with_bodies(mut self, bodies: &'a MethodBodyExtractor) -> Self {
        self.bodies = Some(bodies);
        self
    }

    /// Writes every artifact. Only the output directory itself is
    /// fatal; individual file failures are logged and skipped.
    pub fn generate(&self) -> Result<ArtifactSummary> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        if let Err(e) = self.write_full_graph() {
            error!(error = %e, "Failed to write full call graph");
        }

        let endpoints = &self.analysis.endpoints;
        let pb = ProgressBar::new(endpoints.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} endpoints {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("#>-"),
        );
        pb.set_message("Writing endpoint artifacts...");

        let mut written = 0;
        for endpoint in endpoints {
            match self.write_endpoint(endpoint) {
                Ok(()) => written += 1,
                Err(e) => {
                    error!(endpoint = %endpoint.key(), error = %e, "Failed to write endpoint artifacts")
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Endpoint artifacts written");

        if self.bodies.is_some() {
            if let Err(e) = self.write_controller_bundle() {
                error!(error = %e, "Failed to write controller method bodies");
            }
        }

        let summary = ArtifactSummary {
            endpoints_detected: endpoints.len(),
            endpoints_written: written,
            bodies_loaded: self.bodies.map_or(0, MethodBodyExtractor::len),
        };
        info!(
            endpoints = summary.endpoints_written,
            bodies = summary.bodies_loaded,
            output = %self.output_dir.display(),
            "Artifacts generated"
        );
        Ok(summary)
    }

    fn write_full_graph(&self) -> Result<()> {
        let path = self.output_dir.join("full_call_graph.json");
        let json_string = serde_json::to_string_pretty(&self.analysis.graph)?;
        fs::write(&path, json_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote full call graph");
        Ok(())
    }

    /// One subgraph file per endpoint, plus a body bundle when bodies
    /// were loaded.
    fn write_endpoint(&self, endpoint: &Endpoint) -> Result<()> {
        let subgraph = self.analysis.graph.subgraph_from(&endpoint.entry_method);
        let stem = sanitize_filename(&format!("{}_{}", endpoint.method, endpoint.path));

        let graph_path = self.output_dir.join(format!("{stem}.json"));
        let json_string = serde_json::to_string_pretty(&subgraph)?;
        fs::write(&graph_path, json_string)
            .with_context(|| format!("Failed to write {}", graph_path.display()))?;

        if let Some(bodies) = self.bodies {
            let hierarchy = bodies.hierarchy(&subgraph, &endpoint.entry_method);
            let methods = self.method_entries(bodies, hierarchy.values());
            let bundle = serde_json::json!({
                "endpoint": endpoint.key(),
                "entryPoint": endpoint.entry_method,
                "methods": methods,
            });
            let bundle_path = self.output_dir.join(format!("{stem}_method_bodies.json"));
            fs::write(&bundle_path, serde_json::to_string_pretty(&bundle)?)
                .with_context(|| format!("Failed to write {}", bundle_path.display()))?;
        }
        Ok(())
    }

    /// Bundles for controller methods that no endpoint already covers.
    fn write_controller_bundle(&self) -> Result<()> {
        let Some(bodies) = self.bodies else {
            return Ok(());
        };
        let mapped: HashSet<&str> = self
            .analysis
            .endpoints
            .iter()
            .map(|endpoint| endpoint.entry_method.as_str())
            .collect();

        let mut controllers = Vec::new();
        for info in bodies.controller_methods() {
            if mapped.contains(info.full_name.as_str()) || bodies.is_flagged(&info.full_name) {
                continue;
            }
            let hierarchy = bodies.hierarchy(&self.analysis.graph, &info.full_name);
            let methods = self.method_entries(bodies, hierarchy.values());
            controllers.push(serde_json::json!({
                "controllerMethod": info.full_name,
                "methods": methods,
            }));
        }

        let controller_count = controllers.len();
        let bundle = serde_json::json!({ "controllers": controllers });
        let path = self.output_dir.join("controller_method_bodies.json");
        fs::write(&path, serde_json::to_string_pretty(&bundle)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            controllers = controller_count,
            "Wrote controller method bodies"
        );
        Ok(())
    }

    fn method_entries<'m>(
        &self,
        bodies: &MethodBodyExtractor,
        methods: impl Iterator<Item = &'m MethodInfo>,
    ) -> Vec<serde_json::Value> {
        methods
            .filter(|info| !bodies.is_flagged(&info.full_name))
            .map(|info| {
                let mut entry = serde_json::json!({
                    "name": info.full_name,
                    "body": info.body,
                });
                if let Some(file_path) = &info.file_path {
                    entry["filePath"] = serde_json::json!(self.relativize(file_path));
                }
                entry
            })
            .collect()
    }

    /// Strips the source root prefix when the path lives under it.
    fn relativize(&self, path: &Path) -> String {
        if let Some(root) = &self.source_root {
            if let Ok(stripped) = path.strip_prefix(root) {
                return stripped.to_string_lossy().into_owned();
            }
        }
        path.to_string_lossy().into_owned()
    }
}
