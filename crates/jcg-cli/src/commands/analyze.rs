use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;
use jcg_adapter_spring::{MethodBodyExtractor, SpringCallGraphBuilder};
use jcg_core::stdlib::StdlibFilter;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::reporters::ArtifactGenerator;

/// Executes call graph extraction for a configured project
pub fn execute_analyze(config_path: &str, verbose: bool) -> Result<()> {
    // 1. Load configuration
    let config_file_path = Path::new(config_path);
    let base_path = config_file_path.parent();
    let mut config = Config::load(config_path, base_path)?;

    // 2. Auto-fill the source root for body extraction
    config.auto_fill_source_root();

    println!("Project: {}", config.project_name);
    println!("Reading classes from: {}", config.classes_dir);

    // 3. Parse classes and build the call graph
    let stdlib = config
        .stdlib_prefixes
        .clone()
        .map(StdlibFilter::new)
        .unwrap_or_default();

    let pb = ProgressBar::new_spinner();
    pb.set_message("Parsing class files and building call graph...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let analysis = SpringCallGraphBuilder::new(PathBuf::from(&config.classes_dir))
        .with_stdlib(stdlib.clone())
        .with_verbose(verbose)
        .build()?;

    pb.finish_with_message("Call graph built");
    println!(
        "Analyzed {} classes, {} methods with outgoing calls",
        analysis.units.len(),
        analysis.graph.len()
    );
    println!("Detected {} REST endpoints", analysis.endpoints.len());

    // 4. Load method bodies
    let extractor = if config.extract_bodies.unwrap_or(true) {
        Some(MethodBodyExtractor::from_units(&analysis.units, stdlib))
    } else {
        info!("Method body extraction disabled by config");
        None
    };

    // 5. Write artifacts
    let mut generator = ArtifactGenerator::new(&analysis, PathBuf::from(&config.output.dir));
    if let Some(ref source_root) = config.source_root {
        generator = generator.with_source_root(PathBuf::from(source_root));
    }
    if let Some(ref extractor) = extractor {
        generator = generator.with_bodies(extractor);
    }
    let summary = generator.generate()?;

    println!(
        "Wrote {} of {} endpoint graphs, {} method bodies loaded",
        summary.endpoints_written.to_string().bold(),
        summary.endpoints_detected.to_string().bold(),
        summary.bodies_loaded.to_string().bold()
    );
    println!(
        "{} Artifacts saved to {}",
        "Analysis completed.".green().bold(),
        config.output.dir
    );

    Ok(())
}
