use anyhow::Result;
use std::fs;
use std::path::Path;

/// Creates the configuration file
pub fn execute_init(path: &str) -> Result<()> {
    let config_content = r#"project_name = "MyApp"

# Directory containing the compiled .class files
classes_dir = "target/classes"

# Root for relativizing source paths in artifacts (optional; when unset,
# a src/ directory next to the build output is picked up automatically)
# source_root = "src"

# Extract method bodies into artifacts (default true)
extract_bodies = true

# Package prefixes excluded from the call graph
# stdlib_prefixes = ["java.", "javax."]

[output]
dir = "call_graph_output"
"#;

    let config_path = Path::new(path);
    if config_path.exists() {
        anyhow::bail!("Config file already exists: {}", path);
    }

    fs::write(config_path, config_content)?;
    println!("Created config file: {}", path);
    println!("Point classes_dir at your compiled classes, then run: jcg analyze");

    Ok(())
}
