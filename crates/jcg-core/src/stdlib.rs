/// Package prefixes treated as platform code by default.
pub const DEFAULT_STDLIB_PREFIXES: &[&str] = &["java.", "javax."];

/// Decides whether a dotted class name belongs to the JDK or another
/// filtered namespace, keeping graphs focused on application code.
#[derive(Debug, Clone)]
pub struct StdlibFilter {
    prefixes: Vec<String>,
}

impl Default for StdlibFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_STDLIB_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        )
    }
}

impl StdlibFilter {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    pub fn is_stdlib(&self, class_name: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| class_name.starts_with(prefix))
    }
}
