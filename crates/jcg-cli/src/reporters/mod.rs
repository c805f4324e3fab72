pub mod artifacts;

pub use artifacts::{sanitize_filename, ArtifactGenerator, ArtifactSummary};
