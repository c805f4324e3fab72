/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Structured JSON format
    Json,
}

impl LogFormat {
    /// Maps a JCG_LOG_FORMAT value; anything unrecognized falls back
    /// to text.
    pub fn from_env_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}
