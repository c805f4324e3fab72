use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP verb of a mapping annotation. `Request` stands for the generic
/// `@RequestMapping` that does not commit to a single verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Request,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Request => "REQUEST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected HTTP entry point and the controller method behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    /// Method identifier of the annotated handler.
    pub entry_method: String,
}

impl Endpoint {
    pub fn new(
        method: HttpMethod,
        path: impl Into<String>,
        entry_method: impl Into<String>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            entry_method: entry_method.into(),
        }
    }

    /// `<VERB> <path>`, the de-duplication key and display form.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
