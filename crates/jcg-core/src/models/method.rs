use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder body for methods outside the analyzed class set.
pub const EXTERNAL_BODY: &str = "// Method body not available (external library or JDK method)";

/// Canonical `<fully.qualified.Type>.<method>` identifier. Overloads
/// share one identifier since descriptors are not part of it.
pub fn method_id(owner: &str, name: &str) -> String {
    format!("{owner}.{name}")
}

/// Splits an identifier into owner and method name at the last dot.
pub fn split_method_id(id: &str) -> Option<(&str, &str)> {
    id.rsplit_once('.')
}

/// One method as the artifact writers see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub full_name: String,
    pub name: String,
    pub descriptor: String,
    pub class_name: String,
    pub access: u16,
    pub file_path: Option<PathBuf>,
    pub body: String,
}

impl MethodInfo {
    /// Stand-in record for a callee outside the analyzed classes.
    pub fn external(full_name: &str) -> Self {
        let (class_name, name) = match split_method_id(full_name) {
            Some((owner, method)) => (owner.to_string(), method.to_string()),
            None => (String::new(), full_name.to_string()),
        };
        Self {
            full_name: full_name.to_string(),
            name,
            descriptor: "()".to_string(),
            class_name,
            access: 0,
            file_path: None,
            body: EXTERNAL_BODY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_identifier_at_last_dot() {
        assert_eq!(
            split_method_id("com.acme.UserService.findAll"),
            Some(("com.acme.UserService", "findAll"))
        );
        assert_eq!(split_method_id("main"), None);
    }

    #[test]
    fn external_methods_carry_the_placeholder_body() {
        let info = MethodInfo::external("java.util.List.add");
        assert_eq!(info.class_name, "java.util.List");
        assert_eq!(info.name, "add");
        assert_eq!(info.body, EXTERNAL_BODY);
        assert!(info.file_path.is_none());
    }
}
