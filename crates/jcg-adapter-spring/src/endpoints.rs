use std::collections::BTreeMap;

use tracing::{debug, warn};

use jcg_classfile::{AnnotationInfo, AnnotationValue, ClassUnit, MethodUnit};
use jcg_core::models::{method_id, Endpoint, HttpMethod};

/// Class-level annotation suffixes that mark a controller.
const CONTROLLER_SUFFIXES: &[&str] = &["RestController", "Controller"];

/// Method-level annotation name fragments that mark an HTTP mapping.
const MAPPING_MARKERS: &[&str] = &[
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "RequestMapping",
];

/// Finds Spring MVC handler methods across parsed classes, keyed by
/// `<VERB> <path>` with last-wins de-duplication.
#[derive(Debug, Default)]
pub struct EndpointDetector {
    endpoints: BTreeMap<String, Endpoint>,
}

impl EndpointDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspects one class; non-controllers are skipped wholesale.
    pub fn scan_unit(&mut self, unit: &ClassUnit) {
        if !is_controller(unit) {
            return;
        }
        for method in &unit.methods {
            let Some((verb, path)) = request_mapping(method) else {
                continue;
            };
            let endpoint = Endpoint::new(verb, path, method_id(&unit.name, &method.name));
            let key = endpoint.key();
            debug!(endpoint = %key, handler = %endpoint.entry_method, "Detected endpoint");
            if let Some(previous) = self.endpoints.insert(key.clone(), endpoint) {
                warn!(
                    endpoint = %key,
                    replaced = %previous.entry_method,
                    "Duplicate endpoint mapping, keeping the latest"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Detected endpoints ordered by `<VERB> <path>` key.
    pub fn into_endpoints(self) -> Vec<Endpoint> {
        self.endpoints.into_values().collect()
    }
}

fn is_controller(unit: &ClassUnit) -> bool {
    unit.annotations.iter().any(|annotation| {
        CONTROLLER_SUFFIXES
            .iter()
            .any(|suffix| annotation.type_name.ends_with(suffix))
    })
}

/// Maps the first mapping annotation on `method` to a verb and path.
/// Matching is by name fragment so meta-annotations that embed the
/// Spring names are caught too.
fn request_mapping(method: &MethodUnit) -> Option<(HttpMethod, String)> {
    let annotation = method.annotations.iter().find(|annotation| {
        MAPPING_MARKERS
            .iter()
            .any(|marker| annotation.type_name.contains(marker))
    })?;
    let verb = if annotation.type_name.contains("GetMapping") {
        HttpMethod::Get
    } else if annotation.type_name.contains("PostMapping") {
        HttpMethod::Post
    } else if annotation.type_name.contains("PutMapping") {
        HttpMethod::Put
    } else if annotation.type_name.contains("DeleteMapping") {
        HttpMethod::Delete
    } else {
        HttpMethod::Request
    };
    Some((verb, mapping_path(annotation)))
}

/// Pulls the path out of `value` or `path`, handling both the plain
/// string and string-array forms javac emits.
fn mapping_path(annotation: &AnnotationInfo) -> String {
    let element = annotation
        .value("value")
        .or_else(|| annotation.value("path"));
    match element {
        Some(AnnotationValue::Str(path)) => path.clone(),
        Some(AnnotationValue::Array(items)) => match items.first() {
            Some(AnnotationValue::Str(path)) => path.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn marker(type_name: &str) -> AnnotationInfo {
        AnnotationInfo {
            type_name: type_name.to_string(),
            values: Vec::new(),
        }
    }

    fn mapping(type_name: &str, element: &str, path: &str) -> AnnotationInfo {
        AnnotationInfo {
            type_name: type_name.to_string(),
            values: vec![(
                element.to_string(),
                AnnotationValue::Str(path.to_string()),
            )],
        }
    }

    fn handler(name: &str, annotations: Vec<AnnotationInfo>) -> MethodUnit {
        MethodUnit {
            name: name.to_string(),
            descriptor: "()V".to_string(),
            access: 0x0001,
            annotations,
            instructions: Vec::new(),
        }
    }

    fn class(name: &str, annotations: Vec<AnnotationInfo>, methods: Vec<MethodUnit>) -> ClassUnit {
        ClassUnit {
            name: name.to_string(),
            path: PathBuf::from("Unit.class"),
            source_file: None,
            access: 0x0021,
            major_version: 52,
            interfaces: Vec::new(),
            annotations,
            methods,
        }
    }

    #[test]
    fn detects_mapped_methods_on_controllers() {
        let unit = class(
            "com.acme.UserController",
            vec![marker(
                "org.springframework.web.bind.annotation.RestController",
            )],
            vec![
                handler(
                    "list",
                    vec![mapping(
                        "org.springframework.web.bind.annotation.GetMapping",
                        "value",
                        "/users",
                    )],
                ),
                handler(
                    "create",
                    vec![mapping(
                        "org.springframework.web.bind.annotation.PostMapping",
                        "path",
                        "/users",
                    )],
                ),
                handler("helper", vec![]),
            ],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&unit);
        let endpoints = detector.into_endpoints();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].key(), "GET /users");
        assert_eq!(endpoints[0].entry_method, "com.acme.UserController.list");
        assert_eq!(endpoints[1].key(), "POST /users");
        assert_eq!(endpoints[1].entry_method, "com.acme.UserController.create");
    }

    #[test]
    fn ignores_mapped_methods_outside_controllers() {
        let unit = class(
            "com.acme.SyncWorker",
            vec![marker("org.springframework.stereotype.Service")],
            vec![handler(
                "poll",
                vec![mapping(
                    "org.springframework.web.bind.annotation.GetMapping",
                    "value",
                    "/nope",
                )],
            )],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&unit);
        assert!(detector.is_empty());
    }

    #[test]
    fn plain_request_mapping_becomes_the_request_verb() {
        let unit = class(
            "com.acme.AdminController",
            vec![marker("org.springframework.stereotype.Controller")],
            vec![handler(
                "dashboard",
                vec![mapping(
                    "org.springframework.web.bind.annotation.RequestMapping",
                    "value",
                    "/admin",
                )],
            )],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&unit);
        let endpoints = detector.into_endpoints();
        assert_eq!(endpoints[0].key(), "REQUEST /admin");
    }

    #[test]
    fn array_valued_paths_use_the_first_entry() {
        let annotation = AnnotationInfo {
            type_name: "org.springframework.web.bind.annotation.GetMapping".to_string(),
            values: vec![(
                "value".to_string(),
                AnnotationValue::Array(vec![
                    AnnotationValue::Str("/users/{id}".to_string()),
                    AnnotationValue::Str("/users/byId/{id}".to_string()),
                ]),
            )],
        };
        let unit = class(
            "com.acme.UserController",
            vec![marker(
                "org.springframework.web.bind.annotation.RestController",
            )],
            vec![handler("getUser", vec![annotation])],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&unit);
        let endpoints = detector.into_endpoints();
        assert_eq!(endpoints[0].key(), "GET /users/{id}");
    }

    #[test]
    fn missing_path_element_defaults_to_empty() {
        let unit = class(
            "com.acme.RootController",
            vec![marker(
                "org.springframework.web.bind.annotation.RestController",
            )],
            vec![handler(
                "root",
                vec![marker("org.springframework.web.bind.annotation.GetMapping")],
            )],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&unit);
        let endpoints = detector.into_endpoints();
        assert_eq!(endpoints[0].path, "");
        assert_eq!(endpoints[0].key(), "GET ");
    }

    #[test]
    fn duplicate_mappings_keep_the_latest_handler() {
        let first = class(
            "com.acme.UserController",
            vec![marker(
                "org.springframework.web.bind.annotation.RestController",
            )],
            vec![handler(
                "list",
                vec![mapping(
                    "org.springframework.web.bind.annotation.GetMapping",
                    "value",
                    "/users",
                )],
            )],
        );
        let second = class(
            "com.acme.LegacyUserController",
            vec![marker(
                "org.springframework.web.bind.annotation.RestController",
            )],
            vec![handler(
                "listUsers",
                vec![mapping(
                    "org.springframework.web.bind.annotation.GetMapping",
                    "value",
                    "/users",
                )],
            )],
        );

        let mut detector = EndpointDetector::new();
        detector.scan_unit(&first);
        detector.scan_unit(&second);
        let endpoints = detector.into_endpoints();

        assert_eq!(endpoints.len(), 1);
        assert_eq!(
            endpoints[0].entry_method,
            "com.acme.LegacyUserController.listUsers"
        );
    }
}
