use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use jcg_adapter_spring::{MethodBodyExtractor, SpringCallGraphBuilder};
use jcg_classfile::{
    AnnotationInfo, AnnotationValue, ClassUnit, Instruction, InvokeKind, MethodUnit, Op,
};
use jcg_cli::reporters::{sanitize_filename, ArtifactGenerator};
use jcg_core::stdlib::StdlibFilter;

fn invoke(offset: u32, kind: InvokeKind, owner: &str, name: &str) -> Instruction {
    Instruction {
        offset,
        op: Op::Invoke {
            kind,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: "()V".to_string(),
        },
    }
}

fn annotation(type_name: &str, path: Option<&str>) -> AnnotationInfo {
    AnnotationInfo {
        type_name: type_name.to_string(),
        values: path
            .map(|p| vec![("value".to_string(), AnnotationValue::Str(p.to_string()))])
            .unwrap_or_default(),
    }
}

fn method(
    name: &str,
    annotations: Vec<AnnotationInfo>,
    instructions: Vec<Instruction>,
) -> MethodUnit {
    MethodUnit {
        name: name.to_string(),
        descriptor: "()V".to_string(),
        access: 0x0001,
        annotations,
        instructions,
    }
}

fn unit(
    root: &Path,
    name: &str,
    access: u16,
    interfaces: Vec<&str>,
    annotations: Vec<AnnotationInfo>,
    methods: Vec<MethodUnit>,
) -> ClassUnit {
    ClassUnit {
        name: name.to_string(),
        path: root.join(format!("classes/{}.class", name.replace('.', "/"))),
        source_file: None,
        access,
        major_version: 52,
        interfaces: interfaces.into_iter().map(String::from).collect(),
        annotations,
        methods,
    }
}

/// A controller endpoint calling through a service interface into a
/// repository that ends in an external library call.
fn sample_units(root: &Path) -> Vec<ClassUnit> {
    vec![
        unit(
            root,
            "app.UserController",
            0x0021,
            vec![],
            vec![annotation(
                "org.springframework.web.bind.annotation.RestController",
                None,
            )],
            vec![
                method(
                    "getUser",
                    vec![annotation(
                        "org.springframework.web.bind.annotation.GetMapping",
                        Some("/users/{id}"),
                    )],
                    vec![
                        invoke(0, InvokeKind::Interface, "app.UserService", "findById"),
                        invoke(5, InvokeKind::Static, "java.util.Objects", "requireNonNull"),
                    ],
                ),
                method("health", vec![], vec![]),
            ],
        ),
        unit(
            root,
            "app.UserService",
            0x0601,
            vec![],
            vec![],
            vec![method("findById", vec![], vec![])],
        ),
        unit(
            root,
            "app.UserServiceImpl",
            0x0021,
            vec!["app.UserService"],
            vec![],
            vec![method(
                "findById",
                vec![],
                vec![invoke(0, InvokeKind::Virtual, "app.UserRepo", "query")],
            )],
        ),
        unit(
            root,
            "app.UserRepo",
            0x0021,
            vec![],
            vec![],
            vec![method(
                "query",
                vec![],
                vec![invoke(0, InvokeKind::Virtual, "org.lib.Json", "parse")],
            )],
        ),
    ]
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn generates_graph_and_body_artifacts() -> Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let root = tmp_dir.path();
    let out = root.join("out");

    let analysis =
        SpringCallGraphBuilder::new(PathBuf::from("/unused")).build_from_units(sample_units(root));
    let bodies = MethodBodyExtractor::from_units(&analysis.units, StdlibFilter::default());

    let summary = ArtifactGenerator::new(&analysis, out.clone())
        .with_source_root(root.to_path_buf())
        .with_bodies(&bodies)
        .generate()?;

    assert_eq!(summary.endpoints_detected, 1);
    assert_eq!(summary.endpoints_written, 1);
    assert_eq!(summary.bodies_loaded, 5);

    let full = read_json(&out.join("full_call_graph.json"))?;
    assert_eq!(full.as_object().unwrap().len(), 3);
    assert!(full["app.UserController.getUser"]
        .as_array()
        .unwrap()
        .iter()
        .any(|callee| callee == "app.UserServiceImpl.findById"));

    let subgraph = read_json(&out.join("GET__users__id_.json"))?;
    let subgraph = subgraph.as_object().unwrap();
    assert!(subgraph.contains_key("app.UserController.getUser"));
    assert!(subgraph.contains_key("app.UserRepo.query"));

    let bundle = read_json(&out.join("GET__users__id__method_bodies.json"))?;
    assert_eq!(bundle["endpoint"], "GET /users/{id}");
    assert_eq!(bundle["entryPoint"], "app.UserController.getUser");

    let methods = bundle["methods"].as_array().unwrap();
    let names: Vec<&str> = methods
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    // The service interface method is filtered out as noise; the
    // external library method stays, as a placeholder.
    assert_eq!(
        names,
        vec![
            "app.UserController.getUser",
            "app.UserServiceImpl.findById",
            "app.UserRepo.query",
            "org.lib.Json.parse",
        ]
    );

    let external = &methods[3];
    assert_eq!(external["body"], jcg_core::models::EXTERNAL_BODY);
    assert!(external.get("filePath").is_none());

    let entry = &methods[0];
    let file_path = entry["filePath"].as_str().unwrap();
    assert!(!file_path.starts_with('/'), "paths should be relativized");
    assert!(file_path.ends_with("UserController.class"));

    let controllers = read_json(&out.join("controller_method_bodies.json"))?;
    let entries = controllers["controllers"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["controllerMethod"], "app.UserController.health");
    Ok(())
}

#[test]
fn body_bundles_are_optional() -> Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    let root = tmp_dir.path();
    let out = root.join("out");

    let analysis =
        SpringCallGraphBuilder::new(PathBuf::from("/unused")).build_from_units(sample_units(root));
    let summary = ArtifactGenerator::new(&analysis, out.clone()).generate()?;

    assert_eq!(summary.endpoints_written, 1);
    assert_eq!(summary.bodies_loaded, 0);
    assert!(out.join("GET__users__id_.json").exists());
    assert!(!out.join("GET__users__id__method_bodies.json").exists());
    assert!(!out.join("controller_method_bodies.json").exists());
    Ok(())
}

#[test]
fn sanitizes_endpoint_keys_into_file_names() {
    assert_eq!(sanitize_filename("GET_/users/{id}"), "GET__users__id_");
    assert_eq!(
        sanitize_filename("POST_/api/v1.2/items-all"),
        "POST__api_v1.2_items-all"
    );
}
