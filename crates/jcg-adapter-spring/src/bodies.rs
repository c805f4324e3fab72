use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use tracing::{info, trace};

use jcg_classfile::ClassUnit;
use jcg_core::call_graph::MethodCallGraph;
use jcg_core::models::{method_id, split_method_id, MethodInfo};
use jcg_core::stdlib::StdlibFilter;

use crate::filter::MethodFilter;

/// Entry method first, then callees in depth-first discovery order.
pub type MethodHierarchy = IndexMap<String, MethodInfo>;

/// Files that mark a Java project root.
const PROJECT_ROOT_MARKERS: &[&str] = &["pom.xml", "build.gradle"];

/// Upper bound on parent-directory hops when locating the root.
const MAX_ROOT_WALK: usize = 10;

/// Collects a body for every analyzed method: bytecode disassembly by
/// default, upgraded to original Java source when the file can be
/// found next to the compiled output.
pub struct MethodBodyExtractor {
    bodies: HashMap<String, MethodInfo>,
    flagged: HashSet<String>,
    stdlib: StdlibFilter,
}

impl MethodBodyExtractor {
    pub fn from_units(units: &[ClassUnit], stdlib: StdlibFilter) -> Self {
        let mut bodies = HashMap::new();
        let mut flagged = HashSet::new();
        for unit in units {
            let filter = MethodFilter::for_unit(unit);
            let source = read_unit_source(unit);
            for method in &unit.methods {
                let full_name = method_id(&unit.name, &method.name);
                let mut body = unit.disassemble(method);
                let mut file_path = unit.path.clone();
                if let Some((source_path, source_text)) = &source {
                    file_path = source_path.clone();
                    if let Some(extracted) = extract_method_body(source_text, &method.name) {
                        body = extracted;
                    }
                }
                if filter.should_skip(method) {
                    flagged.insert(full_name.clone());
                }
                bodies.insert(
                    full_name.clone(),
                    MethodInfo {
                        full_name,
                        name: method.name.clone(),
                        descriptor: method.descriptor.clone(),
                        class_name: unit.name.clone(),
                        access: method.access,
                        file_path: Some(file_path),
                        body,
                    },
                );
            }
        }
        info!(
            methods = bodies.len(),
            classes = units.len(),
            "Loaded method bodies"
        );
        Self {
            bodies,
            flagged,
            stdlib,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, method: &str) -> Option<&MethodInfo> {
        self.bodies.get(method)
    }

    /// True when the filter marked `method` as noise.
    pub fn is_flagged(&self, method: &str) -> bool {
        self.flagged.contains(method)
    }

    /// Body records for everything reachable from `entry`, entry
    /// first. Methods without a loaded body come back as external
    /// placeholders.
    pub fn hierarchy(&self, graph: &MethodCallGraph, entry: &str) -> MethodHierarchy {
        let mut ordered = MethodHierarchy::new();
        let mut visited = HashSet::new();
        self.visit(graph, entry, &mut visited, &mut ordered);
        ordered
    }

    fn visit(
        &self,
        graph: &MethodCallGraph,
        method: &str,
        visited: &mut HashSet<String>,
        ordered: &mut MethodHierarchy,
    ) {
        if !visited.insert(method.to_string()) {
            return;
        }
        let info = self
            .bodies
            .get(method)
            .cloned()
            .unwrap_or_else(|| MethodInfo::external(method));
        ordered.insert(method.to_string(), info);
        for callee in graph.callees(method) {
            if let Some((owner, _)) = split_method_id(callee) {
                if self.stdlib.is_stdlib(owner) {
                    continue;
                }
            }
            self.visit(graph, callee, visited, ordered);
        }
    }

    /// Methods on controller classes, ordered by identifier.
    pub fn controller_methods(&self) -> Vec<&MethodInfo> {
        let mut methods: Vec<&MethodInfo> = self
            .bodies
            .values()
            .filter(|info| {
                info.class_name.contains(".controllers.")
                    || info.class_name.ends_with("Controller")
            })
            .collect();
        methods.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        methods
    }
}

/// Locates and reads the Java source for `unit`, once per class.
/// Candidates are `src/main/java/<pkg>/<file>` then `src/<pkg>/<file>`
/// under the project root; `<file>` comes from the SourceFile
/// attribute when the class carries one.
fn read_unit_source(unit: &ClassUnit) -> Option<(PathBuf, String)> {
    let root = find_project_root(&unit.path)?;
    let (package, simple_name) = match unit.name.rsplit_once('.') {
        Some((package, simple_name)) => (package, simple_name),
        None => ("", unit.name.as_str()),
    };
    let file_name = unit
        .source_file
        .clone()
        .unwrap_or_else(|| format!("{simple_name}.java"));
    let package_path = package.replace('.', "/");
    let candidates = [
        root.join("src/main/java").join(&package_path).join(&file_name),
        root.join("src").join(&package_path).join(&file_name),
    ];
    for candidate in candidates {
        if candidate.is_file() {
            trace!(file = %candidate.display(), class = %unit.name, "Reading source for method bodies");
            let text = fs::read_to_string(&candidate).ok()?;
            return Some((candidate, text));
        }
    }
    None
}

/// Walks up from the class file looking for a build marker.
fn find_project_root(class_path: &Path) -> Option<PathBuf> {
    let mut current = class_path.parent()?;
    for _ in 0..MAX_ROOT_WALK {
        if PROJECT_ROOT_MARKERS
            .iter()
            .any(|marker| current.join(marker).exists())
        {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
    None
}

/// Cuts the statements of `method_name` out of Java source: the
/// brace-balanced region between the declaration's outer braces,
/// trimmed. A declaration regex anchors the start; brace counting
/// finds the end, so nested blocks and lambdas survive intact.
fn extract_method_body(source: &str, method_name: &str) -> Option<String> {
    let pattern = format!(
        r"(?:public|protected|private|static|\s)+[\w<>\[\]]+\s+{}\s*\([^)]*\)\s*(?:throws[^{{]*)?\{{",
        regex::escape(method_name)
    );
    let regex = Regex::new(&pattern).ok()?;
    let matched = regex.find(source)?;
    let body_start = matched.end();

    let mut depth = 1usize;
    for (index, ch) in source[body_start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(source[body_start..body_start + index].trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use jcg_classfile::{Instruction, InvokeKind, MethodUnit, Op};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn invoke(offset: u32, owner: &str, name: &str) -> Instruction {
        Instruction {
            offset,
            op: Op::Invoke {
                kind: InvokeKind::Virtual,
                owner: owner.to_string(),
                name: name.to_string(),
                descriptor: "()V".to_string(),
            },
        }
    }

    fn method(name: &str, instructions: Vec<Instruction>) -> MethodUnit {
        MethodUnit {
            name: name.to_string(),
            descriptor: "()V".to_string(),
            access: 0x0001,
            annotations: Vec::new(),
            instructions,
        }
    }

    fn unit(name: &str, path: PathBuf, methods: Vec<MethodUnit>) -> ClassUnit {
        ClassUnit {
            name: name.to_string(),
            path,
            source_file: None,
            access: 0x0021,
            major_version: 52,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods,
        }
    }

    #[test]
    fn hierarchy_orders_entry_before_callees() {
        let units = vec![
            unit(
                "app.A",
                PathBuf::from("/tmp/classes/app/A.class"),
                vec![method(
                    "run",
                    vec![invoke(0, "app.B", "step"), invoke(3, "app.C", "step")],
                )],
            ),
            unit(
                "app.B",
                PathBuf::from("/tmp/classes/app/B.class"),
                vec![method("step", vec![])],
            ),
            unit(
                "app.C",
                PathBuf::from("/tmp/classes/app/C.class"),
                vec![method("step", vec![])],
            ),
        ];
        let mut graph = MethodCallGraph::new();
        for u in &units {
            crate::edges::record_call_edges(u, &StdlibFilter::default(), &mut graph);
        }
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        let hierarchy = extractor.hierarchy(&graph, "app.A.run");
        let order: Vec<&str> = hierarchy.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["app.A.run", "app.B.step", "app.C.step"]);
        assert!(hierarchy["app.A.run"].body.contains("invokevirtual app.B.step()V"));
    }

    #[test]
    fn unknown_callees_become_external_placeholders() {
        let units = vec![unit(
            "app.A",
            PathBuf::from("/tmp/classes/app/A.class"),
            vec![method("run", vec![invoke(0, "org.lib.Client", "send")])],
        )];
        let mut graph = MethodCallGraph::new();
        crate::edges::record_call_edges(&units[0], &StdlibFilter::default(), &mut graph);
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        let hierarchy = extractor.hierarchy(&graph, "app.A.run");
        let external = &hierarchy["org.lib.Client.send"];
        assert_eq!(external.body, jcg_core::models::EXTERNAL_BODY);
        assert!(external.file_path.is_none());
    }

    #[test]
    fn hierarchy_prunes_stdlib_callees() {
        let units = vec![unit(
            "app.A",
            PathBuf::from("/tmp/classes/app/A.class"),
            vec![method("run", vec![])],
        )];
        let mut graph = MethodCallGraph::new();
        // Edge inserted directly, as if recorded with different
        // prefixes configured.
        graph.add_edge("app.A.run", "java.util.List.add");
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        let hierarchy = extractor.hierarchy(&graph, "app.A.run");
        assert!(hierarchy.contains_key("app.A.run"));
        assert!(!hierarchy.contains_key("java.util.List.add"));
    }

    #[test]
    fn hierarchy_visits_each_method_once_on_cycles() {
        let units = vec![
            unit(
                "app.A",
                PathBuf::from("/tmp/classes/app/A.class"),
                vec![method(
                    "run",
                    vec![invoke(0, "app.A", "run"), invoke(3, "app.B", "step")],
                )],
            ),
            unit(
                "app.B",
                PathBuf::from("/tmp/classes/app/B.class"),
                vec![method("step", vec![invoke(0, "app.A", "run")])],
            ),
        ];
        let mut graph = MethodCallGraph::new();
        for u in &units {
            crate::edges::record_call_edges(u, &StdlibFilter::default(), &mut graph);
        }
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        // Self-loop on the entry plus a two-method cycle back to it.
        let hierarchy = extractor.hierarchy(&graph, "app.A.run");
        let order: Vec<&str> = hierarchy.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["app.A.run", "app.B.step"]);
    }

    #[test]
    fn source_bodies_replace_disassembly_when_found() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("pom.xml"), "<project/>").unwrap();
        let java_dir = root.join("src/main/java/com/acme");
        fs::create_dir_all(&java_dir).unwrap();
        fs::write(
            java_dir.join("Greeter.java"),
            "public class Greeter {\n    public String greet(String name) {\n        return \"hi \" + name;\n    }\n}\n",
        )
        .unwrap();

        let class_path = root.join("target/classes/com/acme/Greeter.class");
        let units = vec![unit("com.acme.Greeter", class_path, vec![method("greet", vec![])])];
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        let info = extractor.get("com.acme.Greeter.greet").unwrap();
        assert_eq!(info.body, "return \"hi \" + name;");
        assert!(info.file_path.as_ref().unwrap().ends_with("Greeter.java"));
    }

    #[test]
    fn extracts_braced_bodies_with_nesting() {
        let source = r#"
public class Orders {
    public int total(List<Integer> items) throws Exception {
        int sum = 0;
        for (int item : items) {
            if (item > 0) { sum += item; }
        }
        return sum;
    }
}
"#;
        let body = extract_method_body(source, "total").unwrap();
        // Statements only: no declaration, no outer braces.
        assert!(body.starts_with("int sum = 0;"));
        assert!(body.ends_with("return sum;"));
        assert!(body.contains("sum += item;"));
        assert!(!body.contains("public int total"));
        assert!(extract_method_body(source, "missing").is_none());
    }

    #[test]
    fn controller_methods_are_sorted_and_scoped() {
        let units = vec![
            unit(
                "app.UserController",
                PathBuf::from("/tmp/classes/app/UserController.class"),
                vec![method("list", vec![]), method("create", vec![])],
            ),
            unit(
                "app.UserService",
                PathBuf::from("/tmp/classes/app/UserService.class"),
                vec![method("findAll", vec![])],
            ),
        ];
        let extractor = MethodBodyExtractor::from_units(&units, StdlibFilter::default());

        let names: Vec<&str> = extractor
            .controller_methods()
            .iter()
            .map(|info| info.full_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["app.UserController.create", "app.UserController.list"]
        );
    }
}
