use jcg_classfile::{ClassUnit, Op};
use jcg_core::call_graph::MethodCallGraph;
use jcg_core::models::method_id;
use jcg_core::stdlib::StdlibFilter;

/// Adds one edge per invoke instruction in `unit`, skipping targets
/// owned by filtered stdlib packages. `invokedynamic` call sites have
/// no static owner and contribute nothing.
pub fn record_call_edges(unit: &ClassUnit, stdlib: &StdlibFilter, graph: &mut MethodCallGraph) {
    for method in &unit.methods {
        let caller = method_id(&unit.name, &method.name);
        for instruction in &method.instructions {
            if let Op::Invoke { owner, name, .. } = &instruction.op {
                if stdlib.is_stdlib(owner) {
                    continue;
                }
                graph.add_edge(caller.clone(), method_id(owner, name));
            }
        }
    }
}
