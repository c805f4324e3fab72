use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{debug, info};

use jcg_classfile::{scan_classes, ClassUnit};
use jcg_core::call_graph::{InterfaceIndex, MethodCallGraph};
use jcg_core::models::Endpoint;
use jcg_core::stdlib::StdlibFilter;

use crate::edges::record_call_edges;
use crate::endpoints::EndpointDetector;

/// Call graph builder for compiled Spring applications
pub struct SpringCallGraphBuilder {
    classes_dir: PathBuf,
    stdlib: StdlibFilter,
    verbose: bool,
}

/// Everything one pass over the class files produces.
#[derive(Debug)]
pub struct SpringAnalysis {
    pub units: Vec<ClassUnit>,
    pub graph: MethodCallGraph,
    pub interfaces: InterfaceIndex,
    pub endpoints: Vec<Endpoint>,
}

impl SpringCallGraphBuilder {
    /// Creates a builder over a directory of compiled `.class` files.
    pub fn new(classes_dir: PathBuf) -> Self {
        Self {
            classes_dir,
            stdlib: StdlibFilter::default(),
            verbose: false,
        }
    }

    pub fn with_stdlib(mut self, stdlib: StdlibFilter) -> Self {
        self.stdlib = stdlib;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Scans the class directory and builds the full analysis.
    pub fn build(self) -> Result<SpringAnalysis> {
        if !self.classes_dir.is_dir() {
            bail!(
                "Classes path is not a directory: {}",
                self.classes_dir.display()
            );
        }
        info!(dir = %self.classes_dir.display(), "Scanning compiled classes");
        let units = scan_classes(&self.classes_dir)?;
        Ok(self.build_from_units(units))
    }

    /// Builds the analysis from already-parsed units.
    pub fn build_from_units(self, units: Vec<ClassUnit>) -> SpringAnalysis {
        let mut interfaces = InterfaceIndex::new();
        for unit in &units {
            for interface in &unit.interfaces {
                interfaces.record(interface.clone(), unit.name.clone());
            }
        }

        let mut graph = MethodCallGraph::new();
        let mut detector = EndpointDetector::new();
        for unit in &units {
            if self.verbose {
                debug!(class = %unit.name, methods = unit.methods.len(), "Collecting call edges");
            }
            record_call_edges(unit, &self.stdlib, &mut graph);
            detector.scan_unit(unit);
        }

        // Interface targets can only be resolved once every class has
        // contributed its implements list.
        interfaces.resolve(&mut graph);

        let endpoints = detector.into_endpoints();
        info!(
            classes = units.len(),
            callers = graph.len(),
            endpoints = endpoints.len(),
            "Call graph analysis complete"
        );
        SpringAnalysis {
            units,
            graph,
            interfaces,
            endpoints,
        }
    }
}
