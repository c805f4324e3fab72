pub mod bodies;
pub mod call_graph;
pub mod edges;
pub mod endpoints;
pub mod filter;

pub use bodies::*;
pub use call_graph::*;
pub use edges::*;
pub use endpoints::*;
pub use filter::*;
