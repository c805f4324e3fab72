pub mod graph;
pub mod interfaces;

pub use graph::*;
pub use interfaces::*;
