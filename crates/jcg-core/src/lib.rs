pub mod call_graph;
pub mod logging;
pub mod models;
pub mod stdlib;

pub use logging::{init, init_default, init_from_args};
