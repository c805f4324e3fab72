pub mod endpoint;
pub mod method;

pub use endpoint::*;
pub use method::*;
