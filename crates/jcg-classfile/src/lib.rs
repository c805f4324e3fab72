mod attributes;
mod class_unit;
mod constant_pool;
mod error;
mod instructions;
mod reader;
mod scanner;

pub use attributes::{AnnotationInfo, AnnotationValue};
pub use class_unit::{parse_class, ClassUnit, MethodUnit};
pub use error::ParseError;
pub use instructions::{Instruction, InvokeKind, Op};
pub use scanner::{load_unit, scan_classes};
