use crate::constant_pool::ConstantPool;
use crate::error::ParseError;
use crate::reader::Reader;

/// A runtime annotation attached to a class or method.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInfo {
    /// Fully qualified, dotted annotation type name.
    pub type_name: String,
    /// Element name / value pairs in declaration order.
    pub values: Vec<(String, AnnotationValue)>,
}

impl AnnotationInfo {
    /// Looks up an element value by name.
    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }
}

/// Decoded annotation element value.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Enum { type_name: String, constant: String },
    Class(String),
    Nested(AnnotationInfo),
    Array(Vec<AnnotationValue>),
}

/// Parses a RuntimeVisibleAnnotations / RuntimeInvisibleAnnotations
/// attribute body.
pub(crate) fn parse_annotations(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<AnnotationInfo>, ParseError> {
    let count = reader.read_u2()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(parse_annotation(reader, pool)?);
    }
    Ok(annotations)
}

fn parse_annotation(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationInfo, ParseError> {
    let type_name = type_descriptor_to_name(pool.utf8(reader.read_u2()?)?);
    let pair_count = reader.read_u2()?;
    let mut values = Vec::with_capacity(pair_count as usize);
    for _ in 0..pair_count {
        let element = pool.utf8(reader.read_u2()?)?.to_string();
        let value = parse_element_value(reader, pool)?;
        values.push((element, value));
    }
    Ok(AnnotationInfo { type_name, values })
}

fn parse_element_value(
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationValue, ParseError> {
    let tag = reader.read_u1()?;
    let value = match tag {
        b'B' | b'C' | b'I' | b'S' | b'Z' => AnnotationValue::Int(pool.integer(reader.read_u2()?)?),
        b'J' => AnnotationValue::Long(pool.long(reader.read_u2()?)?),
        b'F' => AnnotationValue::Float(pool.float(reader.read_u2()?)?),
        b'D' => AnnotationValue::Double(pool.double(reader.read_u2()?)?),
        b's' => AnnotationValue::Str(pool.utf8(reader.read_u2()?)?.to_string()),
        b'e' => {
            let type_name = type_descriptor_to_name(pool.utf8(reader.read_u2()?)?);
            let constant = pool.utf8(reader.read_u2()?)?.to_string();
            AnnotationValue::Enum { type_name, constant }
        }
        b'c' => AnnotationValue::Class(type_descriptor_to_name(pool.utf8(reader.read_u2()?)?)),
        b'@' => AnnotationValue::Nested(parse_annotation(reader, pool)?),
        b'[' => {
            let count = reader.read_u2()?;
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(parse_element_value(reader, pool)?);
            }
            AnnotationValue::Array(entries)
        }
        _ => return Err(ParseError::UnsupportedAnnotationTag { tag }),
    };
    Ok(value)
}

/// Turns a field descriptor like `Lorg/acme/Tag;` into `org.acme.Tag`.
/// Non-reference descriptors come back dotted but otherwise untouched.
fn type_descriptor_to_name(descriptor: &str) -> String {
    let inner = descriptor
        .strip_prefix('L')
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap_or(descriptor);
    inner.replace('/', ".")
}
