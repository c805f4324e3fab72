use crate::error::ParseError;
use crate::reader::Reader;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELD_REF: u8 = 9;
const TAG_METHOD_REF: u8 = 10;
const TAG_INTERFACE_METHOD_REF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// One constant pool entry. Entries whose payload the analyzer never
/// inspects are parsed for their length only.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic { name_and_type_index: u16 },
    Module,
    Package,
    /// Second slot of a Long or Double entry.
    Unusable,
}

/// A resolved field or method reference. The owner is dotted.
#[derive(Debug, Clone)]
pub(crate) struct MemberRef {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) descriptor: String,
}

#[derive(Debug)]
pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self, ParseError> {
        let count = reader.read_u2()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable); // index 0 is reserved by the format
        let mut index: u16 = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    Constant::Utf8(String::from_utf8(bytes.to_vec())?)
                }
                TAG_INTEGER => Constant::Integer(reader.read_u4()? as i32),
                TAG_FLOAT => Constant::Float(f32::from_bits(reader.read_u4()?)),
                TAG_LONG => {
                    let high = reader.read_u4()? as u64;
                    let low = reader.read_u4()? as u64;
                    Constant::Long(((high << 32) | low) as i64)
                }
                TAG_DOUBLE => {
                    let high = reader.read_u4()? as u64;
                    let low = reader.read_u4()? as u64;
                    Constant::Double(f64::from_bits((high << 32) | low))
                }
                TAG_CLASS => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                TAG_STRING => Constant::String {
                    string_index: reader.read_u2()?,
                },
                TAG_FIELD_REF => Constant::FieldRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_METHOD_REF => Constant::MethodRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_INTERFACE_METHOD_REF => Constant::InterfaceMethodRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                TAG_NAME_AND_TYPE => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Constant::MethodHandle
                }
                TAG_METHOD_TYPE => {
                    reader.skip(2)?;
                    Constant::MethodType
                }
                TAG_DYNAMIC => {
                    reader.skip(4)?;
                    Constant::Dynamic
                }
                TAG_INVOKE_DYNAMIC => {
                    reader.skip(2)?; // bootstrap method attribute index
                    Constant::InvokeDynamic {
                        name_and_type_index: reader.read_u2()?,
                    }
                }
                TAG_MODULE => {
                    reader.skip(2)?;
                    Constant::Module
                }
                TAG_PACKAGE => {
                    reader.skip(2)?;
                    Constant::Package
                }
                _ => return Err(ParseError::UnsupportedConstantTag { tag, index }),
            };
            let double_width = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            if double_width {
                entries.push(Constant::Unusable);
                index += 2;
            } else {
                index += 1;
            }
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ParseError::InvalidConstantIndex(index))
    }

    pub(crate) fn utf8(&self, index: u16) -> Result<&str, ParseError> {
        match self.get(index)? {
            Constant::Utf8(text) => Ok(text),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    /// Dotted binary name of a Class entry.
    pub(crate) fn class_name(&self, index: u16) -> Result<String, ParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => Ok(self.utf8(*name_index)?.replace('/', ".")),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    pub(crate) fn name_and_type(&self, index: u16) -> Result<(&str, &str), ParseError> {
        match self.get(index)? {
            Constant::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    /// Owner, name and descriptor of a field or method reference.
    pub(crate) fn member_ref(&self, index: u16) -> Result<MemberRef, ParseError> {
        let (class_index, name_and_type_index) = match self.get(index)? {
            Constant::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Constant::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Constant::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => return Err(ParseError::InvalidConstantIndex(index)),
        };
        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;
        Ok(MemberRef {
            owner,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// Name and descriptor behind an invokedynamic call site.
    pub(crate) fn invoke_dynamic(&self, index: u16) -> Result<(&str, &str), ParseError> {
        match self.get(index)? {
            Constant::InvokeDynamic {
                name_and_type_index,
            } => self.name_and_type(*name_and_type_index),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    pub(crate) fn integer(&self, index: u16) -> Result<i32, ParseError> {
        match self.get(index)? {
            Constant::Integer(value) => Ok(*value),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    pub(crate) fn long(&self, index: u16) -> Result<i64, ParseError> {
        match self.get(index)? {
            Constant::Long(value) => Ok(*value),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    pub(crate) fn float(&self, index: u16) -> Result<f32, ParseError> {
        match self.get(index)? {
            Constant::Float(value) => Ok(*value),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    pub(crate) fn double(&self, index: u16) -> Result<f64, ParseError> {
        match self.get(index)? {
            Constant::Double(value) => Ok(*value),
            _ => Err(ParseError::InvalidConstantIndex(index)),
        }
    }

    /// Display text for an ldc-family operand. Entries that cannot be
    /// rendered fall back to the raw index, never an error.
    pub(crate) fn ldc_text(&self, index: u16) -> String {
        match self.entries.get(index as usize) {
            Some(Constant::String { string_index }) => match self.utf8(*string_index) {
                Ok(text) => format!("\"{text}\""),
                Err(_) => format!("#{index}"),
            },
            Some(Constant::Integer(value)) => value.to_string(),
            Some(Constant::Float(value)) => format!("{value}f"),
            Some(Constant::Long(value)) => format!("{value}L"),
            Some(Constant::Double(value)) => format!("{value}d"),
            Some(Constant::Class { name_index }) => match self.utf8(*name_index) {
                Ok(name) => name.replace('/', "."),
                Err(_) => format!("#{index}"),
            },
            _ => format!("#{index}"),
        }
    }
}
