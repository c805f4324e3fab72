use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::attributes::{parse_annotations, AnnotationInfo};
use crate::constant_pool::ConstantPool;
use crate::error::ParseError;
use crate::instructions::{decode_code, Instruction};
use crate::reader::Reader;

const MAGIC: u32 = 0xCAFE_BABE;
const ACC_INTERFACE: u16 = 0x0200;

/// A parsed class file: identity, declared interfaces, annotations and
/// method bodies, everything the call-graph stages need.
#[derive(Debug, Clone)]
pub struct ClassUnit {
    /// Fully qualified, dotted class name.
    pub name: String,
    /// Path of the `.class` file this unit was read from.
    pub path: PathBuf,
    /// Value of the SourceFile attribute, when present.
    pub source_file: Option<String>,
    pub access: u16,
    pub major_version: u16,
    /// Dotted names of directly implemented interfaces.
    pub interfaces: Vec<String>,
    pub annotations: Vec<AnnotationInfo>,
    pub methods: Vec<MethodUnit>,
}

impl ClassUnit {
    pub fn is_interface(&self) -> bool {
        self.access & ACC_INTERFACE != 0
    }

    /// Renders a method as javap-style disassembly text.
    pub fn disassemble(&self, method: &MethodUnit) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// access flags 0x{:X}", method.access);
        let _ = writeln!(out, "{}.{}{}", self.name, method.name, method.descriptor);
        for instruction in &method.instructions {
            let _ = writeln!(out, "{:5}: {}", instruction.offset, instruction.op);
        }
        out
    }
}

/// A single method with its decoded instruction stream.
#[derive(Debug, Clone)]
pub struct MethodUnit {
    pub name: String,
    pub descriptor: String,
    pub access: u16,
    pub annotations: Vec<AnnotationInfo>,
    pub instructions: Vec<Instruction>,
}

/// Parses raw class file bytes into a [`ClassUnit`].
pub fn parse_class(data: &[u8], path: &Path) -> Result<ClassUnit, ParseError> {
    let mut reader = Reader::new(data);
    let magic = reader.read_u4()?;
    if magic != MAGIC {
        return Err(ParseError::InvalidMagic(magic));
    }
    let _minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let access = reader.read_u2()?;
    let name = pool.class_name(reader.read_u2()?)?;
    let _super_class = reader.read_u2()?;

    let interface_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(reader.read_u2()?)?);
    }

    skip_fields(&mut reader)?;

    let method_count = reader.read_u2()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        methods.push(parse_method(&mut reader, &pool)?);
    }

    let mut source_file = None;
    let mut annotations = Vec::new();
    let attribute_count = reader.read_u2()?;
    for _ in 0..attribute_count {
        let attr_name = pool.utf8(reader.read_u2()?)?.to_string();
        let length = reader.read_u4()? as usize;
        let body = reader.read_bytes(length)?;
        let mut body_reader = Reader::new(body);
        match attr_name.as_str() {
            "SourceFile" => {
                source_file = Some(pool.utf8(body_reader.read_u2()?)?.to_string());
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                annotations.extend(parse_annotations(&mut body_reader, &pool)?);
            }
            _ => {}
        }
    }

    Ok(ClassUnit {
        name,
        path: path.to_path_buf(),
        source_file,
        access,
        major_version,
        interfaces,
        annotations,
        methods,
    })
}

fn parse_method(reader: &mut Reader<'_>, pool: &ConstantPool) -> Result<MethodUnit, ParseError> {
    let access = reader.read_u2()?;
    let name = pool.utf8(reader.read_u2()?)?.to_string();
    let descriptor = pool.utf8(reader.read_u2()?)?.to_string();

    let mut annotations = Vec::new();
    let mut instructions = Vec::new();
    let attribute_count = reader.read_u2()?;
    for _ in 0..attribute_count {
        let attr_name = pool.utf8(reader.read_u2()?)?.to_string();
        let length = reader.read_u4()? as usize;
        let body = reader.read_bytes(length)?;
        let mut body_reader = Reader::new(body);
        match attr_name.as_str() {
            "Code" => instructions = parse_code(&mut body_reader, pool)?,
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                annotations.extend(parse_annotations(&mut body_reader, pool)?);
            }
            _ => {}
        }
    }

    Ok(MethodUnit {
        name,
        descriptor,
        access,
        annotations,
        instructions,
    })
}

fn parse_code(reader: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<Instruction>, ParseError> {
    let _max_stack = reader.read_u2()?;
    let _max_locals = reader.read_u2()?;
    let code_length = reader.read_u4()? as usize;
    let code = reader.read_bytes(code_length)?;
    decode_code(code, pool)
}

fn skip_fields(reader: &mut Reader<'_>) -> Result<(), ParseError> {
    let field_count = reader.read_u2()?;
    for _ in 0..field_count {
        reader.skip(6)?; // access, name index, descriptor index
        skip_attributes(reader)?;
    }
    Ok(())
}

fn skip_attributes(reader: &mut Reader<'_>) -> Result<(), ParseError> {
    let count = reader.read_u2()?;
    for _ in 0..count {
        reader.skip(2)?; // name index
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}
