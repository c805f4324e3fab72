use std::fmt;

use crate::constant_pool::ConstantPool;
use crate::error::ParseError;
use crate::reader::Reader;

/// Invocation instruction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

impl InvokeKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InvokeKind::Virtual => "invokevirtual",
            InvokeKind::Special => "invokespecial",
            InvokeKind::Static => "invokestatic",
            InvokeKind::Interface => "invokeinterface",
        }
    }
}

/// One decoded instruction and its offset within the method's code array.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub offset: u32,
    pub op: Op,
}

/// Instructions grouped by operand shape. Constant pool references are
/// resolved at decode time; class and owner names come back dotted.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Operand-less instruction.
    Simple { opcode: u8 },
    /// bipush / sipush immediate.
    Push { opcode: u8, value: i32 },
    /// ldc family; the operand is rendered through the constant pool.
    Ldc { opcode: u8, value: String },
    /// Local-variable slot access (loads, stores, ret).
    Local { opcode: u8, index: u16 },
    Iinc { index: u16, delta: i16 },
    /// Jumps; the target is an absolute code offset.
    Branch { opcode: u8, target: u32 },
    TableSwitch { default: u32, low: i32, high: i32, targets: Vec<u32> },
    LookupSwitch { default: u32, pairs: Vec<(i32, u32)> },
    Field { opcode: u8, owner: String, name: String, descriptor: String },
    Invoke { kind: InvokeKind, owner: String, name: String, descriptor: String },
    /// Call site behind a bootstrap method; the eventual target is not
    /// statically resolvable.
    InvokeDynamic { name: String, descriptor: String },
    /// new / anewarray / checkcast / instanceof.
    Type { opcode: u8, class_name: String },
    NewArray { atype: u8 },
    MultiANewArray { class_name: String, dims: u8 },
}

pub(crate) fn decode_code(code: &[u8], pool: &ConstantPool) -> Result<Vec<Instruction>, ParseError> {
    let mut reader = Reader::new(code);
    let mut instructions = Vec::new();
    while !reader.is_at_end() {
        let offset = reader.position() as u32;
        let opcode = reader.read_u1()?;
        let op = decode_op(opcode, offset, &mut reader, pool)?;
        instructions.push(Instruction { offset, op });
    }
    Ok(instructions)
}

fn decode_op(
    opcode: u8,
    offset: u32,
    reader: &mut Reader<'_>,
    pool: &ConstantPool,
) -> Result<Op, ParseError> {
    let op = match opcode {
        0x10 => Op::Push { opcode, value: reader.read_u1()? as i8 as i32 },
        0x11 => Op::Push { opcode, value: reader.read_u2()? as i16 as i32 },
        0x12 => {
            let index = reader.read_u1()? as u16;
            Op::Ldc { opcode, value: pool.ldc_text(index) }
        }
        0x13 | 0x14 => {
            let index = reader.read_u2()?;
            Op::Ldc { opcode, value: pool.ldc_text(index) }
        }
        0x15..=0x19 | 0x36..=0x3a | 0xa9 => Op::Local { opcode, index: reader.read_u1()? as u16 },
        0x84 => Op::Iinc {
            index: reader.read_u1()? as u16,
            delta: reader.read_u1()? as i8 as i16,
        },
        0x99..=0xa8 | 0xc6 | 0xc7 => {
            let rel = reader.read_u2()? as i16 as i32;
            Op::Branch { opcode, target: offset.wrapping_add_signed(rel) }
        }
        0xc8 | 0xc9 => {
            let rel = reader.read_u4()? as i32;
            Op::Branch { opcode, target: offset.wrapping_add_signed(rel) }
        }
        0xaa => decode_table_switch(offset, reader)?,
        0xab => decode_lookup_switch(offset, reader)?,
        0xb2..=0xb5 => {
            let member = pool.member_ref(reader.read_u2()?)?;
            Op::Field {
                opcode,
                owner: member.owner,
                name: member.name,
                descriptor: member.descriptor,
            }
        }
        0xb6..=0xb8 => {
            let member = pool.member_ref(reader.read_u2()?)?;
            let kind = match opcode {
                0xb6 => InvokeKind::Virtual,
                0xb7 => InvokeKind::Special,
                _ => InvokeKind::Static,
            };
            Op::Invoke {
                kind,
                owner: member.owner,
                name: member.name,
                descriptor: member.descriptor,
            }
        }
        0xb9 => {
            let member = pool.member_ref(reader.read_u2()?)?;
            reader.skip(2)?; // count byte plus the mandatory zero
            Op::Invoke {
                kind: InvokeKind::Interface,
                owner: member.owner,
                name: member.name,
                descriptor: member.descriptor,
            }
        }
        0xba => {
            let index = reader.read_u2()?;
            reader.skip(2)?; // two mandatory zero bytes
            let (name, descriptor) = pool.invoke_dynamic(index)?;
            Op::InvokeDynamic {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            }
        }
        0xbb | 0xbd | 0xc0 | 0xc1 => Op::Type {
            opcode,
            class_name: pool.class_name(reader.read_u2()?)?,
        },
        0xbc => Op::NewArray { atype: reader.read_u1()? },
        0xc4 => decode_wide(offset, reader)?,
        0xc5 => {
            let class_name = pool.class_name(reader.read_u2()?)?;
            Op::MultiANewArray { class_name, dims: reader.read_u1()? }
        }
        0x00..=0x0f
        | 0x1a..=0x35
        | 0x3b..=0x83
        | 0x85..=0x98
        | 0xac..=0xb1
        | 0xbe
        | 0xbf
        | 0xc2
        | 0xc3 => Op::Simple { opcode },
        _ => {
            return Err(ParseError::UnknownOpcode {
                opcode,
                offset: offset as usize,
            })
        }
    };
    Ok(op)
}

fn decode_wide(offset: u32, reader: &mut Reader<'_>) -> Result<Op, ParseError> {
    let opcode = reader.read_u1()?;
    match opcode {
        0x84 => Ok(Op::Iinc {
            index: reader.read_u2()?,
            delta: reader.read_u2()? as i16,
        }),
        0x15..=0x19 | 0x36..=0x3a | 0xa9 => Ok(Op::Local {
            opcode,
            index: reader.read_u2()?,
        }),
        _ => Err(ParseError::UnknownOpcode {
            opcode,
            offset: offset as usize,
        }),
    }
}

// Switch operands start at the next 4-byte boundary of the code array.
fn skip_switch_padding(reader: &mut Reader<'_>) -> Result<(), ParseError> {
    let misalignment = reader.position() % 4;
    if misalignment != 0 {
        reader.skip(4 - misalignment)?;
    }
    Ok(())
}

fn decode_table_switch(offset: u32, reader: &mut Reader<'_>) -> Result<Op, ParseError> {
    skip_switch_padding(reader)?;
    let default = offset.wrapping_add_signed(reader.read_u4()? as i32);
    let low = reader.read_u4()? as i32;
    let high = reader.read_u4()? as i32;
    if high < low {
        return Err(ParseError::MalformedSwitch { offset: offset as usize });
    }
    let count = (high as i64 - low as i64 + 1) as usize;
    if count > reader.remaining() / 4 {
        return Err(ParseError::UnexpectedEof { offset: reader.position() });
    }
    let mut targets = Vec::with_capacity(count);
    for _ in 0..count {
        targets.push(offset.wrapping_add_signed(reader.read_u4()? as i32));
    }
    Ok(Op::TableSwitch { default, low, high, targets })
}

fn decode_lookup_switch(offset: u32, reader: &mut Reader<'_>) -> Result<Op, ParseError> {
    skip_switch_padding(reader)?;
    let default = offset.wrapping_add_signed(reader.read_u4()? as i32);
    let npairs = reader.read_u4()? as i32;
    if npairs < 0 || npairs as usize > reader.remaining() / 8 {
        return Err(ParseError::MalformedSwitch { offset: offset as usize });
    }
    let mut pairs = Vec::with_capacity(npairs as usize);
    for _ in 0..npairs {
        let key = reader.read_u4()? as i32;
        let target = offset.wrapping_add_signed(reader.read_u4()? as i32);
        pairs.push((key, target));
    }
    Ok(Op::LookupSwitch { default, pairs })
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Simple { opcode } => f.write_str(mnemonic(*opcode)),
            Op::Push { opcode, value } => write!(f, "{} {}", mnemonic(*opcode), value),
            Op::Ldc { opcode, value } => write!(f, "{} {}", mnemonic(*opcode), value),
            Op::Local { opcode, index } => write!(f, "{} {}", mnemonic(*opcode), index),
            Op::Iinc { index, delta } => write!(f, "iinc {index} {delta}"),
            Op::Branch { opcode, target } => write!(f, "{} {}", mnemonic(*opcode), target),
            Op::TableSwitch { default, low, high, targets } => write!(
                f,
                "tableswitch low={low} high={high} default={default} targets={targets:?}"
            ),
            Op::LookupSwitch { default, pairs } => {
                write!(f, "lookupswitch default={default} pairs={pairs:?}")
            }
            Op::Field { opcode, owner, name, descriptor } => {
                write!(f, "{} {}.{} {}", mnemonic(*opcode), owner, name, descriptor)
            }
            Op::Invoke { kind, owner, name, descriptor } => {
                write!(f, "{} {}.{}{}", kind.mnemonic(), owner, name, descriptor)
            }
            Op::InvokeDynamic { name, descriptor } => {
                write!(f, "invokedynamic {name}{descriptor}")
            }
            Op::Type { opcode, class_name } => {
                write!(f, "{} {}", mnemonic(*opcode), class_name)
            }
            Op::NewArray { atype } => write!(f, "newarray {}", primitive_array_type(*atype)),
            Op::MultiANewArray { class_name, dims } => {
                write!(f, "multianewarray {class_name} {dims}")
            }
        }
    }
}

fn primitive_array_type(atype: u8) -> &'static str {
    match atype {
        4 => "boolean",
        5 => "char",
        6 => "float",
        7 => "double",
        8 => "byte",
        9 => "short",
        10 => "int",
        11 => "long",
        _ => "?",
    }
}

pub(crate) fn mnemonic(opcode: u8) -> &'static str {
    MNEMONICS[opcode as usize]
}

#[rustfmt::skip]
const MNEMONICS: [&str; 256] = [
    // 0x00
    "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3", "iconst_4",
    // 0x08
    "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2", "dconst_0", "dconst_1",
    // 0x10
    "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload", "fload",
    // 0x18
    "dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0", "lload_1",
    // 0x20
    "lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0", "dload_1",
    // 0x28
    "dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload", "laload",
    // 0x30
    "faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
    // 0x38
    "fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
    // 0x40
    "lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3", "dstore_0",
    // 0x48
    "dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2", "astore_3", "iastore",
    // 0x50
    "lastore", "fastore", "dastore", "aastore", "bastore", "castore", "sastore", "pop",
    // 0x58
    "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
    // 0x60
    "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub",
    // 0x68
    "imul", "lmul", "fmul", "dmul", "idiv", "ldiv", "fdiv", "ddiv",
    // 0x70
    "irem", "lrem", "frem", "drem", "ineg", "lneg", "fneg", "dneg",
    // 0x78
    "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land",
    // 0x80
    "ior", "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d",
    // 0x88
    "l2i", "l2f", "l2d", "f2i", "f2l", "f2d", "d2i", "d2l",
    // 0x90
    "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
    // 0x98
    "dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq",
    // 0xa0
    "if_icmpne", "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
    // 0xa8
    "jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
    // 0xb0
    "areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual", "invokespecial",
    // 0xb8
    "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray", "anewarray", "arraylength", "athrow",
    // 0xc0
    "checkcast", "instanceof", "monitorenter", "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull",
    // 0xc8
    "goto_w", "jsr_w", "breakpoint", "?", "?", "?", "?", "?",
    // 0xd0
    "?", "?", "?", "?", "?", "?", "?", "?",
    // 0xd8
    "?", "?", "?", "?", "?", "?", "?", "?",
    // 0xe0
    "?", "?", "?", "?", "?", "?", "?", "?",
    // 0xe8
    "?", "?", "?", "?", "?", "?", "?", "?",
    // 0xf0
    "?", "?", "?", "?", "?", "?", "?", "?",
    // 0xf8
    "?", "?", "?", "?", "?", "?", "impdep1", "impdep2",
];
