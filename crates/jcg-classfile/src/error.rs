use thiserror::Error;

/// Errors raised while decoding a single class file. Any of these condemns
/// the whole file; callers skip the unit and keep going.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of class file at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("bad magic number 0x{0:08X}")]
    InvalidMagic(u32),

    #[error("unsupported constant pool tag {tag} at index {index}")]
    UnsupportedConstantTag { tag: u8, index: u16 },

    #[error("constant pool index {0} is out of range or has the wrong type")]
    InvalidConstantIndex(u16),

    #[error("unsupported annotation element tag 0x{tag:02x}")]
    UnsupportedAnnotationTag { tag: u8 },

    #[error("unknown opcode 0x{opcode:02X} at code offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("malformed switch instruction at code offset {offset}")]
    MalformedSwitch { offset: usize },

    #[error("constant pool entry is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
