pub mod typetags {
    /// End of argument list for variadic commands.
    pub const TYPE_EOAL: u8 = 0x00;

    pub const TYPE_INT32: u8 = 0x01;
    pub const TYPE_GLOBAL_VAR: u8 = 0x02;
    pub const TYPE_LOCAL_VAR: u8 = 0x03;
    pub const TYPE_INT8: u8 = 0x04;
    pub const TYPE_INT16: u8 = 0x05;
    pub const TYPE_FLOAT: u8 = 0x06;

    /// Arrays subscripted by another variable. Constant subscripts fold
    /// into the scalar forms instead.
    pub const TYPE_GLOBAL_ARRAY: u8 = 0x07;
    pub const TYPE_LOCAL_ARRAY: u8 = 0x08;

    /// 8 character text label literal, only emitted on targets that expect
    /// string literals to carry a tag.
    pub const TYPE_TEXT_LABEL: u8 = 0x09;

    pub const TYPE_GLOBAL_TEXT_VAR: u8 = 0x0A;
    pub const TYPE_LOCAL_TEXT_VAR: u8 = 0x0B;
    pub const TYPE_GLOBAL_TEXT_ARRAY: u8 = 0x0C;
    pub const TYPE_LOCAL_TEXT_ARRAY: u8 = 0x0D;

    /// Length-prefixed string, at most 127 characters.
    pub const TYPE_STRING_VAR: u8 = 0x0E;
    pub const TYPE_TEXT_LABEL16: u8 = 0x0F;

    pub const TYPE_GLOBAL_TEXT16_VAR: u8 = 0x10;
    pub const TYPE_LOCAL_TEXT16_VAR: u8 = 0x11;
    pub const TYPE_GLOBAL_TEXT16_ARRAY: u8 = 0x12;
    pub const TYPE_LOCAL_TEXT16_ARRAY: u8 = 0x13;
}

mod args;
mod buffer;
mod driver;
pub mod error;
mod header;
mod script;

pub use driver::{generate_image, CompiledImage, CompiledScript};
pub use error::{Diagnostic, Diagnostics};
pub use header::{CompiledScmHeader, GameVersion};
pub use script::{CodeGenerator, ScriptCompilation};

/// Encoding options, fixed for the duration of a compilation.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodegenOptions {
    /// Re-encode `0.0` floats as a one byte integer.
    pub optimize_zero_floats: bool,
    /// Encode floats as `i16` scaled by 16.
    pub use_half_float: bool,
    /// Encode every label reference as a negated absolute offset.
    pub use_local_offsets: bool,
    /// Whether 8 character text label literals carry a type tag.
    pub has_text_label_prefix: bool,
}
