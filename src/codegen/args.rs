use std::sync::Arc;

use crate::ir::{Arg, ArrayIndex, CompiledString, CompiledVar, Label, Var, VarType};

use super::buffer::CodeBuffer;
use super::error::Diagnostic;
use super::script::CodeGenerator;
use super::typetags::*;

impl CodeGenerator<'_> {
    pub(super) fn arg_size(&self, arg: &Arg) -> u32 {
        match arg {
            Arg::Eoal => 1,
            Arg::Int8(_) => 2,
            Arg::Int16(_) => 3,
            Arg::Int32(_) => 5,
            Arg::Float(value) => {
                if self.options.optimize_zero_floats && *value == 0.0 {
                    2
                } else if self.options.use_half_float {
                    3
                } else {
                    5
                }
            }
            Arg::Label(_) => 5,
            Arg::Var(cvar) => match &cvar.index {
                None | Some(ArrayIndex::Constant(_)) => 3,
                Some(ArrayIndex::Var(_)) => 7,
            },
            Arg::String(string) => self.string_size(string),
        }
    }

    pub(super) fn string_size(&self, string: &CompiledString) -> u32 {
        match string {
            CompiledString::TextLabel8(_) => {
                if self.options.has_text_label_prefix {
                    1 + 8
                } else {
                    8
                }
            }
            CompiledString::TextLabel16(_) => 1 + 16,
            CompiledString::StringVar(s) => 1 + 1 + s.len() as u32,
            CompiledString::String128(_) => 128,
        }
    }

    pub(super) fn emit_arg(&self, arg: &Arg, buffer: &mut CodeBuffer) {
        match arg {
            Arg::Eoal => buffer.emplace_u8(TYPE_EOAL),
            Arg::Int8(value) => {
                buffer.emplace_u8(TYPE_INT8);
                buffer.emplace_i8(*value);
            }
            Arg::Int16(value) => {
                buffer.emplace_u8(TYPE_INT16);
                buffer.emplace_i16(*value);
            }
            Arg::Int32(value) => {
                buffer.emplace_u8(TYPE_INT32);
                buffer.emplace_i32(*value);
            }
            Arg::Float(value) => self.emit_float(*value, buffer),
            Arg::Label(label) => self.emit_label_ref(label, buffer),
            Arg::Var(cvar) => self.emit_var_ref(cvar, buffer),
            Arg::String(string) => self.emit_string(string, buffer),
        }
    }

    fn emit_float(&self, value: f32, buffer: &mut CodeBuffer) {
        if self.options.optimize_zero_floats && value == 0.0 {
            buffer.emplace_u8(TYPE_INT8);
            buffer.emplace_i8(0);
        } else if self.options.use_half_float {
            buffer.emplace_u8(TYPE_FLOAT);
            buffer.emplace_i16((value * 16.0) as i16);
        } else {
            buffer.emplace_u8(TYPE_FLOAT);
            buffer.emplace_u32(value.to_bits());
        }
    }

    fn emit_label_ref(&self, label: &Label, buffer: &mut CodeBuffer) {
        buffer.emplace_u8(TYPE_INT32);

        if self.options.use_local_offsets {
            let absolute = label
                .offset()
                .expect("label offset unresolved, run size resolution first");
            self.emit_negated_offset(absolute, buffer);
        } else if label.script().uses_local_offsets() {
            // the semantic pass guarantees mission and streamed labels are
            // only referenced from their own script
            assert!(
                Arc::ptr_eq(label.script(), &self.script),
                "mission label referenced from another script"
            );
            let local = label
                .local_offset()
                .expect("label offset unresolved, run size resolution first");
            self.emit_negated_offset(local, buffer);
        } else {
            let absolute = label
                .offset()
                .expect("label offset unresolved, run size resolution first");
            buffer.emplace_i32(absolute as i32);
        }
    }

    fn emit_negated_offset(&self, offset: u32, buffer: &mut CodeBuffer) {
        if offset == 0 {
            self.diagnostics.report(Diagnostic::ZeroOffsetReference {
                script: self.script.path.display().to_string(),
            });
        }
        buffer.emplace_i32(-(offset as i32));
    }

    fn emit_var_ref(&self, cvar: &CompiledVar, buffer: &mut CodeBuffer) {
        let var = &cvar.var;

        match &cvar.index {
            None => {
                buffer.emplace_u8(scalar_tag(var.var_type, var.global));
                buffer.emplace_u16(var_field(slot(var) as i64));
            }
            Some(ArrayIndex::Constant(index)) => {
                // constant subscripts fold into the base slot, globals are
                // byte addressed
                let element = if var.global { 4 } else { 1 };
                buffer.emplace_u8(scalar_tag(var.var_type, var.global));
                buffer.emplace_u16(var_field(slot(var) as i64 + *index as i64 * element));
            }
            Some(ArrayIndex::Var(subscript)) => {
                let count = var
                    .count
                    .expect("subscripted access into a variable with no element count");

                buffer.emplace_u8(array_tag(var.var_type, var.global));
                buffer.emplace_u16(var_field(slot(var) as i64));
                buffer.emplace_u16(var_field(slot(subscript) as i64));
                buffer.emplace_u8(count as u8);
                buffer.emplace_u8((var.var_type as u8 & 0x7F) | ((subscript.global as u8) << 7));
            }
        }
    }

    pub(super) fn emit_string(&self, string: &CompiledString, buffer: &mut CodeBuffer) {
        match string {
            CompiledString::TextLabel8(s) => {
                assert!(s.len() <= 8, "text label over 8 characters");
                if self.options.has_text_label_prefix {
                    buffer.emplace_u8(TYPE_TEXT_LABEL);
                }
                buffer.emplace_chars(8, s.as_bytes());
            }
            CompiledString::TextLabel16(s) => {
                assert!(s.len() <= 16, "long text label over 16 characters");
                buffer.emplace_u8(TYPE_TEXT_LABEL16);
                buffer.emplace_chars(16, s.as_bytes());
            }
            CompiledString::StringVar(s) => {
                assert!(s.len() <= 127, "string literal over 127 characters");
                buffer.emplace_u8(TYPE_STRING_VAR);
                buffer.emplace_u8(s.len() as u8);
                buffer.emplace_bytes(s.as_bytes());
            }
            CompiledString::String128(s) => buffer.emplace_chars(128, s.as_bytes()),
        }
    }
}

fn slot(var: &Var) -> u32 {
    if var.global {
        var.offset()
    } else {
        var.index
    }
}

fn var_field(value: i64) -> u16 {
    u16::try_from(value)
        .unwrap_or_else(|_| panic!("variable field {value} does not fit in 16 bits"))
}

fn scalar_tag(var_type: VarType, global: bool) -> u8 {
    match var_type {
        VarType::Int | VarType::Float => {
            if global {
                TYPE_GLOBAL_VAR
            } else {
                TYPE_LOCAL_VAR
            }
        }
        VarType::TextLabel => {
            if global {
                TYPE_GLOBAL_TEXT_VAR
            } else {
                TYPE_LOCAL_TEXT_VAR
            }
        }
        VarType::TextLabel16 => {
            if global {
                TYPE_GLOBAL_TEXT16_VAR
            } else {
                TYPE_LOCAL_TEXT16_VAR
            }
        }
    }
}

fn array_tag(var_type: VarType, global: bool) -> u8 {
    match var_type {
        VarType::Int | VarType::Float => {
            if global {
                TYPE_GLOBAL_ARRAY
            } else {
                TYPE_LOCAL_ARRAY
            }
        }
        VarType::TextLabel => {
            if global {
                TYPE_GLOBAL_TEXT_ARRAY
            } else {
                TYPE_LOCAL_TEXT_ARRAY
            }
        }
        VarType::TextLabel16 => {
            if global {
                TYPE_GLOBAL_TEXT16_ARRAY
            } else {
                TYPE_LOCAL_TEXT16_ARRAY
            }
        }
    }
}
