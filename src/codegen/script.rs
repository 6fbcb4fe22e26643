use crate::ir::{CompiledData, SharedScript};

use super::buffer::CodeBuffer;
use super::error::Diagnostics;
use super::CodegenOptions;

/// Output of the semantic pass for a single script: the script handle and
/// its ordered pseudo-instruction sequence.
#[derive(Debug)]
pub struct ScriptCompilation {
    pub script: SharedScript,
    pub compiled: Vec<CompiledData>,
}

/// Turns one script's pseudo-instructions into bytecode. Generation is
/// two-phased: `resolve_sizes` anchors every label and finds the script
/// size, `generate` encodes into a buffer of exactly that size.
pub struct CodeGenerator<'a> {
    pub(super) script: SharedScript,
    compiled: Vec<CompiledData>,
    pub(super) options: CodegenOptions,
    pub(super) diagnostics: &'a Diagnostics,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        compilation: ScriptCompilation,
        options: CodegenOptions,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            script: compilation.script,
            compiled: compilation.compiled,
            options,
            diagnostics,
        }
    }

    pub fn script(&self) -> &SharedScript {
        &self.script
    }

    /// First pass. Walks the pseudo-instructions with a rolling offset,
    /// anchoring label definitions as it goes, and caches the resulting
    /// size on the script.
    ///
    /// Writes into label records that may be shared with other scripts'
    /// argument lists, so concurrent resolution must not share labels.
    pub fn resolve_sizes(&self) -> u32 {
        let mut offset = 0u32;

        for node in &self.compiled {
            if let CompiledData::Label(label) = node {
                label.define(offset);
            } else {
                offset += self.data_size(node);
            }
        }

        self.script.set_size(offset);
        offset
    }

    /// Second pass. Requires `resolve_sizes` to have run on every script
    /// whose labels this one references.
    pub fn generate(self) -> Vec<u8> {
        let size = self
            .script
            .size()
            .expect("script size unresolved, run size resolution first");

        let mut buffer = CodeBuffer::with_size(size as usize);

        for node in &self.compiled {
            self.emit_data(node, &mut buffer);
        }

        buffer.finish()
    }

    fn data_size(&self, node: &CompiledData) -> u32 {
        match node {
            CompiledData::Label(_) => 0,
            CompiledData::Command(command) => {
                2 + command.args.iter().map(|arg| self.arg_size(arg)).sum::<u32>()
            }
            CompiledData::Hex(bytes) => bytes.len() as u32,
            CompiledData::String(string) => self.string_size(string),
        }
    }

    fn emit_data(&self, node: &CompiledData, buffer: &mut CodeBuffer) {
        match node {
            // label definitions have no physical representation
            CompiledData::Label(_) => {}
            CompiledData::Command(command) => {
                buffer.emplace_u16(command.id);
                for arg in &command.args {
                    self.emit_arg(arg, buffer);
                }
            }
            CompiledData::Hex(bytes) => buffer.emplace_bytes(bytes),
            CompiledData::String(string) => self.emit_string(string, buffer),
        }
    }
}
