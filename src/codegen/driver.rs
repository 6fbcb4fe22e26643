use rayon::prelude::*;

use crate::ir::{ScriptType, SharedScript};

use super::error::Diagnostics;
use super::header::CompiledScmHeader;
use super::script::{CodeGenerator, ScriptCompilation};
use super::CodegenOptions;

/// A script's emitted bytecode. The script handle carries the absolute
/// offset assigned during layout.
#[derive(Debug)]
pub struct CompiledScript {
    pub script: SharedScript,
    pub bytecode: Vec<u8>,
}

/// The finished image: the header and every script's bytecode, in
/// declaration order.
#[derive(Debug)]
pub struct CompiledImage {
    pub header: Vec<u8>,
    pub scripts: Vec<CompiledScript>,
}

/// Runs the whole pipeline: size resolution, image layout, emit and the
/// header. Scripts keep their declaration order throughout.
pub fn generate_image(
    header: &CompiledScmHeader,
    compilations: Vec<ScriptCompilation>,
    options: CodegenOptions,
    diagnostics: &Diagnostics,
) -> CompiledImage {
    let generators: Vec<CodeGenerator> = compilations
        .into_iter()
        .map(|compilation| CodeGenerator::new(compilation, options, diagnostics))
        .collect();

    // label definitions write into shared records, keep this pass
    // sequential
    let sizes: Vec<u32> = generators
        .iter()
        .map(|generator| {
            let size = generator.resolve_sizes();
            log::debug!(
                "{}: {} bytes of bytecode",
                generator.script().path.display(),
                size
            );
            size
        })
        .collect();

    // the main script starts right after the header, extensions follow
    let mut offset = header.compiled_size();
    for (generator, &size) in generators.iter().zip(&sizes) {
        let script = generator.script();
        if matches!(
            script.script_type,
            ScriptType::Main | ScriptType::MainExtension
        ) {
            script.set_offset(offset);
            offset += size;
        }
    }

    // missions append to the main image, forming the multifile
    for (generator, &size) in generators.iter().zip(&sizes) {
        let script = generator.script();
        if script.script_type == ScriptType::Mission {
            script.set_offset(offset);
            offset += size;
        }
    }

    // streamed scripts travel as their own files
    for generator in &generators {
        let script = generator.script();
        if script.script_type == ScriptType::StreamedScript {
            script.set_offset(0);
        }
    }

    // emit reads only resolved data, so scripts can go wide
    let scripts: Vec<CompiledScript> = generators
        .into_par_iter()
        .map(|generator| {
            let script = generator.script().clone();
            let bytecode = generator.generate();
            CompiledScript { script, bytecode }
        })
        .collect();

    let header_bytes = header.generate();

    log::info!(
        "image generated: {} header bytes, {} scripts, {} multifile bytes",
        header_bytes.len(),
        scripts.len(),
        offset
    );

    CompiledImage {
        header: header_bytes,
        scripts,
    }
}
