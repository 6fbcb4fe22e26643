use std::borrow::Cow;
use std::ffi::OsStr;

use crate::ir::{ScriptType, SharedScript};

use super::buffer::CodeBuffer;

const OPCODE_GOTO: u16 = 0x0002;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameVersion {
    Liberty,
    Miami,
    SanAndreas,
}

/// Everything the main image header describes: the global variable space,
/// the model table and the mission and streamed script directories.
#[derive(Debug)]
pub struct CompiledScmHeader {
    pub version: GameVersion,
    pub size_global_vars: u32,
    pub models: Vec<String>,
    pub scripts: Vec<SharedScript>,
    pub num_missions: u16,
    pub num_streamed: u32,
    /// Externals count stored in the trailing segment. The stock game
    /// images carry 62.
    pub allocated_externals: u8,
}

impl CompiledScmHeader {
    pub fn new(
        version: GameVersion,
        size_global_vars: u32,
        models: Vec<String>,
        scripts: Vec<SharedScript>,
    ) -> Self {
        let num_missions = scripts
            .iter()
            .filter(|s| s.script_type == ScriptType::Mission)
            .count() as u16;
        let num_streamed = scripts
            .iter()
            .filter(|s| s.script_type == ScriptType::StreamedScript)
            .count() as u32;

        Self {
            version,
            size_global_vars,
            models,
            scripts,
            num_missions,
            num_streamed,
            allocated_externals: 62,
        }
    }

    /// Closed-form size of the generated header. `generate` fills a buffer
    /// of exactly this many bytes.
    pub fn compiled_size(&self) -> u32 {
        assert!(
            self.size_global_vars >= 8,
            "global variable space smaller than its goto prelude"
        );

        let globals = self.size_global_vars - 8;
        let base = 8
            + globals
            + 8
            + 4
            + 24 * (1 + self.models.len() as u32)
            + 8
            + 4
            + 4
            + 2
            + 2
            + 4 * u32::from(self.num_missions);

        match self.version {
            GameVersion::Liberty | GameVersion::Miami => base,
            GameVersion::SanAndreas => {
                base + 4
                    + 8
                    + 4
                    + 4
                    + 28 * (1 + self.num_streamed)
                    + 8
                    + 4
                    + 8
                    + 4
                    + 1
                    + 1
                    + 2
            }
        }
    }

    /// Emits the header segments. Script sizes must be resolved and
    /// missions laid out before this runs.
    pub fn generate(&self) -> Vec<u8> {
        let head_size = self.compiled_size();
        let mut buffer = CodeBuffer::with_size(head_size as usize);
        let mut segment_ids = SegmentIds::new(self.version);

        let mut main_size = head_size;
        let mut multifile_size = head_size;
        let mut largest_mission_size = 0u32;
        let mut largest_streamed_size = 0u32;
        let mut missions = Vec::new();
        let mut streamed = Vec::new();

        for script in &self.scripts {
            let size = script
                .size()
                .expect("script size unresolved, run size resolution first");

            match script.script_type {
                ScriptType::Mission => {
                    missions.push(script);
                    multifile_size += size;
                    largest_mission_size = largest_mission_size.max(size);
                }
                ScriptType::StreamedScript => {
                    streamed.push((script, size));
                    largest_streamed_size = largest_streamed_size.max(size);
                }
                _ => {
                    main_size += size;
                    multifile_size += size;
                }
            }
        }

        let target_id = match self.version {
            // the earliest images predate target id bytes
            GameVersion::Liberty => 0,
            GameVersion::Miami => b'm',
            GameVersion::SanAndreas => b's',
        };

        // global variable space
        let globals = self.size_global_vars - 8;
        goto_over(&mut buffer, globals);
        buffer.emplace_u8(target_id);
        buffer.emplace_fill(globals as usize, 0);

        // model table, slot 0 stays blank
        goto_over(&mut buffer, 4 + 24 * (1 + self.models.len() as u32));
        buffer.emplace_u8(segment_ids.next());
        buffer.emplace_u32(1 + self.models.len() as u32);
        buffer.emplace_chars(24, b"");
        for model in &self.models {
            buffer.emplace_chars(24, model.as_bytes());
        }

        // image accounting and the mission offset table
        let san_andreas = self.version == GameVersion::SanAndreas;
        let info_bytes =
            4 + 4 + 2 + 2 + 4 * missions.len() as u32 + if san_andreas { 4 } else { 0 };
        goto_over(&mut buffer, info_bytes);
        buffer.emplace_u8(segment_ids.next());
        buffer.emplace_u32(main_size);
        buffer.emplace_u32(largest_mission_size);
        buffer.emplace_u16(missions.len() as u16);
        buffer.emplace_u16(0); // exclusive missions, unused
        if san_andreas {
            buffer.emplace_u32(0); // highest mission local count, unused
        }
        for mission in &missions {
            let offset = mission
                .offset()
                .expect("mission laid out before header generation");
            buffer.emplace_i32(offset as i32);
        }

        if san_andreas {
            // streamed script directory; offsets are virtual, counted from
            // the end of the multifile image
            let mut virtual_offset = multifile_size;
            goto_over(&mut buffer, 4 + 4 + 28 * (1 + streamed.len() as u32));
            buffer.emplace_u8(segment_ids.next());
            buffer.emplace_u32(largest_streamed_size);
            buffer.emplace_u32(1 + streamed.len() as u32);

            for (script, size) in &streamed {
                let stem = script
                    .path
                    .file_stem()
                    .map(OsStr::to_string_lossy)
                    .unwrap_or(Cow::Borrowed(""));
                // byte-wise uppercasing, the directory is not UTF-8 aware
                let name: Vec<u8> = stem.bytes().map(|b| b.to_ascii_uppercase()).collect();

                buffer.emplace_chars(20, &name);
                buffer.emplace_u32(virtual_offset);
                buffer.emplace_u32(*size);
                virtual_offset += size;
            }

            // sentinel entry closing the directory
            buffer.emplace_chars(20, b"AAA");
            buffer.emplace_u32(0);
            buffer.emplace_u32(8);

            // unknown segment
            goto_over(&mut buffer, 4);
            buffer.emplace_u8(segment_ids.next());
            buffer.emplace_u32(0);

            // unknown segment 2
            goto_over(&mut buffer, 4 + 1 + 1 + 2);
            buffer.emplace_u8(segment_ids.next());
            buffer.emplace_u32(globals);
            buffer.emplace_u8(self.allocated_externals);
            buffer.emplace_u8(2);
            buffer.emplace_u16(0);
        }

        buffer.finish()
    }
}

/// Opens a segment with a goto past its data, so the engine can run the
/// header from the top without understanding its layout. The skipped span
/// is the 7 byte goto, the segment id byte and `data_bytes` of payload.
fn goto_over(buffer: &mut CodeBuffer, data_bytes: u32) {
    let target = 8 + data_bytes + buffer.current_offset() as u32;
    buffer.emplace_u16(OPCODE_GOTO);
    buffer.emplace_u8(1);
    buffer.emplace_i32(target as i32);
}

/// Segment ids count up on San Andreas and stay zero everywhere else.
struct SegmentIds {
    current: u8,
    counting: bool,
}

impl SegmentIds {
    fn new(version: GameVersion) -> Self {
        Self {
            current: 0,
            counting: version == GameVersion::SanAndreas,
        }
    }

    fn next(&mut self) -> u8 {
        if !self.counting {
            return 0;
        }
        let id = self.current;
        self.current += 1;
        id
    }
}
