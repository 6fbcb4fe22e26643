use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

pub type SharedScript = Arc<Script>;
pub type SharedLabel = Arc<Label>;
pub type SharedVar = Arc<Var>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScriptType {
    Main,
    MainExtension,
    Mission,
    StreamedScript,
}

/// A compilation unit. The absolute offset and the total size start out
/// unset and are filled in by image layout and size resolution.
#[derive(Debug)]
pub struct Script {
    pub path: PathBuf,
    pub script_type: ScriptType,
    offset: OnceLock<u32>,
    size: OnceLock<u32>,
}

impl Script {
    pub fn new(path: impl Into<PathBuf>, script_type: ScriptType) -> SharedScript {
        Arc::new(Self {
            path: path.into(),
            script_type,
            offset: OnceLock::new(),
            size: OnceLock::new(),
        })
    }

    /// Byte offset of this script in the composed image.
    pub fn offset(&self) -> Option<u32> {
        self.offset.get().copied()
    }

    pub fn set_offset(&self, offset: u32) {
        let stored = *self.offset.get_or_init(|| offset);
        assert_eq!(
            stored,
            offset,
            "script {} laid out twice at different offsets",
            self.path.display()
        );
    }

    /// Total bytecode size, known after size resolution.
    pub fn size(&self) -> Option<u32> {
        self.size.get().copied()
    }

    pub fn set_size(&self, size: u32) {
        let stored = *self.size.get_or_init(|| size);
        assert_eq!(
            stored,
            size,
            "script {} resolved twice to different sizes",
            self.path.display()
        );
    }

    /// Missions and streamed scripts encode label references relative to
    /// their own start.
    pub fn uses_local_offsets(&self) -> bool {
        matches!(
            self.script_type,
            ScriptType::Mission | ScriptType::StreamedScript
        )
    }
}

/// A named position inside a script. The local offset is found during
/// size resolution; until then the label is unresolved.
#[derive(Debug)]
pub struct Label {
    script: SharedScript,
    local_offset: OnceLock<u32>,
}

impl Label {
    pub fn new(script: SharedScript) -> SharedLabel {
        Arc::new(Self {
            script,
            local_offset: OnceLock::new(),
        })
    }

    pub fn script(&self) -> &SharedScript {
        &self.script
    }

    /// Byte offset from the start of the owning script.
    pub fn local_offset(&self) -> Option<u32> {
        self.local_offset.get().copied()
    }

    /// Anchors the label. Defining the same label at two different offsets
    /// is a programming error.
    pub fn define(&self, local_offset: u32) {
        let stored = *self.local_offset.get_or_init(|| local_offset);
        assert_eq!(
            stored, local_offset,
            "label defined twice at different offsets"
        );
    }

    /// Byte offset from the start of the composed image.
    pub fn offset(&self) -> Option<u32> {
        Some(self.script.offset()? + self.local_offset()?)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum VarType {
    Int = 0,
    Float = 1,
    TextLabel = 2,
    TextLabel16 = 3,
}

/// A global or local storage cell, possibly an array.
#[derive(Debug)]
pub struct Var {
    pub global: bool,
    pub var_type: VarType,
    /// Slot number. Globals are addressed in bytes, four per slot.
    pub index: u32,
    /// Element count for arrays, `None` for scalars.
    pub count: Option<u32>,
}

impl Var {
    pub fn new(global: bool, var_type: VarType, index: u32, count: Option<u32>) -> SharedVar {
        Arc::new(Self {
            global,
            var_type,
            index,
            count,
        })
    }

    /// Byte offset into the global variable space.
    pub fn offset(&self) -> u32 {
        self.index * 4
    }
}

/// Array subscript of a variable reference.
#[derive(Debug, Clone)]
pub enum ArrayIndex {
    Constant(i32),
    Var(SharedVar),
}

/// A variable reference as it appears in an argument list.
#[derive(Debug, Clone)]
pub struct CompiledVar {
    pub var: SharedVar,
    pub index: Option<ArrayIndex>,
}

/// The string flavors of the argument encoding. Storage is validated
/// against the flavor limits by the semantic pass.
#[derive(Debug, Clone)]
pub enum CompiledString {
    /// Up to 8 characters, NUL-padded on the wire.
    TextLabel8(String),
    /// Up to 16 characters, NUL-padded on the wire.
    TextLabel16(String),
    /// Length-prefixed, at most 127 characters.
    StringVar(String),
    /// Exactly 128 bytes on the wire, NUL-padded.
    String128(String),
}

#[derive(Debug, Clone)]
pub enum Arg {
    Eoal,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Float(f32),
    Label(SharedLabel),
    Var(CompiledVar),
    String(CompiledString),
}

#[derive(Debug, Clone)]
pub struct CompiledCommand {
    pub id: u16,
    pub args: Vec<Arg>,
}

/// One pseudo-instruction of a compiled script.
#[derive(Debug, Clone)]
pub enum CompiledData {
    Label(SharedLabel),
    Command(CompiledCommand),
    Hex(Vec<u8>),
    String(CompiledString),
}
