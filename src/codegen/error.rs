use std::sync::Mutex;

use thiserror::Error;

/// Recoverable findings reported during generation. Fatal conditions,
/// buffer overruns and field overflows, panic instead.
#[derive(Debug, Error)]
pub enum Diagnostic {
    /// A negated label offset of zero cannot be told apart from a missing
    /// target and the engine rejects it.
    #[error("{script}: reference to zero offset")]
    ZeroOffsetReference { script: String },
}

/// Sink for diagnostics, shared across generation units. Reports may
/// arrive from several threads during emit.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reported: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.reported.lock().unwrap().push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.reported.lock().unwrap().is_empty()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.reported.lock().unwrap())
    }
}
