//! Error types. Failures in this simulation are local: the worst case
//! for any of them is that one projectile disappears or one module is
//! skipped, never a crashed simulation.

use thiserror::Error;

use crate::config::ModuleKind;

/// A module factory failed during projectile spawn. The registry logs
/// this and continues with the remaining modules.
#[derive(Debug, Error)]
#[error("module factory for {kind:?} failed: {message}")]
pub struct ModuleBuildError {
    pub kind: ModuleKind,
    pub message: String,
}

impl ModuleBuildError {
    pub fn new(kind: ModuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A projectile snapshot could not be restored.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("snapshot module count {found} does not match definition ({expected})")]
    ModuleCountMismatch { expected: usize, found: usize },
    #[error("snapshot state for module {index} has the wrong kind")]
    ModuleStateMismatch { index: usize },
    #[error("snapshot target entity id is not a valid entity")]
    InvalidTarget,
}
