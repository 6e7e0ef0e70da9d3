//! Engine errors.
//!
//! Only reconciler invariant violations and terminal I/O fail. Everything else
//! the engine does is infallible by construction.

use thiserror::Error;

use crate::engine::FiberId;
use crate::types::EffectTag;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("fiber {fiber:?} is linked into the new tree but tagged Delete")]
    DeletedFiberInTree { fiber: FiberId },

    #[error("fiber {fiber:?} reached commit without an effect tag (found {effect:?})")]
    UntaggedFiberInTree { fiber: FiberId, effect: EffectTag },

    #[error("fiber {fiber:?} has no host-bearing ancestor")]
    MissingHostParent { fiber: FiberId },

    #[error("fiber {fiber:?} is not in the arena")]
    MissingFiber { fiber: FiberId },

    #[error("nothing has been rendered yet")]
    NotMounted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
