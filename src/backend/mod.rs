pub mod clang;

use std::{path::Path, process::ExitStatus};

use thiserror::Error;

use crate::ir::{IrError, Module};

pub use self::clang::Clang;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO Error: {0}")]
    FileIO(
        #[from]
        std::io::Error,
    ),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("couldn't run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` failed with {status}")]
    CompilerFailed { program: String, status: ExitStatus },
}

/// Something that can lower a finished module into a native executable
pub trait Backend {
    fn compile(&self, module: &Module, output: &Path) -> Result<(), BackendError>;
}
