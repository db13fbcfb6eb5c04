//! Brainf**k to native code, by way of LLVM IR.
//!
//! `translator::translate` does a single pass over the source producing an
//! `ir::Module`; a `backend::Backend` (normally clang) turns that into an
//! executable. `interpreter` can run a module directly which is mostly
//! useful for testing the generated control flow.

pub mod backend;
pub mod interpreter;
pub mod ir;
pub mod lexer;
pub mod translator;

use std::path::Path;

use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::interpreter::InterpretError;
use crate::translator::TranslateError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}: {source}")]
    ReadSource {
        path: String,
        source: std::io::Error,
    },

    #[error("IO Error: {0}")]
    FileIO(
        #[from]
        std::io::Error,
    ),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Interpret(#[from] InterpretError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reads a source file, failing with the path in the message
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::ReadSource {
        path: path.display().to_string(),
        source,
    })
}

/// Translate then hand the module to `backend`, nothing is written if translation fails
pub fn compile(source: &[u8], backend: &dyn Backend, output: &Path) -> Result<()> {
    let module = translator::translate(source)?;
    backend.compile(&module, output)?;
    Ok(())
}
