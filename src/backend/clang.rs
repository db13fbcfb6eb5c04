use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process::Command,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{ir::Module, translator::ENTRY_FUNCTION};

use super::{Backend, BackendError};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A `.ll` file in the system temp directory, removed again on drop
#[derive(Debug)]
pub struct TempIr {
    path: PathBuf,
}

impl TempIr {
    pub fn create(contents: &str) -> io::Result<TempIr> {
        loop {
            let path = std::env::temp_dir().join(format!(
                "bfc-{}-{}.ll",
                std::process::id(),
                TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
            ));
            // never clobber something that's already there
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let temp = TempIr { path };
                    file.write_all(contents.as_bytes())?;
                    return Ok(temp);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempIr {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Compiles & links textual IR by shelling out to clang
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clang {
    /// clang binary to run
    pub program: String,
    /// passed through as `-O<level>`
    pub opt_level: u8,
}

impl Default for Clang {
    fn default() -> Self {
        Clang {
            program: "clang".to_string(),
            opt_level: 3,
        }
    }
}

impl Clang {
    pub fn new(program: impl Into<String>, opt_level: u8) -> Self {
        Clang {
            program: program.into(),
            opt_level,
        }
    }

    pub fn command(&self, ir: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-w")
            .arg(format!("-O{}", self.opt_level))
            .arg("-o")
            .arg(output)
            .arg(ir);
        cmd
    }
}

impl Backend for Clang {
    fn compile(&self, module: &Module, output: &Path) -> Result<(), BackendError> {
        module.verify(ENTRY_FUNCTION)?;

        let ir = TempIr::create(&module.to_string())?;
        // stdout/stderr are inherited so clang's own diagnostics show up
        let status = self
            .command(ir.path(), output)
            .status()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BackendError::CompilerFailed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}
