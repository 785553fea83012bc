//! Compiles brainfuck source into assembly text for a small register/stack
//! virtual machine.
//!
//! - `frontend::parser` turns source bytes into a tree held by `frontend::ast`.
//! - `backend::compiler` walks the tree and writes the listing through
//!   `backend::asm`.

use std::{io, path::PathBuf};

use thiserror::Error;

pub mod backend;
pub mod frontend;
pub mod test_helpers;

use backend::compiler::{compile, CompilerError};
use frontend::parser::{ParseError, Program};

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("could not compile: {0}")]
    Compile(#[from] CompilerError),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse and compile a complete source file held in memory.
pub fn compile_source(source: &[u8]) -> Result<String, Error> {
    let program = Program::parse(source)?;
    let asm = compile(&program)?;
    program.ast.release();

    Ok(asm)
}
