use derive_more::TryFrom;
use itertools::Itertools;
use thiserror::Error;

use super::ast::{Ast, AstError, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFrom)]
#[try_from(repr)]
#[repr(u8)]
pub enum Command {
    Movr = b'>',
    Movl = b'<',
    Incr = b'+',
    Decr = b'-',
    Writ = b'.',
    Read = b',',
    JmpF = b'[',
    JmpB = b']',
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected ']', missing '[' at offset {offset}")]
    UnmatchedClose { offset: usize },
    #[error("unclosed '[', missing ']' for offset(s) {}", .offsets.iter().join(", "))]
    UnclosedOpen { offsets: Vec<usize> },
    #[error("malformed tree: {0}")]
    Tree(#[from] AstError),
}

/// A parsed program: the node store plus the root list inside it.
#[derive(Clone, Debug)]
pub struct Program {
    pub ast: Ast,
    pub root: NodeId,
}

impl Program {
    /// Build the tree in one pass over `source`. Bytes that are not commands
    /// (whitespace, comments) are skipped.
    pub fn parse(source: &[u8]) -> Result<Self, ParseError> {
        use Command as C;

        let mut ast = Ast::new();
        let root = ast.create_list();

        let mut current = root;
        let mut open: Vec<usize> = Vec::new();

        for (offset, &byte) in source.iter().enumerate() {
            let Ok(command) = C::try_from(byte) else {
                continue;
            };

            match command {
                C::JmpF => {
                    let list = ast.create_list();
                    ast.append(current, list)?;
                    open.push(offset);
                    current = list;
                }
                C::JmpB => {
                    current = ast
                        .parent(current)
                        .ok_or(ParseError::UnmatchedClose { offset })?;
                    open.pop();
                }
                _ => {
                    let instr = ast.create_instruction(byte);
                    ast.append(current, instr)?;
                }
            }
        }

        if !open.is_empty() {
            return Err(ParseError::UnclosedOpen { offsets: open });
        }

        Ok(Program { ast, root })
    }

    pub fn depth(&self) -> usize {
        self.ast.depth(self.root)
    }

    pub fn instructions(&self) -> Vec<u8> {
        self.ast.instructions(self.root)
    }

    pub fn render(&self) -> String {
        self.ast.render(self.root)
    }
}

impl TryFrom<&str> for Program {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Program::parse(value.as_bytes())
    }
}
