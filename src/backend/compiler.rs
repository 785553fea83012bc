use derive_more::TryFrom;
use thiserror::Error;

use crate::frontend::{
    ast::{Ast, Node, NodeId},
    parser::Program,
};

use super::asm::AsmBuilder;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompilerError {
    #[error("root node {0:?} is not a list")]
    NotAList(NodeId),
    #[error("unknown opcode byte {opcode:#04x} in node {node:?}")]
    UnknownOpcode { opcode: u8, node: NodeId },
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}

const CELL_BUFFER_LENGTH: u32 = 30_000;

/// Opcodes that compile to a straight-line block.
#[derive(Clone, Copy, Debug, TryFrom)]
#[try_from(repr)]
#[repr(u8)]
enum Opcode {
    ShiftRight = b'>',
    ShiftLeft = b'<',
    Add = b'+',
    Sub = b'-',
    Write = b'.',
    Read = b',',
}

// bf_ptr = r0, cells start at bf_cells

fn emit_prologue(a: &mut AsmBuilder) {
    a.emitln(".def bf_ptr r0");
    a.emitln(".def bf_calc1 r1b");
    a.emitln(".def bf_static_one r2b");
    a.emitln(".def bf_static_zero r3b");

    a.emitln(".label bf_cells");
    a.emitln(&format!(".org {CELL_BUFFER_LENGTH}"));
    a.emitln(".label entry_addr");

    a.emitln("loadi bf_ptr, 0");
    a.emitln("loadi bf_static_one, 1");
    a.emitln("loadi bf_static_zero, 0");
    a.emitln("");
}

fn emit_epilogue(a: &mut AsmBuilder) {
    a.emitln("reads 1, bf_ptr");
    a.emitln("push t_syscall, sys_exit");
    a.emitln("syscall");
}

fn emit_shift_right(a: &mut AsmBuilder) {
    a.emitln("mov bf_calc1, bf_ptr");
    a.emitln("add bf_calc1, bf_static_one");
    a.emitln("mov bf_ptr, bf_calc1");
}

fn emit_shift_left(a: &mut AsmBuilder) {
    a.emitln("mov bf_calc1, bf_ptr");
    a.emitln("sub bf_calc1, bf_static_one");
    a.emitln("mov bf_ptr, bf_calc1");
}

fn emit_add(a: &mut AsmBuilder) {
    a.emitln("read bf_calc1, bf_ptr");
    a.emitln("add bf_calc1, bf_static_one");
    a.emitln("write bf_ptr, bf_calc1");
}

fn emit_sub(a: &mut AsmBuilder) {
    a.emitln("read bf_calc1, bf_ptr");
    a.emitln("sub bf_calc1, bf_static_one");
    a.emitln("write bf_ptr, bf_calc1");
}

fn emit_write(a: &mut AsmBuilder) {
    a.emitln("reads 1, bf_ptr");
    a.emitln("push t_address, sp");
    a.emitln("push t_size, 1");
    a.emitln("push t_syscall, sys_write");
    a.emitln("syscall");
}

fn emit_read(a: &mut AsmBuilder) {
    a.emitln("push t_address, bf_ptr");
    a.emitln("push t_size, 1");
    a.emitln("push t_syscall, sys_read");
    a.emitln("syscall");
}

fn emit_jump_if_zero(a: &mut AsmBuilder, target: u32) {
    a.emitln("read bf_calc1, bf_ptr");
    a.emitln("cmp bf_calc1, bf_static_zero");
    a.emit_jump("jz", target);
}

enum Frame {
    Enter(NodeId),
    /// Loop tail, emitted once the body has been compiled
    Exit { entry: u32, exit: u32 },
}

/// Generates the listing for one program. Label ids are handed out in
/// increasing order and never reused, so a compiler must not be shared
/// between programs.
pub struct Compiler {
    out: AsmBuilder,
    next_label: u32,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_builder(AsmBuilder::new())
    }

    pub fn with_builder(out: AsmBuilder) -> Self {
        Compiler { out, next_label: 0 }
    }

    pub fn labels_reserved(&self) -> u32 {
        self.next_label
    }

    pub fn output(&self) -> &AsmBuilder {
        &self.out
    }

    pub fn finish(self) -> AsmBuilder {
        self.out
    }

    fn reserve_label(&mut self) -> u32 {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    pub fn compile_program(&mut self, ast: &Ast, root: NodeId) -> Result<(), CompilerError> {
        match ast.node(root) {
            Some(Node::List(_)) => (),
            Some(Node::Instruction(_)) => return Err(CompilerError::NotAList(root)),
            None => return Err(CompilerError::UnknownNode(root)),
        }

        emit_prologue(&mut self.out);

        for &child in ast.children(root) {
            self.compile_node(ast, child)?;
        }

        emit_epilogue(&mut self.out);

        Ok(())
    }

    /// Compile `node` and everything below it. Nested loops are walked with
    /// an explicit stack, so deep nesting cannot exhaust the call stack.
    pub fn compile_node(&mut self, ast: &Ast, node: NodeId) -> Result<(), CompilerError> {
        let mut stack = vec![Frame::Enter(node)];

        while let Some(frame) = stack.pop() {
            let node = match frame {
                Frame::Enter(node) => node,
                Frame::Exit { entry, exit } => {
                    emit_jump_if_zero(&mut self.out, exit);
                    self.out.emit_jump("jmp", entry);
                    self.out.emit_label(exit);
                    self.out.emitln("");
                    continue;
                }
            };

            match ast.node(node).ok_or(CompilerError::UnknownNode(node))? {
                Node::Instruction(opcode) => {
                    use Opcode as O;
                    let op = O::try_from(*opcode).map_err(|_| {
                        CompilerError::UnknownOpcode {
                            opcode: *opcode,
                            node,
                        }
                    })?;

                    let a = &mut self.out;
                    match op {
                        O::ShiftRight => emit_shift_right(a),
                        O::ShiftLeft => emit_shift_left(a),
                        O::Add => emit_add(a),
                        O::Sub => emit_sub(a),
                        O::Write => emit_write(a),
                        O::Read => emit_read(a),
                    }
                    a.emitln("");
                }
                Node::List(children) => {
                    let entry = self.reserve_label();
                    let exit = self.reserve_label();

                    emit_jump_if_zero(&mut self.out, exit);
                    self.out.emitln("");
                    self.out.emit_label(entry);

                    stack.push(Frame::Exit { entry, exit });
                    stack.extend(children.iter().rev().map(|&c| Frame::Enter(c)));
                }
            }
        }

        Ok(())
    }
}

/// Compile a parsed program into assembly text. On failure the partial
/// listing is dropped.
pub fn compile(program: &Program) -> Result<String, CompilerError> {
    let mut compiler = Compiler::new();
    compiler.compile_program(&program.ast, program.root)?;

    Ok(compiler.finish().build())
}
