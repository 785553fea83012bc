pub mod asm;
pub mod compiler;
