use std::io::{self, Write};

pub const INITIAL_CAPACITY: usize = 8192;

const LABEL_PREFIX: &str = "bf_block_";

pub fn label_name(id: u32) -> String {
    format!("{LABEL_PREFIX}{id}")
}

/// Append-only text buffer for the generated listing.
///
/// Capacity starts at a fixed size and doubles whenever an append would not
/// fit. Growth happens before the write, so the buffer never holds a
/// partially copied line.
pub struct AsmBuilder {
    text: String,
    capacity: usize,
}

impl Default for AsmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AsmBuilder {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        AsmBuilder {
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn grow_for(&mut self, extra: usize) {
        let needed = self.text.len() + extra;
        if needed <= self.capacity {
            return;
        }

        let mut capacity = self.capacity;
        while capacity < needed {
            capacity *= 2;
        }

        self.text.reserve_exact(capacity - self.text.len());
        self.capacity = capacity;
    }

    pub fn emit(&mut self, code: &str) {
        self.grow_for(code.len());
        self.text.push_str(code);
    }

    pub fn emitln(&mut self, code: &str) {
        self.grow_for(code.len() + 1);
        self.text.push_str(code);
        self.text.push('\n');
    }

    /// `mnemonic label` on one line, e.g. `jz bf_block_1`.
    pub fn emit_jump(&mut self, mnemonic: &str, id: u32) {
        self.emitln(&format!("{mnemonic} {}", label_name(id)));
    }

    pub fn emit_label(&mut self, id: u32) {
        self.emitln(&format!(".label {}", label_name(id)));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Write everything emitted so far, verbatim.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(self.text.as_bytes())
    }

    pub fn build(self) -> String {
        self.text
    }
}
