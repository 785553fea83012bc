use std::{
    fs::File,
    io::Write,
    path::Path,
    process::{Command, Output},
};

use tempdir::TempDir;

/// Write `source` into a fresh temp dir as `prog.bf` and run the compiler
/// binary at `compiler` on it, with `args` placed before the file name.
/// The temp dir is returned so callers can inspect files written next to it.
pub fn run_compiler(compiler: &Path, source: &[u8], args: &[&str]) -> (TempDir, Output) {
    let dir = TempDir::new("bfasm").unwrap();

    let source_path = dir.path().join("prog.bf");
    let mut file = File::create(&source_path).unwrap();
    file.write_all(source).unwrap();
    drop(file);

    let output = Command::new(compiler)
        .current_dir(dir.path())
        .args(args)
        .arg(&source_path)
        .output()
        .unwrap();

    (dir, output)
}
