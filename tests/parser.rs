use bfasm::frontend::{
    ast::Node,
    parser::{ParseError, Program},
};
use pretty_assertions::assert_eq;

fn recognised(source: &str) -> Vec<u8> {
    source
        .bytes()
        .filter(|b| b"+-<>.,".contains(b))
        .collect()
}

fn bracket_depth(source: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0;
    for b in source.bytes() {
        match b {
            b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b']' => depth -= 1,
            _ => (),
        }
    }
    max
}

#[test]
fn tree_mirrors_source() {
    let sources = [
        "",
        "+",
        "++.",
        "[-]",
        "[[+]]",
        ">++[<+>-]<.",
        "+[>[>[-]<-]<-]",
        "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.",
        "a comment + with [ words - ] and , stuff .\r\n\t",
    ];

    for source in sources {
        let program = Program::parse(source.as_bytes()).unwrap();

        assert_eq!(program.instructions(), recognised(source), "{source}");
        assert_eq!(program.depth(), bracket_depth(source), "{source}");
        assert_eq!(program.ast.parent(program.root), None);
    }
}

#[test]
fn nested_loops() {
    let mut program = Program::try_from("[[+]]").unwrap();
    let ast = &program.ast;

    let outer = ast.children(program.root)[0];
    assert!(matches!(ast.node(outer), Some(Node::List(_))));
    assert_eq!(ast.count(outer), 1);

    let inner = ast.children(outer)[0];
    assert!(matches!(ast.node(inner), Some(Node::List(_))));
    assert_eq!(ast.parent(inner), Some(outer));

    let plus = ast.children(inner);
    assert_eq!(plus.len(), 1);
    assert_eq!(ast.node(plus[0]), Some(&Node::Instruction(b'+')));

    program.ast.unlink(inner).unwrap();
    assert_eq!(program.ast.count(outer), 0);
    assert_eq!(program.ast.first(outer), None);
    assert_eq!(program.ast.last(outer), None);
}

#[test]
fn unmatched_close() {
    assert_eq!(
        Program::parse(b"+-]").unwrap_err(),
        ParseError::UnmatchedClose { offset: 2 }
    );
    assert_eq!(
        Program::parse(b"[+]\n]").unwrap_err(),
        ParseError::UnmatchedClose { offset: 4 }
    );
}

#[test]
fn unclosed_open() {
    assert_eq!(
        Program::parse(b"[+[-]").unwrap_err(),
        ParseError::UnclosedOpen { offsets: vec![0] }
    );
    assert_eq!(
        Program::parse(b"+[ [ [-]").unwrap_err(),
        ParseError::UnclosedOpen { offsets: vec![1, 3] }
    );
}

#[test]
fn error_messages() {
    assert_eq!(
        ParseError::UnmatchedClose { offset: 7 }.to_string(),
        "unexpected ']', missing '[' at offset 7"
    );
    assert_eq!(
        ParseError::UnclosedOpen { offsets: vec![1, 3] }.to_string(),
        "unclosed '[', missing ']' for offset(s) 1, 3"
    );
}
