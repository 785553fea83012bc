//! Node store for parsed programs.
//!
//! Nodes live in an arena and refer to each other through [`NodeId`] handles.
//! A list owns the ordered sequence of its children; the `parent` stored on
//! every slot is only used to walk back up the tree. First/last/count are
//! derived from the child sequence, so they can never disagree with it.
//!
//! Appending and prepending are O(1) amortised. `insert_before`,
//! `insert_after` and `unlink` search the parent's child vector for the
//! anchor, so they are O(n) in the number of siblings.
//!
//! Every walk over the tree uses an explicit work stack, so nesting depth is
//! bounded by memory rather than by the call stack.

use thiserror::Error;

/// Indentation stops growing past this many levels in [`Ast::render`].
pub const MAX_RENDER_INDENT: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A single opcode byte
    Instruction(u8),
    /// A loop body, or the program root
    List(Vec<NodeId>),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AstError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not a list")]
    NotAList(NodeId),
    #[error("node {0:?} already has a parent")]
    AlreadyLinked(NodeId),
    #[error("node {0:?} has no parent to insert into")]
    Detached(NodeId),
    #[error("linking {node:?} under {list:?} would create a cycle")]
    Cycle { list: NodeId, node: NodeId },
}

#[derive(Clone, Debug)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
}

#[derive(Clone, Debug, Default)]
pub struct Ast {
    slots: Vec<Slot>,
}

#[derive(Clone, Copy)]
enum Position {
    Front,
    Back,
    Before(NodeId),
    After(NodeId),
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, parent: None });
        id
    }

    pub fn create_instruction(&mut self, opcode: u8) -> NodeId {
        self.push(Node::Instruction(opcode))
    }

    pub fn create_list(&mut self) -> NodeId {
        self.push(Node::List(Vec::new()))
    }

    fn slot(&self, id: NodeId) -> Result<&Slot, AstError> {
        self.slots.get(id.0).ok_or(AstError::UnknownNode(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|s| &s.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|s| s.parent)
    }

    /// Children of a list; empty for instructions and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(Node::List(children)) => children,
            _ => &[],
        }
    }

    pub fn count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn first(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn append(&mut self, list: NodeId, node: NodeId) -> Result<(), AstError> {
        self.link(list, node, Position::Back)
    }

    pub fn prepend(&mut self, list: NodeId, node: NodeId) -> Result<(), AstError> {
        self.link(list, node, Position::Front)
    }

    /// Splice `node` directly in front of `anchor` inside `anchor`'s parent.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<(), AstError> {
        let list = self.slot(anchor)?.parent.ok_or(AstError::Detached(anchor))?;
        self.link(list, node, Position::Before(anchor))
    }

    /// Splice `node` directly behind `anchor` inside `anchor`'s parent.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), AstError> {
        let list = self.slot(anchor)?.parent.ok_or(AstError::Detached(anchor))?;
        self.link(list, node, Position::After(anchor))
    }

    fn link(&mut self, list: NodeId, node: NodeId, at: Position) -> Result<(), AstError> {
        self.slot(node)?;
        if !matches!(self.slot(list)?.node, Node::List(_)) {
            return Err(AstError::NotAList(list));
        }
        if self.slots[node.0].parent.is_some() {
            return Err(AstError::AlreadyLinked(node));
        }

        // `node` must not be `list` or one of its ancestors. A node without
        // children can only be an ancestor of itself.
        if list == node {
            return Err(AstError::Cycle { list, node });
        }
        if !self.children(node).is_empty() {
            let mut cursor = self.slots[list.0].parent;
            while let Some(id) = cursor {
                if id == node {
                    return Err(AstError::Cycle { list, node });
                }
                cursor = self.slots[id.0].parent;
            }
        }

        let Node::List(children) = &mut self.slots[list.0].node else {
            return Err(AstError::NotAList(list));
        };
        let index = match at {
            Position::Front => 0,
            Position::Back => children.len(),
            Position::Before(anchor) | Position::After(anchor) => {
                let pos = children
                    .iter()
                    .position(|&c| c == anchor)
                    .ok_or(AstError::Detached(anchor))?;
                if matches!(at, Position::After(_)) {
                    pos + 1
                } else {
                    pos
                }
            }
        };
        children.insert(index, node);
        self.slots[node.0].parent = Some(list);

        Ok(())
    }

    /// Detach `node` from its parent. Detached nodes are left alone.
    pub fn unlink(&mut self, node: NodeId) -> Result<(), AstError> {
        let Some(list) = self.slot(node)?.parent else {
            return Ok(());
        };

        if let Node::List(children) = &mut self.slots[list.0].node {
            children.retain(|&c| c != node);
        }
        self.slots[node.0].parent = None;

        Ok(())
    }

    /// Number of loop levels nested below `id`.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut max = 0;
        let mut stack = vec![(id, 0)];

        while let Some((current, level)) = stack.pop() {
            max = max.max(level);
            for &child in self.children(current) {
                if matches!(self.node(child), Some(Node::List(_))) {
                    stack.push((child, level + 1));
                }
            }
        }

        max
    }

    /// Opcodes of every instruction below `id`, in pre-order.
    pub fn instructions(&self, id: NodeId) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            match self.node(current) {
                Some(Node::Instruction(op)) => out.push(*op),
                Some(Node::List(children)) => stack.extend(children.iter().rev()),
                None => (),
            }
        }

        out
    }

    /// Indented dump of the subtree rooted at `id`, one node per line.
    /// Levels deeper than [`MAX_RENDER_INDENT`] share the deepest indent.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(id, 0)];

        while let Some((current, indent)) = stack.pop() {
            let pad = "  ".repeat(indent.min(MAX_RENDER_INDENT));
            match self.node(current) {
                Some(Node::Instruction(op)) => {
                    out.push_str(&format!("{pad}{}\n", *op as char));
                }
                Some(Node::List(children)) => {
                    out.push_str(&format!("{pad}list ({})\n", children.len()));
                    stack.extend(children.iter().rev().map(|&c| (c, indent + 1)));
                }
                None => (),
            }
        }

        out
    }

    /// Tear down the whole tree at once, returning how many nodes were freed.
    pub fn release(self) -> usize {
        self.slots.len()
    }
}
