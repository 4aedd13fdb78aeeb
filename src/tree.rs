//! Constituency tree data structures
//!
//! Trees are stored as an arena of nodes. Children are owned top-down as
//! ordered id lists; the parent link is a plain `NodeId` used only for
//! walking upward (depth, tree positions).

/// Unique identifier for a node (index into `Tree::nodes`)
pub type NodeId = usize;

/// Height of a pre-terminal: a node directly dominating words only
pub const PRETERMINAL_HEIGHT: usize = 2;

/// Whether a node is a phrase/POS node or a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Phrase,
    Word,
}

/// A node in a constituency tree
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Phrase tag for phrase nodes, the literal word for word nodes
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Number of edges from the root
    pub depth: usize,
}

impl Node {
    pub fn is_word(&self) -> bool {
        self.kind == NodeKind::Word
    }
}

/// A constituency tree (one sentence)
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub root_id: Option<NodeId>,
    // Level-count heights: word = 1, pre-terminal = 2, childless phrase = 1
    heights: Vec<usize>,
    leaves: Vec<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as the root when `parent` is `None`)
    ///
    /// Children are appended in order, so words must be added left to right.
    /// Heights of all ancestors are kept up to date.
    pub fn add_node(&mut self, label: &str, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let depth = match parent {
            Some(parent_id) => self.nodes[parent_id].depth + 1,
            None => {
                debug_assert!(self.root_id.is_none(), "tree already has a root");
                self.root_id = Some(id);
                0
            }
        };

        self.nodes.push(Node {
            id,
            label: label.to_string(),
            kind,
            parent,
            children: Vec::new(),
            depth,
        });
        self.heights.push(1);

        if let Some(parent_id) = parent {
            self.nodes[parent_id].children.push(id);
            self.raise_heights(id);
        }
        if kind == NodeKind::Word {
            self.leaves.push(id);
        }

        id
    }

    // Propagate a new child's height up the ancestor chain
    fn raise_heights(&mut self, id: NodeId) {
        let mut child = id;
        while let Some(parent_id) = self.nodes[child].parent {
            let candidate = self.heights[child] + 1;
            if self.heights[parent_id] >= candidate {
                break;
            }
            self.heights[parent_id] = candidate;
            child = parent_id;
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root_id.and_then(|id| self.get_node(id))
    }

    /// Get the parent of a node
    pub fn parent(&self, node_id: NodeId) -> Option<&Node> {
        self.get_node(node_id)
            .and_then(|node| node.parent)
            .and_then(|parent_id| self.get_node(parent_id))
    }

    /// Get the children of a node
    pub fn children(&self, node_id: NodeId) -> Vec<&Node> {
        if let Some(node) = self.get_node(node_id) {
            node.children
                .iter()
                .filter_map(|&id| self.get_node(id))
                .collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Word node ids, left to right
    pub fn leaf_ids(&self) -> &[NodeId] {
        &self.leaves
    }

    /// The sentence's words, left to right
    pub fn leaves(&self) -> Vec<&str> {
        self.leaves
            .iter()
            .map(|&id| self.nodes[id].label.as_str())
            .collect()
    }

    /// Height of a node, counting levels down to and including the word level
    pub fn node_height(&self, id: NodeId) -> usize {
        self.heights.get(id).copied().unwrap_or(0)
    }

    /// Height of the whole tree (0 for an empty tree)
    pub fn height(&self) -> usize {
        self.root_id.map_or(0, |id| self.node_height(id))
    }

    pub fn is_preterminal(&self, id: NodeId) -> bool {
        self.nodes[id].kind == NodeKind::Phrase && self.node_height(id) == PRETERMINAL_HEIGHT
    }

    /// Number of edges between the root and `id`
    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].depth
    }

    /// Path of child indices from the root down to `id`
    pub fn tree_position(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.depth(id));
        let mut current = id;
        while let Some(parent_id) = self.nodes[current].parent {
            let index = self.nodes[parent_id]
                .children
                .iter()
                .position(|&c| c == current)
                .unwrap_or(0);
            path.push(index);
            current = parent_id;
        }
        path.reverse();
        path
    }

    /// Tree positions of every node, in pre-order
    pub fn tree_positions(&self) -> Vec<Vec<usize>> {
        self.preorder()
            .into_iter()
            .map(|id| self.tree_position(id))
            .collect()
    }

    /// Node ids in pre-order (explicit stack, no recursion)
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root_id.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// Words spanned by `id`, left to right
    pub fn span_words(&self, id: NodeId) -> Vec<&str> {
        let mut words = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_word() {
                words.push(node.label.as_str());
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        words
    }

    /// Words spanned by `id`, joined with single spaces
    pub fn phrase(&self, id: NodeId) -> String {
        self.span_words(id).join(" ")
    }
}
