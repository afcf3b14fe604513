//! Arena-backed move tree.
//!
//! Nodes and variations are stored in flat vectors owned by [`MoveTree`];
//! every link between them is a typed index. A tree is built once by the
//! parser and is read-only afterwards.

use serde::{Serialize, Serializer};

use crate::position::Position;
use crate::types::PieceColor;

/// Index of a move node inside its [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

/// Index of a variation inside its [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariationId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl VariationId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Ongoing => "*",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GameResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// What a node hangs off: the start of its line, or the preceding move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Variation(VariationId),
    Move(NodeId),
}

/// One move in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNode {
    /// Canonical SAN, including the check or mate suffix.
    pub notation: String,
    /// Position after the move.
    pub position: Position,
    /// Fullmove number; shared by a White move and the Black reply.
    pub counter: u32,
    pub mover: PieceColor,
    pub nags: Vec<u8>,
    pub commentary: Option<String>,
    /// Side lines replacing this move, in document order.
    pub variations: Vec<VariationId>,
    pub next: Option<NodeId>,
    pub parent: ParentRef,
    /// Line this node belongs to.
    pub variation: VariationId,
    /// Byte offset of the move text in the source.
    pub offset: usize,
}

/// Root of a move sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    pub commentary: Option<String>,
    pub first: Option<NodeId>,
    /// The move this line replaces; `None` for the main line.
    pub branch_of: Option<NodeId>,
    /// Position the line starts from.
    pub position: Position,
    pub depth: usize,
}

/// Move data handed to [`MoveTree::push_move`]; links are filled in by the tree.
#[derive(Debug, Clone)]
pub(crate) struct NewMove {
    pub notation: String,
    pub position: Position,
    pub counter: u32,
    pub mover: PieceColor,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
    variations: Vec<Variation>,
}

impl MoveTree {
    pub(crate) fn new(start: Position) -> Self {
        Self {
            nodes: Vec::new(),
            variations: vec![Variation {
                commentary: None,
                first: None,
                branch_of: None,
                position: start,
                depth: 0,
            }],
        }
    }

    pub fn main_line(&self) -> VariationId {
        VariationId(0)
    }

    /// # Panics
    /// If `id` was not issued by this tree.
    pub fn variation(&self, id: VariationId) -> &Variation {
        &self.variations[id.0]
    }

    /// # Panics
    /// If `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&MoveNode> {
        self.nodes.get(id.0)
    }

    /// Starting position of the game.
    pub fn start_position(&self) -> &Position {
        &self.variations[0].position
    }

    /// Moves of one line in document order, not descending into side lines.
    pub fn line(&self, id: VariationId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.variation(id).first, move |node| self.node(*node).next)
    }

    pub fn main_line_moves(&self) -> impl Iterator<Item = &MoveNode> + '_ {
        self.line(self.main_line()).map(move |id| self.node(id))
    }

    /// Position the move was played from.
    pub fn position_before(&self, id: NodeId) -> &Position {
        match self.node(id).parent {
            ParentRef::Move(prev) => &self.node(prev).position,
            ParentRef::Variation(var) => &self.variation(var).position,
        }
    }

    /// Nesting depth of the node's line; 0 for the main line.
    pub fn depth(&self, id: NodeId) -> usize {
        self.variation(self.node(id).variation).depth
    }

    /// Number of half-moves on the main line.
    pub fn ply_count(&self) -> usize {
        self.line(self.main_line()).count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn variation_count(&self) -> usize {
        self.variations.len()
    }

    /// All node ids in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Open a side line replacing `branch_of`, rooted at the position before it.
    pub(crate) fn add_variation(&mut self, branch_of: NodeId) -> VariationId {
        let id = VariationId(self.variations.len());
        let variation = Variation {
            commentary: None,
            first: None,
            branch_of: Some(branch_of),
            position: self.position_before(branch_of).clone(),
            depth: self.depth(branch_of) + 1,
        };
        self.variations.push(variation);
        self.nodes[branch_of.0].variations.push(id);
        id
    }

    /// Append a move to `variation`, after `last` when the line already has moves.
    pub(crate) fn push_move(
        &mut self,
        variation: VariationId,
        last: Option<NodeId>,
        new: NewMove,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = match last {
            Some(prev) => {
                self.nodes[prev.0].next = Some(id);
                ParentRef::Move(prev)
            }
            None => {
                self.variations[variation.0].first = Some(id);
                ParentRef::Variation(variation)
            }
        };
        self.nodes.push(MoveNode {
            notation: new.notation,
            position: new.position,
            counter: new.counter,
            mover: new.mover,
            nags: Vec::new(),
            commentary: None,
            variations: Vec::new(),
            next: None,
            parent,
            variation,
            offset: new.offset,
        });
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    pub(crate) fn variation_mut(&mut self, id: VariationId) -> &mut Variation {
        &mut self.variations[id.0]
    }
}
