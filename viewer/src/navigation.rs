//! Navigation through a rendered game.
//!
//! One [`Navigator`] per displayed game tracks the selected move and keeps
//! a single shared diagram in sync with it. Stepping stays on the selected
//! move's own line and never descends into side lines.

use std::str::FromStr;

use chess::pgn::NodeId;
use chess::Position;

use crate::board::{render_board, BoardOptions, BoardView};
use crate::tree::{GameView, MoveList};

/// Presentation side effects of navigation.
pub trait NavigationSurface {
    /// Show `position` and highlight `node`, clearing any previous highlight.
    fn show(&mut self, node: NodeId, position: &Position);
    /// Clear the highlight and hide the diagram.
    fn hide(&mut self);
}

/// In-memory shared diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedDiagram {
    pub board: Option<BoardView>,
    pub highlighted: Option<NodeId>,
    pub options: BoardOptions,
    /// Number of times the diagram was redrawn.
    pub renders: usize,
}

impl SharedDiagram {
    pub fn new(options: BoardOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl NavigationSurface for SharedDiagram {
    fn show(&mut self, node: NodeId, position: &Position) {
        self.board = Some(render_board(position, &self.options));
        self.highlighted = Some(node);
        self.renders += 1;
    }

    fn hide(&mut self) {
        self.board = None;
        self.highlighted = None;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationState {
    #[default]
    Idle,
    Selected(NodeId),
}

pub struct Navigator<S = SharedDiagram> {
    moves: MoveList,
    surface: S,
    state: NavigationState,
}

impl Navigator<SharedDiagram> {
    /// Navigator over `game` drawing into an in-memory diagram.
    pub fn for_game(game: &GameView, options: BoardOptions) -> Self {
        Self::new(game.move_list.clone(), SharedDiagram::new(options))
    }
}

impl<S: NavigationSurface> Navigator<S> {
    pub fn new(moves: MoveList, surface: S) -> Self {
        Self {
            moves,
            surface,
            state: NavigationState::Idle,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            NavigationState::Idle => None,
            NavigationState::Selected(node) => Some(node),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Select `node`. Returns whether the selection changed.
    pub fn select(&mut self, node: NodeId) -> bool {
        if self.state == NavigationState::Selected(node) {
            return false;
        }
        let Some(entry) = self.moves.get(node) else {
            tracing::debug!(node = node.index(), "ignoring unknown move");
            return false;
        };

        self.surface.show(node, &entry.position);
        self.state = NavigationState::Selected(node);
        tracing::debug!(node = node.index(), label = %entry.label, "selected move");
        true
    }

    pub fn first(&mut self) -> bool {
        self.step(|_, siblings| siblings.first().copied())
    }

    pub fn last(&mut self) -> bool {
        self.step(|_, siblings| siblings.last().copied())
    }

    pub fn prev(&mut self) -> bool {
        self.step(|index, siblings| index.checked_sub(1).and_then(|i| siblings.get(i).copied()))
    }

    pub fn next(&mut self) -> bool {
        self.step(|index, siblings| siblings.get(index + 1).copied())
    }

    /// Clear the selection. Returns whether a move was selected.
    pub fn deselect(&mut self) -> bool {
        if self.state == NavigationState::Idle {
            return false;
        }
        self.surface.hide();
        self.state = NavigationState::Idle;
        tracing::debug!("deselected");
        true
    }

    pub fn apply(&mut self, command: NavigationCommand) -> bool {
        match command {
            NavigationCommand::Select(node) => self.select(node),
            NavigationCommand::First => self.first(),
            NavigationCommand::Prev => self.prev(),
            NavigationCommand::Next => self.next(),
            NavigationCommand::Last => self.last(),
            NavigationCommand::Deselect => self.deselect(),
        }
    }

    /// Move within the current line. `target` receives the current index
    /// and the line's moves.
    fn step(&mut self, target: impl Fn(usize, &[NodeId]) -> Option<NodeId>) -> bool {
        let Some(current) = self.selected() else {
            return false;
        };
        let siblings = self.moves.siblings(current);
        let Some(index) = siblings.iter().position(|n| *n == current) else {
            return false;
        };
        let target = target(index, siblings);
        match target {
            Some(node) if node != current => self.select(node),
            _ => false,
        }
    }
}

/// A navigation request from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    /// Select a move by its position in the move list.
    Select(NodeId),
    First,
    Prev,
    Next,
    Last,
    Deselect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown navigation command {0:?}")]
pub struct NavigationCommandError(String);

impl NavigationCommand {
    /// Parse a command against `moves`; `select=N` names the N-th move
    /// (from 1) in document order.
    pub fn parse(s: &str, moves: &MoveList) -> Result<Self, NavigationCommandError> {
        let err = || NavigationCommandError(s.to_string());
        if let Some(index) = s.trim().strip_prefix("select=") {
            let index: usize = index.trim().parse().map_err(|_| err())?;
            return index
                .checked_sub(1)
                .and_then(|i| moves.entries().get(i))
                .map(|entry| Self::Select(entry.node))
                .ok_or_else(err);
        }
        s.parse().map_err(|_| err())
    }
}

impl FromStr for NavigationCommand {
    type Err = NavigationCommandError;

    /// Parses every command except `select`, which needs a move list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first" => Ok(Self::First),
            "prev" => Ok(Self::Prev),
            "next" => Ok(Self::Next),
            "last" => Ok(Self::Last),
            "deselect" => Ok(Self::Deselect),
            other => Err(NavigationCommandError(other.to_string())),
        }
    }
}
