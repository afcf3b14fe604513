//! Render tree for a parsed game.
//!
//! Walks the move tree depth-first and produces a serializable description
//! of the move text: move elements with their number prefixes, commentary
//! blocks (with embedded diagrams resolved), nested side lines and the
//! result. The flattened [`MoveList`] collected on the way feeds the
//! navigation controller.

use std::collections::HashMap;

use serde::Serialize;

use chess::pgn::{nag, MoveTree, NodeId, PgnDocument, VariationId};
use chess::{PieceColor, Position};

use crate::board::{render_board, BoardOptions, BoardView};
use crate::config::{clamp_square_size, parse_flag, parse_square_size, RenderConfig};
use crate::headers::{format_headers, HeaderView};
use crate::symbols::SymbolSet;

/// Opening of a diagram placeholder inside commentary: `[pgndiagram]`, or
/// `[pgndiagram flip=true square_size=24 show_coordinates=1]`.
pub const DIAGRAM_TAG: &str = "[pgndiagram";

/// Per-diagram overrides of the game's board options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramAttributes {
    pub flip: Option<bool>,
    /// Already clamped to the accepted range.
    pub square_size: Option<u32>,
    pub show_coordinates: Option<bool>,
}

impl DiagramAttributes {
    /// Parse whitespace-separated `key=value` pairs. Values may be quoted.
    /// Unknown keys and invalid values are ignored.
    pub fn parse(body: &str) -> Self {
        let mut attributes = Self::default();
        for pair in body.split_whitespace() {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            match key.to_ascii_lowercase().as_str() {
                "flip" => attributes.flip = parse_flag(value).or(attributes.flip),
                "square_size" => {
                    attributes.square_size = parse_square_size(value).or(attributes.square_size)
                }
                "show_coordinates" => {
                    attributes.show_coordinates =
                        parse_flag(value).or(attributes.show_coordinates)
                }
                _ => tracing::debug!(key, "ignoring diagram attribute"),
            }
        }
        attributes
    }

    /// `base` with the overrides applied.
    pub fn apply(&self, base: &BoardOptions) -> BoardOptions {
        BoardOptions {
            square_size: clamp_square_size(self.square_size.unwrap_or(base.square_size)),
            show_coordinates: self.show_coordinates.unwrap_or(base.show_coordinates),
            flip: self.flip.unwrap_or(base.flip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderNode {
    Move(MoveView),
    Commentary(CommentaryView),
    Variation {
        depth: usize,
        children: Vec<RenderNode>,
    },
    Result {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveView {
    pub node: NodeId,
    /// `12.` before White's move, `12…` before Black's when shown.
    pub number: Option<String>,
    pub notation: String,
    pub nags: Vec<String>,
    /// Position after the move, for the miniature board.
    pub position: Position,
}

impl MoveView {
    pub fn label(&self) -> String {
        let mut label = String::new();
        if let Some(number) = &self.number {
            label.push_str(number);
        }
        label.push_str(&self.notation);
        for glyph in &self.nags {
            label.push(' ');
            label.push_str(glyph);
        }
        label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryStyle {
    Inline,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentarySegment {
    Text { text: String },
    Diagram { board: BoardView },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentaryView {
    pub style: CommentaryStyle,
    pub segments: Vec<CommentarySegment>,
}

/// One move in document order, with its line for sibling lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEntry {
    pub node: NodeId,
    pub line: VariationId,
    pub label: String,
    pub position: Position,
}

/// Every rendered move in document order, indexed by line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveList {
    entries: Vec<MoveEntry>,
    #[serde(skip)]
    by_node: HashMap<NodeId, usize>,
    #[serde(skip)]
    by_line: HashMap<VariationId, Vec<NodeId>>,
}

impl MoveList {
    fn push(&mut self, entry: MoveEntry) {
        self.by_node.insert(entry.node, self.entries.len());
        self.by_line.entry(entry.line).or_default().push(entry.node);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[MoveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&MoveEntry> {
        self.by_node.get(&node).map(|&index| &self.entries[index])
    }

    /// Moves of the node's own line, in order; empty for unknown nodes.
    pub fn siblings(&self, node: NodeId) -> &[NodeId] {
        self.get(node)
            .and_then(|entry| self.by_line.get(&entry.line))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Rendered game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub headers: HeaderView,
    pub moves: Vec<RenderNode>,
    pub move_list: MoveList,
}

struct Renderer<'a> {
    tree: &'a MoveTree,
    symbols: SymbolSet,
    threshold: usize,
    diagram: BoardOptions,
    move_list: MoveList,
}

/// Render a parsed game.
pub fn render_game(document: &PgnDocument, config: &RenderConfig) -> GameView {
    let mut renderer = Renderer {
        tree: &document.tree,
        symbols: config.symbols,
        threshold: config.long_comment_threshold,
        diagram: config.board_options(),
        move_list: MoveList::default(),
    };

    let mut moves = Vec::new();
    renderer.variation(document.tree.main_line(), 0, &mut moves);
    if !config.hide_result {
        moves.push(RenderNode::Result {
            text: document.result.as_str().to_string(),
        });
    }

    tracing::debug!(
        moves = renderer.move_list.len(),
        elements = moves.len(),
        "rendered game"
    );
    GameView {
        headers: format_headers(&document.headers),
        moves,
        move_list: renderer.move_list,
    }
}

impl Renderer<'_> {
    fn variation(&mut self, id: VariationId, depth: usize, out: &mut Vec<RenderNode>) {
        let tree = self.tree;
        let variation = tree.variation(id);
        if let Some(text) = &variation.commentary {
            out.push(self.commentary(text, &variation.position, depth));
        }

        let mut force_number = true;
        for node_id in tree.line(id) {
            let node = tree.node(node_id);

            let number = match node.mover {
                PieceColor::White => Some(format!("{}.", node.counter)),
                PieceColor::Black if force_number => Some(format!("{}\u{2026}", node.counter)),
                PieceColor::Black => None,
            };
            let view = MoveView {
                node: node_id,
                number,
                notation: self.symbols.substitute(&node.notation),
                nags: node.nags.iter().map(|code| nag::format(*code)).collect(),
                position: node.position.clone(),
            };
            self.move_list.push(MoveEntry {
                node: node_id,
                line: id,
                label: view.label(),
                position: node.position.clone(),
            });
            out.push(RenderNode::Move(view));

            if let Some(text) = &node.commentary {
                out.push(self.commentary(text, &node.position, depth));
            }

            for side in &node.variations {
                let mut children = Vec::new();
                self.variation(*side, depth + 1, &mut children);
                out.push(RenderNode::Variation {
                    depth: depth + 1,
                    children,
                });
            }

            force_number = node.commentary.is_some() || !node.variations.is_empty();
        }
    }

    fn commentary(&self, text: &str, position: &Position, depth: usize) -> RenderNode {
        let mut segments = Vec::new();
        let mut has_diagram = false;
        let mut length = 0;

        for piece in split_diagrams(text) {
            match piece {
                CommentaryPiece::Text(text) => {
                    length += text.encode_utf16().count();
                    segments.push(CommentarySegment::Text {
                        text: text.to_string(),
                    });
                }
                CommentaryPiece::Diagram(attributes) => {
                    has_diagram = true;
                    segments.push(CommentarySegment::Diagram {
                        board: render_board(position, &attributes.apply(&self.diagram)),
                    });
                }
            }
        }

        RenderNode::Commentary(CommentaryView {
            style: classify(depth, length, has_diagram, self.threshold),
            segments,
        })
    }
}

/// Long-form commentary sits on the main line and is either long or
/// carries a diagram.
pub fn classify(
    depth: usize,
    length: usize,
    has_diagram: bool,
    threshold: usize,
) -> CommentaryStyle {
    if depth == 0 && (length >= threshold || has_diagram) {
        CommentaryStyle::Long
    } else {
        CommentaryStyle::Inline
    }
}

#[derive(Debug, PartialEq, Eq)]
enum CommentaryPiece<'a> {
    Text(&'a str),
    Diagram(DiagramAttributes),
}

/// Split commentary around diagram placeholders (matched case-insensitively).
/// Empty text between placeholders is dropped. A tag without its closing
/// `]` stays text.
fn split_diagrams(text: &str) -> Vec<CommentaryPiece<'_>> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut start = 0;
    let mut search = 0;

    while let Some(found) = lowered[search..].find(DIAGRAM_TAG) {
        let index = search + found;
        let body_start = index + DIAGRAM_TAG.len();
        let Some(close) = text[body_start..].find(']') else {
            break;
        };
        let body = &text[body_start..body_start + close];
        search = body_start;
        // `[pgndiagramfoo]` is not a placeholder.
        if body.starts_with(|c: char| !c.is_whitespace()) {
            continue;
        }

        if index > start {
            out.push(CommentaryPiece::Text(&text[start..index]));
        }
        out.push(CommentaryPiece::Diagram(DiagramAttributes::parse(body)));
        start = body_start + close + 1;
        search = start;
    }

    if start < text.len() {
        out.push(CommentaryPiece::Text(&text[start..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_diagrams() {
        let plain = DiagramAttributes::default();
        assert_eq!(split_diagrams("plain"), vec![CommentaryPiece::Text("plain")]);
        assert_eq!(
            split_diagrams("before [PgnDiagram] after"),
            vec![
                CommentaryPiece::Text("before "),
                CommentaryPiece::Diagram(plain),
                CommentaryPiece::Text(" after"),
            ]
        );
        assert_eq!(split_diagrams("[pgndiagram]"), vec![CommentaryPiece::Diagram(plain)]);
    }

    #[test]
    fn test_split_diagrams_keeps_lookalikes_as_text() {
        assert_eq!(
            split_diagrams("[pgndiagrams] and [pgndiagram"),
            vec![CommentaryPiece::Text("[pgndiagrams] and [pgndiagram")]
        );
        assert_eq!(
            split_diagrams("[pgndiagramx] [pgndiagram]"),
            vec![
                CommentaryPiece::Text("[pgndiagramx] "),
                CommentaryPiece::Diagram(DiagramAttributes::default()),
            ]
        );
    }

    #[test]
    fn test_diagram_attributes() {
        let body = " flip=true SQUARE_SIZE=\"200\" show_coordinates=0 colorset=x";
        let attributes = DiagramAttributes::parse(body);
        assert_eq!(
            attributes,
            DiagramAttributes {
                flip: Some(true),
                square_size: Some(64),
                show_coordinates: Some(false),
            }
        );

        let ignored = DiagramAttributes::parse(" flip=maybe square_size=big lone");
        assert_eq!(ignored, DiagramAttributes::default());
    }

    #[test]
    fn test_diagram_attributes_override_base() {
        let base = BoardOptions {
            square_size: 40,
            show_coordinates: true,
            flip: false,
        };
        let attributes = DiagramAttributes {
            flip: Some(true),
            ..DiagramAttributes::default()
        };
        assert_eq!(
            attributes.apply(&base),
            BoardOptions {
                square_size: 40,
                show_coordinates: true,
                flip: true,
            }
        );
        assert_eq!(DiagramAttributes::default().apply(&base), base);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0, 30, false, 30), CommentaryStyle::Long);
        assert_eq!(classify(0, 29, false, 30), CommentaryStyle::Inline);
        assert_eq!(classify(0, 0, true, 30), CommentaryStyle::Long);
        assert_eq!(classify(1, 100, true, 30), CommentaryStyle::Inline);
    }

    #[test]
    fn test_move_label() {
        let document = chess::pgn::parse_games("1. e4 *").unwrap().remove(0);
        let node = document.tree.line(document.tree.main_line()).next().unwrap();
        let view = MoveView {
            node,
            number: Some("1.".into()),
            notation: "e4".into(),
            nags: vec!["!".into(), "\u{00b1}".into()],
            position: Position::starting(),
        };
        assert_eq!(view.label(), "1.e4 ! \u{00b1}");
    }
}
