//! Plain-text output of rendered games.

use viewer::{CommentarySegment, CommentaryStyle, CommentaryView, GameView, RenderNode};

/// Headers, then the move text with side lines in parentheses. Long
/// commentary and diagrams get their own paragraphs.
pub fn game_to_text(game: &GameView) -> String {
    let mut writer = TextWriter::default();

    let players = match (&game.headers.white, &game.headers.black) {
        (Some(white), Some(black)) => Some(format!("{} - {}", white, black)),
        (Some(white), None) => Some(white.to_string()),
        (None, Some(black)) => Some(black.to_string()),
        (None, None) => None,
    };
    let mut has_headers = false;
    if let Some(players) = players {
        writer.out.push_str(&players);
        writer.out.push('\n');
        has_headers = true;
    }
    if let Some(event) = &game.headers.event {
        writer.out.push_str(&event.to_string());
        writer.out.push('\n');
        has_headers = true;
    }
    if has_headers {
        writer.out.push('\n');
    }

    writer.nodes(&game.moves);
    writer.flush();
    writer.out
}

#[derive(Default)]
struct TextWriter {
    out: String,
    words: Vec<String>,
    /// Opening parentheses waiting for the next word.
    prefix: String,
}

impl TextWriter {
    fn nodes(&mut self, nodes: &[RenderNode]) {
        for node in nodes {
            match node {
                RenderNode::Move(view) => self.word(&view.label()),
                RenderNode::Commentary(view) => self.commentary(view),
                RenderNode::Variation { children, .. } => {
                    self.prefix.push('(');
                    self.nodes(children);
                    self.close();
                }
                RenderNode::Result { text } => self.word(text),
            }
        }
    }

    fn commentary(&mut self, view: &CommentaryView) {
        let long = view.style == CommentaryStyle::Long;
        if long {
            self.flush();
        }
        for segment in &view.segments {
            match segment {
                CommentarySegment::Text { text } if long => {
                    self.out.push_str(text.trim());
                    self.out.push_str("\n\n");
                }
                CommentarySegment::Text { text } => self.word(&format!("{{{}}}", text.trim())),
                CommentarySegment::Diagram { board } => {
                    self.flush();
                    self.out.push_str(&board.to_text());
                    self.out.push('\n');
                }
            }
        }
    }

    fn word(&mut self, word: &str) {
        let prefixed = format!("{}{}", std::mem::take(&mut self.prefix), word);
        self.words.push(prefixed);
    }

    fn close(&mut self) {
        if !self.prefix.is_empty() {
            self.word(")");
            return;
        }
        match self.words.last_mut() {
            Some(last) => last.push(')'),
            None => self.words.push(")".to_string()),
        }
    }

    fn flush(&mut self) {
        if self.words.is_empty() {
            return;
        }
        self.out.push_str(&self.words.join(" "));
        self.out.push_str("\n\n");
        self.words.clear();
    }
}
