//! Styled output lines.
//!
//! Every command produces a list of [`OutputLine`]s. A line is either a
//! single run of text with an optional color, a sequence of differently
//! colored parts, or empty. Colors are purely cosmetic; success and failure
//! travel separately (see `ExitStatus` in the terminal crate).

use serde::{Deserialize, Serialize};

/// Named display colors understood by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
}

impl Color {
    /// Lowercase color name, as used in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
            Self::Gray => "gray",
        }
    }
}

/// One colored run inside a multi-part line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TextPart {
    pub fn new(text: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self::new(text, Some(color))
    }
}

/// What a line displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineContent {
    /// A single run of text.
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
    },
    /// Several runs, each with its own color.
    Parts { parts: Vec<TextPart> },
    /// A blank line.
    Empty,
}

/// A single rendered line of terminal output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub content: LineContent,
    /// Target URL when the line renders as a link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Marks the echoed prompt line of a submitted command.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_command: bool,
    /// Free-form style tag passed through to the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl OutputLine {
    fn from_content(content: LineContent) -> Self {
        Self {
            content,
            url: None,
            is_command: false,
            class: None,
        }
    }

    /// Uncolored text line.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_content(LineContent::Text {
            text: text.into(),
            color: None,
        })
    }

    /// Colored text line.
    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self::from_content(LineContent::Text {
            text: text.into(),
            color: Some(color),
        })
    }

    /// Red text line, the conventional styling for errors.
    pub fn error(text: impl Into<String>) -> Self {
        Self::colored(text, Color::Red)
    }

    /// Multi-part line.
    pub fn parts(parts: Vec<TextPart>) -> Self {
        Self::from_content(LineContent::Parts { parts })
    }

    pub fn empty() -> Self {
        Self::from_content(LineContent::Empty)
    }

    /// Turn the line into a link to `url`.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach a renderer style tag.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Mark as an echoed command line.
    pub fn as_command(mut self) -> Self {
        self.is_command = true;
        self
    }

    /// Plain text of the line with all styling dropped.
    pub fn plain_text(&self) -> String {
        match &self.content {
            LineContent::Text { text, .. } => text.clone(),
            LineContent::Parts { parts } => parts.iter().map(|p| p.text.as_str()).collect(),
            LineContent::Empty => String::new(),
        }
    }

    /// Whether the line or any of its parts is styled with `color`.
    pub fn has_color(&self, color: Color) -> bool {
        match &self.content {
            LineContent::Text { color: c, .. } => *c == Some(color),
            LineContent::Parts { parts } => parts.iter().any(|p| p.color == Some(color)),
            LineContent::Empty => false,
        }
    }
}

/// Split multi-line text into uncolored lines.
pub fn text_lines(text: &str) -> Vec<OutputLine> {
    text.lines().map(OutputLine::text).collect()
}
