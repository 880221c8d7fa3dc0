//! ANSI rendering of output lines.

use colored::{ColoredString, Colorize};
use termfolio_types::error::Result;
use termfolio_types::output::{Color, LineContent, OutputLine};

fn ansi(color: Color) -> colored::Color {
    match color {
        Color::Red => colored::Color::Red,
        Color::Green => colored::Color::Green,
        Color::Yellow => colored::Color::Yellow,
        Color::Blue => colored::Color::Blue,
        Color::Magenta => colored::Color::Magenta,
        Color::Cyan => colored::Color::Cyan,
        Color::White => colored::Color::White,
        Color::Gray => colored::Color::BrightBlack,
    }
}

fn paint(text: &str, color: Option<Color>) -> ColoredString {
    match color {
        Some(c) => text.color(ansi(c)),
        None => text.normal(),
    }
}

/// Render one line for a color terminal.
pub fn line(line: &OutputLine) -> String {
    let mut out = match &line.content {
        LineContent::Text { text, color } => paint(text, *color).to_string(),
        LineContent::Parts { parts } => parts
            .iter()
            .map(|p| paint(&p.text, p.color).to_string())
            .collect(),
        LineContent::Empty => String::new(),
    };
    if let Some(url) = &line.url
        && !out.contains(url.as_str())
    {
        out.push_str(&format!(" {}", url.as_str().underline().dimmed()));
    }
    if line.is_command {
        out = out.bold().to_string();
    }
    out
}

/// Render a block of lines as JSON, one array per call.
pub fn json(lines: &[OutputLine]) -> Result<String> {
    Ok(serde_json::to_string(lines)?)
}

#[cfg(test)]
mod tests {
    use termfolio_types::output::TextPart;

    use super::*;

    #[test]
    fn plain_text_survives_without_color() {
        colored::control::set_override(false);
        let l = OutputLine::parts(vec![
            TextPart::colored("ok", Color::Green),
            TextPart::plain(" done"),
        ]);
        assert_eq!(line(&l), "ok done");
        assert_eq!(line(&OutputLine::empty()), "");
    }

    #[test]
    fn url_is_appended_once() {
        colored::control::set_override(false);
        let l = OutputLine::text("github").with_url("https://github.com/example");
        assert_eq!(line(&l), "github https://github.com/example");
        let l = OutputLine::text("https://x.dev").with_url("https://x.dev");
        assert_eq!(line(&l), "https://x.dev");
    }

    #[test]
    fn json_is_an_array() {
        let out = json(&[OutputLine::error("bad")]).unwrap();
        assert!(out.starts_with('['));
        assert!(out.contains("\"red\""));
    }
}
