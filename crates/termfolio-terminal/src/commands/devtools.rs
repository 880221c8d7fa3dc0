//! Developer tools: base64, wc, grep.
//!
//! Each reads its input from the arguments, which is where a pipeline puts
//! the previous stage's output.

use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::RegexBuilder;
use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart};

use crate::command::{Category, Command, CommandContext, CommandOutput};
use crate::registry::CommandRegistry;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Rc::new(Base64Cmd))?
        .register(Rc::new(WcCmd))?
        .register(Rc::new(GrepCmd))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// base64
// ---------------------------------------------------------------------------

struct Base64Cmd;
impl Command for Base64Cmd {
    fn name(&self) -> &str {
        "base64"
    }
    fn description(&self) -> &str {
        "Encode or decode base64"
    }
    fn usage(&self) -> &str {
        "base64 [-d] <text>"
    }
    fn category(&self) -> Category {
        Category::Devtools
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.args.is_empty() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let input = ctx.parsed.args.join(" ");
        if !ctx.parsed.has_flag("d") {
            return Ok(CommandOutput::text(&STANDARD.encode(input.as_bytes())));
        }
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        match STANDARD.decode(compact.as_bytes()) {
            Ok(bytes) => Ok(CommandOutput::text(&String::from_utf8_lossy(&bytes))),
            Err(e) => Ok(CommandOutput::error(format!("base64: invalid input: {e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// wc
// ---------------------------------------------------------------------------

struct WcCmd;
impl Command for WcCmd {
    fn name(&self) -> &str {
        "wc"
    }
    fn description(&self) -> &str {
        "Count lines, words, and characters"
    }
    fn usage(&self) -> &str {
        "wc [-l] [-w] [-c] <text>"
    }
    fn category(&self) -> Category {
        Category::Devtools
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let text = ctx.parsed.args.join(" ");
        let counts = [
            ("l", text.lines().count()),
            ("w", text.split_whitespace().count()),
            ("c", text.chars().count()),
        ];
        let selected: Vec<usize> = if ctx.parsed.has_any(&["l", "w", "c"]) {
            counts
                .iter()
                .filter(|(flag, _)| ctx.parsed.has_flag(flag))
                .map(|(_, n)| *n)
                .collect()
        } else {
            counts.iter().map(|(_, n)| *n).collect()
        };
        let row: Vec<String> = selected.iter().map(|n| format!("{n:>7}")).collect();
        Ok(CommandOutput::text(&row.concat()))
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Print lines matching a pattern"
    }
    fn usage(&self) -> &str {
        "grep [-i] [-v] <pattern> <text>"
    }
    fn category(&self) -> Category {
        Category::Devtools
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let parsed = ctx.parsed;
        if parsed.require_args(2).is_err() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let pattern = &parsed.args[0];
        let re = match RegexBuilder::new(pattern)
            .case_insensitive(parsed.has_flag("i"))
            .build()
        {
            Ok(re) => re,
            Err(e) => return Ok(CommandOutput::error(format!("grep: invalid pattern: {e}"))),
        };
        let invert = parsed.has_flag("v");
        let text = parsed.args[1..].join(" ");

        let mut lines = Vec::new();
        for line in text.lines() {
            if re.is_match(line) == invert {
                continue;
            }
            lines.push(if invert {
                OutputLine::text(line)
            } else {
                highlight(line, &re)
            });
        }
        if lines.is_empty() {
            return Ok(CommandOutput::failure(lines));
        }
        Ok(CommandOutput::new(lines))
    }
}

/// Split `line` into plain and highlighted parts around each match.
fn highlight(line: &str, re: &regex::Regex) -> OutputLine {
    let mut parts = Vec::new();
    let mut last = 0;
    for m in re.find_iter(line).filter(|m| !m.is_empty()) {
        if m.start() > last {
            parts.push(TextPart::plain(&line[last..m.start()]));
        }
        parts.push(TextPart::colored(m.as_str(), Color::Yellow));
        last = m.end();
    }
    if last < line.len() {
        parts.push(TextPart::plain(&line[last..]));
    }
    OutputLine::parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{session, texts};

    #[test]
    fn base64_of_piped_text() {
        let mut s = session();
        let out = s.run_line(r#"echo "hello world" | base64"#);
        assert_eq!(texts(&out), vec!["aGVsbG8gd29ybGQ="]);
    }

    #[test]
    fn base64_decode_round_trip() {
        let mut s = session();
        let out = s.run_line("echo termfolio | base64 | base64 -d");
        assert_eq!(texts(&out), vec!["termfolio"]);
    }

    #[test]
    fn base64_rejects_garbage() {
        let mut s = session();
        assert!(!s.run_line("base64 -d !!!").is_success());
        assert!(!s.run_line("base64").is_success());
    }

    #[test]
    fn wc_counts_piped_file() {
        let mut s = session();
        let out = s.run_line("cat /etc/motd | wc -l");
        assert_eq!(texts(&out), vec!["      1"]);
        let out = s.run_line("wc one two three");
        assert_eq!(texts(&out), vec!["      1      3     13"]);
    }

    #[test]
    fn grep_filters_and_highlights() {
        let mut s = session();
        let out = s.run_line("cat ~/about.txt | grep -i rust");
        assert_eq!(out.lines.len(), 1);
        assert!(out.lines[0].has_color(Color::Yellow));
        assert!(texts(&out)[0].contains("Rust"));
    }

    #[test]
    fn grep_invert_and_no_match_status() {
        let mut s = session();
        let out = s.run_line("cat ~/notes/todo.txt | grep -v kettle");
        assert_eq!(texts(&out), vec!["write more commands"]);
        let out = s.run_line("cat ~/notes/todo.txt | grep zebra");
        assert!(out.lines.is_empty());
        assert!(!out.is_success());
    }

    #[test]
    fn grep_outcome_drives_chains() {
        let mut s = session();
        let out = s.run_line("cat ~/about.txt | grep Rust && echo found");
        assert_eq!(texts(&out).last().map(String::as_str), Some("found"));
        let out = s.run_line("cat ~/about.txt | grep Cobol && echo found");
        assert!(!texts(&out).contains(&"found".to_string()));
    }

    #[test]
    fn grep_bad_pattern() {
        let mut s = session();
        assert!(!s.run_line("grep ( text").is_success());
    }

    #[test]
    fn highlight_splits_around_matches() {
        let re = regex::Regex::new("o").unwrap();
        let line = highlight("foo bar", &re);
        assert_eq!(line.plain_text(), "foo bar");
        assert!(line.has_color(Color::Yellow));
    }
}
