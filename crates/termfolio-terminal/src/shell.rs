//! Per-session shell state: working directory, history, aliases, and the
//! signals a command can raise for the host.

use std::collections::{BTreeMap, VecDeque};

use crate::patterns::{Pattern, find_patterns_outside_quotes};

/// Cosmetic display mode toggled by `crt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Normal,
    Crt,
}

/// Mutable state shared by every command in one session.
#[derive(Debug, Clone)]
pub struct ShellState {
    /// Current working directory (absolute VFS path).
    pub cwd: String,
    /// Home directory that `~` expands to.
    pub home: String,
    history: VecDeque<String>,
    history_limit: usize,
    aliases: BTreeMap<String, String>,
    takeover: Option<String>,
    display_mode: DisplayMode,
    clear_requested: bool,
}

impl ShellState {
    pub fn new(home: impl Into<String>, history_limit: usize) -> Self {
        let home = home.into();
        Self {
            cwd: home.clone(),
            home,
            history: VecDeque::new(),
            history_limit,
            aliases: BTreeMap::new(),
            takeover: None,
            display_mode: DisplayMode::Normal,
            clear_requested: false,
        }
    }

    // -- History --

    /// Record a submitted line. Consecutive duplicates are collapsed.
    pub fn push_history(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.history.back().is_some_and(|last| last == line) {
            return;
        }
        self.history.push_back(line.to_string());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // -- Aliases --

    pub fn set_alias(&mut self, name: &str, expansion: &str) {
        self.aliases
            .insert(name.to_lowercase(), expansion.trim().to_string());
    }

    /// Remove an alias. Returns whether it existed.
    pub fn unset_alias(&mut self, name: &str) -> bool {
        self.aliases.remove(&name.to_lowercase()).is_some()
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(&name.to_lowercase()).map(String::as_str)
    }

    /// All aliases, sorted by name.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rewrite the first word of `segment` if it names an alias.
    ///
    /// Expansion is applied once; an alias that expands to its own name is
    /// not expanded again.
    pub fn expand_alias(&self, segment: &str) -> String {
        let trimmed = segment.trim_start();
        let (first, rest) = match trimmed.find(char::is_whitespace) {
            Some(pos) => trimmed.split_at(pos),
            None => (trimmed, ""),
        };
        match self.alias(first) {
            Some(expansion) => format!("{expansion}{rest}"),
            None => segment.to_string(),
        }
    }

    /// Expand aliases at the start of every `&&`, `||`, `;`, and `|` segment
    /// of a whole input line.
    ///
    /// Runs before the line is routed, so operators inside an expansion are
    /// honoured. Operators inside quotes do not start a segment.
    pub fn expand_aliases_in_line(&self, line: &str) -> String {
        if self.aliases.is_empty() {
            return line.to_string();
        }
        let operators: [Pattern; 4] = ["&&".into(), "||".into(), ";".into(), "|".into()];
        let mut out = String::with_capacity(line.len());
        let mut start = 0;
        for m in find_patterns_outside_quotes(line, &operators) {
            out.push_str(&self.expand_alias(&line[start..m.index]));
            out.push_str(&line[m.index..m.end()]);
            start = m.end();
        }
        out.push_str(&self.expand_alias(&line[start..]));
        out
    }

    // -- Host signals --

    /// Identifier of the active full-screen takeover (e.g. a game).
    pub fn takeover(&self) -> Option<&str> {
        self.takeover.as_deref()
    }

    pub fn set_takeover(&mut self, id: Option<String>) {
        self.takeover = id;
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Flip between normal and CRT display. Returns the new mode.
    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = match self.display_mode {
            DisplayMode::Normal => DisplayMode::Crt,
            DisplayMode::Crt => DisplayMode::Normal,
        };
        self.display_mode
    }

    /// Ask the session to wipe the transcript once the current line finishes.
    pub fn request_clear(&mut self) {
        self.clear_requested = true;
    }

    pub(crate) fn take_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.clear_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home() {
        let shell = ShellState::new("/home/guest", 10);
        assert_eq!(shell.cwd, "/home/guest");
    }

    #[test]
    fn history_collapses_consecutive_duplicates() {
        let mut shell = ShellState::new("/", 10);
        shell.push_history("ls");
        shell.push_history("ls");
        shell.push_history("pwd");
        shell.push_history("ls");
        shell.push_history("   ");
        assert_eq!(shell.history().collect::<Vec<_>>(), vec!["ls", "pwd", "ls"]);
    }

    #[test]
    fn history_is_capped() {
        let mut shell = ShellState::new("/", 3);
        for i in 0..5 {
            shell.push_history(&format!("echo {i}"));
        }
        assert_eq!(
            shell.history().collect::<Vec<_>>(),
            vec!["echo 2", "echo 3", "echo 4"]
        );
    }

    #[test]
    fn alias_expands_first_word_only() {
        let mut shell = ShellState::new("/", 10);
        shell.set_alias("LL", "ls -l");
        assert_eq!(shell.expand_alias("ll /etc"), "ls -l /etc");
        assert_eq!(shell.expand_alias("echo ll"), "echo ll");
        assert_eq!(shell.expand_alias("ll"), "ls -l");
    }

    #[test]
    fn self_referencing_alias_expands_once() {
        let mut shell = ShellState::new("/", 10);
        shell.set_alias("ls", "ls -a");
        assert_eq!(shell.expand_alias("ls x"), "ls -a x");
    }

    #[test]
    fn line_expansion_covers_every_segment() {
        let mut shell = ShellState::new("/", 10);
        shell.set_alias("both", "echo a && echo b");
        shell.set_alias("up", "base64");
        assert_eq!(
            shell.expand_aliases_in_line("both; echo x | up"),
            "echo a && echo b; echo x |base64"
        );
        assert_eq!(shell.expand_aliases_in_line("echo 'both | up'"), "echo 'both | up'");
    }

    #[test]
    fn unset_alias_reports_presence() {
        let mut shell = ShellState::new("/", 10);
        shell.set_alias("g", "grep");
        assert!(shell.unset_alias("g"));
        assert!(!shell.unset_alias("g"));
    }

    #[test]
    fn display_mode_toggles() {
        let mut shell = ShellState::new("/", 10);
        assert_eq!(shell.toggle_display_mode(), DisplayMode::Crt);
        assert_eq!(shell.toggle_display_mode(), DisplayMode::Normal);
    }

    #[test]
    fn clear_request_is_consumed() {
        let mut shell = ShellState::new("/", 10);
        shell.request_clear();
        assert!(shell.take_clear_request());
        assert!(!shell.take_clear_request());
    }
}
