//! A terminal session: everything one visitor's terminal owns.
//!
//! The session is the only place the registry, animation runtime, VFS, and
//! shell state meet. Hosts create one, feed it input lines with
//! [`Session::submit`], and drive its clock with [`Session::tick`].

use termfolio_types::config::TerminalConfig;
use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart};
use termfolio_vfs::{EntryKind, MemoryVfs, Vfs, display_path, resolve_path};

use crate::animation::{AnimationRegistry, AnimationRuntime};
use crate::args::{ArgumentParser, ParsedCommand};
use crate::command::{CommandContext, CommandOutput};
use crate::commands::register_builtins;
use crate::completion::get_completions;
use crate::dispatch::{Executor, execute_line};
use crate::patterns::{Pattern, find_patterns_outside_quotes};
use crate::registry::CommandRegistry;
use crate::shell::ShellState;
use crate::timer::TimerQueue;
use crate::transcript::Transcript;

/// One interactive terminal.
pub struct Session {
    config: TerminalConfig,
    parser: ArgumentParser,
    registry: CommandRegistry,
    runtime: AnimationRuntime,
    vfs: MemoryVfs,
    shell: ShellState,
    /// Set while [`Session::submit`] runs; finished segments go to the
    /// transcript.
    echo: bool,
}

impl Session {
    /// A session with every built-in command registered.
    pub fn new(config: TerminalConfig) -> Result<Self> {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry)?;
        Ok(Self::with_registry(config, registry))
    }

    /// A session over a caller-built command table.
    pub fn with_registry(config: TerminalConfig, registry: CommandRegistry) -> Self {
        let runtime = AnimationRuntime::new(TimerQueue::new(), Transcript::new(), &config.animation);
        Self {
            parser: ArgumentParser::new(config.limits),
            vfs: MemoryVfs::seeded(&config.home),
            shell: ShellState::new(config.home.clone(), config.history_limit),
            registry,
            runtime,
            config,
            echo: false,
        }
    }

    // -- input --------------------------------------------------------------

    /// Run a line the way a user typing it would.
    ///
    /// Echoes the prompt and line into the transcript, records history, and
    /// runs the line. Each segment's output is appended as that segment
    /// finishes, so static lines and live regions keep execution order.
    /// Returns the combined output as well.
    pub fn submit(&mut self, line: &str) -> CommandOutput {
        self.runtime.transcript().push(self.prompt_line(line));
        self.shell.push_history(line);
        self.echo = true;
        let output = self.run_line(line);
        self.echo = false;
        output
    }

    /// Run a line without touching the transcript or history.
    ///
    /// Session aliases are expanded on the first word of every segment
    /// before routing, so an alias may itself contain `&&`, `;`, or `|`.
    /// Animated commands still paint their regions into the transcript.
    pub fn run_line(&mut self, line: &str) -> CommandOutput {
        let line = self.shell.expand_aliases_in_line(line);
        execute_line(&line, self)
    }

    /// Advance the session clock, firing due timers. Returns how many fired.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        self.runtime.timers().advance_to(now_ms)
    }

    /// Return to a fresh session: no animations, timers, output, history,
    /// aliases, or file changes. The clock keeps its time.
    pub fn reset(&mut self) {
        self.runtime.registry().stop_all();
        self.runtime.timers().clear();
        self.runtime.transcript().clear();
        self.vfs.reset_to_seed();
        self.shell = ShellState::new(self.config.home.clone(), self.config.history_limit);
        log::info!("session reset");
    }

    /// Release the full-screen takeover, if any.
    pub fn end_takeover(&mut self) {
        self.shell.set_takeover(None);
    }

    // -- completion ---------------------------------------------------------

    /// Completions for the word under the cursor at the end of `line`.
    ///
    /// The first word of a segment completes against command names and
    /// session aliases. Later words complete against paths, with
    /// directories suffixed by `/`.
    pub fn complete(&self, line: &str) -> Vec<String> {
        let operators: [Pattern; 4] = ["&&".into(), "||".into(), ";".into(), "|".into()];
        let segment_start = find_patterns_outside_quotes(line, &operators)
            .last()
            .map_or(0, |m| m.end());
        let segment = line[segment_start..].trim_start();

        match segment.rsplit_once(char::is_whitespace) {
            None => {
                let mut names: Vec<&str> = self.registry.get_visible_names();
                names.extend(self.shell.aliases().map(|(name, _)| name));
                get_completions(segment, &names)
            },
            Some((_, word)) => self.complete_path(word),
        }
    }

    fn complete_path(&self, word: &str) -> Vec<String> {
        let (dir_part, prefix) = match word.rfind('/') {
            Some(i) => (&word[..=i], &word[i + 1..]),
            None => ("", word),
        };
        let dir = if dir_part.is_empty() {
            self.shell.cwd.clone()
        } else {
            resolve_path(&self.shell.cwd, dir_part, &self.shell.home)
        };
        let Ok(entries) = self.vfs.readdir(&dir) else {
            return Vec::new();
        };
        entries
            .into_iter()
            .filter(|e| e.name.starts_with(prefix))
            .filter(|e| prefix.starts_with('.') || !e.name.starts_with('.'))
            .map(|e| {
                let slash = if e.kind == EntryKind::Directory { "/" } else { "" };
                format!("{dir_part}{}{slash}", e.name)
            })
            .collect()
    }

    // -- accessors ----------------------------------------------------------

    /// The prompt shown before input, e.g. `guest@termfolio:~$ `.
    pub fn prompt(&self) -> String {
        let p = &self.config.prompt;
        format!(
            "{}@{}:{}{} ",
            p.user,
            p.host,
            display_path(&self.shell.cwd, &self.shell.home),
            p.symbol
        )
    }

    fn prompt_line(&self, line: &str) -> OutputLine {
        OutputLine::parts(vec![
            TextPart::colored(self.prompt(), Color::Green),
            TextPart::plain(line),
        ])
        .as_command()
    }

    pub fn transcript(&self) -> &Transcript {
        self.runtime.transcript()
    }

    pub fn animations(&self) -> &AnimationRegistry {
        self.runtime.registry()
    }

    /// Current session time in milliseconds.
    pub fn now(&self) -> u64 {
        self.runtime.timers().now()
    }

    /// When the next timer is due, if any is pending.
    pub fn next_due(&self) -> Option<u64> {
        self.runtime.timers().next_due()
    }

    pub fn shell(&self) -> &ShellState {
        &self.shell
    }

    pub fn vfs(&self) -> &MemoryVfs {
        &self.vfs
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }
}

impl Executor for Session {
    fn parse(&self, segment: &str) -> ParsedCommand {
        self.parser.parse(segment)
    }

    fn is_registered(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    fn run(&mut self, parsed: &ParsedCommand) -> Result<CommandOutput> {
        let mut ctx = CommandContext {
            parsed,
            vfs: &mut self.vfs,
            shell: &mut self.shell,
            registry: &self.registry,
            runtime: &self.runtime,
            config: &self.config,
        };
        self.registry.execute(&parsed.command, &mut ctx)
    }

    /// A `clear` wipes everything written before it, then the segment's own
    /// lines are appended when echoing.
    fn segment_finished(&mut self, output: &CommandOutput) {
        if self.shell.take_clear_request() {
            self.runtime.registry().stop_all();
            self.runtime.transcript().clear();
        }
        if self.echo {
            self.runtime.transcript().extend(output.lines.iter().cloned());
        }
    }
}


#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::testing::{session, texts};
    use super::*;
    use crate::command::{Category, CommandDef};
    use crate::transcript::Entry;

    #[test]
    fn submit_echoes_prompt_and_records_history() {
        let mut s = session();
        let out = s.submit("echo hi");
        assert_eq!(texts(&out), vec!["hi"]);
        let lines = s.transcript().lines();
        assert_eq!(lines[0].plain_text(), "guest@termfolio:~$ echo hi");
        assert!(lines[0].is_command);
        assert_eq!(lines[1].plain_text(), "hi");
        assert_eq!(s.shell().history().collect::<Vec<_>>(), vec!["echo hi"]);
    }

    #[test]
    fn run_line_leaves_transcript_and_history_alone() {
        let mut s = session();
        s.run_line("echo quiet");
        assert!(s.transcript().is_empty());
        assert_eq!(s.shell().history_len(), 0);
    }

    #[test]
    fn unknown_command_is_reported() {
        let mut s = session();
        let out = s.run_line("frobnicate --now");
        assert!(!out.is_success());
        assert_eq!(texts(&out), vec!["command not found: frobnicate"]);
    }

    #[test]
    fn prompt_tracks_cwd() {
        let mut s = session();
        s.run_line("cd /etc");
        assert_eq!(s.prompt(), "guest@termfolio:/etc$ ");
    }

    #[test]
    fn oversized_input_is_an_error_line() {
        let mut config = TerminalConfig::default();
        config.limits.max_input_length = 10;
        let mut s = Session::new(config).unwrap();
        let out = s.run_line("echo this is far too long");
        assert!(!out.is_success());
        assert!(texts(&out)[0].starts_with("Input too long"));
    }

    #[test]
    fn chain_continues_past_unknown_command_but_pipe_aborts() {
        let mut s = session();
        let out = s.run_line("nope ; echo after");
        assert_eq!(texts(&out).last().map(String::as_str), Some("after"));
        let out = s.run_line("echo x | nope | base64");
        assert_eq!(texts(&out), vec!["pipe: nope: command not found"]);
    }

    #[test]
    fn clear_empties_transcript_and_stops_animations() {
        let mut s = session();
        s.submit("echo one");
        s.submit("spinner");
        assert_eq!(s.animations().len(), 1);
        let out = s.submit("clear");
        assert!(out.lines.is_empty());
        assert!(s.transcript().is_empty());
        assert!(s.animations().is_empty());
        s.tick(500);
        assert!(s.transcript().is_empty());
    }

    #[test]
    fn clear_inside_chain_keeps_later_output() {
        let mut s = session();
        s.submit("echo before");
        s.submit("echo a ; clear ; echo b");
        let lines: Vec<String> = s
            .transcript()
            .lines()
            .iter()
            .map(OutputLine::plain_text)
            .collect();
        assert_eq!(lines, vec!["b"]);
    }

    #[test]
    fn chained_lines_and_regions_keep_execution_order() {
        let mut s = session();
        s.submit("echo first ; spinner ; echo last");
        let entries = s.transcript().entries();
        assert_eq!(entries.len(), 4);
        assert!(matches!(&entries[0], Entry::Line(l) if l.is_command));
        assert!(matches!(&entries[1], Entry::Line(l) if l.plain_text() == "first"));
        assert!(matches!(&entries[2], Entry::Region { .. }));
        assert!(matches!(&entries[3], Entry::Line(l) if l.plain_text() == "last"));
    }

    #[test]
    fn failed_segments_are_written_in_place() {
        let mut s = session();
        s.submit("nope ; spinner");
        let entries = s.transcript().entries();
        assert!(
            matches!(&entries[1], Entry::Line(l) if l.plain_text() == "command not found: nope")
        );
        assert!(matches!(&entries[2], Entry::Region { .. }));
    }

    #[test]
    fn alias_with_operators_is_routed_as_a_chain() {
        let mut s = session();
        s.run_line("alias both='echo a && echo b'");
        assert_eq!(texts(&s.run_line("both")), vec!["a", "b"]);
        s.run_line("alias shout='echo hey | base64'");
        assert_eq!(texts(&s.run_line("shout ; echo done")), vec!["aGV5", "done"]);
    }

    #[test]
    fn self_referencing_alias_expands_once() {
        let mut s = session();
        s.run_line("alias echo='echo loud'");
        assert_eq!(texts(&s.run_line("echo x")), vec!["loud x"]);
    }

    #[test]
    fn region_sits_after_its_prompt_line() {
        let mut s = session();
        s.submit("spinner");
        s.submit("echo next");
        let entries = s.transcript().entries();
        assert!(matches!(&entries[0], Entry::Line(l) if l.is_command));
        assert!(matches!(&entries[1], Entry::Region { .. }));
        assert!(matches!(&entries[2], Entry::Line(l) if l.is_command));
    }

    #[test]
    fn reset_restores_seed_and_forgets_state() {
        let mut s = session();
        s.submit("rm -r ~/notes");
        s.submit("alias x='echo x'");
        s.submit("cd /etc");
        s.submit("matrix");
        s.reset();
        assert!(s.vfs().is_dir("/home/guest/notes"));
        assert!(s.animations().is_empty());
        assert!(s.transcript().is_empty());
        assert_eq!(s.shell().history_len(), 0);
        assert_eq!(s.shell().alias("x"), None);
        assert_eq!(s.shell().cwd, "/home/guest");
    }

    #[test]
    fn ticks_drive_the_clock() {
        let mut s = session();
        assert_eq!(s.now(), 0);
        s.submit("spinner --seconds=1");
        assert!(s.tick(1_000) > 0);
        assert_eq!(s.now(), 1_000);
    }

    #[test]
    fn complete_command_names_and_aliases() {
        let mut s = session();
        assert_eq!(s.complete("pw"), vec!["pwd"]);
        assert!(!s.complete("").contains(&"sudo".to_string()));
        s.run_line("alias gs='status'");
        assert!(s.complete("g").contains(&"gs".to_string()));
        assert_eq!(s.complete("echo hi && wh"), vec!["whoami"]);
    }

    #[test]
    fn complete_paths() {
        let s = session();
        assert_eq!(s.complete("cat ab"), vec!["about.txt"]);
        assert_eq!(s.complete("cd pro"), vec!["projects/"]);
        assert_eq!(
            s.complete("ls projects/"),
            vec!["projects/ideas.txt", "projects/termfolio/"]
        );
        assert!(s.complete("cat /nowhere/x").is_empty());
    }

    #[test]
    fn custom_registry() {
        let mut reg = CommandRegistry::new();
        reg.register(Rc::new(
            CommandDef::builder("ping")
                .description("Reply")
                .category(Category::System)
                .handler(|_| Ok(CommandOutput::text("pong")))
                .build()
                .unwrap(),
        ))
        .unwrap();
        let mut s = Session::with_registry(TerminalConfig::default(), reg);
        assert_eq!(texts(&s.run_line("ping")), vec!["pong"]);
        assert!(!s.run_line("help").is_success());
    }
}
