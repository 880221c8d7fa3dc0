//! termfolio command-line host.
//!
//! Reads lines from stdin, submits them to a [`Session`], and prints the
//! output. Animations are played to completion on the real clock, in
//! transcript order, before the next prompt. Pass `--json` to print each submission's output as a JSON
//! array instead of ANSI text. Type `exit` or send EOF to quit.

mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use termfolio_terminal::{Entry, Session};
use termfolio_types::config::TerminalConfig;
use termfolio_types::output::OutputLine;

/// Longest single sleep while waiting for the next frame.
const MAX_WAIT_MS: u64 = 250;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let json = std::env::args().skip(1).any(|a| a == "--json");
    let config_path = std::env::var("TERMFOLIO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("termfolio.toml"));
    let config = TerminalConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    log::info!("config from {}", config_path.display());

    let mut host = Host {
        session: Session::new(config)?,
        started: Instant::now(),
        json,
    };
    host.run()
}

struct Host {
    session: Session,
    started: Instant,
    json: bool,
}

impl Host {
    fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut line = String::new();
        loop {
            if !self.json {
                print!("{}", self.session.prompt());
                io::stdout().flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if matches!(line.trim(), "exit" | "quit") {
                break;
            }
            self.tick();
            self.submit(line)?;
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn tick(&mut self) {
        let now = self.now_ms();
        self.session.tick(now);
    }

    /// Submit a line and render what it added to the transcript, in order.
    fn submit(&mut self, line: &str) -> Result<()> {
        let before = self.session.transcript().len();
        self.session.submit(line);

        let entries = self.session.transcript().entries();
        let start = match entries.get(before) {
            Some(Entry::Line(l)) if l.is_command => before + 1,
            _ => {
                if !self.json {
                    print!("\x1b[2J\x1b[H");
                }
                0
            },
        };
        let mut collected = Vec::new();
        for entry in entries.into_iter().skip(start) {
            match entry {
                Entry::Line(l) if self.json => collected.push(l),
                Entry::Line(l) => self.print(std::slice::from_ref(&l))?,
                Entry::Region { id, .. } => collected.extend(self.play(&id)?),
            }
        }
        if self.json {
            self.print(&collected)?;
        }

        if let Some(takeover) = self.session.shell().takeover() {
            log::warn!("{takeover} needs a graphical host; returning to the prompt");
            self.session.end_takeover();
        }
        Ok(())
    }

    /// Repaint one live region in place until its animation stops. Returns
    /// the last frame.
    fn play(&mut self, id: &str) -> Result<Vec<OutputLine>> {
        let mut painted = 0usize;
        loop {
            let frame = self.session.transcript().region(id).unwrap_or_default();
            if !self.json {
                let mut out = io::stdout().lock();
                if painted > 0 {
                    write!(out, "\x1b[{painted}A\x1b[J")?;
                }
                for l in &frame {
                    writeln!(out, "{}", render::line(l))?;
                }
                out.flush()?;
                painted = frame.len();
            }
            if !self.session.animations().is_active(id) {
                return Ok(frame);
            }
            let Some(due) = self.session.next_due() else {
                return Ok(frame);
            };
            let wait = due.saturating_sub(self.now_ms()).min(MAX_WAIT_MS);
            thread::sleep(Duration::from_millis(wait));
            self.tick();
        }
    }

    fn print(&self, lines: &[OutputLine]) -> Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            writeln!(out, "{}", render::json(lines)?)?;
        } else {
            for l in lines {
                writeln!(out, "{}", render::line(l))?;
            }
        }
        Ok(())
    }
}
