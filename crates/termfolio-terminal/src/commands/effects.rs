//! Visual effects: matrix, spinner, crt.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart};

use crate::animation::{Animation, AnimationHandle, Frame, animate_continuous, animate_frames, animated_command};
use crate::args::ParsedCommand;
use crate::command::{Category, Command, CommandContext, CommandDef, CommandOutput};
use crate::registry::CommandRegistry;
use crate::shell::DisplayMode;

const RAIN_WIDTH: usize = 48;
const RAIN_HEIGHT: usize = 10;
const RAIN_TRAIL: usize = 6;
const RAIN_GLYPHS: &[u8] = b"0123456789ABCDEFZ:.=*+-<>|";
const MATRIX_SECONDS: u64 = 5;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const SPINNER_DELAY_MS: u64 = 100;
const SPINNER_SECONDS: u64 = 3;

/// Longest an effect may run.
const MAX_SECONDS: u64 = 60;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    let matrix = CommandDef::builder("matrix")
        .description("Digital rain")
        .usage("matrix [--seconds=N]")
        .category(Category::Effects)
        .boxed_handler(animated_command("matrix", Rc::new(MatrixRain)))
        .build()?;
    let spinner = CommandDef::builder("spinner")
        .description("Show a busy spinner")
        .usage("spinner [message...] [--seconds=N]")
        .category(Category::Effects)
        .boxed_handler(animated_command("spinner", Rc::new(Spinner)))
        .build()?;
    reg.register(Rc::new(matrix))?
        .register(Rc::new(spinner))?
        .register(Rc::new(CrtCmd))?;
    Ok(())
}

/// `--seconds=N`, clamped to `1..=MAX_SECONDS`.
fn seconds(parsed: &ParsedCommand, default: u64) -> u64 {
    parsed
        .option_value("seconds")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
        .clamp(1, MAX_SECONDS)
}

// ---------------------------------------------------------------------------
// matrix
// ---------------------------------------------------------------------------

struct MatrixRain;
impl Animation for MatrixRain {
    fn start(&self, handle: &AnimationHandle, _parsed: &ParsedCommand) -> Result<()> {
        animate_continuous(handle, render_rain, handle.default_fps());
        Ok(())
    }

    fn duration_ms(&self, parsed: &ParsedCommand) -> Option<u64> {
        Some(seconds(parsed, MATRIX_SECONDS) * 1000)
    }
}

/// SplitMix64 step, used as a cheap deterministic hash.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn render_rain(elapsed_ms: u64) -> Vec<OutputLine> {
    let cycle = (RAIN_HEIGHT + RAIN_TRAIL) as u64;
    let flicker = elapsed_ms / 150;
    let heads: Vec<u64> = (0..RAIN_WIDTH as u64)
        .map(|col| {
            let seed = mix(col);
            let speed = 40 + seed % 80;
            (elapsed_ms / speed + seed) % cycle
        })
        .collect();

    (0..RAIN_HEIGHT as u64)
        .map(|row| {
            let text: String = heads
                .iter()
                .enumerate()
                .map(|(col, &head)| {
                    if head < row || head - row > RAIN_TRAIL as u64 {
                        return ' ';
                    }
                    let pick = mix(col as u64 ^ (row << 16) ^ (flicker << 32));
                    char::from(RAIN_GLYPHS[(pick % RAIN_GLYPHS.len() as u64) as usize])
                })
                .collect();
            OutputLine::colored(text, Color::Green).with_class("matrix")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// spinner
// ---------------------------------------------------------------------------

struct Spinner;
impl Animation for Spinner {
    fn start(&self, handle: &AnimationHandle, parsed: &ParsedCommand) -> Result<()> {
        let message = if parsed.args.is_empty() {
            "working".to_string()
        } else {
            parsed.args.join(" ")
        };
        let frames: Vec<Frame> = SPINNER_FRAMES
            .into_iter()
            .map(|glyph| {
                let message = message.clone();
                Box::new(move || {
                    vec![OutputLine::parts(vec![
                        TextPart::colored(glyph, Color::Cyan),
                        TextPart::plain(format!(" {message}...")),
                    ])]
                }) as Frame
            })
            .collect();
        animate_frames(handle, frames, SPINNER_DELAY_MS);

        let finisher = handle.clone();
        handle.schedule(seconds(parsed, SPINNER_SECONDS) * 1000, move || {
            finisher.update_output(vec![OutputLine::parts(vec![
                TextPart::colored("done", Color::Green),
                TextPart::plain(format!(" {message}")),
            ])]);
            finisher.cleanup();
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// crt
// ---------------------------------------------------------------------------

struct CrtCmd;
impl Command for CrtCmd {
    fn name(&self) -> &str {
        "crt"
    }
    fn description(&self) -> &str {
        "Toggle the CRT display effect"
    }
    fn usage(&self) -> &str {
        "crt"
    }
    fn category(&self) -> Category {
        Category::Effects
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let text = match ctx.shell.toggle_display_mode() {
            DisplayMode::Crt => "CRT mode enabled",
            DisplayMode::Normal => "CRT mode disabled",
        };
        Ok(CommandOutput::line(OutputLine::colored(text, Color::Green)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{session, texts};

    #[test]
    fn rain_has_fixed_dimensions() {
        let frame = render_rain(1234);
        assert_eq!(frame.len(), RAIN_HEIGHT);
        assert!(frame.iter().all(|l| l.plain_text().chars().count() == RAIN_WIDTH));
    }

    #[test]
    fn rain_changes_over_time() {
        assert_ne!(render_rain(0), render_rain(2_000));
    }

    #[test]
    fn matrix_paints_then_stops_after_duration() {
        let mut s = session();
        let out = s.submit("matrix --seconds=2");
        assert!(out.is_success());
        assert!(out.lines.is_empty());

        let ids = s.animations().ids();
        assert_eq!(ids.len(), 1);
        assert!(ids[0].starts_with("matrix-"));
        let first = s.transcript().region(&ids[0]).unwrap();
        assert_eq!(first.len(), RAIN_HEIGHT);

        s.tick(500);
        assert_ne!(s.transcript().region(&ids[0]).unwrap(), first);

        s.tick(2_000);
        assert!(s.animations().is_empty());
        let frozen = s.transcript().region(&ids[0]).unwrap();
        s.tick(3_000);
        assert_eq!(s.transcript().region(&ids[0]).unwrap(), frozen);
    }

    #[test]
    fn spinner_cycles_and_finishes() {
        let mut s = session();
        s.submit("spinner compiling --seconds=1");
        let id = s.animations().ids().remove(0);
        let region = |s: &crate::session::Session| -> Vec<String> {
            s.transcript()
                .region(&id)
                .unwrap()
                .iter()
                .map(OutputLine::plain_text)
                .collect()
        };
        assert_eq!(region(&s), vec!["| compiling..."]);
        s.tick(100);
        assert_eq!(region(&s), vec!["/ compiling..."]);
        s.tick(1_000);
        assert_eq!(region(&s), vec!["done compiling"]);
        assert!(s.animations().is_empty());
    }

    #[test]
    fn two_spinners_paint_separate_regions() {
        let mut s = session();
        s.submit("spinner a");
        s.submit("spinner b");
        assert_eq!(s.animations().len(), 2);
        s.tick(100);
        let lines = texts_of_transcript(&s);
        assert!(lines.contains(&"/ a...".to_string()));
        assert!(lines.contains(&"/ b...".to_string()));
    }

    fn texts_of_transcript(s: &crate::session::Session) -> Vec<String> {
        s.transcript().lines().iter().map(OutputLine::plain_text).collect()
    }

    #[test]
    fn crt_toggles() {
        let mut s = session();
        assert_eq!(texts(&s.run_line("crt")), vec!["CRT mode enabled"]);
        assert_eq!(s.shell().display_mode(), DisplayMode::Crt);
        assert_eq!(texts(&s.run_line("crt")), vec!["CRT mode disabled"]);
    }
}
