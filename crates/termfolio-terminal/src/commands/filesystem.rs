//! Filesystem commands over the session's virtual file system.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart, text_lines};
use termfolio_vfs::{EntryKind, Vfs, VfsEntry, display_path, join, resolve_path};

use crate::command::{Category, Command, CommandContext, CommandDef, CommandOutput};
use crate::registry::CommandRegistry;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    let pwd = CommandDef::builder("pwd")
        .description("Print working directory")
        .category(Category::Filesystem)
        .handler(|ctx| Ok(CommandOutput::text(&ctx.shell.cwd)))
        .build()?;
    reg.register(Rc::new(LsCmd))?
        .register(Rc::new(CdCmd))?
        .register(Rc::new(pwd))?
        .register(Rc::new(CatCmd))?
        .register(Rc::new(MkdirCmd))?
        .register(Rc::new(TouchCmd))?
        .register(Rc::new(RmCmd))?
        .register(Rc::new(TreeCmd))?;
    Ok(())
}

/// Absolute path for user input, relative to the working directory.
fn resolve(ctx: &CommandContext<'_>, input: &str) -> String {
    resolve_path(&ctx.shell.cwd, input, &ctx.shell.home)
}

fn parent_of(path: &str) -> String {
    resolve_path(path, "..", "/")
}

fn entry_line(entry: &VfsEntry) -> TextPart {
    match entry.kind {
        EntryKind::Directory => TextPart::colored(format!("{}/", entry.name), Color::Blue),
        EntryKind::File => TextPart::plain(&entry.name),
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-a] [-l] [path]"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn aliases(&self) -> Vec<String> {
        vec!["dir".into(), "ll".into()]
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let target = ctx.parsed.arg(0).unwrap_or(".");
        let path = resolve(ctx, target);
        let show_all = ctx.parsed.has_flag("a");
        let long = ctx.parsed.has_flag("l") || ctx.parsed.command == "ll";

        let entries = match ctx.vfs.stat(&path) {
            Err(_) => {
                return Ok(CommandOutput::error(format!(
                    "ls: cannot access '{target}': No such file or directory"
                )));
            },
            Ok(meta) if meta.kind == EntryKind::File => {
                let name = path.rsplit('/').next().unwrap_or_default().to_string();
                vec![VfsEntry {
                    name,
                    kind: EntryKind::File,
                    size: meta.size,
                }]
            },
            Ok(_) => ctx.vfs.readdir(&path)?,
        };

        let visible = entries
            .iter()
            .filter(|e| show_all || !e.name.starts_with('.'));
        let lines: Vec<OutputLine> = if long {
            visible
                .map(|e| {
                    let kind = match e.kind {
                        EntryKind::Directory => "d",
                        EntryKind::File => "-",
                    };
                    OutputLine::parts(vec![
                        TextPart::colored(format!("{kind} {:>8}  ", e.size), Color::Gray),
                        entry_line(e),
                    ])
                })
                .collect()
        } else {
            let parts: Vec<TextPart> = visible
                .flat_map(|e| [entry_line(e), TextPart::plain("  ")])
                .collect();
            if parts.is_empty() {
                Vec::new()
            } else {
                vec![OutputLine::parts(parts)]
            }
        };
        Ok(CommandOutput::new(lines))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let Some(target) = ctx.parsed.arg(0) else {
            ctx.shell.cwd = ctx.shell.home.clone();
            return Ok(CommandOutput::empty());
        };
        let path = resolve(ctx, target);
        match ctx.vfs.stat(&path) {
            Ok(meta) if meta.kind == EntryKind::Directory => {
                ctx.shell.cwd = path;
                Ok(CommandOutput::empty())
            },
            Ok(_) => Ok(CommandOutput::error(format!("cd: not a directory: {target}"))),
            Err(_) => Ok(CommandOutput::error(format!(
                "cd: no such file or directory: {target}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <file...>"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.args.is_empty() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let mut out = CommandOutput::empty();
        let mut failed = false;
        for arg in &ctx.parsed.args {
            let path = resolve(ctx, arg);
            if ctx.vfs.is_dir(&path) {
                out.push(OutputLine::error(format!("cat: {arg}: Is a directory")));
                failed = true;
                continue;
            }
            match ctx.vfs.read(&path) {
                Ok(bytes) => out.lines.extend(text_lines(&String::from_utf8_lossy(&bytes))),
                Err(_) => {
                    out.push(OutputLine::error(format!(
                        "cat: {arg}: No such file or directory"
                    )));
                    failed = true;
                },
            }
        }
        if failed {
            return Ok(CommandOutput::failure(out.lines));
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories"
    }
    fn usage(&self) -> &str {
        "mkdir [-p] <dir...>"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.args.is_empty() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let parents = ctx.parsed.has_flag("p");
        let mut errors = Vec::new();
        for arg in &ctx.parsed.args {
            let path = resolve(ctx, arg);
            if ctx.vfs.exists(&path) {
                if !(parents && ctx.vfs.is_dir(&path)) {
                    errors.push(format!("mkdir: cannot create directory '{arg}': File exists"));
                }
                continue;
            }
            if !parents && !ctx.vfs.is_dir(&parent_of(&path)) {
                errors.push(format!(
                    "mkdir: cannot create directory '{arg}': No such file or directory"
                ));
                continue;
            }
            if let Err(e) = ctx.vfs.mkdir(&path) {
                errors.push(format!("mkdir: {e}"));
            }
        }
        Ok(errors_to_output(errors))
    }
}

fn errors_to_output(errors: Vec<String>) -> CommandOutput {
    if errors.is_empty() {
        CommandOutput::empty()
    } else {
        CommandOutput::failure(errors.into_iter().map(OutputLine::error).collect())
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create empty files"
    }
    fn usage(&self) -> &str {
        "touch <file...>"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.args.is_empty() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let mut errors = Vec::new();
        for arg in &ctx.parsed.args {
            let path = resolve(ctx, arg);
            if ctx.vfs.exists(&path) {
                continue;
            }
            if let Err(e) = ctx.vfs.write(&path, b"") {
                log::debug!("touch {path}: {e}");
                errors.push(format!("touch: cannot touch '{arg}': No such file or directory"));
            }
        }
        Ok(errors_to_output(errors))
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories"
    }
    fn usage(&self) -> &str {
        "rm [-r] [-f] <path...>"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let force = ctx.parsed.has_flag("f");
        if ctx.parsed.args.is_empty() {
            if force {
                return Ok(CommandOutput::empty());
            }
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let recursive = ctx.parsed.has_flag("r") || ctx.parsed.has_flag("R");
        let mut errors = Vec::new();
        for arg in &ctx.parsed.args {
            let path = resolve(ctx, arg);
            if path == "/" {
                errors.push("rm: refusing to remove '/'".to_string());
                continue;
            }
            if !ctx.vfs.exists(&path) {
                if !force {
                    errors.push(format!(
                        "rm: cannot remove '{arg}': No such file or directory"
                    ));
                }
                continue;
            }
            let result = if ctx.vfs.is_dir(&path) {
                if !recursive {
                    errors.push(format!("rm: cannot remove '{arg}': Is a directory"));
                    continue;
                }
                ctx.vfs.remove_all(&path)
            } else {
                ctx.vfs.remove(&path)
            };
            if let Err(e) = result {
                errors.push(format!("rm: {e}"));
            }
        }
        if ctx.shell.cwd != "/" && !ctx.vfs.is_dir(&ctx.shell.cwd) {
            ctx.shell.cwd = ctx.shell.home.clone();
        }
        Ok(errors_to_output(errors))
    }
}

// ---------------------------------------------------------------------------
// tree
// ---------------------------------------------------------------------------

struct TreeCmd;
impl Command for TreeCmd {
    fn name(&self) -> &str {
        "tree"
    }
    fn description(&self) -> &str {
        "Show a directory tree"
    }
    fn usage(&self) -> &str {
        "tree [path]"
    }
    fn category(&self) -> Category {
        Category::Filesystem
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let target = ctx.parsed.arg(0).unwrap_or(".");
        let path = resolve(ctx, target);
        if !ctx.vfs.is_dir(&path) {
            return Ok(CommandOutput::error(format!("tree: {target}: not a directory")));
        }
        let mut out = CommandOutput::line(OutputLine::colored(
            display_path(&path, &ctx.shell.home),
            Color::Blue,
        ));
        let mut counts = (0usize, 0usize);
        walk(&*ctx.vfs, &path, "", &mut out.lines, &mut counts)?;
        out.push(OutputLine::empty());
        out.push(OutputLine::text(format!(
            "{} directories, {} files",
            counts.0, counts.1
        )));
        Ok(out)
    }
}

fn walk(
    vfs: &dyn Vfs,
    dir: &str,
    prefix: &str,
    lines: &mut Vec<OutputLine>,
    counts: &mut (usize, usize),
) -> Result<()> {
    let entries = vfs.readdir(dir)?;
    let last = entries.len().saturating_sub(1);
    for (i, entry) in entries.iter().enumerate() {
        let (branch, indent) = if i == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        lines.push(OutputLine::parts(vec![
            TextPart::plain(format!("{prefix}{branch}")),
            entry_line(entry),
        ]));
        if entry.kind == EntryKind::Directory {
            counts.0 += 1;
            walk(
                vfs,
                &join(dir, &entry.name),
                &format!("{prefix}{indent}"),
                lines,
                counts,
            )?;
        } else {
            counts.1 += 1;
        }
    }
    Ok(())
}
