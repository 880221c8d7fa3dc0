//! Command table with alias and category indexes.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use termfolio_types::error::{Result, TermError};

use crate::command::{Category, Command, CommandContext, CommandOutput, normalize_aliases};

/// Registry of available commands with dispatch.
///
/// Names and aliases are stored lowercase and matched case-insensitively.
/// An alias may be claimed by only one command.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Rc<dyn Command>>,
    aliases: HashMap<String, String>,
    categories: BTreeMap<Category, Vec<Rc<dyn Command>>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.commands.keys().collect();
        names.sort();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// Registering a name that already exists replaces that command along
    /// with its aliases and category entry. Fails without changing anything
    /// if one of the command's aliases is held by a different command.
    pub fn register(&mut self, command: Rc<dyn Command>) -> Result<&mut Self> {
        let name = command.name().trim().to_lowercase();
        if name.is_empty() {
            return Err(TermError::InvalidCommand("command name is required".into()));
        }
        let aliases = normalize_aliases(&name, command.aliases());
        if let Some(taken) = aliases
            .iter()
            .find(|a| self.aliases.get(*a).is_some_and(|owner| *owner != name))
        {
            return Err(TermError::DuplicateAlias(taken.clone()));
        }

        if self.commands.contains_key(&name) {
            log::debug!("replacing command '{name}'");
            self.unlink(&name);
        }
        for alias in aliases {
            self.aliases.insert(alias, name.clone());
        }
        self.categories
            .entry(command.category())
            .or_default()
            .push(Rc::clone(&command));
        self.commands.insert(name, command);
        Ok(self)
    }

    /// Register commands in order, stopping at the first error.
    pub fn register_many(
        &mut self,
        commands: impl IntoIterator<Item = Rc<dyn Command>>,
    ) -> Result<&mut Self> {
        for command in commands {
            self.register(command)?;
        }
        Ok(self)
    }

    /// Drop every alias and category entry that points at `name`.
    fn unlink(&mut self, name: &str) {
        self.aliases.retain(|_, owner| owner != name);
        for list in self.categories.values_mut() {
            list.retain(|c| !c.name().eq_ignore_ascii_case(name));
        }
        self.categories.retain(|_, list| !list.is_empty());
    }

    /// Look up by primary name first, then by alias.
    pub fn get(&self, name: &str) -> Option<&Rc<dyn Command>> {
        let key = name.to_lowercase();
        self.commands.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|target| self.commands.get(target))
        })
    }

    pub fn has(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.commands.contains_key(&key) || self.aliases.contains_key(&key)
    }

    /// Canonical name behind a true alias. `None` for primary names and
    /// unknown names.
    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(&alias.to_lowercase()).map(String::as_str)
    }

    /// Commands in `category`, in registration order.
    pub fn get_by_category(&self, category: Category) -> &[Rc<dyn Command>] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories that hold at least one command.
    pub fn get_categories(&self) -> Vec<Category> {
        self.categories.keys().copied().collect()
    }

    /// Primary names, sorted.
    pub fn get_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Primary names and aliases, sorted.
    pub fn get_all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .commands
            .keys()
            .chain(self.aliases.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Names and aliases of commands that are not hidden, sorted.
    pub fn get_visible_names(&self) -> Vec<&str> {
        let visible = |name: &str| self.commands.get(name).is_some_and(|c| !c.hidden());
        let mut names: Vec<&str> = self
            .commands
            .keys()
            .map(String::as_str)
            .filter(|n| visible(*n))
            .chain(
                self.aliases
                    .iter()
                    .filter(|(_, target)| visible(target.as_str()))
                    .map(|(alias, _)| alias.as_str()),
            )
            .collect();
        names.sort_unstable();
        names
    }

    /// Run a command by name or alias.
    pub fn execute(&self, name: &str, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let command = self
            .get(name)
            .ok_or_else(|| TermError::NotFound(name.to_string()))?;
        command.execute(ctx)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove every command, alias, and category entry.
    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self.aliases.clear();
        self.categories.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDef;

    fn def(name: &str, category: Category, aliases: &[&str]) -> Rc<dyn Command> {
        let mut builder = CommandDef::builder(name)
            .description(format!("{name} command"))
            .category(category);
        for alias in aliases {
            builder = builder.alias(*alias);
        }
        Rc::new(
            builder
                .handler(|_| Ok(CommandOutput::empty()))
                .build()
                .unwrap(),
        )
    }

    fn hidden(name: &str, aliases: &[&str]) -> Rc<dyn Command> {
        let mut builder = CommandDef::builder(name)
            .description("secret")
            .category(Category::System)
            .hidden(true);
        for alias in aliases {
            builder = builder.alias(*alias);
        }
        Rc::new(
            builder
                .handler(|_| Ok(CommandOutput::empty()))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn lookup_is_case_insensitive_through_aliases() {
        let mut reg = CommandRegistry::new();
        reg.register(def("ls", Category::Filesystem, &["dir", "ll"]))
            .unwrap();
        assert!(reg.has("LS"));
        assert!(reg.has("Dir"));
        assert_eq!(reg.get("LL").unwrap().name(), "ls");
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn resolve_alias_only_resolves_aliases() {
        let mut reg = CommandRegistry::new();
        reg.register(def("clear", Category::System, &["cls"]))
            .unwrap();
        assert_eq!(reg.resolve_alias("CLS"), Some("clear"));
        assert_eq!(reg.resolve_alias("clear"), None);
        assert_eq!(reg.resolve_alias("unknown"), None);
    }

    #[test]
    fn duplicate_alias_is_rejected_and_first_binding_kept() {
        let mut reg = CommandRegistry::new();
        reg.register(def("first", Category::Info, &["x"])).unwrap();
        let err = reg
            .register(def("second", Category::Info, &["y", "x"]))
            .err()
            .unwrap();
        assert!(matches!(err, TermError::DuplicateAlias(ref a) if a == "x"));
        assert_eq!(format!("{err}"), "Alias 'x' is already registered");
        assert_eq!(reg.resolve_alias("x"), Some("first"));
        assert!(!reg.has("second"));
        assert!(!reg.has("y"));
    }

    #[test]
    fn re_registering_a_name_replaces_it() {
        let mut reg = CommandRegistry::new();
        reg.register(def("echo", Category::System, &["say"]))
            .unwrap();
        reg.register(def("echo", Category::Devtools, &["print"]))
            .unwrap();
        assert_eq!(reg.len(), 1);
        assert!(!reg.has("say"));
        assert_eq!(reg.resolve_alias("print"), Some("echo"));
        assert!(reg.get_by_category(Category::System).is_empty());
        assert_eq!(reg.get_by_category(Category::Devtools).len(), 1);
        assert_eq!(reg.get_categories(), vec![Category::Devtools]);
    }

    #[test]
    fn re_registering_may_keep_own_aliases() {
        let mut reg = CommandRegistry::new();
        reg.register(def("ls", Category::Filesystem, &["dir"]))
            .unwrap();
        reg.register(def("ls", Category::Filesystem, &["dir"]))
            .unwrap();
        assert_eq!(reg.resolve_alias("dir"), Some("ls"));
    }

    #[test]
    fn re_registered_command_moves_to_end_of_its_category() {
        let mut reg = CommandRegistry::new();
        reg.register(def("cat", Category::Filesystem, &[]))
            .unwrap()
            .register(def("ls", Category::Filesystem, &["dir"]))
            .unwrap();
        let err = reg
            .register(def("cat", Category::Filesystem, &["dir"]))
            .unwrap_err();
        assert!(matches!(err, TermError::DuplicateAlias(_)));
        reg.register(def("cat", Category::Filesystem, &["type"]))
            .unwrap();
        let order: Vec<&str> = reg
            .get_by_category(Category::Filesystem)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(order, vec!["ls", "cat"]);
        assert_eq!(reg.resolve_alias("dir"), Some("ls"));
    }

    #[test]
    fn categories_keep_registration_order() {
        let mut reg = CommandRegistry::new();
        reg.register_many([
            def("zeta", Category::Info, &[]),
            def("alpha", Category::Info, &[]),
            def("pwd", Category::Filesystem, &[]),
        ])
        .unwrap();
        let names: Vec<&str> = reg
            .get_by_category(Category::Info)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(
            reg.get_categories(),
            vec![Category::Info, Category::Filesystem]
        );
    }

    #[test]
    fn register_many_stops_at_first_error() {
        let mut reg = CommandRegistry::new();
        let result = reg.register_many([
            def("a", Category::Info, &["dup"]),
            def("b", Category::Info, &["dup"]),
            def("c", Category::Info, &[]),
        ]);
        assert!(result.is_err());
        assert!(reg.has("a"));
        assert!(!reg.has("b"));
        assert!(!reg.has("c"));
    }

    #[test]
    fn name_listings() {
        let mut reg = CommandRegistry::new();
        reg.register_many([
            def("help", Category::System, &["?"]),
            def("cat", Category::Filesystem, &[]),
            hidden("sudo", &["doas"]),
        ])
        .unwrap();
        assert_eq!(reg.get_names(), vec!["cat", "help", "sudo"]);
        assert_eq!(reg.get_all_names(), vec!["?", "cat", "doas", "help", "sudo"]);
        assert_eq!(reg.get_visible_names(), vec!["?", "cat", "help"]);
        assert!(reg.has("sudo"));
    }

    #[test]
    fn clear_empties_everything() {
        let mut reg = CommandRegistry::new();
        reg.register(def("help", Category::System, &["?"]))
            .unwrap()
            .register(def("cat", Category::Filesystem, &[]))
            .unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert!(!reg.has("?"));
        assert!(reg.get_categories().is_empty());
    }

    fn run(reg: &CommandRegistry, input: &str) -> Result<CommandOutput> {
        use termfolio_types::config::{AnimationConfig, TerminalConfig};
        use termfolio_vfs::MemoryVfs;

        use crate::animation::AnimationRuntime;
        use crate::args::parse_command_input;
        use crate::shell::ShellState;
        use crate::timer::TimerQueue;
        use crate::transcript::Transcript;

        let parsed = parse_command_input(input);
        let mut vfs = MemoryVfs::new();
        let mut shell = ShellState::new("/", 10);
        let runtime =
            AnimationRuntime::new(TimerQueue::new(), Transcript::new(), &AnimationConfig::default());
        let config = TerminalConfig::default();
        let mut ctx = CommandContext {
            parsed: &parsed,
            vfs: &mut vfs,
            shell: &mut shell,
            registry: reg,
            runtime: &runtime,
            config: &config,
        };
        reg.execute(&parsed.command, &mut ctx)
    }

    fn listing() -> Rc<dyn Command> {
        Rc::new(
            CommandDef::builder("ls")
                .description("List")
                .category(Category::Filesystem)
                .alias("ll")
                .handler(|ctx| {
                    Ok(CommandOutput::text(&format!("listed {}", ctx.parsed.args.join(" "))))
                })
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn execute_unknown_name_is_not_found() {
        let mut reg = CommandRegistry::new();
        reg.register(listing()).unwrap();
        let err = run(&reg, "nope -x").unwrap_err();
        assert!(matches!(&err, TermError::NotFound(name) if name == "nope"));
        assert_eq!(err.to_string(), "Command not found: nope");
    }

    #[test]
    fn execute_reaches_command_through_alias_in_any_case() {
        let mut reg = CommandRegistry::new();
        reg.register(listing()).unwrap();
        let out = run(&reg, "LL /etc").unwrap();
        assert_eq!(out.lines[0].plain_text(), "listed /etc");
        let out = run(&reg, "Ls").unwrap();
        assert_eq!(out.lines[0].plain_text(), "listed ");
    }
}
