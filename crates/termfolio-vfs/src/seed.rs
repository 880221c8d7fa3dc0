//! The fixed tree every session starts from.

/// Seed nodes for a home directory. `None` content marks a directory.
///
/// Every ancestor of every node is listed, so the tree can be inserted in
/// any order.
pub fn seed_tree(home: &str) -> Vec<(String, Option<String>)> {
    let mut nodes = Vec::new();
    let mut dir = |path: &str| nodes.push((path.to_string(), None));

    let mut ancestor = String::new();
    for segment in home.split('/').filter(|s| !s.is_empty()) {
        ancestor.push('/');
        ancestor.push_str(segment);
        dir(&ancestor);
    }
    dir("/etc");
    dir("/tmp");
    dir(&format!("{home}/projects"));
    dir(&format!("{home}/projects/termfolio"));
    dir(&format!("{home}/notes"));

    let files = [
        ("/etc/motd", MOTD),
        ("README.md", README),
        ("about.txt", ABOUT),
        ("contact.txt", CONTACT),
        ("projects/termfolio/README.md", PROJECT_README),
        ("projects/ideas.txt", IDEAS),
        ("notes/todo.txt", TODO),
    ];
    for (path, body) in files {
        let full = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{home}/{path}")
        };
        nodes.push((full, Some(body.to_string())));
    }
    nodes
}

const MOTD: &str = "Welcome to termfolio. Type 'help' to see what this terminal can do.\n";

const README: &str = "\
# Hello, visitor

This is a small terminal living inside a portfolio page.
Try `ls`, `cat about.txt`, or `help`.
Pipes and chains work too: `cat about.txt | grep Rust && echo found`.
";

const ABOUT: &str = "\
I build tools, parsers and the occasional toy terminal.
Favourite languages: Rust, TypeScript, and whatever the problem needs.
";

const CONTACT: &str = "\
email:  hello@example.com
github: https://github.com/example
";

const PROJECT_README: &str = "\
termfolio: a command interpreter with quoting, pipes, chains,
a command registry and animated output.
";

const IDEAS: &str = "\
- snake high score table
- a tiny text adventure
- theme switcher
";

const TODO: &str = "\
write more commands
fix the kettle
";
