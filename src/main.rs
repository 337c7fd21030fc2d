// shelldock - bookmarks, templates and Unity projects shared by every shell you have open
//
// This is the main entry point. Parses CLI args and dispatches to handlers.
// Anything meant for `$(...)` capture goes to stdout, everything else to stderr.

use anyhow::{bail, Context};
use shelldock_lib::{
    core::{Bookmarks, Projects, Templates},
    logging, DocumentStore, StoreConfig, StoreError,
};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<StoreError>() {
                Some(store_error) => eprintln!("Error: {}", store_error.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let rest = &args[2..];

    match args[1].as_str() {
        "jump" | "j" => handle_jump(rest),
        "template" | "t" => handle_template(rest),
        "unity" | "u" => handle_unity(rest),
        "version" | "-v" | "--version" => {
            println!("shelldock v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {}", other)
        }
    }
}

fn handle_jump(args: &[String]) -> anyhow::Result<()> {
    let mut bookmarks = Bookmarks::new(open_store()?);

    match subcommand(args) {
        ("add", [alias]) => {
            let cwd = env::current_dir().context("Could not read current directory")?;
            let bookmark = bookmarks.add(alias, &cwd)?;
            eprintln!("✓ {} → {}", alias, bookmark.path);
        }
        ("add", [alias, path]) => {
            let bookmark = bookmarks.add(alias, &absolute(path)?)?;
            eprintln!("✓ {} → {}", alias, bookmark.path);
        }
        ("remove" | "rm", [alias]) => {
            if !bookmarks.remove(alias)? {
                bail!(StoreError::NotFound(alias.clone()));
            }
            eprintln!("✓ Removed {}", alias);
        }
        ("list" | "ls", []) => {
            let all = bookmarks.list()?;
            if all.is_empty() {
                eprintln!("No bookmarks yet. Add one with: shelldock jump add <alias>");
            }
            for (alias, bookmark) in all {
                println!("{:<16} {:<50} (used {} times)", alias, bookmark.path, bookmark.use_count);
            }
        }
        ("go", [query]) => {
            let (_, bookmark) = bookmarks.jump(query)?;
            // Just the path, for `cd "$(shelldock jump go docs)"`
            println!("{}", bookmark.path);
        }
        _ => bail!("Usage: shelldock jump <add <alias> [path] | remove <alias> | list | go <query>>"),
    }

    Ok(())
}

fn handle_template(args: &[String]) -> anyhow::Result<()> {
    let mut templates = Templates::new(open_store()?);

    match subcommand(args) {
        ("add", [name, archive, description @ ..]) => {
            let description = description.join(" ");
            let description = (!description.is_empty()).then_some(description.as_str());
            let template = templates.register(name, &absolute(archive)?, description)?;
            eprintln!("✓ {} → {}", name, template.path);
        }
        ("remove" | "rm", [name]) => {
            if !templates.remove(name)? {
                bail!(StoreError::NotFound(name.clone()));
            }
            eprintln!("✓ Removed {}", name);
        }
        ("list" | "ls", []) => {
            for (name, template) in templates.list()? {
                println!(
                    "{:<16} {:<50} {}",
                    name,
                    template.path,
                    template.description.unwrap_or_default()
                );
            }
        }
        ("use", [name]) => {
            let template = templates.touch(name)?;
            println!("{}", template.path);
        }
        _ => bail!("Usage: shelldock template <add <name> <archive> [description] | remove <name> | list | use <name>>"),
    }

    Ok(())
}

fn handle_unity(args: &[String]) -> anyhow::Result<()> {
    let mut projects = Projects::new(open_store()?);

    match subcommand(args) {
        ("add", []) => {
            let cwd = env::current_dir().context("Could not read current directory")?;
            report_added(projects.add(&cwd, None)?);
        }
        ("add", [path]) => report_added(projects.add(&absolute(path)?, None)?),
        ("add", [path, name]) => report_added(projects.add(&absolute(path)?, Some(name.as_str()))?),
        ("remove" | "rm", [name]) => {
            if !projects.remove(name)? {
                bail!(StoreError::NotFound(name.clone()));
            }
            eprintln!("✓ Removed {}", name);
        }
        ("list" | "ls", []) => {
            for (name, project) in projects.list()? {
                println!(
                    "{:<20} {:<14} {}",
                    name,
                    project.editor_version.unwrap_or_else(|| "?".to_string()),
                    project.path
                );
            }
        }
        ("open", [name]) => {
            let project = projects.mark_opened(name)?;
            if let Some(version) = &project.editor_version {
                eprintln!("Unity {}", version);
            }
            println!("{}", project.path);
        }
        _ => bail!("Usage: shelldock unity <add [path] [name] | remove <name> | list | open <name>>"),
    }

    Ok(())
}

fn report_added((name, project): (String, shelldock_lib::core::UnityProject)) {
    eprintln!(
        "✓ {} → {} (Unity {})",
        name,
        project.path,
        project.editor_version.as_deref().unwrap_or("unknown")
    );
}

fn subcommand(args: &[String]) -> (&str, &[String]) {
    match args.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", args),
    }
}

fn open_store() -> anyhow::Result<DocumentStore> {
    let config = StoreConfig::from_env()?;
    tracing::debug!("Using config root {}", config.root.display());
    Ok(DocumentStore::open(config)?)
}

fn absolute(path: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("Could not read current directory")?;
    Ok(cwd.join(path))
}

fn print_usage() {
    println!(
        r#"shelldock v{} - Shortcuts that every open shell agrees on

USAGE:
    shelldock <COMMAND> <ACTION> [ARGS]

COMMANDS:
    jump add <alias> [path]               Bookmark a directory (default: current)
    jump remove <alias>                   Forget a bookmark
    jump list                             Show bookmarks, most used first
    jump go <query>                       Print the best matching bookmark path

    template add <name> <archive> [desc]  Register a project template
    template remove <name>                Forget a template
    template list                         Show templates
    template use <name>                   Print a template archive path

    unity add [path] [name]               Register the Unity project at path
    unity remove <name>                   Forget a project
    unity list                            Show projects, most recent first
    unity open <name>                     Print a project path

    version                               Show version
    help                                  Show this help

ENVIRONMENT:
    SHELLDOCK_HOME              Where data is kept (default: your config dir)
    SHELLDOCK_LOCK_TIMEOUT_MS   How long to wait for another shell (default: 5000)
    SHELLDOCK_LOG               Log filter, e.g. debug

EXAMPLES:
    shelldock jump add docs ~/Documents
    cd "$(shelldock jump go docs)"
"#,
        env!("CARGO_PKG_VERSION")
    );
}
