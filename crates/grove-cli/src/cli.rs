//! CLI definition and command dispatch for grove.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (`--config`, `--token`, `--user`, `--verbose`)
//! 2. Environment variables (`GROVE_CONFIG`, `GROVE_USER`, `GROVE_VERBOSE`, ...)
//! 3. Config file (`~/.grove/config.yaml` or the `--config` path)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::ui::format::{format_bytes, format_relative_time, plural};
use crate::ui::{table, ColorMode, MessageType, Progress, ProgressMode, Style};

use grove_core::{
    GlobalConfig, GroveEngine, GroveError, ImportOutcome, ImportRequest, TemplateFolder,
    TemplateItem, TemplateKind,
};

// ============================================================================
// CLI Definition
// ============================================================================

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Grove – import GitHub repositories into editable workspaces
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "GROVE_VERBOSE")]
    pub verbose: bool,

    /// Suppress progress and informational messages
    #[arg(short, long, global = true, env = "GROVE_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.grove/config.yaml)
    #[arg(long, global = true, env = "GROVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode
    #[arg(long, global = true, env = "GROVE_COLOR", value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// GitHub access token; takes precedence over the token environment variable
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// User that owns imported workspaces (default: user.id from the config)
    #[arg(long, global = true, env = "GROVE_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a GitHub repository into a new workspace
    #[command(after_help = r#"EXAMPLES:
    # Import with a token from GITHUB_TOKEN
    grove import octocat/Hello-World

    # Choose the title and template
    grove import vercel/next.js --title "Next playground" --template nextjs

    # Print the workspace and import summary as JSON
    grove import octo/demo --json | jq '.summary.skipped'
"#)]
    Import {
        /// Repository full name, `owner/name`
        repository: String,

        /// Repository web URL (default: https://github.com/<owner>/<name>)
        #[arg(long)]
        url: Option<String>,

        /// Workspace title (default: the repository full name)
        #[arg(long)]
        title: Option<String>,

        /// Workspace description
        #[arg(long)]
        description: Option<String>,

        /// Template kind: react, nextjs, express, vue, hono, angular (default: import.defaultTemplate)
        #[arg(long)]
        template: Option<TemplateKind>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List repositories visible to the GitHub account
    #[command(after_help = r#"EXAMPLES:
    grove repos
    grove repos --json | jq '.[].fullName'
"#)]
    Repos {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List imported workspaces, oldest first
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show a workspace and its imported tree
    #[command(after_help = r#"EXAMPLES:
    # Summary of a workspace
    grove show 5f0c3c1e-1d1f-4b57-9b1e-7c9b0d7c5a11

    # Print the folder/file tree
    grove show 5f0c3c1e-1d1f-4b57-9b1e-7c9b0d7c5a11 --tree

    # Full tree with file contents as JSON
    grove show 5f0c3c1e-1d1f-4b57-9b1e-7c9b0d7c5a11 --json
"#)]
    Show {
        /// Workspace id
        id: String,

        /// Print the folder/file tree
        #[arg(long)]
        tree: bool,

        /// Output in JSON format (includes the full tree)
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report problems
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry point
// ============================================================================

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always, debug output with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "grove_core={lvl},grove_github={lvl},grove_db={lvl},grove_cli={lvl}",
        lvl = log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let style = Style::new(cli.color);
    let config_path = cli.config.clone().or_else(GlobalConfig::default_path);

    // Config commands must work even when the config cannot build an engine.
    if let Command::Config { action } = &cli.command {
        return finish(&style, handle_config(&style, config_path.as_deref(), action));
    }

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{}",
                style.error_with_context("Failed to load configuration", Some(&e.to_string()), e.hint())
            );
            return ExitCode::FAILURE;
        }
    };
    let user_id = cli.user.clone().unwrap_or_else(|| config.user.id.clone());
    tracing::debug!(
        "Config: {}, user: {}, store: {}",
        config_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string()),
        user_id,
        config.store.resolved_data_dir().display()
    );

    let engine = match GroveEngine::from_global_config(config, cli.token.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            let hint = e
                .downcast_ref::<GroveError>()
                .and_then(GroveError::hint)
                .map(str::to_string)
                .unwrap_or_else(|| match &config_path {
                    Some(path) => format!("Check your config at {}", path.display()),
                    None => "Check your config at ~/.grove/config.yaml".to_string(),
                });
            eprintln!(
                "{}",
                style.error_with_context("Failed to initialize grove", Some(&e.to_string()), Some(&hint))
            );
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Import {
            repository,
            url,
            title,
            description,
            template,
            json,
        } => {
            let mut request = ImportRequest::github(repository);
            if let Some(url) = url {
                request.repository_url = url;
            }
            request.title = title;
            request.description = description;
            request.template_kind = template;
            handle_import(&style, &engine, &user_id, request, cli.quiet, json)
        }
        Command::Repos { json } => handle_repos(&style, &engine, &user_id, json),
        Command::List { json } => handle_list(&style, &engine, &user_id, json),
        Command::Show { id, tree, json } => handle_show(&style, &engine, &id, tree, json),
        Command::Config { .. } => Ok(()),
    };

    finish(&style, result)
}

fn load_config(path: Option<&Path>) -> Result<GlobalConfig, GroveError> {
    match path {
        Some(path) => GlobalConfig::from_path(path),
        None => Ok(GlobalConfig::default()),
    }
}

fn finish(style: &Style, result: Result<(), GroveError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.error_with_context(&e.to_string(), None, e.hint()));
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), GroveError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_import(
    style: &Style,
    engine: &GroveEngine,
    user_id: &str,
    request: ImportRequest,
    quiet: bool,
    json: bool,
) -> Result<(), GroveError> {
    let mode = ProgressMode::detect(quiet, json, style.color_mode());
    let progress = Progress::spinner(
        &format!("Importing {}...", request.repository_full_name),
        mode,
    );
    let result = engine.import(user_id, request);
    progress.finish_clear();
    let outcome = result?;

    if json {
        return print_json(&outcome);
    }
    print_import_summary(style, &outcome, quiet);
    Ok(())
}

fn print_import_summary(style: &Style, outcome: &ImportOutcome, quiet: bool) {
    let workspace = &outcome.workspace;
    let summary = &outcome.summary;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Imported {} into workspace {}",
                workspace.repository_full_name,
                style.workspace_id(workspace.id.as_str())
            )
        )
    );
    println!("{}", style.message_detail("Files", &plural(summary.retrieved, "file")));
    println!("{}", style.message_detail("Template", &workspace.template_kind));
    if quiet {
        return;
    }

    println!(
        "{}",
        style.message_detail(
            "Filtered",
            &format!(
                "{} ({} folders, {} dependency dirs, {} hidden, {} binary)",
                plural(summary.filtered.total(), "path"),
                summary.filtered.not_blob,
                summary.filtered.excluded_dir,
                summary.filtered.hidden_path,
                summary.filtered.binary_extension
            )
        )
    );
    println!(
        "{}",
        style.message_detail("Duration", &format!("{}ms", summary.duration_ms))
    );

    for skipped in &summary.skipped {
        println!(
            "{}",
            style.message(
                MessageType::Skip,
                &format!("{} ({})", style.file_path(&skipped.path), skipped.reason)
            )
        );
    }
    for warning in &summary.warnings {
        println!("{}", style.message(MessageType::Warn, warning));
    }
    println!(
        "{}",
        style.message(
            MessageType::Hint,
            &format!("Run `grove show {} --tree` to browse the files", workspace.id)
        )
    );
}

fn handle_repos(
    style: &Style,
    engine: &GroveEngine,
    user_id: &str,
    json: bool,
) -> Result<(), GroveError> {
    let repos = engine.list_repositories(user_id)?;
    if json {
        return print_json(&repos);
    }
    if repos.is_empty() {
        println!("{}", style.message(MessageType::Info, "No repositories found"));
        return Ok(());
    }
    println!("{}", table::render_repositories_table(&repos));
    Ok(())
}

fn handle_list(
    style: &Style,
    engine: &GroveEngine,
    user_id: &str,
    json: bool,
) -> Result<(), GroveError> {
    let workspaces = engine.list_workspaces(user_id)?;
    if json {
        return print_json(&workspaces);
    }
    if workspaces.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Info, &format!("No workspaces for user `{}`", user_id))
        );
        println!(
            "{}",
            style.message(MessageType::Hint, "Run `grove import <owner/name>` to create one")
        );
        return Ok(());
    }
    println!("{}", table::render_workspaces_table(&workspaces));
    Ok(())
}

fn handle_show(
    style: &Style,
    engine: &GroveEngine,
    id: &str,
    show_tree: bool,
    json: bool,
) -> Result<(), GroveError> {
    let workspace = engine.get_workspace(id)?;
    let tree = engine.load_tree(id)?;

    if json {
        return print_json(&json!({ "workspace": workspace, "tree": tree }));
    }

    println!("{}", style.section("WORKSPACE"));
    println!("{}", style.key_value("Id", &style.workspace_id(workspace.id.as_str())));
    println!("{}", style.key_value("Title", &workspace.title));
    if let Some(description) = &workspace.description {
        println!("{}", style.key_value("Description", description));
    }
    println!("{}", style.key_value("Template", &workspace.template_kind));
    println!(
        "{}",
        style.key_value(
            "Repository",
            &format!("{} ({})", workspace.repository_full_name, workspace.repository_url)
        )
    );
    println!("{}", style.key_value("Owner", &workspace.user_id));
    println!(
        "{}",
        style.key_value(
            "Created",
            &format!(
                "{} ({})",
                workspace.created_at.to_rfc3339(),
                format_relative_time(workspace.created_at)
            )
        )
    );
    println!();
    println!("{}", style.section("TREE"));
    println!("{}", style.key_value("Files", &tree.file_count().to_string()));
    println!("{}", style.key_value("Folders", &tree.folder_count().to_string()));
    println!("{}", style.key_value("Depth", &tree.depth().to_string()));
    println!("{}", style.key_value("Content", &format_bytes(content_bytes(&tree))));

    if show_tree {
        println!();
        println!("{}", style.file_path(&format!("{}/", tree.folder_name)));
        for line in tree_lines(style, &tree, "") {
            println!("{}", line);
        }
    }
    Ok(())
}

fn content_bytes(folder: &TemplateFolder) -> u64 {
    folder
        .items
        .iter()
        .map(|item| match item {
            TemplateItem::File(file) => file.content.len() as u64,
            TemplateItem::Folder(sub) => content_bytes(sub),
        })
        .sum()
}

/// Box-drawing lines for the children of `folder`.
fn tree_lines(style: &Style, folder: &TemplateFolder, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let last = folder.items.len().saturating_sub(1);
    for (i, item) in folder.items.iter().enumerate() {
        let (branch, child_indent) = if i == last {
            ("└─ ", "   ")
        } else {
            ("├─ ", "│  ")
        };
        match item {
            TemplateItem::File(file) => {
                lines.push(format!("{}{}{}", indent, branch, file.display_name()));
            }
            TemplateItem::Folder(sub) => {
                lines.push(format!(
                    "{}{}{}",
                    indent,
                    branch,
                    style.file_path(&format!("{}/", sub.folder_name))
                ));
                lines.extend(tree_lines(style, sub, &format!("{}{}", indent, child_indent)));
            }
        }
    }
    lines
}

fn handle_config(
    style: &Style,
    path: Option<&Path>,
    action: &ConfigAction,
) -> Result<(), GroveError> {
    match action {
        ConfigAction::Check { json } => handle_config_check(style, path, *json),
        ConfigAction::Show { json } => handle_config_show(style, path, *json),
    }
}

/// Validate the config file and report errors and warnings.
fn handle_config_check(style: &Style, path: Option<&Path>, json: bool) -> Result<(), GroveError> {
    let exists = path.is_some_and(Path::exists);
    let parsed = match path {
        Some(path) => GlobalConfig::parse_path(path),
        None => Ok(GlobalConfig::default()),
    };
    let (warnings, error) = match parsed {
        Ok(config) => match config.validate() {
            Ok(warnings) => (warnings, None),
            Err(e) => (Vec::new(), Some(e)),
        },
        Err(e) => (Vec::new(), Some(e)),
    };

    if json {
        print_json(&json!({
            "path": path.map(|p| p.display().to_string()),
            "exists": exists,
            "valid": error.is_none(),
            "warnings": warnings,
            "errors": error.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }))?;
    } else {
        let location = match path {
            Some(p) if exists => p.display().to_string(),
            Some(p) => format!("{} (not found, using defaults)", p.display()),
            None => "built-in defaults".to_string(),
        };
        println!("{}", style.message(MessageType::Info, &format!("Checked {}", location)));
        for warning in &warnings {
            println!("{}", style.message(MessageType::Warn, warning));
        }
        match &error {
            None if warnings.is_empty() => {
                println!("{}", style.message(MessageType::Ok, "Configuration is valid"));
            }
            None => {
                println!(
                    "{}",
                    style.message(MessageType::Ok, "Configuration is valid with warnings")
                );
            }
            Some(_) => {}
        }
    }

    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Print the configuration with defaults filled in.
fn handle_config_show(style: &Style, path: Option<&Path>, json: bool) -> Result<(), GroveError> {
    let config = load_config(path)?;
    if json {
        return print_json(&config);
    }
    println!("{}", style.message(MessageType::Info, "Resolved configuration:"));
    println!();
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
