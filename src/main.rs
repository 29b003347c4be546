/*!
 * Tether CLI
 */

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use tether::{
    config::GraphConfig,
    error::{Result, EXIT_SUCCESS},
    index::{self, SortBy},
    logging, reconcile, store,
    Action, BridgeClient, HttpBridge, Queue,
};

#[derive(Parser)]
#[command(name = "tether")]
#[command(
    version,
    about = "Offline-first bridge between a local Logseq graph and the Logseq HTTP plugin API",
    long_about = None
)]
struct Cli {
    /// Graph root directory (overrides GRAPH_PATH, default ".")
    #[arg(long, value_name = "PATH", global = true)]
    graph: Option<PathBuf>,

    /// Plugin API base URL (overrides LOGSEQ_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs as JSON lines to a file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check plugin API availability
    Check,

    /// Append a timestamped entry to today's journal (filesystem)
    AddJournal {
        content: String,
    },

    /// Append to a page, creating it if needed (filesystem)
    AddPage {
        name: String,
        content: String,
    },

    /// Queue a create_page action for a later reconcile
    QueueCreatePage {
        name: String,
        #[arg(default_value = "")]
        content: String,
    },

    /// Queue an insert_block action for a later reconcile
    QueueInsertBlock {
        parent_uuid: String,
        content: String,
        /// Insert as a child of the parent block instead of a sibling
        #[arg(long)]
        non_sibling: bool,
    },

    /// Apply queued actions via the API if it is available
    Reconcile,

    /// List pages (filesystem)
    ListPages {
        #[arg(long, value_enum, default_value = "name")]
        sort_by: SortByArg,
        /// Sort in descending order
        #[arg(long)]
        reverse: bool,
        /// Show at most N pages
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// List journals (filesystem)
    ListJournals,

    /// Count term occurrences across pages and journals
    Grep {
        term: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SortByArg {
    Name,
    Mtime,
}

impl From<SortByArg> for SortBy {
    fn from(arg: SortByArg) -> Self {
        match arg {
            SortByArg::Name => SortBy::Name,
            SortByArg::Mtime => SortBy::Mtime,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log.as_deref()) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let mut config = GraphConfig::from_env();
    if let Some(graph) = cli.graph {
        config.graph_root = graph;
    }
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    match cli.command {
        Commands::Check => cmd_check(&config),
        Commands::AddJournal { content } => cmd_add_journal(&config, &content),
        Commands::AddPage { name, content } => cmd_add_page(&config, &name, &content),
        Commands::QueueCreatePage { name, content } => {
            cmd_queue(&config, Action::create_page(&name, &content)?)
        }
        Commands::QueueInsertBlock {
            parent_uuid,
            content,
            non_sibling,
        } => cmd_queue(
            &config,
            Action::insert_block(&parent_uuid, &content, !non_sibling)?,
        ),
        Commands::Reconcile => cmd_reconcile(&config),
        Commands::ListPages {
            sort_by,
            reverse,
            limit,
            format,
        } => cmd_list_pages(&config, sort_by.into(), reverse, limit, format),
        Commands::ListJournals => cmd_list_journals(&config),
        Commands::Grep { term } => cmd_grep(&config, &term),
    }
}

fn cmd_check(config: &GraphConfig) -> Result<()> {
    let bridge = HttpBridge::new(config)?;
    let available = bridge.probe_availability();
    println!("Logseq API available: {}", available);
    if available {
        match bridge.get_current_graph() {
            Ok(graph) => println!("Current graph: {}", graph),
            Err(e) => println!("API reachable but get_current_graph failed: {}", e),
        }
    }
    Ok(())
}

fn cmd_add_journal(config: &GraphConfig, content: &str) -> Result<()> {
    let path = store::append_journal(config, content)?;
    println!("Wrote journal entry -> {}", path.display());
    Ok(())
}

fn cmd_add_page(config: &GraphConfig, name: &str, content: &str) -> Result<()> {
    let path = store::append_to_page(config, name, content)?;
    println!("Appended to page -> {}", path.display());
    Ok(())
}

fn cmd_queue(config: &GraphConfig, action: Action) -> Result<()> {
    let kind = action.kind().to_string();
    let mut queue = Queue::load(config)?;
    queue.enqueue(action)?;
    println!("Queued {} action.", kind);
    Ok(())
}

fn cmd_reconcile(config: &GraphConfig) -> Result<()> {
    let bridge = HttpBridge::new(config)?;
    let applied = reconcile(&bridge, config)?;
    println!("Reconciled actions: {}", applied);
    Ok(())
}

fn cmd_list_pages(
    config: &GraphConfig,
    sort_by: SortBy,
    reverse: bool,
    limit: Option<usize>,
    format: FormatArg,
) -> Result<()> {
    let pages = index::list_pages(config, sort_by, reverse, limit)?;
    match format {
        FormatArg::Text => {
            for page in &pages {
                println!("{}", page.name);
            }
        }
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(&pages)?),
    }
    Ok(())
}

fn cmd_list_journals(config: &GraphConfig) -> Result<()> {
    for name in index::list_journals(config)? {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_grep(config: &GraphConfig, term: &str) -> Result<()> {
    for (name, count) in index::term_counts(config, term)? {
        println!("{}: {}", name, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_subcommand() {
        let cli = Cli::try_parse_from(["tether", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert!(!cli.verbose);
        assert!(cli.graph.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tether", "check", "--graph", "/g", "--api-url", "http://x"])
                .unwrap();
        assert_eq!(cli.graph, Some(PathBuf::from("/g")));
        assert_eq!(cli.api_url, Some("http://x".to_string()));
    }

    #[test]
    fn test_add_journal_subcommand() {
        let cli = Cli::try_parse_from(["tether", "add-journal", "hello world"]).unwrap();
        match cli.command {
            Commands::AddJournal { content } => assert_eq!(content, "hello world"),
            _ => panic!("expected AddJournal subcommand"),
        }
    }

    #[test]
    fn test_queue_create_page_default_content() {
        let cli = Cli::try_parse_from(["tether", "queue-create-page", "Inbox"]).unwrap();
        match cli.command {
            Commands::QueueCreatePage { name, content } => {
                assert_eq!(name, "Inbox");
                assert_eq!(content, "");
            }
            _ => panic!("expected QueueCreatePage subcommand"),
        }
    }

    #[test]
    fn test_queue_insert_block_subcommand() {
        let cli = Cli::try_parse_from([
            "tether",
            "queue-insert-block",
            "6763-a2f3",
            "a block",
            "--non-sibling",
        ])
        .unwrap();
        match cli.command {
            Commands::QueueInsertBlock {
                parent_uuid,
                content,
                non_sibling,
            } => {
                assert_eq!(parent_uuid, "6763-a2f3");
                assert_eq!(content, "a block");
                assert!(non_sibling);
            }
            _ => panic!("expected QueueInsertBlock subcommand"),
        }
    }

    #[test]
    fn test_list_pages_defaults() {
        let cli = Cli::try_parse_from(["tether", "list-pages"]).unwrap();
        match cli.command {
            Commands::ListPages {
                sort_by,
                reverse,
                limit,
                format,
            } => {
                assert_eq!(sort_by, SortByArg::Name);
                assert!(!reverse);
                assert!(limit.is_none());
                assert_eq!(format, FormatArg::Text);
            }
            _ => panic!("expected ListPages subcommand"),
        }
    }

    #[test]
    fn test_list_pages_all_options() {
        let cli = Cli::try_parse_from([
            "tether",
            "list-pages",
            "--sort-by",
            "mtime",
            "--reverse",
            "--limit",
            "2",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Commands::ListPages {
                sort_by,
                reverse,
                limit,
                format,
            } => {
                assert_eq!(sort_by, SortByArg::Mtime);
                assert!(reverse);
                assert_eq!(limit, Some(2));
                assert_eq!(format, FormatArg::Json);
            }
            _ => panic!("expected ListPages subcommand"),
        }
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["tether"]).is_err());
    }
}
