use anyhow::{Context, Result};
use archive_assistant::client::{ApiTransport, ClientConfig, RequestClient};
use archive_assistant::config::{find_config_file, load_config, load_from_env, Config};
use archive_assistant::controllers::{
    ArticleListController, Controller, DocumentController, QueryController, SearchController,
    SummaryController,
};
use archive_assistant::models::{Document, DocumentRef, RequestState};
use archive_assistant::utils::{format_publish_date, single_line, truncate_with_ellipsis};
use clap::{Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Archive Assistant - browse, search, query and summarize a document archive
#[derive(Parser, Debug)]
#[command(name = "archive-assistant")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse, search, query and summarize a document archive", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Archive endpoint (overrides configuration)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Summarization endpoint (overrides configuration)
    #[arg(long, global = true)]
    summarize_url: Option<String>,

    /// Request timeout in seconds (overrides configuration)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table if stdout is a terminal, JSON otherwise
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the first page of archived documents
    #[command(alias = "ls")]
    List {
        /// Run as a refresh rather than an initial load
        #[arg(long)]
        refresh: bool,
    },

    /// Keyword search over the archive
    #[command(alias = "s")]
    Search {
        /// Search keywords
        query: String,
    },

    /// Ask the archive a question
    #[command(alias = "q")]
    Ask {
        /// Free-text question
        question: String,
    },

    /// Show a single document
    #[command(alias = "a")]
    Article {
        /// Document identifier
        id: String,

        /// Title to show if the document cannot be loaded
        #[arg(long)]
        title: Option<String>,
    },

    /// Generate an AI summary of a document
    Summarize {
        /// Document identifier
        id: String,

        /// Document title (used for sharing)
        #[arg(long)]
        title: Option<String>,

        /// Print the share text instead of the formatted summary
        #[arg(long)]
        share: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Everything a command needs
struct AppContext {
    config: Config,
    archive: Arc<dyn ApiTransport>,
    summarizer: Arc<dyn ApiTransport>,
    output: OutputFormat,
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_path) = if let Some(path) = &cli.config {
        (load_config(path)?, Some(path.clone()))
    } else if let Some(path) = find_config_file() {
        (load_config(&path)?, Some(path))
    } else {
        (load_from_env()?, None)
    };

    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(url) = &cli.summarize_url {
        config.api.summarize_url = Some(url.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.api.timeout_secs = timeout;
    }

    init_tracing(&cli, &config);

    if let Some(path) = config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let archive = RequestClient::new(ClientConfig::from_api(&config.api))
        .context("failed to build archive client")?;
    let summarizer = RequestClient::new(ClientConfig::summarization(&config.api))
        .context("failed to build summarization client")?;

    let ctx = AppContext {
        config,
        archive: Arc::new(archive),
        summarizer: Arc::new(summarizer),
        output: resolve_format(cli.output),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::List { refresh } => run_list(&ctx, refresh).await,
        Commands::Search { query } => run_search(&ctx, &query).await,
        Commands::Ask { question } => run_ask(&ctx, &question).await,
        Commands::Article { id, title } => {
            let mut doc_ref = DocumentRef::new(id);
            doc_ref.title = title;
            run_article(&ctx, doc_ref).await
        }
        Commands::Summarize { id, title, share } => {
            let mut doc_ref = DocumentRef::new(id);
            doc_ref.title = title;
            run_summarize(&ctx, &doc_ref, share).await
        }
        Commands::Config => {
            print!("{}", ctx.config.to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("archive_assistant={}", level)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json || config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format != OutputFormat::Auto {
        return format;
    }
    if std::io::stdout().is_terminal() {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    }
}

/// Print `text` on stderr whenever the controller enters a loading state.
fn show_progress<C, F>(controller: &C, quiet: bool, text: &'static str, is_loading: F)
where
    C: Controller,
    F: Fn(&C::State) -> bool + Send + Sync + 'static,
{
    if quiet {
        return;
    }
    controller.subscribe(move |state| {
        if is_loading(state) {
            eprintln!("{} {}", "◐".cyan(), text);
        }
    });
}

/// Turn a controller failure into a process error.
fn failure(message: Option<&'static str>, state_error: Option<String>) -> anyhow::Error {
    let message = message.unwrap_or("Request failed.");
    match state_error {
        Some(detail) => anyhow::anyhow!("{} ({})", message, detail),
        None => anyhow::anyhow!("{}", message),
    }
}

async fn run_list(ctx: &AppContext, refresh: bool) -> Result<()> {
    let controller = ArticleListController::with_page(
        Arc::clone(&ctx.archive),
        ctx.config.articles.page,
        ctx.config.articles.limit,
    );
    show_progress(&controller, ctx.quiet, "Loading articles...", |state| {
        state.request.is_loading()
    });

    let pending = if refresh {
        controller.refresh()
    } else {
        controller.load()
    };
    if let Some(pending) = pending {
        pending.await?;
    }

    let message = controller.failure_message();
    let state = controller.state();
    controller.dispose();

    match &state.request {
        RequestState::Success(page) if page.is_empty() => {
            print_notice(ctx, "No articles found", EmptyResult::Documents);
            Ok(())
        }
        RequestState::Success(page) => output_documents(&page.documents, ctx.output),
        RequestState::Failure(err) => Err(failure(message, Some(err.user_message().to_string()))),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

async fn run_search(ctx: &AppContext, query: &str) -> Result<()> {
    let controller = SearchController::new(Arc::clone(&ctx.archive));
    show_progress(&controller, ctx.quiet, "Searching...", RequestState::is_loading);

    match controller.search(query) {
        Some(pending) => pending.await?,
        None => {
            print_notice(ctx, "Enter keywords to find articles", EmptyResult::Documents);
            return Ok(());
        }
    }

    let message = controller.failure_message();
    let state = controller.state();
    controller.dispose();

    match state {
        RequestState::Success(docs) if docs.is_empty() => {
            print_notice(
                ctx,
                "No results found. Try different keywords or broaden your search",
                EmptyResult::Documents,
            );
            Ok(())
        }
        RequestState::Success(docs) => output_documents(&docs, ctx.output),
        RequestState::Failure(err) => Err(failure(message, Some(err.user_message().to_string()))),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

async fn run_ask(ctx: &AppContext, question: &str) -> Result<()> {
    let controller = QueryController::new(Arc::clone(&ctx.archive));
    show_progress(&controller, ctx.quiet, "Thinking...", RequestState::is_loading);

    match controller.ask(question) {
        Some(pending) => pending.await?,
        None => {
            print_notice(ctx, "Ask me anything about the archive", EmptyResult::Answer);
            return Ok(());
        }
    }

    let message = controller.failure_message();
    let state = controller.state();
    controller.dispose();

    match state {
        RequestState::Success(answer) => {
            if ctx.output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.answer);
                if !answer.context.is_empty() {
                    println!();
                    println!("{}", "Context:".bold());
                    println!("{}", answer.context.dimmed());
                }
            }
            Ok(())
        }
        RequestState::Failure(err) => Err(failure(message, Some(err.user_message().to_string()))),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

async fn run_article(ctx: &AppContext, doc_ref: DocumentRef) -> Result<()> {
    let controller = DocumentController::new(Arc::clone(&ctx.archive), doc_ref);
    show_progress(&controller, ctx.quiet, "Loading article...", RequestState::is_loading);

    if let Some(pending) = controller.load() {
        pending.await?;
    }

    let message = controller.failure_message();
    let state = controller.state();
    controller.dispose();

    match state {
        RequestState::Success(doc) => {
            if ctx.output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{}", doc.title.bold());
                if !doc.author.is_empty() {
                    println!("By {}", doc.author);
                }
                let date = format_publish_date(&doc);
                if !date.is_empty() {
                    println!("{}", date.dimmed());
                }
                if let Some(ref image) = doc.image_url {
                    println!("Image: {}", image);
                }
                println!();
                println!("{}", doc.content);
            }
            Ok(())
        }
        RequestState::Failure(err) => Err(failure(message, Some(err.user_message().to_string()))),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

async fn run_summarize(ctx: &AppContext, doc_ref: &DocumentRef, share: bool) -> Result<()> {
    let controller = SummaryController::for_document(Arc::clone(&ctx.summarizer), doc_ref);
    show_progress(
        &controller,
        ctx.quiet,
        "Generating AI Summary...",
        RequestState::is_loading,
    );

    if let Some(pending) = controller.generate() {
        pending.await?;
    }

    let message = controller.failure_message();
    let share_text = controller.share();
    let state = controller.state();
    controller.dispose();

    match state {
        RequestState::Success(result) => {
            if share {
                println!("{}", share_text.unwrap_or_default());
            } else if ctx.output == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if let Some(title) = controller.title() {
                    println!("{}", title.bold());
                    println!();
                }
                println!("{}", "AI-Generated Summary".bold());
                println!("{}", result.summary);
            }
            Ok(())
        }
        RequestState::Failure(err) => Err(failure(message, Some(err.user_message().to_string()))),
        RequestState::Idle | RequestState::Loading => Ok(()),
    }
}

/// What a command would have printed in JSON mode had it produced output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EmptyResult {
    /// A document array
    Documents,
    /// A single answer object
    Answer,
}

impl EmptyResult {
    fn json(self) -> &'static str {
        match self {
            EmptyResult::Documents => "[]",
            EmptyResult::Answer => "null",
        }
    }
}

fn print_notice(ctx: &AppContext, text: &str, empty: EmptyResult) {
    if ctx.output == OutputFormat::Json {
        println!("{}", empty.json());
    } else if !ctx.quiet {
        println!("{}", text.dimmed());
    }
}

fn output_documents(documents: &[Document], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(documents)?);
        }
        OutputFormat::Plain => {
            for doc in documents {
                println!("[{}] {}", doc.id, doc.title);
                let date = format_publish_date(doc);
                match (doc.author.is_empty(), date.is_empty()) {
                    (false, false) => println!("  {} - {}", doc.author, date),
                    (false, true) => println!("  {}", doc.author),
                    (true, false) => println!("  {}", date),
                    (true, true) => {}
                }
                if !doc.summary.is_empty() {
                    println!("  {}", truncate_with_ellipsis(&single_line(&doc.summary), 160));
                }
                println!();
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Title", "Author", "Published"]);

            for doc in documents {
                table.add_row(vec![
                    Cell::new(doc.id.as_str()),
                    Cell::new(truncate_with_ellipsis(&doc.title, 50)).add_attribute(Attribute::Bold),
                    Cell::new(truncate_with_ellipsis(&doc.author, 30)),
                    Cell::new(format_publish_date(doc)),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
