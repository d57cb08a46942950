//! autoblog CLI - generate, store and publish blog posts
//!
//! Usage:
//!   autoblog init                     Write a starter autoblog.toml
//!   autoblog serve                    Run the HTTP API
//!   autoblog generate <topic>         Generate an article and promo post
//!   autoblog post <text> -u <user>    Publish one post through the browser
//!   autoblog publish <topic> -u <user> Generate, store and post in one go
//!
//! Passwords are read from an environment variable, never from arguments.

use anyhow::{bail, Context, Result};
use autoblog_browser::PublishingAutomaton;
use autoblog_content::{ContentGenerator, GeminiClient};
use autoblog_core::config::CONFIG_FILE;
use autoblog_core::{AutoblogConfig, BlogDraft, Credentials, Length, PublishOutcome, PublishRequest, Style};
use autoblog_publish::{AdmissionControl, InMemoryBlogStore, PublishOrchestrator};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_PASSWORD_ENV: &str = "AUTOBLOG_PASSWORD";

#[derive(Parser)]
#[command(name = "autoblog")]
#[command(author, version, about = "Generate blog posts and publish their promos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Port (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate an article and its promo post
    Generate {
        topic: String,

        /// short, medium or long
        #[arg(short, long)]
        length: Option<String>,

        /// casual, professional or friendly
        #[arg(short, long)]
        style: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish one post through the browser
    Post {
        /// Post text; may contain the link placeholder
        text: String,

        #[command(flatten)]
        account: AccountArgs,

        /// Link substituted for the placeholder
        #[arg(long)]
        link: Option<String>,
    },

    /// Generate an article, store it, and post its promo
    Publish {
        topic: String,

        #[arg(short, long)]
        length: Option<String>,

        #[arg(short, long)]
        style: Option<String>,

        #[command(flatten)]
        account: AccountArgs,

        /// Store only, do not post
        #[arg(long)]
        no_post: bool,
    },
}

#[derive(clap::Args)]
struct AccountArgs {
    /// Account username, email or phone
    #[arg(short, long)]
    username: Option<String>,

    /// Environment variable holding the password
    #[arg(long, default_value = DEFAULT_PASSWORD_ENV)]
    password_env: String,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

impl AccountArgs {
    fn credentials(&self) -> Result<Option<Credentials>> {
        let Some(username) = self.username.clone() else {
            return Ok(None);
        };
        let password = std::env::var(&self.password_env)
            .with_context(|| format!("Set {} to the account password", self.password_env))?;
        Ok(Some(Credentials::new(username, password)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { force } => cmd_init(&cli.config, force).await,
        Commands::Serve { port } => cmd_serve(&cli.config, port).await,
        Commands::Generate {
            topic,
            length,
            style,
            json,
        } => cmd_generate(&cli.config, topic, length, style, json).await,
        Commands::Post {
            text,
            account,
            link,
        } => cmd_post(&cli.config, text, account, link).await,
        Commands::Publish {
            topic,
            length,
            style,
            account,
            no_post,
        } => cmd_publish(&cli.config, topic, length, style, account, no_post).await,
    }
}

fn load_config(path: &Path) -> Result<AutoblogConfig> {
    AutoblogConfig::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

async fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AutoblogConfig::write_default(path)?;
    println!("Wrote {}", path.display());
    println!("Set GEMINI_API_KEY before generating content.");
    Ok(())
}

async fn cmd_serve(path: &Path, port: Option<u16>) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    autoblog_server::run(config).await
}

fn generator(config: &AutoblogConfig) -> Result<ContentGenerator<GeminiClient>> {
    let client = GeminiClient::from_config(&config.generator)?;
    Ok(ContentGenerator::new(client)
        .with_placeholder(config.publish.link_placeholder.clone())
        .with_link_reserve(config.generator.link_reserve))
}

fn automaton(config: &AutoblogConfig, headed: bool) -> PublishingAutomaton {
    let mut browser = config.browser.clone();
    if headed {
        browser.headless = false;
    }
    PublishingAutomaton::chrome(browser)
}

async fn cmd_generate(
    path: &Path,
    topic: String,
    length: Option<String>,
    style: Option<String>,
    json: bool,
) -> Result<()> {
    let config = load_config(path)?;
    let generator = generator(&config)?;

    let content = generator
        .generate(
            &topic,
            Length::parse_or_default(length.as_deref()),
            Style::parse_or_default(style.as_deref()),
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
        return Ok(());
    }

    println!("Title: {}", content.title);
    println!(
        "Words: {} (~{} min read)",
        content.metadata.word_count, content.metadata.reading_time
    );
    println!();
    println!("Promo ({} chars):", content.blurb.chars().count());
    println!("  {}", content.blurb);
    println!();
    println!("{}", content.article);
    Ok(())
}

fn print_outcome(outcome: &PublishOutcome) {
    if outcome.succeeded {
        match outcome.confirmation {
            Some(signal) => println!("Posted ({:?}): {}", signal, outcome.final_text),
            None => println!("Posted (unconfirmed): {}", outcome.final_text),
        }
    } else {
        println!(
            "Posting failed: {}",
            outcome.diagnostic.as_deref().unwrap_or("unknown failure")
        );
    }
    info!("States: {}", outcome.trace.join(" -> "));
}

async fn cmd_post(path: &Path, text: String, account: AccountArgs, link: Option<String>) -> Result<()> {
    let config = load_config(path)?;
    let Some(credentials) = account.credentials()? else {
        bail!("--username is required to post");
    };

    let request = PublishRequest::new(text, credentials)
        .with_placeholder(config.publish.link_placeholder.clone())
        .with_link(link);
    request.validate()?;

    let outcome = automaton(&config, account.headed).publish(&request).await?;
    print_outcome(&outcome);

    if !outcome.succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_publish(
    path: &Path,
    topic: String,
    length: Option<String>,
    style: Option<String>,
    account: AccountArgs,
    no_post: bool,
) -> Result<()> {
    let config = load_config(path)?;
    let generator = generator(&config)?;
    let credentials = account.credentials()?;

    let content = generator
        .generate(
            &topic,
            Length::parse_or_default(length.as_deref()),
            Style::parse_or_default(style.as_deref()),
        )
        .await?;
    info!("Generated \"{}\"", content.title);

    let publisher = AdmissionControl::from_config(automaton(&config, account.headed), &config.publish);
    let orchestrator = PublishOrchestrator::new(
        Arc::new(InMemoryBlogStore::new()),
        Arc::new(publisher),
        config.publish.clone(),
    );

    let report = orchestrator
        .publish_both(
            BlogDraft::new(content.title.clone(), content.article.clone()),
            &content.blurb,
            !no_post,
            credentials,
        )
        .await?;

    println!("Saved blog {}: {}", report.blog.id, report.blog.title);
    println!("Link: {}", config.publish.blog_link(report.blog.id));
    match &report.automation {
        Some(outcome) => print_outcome(outcome),
        None => println!("Not posted"),
    }
    Ok(())
}
