//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Content engine for a file-based portfolio and blog site", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Disable content watching (no cache invalidation on change)
        #[arg(long)]
        no_watch: bool,
    },

    /// List content
    List {
        /// Type of content to list (post, category, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show one post and its heading outline
    Show {
        /// Post slug
        slug: String,
    },

    /// Create a new content file
    New {
        /// Title of the new post
        title: String,

        /// Category to assign
        #[arg(short = 'c', long)]
        category: Option<String>,
    },

    /// Validate all content files
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let folio = folio::Folio::new(&base_dir)?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_watch,
        } => {
            let host = host.unwrap_or_else(|| folio.config.server.host.clone());
            let port = port.unwrap_or(folio.config.server.port);
            tracing::info!("starting server at http://{}:{}", host, port);
            folio::server::start(&folio, &host, port, !no_watch).await?;
        }

        Commands::List { r#type } => {
            folio::commands::list::run(&folio, &r#type)?;
        }

        Commands::Show { slug } => {
            folio::commands::show::run(&folio, &slug)?;
        }

        Commands::New { title, category } => {
            tracing::info!("creating new post: {}", title);
            folio::commands::new::run(&folio, &title, category.as_deref())?;
        }

        Commands::Check => {
            folio::commands::check::run(&folio)?;
        }
    }

    Ok(())
}
