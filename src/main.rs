//! CLI entry point for blogdeck

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogdeck::commands::render::RenderTarget;
use blogdeck::commands::theme::ThemeAction;
use blogdeck::filter::FilterCriteria;
use blogdeck::theme::Theme;
use blogdeck::Blog;

#[derive(Parser)]
#[command(name = "blogdeck")]
#[command(version)]
#[command(about = "Browse, filter and preview a small Markdown blog", long_about = None)]
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
    /// Start the preview server
    #[command(aliases = ["s", "server"])]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// List posts, tags or categories from the index
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,

        /// Only posts whose title, excerpt or tags contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only posts with any of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Only posts in any of these categories
        #[arg(short = 'C', long)]
        category: Vec<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the post index from the pages directory
    Index {
        /// Write the index file instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Render a page to HTML
    Render {
        #[arg(value_enum)]
        page: RenderPage,

        /// Post file, for `post`
        #[arg(short, long)]
        file: Option<String>,

        /// Filter query, for `index` (e.g. "tag=rust&q=async")
        #[arg(short, long)]
        query: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change the saved theme
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeArg,
    },

    /// Show or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },

    /// Display version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderPage {
    Index,
    Post,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Show,
    Toggle,
    Light,
    Dark,
    Reset,
}

impl From<ThemeArg> for ThemeAction {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Show => ThemeAction::Show,
            ThemeArg::Toggle => ThemeAction::Toggle,
            ThemeArg::Light => ThemeAction::Set(Theme::Light),
            ThemeArg::Dark => ThemeAction::Set(Theme::Dark),
            ThemeArg::Reset => ThemeAction::Reset,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogdeck=debug,info"
    } else {
        "blogdeck=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogdeck::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::List {
            r#type,
            search,
            tag,
            category,
            json,
        } => {
            let blog = Blog::new(&base_dir)?;
            let mut criteria = FilterCriteria::new();
            if let Some(search) = search {
                criteria.set_search(&search);
            }
            for tag in &tag {
                criteria.toggle_tag(tag);
            }
            for category in &category {
                criteria.toggle_category(category);
            }
            blogdeck::commands::list::run(&blog, &r#type, &criteria, json).await?;
        }

        Commands::Index { write } => {
            let blog = Blog::new(&base_dir)?;
            blogdeck::commands::index::run(&blog, write)?;
        }

        Commands::Render {
            page,
            file,
            query,
            output,
        } => {
            let blog = Blog::new(&base_dir)?;
            let target = match page {
                RenderPage::Index => RenderTarget::Index {
                    query: query.unwrap_or_default(),
                },
                RenderPage::Post => match file {
                    Some(file) => RenderTarget::Post { file },
                    None => anyhow::bail!("Rendering a post needs --file"),
                },
            };
            blogdeck::commands::render::run(&blog, &target, output.as_deref()).await?;
        }

        Commands::Theme { action } => {
            let blog = Blog::new(&base_dir)?;
            blogdeck::commands::theme::run(&blog, action.into())?;
        }

        Commands::History { clear } => {
            let blog = Blog::new(&base_dir)?;
            blogdeck::commands::history::run(&blog, clear)?;
        }

        Commands::Version => {
            println!("blogdeck version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
