use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use accio_workflows::api::client::HttpWorkflowSource;
use accio_workflows::config::AppConfig;
use accio_workflows::list::query::parse_filter;
use accio_workflows::list::view::format_table;
use accio_workflows::list::{ListContainer, ListQuery, PageState};

#[derive(Parser)]
#[command(name = "accio-workflows", about = "List workflows registered on an Accio gateway")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Gateway base URL, overrides the configured one
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one page of workflows
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Filter as key=value, may be repeated
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        config.validate()?;
    }

    tracing::debug!(api = ?config.api, list = ?config.list, "Loaded configuration");

    match cli.command {
        Command::List {
            page,
            filters,
            json,
        } => {
            let query = filters
                .iter()
                .map(|raw| parse_filter(raw))
                .collect::<Result<ListQuery, _>>()?;
            let state = PageState::new(page, query)?;

            let source = HttpWorkflowSource::new(&config.api, config.list.per_page)?;
            let container = ListContainer::new(Arc::new(source), config.list.ordering);

            let handle = if state.is_default() {
                container.mount().await
            } else {
                container.on_change(state)
            };
            if let Some(handle) = handle {
                handle.await?;
            }

            let props = container.render().await;
            if let Some(ref error) = props.error {
                anyhow::bail!("Failed to list workflows: {error}");
            }

            if json {
                let body = serde_json::json!({
                    "page": props.page,
                    "query": props.query,
                    "results": props.workflows.unwrap_or_default(),
                    "total_count": props.total_count,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", format_table(&props, config.list.per_page));
            }

            container.dispose();
        }
    }

    Ok(())
}
