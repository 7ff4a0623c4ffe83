use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    view::{DirectoryView, FormView},
    CreationFormController, DirectoryApi, DirectoryCache, HttpDirectoryApi, SubmitOutcome,
};
use shared::domain::CustomerField;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, normalize_base_url, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "directory", about = "List and add customers")]
struct Args {
    /// Overrides the base URL from the config file and environment.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the customer directory.
    List,
    /// Create a customer, then print the refreshed directory.
    Add {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(base_url) = &args.base_url {
        settings.base_url = normalize_base_url(base_url);
    }
    info!(base_url = %settings.base_url, "using customer directory");

    let api: Arc<dyn DirectoryApi> = Arc::new(
        HttpDirectoryApi::new(&settings.base_url).context("failed to build directory client")?,
    );
    let cache = DirectoryCache::new(Arc::clone(&api));

    match args.command {
        Command::List => {
            let state = cache.load().await;
            print!("{}", render::directory(&DirectoryView::render(&state)));
            if let Some(err) = state.error() {
                bail!("failed to load customers ({})", err.code);
            }
        }
        Command::Add {
            first_name,
            last_name,
            email,
        } => {
            let form = CreationFormController::new(api, cache.clone());
            form.open();
            form.set_field(CustomerField::FirstName, first_name);
            form.set_field(CustomerField::LastName, last_name);
            form.set_field(CustomerField::Email, email);

            match form.submit().await {
                SubmitOutcome::Created => {
                    println!("Customer created.");
                    print!(
                        "{}",
                        render::directory(&DirectoryView::render(&cache.state()))
                    );
                }
                outcome => {
                    print!("{}", render::form(&FormView::render(&form.state())));
                    bail!("customer was not created ({outcome:?})");
                }
            }
        }
    }

    Ok(())
}
