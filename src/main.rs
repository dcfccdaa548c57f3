mod api;
mod config;
mod error;
mod form;
mod html;
mod model;
mod notice;
mod quote;
mod serve;
mod web_assets;

use std::{io, path::PathBuf, process, sync::Arc};

use clap::{Args, Parser, Subcommand};

use api::{HttpTableApi, TableApi};
use config::SiteConfig;
use model::QuoteForm;
use notice::NoticeLoader;
use quote::QuoteSubmitter;

/// Settings shared by every subcommand that talks to the table service.
#[derive(Args)]
struct ApiArgs {
    /// Base URL of the table API (the `tables/...` endpoints live beneath it)
    #[arg(long, env = "DSNW_API_BASE")]
    api_base: String,
    /// Hours east of UTC used for notice dates
    #[arg(long, default_value_t = 9, allow_negative_numbers = true)]
    utc_offset: i32,
    /// Phone number shown when a quote submission fails
    #[arg(long)]
    contact_phone: Option<String>,
}

impl ApiArgs {
    fn site_config(&self) -> SiteConfig {
        SiteConfig::default()
            .with_utc_offset_hours(self.utc_offset)
            .with_contact_phone(self.contact_phone.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site directory, rendering notices and relaying quote requests
    Serve {
        /// Directory holding the static site (index.html, css/, images/ ...)
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Interface address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Starting port number for the HTTP server
        #[arg(long, default_value = "3333")]
        port: u16,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Fetch the notice list once and print the rendered HTML fragment
    Notices {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Submit one quote request from the command line
    Quote {
        #[command(flatten)]
        api: ApiArgs,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Digits only is fine; formatted as 010-1234-5678
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        service: String,
        #[arg(long, default_value = "")]
        message: String,
    },
}

#[derive(Parser)]
#[command(
    name = "dsnw-site",
    version,
    about = "Branch-office site server: notice feed and quote requests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn table_api(args: &ApiArgs) -> Arc<dyn TableApi> {
    match HttpTableApi::new(&args.api_base) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Serve {
            root,
            bind,
            port,
            api,
        } => {
            if !root.is_dir() {
                eprintln!("Error: site root is not a directory: {}", root.display());
                process::exit(1);
            }
            let config = api.site_config();
            let table = table_api(&api);
            runtime()?.block_on(serve::run_serve(root, bind, port, table, config))
        }
        Commands::Notices { api } => {
            let loader = NoticeLoader::new(table_api(&api), api.site_config());
            let html = runtime()?.block_on(loader.load_and_render());
            print!("{html}");
            Ok(())
        }
        Commands::Quote {
            api,
            company,
            name,
            phone,
            email,
            service,
            message,
        } => {
            let submitter = QuoteSubmitter::new(table_api(&api), api.site_config());
            let mut quote_form = QuoteForm {
                company,
                name,
                phone: form::format_phone(&phone),
                email,
                service,
                message,
            };
            let outcome = runtime()?.block_on(submitter.submit(&mut quote_form));
            println!("{}", outcome.message(submitter.config()));
            if !outcome.is_accepted() {
                process::exit(1);
            }
            Ok(())
        }
    }
}
