//! kongctl - command line client for the Kong admin API.
//!
//! Each subcommand maps CLI flags onto one admin REST call and prints the
//! JSON response. The shared HTTP adapter is constructed once here and
//! passed by reference to every command handler.

mod commands;
mod output;

use clap::{Parser, Subcommand};

use kongctl_client::{basic_auth_header, Gateway};

use commands::{consumer, plugin, route, service, target, upstream};

/// Command line client for the Kong admin API.
#[derive(Parser, Debug)]
#[command(name = "kongctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kong admin API address.
    #[arg(
        long,
        global = true,
        env = "KONG_ADMIN_URL",
        default_value = "http://127.0.0.1:8001"
    )]
    admin_url: String,

    /// Basic auth token for the admin API.
    #[arg(long, global = true, env = "KONG_ADMIN_TOKEN")]
    auth: Option<String>,

    /// Enable debug logging.
    #[arg(long, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// The Kong service object.
    #[command(subcommand)]
    Service(service::ServiceCommand),

    /// The Kong route object.
    #[command(subcommand)]
    Route(route::RouteCommand),

    /// The Kong consumer object.
    #[command(subcommand)]
    Consumer(consumer::ConsumerCommand),

    /// The Kong plugin object.
    #[command(subcommand)]
    Plugin(plugin::PluginCommand),

    /// The Kong upstream object.
    #[command(subcommand)]
    Upstream(upstream::UpstreamCommand),

    /// The Kong target object.
    #[command(subcommand)]
    Target(target::TargetCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("kongctl=debug,kongctl_client=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let token = args.auth.as_deref().unwrap_or_default();
    let gateway = Gateway::new(&args.admin_url, basic_auth_header(token)?)?;
    tracing::debug!(admin_url = %args.admin_url, "constructed gateway client");

    match args.command {
        Command::Service(command) => service::run(&gateway, command).await,
        Command::Route(command) => route::run(&gateway, command).await,
        Command::Consumer(command) => consumer::run(&gateway, command).await,
        Command::Plugin(command) => plugin::run(&gateway, command).await,
        Command::Upstream(command) => upstream::run(&gateway, command).await,
        Command::Target(command) => target::run(&gateway, command).await,
    }
}
