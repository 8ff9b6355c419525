//! `kongctl service` - the Kong service object.
//!
//! A service is the abstraction of an upstream API or microservice; routes
//! attach to it and proxy matching requests.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use kongctl_client::Gateway;

use crate::commands::resource_path;
use crate::output;

const SERVICE_RESOURCE: &str = "services";

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Create a service object.
    Create(ServiceFlags),
    /// Retrieve a service object.
    Get(ServiceRef),
    /// Update a service object.
    Update(ServiceFlags),
    /// Delete a service object.
    Delete(ServiceRef),
    /// List all service objects.
    List,
}

/// Identifies a service by name or id.
#[derive(Args, Debug)]
pub struct ServiceRef {
    /// The service name.
    #[arg(long)]
    pub name: Option<String>,

    /// The service id.
    #[arg(long)]
    pub id: Option<String>,
}

impl ServiceRef {
    fn path(&self) -> anyhow::Result<String> {
        resource_path(
            SERVICE_RESOURCE,
            [self.name.as_deref(), self.id.as_deref()],
        )
    }
}

#[derive(Args, Debug)]
pub struct ServiceFlags {
    /// The service name.
    #[arg(long)]
    pub name: Option<String>,

    /// The service id.
    #[arg(long)]
    pub id: Option<String>,

    /// The number of retries to execute upon failure to proxy.
    #[arg(long, default_value_t = 5)]
    pub retries: i64,

    /// The protocol used to communicate with the upstream.
    #[arg(long, default_value = "http")]
    pub protocol: String,

    /// The host of the upstream server.
    #[arg(long)]
    pub host: Option<String>,

    /// The upstream server port.
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// The path to be used in requests to the upstream server.
    #[arg(long)]
    pub path: Option<String>,

    /// Timeout in milliseconds for establishing a connection to the
    /// upstream server.
    #[arg(long, default_value_t = 60_000)]
    pub connect_timeout: i64,

    /// Timeout in milliseconds between two successive write operations for
    /// transmitting a request to the upstream server.
    #[arg(long, default_value_t = 60_000)]
    pub write_timeout: i64,

    /// Timeout in milliseconds between two successive read operations for
    /// transmitting a request to the upstream server.
    #[arg(long, default_value_t = 60_000)]
    pub read_timeout: i64,

    /// Shorthand attribute to set protocol, host, port and path at once.
    #[arg(long)]
    pub url: Option<String>,
}

impl ServiceFlags {
    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            name: self.name,
            retries: self.retries,
            protocol: self.protocol,
            host: self.host,
            port: self.port,
            path: self.path,
            connect_timeout: self.connect_timeout,
            write_timeout: self.write_timeout,
            read_timeout: self.read_timeout,
            url: self.url,
        }
    }
}

/// Service payload sent to the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub retries: i64,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub connect_timeout: i64,
    pub write_timeout: i64,
    pub read_timeout: i64,
    /// Write-only shorthand for protocol, host, port and path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    data: Vec<ServiceSummary>,
}

#[derive(Debug, Deserialize)]
struct ServiceSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
}

pub async fn run(gateway: &Gateway, command: ServiceCommand) -> anyhow::Result<()> {
    match command {
        ServiceCommand::Create(flags) => create(gateway, flags).await,
        ServiceCommand::Get(service) => get(gateway, &service).await,
        ServiceCommand::Update(flags) => update(gateway, flags).await,
        ServiceCommand::Delete(service) => delete(gateway, &service).await,
        ServiceCommand::List => list(gateway).await,
    }
}

async fn create(gateway: &Gateway, flags: ServiceFlags) -> anyhow::Result<()> {
    if flags.name.is_none() || flags.url.is_none() {
        anyhow::bail!("--name and --url are required to create a service");
    }

    let cfg = flags.into_config();
    let response = gateway.post(SERVICE_RESOURCE, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn get(gateway: &Gateway, service: &ServiceRef) -> anyhow::Result<()> {
    let path = service.path()?;
    let response = gateway.get(&path, &[]).await?;
    output::print_json(response).await
}

async fn update(gateway: &Gateway, flags: ServiceFlags) -> anyhow::Result<()> {
    let path = resource_path(
        SERVICE_RESOURCE,
        [flags.name.as_deref(), flags.id.as_deref()],
    )?;

    // PATCH semantics: the identifier lives in the path, not the payload.
    let mut cfg = flags.into_config();
    cfg.name = None;

    let response = gateway.patch(&path, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn delete(gateway: &Gateway, service: &ServiceRef) -> anyhow::Result<()> {
    let path = service.path()?;
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "service").await
}

async fn list(gateway: &Gateway) -> anyhow::Result<()> {
    let response = gateway.get(SERVICE_RESOURCE, &[]).await?;
    let services: ServiceList = response.json().await?;

    println!("{:<36}  {:<30}  {:<6}  {}", "ID", "HOST", "PORT", "NAME");
    for service in services.data {
        println!(
            "{:<36}  {:<30}  {:<6}  {}",
            service.id,
            service.host.unwrap_or_default(),
            service.port.map_or_else(String::new, |p| p.to_string()),
            service.name,
        );
    }
    Ok(())
}
