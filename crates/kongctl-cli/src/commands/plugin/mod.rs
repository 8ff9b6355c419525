//! `kongctl plugin` - the Kong plugin object.
//!
//! A plugin entity represents configuration that runs during the HTTP
//! request/response lifecycle of a service or route. Creation is per plugin
//! kind (each kind has its own config shape); get/list/delete are generic.

pub mod basic_auth;
pub mod statsd;

use clap::{Args, Subcommand};
use serde::Deserialize;

use kongctl_client::Gateway;

use crate::commands::first_nonempty;
use crate::output;

const PLUGIN_RESOURCE: &str = "plugins";

/// Plugin kinds this CLI knows how to create.
const AVAILABLE_PLUGINS: &[(&str, &str)] = &[
    (
        "basic-auth",
        "checks for valid credentials in the Proxy-Authorization and Authorization headers",
    ),
    ("statsd", "logs metrics for a service or route to a StatsD server"),
];

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List the plugin kinds this CLI can create.
    AvailablePlugins,
    /// Create a plugin object.
    #[command(subcommand)]
    Create(CreatePlugin),
    /// Retrieve a plugin object.
    Get {
        /// The plugin id.
        #[arg(long)]
        id: String,
    },
    /// List all plugin objects.
    List(PluginListFlags),
    /// Delete a plugin object.
    Delete {
        /// The plugin id.
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CreatePlugin {
    /// Basic Authentication for a service or route.
    BasicAuth(basic_auth::BasicAuthArgs),
    /// StatsD metrics logging for a service or route.
    Statsd(statsd::StatsdArgs),
}

/// Where a new plugin attaches: a service, a route, or globally.
#[derive(Args, Debug, Clone)]
pub struct PluginScope {
    /// The service the plugin should be associated to.
    #[arg(long)]
    pub service_id: Option<String>,

    /// The route the plugin should be associated to.
    #[arg(long)]
    pub route_id: Option<String>,

    /// The consumer whose requests the plugin settings apply to.
    #[arg(long)]
    pub consumer_id: Option<String>,
}

impl PluginScope {
    /// Scoped plugin collection: service first, then route, else global.
    fn plugins_path(&self) -> String {
        if let Some(id) = first_nonempty(&[self.service_id.as_deref()]) {
            format!("services/{id}/plugins")
        } else if let Some(id) = first_nonempty(&[self.route_id.as_deref()]) {
            format!("routes/{id}/plugins")
        } else {
            PLUGIN_RESOURCE.to_string()
        }
    }
}

#[derive(Args, Debug)]
pub struct PluginListFlags {
    /// Filter by plugin name.
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by associated service id.
    #[arg(long)]
    pub service_id: Option<String>,

    /// Filter by associated route id.
    #[arg(long)]
    pub route_id: Option<String>,

    /// Filter by associated consumer id.
    #[arg(long)]
    pub consumer_id: Option<String>,

    /// A limit on the number of objects to be returned.
    #[arg(long, default_value = "100")]
    pub size: String,
}

#[derive(Debug, Deserialize)]
struct PluginList {
    #[serde(default)]
    data: Vec<PluginSummary>,
}

#[derive(Debug, Deserialize)]
struct PluginSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    enabled: Option<bool>,
}

pub async fn run(gateway: &Gateway, command: PluginCommand) -> anyhow::Result<()> {
    match command {
        PluginCommand::AvailablePlugins => {
            available_plugins();
            Ok(())
        }
        PluginCommand::Create(create) => match create {
            CreatePlugin::BasicAuth(args) => basic_auth::run(gateway, args).await,
            CreatePlugin::Statsd(args) => statsd::run(gateway, args).await,
        },
        PluginCommand::Get { id } => get(gateway, &id).await,
        PluginCommand::List(flags) => list(gateway, &flags).await,
        PluginCommand::Delete { id } => delete(gateway, &id).await,
    }
}

fn available_plugins() {
    println!("{:<14}  {}", "NAME", "DESCRIPTION");
    for (name, description) in AVAILABLE_PLUGINS {
        println!("{name:<14}  {description}");
    }
}

async fn get(gateway: &Gateway, id: &str) -> anyhow::Result<()> {
    if id.is_empty() {
        anyhow::bail!("--id must not be empty");
    }

    let path = format!("{PLUGIN_RESOURCE}/{id}");
    let response = gateway.get(&path, &[]).await?;
    output::print_json(response).await
}

async fn list(gateway: &Gateway, flags: &PluginListFlags) -> anyhow::Result<()> {
    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(name) = flags.name.as_deref() {
        query.push(("name", name));
    }
    if let Some(service_id) = flags.service_id.as_deref() {
        query.push(("service_id", service_id));
    }
    if let Some(route_id) = flags.route_id.as_deref() {
        query.push(("route_id", route_id));
    }
    if let Some(consumer_id) = flags.consumer_id.as_deref() {
        query.push(("consumer_id", consumer_id));
    }
    query.push(("size", flags.size.as_str()));

    let response = gateway.get(PLUGIN_RESOURCE, &query).await?;
    let plugins: PluginList = response.json().await?;

    println!("{:<36}  {:<20}  {}", "ID", "NAME", "ENABLED");
    for plugin in plugins.data {
        println!(
            "{:<36}  {:<20}  {}",
            plugin.id,
            plugin.name,
            plugin.enabled.map_or_else(String::new, |e| e.to_string()),
        );
    }
    Ok(())
}

async fn delete(gateway: &Gateway, id: &str) -> anyhow::Result<()> {
    if id.is_empty() {
        anyhow::bail!("--id must not be empty");
    }

    let path = format!("{PLUGIN_RESOURCE}/{id}");
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "plugin").await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(service: Option<&str>, route: Option<&str>) -> PluginScope {
        PluginScope {
            service_id: service.map(str::to_string),
            route_id: route.map(str::to_string),
            consumer_id: None,
        }
    }

    #[test]
    fn scope_prefers_service_over_route() {
        assert_eq!(
            scope(Some("svc-1"), Some("rt-1")).plugins_path(),
            "services/svc-1/plugins"
        );
    }

    #[test]
    fn scope_uses_route_when_no_service() {
        assert_eq!(
            scope(None, Some("rt-1")).plugins_path(),
            "routes/rt-1/plugins"
        );
    }

    #[test]
    fn scope_defaults_to_global() {
        assert_eq!(scope(None, None).plugins_path(), "plugins");
        assert_eq!(scope(Some(""), Some("")).plugins_path(), "plugins");
    }
}
