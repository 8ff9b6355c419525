//! `kongctl route` - the Kong route object.
//!
//! Routes define rules to match client requests; every matching request is
//! proxied to the route's associated service.

use clap::{Args, Subcommand};
use serde::Serialize;

use kongctl_client::Gateway;

use crate::output;

const ROUTE_RESOURCE: &str = "routes";

#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// Create a route object.
    Create(RouteFlags),
    /// Retrieve a route object.
    Get(RouteGetFlags),
    /// Delete a route object.
    Delete {
        /// The route id.
        #[arg(long)]
        id: String,
    },
    /// List all route objects.
    List,
}

#[derive(Args, Debug)]
pub struct RouteFlags {
    /// A list of the protocols this route should allow.
    #[arg(long, value_delimiter = ',')]
    pub protocols: Vec<String>,

    /// A list of HTTP methods that match this route.
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,

    /// A list of domain names that match this route.
    #[arg(long, value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// A list of paths that match this route.
    #[arg(long, value_delimiter = ',')]
    pub paths: Vec<String>,

    /// Determines the relative order of this route against others when
    /// evaluating regex paths.
    #[arg(long, default_value_t = 0)]
    pub regex_priority: i32,

    /// When matching via one of the paths, strip the matching prefix from
    /// the upstream request URL.
    #[arg(long, default_value_t = false)]
    pub strip_path: bool,

    /// When matching via one of the hosts, use the request Host header in
    /// the upstream request headers.
    #[arg(long, default_value_t = false)]
    pub preserve_host: bool,

    /// The service id this route is associated to.
    #[arg(long)]
    pub service_id: String,
}

#[derive(Args, Debug)]
pub struct RouteGetFlags {
    /// The route id.
    #[arg(long)]
    pub id: String,

    /// A limit on the number of objects to be returned per page.
    #[arg(long, default_value = "100")]
    pub size: String,

    /// A pagination cursor; an object identifier that defines a place in
    /// the list.
    #[arg(long)]
    pub offset: Option<String>,
}

/// Route payload sent to the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct RouteConfig {
    pub protocols: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    pub regex_priority: i32,
    pub strip_path: bool,
    pub preserve_host: bool,
    pub service: ServiceId,
}

/// Foreign-key reference to a service.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceId {
    pub id: String,
}

pub async fn run(gateway: &Gateway, command: RouteCommand) -> anyhow::Result<()> {
    match command {
        RouteCommand::Create(flags) => create(gateway, flags).await,
        RouteCommand::Get(flags) => get(gateway, &flags).await,
        RouteCommand::Delete { id } => delete(gateway, &id).await,
        RouteCommand::List => list(gateway).await,
    }
}

async fn create(gateway: &Gateway, flags: RouteFlags) -> anyhow::Result<()> {
    if flags.service_id.is_empty() {
        anyhow::bail!("--service-id must not be empty");
    }

    let cfg = RouteConfig {
        protocols: flags.protocols,
        methods: flags.methods,
        hosts: flags.hosts,
        paths: flags.paths,
        regex_priority: flags.regex_priority,
        strip_path: flags.strip_path,
        preserve_host: flags.preserve_host,
        service: ServiceId {
            id: flags.service_id,
        },
    };

    let response = gateway.post(ROUTE_RESOURCE, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn get(gateway: &Gateway, flags: &RouteGetFlags) -> anyhow::Result<()> {
    let path = format!("{ROUTE_RESOURCE}/{}", flags.id);

    let mut query: Vec<(&str, &str)> = vec![("size", flags.size.as_str())];
    if let Some(offset) = flags.offset.as_deref() {
        query.push(("offset", offset));
    }

    let response = gateway.get(&path, &query).await?;
    output::print_json(response).await
}

async fn delete(gateway: &Gateway, id: &str) -> anyhow::Result<()> {
    let path = format!("{ROUTE_RESOURCE}/{id}");
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "route").await
}

async fn list(gateway: &Gateway) -> anyhow::Result<()> {
    let response = gateway.get(ROUTE_RESOURCE, &[]).await?;
    output::print_json(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_omits_empty_match_lists() {
        let cfg = RouteConfig {
            protocols: vec!["http".to_string()],
            methods: Vec::new(),
            hosts: Vec::new(),
            paths: vec!["/orders".to_string()],
            regex_priority: 0,
            strip_path: true,
            preserve_host: false,
            service: ServiceId {
                id: "svc-1".to_string(),
            },
        };

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["protocols"], serde_json::json!(["http"]));
        assert_eq!(json["paths"], serde_json::json!(["/orders"]));
        assert_eq!(json["service"]["id"], "svc-1");
        assert!(json.get("methods").is_none());
        assert!(json.get("hosts").is_none());
    }
}
