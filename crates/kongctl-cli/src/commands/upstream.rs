//! `kongctl upstream` - the Kong upstream object.
//!
//! An upstream is a virtual hostname used to load-balance incoming requests
//! over multiple targets.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use kongctl_client::Gateway;

use crate::commands::resource_path;
use crate::output;

const UPSTREAM_RESOURCE: &str = "upstreams";

#[derive(Subcommand, Debug)]
pub enum UpstreamCommand {
    /// Create an upstream object.
    Create(UpstreamFlags),
    /// Retrieve an upstream object.
    Get(UpstreamRef),
    /// List all upstream objects.
    List(UpstreamListFlags),
    /// Delete an upstream object.
    Delete(UpstreamRef),
}

/// Identifies an upstream by name or id.
#[derive(Args, Debug)]
pub struct UpstreamRef {
    /// The upstream name.
    #[arg(long)]
    pub name: Option<String>,

    /// The upstream id.
    #[arg(long)]
    pub id: Option<String>,
}

impl UpstreamRef {
    fn path(&self) -> anyhow::Result<String> {
        resource_path(
            UPSTREAM_RESOURCE,
            [self.name.as_deref(), self.id.as_deref()],
        )
    }
}

#[derive(Args, Debug)]
pub struct UpstreamListFlags {
    /// Filter by upstream name.
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by upstream id.
    #[arg(long)]
    pub id: Option<String>,

    /// A limit on the number of objects to be returned.
    #[arg(long, default_value = "100")]
    pub size: String,
}

#[derive(Args, Debug)]
pub struct UpstreamFlags {
    /// A hostname, which must be equal to the host of a service.
    #[arg(long)]
    pub name: Option<String>,

    /// The number of slots in the load balancer algorithm (10-65536).
    #[arg(long, default_value_t = 1000)]
    pub slots: u32,

    /// What to use as hashing input: none, consumer, ip, header, or cookie.
    #[arg(long, default_value = "none")]
    pub hash_on: String,

    /// Hashing input if the primary hash_on does not return a hash.
    #[arg(long, default_value = "none")]
    pub hash_fallback: String,

    /// Header name to take the hash input from (hash_on = header).
    #[arg(long)]
    pub hash_on_header: Option<String>,

    /// Header name to take the fallback hash input from
    /// (hash_fallback = header).
    #[arg(long)]
    pub hash_fallback_header: Option<String>,

    /// Cookie name to take the hash input from (hash_on = cookie).
    #[arg(long)]
    pub hash_on_cookie: Option<String>,

    /// Cookie path to set in the response headers (hash_on = cookie).
    #[arg(long, default_value = "/")]
    pub hash_on_cookie_path: String,

    /// Socket timeout for active health checks, in seconds.
    #[arg(long)]
    pub active_timeout: Option<u32>,

    /// Number of targets to check concurrently in active health checks.
    #[arg(long)]
    pub active_concurrency: Option<u32>,

    /// Path of the GET probe used by active health checks.
    #[arg(long)]
    pub active_http_path: Option<String>,

    /// Interval between active probes of healthy targets, in seconds.
    #[arg(long)]
    pub active_healthy_interval: Option<u32>,

    /// HTTP statuses an active probe counts as a success.
    #[arg(long, value_delimiter = ',')]
    pub active_healthy_http_statuses: Vec<u16>,

    /// Successful active probes needed to consider a target healthy.
    #[arg(long)]
    pub active_healthy_successes: Option<u32>,

    /// Interval between active probes of unhealthy targets, in seconds.
    #[arg(long)]
    pub active_unhealthy_interval: Option<u32>,

    /// HTTP statuses an active probe counts as a failure.
    #[arg(long, value_delimiter = ',')]
    pub active_unhealthy_http_statuses: Vec<u16>,

    /// TCP failures in active probes to consider a target unhealthy.
    #[arg(long)]
    pub active_unhealthy_tcp_failures: Option<u32>,

    /// Probe timeouts to consider a target unhealthy.
    #[arg(long)]
    pub active_unhealthy_timeouts: Option<u32>,

    /// HTTP failures in active probes to consider a target unhealthy.
    #[arg(long)]
    pub active_unhealthy_http_failures: Option<u32>,

    /// HTTP statuses proxied traffic counts as healthy.
    #[arg(long, value_delimiter = ',')]
    pub passive_healthy_http_statuses: Vec<u16>,

    /// Proxied successes to consider a target healthy.
    #[arg(long)]
    pub passive_healthy_successes: Option<u32>,

    /// HTTP statuses proxied traffic counts as unhealthy.
    #[arg(long, value_delimiter = ',')]
    pub passive_unhealthy_http_statuses: Vec<u16>,

    /// TCP failures in proxied traffic to consider a target unhealthy.
    #[arg(long)]
    pub passive_unhealthy_tcp_failures: Option<u32>,

    /// Proxied-traffic timeouts to consider a target unhealthy.
    #[arg(long)]
    pub passive_unhealthy_timeouts: Option<u32>,

    /// HTTP failures in proxied traffic to consider a target unhealthy.
    #[arg(long)]
    pub passive_unhealthy_http_failures: Option<u32>,
}

/// Upstream payload sent to the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamConfig {
    pub name: String,
    pub slots: u32,
    pub hash_on: String,
    pub hash_fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_on_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_fallback_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_on_cookie: Option<String>,
    pub hash_on_cookie_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthchecks: Option<HealthChecks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveChecks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive: Option<PassiveChecks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActiveChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<HealthyChecks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unhealthy: Option<UnhealthyChecks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PassiveChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<HealthyChecks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unhealthy: Option<UnhealthyChecks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthyChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub http_statuses: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successes: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnhealthyChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub http_statuses: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_failures: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeouts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_failures: Option<u32>,
}

impl UpstreamFlags {
    fn health_checks(&self) -> Option<HealthChecks> {
        let active_healthy = build_healthy(
            self.active_healthy_interval,
            &self.active_healthy_http_statuses,
            self.active_healthy_successes,
        );
        let active_unhealthy = build_unhealthy(
            self.active_unhealthy_interval,
            &self.active_unhealthy_http_statuses,
            self.active_unhealthy_tcp_failures,
            self.active_unhealthy_timeouts,
            self.active_unhealthy_http_failures,
        );

        let active = if self.active_timeout.is_none()
            && self.active_concurrency.is_none()
            && self.active_http_path.is_none()
            && active_healthy.is_none()
            && active_unhealthy.is_none()
        {
            None
        } else {
            Some(ActiveChecks {
                timeout: self.active_timeout,
                concurrency: self.active_concurrency,
                http_path: self.active_http_path.clone(),
                healthy: active_healthy,
                unhealthy: active_unhealthy,
            })
        };

        let passive_healthy = build_healthy(
            None,
            &self.passive_healthy_http_statuses,
            self.passive_healthy_successes,
        );
        let passive_unhealthy = build_unhealthy(
            None,
            &self.passive_unhealthy_http_statuses,
            self.passive_unhealthy_tcp_failures,
            self.passive_unhealthy_timeouts,
            self.passive_unhealthy_http_failures,
        );

        let passive = if passive_healthy.is_none() && passive_unhealthy.is_none() {
            None
        } else {
            Some(PassiveChecks {
                healthy: passive_healthy,
                unhealthy: passive_unhealthy,
            })
        };

        if active.is_none() && passive.is_none() {
            None
        } else {
            Some(HealthChecks { active, passive })
        }
    }

    fn into_config(self) -> anyhow::Result<UpstreamConfig> {
        let Some(name) = self.name.clone().filter(|n| !n.is_empty()) else {
            anyhow::bail!("--name is required to create an upstream");
        };

        let healthchecks = self.health_checks();
        Ok(UpstreamConfig {
            name,
            slots: self.slots,
            hash_on: self.hash_on,
            hash_fallback: self.hash_fallback,
            hash_on_header: self.hash_on_header,
            hash_fallback_header: self.hash_fallback_header,
            hash_on_cookie: self.hash_on_cookie,
            hash_on_cookie_path: self.hash_on_cookie_path,
            healthchecks,
        })
    }
}

fn build_healthy(
    interval: Option<u32>,
    http_statuses: &[u16],
    successes: Option<u32>,
) -> Option<HealthyChecks> {
    if interval.is_none() && http_statuses.is_empty() && successes.is_none() {
        return None;
    }
    Some(HealthyChecks {
        interval,
        http_statuses: http_statuses.to_vec(),
        successes,
    })
}

fn build_unhealthy(
    interval: Option<u32>,
    http_statuses: &[u16],
    tcp_failures: Option<u32>,
    timeouts: Option<u32>,
    http_failures: Option<u32>,
) -> Option<UnhealthyChecks> {
    if interval.is_none()
        && http_statuses.is_empty()
        && tcp_failures.is_none()
        && timeouts.is_none()
        && http_failures.is_none()
    {
        return None;
    }
    Some(UnhealthyChecks {
        interval,
        http_statuses: http_statuses.to_vec(),
        tcp_failures,
        timeouts,
        http_failures,
    })
}

#[derive(Debug, Deserialize)]
struct UpstreamList {
    #[serde(default)]
    data: Vec<UpstreamSummary>,
}

#[derive(Debug, Deserialize)]
struct UpstreamSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    hash_on: Option<String>,
    #[serde(default)]
    hash_fallback: Option<String>,
    #[serde(default)]
    slots: Option<u32>,
}

pub async fn run(gateway: &Gateway, command: UpstreamCommand) -> anyhow::Result<()> {
    match command {
        UpstreamCommand::Create(flags) => create(gateway, flags).await,
        UpstreamCommand::Get(upstream) => get(gateway, &upstream).await,
        UpstreamCommand::List(flags) => list(gateway, &flags).await,
        UpstreamCommand::Delete(upstream) => delete(gateway, &upstream).await,
    }
}

async fn create(gateway: &Gateway, flags: UpstreamFlags) -> anyhow::Result<()> {
    let cfg = flags.into_config()?;
    let response = gateway.post(UPSTREAM_RESOURCE, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn get(gateway: &Gateway, upstream: &UpstreamRef) -> anyhow::Result<()> {
    let path = upstream.path()?;
    let response = gateway.get(&path, &[]).await?;
    output::print_json(response).await
}

async fn list(gateway: &Gateway, flags: &UpstreamListFlags) -> anyhow::Result<()> {
    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(id) = flags.id.as_deref() {
        query.push(("id", id));
    }
    if let Some(name) = flags.name.as_deref() {
        query.push(("name", name));
    }
    query.push(("size", flags.size.as_str()));

    let response = gateway.get(UPSTREAM_RESOURCE, &query).await?;
    let upstreams: UpstreamList = response.json().await?;

    println!(
        "{:<36}  {:<24}  {:<10}  {:<14}  {}",
        "ID", "NAME", "HASH_ON", "HASH_FALLBACK", "SLOTS"
    );
    for upstream in upstreams.data {
        println!(
            "{:<36}  {:<24}  {:<10}  {:<14}  {}",
            upstream.id,
            upstream.name,
            upstream.hash_on.unwrap_or_default(),
            upstream.hash_fallback.unwrap_or_default(),
            upstream.slots.map_or_else(String::new, |s| s.to_string()),
        );
    }
    Ok(())
}

async fn delete(gateway: &Gateway, upstream: &UpstreamRef) -> anyhow::Result<()> {
    let path = upstream.path()?;
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "upstream").await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_flags() -> UpstreamFlags {
        UpstreamFlags {
            name: Some("service.v1.internal".to_string()),
            slots: 1000,
            hash_on: "none".to_string(),
            hash_fallback: "none".to_string(),
            hash_on_header: None,
            hash_fallback_header: None,
            hash_on_cookie: None,
            hash_on_cookie_path: "/".to_string(),
            active_timeout: None,
            active_concurrency: None,
            active_http_path: None,
            active_healthy_interval: None,
            active_healthy_http_statuses: Vec::new(),
            active_healthy_successes: None,
            active_unhealthy_interval: None,
            active_unhealthy_http_statuses: Vec::new(),
            active_unhealthy_tcp_failures: None,
            active_unhealthy_timeouts: None,
            active_unhealthy_http_failures: None,
            passive_healthy_http_statuses: Vec::new(),
            passive_healthy_successes: None,
            passive_unhealthy_http_statuses: Vec::new(),
            passive_unhealthy_tcp_failures: None,
            passive_unhealthy_timeouts: None,
            passive_unhealthy_http_failures: None,
        }
    }

    #[test]
    fn config_without_healthcheck_flags_omits_healthchecks() {
        let json = serde_json::to_value(base_flags().into_config().unwrap()).unwrap();
        assert_eq!(json["name"], "service.v1.internal");
        assert_eq!(json["slots"], 1000);
        assert!(json.get("healthchecks").is_none());
    }

    #[test]
    fn config_builds_nested_active_checks() {
        let mut flags = base_flags();
        flags.active_http_path = Some("/health".to_string());
        flags.active_healthy_http_statuses = vec![200, 302];
        flags.active_healthy_successes = Some(3);

        let json = serde_json::to_value(flags.into_config().unwrap()).unwrap();
        let active = &json["healthchecks"]["active"];
        assert_eq!(active["http_path"], "/health");
        assert_eq!(active["healthy"]["http_statuses"], serde_json::json!([200, 302]));
        assert_eq!(active["healthy"]["successes"], 3);
        assert!(json["healthchecks"].get("passive").is_none());
    }

    #[test]
    fn create_requires_a_name() {
        let mut flags = base_flags();
        flags.name = None;
        assert!(flags.into_config().is_err());
    }
}
