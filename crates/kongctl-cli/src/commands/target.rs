//! `kongctl target` - the Kong target object.
//!
//! A target is an ip address/hostname with a port that identifies one
//! instance of a backend service. Targets always live under an upstream:
//! `upstreams/{upstream}/targets` (plural segments throughout).

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use kongctl_client::Gateway;

use crate::commands::first_nonempty;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum TargetCommand {
    /// Create a target on an upstream's load balancer.
    Create(TargetCreateFlags),
    /// List all targets on an upstream's load balancing wheel.
    List(TargetListFlags),
    /// Disable a target in the load balancer.
    Delete(TargetDeleteFlags),
}

/// Identifies the owning upstream by id or name.
#[derive(Args, Debug)]
pub struct UpstreamSelector {
    /// The upstream id.
    #[arg(long)]
    pub upstream_id: Option<String>,

    /// The upstream name.
    #[arg(long)]
    pub upstream_name: Option<String>,
}

impl UpstreamSelector {
    fn targets_path(&self) -> anyhow::Result<String> {
        let upstream = first_nonempty(&[self.upstream_id.as_deref(), self.upstream_name.as_deref()])
            .ok_or_else(|| anyhow::anyhow!("an upstream name or id is required"))?;
        Ok(format!("upstreams/{upstream}/targets"))
    }
}

#[derive(Args, Debug)]
pub struct TargetCreateFlags {
    #[command(flatten)]
    pub upstream: UpstreamSelector,

    /// The target address (ip or hostname) and port.
    #[arg(long)]
    pub target: String,

    /// The weight this target gets within the upstream load balancer
    /// (0-1000).
    #[arg(long, default_value_t = 100)]
    pub weight: u32,
}

#[derive(Args, Debug)]
pub struct TargetListFlags {
    #[command(flatten)]
    pub upstream: UpstreamSelector,

    /// Filter by target id.
    #[arg(long)]
    pub id: Option<String>,

    /// Filter by target address.
    #[arg(long)]
    pub target: Option<String>,

    /// Filter by weight.
    #[arg(long)]
    pub weight: Option<String>,
}

#[derive(Args, Debug)]
pub struct TargetDeleteFlags {
    #[command(flatten)]
    pub upstream: UpstreamSelector,

    /// The target id.
    #[arg(long)]
    pub id: Option<String>,

    /// The target address.
    #[arg(long)]
    pub target: Option<String>,
}

/// Target payload sent to the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct TargetConfig {
    pub target: String,
    pub weight: u32,
}

#[derive(Debug, Deserialize)]
struct TargetList {
    #[serde(default)]
    data: Vec<TargetSummary>,
}

#[derive(Debug, Deserialize)]
struct TargetSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    weight: Option<u32>,
}

pub async fn run(gateway: &Gateway, command: TargetCommand) -> anyhow::Result<()> {
    match command {
        TargetCommand::Create(flags) => create(gateway, flags).await,
        TargetCommand::List(flags) => list(gateway, &flags).await,
        TargetCommand::Delete(flags) => delete(gateway, &flags).await,
    }
}

async fn create(gateway: &Gateway, flags: TargetCreateFlags) -> anyhow::Result<()> {
    if flags.target.is_empty() {
        anyhow::bail!("--target must not be empty");
    }

    let path = flags.upstream.targets_path()?;
    let cfg = TargetConfig {
        target: flags.target,
        weight: flags.weight,
    };

    let response = gateway.post(&path, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn list(gateway: &Gateway, flags: &TargetListFlags) -> anyhow::Result<()> {
    let path = flags.upstream.targets_path()?;

    let mut query: Vec<(&str, &str)> = Vec::new();
    if let Some(id) = flags.id.as_deref() {
        query.push(("id", id));
    }
    if let Some(target) = flags.target.as_deref() {
        query.push(("target", target));
    }
    if let Some(weight) = flags.weight.as_deref() {
        query.push(("weight", weight));
    }

    let response = gateway.get(&path, &query).await?;
    let targets: TargetList = response.json().await?;

    println!("{:<36}  {:<28}  {}", "ID", "TARGET", "WEIGHT");
    for target in targets.data {
        println!(
            "{:<36}  {:<28}  {}",
            target.id,
            target.target,
            target.weight.map_or_else(String::new, |w| w.to_string()),
        );
    }
    Ok(())
}

async fn delete(gateway: &Gateway, flags: &TargetDeleteFlags) -> anyhow::Result<()> {
    let base = flags.upstream.targets_path()?;
    let target = first_nonempty(&[flags.id.as_deref(), flags.target.as_deref()])
        .ok_or_else(|| anyhow::anyhow!("a target address or id is required"))?;

    let path = format!("{base}/{target}");
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "target").await
}
