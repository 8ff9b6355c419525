//! `kongctl consumer` - the Kong consumer object.
//!
//! A consumer represents a user of a service, identified by a unique
//! username and/or an external `custom_id`.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use kongctl_client::Gateway;

use crate::commands::resource_path;
use crate::output;

const CONSUMER_RESOURCE: &str = "consumers";

#[derive(Subcommand, Debug)]
pub enum ConsumerCommand {
    /// Create a consumer object.
    Create(ConsumerFlags),
    /// Retrieve a consumer object.
    Get(ConsumerRef),
    /// Delete a consumer object.
    Delete(ConsumerRef),
    /// List all consumer objects.
    List,
}

#[derive(Args, Debug)]
pub struct ConsumerFlags {
    /// The unique username of the consumer.
    #[arg(long)]
    pub username: Option<String>,

    /// An existing unique ID for the consumer in an external datastore.
    #[arg(long)]
    pub custom_id: Option<String>,
}

/// Identifies a consumer by id or username.
#[derive(Args, Debug)]
pub struct ConsumerRef {
    /// The consumer id.
    #[arg(long)]
    pub id: Option<String>,

    /// The consumer username.
    #[arg(long)]
    pub username: Option<String>,
}

impl ConsumerRef {
    fn path(&self) -> anyhow::Result<String> {
        resource_path(
            CONSUMER_RESOURCE,
            [self.id.as_deref(), self.username.as_deref()],
        )
    }
}

/// Consumer payload sent to the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConsumerList {
    #[serde(default)]
    data: Vec<ConsumerSummary>,
}

#[derive(Debug, Deserialize)]
struct ConsumerSummary {
    #[serde(default)]
    id: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    custom_id: Option<String>,
}

pub async fn run(gateway: &Gateway, command: ConsumerCommand) -> anyhow::Result<()> {
    match command {
        ConsumerCommand::Create(flags) => create(gateway, flags).await,
        ConsumerCommand::Get(consumer) => get(gateway, &consumer).await,
        ConsumerCommand::Delete(consumer) => delete(gateway, &consumer).await,
        ConsumerCommand::List => list(gateway).await,
    }
}

async fn create(gateway: &Gateway, flags: ConsumerFlags) -> anyhow::Result<()> {
    if flags.username.is_none() && flags.custom_id.is_none() {
        anyhow::bail!("at least one of --username or --custom-id is required");
    }

    let cfg = ConsumerConfig {
        username: flags.username,
        custom_id: flags.custom_id,
    };

    let response = gateway.post(CONSUMER_RESOURCE, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn get(gateway: &Gateway, consumer: &ConsumerRef) -> anyhow::Result<()> {
    let path = consumer.path()?;
    let response = gateway.get(&path, &[]).await?;
    output::print_json(response).await
}

async fn delete(gateway: &Gateway, consumer: &ConsumerRef) -> anyhow::Result<()> {
    let path = consumer.path()?;
    let response = gateway.delete(&path, &[]).await?;
    output::confirm_deleted(response, "consumer").await
}

async fn list(gateway: &Gateway) -> anyhow::Result<()> {
    let response = gateway.get(CONSUMER_RESOURCE, &[]).await?;
    let consumers: ConsumerList = response.json().await?;

    println!("{:<36}  {:<20}  {}", "ID", "USERNAME", "CUSTOM_ID");
    for consumer in consumers.data {
        println!(
            "{:<36}  {:<20}  {}",
            consumer.id,
            consumer.username.unwrap_or_default(),
            consumer.custom_id.unwrap_or_default(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_path_prefers_id_over_username() {
        let consumer = ConsumerRef {
            id: Some("abc-123".to_string()),
            username: Some("alice".to_string()),
        };
        assert_eq!(consumer.path().unwrap(), "consumers/abc-123");
    }

    #[test]
    fn config_omits_missing_fields() {
        let cfg = ConsumerConfig {
            username: Some("alice".to_string()),
            custom_id: None,
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("custom_id").is_none());
    }
}
