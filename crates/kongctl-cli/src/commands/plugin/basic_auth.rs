//! The basic-auth plugin: username/password protection for a service or
//! route, plus credential provisioning for consumers.

use clap::{Args, Subcommand};
use serde::Serialize;

use kongctl_client::Gateway;

use crate::commands::plugin::PluginScope;
use crate::output;

const PLUGIN_NAME: &str = "basic-auth";

#[derive(Args, Debug)]
pub struct BasicAuthArgs {
    #[command(flatten)]
    pub scope: PluginScope,

    /// Strip the credential from the request before proxying it upstream.
    #[arg(long, default_value_t = false)]
    pub hide_credentials: bool,

    /// Consumer uuid to use as an "anonymous" consumer if authentication
    /// fails.
    #[arg(long, default_value = "")]
    pub anonymous: String,

    #[command(subcommand)]
    pub command: Option<BasicAuthSubcommand>,
}

#[derive(Subcommand, Debug)]
pub enum BasicAuthSubcommand {
    /// Provision username/password credentials for a consumer.
    Credential(CredentialArgs),
}

#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// The consumer to attach the credential to.
    #[arg(long)]
    pub consumer_id: String,

    /// The username to use in Basic Authentication.
    #[arg(long)]
    pub username: String,

    /// The password to use in Basic Authentication.
    #[arg(long)]
    pub password: String,
}

/// basic-auth plugin payload.
#[derive(Debug, Clone, Serialize)]
struct BasicAuthConfig {
    name: &'static str,
    hide_credentials: bool,
    anonymous: String,
}

/// Credential payload for `consumers/{id}/basic-auth`.
#[derive(Debug, Clone, Serialize)]
struct BasicAuthCredential {
    username: String,
    password: String,
}

pub async fn run(gateway: &Gateway, args: BasicAuthArgs) -> anyhow::Result<()> {
    match args.command {
        Some(BasicAuthSubcommand::Credential(credential)) => {
            create_credential(gateway, credential).await
        }
        None => create_plugin(gateway, args).await,
    }
}

async fn create_plugin(gateway: &Gateway, args: BasicAuthArgs) -> anyhow::Result<()> {
    let path = args.scope.plugins_path();
    let cfg = BasicAuthConfig {
        name: PLUGIN_NAME,
        hide_credentials: args.hide_credentials,
        anonymous: args.anonymous,
    };

    let response = gateway.post(&path, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

async fn create_credential(gateway: &Gateway, args: CredentialArgs) -> anyhow::Result<()> {
    if args.consumer_id.is_empty() || args.username.is_empty() || args.password.is_empty() {
        anyhow::bail!("--consumer-id, --username and --password are all required");
    }

    let path = format!("consumers/{}/basic-auth", args.consumer_id);
    let cfg = BasicAuthCredential {
        username: args.username,
        password: args.password,
    };

    let response = gateway.post(&path, &[], Some(&cfg)).await?;
    output::print_json(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_payload_carries_kind_name() {
        let cfg = BasicAuthConfig {
            name: PLUGIN_NAME,
            hide_credentials: true,
            anonymous: String::new(),
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["name"], "basic-auth");
        assert_eq!(json["hide_credentials"], true);
        assert_eq!(json["anonymous"], "");
    }
}
