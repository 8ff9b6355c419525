//! The statsd plugin: metric logging for a service or route to a StatsD
//! server.

use clap::Args;
use serde::Serialize;

use kongctl_client::Gateway;

use crate::commands::plugin::PluginScope;
use crate::output;

const PLUGIN_NAME: &str = "statsd";

#[derive(Args, Debug)]
pub struct StatsdArgs {
    #[command(flatten)]
    pub scope: PluginScope,

    /// The IP address or host name to send metrics to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to send metrics to.
    #[arg(long, default_value_t = 8125)]
    pub port: u16,

    /// String prefixed to each metric's name.
    #[arg(long, default_value = "kong")]
    pub prefix: String,
}

/// statsd plugin payload.
#[derive(Debug, Clone, Serialize)]
struct StatsdPlugin {
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumer_id: Option<String>,
    config: StatsdConfig,
}

#[derive(Debug, Clone, Serialize)]
struct StatsdConfig {
    host: String,
    port: u16,
    prefix: String,
}

pub async fn run(gateway: &Gateway, args: StatsdArgs) -> anyhow::Result<()> {
    let path = args.scope.plugins_path();

    let plugin = StatsdPlugin {
        name: PLUGIN_NAME,
        consumer_id: args.scope.consumer_id.clone().filter(|id| !id.is_empty()),
        config: StatsdConfig {
            host: args.host,
            port: args.port,
            prefix: args.prefix,
        },
    };

    let response = gateway.post(&path, &[], Some(&plugin)).await?;
    output::print_json(response).await
}
