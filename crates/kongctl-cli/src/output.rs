//! Response printing helpers.

use kongctl_client::ServerResponse;

/// Drain a response and pretty-print its JSON body to stdout.
///
/// Empty bodies (e.g. from 204 responses) print nothing.
pub async fn print_json(response: ServerResponse) -> anyhow::Result<()> {
    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(());
    }

    let value: serde_json::Value = serde_json::from_slice(&body)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Drain a delete response, requiring the gateway's 204 acknowledgement.
pub async fn confirm_deleted(response: ServerResponse, what: &str) -> anyhow::Result<()> {
    let status = response.status();
    // Drop the body either way so the connection returns to the pool.
    let body = response.bytes().await?;

    if status.as_u16() == 204 {
        println!("{what} deleted.");
        return Ok(());
    }

    anyhow::bail!(
        "failed to delete {what}: gateway answered {} ({})",
        status,
        String::from_utf8_lossy(&body).trim()
    )
}
