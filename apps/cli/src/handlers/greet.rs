use anyhow::{Context, Result, anyhow};
use sfetch::client::{ClientError, SecureClient};
use url::Url;

/// `GET {origin}/api/greet/{name}` through the secure endpoint.
///
/// Prints the greeting, or an `Error:` line for failures the backend reports.
pub(crate) async fn greet(client: &SecureClient, name: &str) -> Result<()> {
    let url = greet_url(client.config().endpoint(), name)?;

    match client.get(url.as_str()).await {
        Ok(response) if response.ok() => {
            let body: serde_json::Value = response.json().context("Unexpected greeting shape")?;
            let message = body["message"].as_str().ok_or_else(|| anyhow!("Greeting has no message"))?;
            println!("{message}");
            Ok(())
        },
        Ok(response) => {
            println!("Error: backend answered {}", response.status());
            Ok(())
        },
        Err(err @ ClientError::Timeout { .. }) => {
            println!("Error: {err}; try again");
            Err(err.into())
        },
        Err(err) => {
            println!("Error: {err}");
            Err(err.into())
        },
    }
}

/// Backend URL on the endpoint's origin; the name is percent-encoded as one segment.
pub(crate) fn greet_url(endpoint: &Url, name: &str) -> Result<Url> {
    let mut url = endpoint.join("/").context("Endpoint has no usable origin")?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("Endpoint cannot be a base URL"))?
        .pop_if_empty()
        .extend(["api", "greet", name]);
    Ok(url)
}
