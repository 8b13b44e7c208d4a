use anyhow::{Context, Result, bail};
use sfetch::client::{RequestOptions, SecureClient};

/// Sends one request and prints the inner status line followed by the body.
pub(crate) async fn send(
    client: &SecureClient,
    method: &str,
    path: &str,
    data: Option<String>,
    headers: &[String],
) -> Result<()> {
    let options = build_options(method, data, headers)?;
    let response = client.secure_send(path, options).await?;

    println!("{}", response.status());
    println!("{}", response.text());
    Ok(())
}

pub(crate) fn build_options(method: &str, data: Option<String>, headers: &[String]) -> Result<RequestOptions> {
    let mut options = RequestOptions::method(method);
    let mut has_content_type = false;

    for raw in headers {
        let Some((name, value)) = raw.split_once(':') else {
            bail!("Header must look like `name: value`, got `{raw}`");
        };
        let name = name.trim();
        has_content_type |= name.eq_ignore_ascii_case("content-type");
        options = options.header(name, value.trim());
    }

    if let Some(data) = data {
        if !has_content_type {
            let value: serde_json::Value =
                serde_json::from_str(&data).context("--data is not JSON; pass a content-type header")?;
            return Ok(options.json(&value)?);
        }
        options = options.body(data);
    }
    Ok(options)
}
