use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};

/// Blocking HTTP client shared by the Nominatim and Overpass sources.
pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
        .context("[http] failed to build client")
}

/// GET `url` with query parameters and return the body, failing on non-success status.
pub(crate) fn get_text(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<String> {
    client.get(url)
        .query(query)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?
        .text()
        .with_context(|| format!("read body of GET {url}"))
}

/// POST a form to `url` and return the body, failing on non-success status.
pub(crate) fn post_form(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<String> {
    client.post(url)
        .form(form)
        .send()
        .with_context(|| format!("POST {url}"))?
        .error_for_status()
        .with_context(|| format!("POST {url} returned error status"))?
        .text()
        .with_context(|| format!("read body of POST {url}"))
}
