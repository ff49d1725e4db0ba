use tracing::debug;
use url::Url;

use super::HarvestError;

/// Retrieves the documentation page as text.
///
/// One GET, no retry, no status filtering; any transport failure is returned
/// to the caller and ends the run.
pub(super) async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<String, HarvestError> {
    debug!(%url, "fetching documentation page");
    let response = client.get(url.clone()).send().await?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "fetched documentation page");
    Ok(body)
}
