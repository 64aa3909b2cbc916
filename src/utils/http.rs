use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

pub const SOFTSHELF_USER_AGENT: &str = concat!("softshelf/", env!("CARGO_PKG_VERSION"));

/// Build the shared upstream client. `timeout` bounds a whole request; `None` keeps
/// reqwest's default (no overall limit).
pub fn build_client(
    proxy: Option<&url::Url>,
    timeout: Option<Duration>,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(SOFTSHELF_USER_AGENT));

    let mut builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .http2_adaptive_window(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.default_headers(headers).build()
}
