//! Browser-like header profile sent with every portal request.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, ORIGIN, PRAGMA, USER_AGENT};

use crate::error::{Result, WmsError};

pub(crate) const CHROME_USER_AGENT: &str =
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";
const CHROME_SEC_CH_UA: &str = r#""Not)A;Brand";v="8", "Chromium";v="138", "Google Chrome";v="138""#;
const ACCEPT_LANGUAGE_VALUE: &str = "zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7";

/// `Accept` used by the portal's own login page.
pub(crate) const LOGIN_ACCEPT: &str = "application/json, text/plain, */*";

/// Default headers for a client bound to `origin`.
pub(crate) fn browser_headers(origin: &str) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(12);
	headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
	headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
	headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
	headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
	headers.insert(
		ORIGIN,
		HeaderValue::from_str(origin).map_err(|e| WmsError::Config(format!("invalid origin {origin:?}: {e}")))?,
	);
	headers.insert(USER_AGENT, HeaderValue::from_static(CHROME_USER_AGENT));
	headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
	headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
	headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
	headers.insert(HeaderName::from_static("sec-ch-ua"), HeaderValue::from_static(CHROME_SEC_CH_UA));
	headers.insert(HeaderName::from_static("sec-ch-ua-mobile"), HeaderValue::from_static("?0"));
	headers.insert(HeaderName::from_static("sec-ch-ua-platform"), HeaderValue::from_static("\"macOS\""));
	Ok(headers)
}
