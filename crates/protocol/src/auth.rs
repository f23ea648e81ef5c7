//! Captcha and login payloads.

use serde::{Deserialize, Serialize};

/// Identity endpoint used to check whether the bearer token is still accepted.
pub const USER_INFO_PATH: &str = "/api/user/getUserInfo";
/// Anonymous captcha challenge endpoint.
pub const CAPTCHA_PATH: &str = "/api/login/captcha";
/// Anonymous login endpoint.
pub const LOGIN_PATH: &str = "/api/login/authenticate";
/// Path of the portal's login page, sent as `Referer` on anonymous calls.
pub const LOGIN_PAGE_PATH: &str = "/user/login";

/// Login type for account + password logins.
pub const LOGIN_TYPE_USERNAME: &str = "USERNAME";

/// Data URI prefixes the portal uses for captcha images.
pub const IMAGE_DATA_URI_PREFIXES: [&str; 2] = ["data:image/png;base64,", "data:image/jpeg;base64,"];

/// Removes any leading image data URI prefix, leaving the raw base64 payload.
///
/// Input without a known prefix is returned unchanged, and applying the
/// function twice yields the same result as applying it once.
pub fn strip_data_uri_prefix(image: &str) -> &str {
	let mut rest = image;
	while let Some(stripped) = IMAGE_DATA_URI_PREFIXES.iter().find_map(|prefix| rest.strip_prefix(prefix)) {
		rest = stripped;
	}
	rest
}

/// `data` payload of the captcha endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaChallenge {
	pub uuid: String,
	pub img: String,
}

impl CaptchaChallenge {
	/// Raw base64 image payload without the data URI prefix.
	pub fn image_base64(&self) -> &str {
		strip_data_uri_prefix(&self.img)
	}
}

/// Body of the login request. `password` is the encrypted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
	pub captcha: String,
	pub uuid: String,
	pub login_type: String,
	pub device_token: Option<String>,
	pub lang: String,
}

/// `data` payload of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
	#[serde(default)]
	pub token: String,
}
