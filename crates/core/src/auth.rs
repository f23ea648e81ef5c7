//! Captcha-backed login with a bounded number of attempts.
//!
//! Each attempt walks `FetchCaptcha -> SolveCaptcha -> SubmitLogin`. Any
//! failing step ends the attempt and the next one starts from a fresh
//! captcha, since an issued challenge may be single-use. The session token is
//! only touched after an attempt succeeds.

use tracing::{debug, info, warn};
use wms_protocol::{CAPTCHA_PATH, CaptchaChallenge, LOGIN_PATH, LOGIN_TYPE_USERNAME, LoginData, LoginRequest};

use crate::captcha::CaptchaSolver;
use crate::config::PortalConfig;
use crate::crypto::PasswordCipher;
use crate::error::{Result, WmsError};
use crate::headers::LOGIN_ACCEPT;
use crate::retry::RetryPolicy;
use crate::session::{Credentials, SessionManager};
use crate::transport::{PortalRequest, Transport, decode_success, require_data};

/// Successful login summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
	/// 1-based attempt that succeeded.
	pub attempts: u32,
}

pub struct AuthenticationFlow<'a> {
	solver: &'a dyn CaptchaSolver,
	credentials: Credentials,
	cipher: PasswordCipher,
	policy: RetryPolicy,
}

impl<'a> AuthenticationFlow<'a> {
	pub fn new(solver: &'a dyn CaptchaSolver, credentials: Credentials, cipher: PasswordCipher) -> Self {
		Self {
			solver,
			credentials,
			cipher,
			policy: RetryPolicy::login(),
		}
	}

	/// Builds the flow from the login settings in `config`.
	pub fn from_config(solver: &'a dyn CaptchaSolver, config: &PortalConfig) -> Result<Self> {
		config.validate_credentials()?;
		let cipher = PasswordCipher::from_config(config.public_key_pem.as_deref())?;
		Ok(Self::new(solver, Credentials::from_config(config), cipher))
	}

	pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Logs in and applies the new token to `sessions`.
	///
	/// # Errors
	///
	/// - [`WmsError::AuthExhausted`] wrapping the last attempt's error when
	///   every attempt failed; the session token is left unchanged.
	/// - [`WmsError::Encryption`] immediately when the password cannot be
	///   encrypted, since another attempt cannot fix that.
	/// - Any error from persisting the new token.
	pub async fn authenticate(&self, sessions: &mut SessionManager) -> Result<LoginOutcome> {
		let lang = sessions.config().lang.clone();
		let lang = lang.as_str();
		let transport = sessions.transport();
		let max = self.policy.max_attempts.max(1);

		info!(target = "wms.auth", account = %self.credentials.account, max_attempts = max, "logging in");

		let result = self
			.policy
			.run(
				|attempt| async move {
					let outcome = self.attempt(transport, lang, attempt).await;
					if let Err(err) = &outcome {
						warn!(target = "wms.auth", attempt, max_attempts = max, error = %err, "login attempt failed");
					}
					outcome
				},
				|err| !matches!(err, WmsError::Encryption(_)),
			)
			.await;

		match result {
			Ok((attempt, token)) => {
				sessions.apply_token(&token)?;
				info!(target = "wms.auth", attempt, "login succeeded");
				Ok(LoginOutcome { attempts: attempt })
			}
			Err(failure) if failure.exhausted => Err(WmsError::AuthExhausted {
				attempts: failure.attempts,
				last: Box::new(failure.error),
			}),
			Err(failure) => Err(failure.error),
		}
	}

	async fn attempt(&self, transport: &Transport, lang: &str, attempt: u32) -> Result<(u32, String)> {
		let challenge = self.fetch_captcha(transport, lang).await?;
		debug!(target = "wms.auth", attempt, uuid = %challenge.uuid, "captcha fetched");

		let text = self.solver.recognize(challenge.image_base64()).await?;
		debug!(target = "wms.auth", attempt, "captcha solved");

		let token = self.submit_login(transport, lang, &text, &challenge.uuid).await?;
		Ok((attempt, token))
	}

	async fn fetch_captcha(&self, transport: &Transport, lang: &str) -> Result<CaptchaChallenge> {
		let request = PortalRequest::get(CAPTCHA_PATH)
			.anonymous()
			.query(vec![("lang".to_string(), lang.to_string())])
			.header("Accept", LOGIN_ACCEPT)
			.header("Referer", transport.login_referer());

		let challenge: CaptchaChallenge = require_data(transport.send(&request).await?, CAPTCHA_PATH)?;
		if challenge.uuid.trim().is_empty() || challenge.image_base64().trim().is_empty() {
			return Err(WmsError::protocol(CAPTCHA_PATH, None, "captcha challenge is missing its uuid or image"));
		}
		Ok(challenge)
	}

	async fn submit_login(&self, transport: &Transport, lang: &str, captcha: &str, uuid: &str) -> Result<String> {
		let body = LoginRequest {
			username: self.credentials.account.clone(),
			password: self.cipher.encrypt(self.credentials.password())?,
			captcha: captcha.to_string(),
			uuid: uuid.to_string(),
			login_type: LOGIN_TYPE_USERNAME.to_string(),
			device_token: None,
			lang: lang.to_string(),
		};

		let request = PortalRequest::post(LOGIN_PATH)
			.anonymous()
			.json(&body)?
			.header("Accept", LOGIN_ACCEPT)
			.header("Referer", transport.login_referer())
			.header("Cookie", format!("locale={lang}"));

		let envelope = decode_success::<LoginData>(transport.send(&request).await?, LOGIN_PATH)?;
		envelope
			.data
			.map(|data| data.token)
			.filter(|token| !token.trim().is_empty())
			.ok_or_else(|| WmsError::protocol(LOGIN_PATH, None, "login succeeded without a token"))
	}
}
