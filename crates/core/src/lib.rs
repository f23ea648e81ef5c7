// wms: session-resilient client for the warehouse portal.
//
// Components build on each other leaves first: `transport` carries requests,
// `session` owns the token and its persistence, `auth` renews the token through
// the captcha login, and `workflow` drives the outbound wave cycle.

pub mod auth;
pub mod captcha;
pub mod config;
pub mod crypto;
pub mod error;
mod headers;
pub mod retry;
pub mod session;
pub mod transport;
pub mod workflow;

pub use auth::{AuthenticationFlow, LoginOutcome};
pub use captcha::{CaptchaSolver, HttpCaptchaSolver, strip_data_uri_prefix};
pub use config::{ConfigStore, JsonConfigStore, PortalConfig, WaveSettings};
pub use crypto::PasswordCipher;
pub use error::{Result, WmsError};
pub use retry::{RetryError, RetryPolicy};
pub use session::{Credentials, Session, SessionManager};
pub use transport::{Auth, PortalRequest, Transport};
pub use workflow::{RunReport, SessionStatus, WorkflowOrchestrator};

pub use wms_protocol as protocol;
