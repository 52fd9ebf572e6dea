/*
 * Responsibility
 * - Read environment variables once at startup (PORT, APP_ENV, MAIL_*)
 * - Validate values; missing mail settings disable that provider, malformed ones fail startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use url::Url;

const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Azure Communication Services email settings.
#[derive(Clone)]
pub struct AcsSettings {
    pub endpoint: Url,
    // Decoded HMAC key from the connection string
    pub access_key: Vec<u8>,
    pub sender: String,
    pub subject: String,
}

impl fmt::Debug for AcsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcsSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key", &"<redacted>")
            .field("sender", &self.sender)
            .field("subject", &self.subject)
            .finish()
    }
}

/// SendGrid dynamic-template settings.
#[derive(Clone)]
pub struct SendGridSettings {
    pub base_url: Url,
    pub api_key: String,
    pub sender: String,
    pub sender_name: String,
    pub template_id: String,
}

impl fmt::Debug for SendGridSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendGridSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("sender", &self.sender)
            .field("sender_name", &self.sender_name)
            .field("template_id", &self.template_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    // None => provider disabled (sends are skipped)
    pub acs: Option<AcsSettings>,
    pub sendgrid: Option<SendGridSettings>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = var("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let timeout_seconds = match var("MAIL_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("MAIL_TIMEOUT_SECONDS"))?,
            None => 10,
        };

        let sender = var("MAIL_SENDER");

        let acs = match (var("MAIL_CONNECTION_STRING"), &sender, var("MAIL_SUBJECT")) {
            (Some(conn), Some(sender), Some(subject)) => {
                let (endpoint, access_key) = parse_connection_string(&conn)?;
                Some(AcsSettings {
                    endpoint,
                    access_key,
                    sender: sender.clone(),
                    subject,
                })
            }
            _ => None,
        };

        let sendgrid_base_url = var("SENDGRID_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SENDGRID_BASE_URL.to_string());

        let sendgrid = match (
            var("MAIL_SENDGRID_KEY"),
            &sender,
            var("MAIL_SENDER_NAME"),
            var("MAIL_TEMPLATE_ID"),
        ) {
            (Some(api_key), Some(sender), Some(sender_name), Some(template_id)) => {
                Some(SendGridSettings {
                    base_url: Url::parse(&sendgrid_base_url)
                        .map_err(|_| ConfigError::Invalid("SENDGRID_BASE_URL"))?,
                    api_key,
                    sender: sender.clone(),
                    sender_name,
                    template_id,
                })
            }
            _ => None,
        };

        Ok(Self {
            addr,
            app_env,
            mail: MailConfig {
                acs,
                sendgrid,
                timeout: Duration::from_secs(timeout_seconds),
            },
        })
    }
}

/// Parse `endpoint=https://<resource>.communication.azure.com/;accesskey=<base64>`.
fn parse_connection_string(raw: &str) -> Result<(Url, Vec<u8>), ConfigError> {
    let mut endpoint = None;
    let mut access_key = None;

    for part in raw.split(';') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "endpoint" => endpoint = Some(value.trim()),
            "accesskey" => access_key = Some(value.trim()),
            _ => {}
        }
    }

    let endpoint = endpoint
        .and_then(|v| Url::parse(v).ok())
        .filter(|u| u.has_host())
        .ok_or(ConfigError::Invalid("MAIL_CONNECTION_STRING"))?;

    let access_key = access_key
        .and_then(|v| BASE64.decode(v).ok())
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::Invalid("MAIL_CONNECTION_STRING"))?;

    Ok((endpoint, access_key))
}
