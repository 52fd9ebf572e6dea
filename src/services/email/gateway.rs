//! Email gateway interface used by the OTP send handlers.
use async_trait::async_trait;
use thiserror::Error;

pub type EmailResult<T> = Result<T, EmailError>;

/// Outcome of a send that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the provider.
    Sent,
    /// The gateway is not configured; nothing was sent.
    Skipped,
}

/// Email transport errors.
///
/// Note:
/// - Handlers never turn these into HTTP errors; they log and continue so the
///   sign-in flow does not stall on a notification failure.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email provider rejected the request: {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("email request could not be built: {0}")]
    Request(String),
    #[error("email payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Sends a one-time passcode to a destination address.
#[async_trait]
pub trait EmailGateway: Send + Sync + 'static {
    /// Provider name (for logging).
    fn provider(&self) -> &'static str;

    async fn send_otp(&self, to: &str, code: &str) -> EmailResult<Delivery>;
}

/// Stand-in for a provider whose settings are incomplete.
#[derive(Debug, Clone, Copy)]
pub struct DisabledGateway {
    provider: &'static str,
}

impl DisabledGateway {
    pub fn new(provider: &'static str) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl EmailGateway for DisabledGateway {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn send_otp(&self, _to: &str, _code: &str) -> EmailResult<Delivery> {
        tracing::warn!(provider = self.provider, "email gateway not configured; skipping send");
        Ok(Delivery::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_gateway_skips() {
        let gateway = DisabledGateway::new("acs");

        let delivery = gateway.send_otp("user@example.com", "123456").await.unwrap();

        assert_eq!(delivery, Delivery::Skipped);
        assert_eq!(gateway.provider(), "acs");
    }
}
