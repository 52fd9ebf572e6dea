/// Factory: build the email gateways from application `Config`.
use std::sync::Arc;

use crate::config::MailConfig;
use crate::error::AppError;
use crate::services::email::{
    AcsEmailGateway, DisabledGateway, EmailGateway, SendGridEmailGateway,
};

/// One gateway per provider plus the one picked for the generic OTP route.
#[derive(Clone)]
pub struct EmailGateways {
    pub acs: Arc<dyn EmailGateway>,
    pub sendgrid: Arc<dyn EmailGateway>,
    // ACS when configured, otherwise SendGrid, otherwise disabled
    pub preferred: Arc<dyn EmailGateway>,
}

pub fn build_email_gateways(config: &MailConfig) -> Result<EmailGateways, AppError> {
    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build email http client");
            AppError::Internal
        })?;

    let acs: Option<Arc<dyn EmailGateway>> = config
        .acs
        .clone()
        .map(|settings| -> Arc<dyn EmailGateway> {
            Arc::new(AcsEmailGateway::new(http.clone(), settings))
        });
    let sendgrid: Option<Arc<dyn EmailGateway>> = config
        .sendgrid
        .clone()
        .map(|settings| -> Arc<dyn EmailGateway> {
            Arc::new(SendGridEmailGateway::new(http.clone(), settings))
        });

    let preferred: Arc<dyn EmailGateway> = match (&acs, &sendgrid) {
        (Some(acs), _) => acs.clone(),
        (None, Some(sendgrid)) => sendgrid.clone(),
        (None, None) => Arc::new(DisabledGateway::new("none")),
    };

    tracing::info!(
        acs = acs.is_some(),
        sendgrid = sendgrid.is_some(),
        preferred = preferred.provider(),
        "email gateways configured"
    );

    Ok(EmailGateways {
        acs: acs.unwrap_or_else(|| Arc::new(DisabledGateway::new("acs"))),
        sendgrid: sendgrid.unwrap_or_else(|| Arc::new(DisabledGateway::new("sendgrid"))),
        preferred,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    use crate::config::SendGridSettings;

    #[test]
    fn unconfigured_providers_are_disabled() {
        let gateways = build_email_gateways(&MailConfig {
            acs: None,
            sendgrid: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(gateways.acs.provider(), "acs");
        assert_eq!(gateways.preferred.provider(), "none");
    }

    #[test]
    fn sendgrid_is_preferred_when_acs_is_missing() {
        let gateways = build_email_gateways(&MailConfig {
            acs: None,
            sendgrid: Some(SendGridSettings {
                base_url: Url::parse("https://api.sendgrid.com").unwrap(),
                api_key: "SG.key".into(),
                sender: "noreply@contoso.com".into(),
                sender_name: "Contoso".into(),
                template_id: "d-123".into(),
            }),
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(gateways.preferred.provider(), "sendgrid");
    }
}
