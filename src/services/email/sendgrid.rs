//! SendGrid email gateway (dynamic template with an `otp` substitution).
use async_trait::async_trait;
use serde::Serialize;

use crate::config::SendGridSettings;
use crate::services::email::gateway::{Delivery, EmailError, EmailGateway, EmailResult};

#[derive(Debug, Serialize)]
struct SendGridMessage<'a> {
    personalizations: Vec<Personalization<'a>>,
    template_id: &'a str,
    from: Person<'a>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Person<'a>>,
    dynamic_template_data: TemplateData<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateData<'a> {
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct Person<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Clone)]
pub struct SendGridEmailGateway {
    http: reqwest::Client,
    settings: SendGridSettings,
}

impl SendGridEmailGateway {
    pub fn new(http: reqwest::Client, settings: SendGridSettings) -> Self {
        Self { http, settings }
    }

    fn message<'a>(&'a self, to: &'a str, code: &'a str) -> SendGridMessage<'a> {
        SendGridMessage {
            personalizations: vec![Personalization {
                to: vec![Person {
                    email: to,
                    name: None,
                }],
                dynamic_template_data: TemplateData { otp: code },
            }],
            template_id: &self.settings.template_id,
            from: Person {
                email: &self.settings.sender,
                name: Some(&self.settings.sender_name),
            },
        }
    }
}

#[async_trait]
impl EmailGateway for SendGridEmailGateway {
    fn provider(&self) -> &'static str {
        "sendgrid"
    }

    async fn send_otp(&self, to: &str, code: &str) -> EmailResult<Delivery> {
        let url = self
            .settings
            .base_url
            .join("v3/mail/send")
            .map_err(|e| EmailError::Request(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(&self.message(to, code))
            .send()
            .await?;

        let status = response.status();
        tracing::info!(%status, "sendgrid response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        Ok(Delivery::Sent)
    }
}
