//! Azure Communication Services email gateway.
//!
//! Requests are authenticated with the resource's HMAC access key:
//! `Authorization: HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature=...`
//! The send is fire-and-forget: a 2xx (normally 202 Accepted) counts as sent and the
//! long-running operation is not polled.
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::AcsSettings;
use crate::services::email::gateway::{Delivery, EmailError, EmailGateway, EmailResult};
use crate::services::email::template::render_otp_body;

type HmacSha256 = Hmac<Sha256>;

const API_VERSION: &str = "2023-03-31";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    sender_address: &'a str,
    content: EmailContent<'a>,
    recipients: Recipients<'a>,
}

#[derive(Debug, Serialize)]
struct EmailContent<'a> {
    subject: &'a str,
    html: String,
}

#[derive(Debug, Serialize)]
struct Recipients<'a> {
    to: Vec<EmailAddress<'a>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    address: &'a str,
}

#[derive(Clone)]
pub struct AcsEmailGateway {
    http: reqwest::Client,
    settings: AcsSettings,
}

impl AcsEmailGateway {
    pub fn new(http: reqwest::Client, settings: AcsSettings) -> Self {
        Self { http, settings }
    }

    fn send_url(&self) -> EmailResult<Url> {
        let base = self.settings.endpoint.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/emails:send?api-version={API_VERSION}"))
            .map_err(|e| EmailError::Request(e.to_string()))
    }

    fn authorization(&self, url: &Url, date: &str, content_hash: &str) -> EmailResult<String> {
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(EmailError::Request("endpoint has no host".into())),
        };
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let string_to_sign = format!("POST\n{path_and_query}\n{date};{host};{content_hash}");

        let mut mac = HmacSha256::new_from_slice(&self.settings.access_key)
            .map_err(|e| EmailError::Request(e.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        Ok(format!(
            "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={signature}"
        ))
    }
}

#[async_trait]
impl EmailGateway for AcsEmailGateway {
    fn provider(&self) -> &'static str {
        "acs"
    }

    async fn send_otp(&self, to: &str, code: &str) -> EmailResult<Delivery> {
        let payload = SendEmailRequest {
            sender_address: &self.settings.sender,
            content: EmailContent {
                subject: &self.settings.subject,
                html: render_otp_body(code),
            },
            recipients: Recipients {
                to: vec![EmailAddress { address: to }],
            },
        };
        let body = serde_json::to_vec(&payload)?;

        let url = self.send_url()?;
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let content_hash = BASE64.encode(Sha256::digest(&body));
        let authorization = self.authorization(&url, &date, &content_hash)?;

        let response = self
            .http
            .post(url)
            .header("x-ms-date", date)
            .header("x-ms-content-sha256", content_hash)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        tracing::debug!(%status, "acs accepted email");
        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn gateway(endpoint: &str) -> AcsEmailGateway {
        AcsEmailGateway::new(
            reqwest::Client::new(),
            AcsSettings {
                endpoint: Url::parse(endpoint).unwrap(),
                access_key: b"secret".to_vec(),
                sender: "DoNotReply@contoso.com".into(),
                subject: "Your code".into(),
            },
        )
    }

    #[test]
    fn signature_matches_reference_hmac() {
        let gw = gateway("https://contoso.communication.azure.com/");
        let url = gw.send_url().unwrap();
        let date = "Mon, 01 Jan 2024 00:00:00 GMT";
        let hash = BASE64.encode(Sha256::digest(b"{}"));

        let header = gw.authorization(&url, date, &hash).unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(
            format!(
                "POST\n/emails:send?api-version=2023-03-31\n{date};contoso.communication.azure.com;{hash}"
            )
            .as_bytes(),
        );
        let expected = BASE64.encode(mac.finalize().into_bytes());
        assert_eq!(
            header,
            format!(
                "HMAC-SHA256 SignedHeaders=x-ms-date;host;x-ms-content-sha256&Signature={expected}"
            )
        );
    }

    #[tokio::test]
    async fn accepted_send_reports_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/emails:send")
                    .query_param("api-version", API_VERSION)
                    .header_exists("x-ms-date")
                    .header_exists("x-ms-content-sha256")
                    .header_exists("authorization");
                then.status(202);
            })
            .await;

        let delivery = gateway(&server.base_url())
            .send_otp("user@example.com", "123456")
            .await
            .unwrap();

        assert_eq!(delivery, Delivery::Sent);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/emails:send");
                then.status(401).body("denied");
            })
            .await;

        let err = gateway(&server.base_url())
            .send_otp("user@example.com", "123456")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EmailError::Rejected { status, ref body }
                if status == reqwest::StatusCode::UNAUTHORIZED && body == "denied"
        ));
    }
}
