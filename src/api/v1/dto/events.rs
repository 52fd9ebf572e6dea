/*
 * Responsibility
 * - Inbound event payloads sent by the identity provider
 * - Only the fields the handlers read are modelled; everything else is ignored
 */
use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Outer callout document: `{"type", "source", "data": {"@odata.type", ...}}`.
/// Only `data` is read.
#[derive(Debug, Deserialize)]
pub struct InboundEvent<D> {
    pub data: EventData<D>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventData<D> {
    /// Stage discriminator, e.g. `microsoft.graph.onTokenIssuanceStartCalloutData`.
    #[serde(rename = "@odata.type", default)]
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub body: D,
}

impl<D> EventData<D> {
    pub fn data_type(&self) -> &str {
        self.data_type.as_deref().unwrap_or("unknown")
    }
}

impl<D> InboundEvent<D> {
    pub fn data_type(&self) -> &str {
        self.data.data_type()
    }
}

// --- attribute collection submit ---

/// Submit callout. Read leniently: a missing `data` object is an empty submission.
#[derive(Debug, Default, Deserialize)]
pub struct AttributeCollectionSubmitEvent {
    #[serde(default)]
    pub data: EventData<AttributeCollectionSubmitData>,
}

impl AttributeCollectionSubmitEvent {
    pub fn data_type(&self) -> &str {
        self.data.data_type()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeCollectionSubmitData {
    #[serde(default)]
    pub user_sign_up_info: Option<UserSignUpInfo>,
}

/// Attributes stay raw JSON so a `null` or non-object entry only affects that attribute.
#[derive(Debug, Default, Deserialize)]
pub struct UserSignUpInfo {
    #[serde(default)]
    pub attributes: Option<HashMap<String, Value>>,
}

impl AttributeCollectionSubmitData {
    /// Text of `attributes.<name>.value`. Non-string values are rendered as JSON;
    /// `null`, a missing `value` or a non-object attribute read as absent.
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        let value = self
            .user_sign_up_info
            .as_ref()?
            .attributes
            .as_ref()?
            .get(name)?
            .get("value")?;
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// --- token issuance start ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenIssuanceStartData {
    pub authentication_context: AuthenticationContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationContext {
    pub correlation_id: String,
    #[serde(default)]
    pub user: Option<AuthenticatedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

// --- otp send ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSendData {
    pub otp_context: OtpContext,
}

#[derive(Debug, Deserialize)]
pub struct OtpContext {
    /// Destination address.
    pub identifier: String,
    pub onetimecode: String,
}
