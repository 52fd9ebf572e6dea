/*
 * Responsibility
 * - Response envelope returned to the identity provider ({"data": {"@odata.type", "actions"}})
 * - Action tagged union (one per envelope) and the per-stage discriminators
 * - Wire conversion lives here so handlers only build typed values
 */
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const ODATA_NAMESPACE: &str = "microsoft.graph.";

/// Lifecycle point at which the identity provider called out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStage {
    AttributeCollectionStart,
    AttributeCollectionSubmit,
    TokenIssuanceStart,
    OtpSend,
}

impl EventStage {
    const ALL: [EventStage; 4] = [
        Self::AttributeCollectionStart,
        Self::AttributeCollectionSubmit,
        Self::TokenIssuanceStart,
        Self::OtpSend,
    ];

    /// `@odata.type` of the response data object.
    pub fn response_data_type(&self) -> &'static str {
        match self {
            Self::AttributeCollectionStart => {
                "microsoft.graph.onAttributeCollectionStartResponseData"
            }
            Self::AttributeCollectionSubmit => {
                "microsoft.graph.onAttributeCollectionSubmitResponseData"
            }
            Self::TokenIssuanceStart => "microsoft.graph.onTokenIssuanceStartResponseData",
            Self::OtpSend => "microsoft.graph.OnOtpSendResponseData",
        }
    }

    fn action_segment(&self) -> &'static str {
        match self {
            Self::AttributeCollectionStart => "attributeCollectionStart",
            Self::AttributeCollectionSubmit => "attributeCollectionSubmit",
            Self::TokenIssuanceStart => "tokenIssuanceStart",
            Self::OtpSend => "OtpSend",
        }
    }

    /// Full `@odata.type` of an action emitted at this stage.
    pub fn action_type(&self, action: &Action) -> String {
        format!(
            "{ODATA_NAMESPACE}{}.{}",
            self.action_segment(),
            action.kind().name()
        )
    }

    pub fn permits(&self, kind: ActionKind) -> bool {
        use ActionKind::*;

        match self {
            Self::AttributeCollectionStart => matches!(
                kind,
                ContinueWithDefaultBehavior | SetPrefillValues | ShowBlockPage
            ),
            Self::AttributeCollectionSubmit => matches!(
                kind,
                ContinueWithDefaultBehavior
                    | ShowBlockPage
                    | ModifyAttributeValues
                    | ShowValidationError
            ),
            Self::TokenIssuanceStart => matches!(kind, ProvideClaimsForToken),
            Self::OtpSend => matches!(kind, ContinueWithDefaultBehavior),
        }
    }

    fn from_response_data_type(data_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.response_data_type().eq_ignore_ascii_case(data_type))
    }
}

/// Value held in `inputs` / `attributes` maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Claims injected into the issued token. Unset fields never appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ContinueWithDefaultBehavior,
    SetPrefillValues,
    ShowBlockPage,
    ModifyAttributeValues,
    ShowValidationError,
    ProvideClaimsForToken,
}

impl ActionKind {
    const ALL: [ActionKind; 6] = [
        Self::ContinueWithDefaultBehavior,
        Self::SetPrefillValues,
        Self::ShowBlockPage,
        Self::ModifyAttributeValues,
        Self::ShowValidationError,
        Self::ProvideClaimsForToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ContinueWithDefaultBehavior => "continueWithDefaultBehavior",
            Self::SetPrefillValues => "setPrefillValues",
            Self::ShowBlockPage => "showBlockPage",
            Self::ModifyAttributeValues => "modifyAttributeValues",
            // The identity provider's samples use the capitalised form for this one.
            Self::ShowValidationError => "ShowValidationError",
            Self::ProvideClaimsForToken => "provideClaimsForToken",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// The single instruction carried by an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ContinueWithDefaultBehavior,
    SetPrefillValues {
        inputs: AttributeMap,
    },
    ShowBlockPage {
        message: String,
    },
    ModifyAttributeValues {
        attributes: AttributeMap,
    },
    ShowValidationError {
        message: Option<String>,
        attribute_errors: BTreeMap<String, String>,
    },
    ProvideClaimsForToken {
        claims: Claims,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::ContinueWithDefaultBehavior => ActionKind::ContinueWithDefaultBehavior,
            Self::SetPrefillValues { .. } => ActionKind::SetPrefillValues,
            Self::ShowBlockPage { .. } => ActionKind::ShowBlockPage,
            Self::ModifyAttributeValues { .. } => ActionKind::ModifyAttributeValues,
            Self::ShowValidationError { .. } => ActionKind::ShowValidationError,
            Self::ProvideClaimsForToken { .. } => ActionKind::ProvideClaimsForToken,
        }
    }
}

/// Response body for every handler.
///
/// Holds exactly one action; the wire form wraps it in a one-element `actions` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireEnvelope", try_from = "WireEnvelope")]
pub struct ResponseEnvelope {
    stage: EventStage,
    action: Action,
}

impl ResponseEnvelope {
    pub fn new(stage: EventStage, action: Action) -> Result<Self, EnvelopeError> {
        let kind = action.kind();
        if !stage.permits(kind) {
            return Err(EnvelopeError::ActionNotPermitted { stage, kind });
        }

        Ok(Self { stage, action })
    }

    pub fn continue_with_default(stage: EventStage) -> Self {
        debug_assert!(stage.permits(ActionKind::ContinueWithDefaultBehavior));
        Self {
            stage,
            action: Action::ContinueWithDefaultBehavior,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("action {} is not valid at stage {stage}", kind.name())]
    ActionNotPermitted { stage: EventStage, kind: ActionKind },
    #[error("unknown response data type: {0}")]
    UnknownDataType(String),
    #[error("unknown action type: {0}")]
    UnknownActionType(String),
    #[error("expected exactly one action, got {0}")]
    ActionCount(usize),
    #[error("action {} is missing field `{field}`", kind.name())]
    MissingField {
        kind: ActionKind,
        field: &'static str,
    },
}

impl fmt::Display for EventStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_segment())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireEnvelope {
    data: WireData,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireData {
    #[serde(rename = "@odata.type")]
    data_type: String,
    actions: Vec<WireAction>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAction {
    #[serde(rename = "@odata.type")]
    action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inputs: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<AttributeMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute_errors: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    claims: Option<Claims>,
}

impl From<ResponseEnvelope> for WireEnvelope {
    fn from(envelope: ResponseEnvelope) -> Self {
        let mut wire = WireAction {
            action_type: envelope.stage.action_type(&envelope.action),
            ..Default::default()
        };

        match envelope.action {
            Action::ContinueWithDefaultBehavior => {}
            Action::SetPrefillValues { inputs } => wire.inputs = Some(inputs),
            Action::ShowBlockPage { message } => wire.message = Some(message),
            Action::ModifyAttributeValues { attributes } => wire.attributes = Some(attributes),
            Action::ShowValidationError {
                message,
                attribute_errors,
            } => {
                wire.message = message.filter(|m| !m.is_empty());
                wire.attribute_errors = Some(attribute_errors).filter(|m| !m.is_empty());
            }
            Action::ProvideClaimsForToken { claims } => wire.claims = Some(claims),
        }

        WireEnvelope {
            data: WireData {
                data_type: envelope.stage.response_data_type().to_string(),
                actions: vec![wire],
            },
        }
    }
}

impl TryFrom<WireEnvelope> for ResponseEnvelope {
    type Error = EnvelopeError;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        let stage = EventStage::from_response_data_type(&wire.data.data_type)
            .ok_or_else(|| EnvelopeError::UnknownDataType(wire.data.data_type.clone()))?;

        let count = wire.data.actions.len();
        let Some(action) = wire.data.actions.into_iter().next().filter(|_| count == 1) else {
            return Err(EnvelopeError::ActionCount(count));
        };

        let kind = parse_action_kind(stage, &action.action_type)?;
        let missing = |field| EnvelopeError::MissingField { kind, field };

        let action = match kind {
            ActionKind::ContinueWithDefaultBehavior => Action::ContinueWithDefaultBehavior,
            ActionKind::SetPrefillValues => Action::SetPrefillValues {
                inputs: action.inputs.ok_or_else(|| missing("inputs"))?,
            },
            ActionKind::ShowBlockPage => Action::ShowBlockPage {
                message: action.message.ok_or_else(|| missing("message"))?,
            },
            ActionKind::ModifyAttributeValues => Action::ModifyAttributeValues {
                attributes: action.attributes.ok_or_else(|| missing("attributes"))?,
            },
            ActionKind::ShowValidationError => Action::ShowValidationError {
                message: action.message,
                attribute_errors: action.attribute_errors.unwrap_or_default(),
            },
            ActionKind::ProvideClaimsForToken => Action::ProvideClaimsForToken {
                claims: action.claims.ok_or_else(|| missing("claims"))?,
            },
        };

        ResponseEnvelope::new(stage, action)
    }
}

fn parse_action_kind(stage: EventStage, action_type: &str) -> Result<ActionKind, EnvelopeError> {
    let unknown = || EnvelopeError::UnknownActionType(action_type.to_string());

    let (prefix, name) = action_type.rsplit_once('.').ok_or_else(unknown)?;
    let expected_prefix = format!("{ODATA_NAMESPACE}{}", stage.action_segment());
    if !prefix.eq_ignore_ascii_case(&expected_prefix) {
        return Err(unknown());
    }

    ActionKind::from_name(name).ok_or_else(unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn all_variants() -> Vec<ResponseEnvelope> {
        let inputs = AttributeMap::from([
            ("city".to_string(), AttributeValue::from("Seattle")),
            ("extension_appId_mailingList".to_string(), false.into()),
            ("extension_appId_memberSince".to_string(), 2023_i64.into()),
        ]);

        vec![
            ResponseEnvelope::continue_with_default(EventStage::AttributeCollectionStart),
            ResponseEnvelope::continue_with_default(EventStage::AttributeCollectionSubmit),
            ResponseEnvelope::continue_with_default(EventStage::OtpSend),
            ResponseEnvelope::new(
                EventStage::AttributeCollectionStart,
                Action::SetPrefillValues {
                    inputs: inputs.clone(),
                },
            )
            .unwrap(),
            ResponseEnvelope::new(
                EventStage::AttributeCollectionSubmit,
                Action::ShowBlockPage {
                    message: "blocked".into(),
                },
            )
            .unwrap(),
            ResponseEnvelope::new(
                EventStage::AttributeCollectionSubmit,
                Action::ModifyAttributeValues { attributes: inputs },
            )
            .unwrap(),
            ResponseEnvelope::new(
                EventStage::AttributeCollectionSubmit,
                Action::ShowValidationError {
                    message: Some("fix it".into()),
                    attribute_errors: BTreeMap::from([("city".into(), "too short".into())]),
                },
            )
            .unwrap(),
            ResponseEnvelope::new(
                EventStage::TokenIssuanceStart,
                Action::ProvideClaimsForToken {
                    claims: Claims {
                        correlation_id: Some("abc-123".into()),
                        api_version: Some("1.0.0".into()),
                        ..Default::default()
                    },
                },
            )
            .unwrap(),
        ]
    }

    fn action_keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value["data"]["actions"][0]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn contains_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(contains_null),
            Value::Object(map) => map.values().any(contains_null),
            _ => false,
        }
    }

    #[test]
    fn continue_envelope_has_only_discriminators() {
        let value = serde_json::to_value(ResponseEnvelope::continue_with_default(
            EventStage::AttributeCollectionSubmit,
        ))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "data": {
                    "@odata.type": "microsoft.graph.onAttributeCollectionSubmitResponseData",
                    "actions": [{
                        "@odata.type": "microsoft.graph.attributeCollectionSubmit.continueWithDefaultBehavior"
                    }]
                }
            })
        );
    }

    #[test]
    fn otp_stage_uses_its_own_discriminators() {
        let value =
            serde_json::to_value(ResponseEnvelope::continue_with_default(EventStage::OtpSend))
                .unwrap();

        assert_eq!(
            value["data"]["@odata.type"],
            "microsoft.graph.OnOtpSendResponseData"
        );
        assert_eq!(
            value["data"]["actions"][0]["@odata.type"],
            "microsoft.graph.OtpSend.continueWithDefaultBehavior"
        );
    }

    #[test]
    fn validation_error_omits_empty_fields() {
        let envelope = ResponseEnvelope::new(
            EventStage::AttributeCollectionSubmit,
            Action::ShowValidationError {
                message: None,
                attribute_errors: BTreeMap::new(),
            },
        )
        .unwrap();
        let value = serde_json::to_value(envelope).unwrap();

        assert_eq!(action_keys(&value), vec!["@odata.type"]);
    }

    #[test]
    fn attribute_values_keep_their_json_types() {
        let envelope = ResponseEnvelope::new(
            EventStage::AttributeCollectionStart,
            Action::SetPrefillValues {
                inputs: AttributeMap::from([
                    ("flag".to_string(), false.into()),
                    ("year".to_string(), 2023_i64.into()),
                    ("city".to_string(), "x".into()),
                ]),
            },
        )
        .unwrap();
        let value = serde_json::to_value(envelope).unwrap();
        let inputs = &value["data"]["actions"][0]["inputs"];

        assert_eq!(inputs["flag"], json!(false));
        assert_eq!(inputs["year"], json!(2023));
        assert_eq!(inputs["city"], json!("x"));
    }

    #[test]
    fn every_variant_round_trips_with_the_same_field_set() {
        for envelope in all_variants() {
            let value = serde_json::to_value(&envelope).unwrap();
            assert!(!contains_null(&value), "null in {value}");

            let parsed: ResponseEnvelope = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(parsed, envelope);

            let reparsed = serde_json::to_value(&parsed).unwrap();
            assert_eq!(
                reparsed["data"]["actions"][0]["@odata.type"],
                value["data"]["actions"][0]["@odata.type"]
            );
            assert_eq!(action_keys(&reparsed), action_keys(&value));
        }
    }

    #[test]
    fn stage_rejects_foreign_actions() {
        let err = ResponseEnvelope::new(
            EventStage::OtpSend,
            Action::ShowBlockPage {
                message: "no".into(),
            },
        )
        .unwrap_err();

        assert_eq!(
            err,
            EnvelopeError::ActionNotPermitted {
                stage: EventStage::OtpSend,
                kind: ActionKind::ShowBlockPage,
            }
        );
    }

    #[test]
    fn parsing_requires_exactly_one_action() {
        let two = json!({
            "data": {
                "@odata.type": "microsoft.graph.OnOtpSendResponseData",
                "actions": [
                    {"@odata.type": "microsoft.graph.OtpSend.continueWithDefaultBehavior"},
                    {"@odata.type": "microsoft.graph.OtpSend.continueWithDefaultBehavior"}
                ]
            }
        });
        assert!(serde_json::from_value::<ResponseEnvelope>(two).is_err());

        let none = json!({
            "data": {"@odata.type": "microsoft.graph.OnOtpSendResponseData", "actions": []}
        });
        assert!(serde_json::from_value::<ResponseEnvelope>(none).is_err());
    }

    #[test]
    fn action_names_parse_case_insensitively() {
        let value = json!({
            "data": {
                "@odata.type": "microsoft.graph.onAttributeCollectionSubmitResponseData",
                "actions": [{
                    "@odata.type": "microsoft.graph.attributeCollectionSubmit.showValidationError",
                    "message": "m"
                }]
            }
        });
        let parsed: ResponseEnvelope = serde_json::from_value(value).unwrap();

        assert_eq!(parsed.action.kind(), ActionKind::ShowValidationError);
    }
}
