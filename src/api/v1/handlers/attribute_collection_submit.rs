/*
 * Responsibility
 * - OnAttributeCollectionSubmit handlers (continue / block / modify / validate)
 * - Address validation: city, postalCode, streetAddress must be present and long enough
 * - Validation failures are envelopes (ShowValidationError), never HTTP errors
 */
use std::collections::BTreeMap;

use axum::{Json, extract::rejection::JsonRejection};

use crate::api::v1::dto::envelope::{
    Action, AttributeMap, AttributeValue, EventStage, ResponseEnvelope,
};
use crate::api::v1::dto::events::{AttributeCollectionSubmitData, AttributeCollectionSubmitEvent};
use crate::error::AppError;

const STAGE: EventStage = EventStage::AttributeCollectionSubmit;

const BLOCK_MESSAGE: &str = "AttributeCollectionSubmit Custom Extension Message: Thank you for your response. Your access request is processing. You'll be notified when your request has been approved.";

const VALIDATION_MESSAGE: &str = "Please fix the below errors to proceed";

/// Minimum length (in characters) of each validated address attribute.
pub const MIN_ATTRIBUTE_LENGTH: usize = 7;

// (attribute name, label used in the error text)
const VALIDATED_ATTRIBUTES: [(&str, &str); 3] = [
    ("city", "city"),
    ("postalCode", "postalCodeValue"),
    ("streetAddress", "streetAddress"),
];

pub async fn continue_with_default() -> Json<ResponseEnvelope> {
    tracing::info!(stage = %STAGE, "continue with default behavior");
    Json(ResponseEnvelope::continue_with_default(STAGE))
}

pub async fn show_block_page() -> Result<Json<ResponseEnvelope>, AppError> {
    tracing::info!(stage = %STAGE, "show block page");
    let envelope = ResponseEnvelope::new(
        STAGE,
        Action::ShowBlockPage {
            message: BLOCK_MESSAGE.to_string(),
        },
    )?;
    Ok(Json(envelope))
}

pub async fn modify_attribute_values() -> Result<Json<ResponseEnvelope>, AppError> {
    tracing::info!(stage = %STAGE, "modify attribute values");
    let envelope = ResponseEnvelope::new(
        STAGE,
        Action::ModifyAttributeValues {
            attributes: override_values(),
        },
    )?;
    Ok(Json(envelope))
}

pub async fn show_validation_error(
    payload: Result<Json<AttributeCollectionSubmitEvent>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let Json(event) = payload?;
    tracing::info!(stage = %STAGE, data_type = event.data_type(), "validating submitted attributes");

    let envelope = validation_envelope(&event.data.body)?;
    Ok(Json(envelope))
}

/// ShowValidationError when any attribute fails, otherwise ContinueWithDefaultBehavior.
pub fn validation_envelope(
    data: &AttributeCollectionSubmitData,
) -> Result<ResponseEnvelope, AppError> {
    let attribute_errors = validate_address(data);
    if attribute_errors.is_empty() {
        return Ok(ResponseEnvelope::continue_with_default(STAGE));
    }

    let failed: Vec<&str> = attribute_errors.keys().map(String::as_str).collect();
    tracing::info!(?failed, "attribute validation failed");
    Ok(ResponseEnvelope::new(
        STAGE,
        Action::ShowValidationError {
            message: Some(VALIDATION_MESSAGE.to_string()),
            attribute_errors,
        },
    )?)
}

/// Error text keyed by failing attribute name. Absent attributes or values fail.
pub fn validate_address(data: &AttributeCollectionSubmitData) -> BTreeMap<String, String> {
    VALIDATED_ATTRIBUTES
        .iter()
        .filter(|(name, _)| {
            let length = data.attribute_text(name).map(|text| text.chars().count());
            !matches!(length, Some(n) if n >= MIN_ATTRIBUTE_LENGTH)
        })
        .map(|(name, label)| {
            (
                name.to_string(),
                format!(
                    "Length of {label} string should be at least {MIN_ATTRIBUTE_LENGTH} characters"
                ),
            )
        })
        .collect()
}

// User attributes are saved with these override values
fn override_values() -> AttributeMap {
    AttributeMap::from([
        ("postalCode".to_string(), "<your-override-value>".into()),
        ("streetAddress".to_string(), "<your-override-value>".into()),
        ("city".to_string(), "<your-override-value>".into()),
        ("extension_appId_mailingList".to_string(), AttributeValue::Bool(false)),
        ("extension_appId_memberSince".to_string(), 2010_i64.into()),
    ])
}
