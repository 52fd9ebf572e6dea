/*
 * Responsibility
 * - OnAttributeCollectionStart handlers (continue / prefill / block)
 * - Input is ignored; every response is a constant envelope
 */
use axum::Json;

use crate::api::v1::dto::envelope::{
    Action, AttributeMap, AttributeValue, EventStage, ResponseEnvelope,
};
use crate::error::AppError;

const STAGE: EventStage = EventStage::AttributeCollectionStart;

const BLOCK_MESSAGE: &str = "AttributeCollectionStart Custom Extension message: Sorry, your access request has been blocked. Try reaching an admin at admin@contoso.com.";

pub async fn continue_with_default() -> Json<ResponseEnvelope> {
    tracing::info!(stage = %STAGE, "continue with default behavior");
    Json(ResponseEnvelope::continue_with_default(STAGE))
}

pub async fn set_prefill_values() -> Result<Json<ResponseEnvelope>, AppError> {
    tracing::info!(stage = %STAGE, "set prefill values");
    let envelope = ResponseEnvelope::new(
        STAGE,
        Action::SetPrefillValues {
            inputs: prefill_values(),
        },
    )?;
    Ok(Json(envelope))
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

// The sign-up form loads with these values
fn prefill_values() -> AttributeMap {
    AttributeMap::from([
        ("postalCode".to_string(), "<your-prefill-value>".into()),
        ("streetAddress".to_string(), "<your-prefill-value>".into()),
        ("city".to_string(), "<your-prefill-value>".into()),
        ("extension_appId_mailingList".to_string(), AttributeValue::Bool(false)),
        ("extension_appId_memberSince".to_string(), 2023_i64.into()),
    ])
}
