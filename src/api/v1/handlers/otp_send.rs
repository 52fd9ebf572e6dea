/*
 * Responsibility
 * - OnOtpSend handlers: email the one-time code, then continue
 * - A failed or skipped send is logged and never changes the response
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::api::v1::dto::envelope::{EventStage, ResponseEnvelope};
use crate::api::v1::dto::events::{InboundEvent, OtpSendData};
use crate::error::AppError;
use crate::services::email::{Delivery, EmailGateway};
use crate::state::AppState;

const STAGE: EventStage = EventStage::OtpSend;

type OtpPayload = Result<Json<InboundEvent<OtpSendData>>, JsonRejection>;

/// Uses whichever provider has credentials configured.
pub async fn send_email(
    State(state): State<AppState>,
    payload: OtpPayload,
) -> Result<Json<ResponseEnvelope>, AppError> {
    dispatch(state.email.preferred.as_ref(), payload).await
}

pub async fn send_email_acs(
    State(state): State<AppState>,
    payload: OtpPayload,
) -> Result<Json<ResponseEnvelope>, AppError> {
    dispatch(state.email.acs.as_ref(), payload).await
}

pub async fn send_email_sendgrid(
    State(state): State<AppState>,
    payload: OtpPayload,
) -> Result<Json<ResponseEnvelope>, AppError> {
    dispatch(state.email.sendgrid.as_ref(), payload).await
}

async fn dispatch(
    gateway: &dyn EmailGateway,
    payload: OtpPayload,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let Json(event) = payload?;
    let otp = &event.data.body.otp_context;
    tracing::info!(stage = %STAGE, provider = gateway.provider(), "sending OTP to {}", otp.identifier);

    deliver(gateway, &otp.identifier, &otp.onetimecode).await;

    Ok(Json(ResponseEnvelope::continue_with_default(STAGE)))
}

async fn deliver(gateway: &dyn EmailGateway, to: &str, code: &str) {
    match gateway.send_otp(to, code).await {
        Ok(Delivery::Sent) => tracing::info!(provider = gateway.provider(), "OTP email sent"),
        Ok(Delivery::Skipped) => {
            tracing::warn!(provider = gateway.provider(), "OTP email skipped")
        }
        Err(e) => tracing::error!(provider = gateway.provider(), error = %e, "OTP email failed"),
    }
}
