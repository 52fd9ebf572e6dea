/*
 * Responsibility
 * - OnTokenIssuanceStart handlers: inject custom claims into the issued token
 * - claims: correlation id (from the request) + apiVersion (this build)
 * - claims (lookup variant): dateOfBirth / customRoles from the user directory
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::api::v1::dto::envelope::{Action, Claims, EventStage, ResponseEnvelope};
use crate::api::v1::dto::events::{InboundEvent, TokenIssuanceStartData};
use crate::error::AppError;
use crate::services::directory::UserDirectory;
use crate::state::AppState;

const STAGE: EventStage = EventStage::TokenIssuanceStart;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn provide_claims(
    State(state): State<AppState>,
    payload: Result<Json<InboundEvent<TokenIssuanceStartData>>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let Json(event) = payload?;
    let context = &event.data.body.authentication_context;
    tracing::info!(
        stage = %STAGE,
        correlation_id = %context.correlation_id,
        "providing claims with directory lookup"
    );

    let upn = context
        .user
        .as_ref()
        .and_then(|user| user.user_principal_name.as_deref());
    let mut claims = base_claims(&context.correlation_id);
    if let Some(upn) = upn {
        lookup_claims(state.directory.as_ref(), upn, &mut claims).await;
    } else {
        tracing::warn!("event has no userPrincipalName; skipping directory lookup");
    }

    Ok(Json(claims_envelope(claims)?))
}

pub async fn provide_correlation_claims(
    payload: Result<Json<InboundEvent<TokenIssuanceStartData>>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let Json(event) = payload?;
    let correlation_id = &event.data.body.authentication_context.correlation_id;
    tracing::info!(stage = %STAGE, %correlation_id, "providing correlation claims");

    Ok(Json(claims_envelope(base_claims(correlation_id))?))
}

fn base_claims(correlation_id: &str) -> Claims {
    Claims {
        correlation_id: Some(correlation_id.to_string()),
        api_version: Some(API_VERSION.to_string()),
        ..Default::default()
    }
}

// A failed lookup leaves the optional claims unset.
async fn lookup_claims(directory: &dyn UserDirectory, upn: &str, claims: &mut Claims) {
    match directory.lookup(upn).await {
        Ok(profile) => {
            claims.date_of_birth = Some(profile.date_of_birth);
            claims.custom_roles = Some(profile.custom_roles);
        }
        Err(e) => tracing::error!(error = %e, "user directory lookup failed"),
    }
}

fn claims_envelope(claims: Claims) -> Result<ResponseEnvelope, AppError> {
    Ok(ResponseEnvelope::new(
        STAGE,
        Action::ProvideClaimsForToken { claims },
    )?)
}
