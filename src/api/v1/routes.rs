/*
 * Responsibility
 * - v1 URL layout: one route per event stage x behavior
 * - The identity provider only POSTs; the generic OTP route also accepts GET
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    attribute_collection_start as start, attribute_collection_submit as submit, otp_send,
    token_issuance_start as token,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/attribute-collection-start", attribute_collection_start())
        .nest("/attribute-collection-submit", attribute_collection_submit())
        .nest("/token-issuance-start", token_issuance_start())
        .nest("/otp-send", otp_send())
}

fn attribute_collection_start() -> Router<AppState> {
    Router::new()
        .route("/continue", post(start::continue_with_default))
        .route("/prefill", post(start::set_prefill_values))
        .route("/block", post(start::show_block_page))
}

fn attribute_collection_submit() -> Router<AppState> {
    Router::new()
        .route("/continue", post(submit::continue_with_default))
        .route("/block", post(submit::show_block_page))
        .route("/modify", post(submit::modify_attribute_values))
        .route("/validate", post(submit::show_validation_error))
}

fn token_issuance_start() -> Router<AppState> {
    Router::new()
        .route("/claims", post(token::provide_claims))
        .route("/correlation", post(token::provide_correlation_claims))
}

fn otp_send() -> Router<AppState> {
    Router::new()
        .route(
            "/email",
            get(otp_send::send_email).post(otp_send::send_email),
        )
        .route("/email/acs", post(otp_send::send_email_acs))
        .route("/email/sendgrid", post(otp_send::send_email_sendgrid))
}
