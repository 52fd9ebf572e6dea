pub mod attribute_collection_start;
pub mod attribute_collection_submit;
pub mod health;
pub mod otp_send;
pub mod token_issuance_start;
