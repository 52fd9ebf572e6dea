/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - email gateways per provider, user directory
 * - Cheap to clone (everything behind Arc); no per-request mutable state
 */
use std::sync::Arc;

use crate::services::{directory::UserDirectory, email::EmailGateways};

#[derive(Clone)]
pub struct AppState {
    pub email: EmailGateways,
    pub directory: Arc<dyn UserDirectory>,
}

impl AppState {
    pub fn new(email: EmailGateways, directory: Arc<dyn UserDirectory>) -> Self {
        Self { email, directory }
    }
}
