pub mod acs;
pub mod factory;
pub mod gateway;
pub mod sendgrid;
pub mod template;

pub use acs::AcsEmailGateway;
pub use factory::{EmailGateways, build_email_gateways};
pub use gateway::{Delivery, DisabledGateway, EmailError, EmailGateway};
pub use sendgrid::SendGridEmailGateway;
