pub mod envelope;
pub mod events;
