pub mod directory;
pub mod email;
