// Module exports for models

pub mod custom_event;
pub mod performance;
pub mod preferences;
pub mod settings;
