// Utility modules

pub mod color;
pub mod time;
