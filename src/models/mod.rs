// Module exports for models

pub mod category;
pub mod draft;
pub mod event;
pub mod registration;
pub mod settings;
pub mod statistics;
pub mod status;
