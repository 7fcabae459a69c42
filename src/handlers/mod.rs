pub mod admin_handlers;
pub mod asset_handlers;
pub mod health_handlers;
