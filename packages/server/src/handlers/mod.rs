pub mod auth;
pub mod chat;
pub mod model_probe;
pub mod scan_record;
pub mod turn;
