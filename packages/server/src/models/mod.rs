pub mod auth;
pub mod chat;
pub mod scan;
pub mod shared;
pub mod turn;
