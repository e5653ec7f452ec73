mod common;

mod auth;
mod probe;
mod scan_record;
mod turn;
