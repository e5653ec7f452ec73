pub mod chat;
pub mod message;
pub mod prompt_input;
pub mod prompt_output;
pub mod user;
