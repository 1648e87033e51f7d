pub mod agent;
pub mod chat;
pub mod errors;
pub mod providers;
pub mod session;
pub mod tools;
pub mod transparency;
