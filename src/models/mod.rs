// Model modules
pub mod chat;
pub mod common;
pub mod credits;
pub mod ledger;
pub mod users;
