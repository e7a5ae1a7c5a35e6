pub mod auction;
pub mod bidding;
pub mod database;
pub mod error;
pub mod handlers;
pub mod participation;
pub mod query;
pub mod scheduler;
pub mod store;
pub mod winner;
