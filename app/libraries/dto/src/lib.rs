pub mod auth;
pub mod customer;
pub mod deposit;
pub mod envelope;
pub mod transaction;
