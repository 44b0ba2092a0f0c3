pub mod auth;
pub mod customer;
pub mod deposit;
pub mod identity;
pub mod transaction;
