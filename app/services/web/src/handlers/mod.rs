pub mod customer;
pub mod login;
pub mod pages;
pub mod ping;
pub mod staff;
