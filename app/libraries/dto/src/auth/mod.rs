pub mod login;
pub mod staff;
