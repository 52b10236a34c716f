pub mod balance;
pub mod command;
pub mod contact;
