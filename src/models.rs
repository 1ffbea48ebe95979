pub mod auth;
pub mod customer;
pub mod dashboard;
pub mod operation;
pub mod tenancy;
pub mod user;
