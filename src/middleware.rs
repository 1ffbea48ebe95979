pub mod auth;
pub mod tenancy;
