pub mod auth;
pub mod customer_service;
pub mod dashboard_service;
pub mod export;
pub mod notification;
pub mod operation_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testing;
