pub mod customers;
pub mod dashboard;
pub mod health;
pub mod notifications;
pub mod operations;
pub mod users;
