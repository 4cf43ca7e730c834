pub mod api;
pub mod checkout;
pub mod config;
pub mod entities;
pub mod middleware;
pub mod payments;
