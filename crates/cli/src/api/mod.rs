//! Backend access: the request client, token storage, and typed endpoints
//!
//! All calls share one [`ApiClient`], which owns the token store. Endpoint
//! modules unwrap the backend's `{ success, data }` envelope into typed values.

pub mod auth;
pub mod client;
pub mod invoices;
pub mod payment;
pub mod subscription;
pub mod token;
pub mod types;

pub use client::ApiClient;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{RequestError, RequestOptions, LIMIT_REACHED};
