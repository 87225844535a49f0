/// Ripple Social API
///
/// REST backend for accounts, posts, nested comments, likes and the
/// friend-request/follow graph.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `services`: Business logic layer, one service per domain module
/// - `models`: Flat database records and shared value types
/// - `middleware`: Bearer-JWT authentication
/// - `response`: Uniform API response envelope
/// - `pagination`: Page filter parameters and paged-result metadata
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod response;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
