//! 核心层：错误、认证、中间件、提取器

pub mod auth;
pub mod capture;
pub mod error;
pub mod extract;
pub mod middleware;
