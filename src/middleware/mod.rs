//! Middleware module
//! 
//! This module contains middleware for request processing

pub mod auth;
pub mod throttle;

// Re-export commonly used middleware
pub use auth::AuthMiddleware;
pub use throttle::ThrottleMiddleware;
