pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod password;
pub mod services;
