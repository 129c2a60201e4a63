pub mod site;
pub mod social_account;
pub mod social_app;
pub mod user;
