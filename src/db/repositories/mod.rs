pub mod site_repository;
pub mod social_account_repository;
pub mod social_app_repository;
pub mod user_repository;
