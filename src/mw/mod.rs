pub mod auth_mw;
pub mod rate_limit_mw;
pub mod request_mw;
