pub mod auth;
pub mod commission;
pub mod notification_handler;
pub mod users;
pub mod wallet;
