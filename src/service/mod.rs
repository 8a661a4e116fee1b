pub mod commission_service;
pub mod error;
pub mod ledger_service;
pub mod notification_service;
pub mod referral_service;
