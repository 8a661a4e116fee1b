pub mod currency;
pub mod decimal;
pub mod password;
pub mod referral_code;
pub mod token;
