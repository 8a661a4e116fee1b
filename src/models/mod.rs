pub mod commissionmodel;
pub mod notificationmodel;
pub mod referralmodel;
pub mod usermodel;
pub mod walletmodels;
