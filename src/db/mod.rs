pub mod commissiondb;
pub mod db;
pub mod ledgerdb;
pub mod notificationdb;
pub mod userdb;
