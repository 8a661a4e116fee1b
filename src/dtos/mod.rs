pub mod commissiondtos;
pub mod userdtos;
pub mod walletdtos;
