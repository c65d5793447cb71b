pub mod contract;
pub mod report;
pub mod request;
