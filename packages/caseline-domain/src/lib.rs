pub mod customer;
pub mod management_no;
pub mod message;
pub mod processing;
