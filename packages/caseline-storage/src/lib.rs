pub mod cases;
pub mod counter;
pub mod customers;
pub mod db;
pub mod messages;
pub mod models;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
