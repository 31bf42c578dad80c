mod connection;
mod store;

pub use connection::*;
pub use store::*;
