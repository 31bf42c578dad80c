mod product;
mod product_input;
mod response;

pub use product::*;
pub use product_input::*;
pub use response::*;
