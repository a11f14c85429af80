pub mod stock;
pub mod response;
pub mod tool;

pub use stock::*;
pub use response::*;
pub use tool::*;
