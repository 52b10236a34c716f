pub mod handlers;

pub use handlers::balance::*;
pub use handlers::command::*;
pub use handlers::contact::*;
