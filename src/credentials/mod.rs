pub mod env;
pub mod scope;
pub mod source;
pub mod user_refresh;

pub use env::*;
pub use scope::*;
pub use source::*;
pub use user_refresh::*;
