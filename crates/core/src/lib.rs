pub mod config;
pub mod error;
pub mod fact;
pub mod ids;

pub use config::{CatchUpPolicy, SessionConfig};
pub use error::*;
pub use fact::*;
pub use ids::*;
