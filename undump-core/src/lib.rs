pub mod arch;
pub mod dump;
pub mod error;
pub mod member;
pub mod types;

pub use arch::*;
pub use dump::*;
pub use error::*;
pub use member::*;
pub use types::*;
