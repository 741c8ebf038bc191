pub mod annotation;
pub mod record;
pub mod vocabulary;

pub use annotation::*;
pub use record::*;
pub use vocabulary::*;
