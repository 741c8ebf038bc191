pub mod annotations;
pub mod audio;
pub mod records;
pub mod vocabulary;

pub use annotations::*;
pub use audio::*;
pub use records::*;
pub use vocabulary::*;
