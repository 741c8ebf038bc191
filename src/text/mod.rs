pub mod normalize;
pub mod policy;

pub use normalize::*;
pub use policy::*;
