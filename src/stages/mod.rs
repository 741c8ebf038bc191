pub mod stage0_vocabulary;
pub mod stage1_materialize;
pub mod stage2_verify;
pub mod stage3_features;

pub use stage0_vocabulary::*;
pub use stage1_materialize::*;
pub use stage2_verify::*;
pub use stage3_features::*;
