pub mod assembler;
pub mod types;

pub use assembler::assemble;
pub use types::{
    ContextMetadata, FixtureMeta, LiveContext, PlayerContext, PlayerMeta, PreMatchContext,
    Recommendation,
};
