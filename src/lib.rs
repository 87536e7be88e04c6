
pub mod logging;
pub mod args;
pub mod error;
pub mod geometry;
pub mod conciliate;
pub mod metadata;
pub mod objects;
pub mod aligner;
pub mod protocols;
