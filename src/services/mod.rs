pub mod dedup;
pub mod sync;
