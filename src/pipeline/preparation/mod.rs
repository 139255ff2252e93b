// src/pipeline/preparation/mod.rs
//
// Dataset-level stages: each takes whole partitions and returns new ones.

mod balancer;
mod dedup;
mod encoder;
mod splitter;

pub use balancer::{balance, prepare_for_training};
pub use dedup::deduplicate_by_text;
pub use encoder::encode;
pub use splitter::{shuffle_records, split, stratified_split};
