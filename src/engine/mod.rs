pub mod pool;
pub mod tag_index;

pub use pool::{Draw, Progress, compute_pool, draw, pool_indices, progress};
pub use tag_index::{build_tag_index, tag_universe};
