//! Background [`Task`]s definitions.

mod background;
pub mod evict_expired_search_results;

pub use common::Handler as Task;

pub use self::{
    background::{Background, TaskError},
    evict_expired_search_results::EvictExpiredSearchResults,
};
