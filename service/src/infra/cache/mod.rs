//! [`Cache`]-related implementations.

pub mod in_memory;

pub use self::in_memory::InMemory;

/// Cache operation.
///
/// Values are [`Select`]ed and [`Insert`]ed by key, while the cache itself
/// decides how long they stay fresh. [`Delete`]ing [`Expired`] drops the
/// stale ones.
///
/// [`Delete`]: common::operations::Delete
/// [`Insert`]: common::operations::Insert
/// [`Select`]: common::operations::Select
pub use common::Handler as Cache;

/// Marker selecting [`Cache`] entries whose time to live has elapsed.
#[derive(Clone, Copy, Debug)]
pub struct Expired;
