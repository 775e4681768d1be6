use core::fmt::Debug;
use core::hash::Hash;
use std::collections::HashSet;

pub(crate) type KeySet<K> = HashSet<K>;

/// Bound for stable item keys (document ids).
pub trait ItemKey: Clone + Hash + Eq + Debug + Send + Sync + 'static {}
impl<K: Clone + Hash + Eq + Debug + Send + Sync + 'static> ItemKey for K {}
