#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}

/// Insertion-ordered maps used for attribute and style maps, so that live
/// attributes are written in the order the application declared them.
pub mod ordered {
    pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;

    pub fn new<K, V>() -> OrderedMap<K, V> {
        OrderedMap::with_hasher(rustc_hash::FxBuildHasher)
    }
}

/// Short node lists carried by mutation records.
pub type NodeList = smallvec::SmallVec<[crate::NodeId; 2]>;
