#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::HashSet;

use crate::NodeId;

#[cfg(feature = "std")]
pub(crate) type NodeSet = HashSet<NodeId>;
#[cfg(not(feature = "std"))]
pub(crate) type NodeSet = BTreeSet<NodeId>;
