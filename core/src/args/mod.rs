//! Ordered command-line argument assembly shared by every task driver.
//!
//! ```text
//! property set ──▶ ArgValue ──(ArgStyle)──▶ rendered tokens
//!                                   │
//!             ArgumentRegistry<K> ◀─┘  (BTreeMap keyed by rank)
//!                                   │
//!                          to_args() ──▶ Vec<String> in table order
//! ```

mod registry;
mod table;
mod value;

pub use registry::{ArgumentEntry, ArgumentRegistry};
pub use table::ArgKey;
pub use value::{ArgStyle, ArgValue};
