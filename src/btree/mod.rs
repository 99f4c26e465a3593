//! B-Tree Module
//!
//! The on-disk tree of fixed-size pages that stores the table.
//!
//! ## Node Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Common header (12 bytes)                                     │
//! │ ┌────────┬─────────┬───────────┬────────────┬──────────────┐ │
//! │ │type (1)│is_root  │parent (4) │free-space  │cell count (4)│ │
//! │ │        │   (1)   │           │ptr (2,leaf)│              │ │
//! │ └────────┴─────────┴───────────┴────────────┴──────────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Leaf: next-leaf (4) │ cells: [key u32][row 256] ...          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Internal: right child (4) │ cells: [child u32][key u32] ...  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Leaf cells are sorted ascending by key, packed gap-free from the start of
//! the body. An internal node's cell key is the maximum key of the subtree
//! rooted at the cell's child; the rightmost child carries no separator.
//! Every leaf stores its right sibling's page number (0 = none), so ordered
//! scans are a pure linked traversal.

pub mod cursor;
pub mod layout;
pub mod table;

pub use cursor::Scan;
pub use table::Table;
