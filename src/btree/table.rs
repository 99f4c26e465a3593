//! Table
//!
//! The tree orchestrator: finds the target leaf for a key, inserts cells in
//! sorted position, detects overflow, performs leaf and internal splits, and
//! keeps the root at page 0.
//!
//! ## Split discipline
//! - Every page a split cascade will need is reserved before any node is
//!   mutated, so an exhausted page budget surfaces as `TableFull` with the
//!   tree in its last consistent state (allocate-then-link, never
//!   link-then-allocate).
//! - Splits propagate bottom-up over parent pointers as a tagged
//!   `(separator, right page)` value, terminating at a non-full parent or at
//!   the root.
//! - A split root is relocated: its bytes move to a fresh page and page 0 is
//!   re-initialized as an internal node with exactly two children. Page 0 is
//!   the root for the lifetime of the file.

use std::path::Path;

use crate::btree::cursor::{Cursor, Scan};
use crate::btree::layout::{
    self, NodeType, INTERNAL_NODE_MAX_KEYS, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS,
};
use crate::config::{Config, FlushStrategy};
use crate::error::{OrionError, Result};
use crate::pager::{Page, Pager, TABLE_MAX_PAGES};
use crate::row::Row;

/// Page number of the root, fixed for the lifetime of the file
pub const ROOT_PAGE_NUM: u32 = 0;

/// The main table handle
///
/// One `Table` instance owns the backing file; opening the same file from two
/// processes concurrently is unsupported and undefined.
pub struct Table {
    /// Sole owner of page buffers and the backing file
    pub(crate) pager: Pager,

    /// Table configuration
    config: Config,
}

impl Table {
    /// Open or create a table with the given config
    pub fn open(config: Config) -> Result<Self> {
        let pager = Pager::open(&config.path)?;
        Ok(Self { pager, config })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified database file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().path(path).build();
        Self::open(config)
    }

    /// Insert a row at its sorted position.
    ///
    /// Fails with `DuplicateKey` when a row with the same id exists (no
    /// mutation performed) and `TableFull` when a required split cannot be
    /// given a page (tree left in its last consistent state).
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        // An empty file gets page 0 initialized as a root leaf.
        if self.pager.num_pages() == 0 {
            let page_num = self.pager.allocate_page()?;
            let page = self.pager.get_page(page_num)?;
            layout::init_leaf(page);
            layout::set_is_root(page, true);
            layout::set_parent(page, page_num);
        }

        let key = row.id();
        // Serialize first: a codec failure must reach no page.
        let cell = row.serialize()?;

        let (leaf_page, cell_idx) = self.find_leaf(key)?;
        let page = self.pager.get_page(leaf_page)?;
        let n = layout::num_cells(page) as usize;

        if cell_idx < n && layout::leaf_key(page, cell_idx) == key {
            return Err(OrionError::DuplicateKey(key));
        }

        if n < LEAF_NODE_MAX_CELLS {
            layout::leaf_insert_cell(page, cell_idx, key, &cell);
            if self.config.flush_strategy == FlushStrategy::EveryInsert {
                self.pager.flush_all()?;
            }
            return Ok(());
        }

        // Overflowing leaf: reserve the whole cascade's pages up front, then
        // split and propagate the separator upward.
        self.reserve_split_pages(leaf_page)?;
        let (separator, right_page) = self.split_leaf(leaf_page, cell_idx, key, &cell)?;
        self.insert_into_parent(leaf_page, separator, right_page)?;

        // Structural mutation: flush for durability under either strategy.
        self.pager.flush_all()?;
        Ok(())
    }

    /// Look up a single row by key
    pub fn find(&mut self, key: u32) -> Result<Option<Row>> {
        if self.pager.num_pages() == 0 {
            return Ok(None);
        }
        let (leaf_page, cell_idx) = self.find_leaf(key)?;
        let page = self.pager.get_page(leaf_page)?;
        if cell_idx < layout::num_cells(page) as usize && layout::leaf_key(page, cell_idx) == key {
            return Row::deserialize(layout::leaf_value(page, cell_idx)).map(Some);
        }
        Ok(None)
    }

    /// Scan every row in ascending key order.
    ///
    /// Lazy and restartable; each call opens a fresh cursor at the leftmost
    /// leaf.
    pub fn scan(&mut self) -> Result<Scan<'_>> {
        Scan::new(self)
    }

    /// Close the table: flush every resident page and release the file
    pub fn close(mut self) -> Result<()> {
        self.pager.flush_all()
    }

    // =========================================================================
    // Descent
    // =========================================================================

    /// Descend from the root to the leaf that owns `key`.
    ///
    /// Returns the leaf page number and the index of the first cell with
    /// `cell.key >= key` — the lookup position and the insertion point.
    fn find_leaf(&mut self, key: u32) -> Result<(u32, usize)> {
        let mut page_num = ROOT_PAGE_NUM;
        loop {
            let page = self.pager.get_page(page_num)?;
            match layout::node_type(page)? {
                NodeType::Leaf => return Ok((page_num, layout::leaf_find(page, key))),
                NodeType::Internal => {
                    let child_idx = layout::internal_find_child(page, key);
                    page_num = layout::internal_child(page, child_idx);
                }
            }
        }
    }

    /// Position a cursor at the first cell of the leftmost leaf.
    ///
    /// `end_of_table` is set only when the tree holds zero rows.
    pub(crate) fn cursor_start(&mut self) -> Result<Cursor> {
        if self.pager.num_pages() == 0 {
            return Ok(Cursor {
                page_num: ROOT_PAGE_NUM,
                cell_num: 0,
                end_of_table: true,
            });
        }
        let mut page_num = ROOT_PAGE_NUM;
        loop {
            let page = self.pager.get_page(page_num)?;
            match layout::node_type(page)? {
                NodeType::Leaf => {
                    let empty = layout::num_cells(page) == 0;
                    return Ok(Cursor {
                        page_num,
                        cell_num: 0,
                        end_of_table: empty,
                    });
                }
                NodeType::Internal => page_num = layout::internal_child(page, 0),
            }
        }
    }

    // =========================================================================
    // Splits
    // =========================================================================

    /// Count and reserve the pages the split cascade starting at `leaf_page`
    /// will allocate: one right sibling per splitting level, plus one
    /// relocation page when the cascade reaches the root.
    ///
    /// Nothing has been mutated yet when this fails with `TableFull`.
    fn reserve_split_pages(&mut self, leaf_page: u32) -> Result<()> {
        let mut needed: u32 = 1;
        let mut page_num = leaf_page;
        loop {
            let (at_root, parent_num) = {
                let page = self.pager.get_page(page_num)?;
                (layout::is_root(page), layout::parent(page))
            };
            if at_root {
                needed += 1;
                break;
            }
            let parent_full = {
                let parent = self.pager.get_page(parent_num)?;
                layout::num_cells(parent) as usize >= INTERNAL_NODE_MAX_KEYS
            };
            if !parent_full {
                break;
            }
            needed += 1;
            page_num = parent_num;
        }
        if self.pager.num_pages() + needed > TABLE_MAX_PAGES as u32 {
            return Err(OrionError::TableFull);
        }
        Ok(())
    }

    /// Split a full leaf while inserting `(key, cell)` at `cell_idx`.
    ///
    /// The new right sibling takes the strictly-greater half, so each half is
    /// individually sorted; sibling links are re-threaded through the new
    /// page. Returns the separator (the left leaf's new maximum key) and the
    /// right sibling's page number for the parent to adopt.
    fn split_leaf(
        &mut self,
        leaf_page: u32,
        cell_idx: usize,
        key: u32,
        cell: &[u8],
    ) -> Result<(u32, u32)> {
        let right_page = self.pager.allocate_page()?;

        // All MAX + 1 cells in sorted order, the new one in position.
        let (old_next, parent, cells) = {
            let page = self.pager.get_page(leaf_page)?;
            let n = layout::num_cells(page) as usize;
            let mut cells: Vec<(u32, Vec<u8>)> = Vec::with_capacity(n + 1);
            for i in 0..n {
                cells.push((layout::leaf_key(page, i), layout::leaf_value(page, i).to_vec()));
            }
            cells.insert(cell_idx, (key, cell.to_vec()));
            (layout::leaf_next(page), layout::parent(page), cells)
        };

        let left_count = LEAF_NODE_LEFT_SPLIT_COUNT;
        let right_count = cells.len() - left_count;

        // Write the right sibling first; the original leaf is untouched
        // until the new page holds its half.
        {
            let right = self.pager.get_page(right_page)?;
            layout::init_leaf(right);
            layout::set_parent(right, parent);
            layout::set_leaf_next(right, old_next);
            for (i, (k, v)) in cells[left_count..].iter().enumerate() {
                layout::set_leaf_key(right, i, *k);
                layout::leaf_value_mut(right, i).copy_from_slice(v);
            }
            layout::set_num_cells(right, right_count as u32);
            layout::set_free_space(
                right,
                (layout::LEAF_NODE_HEADER_SIZE + right_count * layout::LEAF_NODE_CELL_SIZE) as u16,
            );
        }

        // Rewrite the left half in place and thread the sibling link.
        let page = self.pager.get_page(leaf_page)?;
        for (i, (k, v)) in cells[..left_count].iter().enumerate() {
            layout::set_leaf_key(page, i, *k);
            layout::leaf_value_mut(page, i).copy_from_slice(v);
        }
        layout::set_num_cells(page, left_count as u32);
        layout::set_free_space(
            page,
            (layout::LEAF_NODE_HEADER_SIZE + left_count * layout::LEAF_NODE_CELL_SIZE) as u16,
        );
        layout::set_leaf_next(page, right_page);

        let separator = cells[left_count - 1].0;
        tracing::debug!(left = leaf_page, right = right_page, separator, "leaf split");
        Ok((separator, right_page))
    }

    /// Adopt a freshly split child into `left_page`'s parent.
    ///
    /// `right_page`'s subtree holds the keys strictly greater than
    /// `separator`. Recurses upward when the parent itself overflows;
    /// terminates at a non-full parent or by relocating the root.
    fn insert_into_parent(&mut self, left_page: u32, separator: u32, right_page: u32) -> Result<()> {
        let at_root = {
            let left = self.pager.get_page(left_page)?;
            layout::is_root(left)
        };
        if at_root {
            return self.relocate_root(separator, right_page);
        }

        let parent_num = {
            let left = self.pager.get_page(left_page)?;
            layout::parent(left)
        };

        let (n, child_idx) = {
            let parent = self.pager.get_page(parent_num)?;
            (
                layout::num_cells(parent) as usize,
                child_index_of(parent, left_page)?,
            )
        };

        if n < INTERNAL_NODE_MAX_KEYS {
            let parent = self.pager.get_page(parent_num)?;
            if child_idx < n {
                // The split child keeps its cell with the new separator; the
                // right sibling inherits the old separator (its subtree max).
                let old_key = layout::internal_key(parent, child_idx);
                layout::set_internal_key(parent, child_idx, separator);
                layout::internal_insert_cell(parent, child_idx + 1, right_page, old_key);
            } else {
                // The split child was the rightmost: it gains a cell and the
                // right sibling becomes the new rightmost child.
                layout::internal_insert_cell(parent, n, left_page, separator);
                layout::set_internal_right_child(parent, right_page);
            }
            let right = self.pager.get_page(right_page)?;
            layout::set_parent(right, parent_num);
            return Ok(());
        }

        self.split_internal(parent_num, child_idx, separator, right_page)
    }

    /// Split a full internal node that must adopt `(separator, right_page)`
    /// next to the child at `child_idx`.
    ///
    /// The median key is promoted, children moved to the new sibling are
    /// re-parented, and the promotion recurses through `insert_into_parent`.
    fn split_internal(
        &mut self,
        page_num: u32,
        child_idx: usize,
        separator: u32,
        right_page: u32,
    ) -> Result<()> {
        let new_page = self.pager.allocate_page()?;

        // Logical (children, keys) lists with the new entry in position.
        let (mut children, mut keys, was_root, old_parent) = {
            let page = self.pager.get_page(page_num)?;
            let n = layout::num_cells(page) as usize;
            let mut children: Vec<u32> = (0..=n).map(|i| layout::internal_child(page, i)).collect();
            let mut keys: Vec<u32> = (0..n).map(|i| layout::internal_key(page, i)).collect();
            if child_idx < n {
                let old_key = keys[child_idx];
                keys[child_idx] = separator;
                children.insert(child_idx + 1, right_page);
                keys.insert(child_idx + 1, old_key);
            } else {
                children.push(right_page);
                keys.push(separator);
            }
            (children, keys, layout::is_root(page), layout::parent(page))
        };

        let mid = keys.len() / 2;
        let promoted = keys[mid];
        let right_keys: Vec<u32> = keys.split_off(mid + 1);
        keys.truncate(mid);
        let right_children: Vec<u32> = children.split_off(mid + 1);

        // Fill the new right sibling, then re-point its children at it.
        {
            let page = self.pager.get_page(new_page)?;
            layout::init_internal(page);
            layout::set_parent(page, old_parent);
            write_internal_cells(page, &right_children, &right_keys);
        }
        for &child in &right_children {
            let page = self.pager.get_page(child)?;
            layout::set_parent(page, new_page);
        }

        // Rewrite the left half in place, keeping its header identity.
        {
            let page = self.pager.get_page(page_num)?;
            layout::init_internal(page);
            layout::set_is_root(page, was_root);
            layout::set_parent(page, old_parent);
            write_internal_cells(page, &children, &keys);
        }
        // The adopted right sibling may have landed in the left half.
        for &child in &children {
            let page = self.pager.get_page(child)?;
            layout::set_parent(page, page_num);
        }

        tracing::debug!(
            left = page_num,
            right = new_page,
            separator = promoted,
            "internal split"
        );
        self.insert_into_parent(page_num, promoted, new_page)
    }

    /// Relocate a split root.
    ///
    /// Page 0 just split in place: it holds the lesser half, `right_page` the
    /// greater. Its bytes are copied to a fresh page, children (if any)
    /// follow, and page 0 is re-initialized as an internal root holding
    /// exactly the two halves.
    fn relocate_root(&mut self, separator: u32, right_page: u32) -> Result<()> {
        let left_page = self.pager.allocate_page()?;

        let root_bytes: Page = *self.pager.get_page(ROOT_PAGE_NUM)?;
        {
            let left = self.pager.get_page(left_page)?;
            *left = root_bytes;
            layout::set_is_root(left, false);
            layout::set_parent(left, ROOT_PAGE_NUM);
        }

        // An internal relocated half keeps custody of its children.
        let moved_children = {
            let left = self.pager.get_page(left_page)?;
            match layout::node_type(left)? {
                NodeType::Internal => {
                    let n = layout::num_cells(left) as usize;
                    (0..=n).map(|i| layout::internal_child(left, i)).collect()
                }
                NodeType::Leaf => Vec::new(),
            }
        };
        for child in moved_children {
            let page = self.pager.get_page(child)?;
            layout::set_parent(page, left_page);
        }

        {
            let root = self.pager.get_page(ROOT_PAGE_NUM)?;
            layout::init_internal(root);
            layout::set_is_root(root, true);
            layout::set_parent(root, ROOT_PAGE_NUM);
            layout::internal_insert_cell(root, 0, left_page, separator);
            layout::set_internal_right_child(root, right_page);
        }
        {
            let right = self.pager.get_page(right_page)?;
            layout::set_parent(right, ROOT_PAGE_NUM);
        }

        tracing::debug!(
            left = left_page,
            right = right_page,
            separator,
            "root split; contents relocated"
        );
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of pages the table occupies
    pub fn num_pages(&self) -> u32 {
        self.pager.num_pages()
    }

    /// Borrow a page's raw contents
    pub fn page(&mut self, page_num: u32) -> Result<&Page> {
        self.pager.get_page(page_num).map(|p| &*p)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Index of `child` among an internal node's child pointers
fn child_index_of(parent: &Page, child: u32) -> Result<usize> {
    let n = layout::num_cells(parent) as usize;
    for i in 0..=n {
        if layout::internal_child(parent, i) == child {
            return Ok(i);
        }
    }
    Err(OrionError::Corrupted(format!(
        "page {} not found among its parent's children",
        child
    )))
}

/// Write an internal node's body from logical child/key lists; the last
/// child becomes the rightmost pointer.
fn write_internal_cells(page: &mut Page, children: &[u32], keys: &[u32]) {
    for (i, (&child, &key)) in children.iter().zip(keys.iter()).enumerate() {
        layout::internal_insert_cell(page, i, child, key);
    }
    layout::set_internal_right_child(page, children[children.len() - 1]);
}
