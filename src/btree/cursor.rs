//! Cursor
//!
//! A transient traversal position within the tree, and the lazy `Scan`
//! iterator built on top of it.
//!
//! Cursors are ephemeral and single-use: created fresh per operation, never
//! persisted, and invalidated by any structural mutation. Callers must not
//! advance a cursor across an insert.

use crate::btree::layout;
use crate::btree::table::Table;
use crate::error::Result;
use crate::row::Row;

/// Position within the tree: a leaf page, a cell index, and whether the end
/// of the table has been reached.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor {
    pub(crate) page_num: u32,
    pub(crate) cell_num: u32,
    pub(crate) end_of_table: bool,
}

/// Lazy iterator over every row in ascending key order.
///
/// Opens at the leftmost leaf and follows next-leaf links across leaf
/// boundaries; no re-descent from the root per row. Finite, read-only, and
/// restartable — each `Table::scan` call opens a fresh cursor.
pub struct Scan<'t> {
    table: &'t mut Table,
    cursor: Cursor,
}

impl<'t> Scan<'t> {
    pub(crate) fn new(table: &'t mut Table) -> Result<Self> {
        let cursor = table.cursor_start()?;
        Ok(Self { table, cursor })
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.end_of_table {
            return None;
        }

        let cell = self.cursor.cell_num as usize;
        let item = match self.table.pager.get_page(self.cursor.page_num) {
            Ok(page) => {
                let row = Row::deserialize(layout::leaf_value(page, cell));

                // Advance: next cell in this leaf, else follow the sibling
                // link (0 = rightmost leaf).
                if cell + 1 < layout::num_cells(page) as usize {
                    self.cursor.cell_num += 1;
                } else {
                    let next = layout::leaf_next(page);
                    if next == 0 {
                        self.cursor.end_of_table = true;
                    } else {
                        self.cursor.page_num = next;
                        self.cursor.cell_num = 0;
                    }
                }
                row
            }
            Err(e) => {
                self.cursor.end_of_table = true;
                Err(e)
            }
        };
        Some(item)
    }
}
