//! Pager
//!
//! Owns the backing file and every in-memory page buffer.
//!
//! ## Responsibilities
//! - Open or create the database file on startup
//! - Serve page buffers by page number, loading from disk on first access
//! - Allocate fresh zeroed pages for the tree to grow into
//! - Write pages back in full, never partially
//!
//! All reads and writes go through the pager; callers borrow page contents
//! for the duration of one tree operation and never hold a buffer across a
//! call that might allocate or flush.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{OrionError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Size of one page in bytes — the unit of I/O and of tree-node storage
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages a table may occupy
pub const TABLE_MAX_PAGES: usize = 100;

/// One fixed-size page buffer
pub type Page = [u8; PAGE_SIZE];

// =============================================================================
// Pager
// =============================================================================

/// Demand-paging cache over the backing file.
///
/// Pages are an arena indexed by page number; a slot is `None` until the page
/// is first requested. `num_pages` counts the pages of the logical database,
/// resident or not.
pub struct Pager {
    /// Backing file handle
    file: File,

    /// Page arena, indexed by page number
    pages: Vec<Option<Box<Page>>>,

    /// Number of pages in the database (file pages plus unflushed allocations)
    num_pages: u32,
}

impl Pager {
    /// Open or create the backing file.
    ///
    /// The resident page count is derived from the file length; a length that
    /// is not a whole number of pages means a torn write and is surfaced as
    /// `Corrupted`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let file_len = file.metadata()?.len();

        if file_len % PAGE_SIZE as u64 != 0 {
            return Err(OrionError::Corrupted(format!(
                "file length {} is not a whole number of {}-byte pages",
                file_len, PAGE_SIZE
            )));
        }
        let num_pages = (file_len / PAGE_SIZE as u64) as u32;

        let mut pages = Vec::with_capacity(TABLE_MAX_PAGES);
        pages.resize_with(TABLE_MAX_PAGES, || None);

        tracing::debug!(path = %path.display(), pages = num_pages, "opened database file");

        Ok(Self {
            file,
            pages,
            num_pages,
        })
    }

    /// Number of pages in the database
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Borrow a page buffer, loading it from disk on first access.
    ///
    /// A page number beyond the end of the file yields a zeroed buffer; one at
    /// or beyond `TABLE_MAX_PAGES` fails with `PageOutOfRange`.
    pub fn get_page(&mut self, page_num: u32) -> Result<&mut Page> {
        let idx = page_num as usize;
        if idx >= TABLE_MAX_PAGES {
            return Err(OrionError::PageOutOfRange {
                requested: page_num,
                max: TABLE_MAX_PAGES as u32,
            });
        }

        if self.pages[idx].is_none() {
            let mut page: Box<Page> = Box::new([0u8; PAGE_SIZE]);
            if page_num < self.num_pages {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
                self.file.read_exact(&mut page[..])?;
            }
            self.pages[idx] = Some(page);
        }

        // Slot is populated by the branch above; the closure never runs.
        Ok(self.pages[idx].get_or_insert_with(|| Box::new([0u8; PAGE_SIZE])))
    }

    /// Allocate the next unused page number with a zeroed in-memory slot.
    ///
    /// Nothing reaches disk until the page is flushed. Fails with `TableFull`
    /// when the page budget is exhausted.
    pub fn allocate_page(&mut self) -> Result<u32> {
        if self.num_pages as usize >= TABLE_MAX_PAGES {
            return Err(OrionError::TableFull);
        }
        let page_num = self.num_pages;
        self.pages[page_num as usize] = Some(Box::new([0u8; PAGE_SIZE]));
        self.num_pages += 1;

        tracing::debug!(page = page_num, "allocated page");
        Ok(page_num)
    }

    /// Write one resident page back to its file offset.
    ///
    /// Always writes the full `PAGE_SIZE` bytes, even when the node is
    /// logically short, so re-reads are deterministic. A page that was never
    /// loaded has nothing newer than the file copy and is skipped.
    pub fn flush_page(&mut self, page_num: u32) -> Result<()> {
        let idx = page_num as usize;
        if idx >= TABLE_MAX_PAGES {
            return Err(OrionError::PageOutOfRange {
                requested: page_num,
                max: TABLE_MAX_PAGES as u32,
            });
        }
        if let Some(page) = self.pages[idx].as_ref() {
            self.file
                .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
            self.file.write_all(&page[..])?;
        }
        Ok(())
    }

    /// Flush every page of the database and sync the file
    pub fn flush_all(&mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            self.flush_page(page_num)?;
        }
        self.file.sync_all()?;
        Ok(())
    }
}
