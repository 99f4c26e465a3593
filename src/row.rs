//! Row definition and fixed-width binary codec
//!
//! One logical record: a `u32` key plus two bounded text fields. Every row
//! serializes to exactly `ROW_SIZE` bytes; field widths are part of the
//! on-disk format and cannot change for the lifetime of a database file.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ id: u32 LE (4) │ username (32) │ email (220)        │
//! └─────────────────────────────────────────────────────┘
//! ```
//! Short fields are zero-padded on the right. Oversize fields are rejected
//! with `FieldTooLong`, never truncated.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{OrionError, Result};

// =============================================================================
// Layout Constants
// =============================================================================

/// Size of the id field (u32, little-endian)
pub const ID_SIZE: usize = 4;

/// Capacity of the username field in bytes
pub const USERNAME_SIZE: usize = 32;

/// Capacity of the email field in bytes
pub const EMAIL_SIZE: usize = 220;

/// Serialized size of one row: id (4) + username (32) + email (220) = 256
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

// =============================================================================
// Row
// =============================================================================

/// A single table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: u32,
    username: String,
    email: String,
}

impl Row {
    /// Create a row, validating field lengths.
    ///
    /// Returns `FieldTooLong` when a field exceeds its fixed capacity.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        if username.len() > USERNAME_SIZE {
            return Err(OrionError::FieldTooLong {
                field: "username",
                len: username.len(),
                max: USERNAME_SIZE,
            });
        }
        if email.len() > EMAIL_SIZE {
            return Err(OrionError::FieldTooLong {
                field: "email",
                len: email.len(),
                max: EMAIL_SIZE,
            });
        }
        Ok(Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    /// Row key
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Username field
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Email field
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Serialize into a caller-provided buffer of at least `ROW_SIZE` bytes.
    ///
    /// Writes exactly `ROW_SIZE` bytes: id little-endian, then each text
    /// field zero-padded to its capacity.
    pub fn serialize_into(&self, mut buf: &mut [u8]) -> Result<()> {
        if buf.len() < ROW_SIZE {
            return Err(OrionError::MalformedRow(format!(
                "serialization target holds {} bytes, row needs {}",
                buf.len(),
                ROW_SIZE
            )));
        }
        // Field lengths are enforced in `new`, but serialization is the last
        // point where an oversize field could corrupt a neighboring one.
        if self.username.len() > USERNAME_SIZE {
            return Err(OrionError::FieldTooLong {
                field: "username",
                len: self.username.len(),
                max: USERNAME_SIZE,
            });
        }
        if self.email.len() > EMAIL_SIZE {
            return Err(OrionError::FieldTooLong {
                field: "email",
                len: self.email.len(),
                max: EMAIL_SIZE,
            });
        }

        buf.put_u32_le(self.id);
        buf.put_slice(self.username.as_bytes());
        buf.put_bytes(0, USERNAME_SIZE - self.username.len());
        buf.put_slice(self.email.as_bytes());
        buf.put_bytes(0, EMAIL_SIZE - self.email.len());
        Ok(())
    }

    /// Serialize into a fresh `ROW_SIZE` array
    pub fn serialize(&self) -> Result<[u8; ROW_SIZE]> {
        let mut buf = [0u8; ROW_SIZE];
        self.serialize_into(&mut buf)?;
        Ok(buf)
    }

    /// Deserialize a row from exactly `ROW_SIZE` bytes.
    ///
    /// Returns `MalformedRow` when the buffer length differs from `ROW_SIZE`
    /// or a text field does not decode as UTF-8.
    pub fn deserialize(mut buf: &[u8]) -> Result<Self> {
        if buf.len() != ROW_SIZE {
            return Err(OrionError::MalformedRow(format!(
                "expected {} bytes, got {}",
                ROW_SIZE,
                buf.len()
            )));
        }
        let id = buf.get_u32_le();
        let username = text_field(&buf[..USERNAME_SIZE], "username")?;
        buf.advance(USERNAME_SIZE);
        let email = text_field(&buf[..EMAIL_SIZE], "email")?;
        Ok(Self {
            id,
            username,
            email,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.id, self.username, self.email)
    }
}

/// Decode a zero-padded text field
fn text_field(bytes: &[u8], field: &'static str) -> Result<String> {
    let end = bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .map(|s| s.to_string())
        .map_err(|e| OrionError::MalformedRow(format!("{} is not valid UTF-8: {}", field, e)))
}
