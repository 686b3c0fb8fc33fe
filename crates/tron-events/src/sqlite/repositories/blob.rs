//! Blob repository — content-addressable storage with SHA-256 dedup.
//!
//! Blobs store large content (tool outputs, file contents) separately from events.
//! Content is hashed with SHA-256 for deduplication — storing the same content twice
//! increments the reference count instead of creating a duplicate row.

use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::Result;
use crate::sqlite::row_types::BlobRow;

/// Blob repository — stateless, every method takes `&Connection`.
pub struct BlobRepo;

/// Storage size summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSizeInfo {
    /// Total original (uncompressed) bytes.
    pub original: i64,
    /// Total compressed bytes.
    pub compressed: i64,
}

impl BlobRepo {
    /// Store content, deduplicating by SHA-256 hash.
    ///
    /// If identical content already exists, increments the reference count
    /// and returns the existing blob ID. Otherwise creates a new blob.
    pub fn store(conn: &Connection, content: &[u8], mime_type: &str) -> Result<String> {
        let hash = hex_sha256(content);

        // Check for existing blob with same hash
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM blobs WHERE hash = ?1",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            let _ = conn.execute(
                "UPDATE blobs SET ref_count = ref_count + 1 WHERE id = ?1",
                params![id],
            )?;
            return Ok(id);
        }

        let id = format!("blob_{}", Uuid::now_v7());
        let now = chrono::Utc::now().to_rfc3339();
        let size = i64::try_from(content.len()).unwrap_or(i64::MAX);

        let _ = conn.execute(
            "INSERT INTO blobs (id, hash, content, mime_type, size_original, size_compressed, compression, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'none', ?7)",
            params![id, hash, content, mime_type, size, size, now],
        )?;

        Ok(id)
    }

    /// Get blob content by ID.
    pub fn get_content(conn: &Connection, blob_id: &str) -> Result<Option<Vec<u8>>> {
        let content: Option<Vec<u8>> = conn
            .query_row(
                "SELECT content FROM blobs WHERE id = ?1",
                params![blob_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    /// Get full blob record by ID.
    pub fn get_by_id(conn: &Connection, blob_id: &str) -> Result<Option<BlobRow>> {
        let row = conn
            .query_row(
                "SELECT id, hash, content, mime_type, size_original, size_compressed, compression, created_at, ref_count
                 FROM blobs WHERE id = ?1",
                params![blob_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get blob by SHA-256 hash.
    pub fn get_by_hash(conn: &Connection, hash: &str) -> Result<Option<BlobRow>> {
        let row = conn
            .query_row(
                "SELECT id, hash, content, mime_type, size_original, size_compressed, compression, created_at, ref_count
                 FROM blobs WHERE hash = ?1",
                params![hash],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get reference count for a blob.
    pub fn get_ref_count(conn: &Connection, blob_id: &str) -> Result<Option<i64>> {
        let count: Option<i64> = conn
            .query_row(
                "SELECT ref_count FROM blobs WHERE id = ?1",
                params![blob_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count)
    }

    /// Increment reference count.
    pub fn increment_ref_count(conn: &Connection, blob_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE blobs SET ref_count = ref_count + 1 WHERE id = ?1",
            params![blob_id],
        )?;
        Ok(changed > 0)
    }

    /// Decrement reference count (floor at 0). Returns new count if blob exists.
    pub fn decrement_ref_count(conn: &Connection, blob_id: &str) -> Result<Option<i64>> {
        let _ = conn.execute(
            "UPDATE blobs SET ref_count = ref_count - 1 WHERE id = ?1 AND ref_count > 0",
            params![blob_id],
        )?;
        Self::get_ref_count(conn, blob_id)
    }

    /// Delete all blobs with zero references. Returns count deleted.
    pub fn delete_unreferenced(conn: &Connection) -> Result<usize> {
        let changed = conn.execute("DELETE FROM blobs WHERE ref_count <= 0", [])?;
        Ok(changed)
    }

    /// Count total blobs.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get total storage usage.
    pub fn get_total_size(conn: &Connection) -> Result<BlobSizeInfo> {
        let (original, compressed) = conn.query_row(
            "SELECT COALESCE(SUM(size_original), 0), COALESCE(SUM(size_compressed), 0) FROM blobs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(BlobSizeInfo {
            original,
            compressed,
        })
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BlobRow> {
        Ok(BlobRow {
            id: row.get(0)?,
            hash: row.get(1)?,
            content: row.get(2)?,
            mime_type: row.get(3)?,
            size_original: row.get(4)?,
            size_compressed: row.get(5)?,
            compression: row.get(6)?,
            created_at: row.get(7)?,
            ref_count: row.get(8)?,
        })
    }
}

fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
