//! Tag implication rows.

use crate::error::{Result, StoreError};
use crate::types::{Implication, Tag, TagId};
use crate::Store;
use rusqlite::params;

impl Store {
    /// Records that files tagged `tag_id` are implicitly also tagged
    /// `implied_tag_id`. Reflexive pairs are forbidden; re-adding an
    /// existing pair is a no-op.
    pub fn add_implication(&self, tag_id: TagId, implied_tag_id: TagId) -> Result<()> {
        if tag_id == implied_tag_id {
            return Err(StoreError::InvalidOperation(
                "a tag cannot imply itself".to_string(),
            ));
        }

        self.conn().execute(
            "INSERT OR IGNORE INTO implication (tag_id, implied_tag_id)
             VALUES (?1, ?2)",
            params![tag_id, implied_tag_id],
        )?;

        Ok(())
    }

    /// Removes an implication pair; fails with `NotFound` when absent.
    pub fn delete_implication(&self, tag_id: TagId, implied_tag_id: TagId) -> Result<()> {
        let affected = self.conn().execute(
            "DELETE FROM implication WHERE tag_id = ?1 AND implied_tag_id = ?2",
            params![tag_id, implied_tag_id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found(
                "implication",
                format!("{} -> {}", tag_id, implied_tag_id),
            ));
        }
        Ok(())
    }

    /// Direct implications whose antecedent is in `tag_ids`; one hop
    /// only, callers iterate to a fixpoint via the closure methods.
    pub fn implications_for_tags(&self, tag_ids: &[TagId]) -> Result<Vec<Implication>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; tag_ids.len()].join(",");
        let mut stmt = self.conn().prepare(&format!(
            "SELECT tag_id, implied_tag_id
             FROM implication
             WHERE tag_id IN ({placeholders})
             ORDER BY tag_id, implied_tag_id"
        ))?;
        let implications = stmt
            .query_map(rusqlite::params_from_iter(tag_ids.iter()), |row| {
                Ok(Implication {
                    tag_id: row.get(0)?,
                    implied_tag_id: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(implications)
    }

    /// The whole implication table as named tag pairs, ordered by tag
    /// name then implied name.
    pub fn implication_pairs(&self) -> Result<Vec<(Tag, Tag)>> {
        let mut stmt = self.conn().prepare(
            "SELECT t1.id, t1.name, t2.id, t2.name
             FROM implication
             JOIN tag t1 ON t1.id = implication.tag_id
             JOIN tag t2 ON t2.id = implication.implied_tag_id
             ORDER BY t1.name, t2.name",
        )?;
        let pairs = stmt
            .query_map([], |row| {
                Ok((
                    Tag { id: row.get(0)?, name: row.get(1)? },
                    Tag { id: row.get(2)?, name: row.get(3)? },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pairs)
    }
}
