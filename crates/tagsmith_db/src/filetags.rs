//! File-tag association rows.

use crate::error::{Result, StoreError};
use crate::types::{FileId, FileTag, TagId, ValueId, NO_VALUE_ID};
use crate::Store;
use rusqlite::params;
use std::collections::BTreeSet;

impl Store {
    /// Upserts a file-tag row; a duplicate triple is a silent no-op.
    pub fn add_file_tag(
        &self,
        file_id: FileId,
        tag_id: TagId,
        value_id: ValueId,
    ) -> Result<FileTag> {
        self.conn().execute(
            "INSERT OR IGNORE INTO file_tag (file_id, tag_id, value_id)
             VALUES (?1, ?2, ?3)",
            params![file_id, tag_id, value_id],
        )?;

        Ok(FileTag { file_id, tag_id, value_id })
    }

    /// Removes a file-tag row; fails with `NotFound` when the triple
    /// is not present.
    pub fn delete_file_tag(
        &self,
        file_id: FileId,
        tag_id: TagId,
        value_id: ValueId,
    ) -> Result<()> {
        let affected = self.conn().execute(
            "DELETE FROM file_tag
             WHERE file_id = ?1 AND tag_id = ?2 AND value_id = ?3",
            params![file_id, tag_id, value_id],
        )?;
        if affected == 0 {
            return Err(StoreError::not_found(
                "file-tag",
                format!("{}:{}:{}", file_id, tag_id, value_id),
            ));
        }
        Ok(())
    }

    /// The file's tag rows. When `include_implied` is set, the result
    /// additionally contains a synthetic valueless row for every tag
    /// reachable through the implication closure.
    pub fn file_tags_by_file_id(
        &self,
        file_id: FileId,
        include_implied: bool,
    ) -> Result<Vec<FileTag>> {
        let mut stmt = self.conn().prepare(
            "SELECT file_id, tag_id, value_id
             FROM file_tag
             WHERE file_id = ?1
             ORDER BY tag_id, value_id",
        )?;
        let mut file_tags = stmt
            .query_map([file_id], |row| {
                Ok(FileTag {
                    file_id: row.get(0)?,
                    tag_id: row.get(1)?,
                    value_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if include_implied {
            let explicit_tags: Vec<TagId> =
                file_tags.iter().map(|ft| ft.tag_id).collect();
            let valueless: BTreeSet<TagId> = file_tags
                .iter()
                .filter(|ft| ft.value_id == NO_VALUE_ID)
                .map(|ft| ft.tag_id)
                .collect();

            for tag_id in self.implied_tags(&explicit_tags)? {
                if !valueless.contains(&tag_id) {
                    file_tags.push(FileTag {
                        file_id,
                        tag_id,
                        value_id: NO_VALUE_ID,
                    });
                }
            }
        }

        Ok(file_tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_store;

    #[test]
    fn duplicate_triple_is_a_noop() {
        let (_dir, store) = temp_store();
        let tag = store.add_tag("t").unwrap();

        store.add_file_tag(1, tag.id, 0).unwrap();
        store.add_file_tag(1, tag.id, 0).unwrap();

        assert_eq!(store.file_tags_by_file_id(1, false).unwrap().len(), 1);
    }

    #[test]
    fn same_tag_multiple_values() {
        let (_dir, store) = temp_store();
        let tag = store.add_tag("year").unwrap();
        let v1 = store.add_value("2014").unwrap();
        let v2 = store.add_value("2015").unwrap();

        store.add_file_tag(1, tag.id, v1.id).unwrap();
        store.add_file_tag(1, tag.id, v2.id).unwrap();

        assert_eq!(store.file_tags_by_file_id(1, false).unwrap().len(), 2);
    }

    #[test]
    fn delete_missing_triple_is_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.delete_file_tag(1, 2, 3),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn implied_rows_are_synthesised() {
        let (_dir, store) = temp_store();
        let beach = store.add_tag("beach").unwrap();
        let coast = store.add_tag("coast").unwrap();
        let sea = store.add_tag("sea").unwrap();
        store.add_implication(beach.id, coast.id).unwrap();
        store.add_implication(coast.id, sea.id).unwrap();

        store.add_file_tag(1, beach.id, 0).unwrap();

        let explicit = store.file_tags_by_file_id(1, false).unwrap();
        assert_eq!(explicit.len(), 1);

        let with_implied = store.file_tags_by_file_id(1, true).unwrap();
        let tags: Vec<TagId> = with_implied.iter().map(|ft| ft.tag_id).collect();
        assert_eq!(with_implied.len(), 3);
        assert!(tags.contains(&coast.id) && tags.contains(&sea.id));
    }

    #[test]
    fn implied_row_not_duplicated_when_explicit() {
        let (_dir, store) = temp_store();
        let beach = store.add_tag("beach").unwrap();
        let coast = store.add_tag("coast").unwrap();
        store.add_implication(beach.id, coast.id).unwrap();

        store.add_file_tag(1, beach.id, 0).unwrap();
        store.add_file_tag(1, coast.id, 0).unwrap();

        assert_eq!(store.file_tags_by_file_id(1, true).unwrap().len(), 2);
    }
}
