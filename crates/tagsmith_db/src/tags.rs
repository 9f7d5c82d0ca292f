//! Tag operations.

use crate::error::{duplicate_on_conflict, Result, StoreError};
use crate::types::{Tag, TagId};
use crate::Store;
use rusqlite::OptionalExtension;

/// Characters a tag name may not contain, besides whitespace. These
/// are the query-language operator symbols plus the path separator.
const RESERVED: &str = "=<>(),/";

/// Tag names are non-empty, printable, free of whitespace and the
/// reserved operator characters, and are not `.` or `..`.
pub fn is_valid_tag_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    name.chars()
        .all(|c| !c.is_whitespace() && !c.is_control() && !RESERVED.contains(c))
}

impl Store {
    /// Creates a tag. Fails with `InvalidTagName` or `Duplicate`.
    pub fn add_tag(&self, name: &str) -> Result<Tag> {
        if !is_valid_tag_name(name) {
            return Err(StoreError::InvalidTagName(name.to_string()));
        }

        self.conn()
            .execute("INSERT INTO tag (name) VALUES (?1)", [name])
            .map_err(|err| duplicate_on_conflict(err, "tag", name))?;

        Ok(Tag {
            id: self.conn().last_insert_rowid(),
            name: name.to_string(),
        })
    }

    pub fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .conn()
            .query_row(
                "SELECT id, name FROM tag WHERE name = ?1",
                [name],
                |row| {
                    Ok(Tag { id: row.get(0)?, name: row.get(1)? })
                },
            )
            .optional()?;
        Ok(tag)
    }

    pub fn tag_by_id(&self, id: TagId) -> Result<Option<Tag>> {
        let tag = self
            .conn()
            .query_row("SELECT id, name FROM tag WHERE id = ?1", [id], |row| {
                Ok(Tag { id: row.get(0)?, name: row.get(1)? })
            })
            .optional()?;
        Ok(tag)
    }

    /// All tags, ordered by name.
    pub fn tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, name FROM tag ORDER BY name")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag { id: row.get(0)?, name: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    /// Deletes a tag along with its file-tag rows and implications.
    pub fn delete_tag(&self, id: TagId) -> Result<()> {
        let affected = self.conn().execute("DELETE FROM tag WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(StoreError::not_found("tag", id.to_string()));
        }

        self.conn()
            .execute("DELETE FROM file_tag WHERE tag_id = ?1", [id])?;
        self.conn().execute(
            "DELETE FROM implication WHERE tag_id = ?1 OR implied_tag_id = ?1",
            [id],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_store;

    #[test]
    fn valid_names() {
        assert!(is_valid_tag_name("holiday"));
        assert!(is_valid_tag_name("2015"));
        assert!(is_valid_tag_name("mountain-view"));
        assert!(is_valid_tag_name("süß"));
        assert!(is_valid_tag_name("c++"));
    }

    #[test]
    fn invalid_names() {
        for name in ["", ".", "..", "a b", "a=b", "a<b", "a>b", "(a)", "a,b", "a/b", "a\tb"] {
            assert!(!is_valid_tag_name(name), "{:?} should be invalid", name);
        }
    }

    #[test]
    fn add_and_fetch() {
        let (_dir, store) = temp_store();

        let tag = store.add_tag("beach").unwrap();
        assert_eq!(store.tag_by_name("beach").unwrap().unwrap(), tag);
        assert_eq!(store.tag_by_id(tag.id).unwrap().unwrap(), tag);
        assert!(store.tag_by_name("mountain").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (_dir, store) = temp_store();

        store.add_tag("beach").unwrap();
        assert!(matches!(
            store.add_tag("beach"),
            Err(StoreError::Duplicate { entity: "tag", .. })
        ));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.add_tag("a b"),
            Err(StoreError::InvalidTagName(_))
        ));
    }

    #[test]
    fn tags_are_ordered_by_name() {
        let (_dir, store) = temp_store();
        store.add_tag("zebra").unwrap();
        store.add_tag("aardvark").unwrap();

        let names: Vec<_> = store.tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["aardvark", "zebra"]);
    }

    #[test]
    fn delete_cascades_to_file_tags_and_implications() {
        let (_dir, store) = temp_store();
        let beach = store.add_tag("beach").unwrap();
        let coast = store.add_tag("coast").unwrap();
        store.add_implication(beach.id, coast.id).unwrap();
        store.add_file_tag(1, beach.id, 0).unwrap();

        store.delete_tag(beach.id).unwrap();

        assert!(store.tag_by_id(beach.id).unwrap().is_none());
        assert!(store.file_tags_by_file_id(1, false).unwrap().is_empty());
        assert!(store.implications_for_tags(&[beach.id]).unwrap().is_empty());
    }
}
