//! Query compilation.
//!
//! Lowers a parsed query expression to a distinct set of file ids by
//! materialising an id set per AST node: tag terms select through the
//! file_tag table, `and`/`or`/`not` become set intersection, union and
//! complement against the universe of all file ids. Tag terms are
//! expanded through the implication closure; comparison terms are not,
//! since implied tags carry no value.
//!
//! Unknown tag names select the empty set rather than failing, so
//! `tag_a or unknown_tag` still answers.

use crate::error::Result;
use crate::types::{File, FileId, TagId};
use crate::Store;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tagsmith_query::{CompareOp, Expr};

impl Store {
    /// Runs a compiled query and returns the matching files ordered by
    /// path ascending. `None` is the empty query and matches every
    /// file. With `explicit_only`, tag terms are not expanded through
    /// implications.
    pub fn query_files(&self, query: Option<&Expr>, explicit_only: bool) -> Result<Vec<File>> {
        match query {
            None => self.files(),
            Some(expr) => {
                let ids = self.eval(expr, explicit_only)?;
                self.files_by_ids(ids)
            }
        }
    }

    fn eval(&self, expr: &Expr, explicit_only: bool) -> Result<BTreeSet<FileId>> {
        match expr {
            Expr::Tag(name) => {
                let tag = match self.tag_by_name(name)? {
                    Some(tag) => tag,
                    None => return Ok(BTreeSet::new()),
                };
                let tag_ids = if explicit_only {
                    BTreeSet::from([tag.id])
                } else {
                    self.implication_closure(&[tag.id])?
                };
                self.file_ids_bearing(&tag_ids)
            }
            Expr::Comparison { tag, op, value } => {
                let tag = match self.tag_by_name(tag)? {
                    Some(tag) => tag,
                    None => return Ok(BTreeSet::new()),
                };
                self.file_ids_comparing(tag.id, *op, value)
            }
            Expr::Not(inner) => {
                let mut universe = self.all_file_ids()?;
                for id in self.eval(inner, explicit_only)? {
                    universe.remove(&id);
                }
                Ok(universe)
            }
            Expr::And(left, right) => {
                let left = self.eval(left, explicit_only)?;
                let right = self.eval(right, explicit_only)?;
                Ok(left.intersection(&right).copied().collect())
            }
            Expr::Or(left, right) => {
                let mut left = self.eval(left, explicit_only)?;
                left.extend(self.eval(right, explicit_only)?);
                Ok(left)
            }
        }
    }

    fn all_file_ids(&self) -> Result<BTreeSet<FileId>> {
        let mut stmt = self.conn().prepare("SELECT id FROM file")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<FileId>>>()?;
        Ok(ids)
    }

    /// Files bearing any of the given tags, with or without a value.
    fn file_ids_bearing(&self, tag_ids: &BTreeSet<TagId>) -> Result<BTreeSet<FileId>> {
        if tag_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let placeholders = vec!["?"; tag_ids.len()].join(",");
        let mut stmt = self.conn().prepare(&format!(
            "SELECT DISTINCT file_id FROM file_tag WHERE tag_id IN ({placeholders})"
        ))?;
        let ids = stmt
            .query_map(rusqlite::params_from_iter(tag_ids.iter()), |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<FileId>>>()?;
        Ok(ids)
    }

    /// Files bearing the tag with a value satisfying the comparison.
    /// Valueless applications never match, the sentinel has no row to
    /// join against.
    fn file_ids_comparing(
        &self,
        tag_id: TagId,
        op: CompareOp,
        literal: &str,
    ) -> Result<BTreeSet<FileId>> {
        let mut stmt = self.conn().prepare(
            "SELECT ft.file_id, v.name
             FROM file_tag ft
             JOIN value v ON v.id = ft.value_id
             WHERE ft.tag_id = ?1",
        )?;
        let rows = stmt
            .query_map([tag_id], |row| {
                Ok((row.get::<_, FileId>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .filter(|(_, name)| compare_values(op, name, literal))
            .map(|(id, _)| id)
            .collect())
    }
}

/// Evaluates `actual OP literal`. Equality and inequality compare as
/// strings; the ordering operators compare numerically when both sides
/// parse as signed decimal integers and lexicographically otherwise.
pub fn compare_values(op: CompareOp, actual: &str, literal: &str) -> bool {
    match op {
        CompareOp::Equal => actual == literal,
        CompareOp::NotEqual => actual != literal,
        CompareOp::LessThan => ordering(actual, literal) == Ordering::Less,
        CompareOp::GreaterThan => ordering(actual, literal) == Ordering::Greater,
        CompareOp::LessOrEqual => ordering(actual, literal) != Ordering::Greater,
        CompareOp::GreaterOrEqual => ordering(actual, literal) != Ordering::Less,
    }
}

fn ordering(actual: &str, literal: &str) -> Ordering {
    match (actual.parse::<i64>(), literal.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => actual.cmp(literal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::temp_store;
    use chrono::Utc;
    use std::path::Path;
    use tagsmith_query::parse;

    fn run(store: &Store, query: &[&str]) -> Vec<String> {
        let expr = parse(query).unwrap();
        store
            .query_files(expr.as_ref(), false)
            .unwrap()
            .into_iter()
            .map(|f| f.path().display().to_string())
            .collect()
    }

    fn fixture(store: &Store) {
        let d = store
            .add_file(Path::new("/tmp/d"), "abc", Utc::now(), 123, false)
            .unwrap();
        let ba = store
            .add_file(Path::new("/tmp/b/a"), "abc", Utc::now(), 123, false)
            .unwrap();
        let b = store
            .add_file(Path::new("/tmp/b"), "abc", Utc::now(), 123, true)
            .unwrap();

        let tag_d = store.add_tag("d").unwrap();
        let tag_b = store.add_tag("b").unwrap();
        let tag_c = store.add_tag("c").unwrap();

        store.add_file_tag(d.id, tag_d.id, 0).unwrap();
        store.add_file_tag(b.id, tag_b.id, 0).unwrap();
        store.add_file_tag(ba.id, tag_b.id, 0).unwrap();
        store.add_file_tag(ba.id, tag_c.id, 0).unwrap();
    }

    #[test]
    fn empty_query_matches_everything() {
        let (_dir, store) = temp_store();
        fixture(&store);
        assert_eq!(run(&store, &[]), vec!["/tmp/b", "/tmp/b/a", "/tmp/d"]);
    }

    #[test]
    fn boolean_operators() {
        let (_dir, store) = temp_store();
        fixture(&store);

        assert_eq!(run(&store, &["b"]), vec!["/tmp/b", "/tmp/b/a"]);
        assert_eq!(run(&store, &["not", "b"]), vec!["/tmp/d"]);
        assert_eq!(run(&store, &["b", "c"]), vec!["/tmp/b/a"]);
        assert_eq!(run(&store, &["b", "and", "c"]), vec!["/tmp/b/a"]);
        assert_eq!(run(&store, &["b", "not", "c"]), vec!["/tmp/b"]);
        assert_eq!(run(&store, &["b", "or", "c"]), vec!["/tmp/b", "/tmp/b/a"]);
    }

    #[test]
    fn unknown_tag_is_the_empty_set() {
        let (_dir, store) = temp_store();
        fixture(&store);

        assert!(run(&store, &["mystery"]).is_empty());
        assert_eq!(
            run(&store, &["b", "or", "mystery"]),
            vec!["/tmp/b", "/tmp/b/a"]
        );
    }

    #[test]
    fn tag_terms_expand_through_implications() {
        let (_dir, store) = temp_store();
        let file = store
            .add_file(Path::new("/tmp/pic"), "abc", Utc::now(), 1, false)
            .unwrap();
        let beach = store.add_tag("beach").unwrap();
        let coast = store.add_tag("coast").unwrap();
        store.add_implication(beach.id, coast.id).unwrap();
        store.add_file_tag(file.id, beach.id, 0).unwrap();

        // beach implies coast, so a coast query finds the file...
        assert_eq!(run(&store, &["coast"]), vec!["/tmp/pic"]);

        // ...unless implications are disabled
        let expr = parse(&["coast"]).unwrap();
        assert!(store.query_files(expr.as_ref(), true).unwrap().is_empty());
    }

    #[test]
    fn comparisons() {
        let (_dir, store) = temp_store();
        let a = store
            .add_file(Path::new("/tmp/a"), "abc", Utc::now(), 123, false)
            .unwrap();
        let b = store
            .add_file(Path::new("/tmp/b"), "abc", Utc::now(), 123, false)
            .unwrap();
        let size = store.add_tag("size").unwrap();
        let v99 = store.add_value("99").unwrap();
        let v100 = store.add_value("100").unwrap();
        store.add_file_tag(a.id, size.id, v99.id).unwrap();
        store.add_file_tag(b.id, size.id, v100.id).unwrap();

        assert_eq!(run(&store, &["size", "=", "100"]), vec!["/tmp/b"]);
        assert_eq!(run(&store, &["not", "size", "=", "100"]), vec!["/tmp/a"]);
        assert_eq!(run(&store, &["size", "<", "100"]), vec!["/tmp/a"]);
        assert_eq!(run(&store, &["size", ">=", "99"]), vec!["/tmp/a", "/tmp/b"]);
        assert_eq!(run(&store, &["size", "!=", "100"]), vec!["/tmp/a"]);
    }

    #[test]
    fn comparison_does_not_expand_implications() {
        let (_dir, store) = temp_store();
        let file = store
            .add_file(Path::new("/tmp/pic"), "abc", Utc::now(), 1, false)
            .unwrap();
        let rating = store.add_tag("rating").unwrap();
        let stars = store.add_tag("stars").unwrap();
        let five = store.add_value("5").unwrap();
        store.add_implication(rating.id, stars.id).unwrap();
        store.add_file_tag(file.id, rating.id, five.id).unwrap();

        assert_eq!(run(&store, &["rating", "=", "5"]), vec!["/tmp/pic"]);
        assert!(run(&store, &["stars", "=", "5"]).is_empty());
    }

    #[test]
    fn valueless_tags_never_match_comparisons() {
        let (_dir, store) = temp_store();
        let file = store
            .add_file(Path::new("/tmp/x"), "abc", Utc::now(), 1, false)
            .unwrap();
        let size = store.add_tag("size").unwrap();
        store.add_file_tag(file.id, size.id, 0).unwrap();

        assert_eq!(run(&store, &["size"]), vec!["/tmp/x"]);
        assert!(run(&store, &["size", "=", "''"]).is_empty());
    }

    #[test]
    fn numeric_and_lexical_ordering() {
        // both numeric: 9 < 10
        assert!(compare_values(CompareOp::LessThan, "9", "10"));
        // mixed: falls back to lexicographic, "9" > "10"
        assert!(compare_values(CompareOp::GreaterThan, "9", "10x"));
        // negative numbers compare numerically
        assert!(compare_values(CompareOp::LessThan, "-5", "3"));
        assert!(compare_values(CompareOp::LessOrEqual, "100", "100"));
        assert!(compare_values(CompareOp::GreaterOrEqual, "100", "100"));
    }
}
