//! Literal-output tests for the files command.
//!
//! Fixtures mirror a small tagged collection: three files added by
//! path in the order /tmp/d, /tmp/b/a, /tmp/b (the last a directory),
//! plus a valued `size` tag on a second collection. Each command's
//! stdout is checked byte for byte.

mod harness;

use harness::{add_file, files_stdout, files_stdout_with, test_store};
use tagsmith::cli::files::{FilesArgs, Sort};
use tagsmith_db::Store;
use tempfile::TempDir;

/// d -> d, b -> b, b/a -> b (and optionally b/a -> c).
fn boolean_fixture(with_c: bool) -> (TempDir, Store) {
    let (dir, store) = test_store();

    let file_d = add_file(&store, "/tmp/d", false);
    let file_ba = add_file(&store, "/tmp/b/a", false);
    let file_b = add_file(&store, "/tmp/b", true);

    let tag_d = store.add_tag("d").unwrap();
    let tag_b = store.add_tag("b").unwrap();

    store.add_file_tag(file_d.id, tag_d.id, 0).unwrap();
    store.add_file_tag(file_b.id, tag_b.id, 0).unwrap();
    store.add_file_tag(file_ba.id, tag_b.id, 0).unwrap();

    if with_c {
        let tag_c = store.add_tag("c").unwrap();
        store.add_file_tag(file_ba.id, tag_c.id, 0).unwrap();
    }

    (dir, store)
}

/// a -> size=99, b -> size=100.
fn size_fixture() -> (TempDir, Store) {
    let (dir, store) = test_store();

    let file_a = add_file(&store, "/tmp/a", false);
    let file_b = add_file(&store, "/tmp/b", false);

    let size = store.add_tag("size").unwrap();
    let v99 = store.add_value("99").unwrap();
    let v100 = store.add_value("100").unwrap();

    store.add_file_tag(file_a.id, size.id, v99.id).unwrap();
    store.add_file_tag(file_b.id, size.id, v100.id).unwrap();

    (dir, store)
}

#[test]
fn no_query_lists_all_files_path_ordered() {
    let (_dir, store) = boolean_fixture(false);
    assert_eq!(files_stdout(&store, &[]), "/tmp/b\n/tmp/b/a\n/tmp/d\n");
}

#[test]
fn single_tag() {
    let (_dir, store) = boolean_fixture(false);
    assert_eq!(files_stdout(&store, &["b"]), "/tmp/b\n/tmp/b/a\n");
}

#[test]
fn not_single_tag() {
    let (_dir, store) = boolean_fixture(false);
    assert_eq!(files_stdout(&store, &["not", "b"]), "/tmp/d\n");
}

#[test]
fn implicit_and() {
    let (_dir, store) = boolean_fixture(true);
    assert_eq!(files_stdout(&store, &["b", "c"]), "/tmp/b/a\n");
}

#[test]
fn explicit_and() {
    let (_dir, store) = boolean_fixture(true);
    assert_eq!(files_stdout(&store, &["b", "and", "c"]), "/tmp/b/a\n");
}

#[test]
fn and_not() {
    let (_dir, store) = boolean_fixture(true);
    assert_eq!(files_stdout(&store, &["b", "not", "c"]), "/tmp/b\n");
    assert_eq!(files_stdout(&store, &["b", "and", "not", "c"]), "/tmp/b\n");
}

#[test]
fn or_operator() {
    let (_dir, store) = boolean_fixture(true);
    assert_eq!(files_stdout(&store, &["b", "or", "c"]), "/tmp/b\n/tmp/b/a\n");
}

#[test]
fn equals_value() {
    let (_dir, store) = size_fixture();
    assert_eq!(files_stdout(&store, &["size", "=", "100"]), "/tmp/b\n");
}

#[test]
fn not_equals_value() {
    let (_dir, store) = size_fixture();
    assert_eq!(files_stdout(&store, &["not size = 100"]), "/tmp/a\n");
}

#[test]
fn less_than_value() {
    let (_dir, store) = size_fixture();
    assert_eq!(files_stdout(&store, &["size < 100"]), "/tmp/a\n");
}

#[test]
fn greater_or_equal_value() {
    let (_dir, store) = size_fixture();
    assert_eq!(files_stdout(&store, &["size >= 99"]), "/tmp/a\n/tmp/b\n");
}

#[test]
fn comparison_tokenisations_are_equivalent() {
    let (_dir, store) = size_fixture();

    let expected = "/tmp/b\n";
    assert_eq!(files_stdout(&store, &["size", "=", "100"]), expected);
    assert_eq!(files_stdout(&store, &["size = 100"]), expected);
    assert_eq!(files_stdout(&store, &["size=100"]), expected);
    assert_eq!(files_stdout(&store, &["size", "eq", "100"]), expected);

    let expected = "/tmp/a\n";
    assert_eq!(files_stdout(&store, &["size", "<", "100"]), expected);
    assert_eq!(files_stdout(&store, &["size < 100"]), expected);
    assert_eq!(files_stdout(&store, &["size", "lt", "100"]), expected);
}

#[test]
fn identical_queries_give_identical_output() {
    let (_dir, store) = boolean_fixture(true);

    let first = files_stdout(&store, &["b", "or", "c"]);
    let second = files_stdout(&store, &["b", "or", "c"]);
    assert_eq!(first, second);
}

#[test]
fn count_option() {
    let (_dir, store) = boolean_fixture(false);
    let output = files_stdout_with(
        &store,
        FilesArgs {
            query: vec!["b".to_string()],
            count: true,
            ..FilesArgs::default()
        },
    );
    assert_eq!(output, "2\n");
}

#[test]
fn print0_option() {
    let (_dir, store) = boolean_fixture(false);
    let output = files_stdout_with(
        &store,
        FilesArgs {
            query: vec!["b".to_string()],
            print0: true,
            ..FilesArgs::default()
        },
    );
    assert_eq!(output, "/tmp/b\0/tmp/b/a\0");
}

#[test]
fn directory_and_file_filters() {
    let (_dir, store) = boolean_fixture(false);

    let dirs = files_stdout_with(
        &store,
        FilesArgs { directory: true, ..FilesArgs::default() },
    );
    assert_eq!(dirs, "/tmp/b\n");

    let files = files_stdout_with(
        &store,
        FilesArgs { file: true, ..FilesArgs::default() },
    );
    assert_eq!(files, "/tmp/b/a\n/tmp/d\n");
}

#[test]
fn top_option_hides_covered_children() {
    let (_dir, store) = boolean_fixture(false);
    let output = files_stdout_with(
        &store,
        FilesArgs { top: true, ..FilesArgs::default() },
    );
    assert_eq!(output, "/tmp/b\n/tmp/d\n");
}

#[test]
fn sort_by_size_and_insertion_order() {
    let (_dir, store) = test_store();
    let big = store
        .add_file(std::path::Path::new("/tmp/big"), "x", chrono::Utc::now(), 500, false)
        .unwrap();
    let small = store
        .add_file(std::path::Path::new("/tmp/a-small"), "y", chrono::Utc::now(), 5, false)
        .unwrap();
    let tag = store.add_tag("t").unwrap();
    store.add_file_tag(big.id, tag.id, 0).unwrap();
    store.add_file_tag(small.id, tag.id, 0).unwrap();

    let by_size = files_stdout_with(
        &store,
        FilesArgs { sort: Sort::Size, ..FilesArgs::default() },
    );
    assert_eq!(by_size, "/tmp/a-small\n/tmp/big\n");

    let insertion = files_stdout_with(
        &store,
        FilesArgs { sort: Sort::None, ..FilesArgs::default() },
    );
    assert_eq!(insertion, "/tmp/big\n/tmp/a-small\n");
}

#[test]
fn unknown_tag_matches_nothing_without_error() {
    let (_dir, store) = boolean_fixture(false);

    assert_eq!(files_stdout(&store, &["mystery"]), "");
    assert_eq!(
        files_stdout(&store, &["b", "or", "mystery"]),
        "/tmp/b\n/tmp/b/a\n"
    );
}

#[test]
fn malformed_query_is_a_parse_error() {
    let (_dir, store) = boolean_fixture(false);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = tagsmith::cli::files::run(
        &store,
        FilesArgs {
            query: vec!["and".to_string()],
            ..FilesArgs::default()
        },
        &mut out,
        &mut err,
    );

    let error = result.unwrap_err();
    assert_eq!(error.exit_code(), 2);
}
