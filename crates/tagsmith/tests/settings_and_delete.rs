//! Tests for the config and delete commands.

mod harness;

use harness::{files_stdout, test_store};
use std::fs;
use tagsmith::cli::config::{self, ConfigArgs};
use tagsmith::cli::delete::{self, DeleteArgs};
use tagsmith::cli::tag::{self, TagArgs};
use tagsmith_db::Store;

fn run_config(store: &Store, assignments: &[&str]) -> (tagsmith::cli::CommandResult, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = config::run(
        store,
        ConfigArgs {
            assignments: assignments.iter().map(|s| s.to_string()).collect(),
        },
        &mut out,
        &mut err,
    );
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn config_lists_defaults() {
    let (_dir, store) = test_store();

    let (result, listing) = run_config(&store, &[]);
    result.unwrap();

    assert_eq!(
        listing,
        "fingerprintAlgorithm=dynamic:SHA256\n\
         autoCreateTags=yes\n\
         autoCreateValues=yes\n\
         reportDuplicates=yes\n"
    );
}

#[test]
fn config_set_round_trips() {
    let (_dir, store) = test_store();

    run_config(&store, &["autoCreateTags=no"]).0.unwrap();

    let (_, listing) = run_config(&store, &[]);
    assert!(listing.contains("autoCreateTags=no"));
}

#[test]
fn config_rejects_unknown_names_and_bad_values() {
    let (_dir, store) = test_store();

    assert!(run_config(&store, &["colour=mauve"]).0.is_err());
    assert!(run_config(&store, &["autoCreateTags=perhaps"]).0.is_err());
    assert!(run_config(&store, &["autoCreateTags"]).0.is_err());
}

#[test]
fn delete_removes_the_tag_everywhere() {
    let (dir, store) = test_store();
    let path = dir.path().join("x");
    fs::write(&path, b"data").unwrap();

    let mut out = Vec::new();
    let mut err = Vec::new();
    tag::run(
        &store,
        TagArgs {
            arguments: vec![path.display().to_string(), "doomed".to_string()],
            ..TagArgs::default()
        },
        &mut out,
        &mut err,
    )
    .unwrap();
    assert_eq!(files_stdout(&store, &["doomed"]), format!("{}\n", path.display()));

    let outcome = delete::run(
        &store,
        DeleteArgs { tags: vec!["doomed".to_string()] },
        &mut out,
        &mut err,
    )
    .unwrap();
    assert!(outcome.ok());

    assert!(store.tag_by_name("doomed").unwrap().is_none());
    assert_eq!(files_stdout(&store, &["doomed"]), "");
    // the file carried only that tag, so its row was vacuumed too
    assert!(store.file_by_path(&path).unwrap().is_none());
}

#[test]
fn deleting_an_unknown_tag_warns() {
    let (_dir, store) = test_store();

    let mut out = Vec::new();
    let mut err = Vec::new();
    let outcome = delete::run(
        &store,
        DeleteArgs { tags: vec!["mystery".to_string()] },
        &mut out,
        &mut err,
    )
    .unwrap();

    assert!(!outcome.ok());
    assert!(String::from_utf8(err).unwrap().contains("no such tag 'mystery'"));
}
