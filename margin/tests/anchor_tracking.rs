//! Annotations following their lines through document edits.
//!
//! Each test opens real files from a temporary directory, edits them through
//! the buffer host (or on disk, followed by a reload) and checks where the
//! annotations end up after reconciliation.

use margin::{AnnotationKind, Config, DeletePolicy, DocumentKey, Error, Session};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn numbered_lines(count: u32) -> String {
    (1..=count).map(|line| format!("line {line}\n")).collect()
}

fn setup(count: u32, policy: DeletePolicy) -> (TempDir, PathBuf, Session, DocumentKey) {
    let tmp_dir = tempdir().unwrap();
    let path = tmp_dir.path().join("a.txt");
    std::fs::write(&path, numbered_lines(count)).unwrap();

    let config = Config {
        anchor_on_delete: policy,
        ..Config::default()
    };
    let mut session = Session::with_buffers(config);
    let key = session.open(&path).unwrap();
    (tmp_dir, path, session, key)
}

fn lines_of(session: &mut Session, path: &Path) -> Vec<u32> {
    session
        .annotations(path)
        .unwrap()
        .into_iter()
        .map(|(line, _)| line)
        .collect()
}

#[test]
fn round_trip_without_edits() {
    let (_tmp, path, mut session, _key) = setup(12, DeletePolicy::Invalidate);

    session.add(&path, 7, "praise", "nice and small").unwrap();

    let annotation = session.get(&path, 7).unwrap().unwrap();
    assert_eq!(annotation.kind, AnnotationKind::Praise);
    assert_eq!(annotation.text, "nice and small");
    assert_eq!(annotation.original_context(), "line 7");
}

#[test]
fn insert_above_shifts_annotation_down() {
    let (_tmp, path, mut session, key) = setup(15, DeletePolicy::Invalidate);
    session.add(&path, 10, "note", "watch this").unwrap();

    session
        .host_mut()
        .insert_lines(&key, 2, vec!["x".into(), "y".into(), "z".into()])
        .unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![13]);
    assert_eq!(session.get(&path, 13).unwrap().unwrap().text, "watch this");
}

#[test]
fn insert_below_leaves_annotation_alone() {
    let (_tmp, path, mut session, key) = setup(15, DeletePolicy::Invalidate);
    session.add(&path, 10, "note", "watch this").unwrap();

    session
        .host_mut()
        .insert_lines(&key, 11, vec!["after".into()])
        .unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![10]);
}

#[test]
fn deleting_the_end_of_the_document_removes_annotation() {
    for policy in [DeletePolicy::Invalidate, DeletePolicy::Collapse] {
        let (_tmp, path, mut session, key) = setup(20, policy);
        session.add(&path, 20, "issue", "last line").unwrap();
        session.add(&path, 3, "issue", "survivor").unwrap();

        session.host_mut().delete_lines(&key, 16, 5).unwrap();

        assert_eq!(lines_of(&mut session, &path), vec![3], "{policy:?}");
        assert_eq!(session.store().len(), 1);
    }
}

#[test]
fn collapsed_anchors_collide_and_spread_forward() {
    let (_tmp, path, mut session, key) = setup(20, DeletePolicy::Collapse);
    session.add(&path, 5, "note", "first").unwrap();
    session.add(&path, 6, "note", "second").unwrap();

    // Deleting line 5 pulls both anchors onto line 5.
    session.host_mut().delete_lines(&key, 5, 1).unwrap();

    let placed: Vec<(u32, String)> = session
        .annotations(&path)
        .unwrap()
        .into_iter()
        .map(|(line, annotation)| (line, annotation.text.clone()))
        .collect();
    assert_eq!(placed, vec![(5, "first".into()), (6, "second".into())]);
}

#[test]
fn collision_skips_occupied_line() {
    let (_tmp, path, mut session, key) = setup(20, DeletePolicy::Collapse);
    session.add(&path, 5, "note", "five").unwrap();
    session.add(&path, 6, "note", "six").unwrap();
    session.add(&path, 7, "note", "seven").unwrap();

    // Line 6 goes away: "six" collapses onto 6, "seven" moves up onto 6 too.
    session.host_mut().delete_lines(&key, 6, 1).unwrap();

    let placed: Vec<(u32, String)> = session
        .annotations(&path)
        .unwrap()
        .into_iter()
        .map(|(line, annotation)| (line, annotation.text.clone()))
        .collect();
    assert_eq!(
        placed,
        vec![(5, "five".into()), (6, "six".into()), (7, "seven".into())]
    );
}

#[test]
fn deleted_line_invalidates_annotation() {
    let (_tmp, path, mut session, key) = setup(10, DeletePolicy::Invalidate);
    session.add(&path, 4, "issue", "gone soon").unwrap();
    session.add(&path, 8, "issue", "stays").unwrap();

    session.host_mut().delete_lines(&key, 3, 2).unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![6]);
    assert!(session.delete(&path, 4).unwrap_err().is_informational());
}

#[test]
fn moved_lines_carry_their_annotations() {
    let (_tmp, path, mut session, key) = setup(10, DeletePolicy::Invalidate);
    session.add(&path, 2, "note", "moves").unwrap();
    session.add(&path, 9, "note", "stays").unwrap();

    // Lines 1..=3 moved below line 6.
    session.host_mut().move_lines(&key, 1, 3, 7).unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![5, 9]);
    let moved = session.get(&path, 5).unwrap().unwrap();
    assert_eq!(moved.text, "moves");
    assert_eq!(moved.original_context(), "line 2");
}

#[test]
fn external_edit_picked_up_on_reload() {
    let (_tmp, path, mut session, _key) = setup(10, DeletePolicy::Invalidate);
    session.add(&path, 6, "suggestion", "extract fn").unwrap();

    let mut edited = String::from("header 1\nheader 2\n");
    edited.push_str(&numbered_lines(10));
    std::fs::write(&path, edited).unwrap();
    session.open(&path).unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![8]);
}

#[test]
fn navigation_after_edits() {
    let (_tmp, path, mut session, key) = setup(30, DeletePolicy::Invalidate);
    session.add(&path, 5, "note", "a").unwrap();
    session.add(&path, 20, "note", "b").unwrap();

    session
        .host_mut()
        .insert_lines(&key, 1, vec!["new".into(); 4])
        .unwrap();

    assert_eq!(session.next(&path, 1).unwrap().line, 9);
    assert_eq!(session.next(&path, 9).unwrap().line, 24);
    let wrapped = session.next(&path, 24).unwrap();
    assert_eq!(wrapped.line, 9);
    assert!(wrapped.wrapped);
    assert_eq!(session.prev(&path, 9).unwrap().line, 24);
}

#[test]
fn annotation_added_before_open_follows_later_edits() {
    let tmp_dir = tempdir().unwrap();
    let path = tmp_dir.path().join("a.txt");
    std::fs::write(&path, numbered_lines(10)).unwrap();
    let mut session = Session::with_buffers(Config::default());

    session.add(&path, 4, "note", "before open").unwrap();
    let key = session.open(&path).unwrap();
    session
        .host_mut()
        .insert_lines(&key, 1, vec!["x".into(), "y".into()])
        .unwrap();

    assert_eq!(lines_of(&mut session, &path), vec![6]);
}

#[test]
fn add_past_the_last_line_is_rejected() {
    let (_tmp, path, mut session, _key) = setup(5, DeletePolicy::Invalidate);

    let err = session.add(&path, 10, "note", "nowhere").unwrap_err();
    assert!(matches!(err, Error::LineOutOfRange { line: 10, .. }));
    assert!(session.store().is_empty());
}
