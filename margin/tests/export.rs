//! Exporting annotations across several documents.

use margin::{
    sink::FileSink, Config, DeliverySink, DocumentKey, ExistenceCheck, Session,
    DELETED_FILE_MARKER,
};
use tempfile::tempdir;

#[test]
fn deleted_document_is_marked_and_counted() {
    let tmp_dir = tempdir().unwrap();
    let kept = tmp_dir.path().join("kept.txt");
    let removed = tmp_dir.path().join("removed.txt");
    std::fs::write(&kept, "keep me\n").unwrap();
    std::fs::write(&removed, "delete me\n").unwrap();

    let base = std::fs::canonicalize(tmp_dir.path()).ok();
    let mut session = Session::with_buffers(Config::default()).with_base(base);
    session.open(&kept).unwrap();
    session.open(&removed).unwrap();
    session.add(&kept, 1, "note", "fine").unwrap();
    session.add(&removed, 1, "issue", "why is this here").unwrap();

    std::fs::remove_file(&removed).unwrap();

    let report_path = tmp_dir.path().join("report.md");
    let mut sinks: Vec<Box<dyn DeliverySink>> = vec![Box::new(FileSink::new(report_path.clone()))];
    let outcome = session.export(&mut sinks).unwrap();

    assert_eq!(outcome.entries, 2);
    assert_eq!(outcome.deleted, 1);
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("1. [NOTE] kept.txt:1\n"));
    assert!(report.contains(&format!("2. [ISSUE] {DELETED_FILE_MARKER} removed.txt:1\n")));
    assert!(report.contains("   Context: delete me\n"));
}

#[test]
fn export_order_is_independent_of_insertion_order() {
    struct AlwaysThere;

    impl ExistenceCheck for AlwaysThere {
        fn exists(&self, _document: &DocumentKey) -> bool {
            true
        }
    }

    let tmp_dir = tempdir().unwrap();
    let names = ["zeta.txt", "alpha.txt", "mid.txt"];
    for name in names {
        std::fs::write(tmp_dir.path().join(name), "1\n2\n3\n4\n").unwrap();
    }

    let run = |order: &[(&str, u32)]| {
        let mut session = Session::with_buffers(Config::default())
            .with_existence_check(AlwaysThere)
            .with_base(std::fs::canonicalize(tmp_dir.path()).ok());
        for name in names {
            session.open(tmp_dir.path().join(name)).unwrap();
        }
        for (name, line) in order {
            session
                .add(tmp_dir.path().join(name), *line, "note", "n")
                .unwrap();
        }
        session
            .entries()
            .into_iter()
            .map(|entry| (entry.document.short_path(session.base()), entry.line))
            .collect::<Vec<_>>()
    };

    let forward = run(&[("zeta.txt", 2), ("alpha.txt", 4), ("mid.txt", 1), ("alpha.txt", 1)]);
    let backward = run(&[("alpha.txt", 1), ("mid.txt", 1), ("alpha.txt", 4), ("zeta.txt", 2)]);
    assert_eq!(forward, backward);
    assert_eq!(
        forward,
        vec![
            ("alpha.txt".to_string(), 1),
            ("alpha.txt".to_string(), 4),
            ("mid.txt".to_string(), 1),
            ("zeta.txt".to_string(), 2),
        ]
    );
}
