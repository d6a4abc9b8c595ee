use worknote_core::db::open_db_in_memory;
use worknote_core::service::knowledge_service::QUICK_SAVE_PLACEHOLDER;
use worknote_core::{
    AutoSave, Category, DraftService, DraftServiceError, ExportOptions, KnowledgeField,
    KnowledgeInput, KnowledgeService, Severity, SqliteDraftRepository, SqliteKnowledgeStore,
    SqliteSnapshotSlot, SubmitOutcome,
};

fn complete_input(title: &str) -> KnowledgeInput {
    KnowledgeInput {
        title: Some(title.to_string()),
        category: Some("alerts".to_string()),
        severity: Some("high".to_string()),
        symptoms: Some("disk full".to_string()),
        procedure: Some("restart service".to_string()),
        ..KnowledgeInput::default()
    }
}

fn record_count(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM knowledge_records;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn invalid_submission_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = KnowledgeService::new(
        SqliteKnowledgeStore::try_new(&conn, ExportOptions::default()).unwrap(),
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );
    let drafts = DraftService::new(SqliteDraftRepository::try_new(&conn).unwrap());
    let draft = drafts.create_draft(complete_input("")).unwrap();
    service.autosave().save_snapshot(&complete_input(""));

    let outcome = service.submit(&complete_input(""), Some(draft.id)).unwrap();
    match outcome {
        SubmitOutcome::Rejected(result) => {
            assert!(!result.valid);
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].field, KnowledgeField::Title);
            assert_eq!(result.errors[0].message, "タイトルは必須です");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(record_count(&conn), 0);
    assert!(drafts.load_draft(draft.id).is_ok());
    assert!(service.autosave().load_snapshot().is_some());
}

#[test]
fn successful_submission_clears_draft_and_slot() {
    let conn = open_db_in_memory().unwrap();
    let options = ExportOptions {
        save_path: "docs/runbooks/".to_string(),
        author: Some("Taro".to_string()),
    };
    let service = KnowledgeService::new(
        SqliteKnowledgeStore::try_new(&conn, options).unwrap(),
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );
    let drafts = DraftService::new(SqliteDraftRepository::try_new(&conn).unwrap());
    let draft = drafts.create_draft(complete_input("Disk Full on web-01")).unwrap();
    service
        .autosave()
        .save_snapshot(&complete_input("Disk Full on web-01"));

    let receipt = match service
        .submit(&complete_input("Disk Full on web-01"), Some(draft.id))
        .unwrap()
    {
        SubmitOutcome::Committed(receipt) => receipt,
        other => panic!("unexpected outcome: {other:?}"),
    };

    assert_eq!(receipt.commit_id.len(), 32);
    assert!(receipt.commit_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(receipt.location, "docs/runbooks/alerts/disk-full-on-web-01.md");
    assert_eq!(receipt.pr_url, None);

    assert_eq!(record_count(&conn), 1);
    assert!(matches!(
        drafts.load_draft(draft.id),
        Err(DraftServiceError::DraftNotFound(_))
    ));
    assert_eq!(service.autosave().load_snapshot(), None);
}

#[test]
fn stored_markdown_contains_frontmatter_and_sections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKnowledgeStore::try_new(
        &conn,
        ExportOptions {
            save_path: "docs/runbooks".to_string(),
            author: Some("Taro".to_string()),
        },
    )
    .unwrap();
    let service = KnowledgeService::new(
        store,
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );

    let receipt = match service.submit(&complete_input("Disk Full"), None).unwrap() {
        SubmitOutcome::Committed(receipt) => receipt,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let reader = SqliteKnowledgeStore::try_new(&conn, ExportOptions::default()).unwrap();
    let markdown = reader.load_markdown(&receipt.commit_id).unwrap().unwrap();
    assert!(markdown.starts_with("---\ntitle: \"Disk Full\"\n"));
    assert!(markdown.contains("category: alerts\n"));
    assert!(markdown.contains("author: \"Taro\"\n"));
    assert!(markdown.contains("## 対応手順\n\nrestart service"));
    assert!(markdown.contains("## 対応履歴"));
    assert_eq!(reader.load_markdown("missing").unwrap(), None);
}

#[test]
fn colliding_titles_get_numbered_locations() {
    let conn = open_db_in_memory().unwrap();
    let service = KnowledgeService::new(
        SqliteKnowledgeStore::try_new(&conn, ExportOptions::default()).unwrap(),
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );

    let mut locations = Vec::new();
    for _ in 0..3 {
        match service.submit(&complete_input("Disk Full"), None).unwrap() {
            SubmitOutcome::Committed(receipt) => locations.push(receipt.location),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(
        locations,
        vec![
            "docs/runbooks/alerts/disk-full.md",
            "docs/runbooks/alerts/disk-full-2.md",
            "docs/runbooks/alerts/disk-full-3.md",
        ]
    );
}

#[test]
fn quick_save_commits_placeholder_record() {
    let conn = open_db_in_memory().unwrap();
    let service = KnowledgeService::new(
        SqliteKnowledgeStore::try_new(&conn, ExportOptions::default()).unwrap(),
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );

    let outcome = service
        .quick_save("Nightly batch stuck", Category::Maintenance, Severity::Medium)
        .unwrap();
    let receipt = match outcome {
        SubmitOutcome::Committed(receipt) => receipt,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(
        receipt.location,
        "docs/runbooks/maintenance/nightly-batch-stuck.md"
    );

    let symptoms: String = conn
        .query_row(
            "SELECT symptoms FROM knowledge_records WHERE commit_id = ?1;",
            [&receipt.commit_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(symptoms, QUICK_SAVE_PLACEHOLDER);
}

#[test]
fn quick_save_with_blank_title_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = KnowledgeService::new(
        SqliteKnowledgeStore::try_new(&conn, ExportOptions::default()).unwrap(),
        SqliteDraftRepository::try_new(&conn).unwrap(),
        AutoSave::new(SqliteSnapshotSlot::try_new(&conn).unwrap()),
    );

    let outcome = service
        .quick_save("   ", Category::Ops, Severity::Low)
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Rejected(ref result) if result.errors.len() == 1));
    assert_eq!(record_count(&conn), 0);
}
