use maat_row::{AccessKind, AccessStatus, MaatEngine, RowMaat, TxnObservations};
use std::sync::Arc;

/// Record whose last committed write happened at `ts`.
fn seeded_row(ts: u64) -> Arc<RowMaat> {
    let row = Arc::new(RowMaat::new(42, b"seed".to_vec()));
    let mut seed = TxnObservations::new(1000);
    assert_eq!(row.prewrite(&mut seed), AccessStatus::Ok);
    assert_eq!(
        row.commit(AccessKind::Write, 1000, ts, Some(b"seed")),
        AccessStatus::Ok
    );
    row
}

#[test]
fn test_prewrite_visible_to_later_reader() {
    let row = seeded_row(5);

    let mut t1 = TxnObservations::new(1);
    assert_eq!(row.prewrite(&mut t1), AccessStatus::Ok);
    assert_eq!(t1.high_water_write_ts(), 5);
    assert_eq!(row.uncommitted_writers(), vec![1]);

    let mut t2 = TxnObservations::new(2);
    assert_eq!(row.read(&mut t2), AccessStatus::Ok);
    assert_eq!(t2.writers_on_read().iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(t2.high_water_write_ts(), 5);
    assert!(t2.writers_on_prewrite().is_empty());
}

#[test]
fn test_write_commit_publishes_payload() {
    let row = seeded_row(5);
    let mut t1 = TxnObservations::new(1);
    let _ = row.prewrite(&mut t1);

    assert_eq!(row.commit(AccessKind::Write, 1, 9, Some(b"P")), AccessStatus::Ok);
    assert_eq!(row.last_committed_write_ts(), 9);
    assert!(row.uncommitted_writers().is_empty());
    assert_eq!(row.data(), b"P");
}

#[test]
fn test_aborted_prewrite_leaves_no_trace() {
    let row = seeded_row(5);
    let mut t1 = TxnObservations::new(1);
    let _ = row.prewrite(&mut t1);

    assert_eq!(row.abort(AccessKind::Write, 1), AccessStatus::Abort);
    assert!(row.uncommitted_writers().is_empty());
    assert_eq!(row.last_committed_write_ts(), 5);
    assert_eq!(row.data(), b"seed");

    // A later writer no longer sees it.
    let mut t3 = TxnObservations::new(3);
    let _ = row.prewrite(&mut t3);
    assert!(t3.writers_on_prewrite().is_empty());
}

#[test]
fn test_concurrent_readers_commit_in_any_order() {
    for (first, second) in [((1, 3), (2, 7)), ((2, 7), (1, 3))] {
        let row = RowMaat::new(1, Vec::new());
        let mut t1 = TxnObservations::new(1);
        let mut t2 = TxnObservations::new(2);
        let _ = row.read(&mut t1);
        let _ = row.read(&mut t2);
        assert!(row.is_reading(1) && row.is_reading(2));

        let _ = row.commit(AccessKind::Read, first.0, first.1, None);
        let _ = row.commit(AccessKind::Read, second.0, second.1, None);
        assert_eq!(row.last_committed_read_ts(), 7);
        assert!(row.uncommitted_readers().is_empty());
    }
}

#[test]
fn test_writer_after_committed_read_is_bounded() {
    let engine = MaatEngine::new();
    let row = engine.table().get_or_insert(7, b"0".to_vec());

    let mut reader = engine.begin();
    reader.read(&row).unwrap();
    reader.commit_at(30).unwrap();

    let mut writer = engine.begin();
    writer.write(&row, b"1".to_vec()).unwrap();
    assert_eq!(writer.observations().high_water_read_ts(), 30);
    assert!(writer.commit_at(30).is_err());
    assert_eq!(writer.commit_at(31).unwrap(), 31);
    assert_eq!(row.data(), b"1");
}

#[test]
fn test_engine_round_trip_across_records() {
    let engine = MaatEngine::new();
    let a = engine.table().get_or_insert(1, b"100".to_vec());
    let b = engine.table().get_or_insert(2, b"0".to_vec());

    let mut txn = engine.begin();
    assert_eq!(txn.read(&a).unwrap(), b"100");
    assert_eq!(txn.read(&b).unwrap(), b"0");
    txn.write(&a, b"90".to_vec()).unwrap();
    txn.write(&b, b"10".to_vec()).unwrap();

    // Another transaction interleaves on one record only.
    let mut other = engine.begin();
    other.read(&b).unwrap();
    assert!(other.observations().writers_on_read().contains(&txn.id()));
    other.abort().unwrap();

    let ts = engine.commit(&mut txn).unwrap();
    for row in [&a, &b] {
        assert_eq!(row.last_committed_read_ts(), ts);
        assert_eq!(row.last_committed_write_ts(), ts);
        assert!(row.uncommitted_readers().is_empty());
        assert!(row.uncommitted_writers().is_empty());
    }
    assert_eq!(a.data(), b"90");
    assert_eq!(b.data(), b"10");
}
