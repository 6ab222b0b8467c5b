use cadence_core::{CompletionQuality, TaskStatus, WindowType};
use cadence_store::{NewTask, StatusFilter, Store, StoreError, STORE_FILE};
use chrono::{Duration, TimeZone, Utc};

/// Data written by one process is visible to the next one that opens the same directory.
#[test]
fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

    let (uid, task_id, deadline) = {
        let mut s = Store::open(dir.path()).unwrap();
        let u = s.register_user("grace", "grace@example.com", "Europe/Berlin", now).unwrap();
        let t = s
            .create_task(u.id, NewTask::new("Renew passport", WindowType::Monthly), now)
            .unwrap();
        s.complete_task(u.id, t.id, now + Duration::days(3)).unwrap();
        (u.id, t.id, t.deadline)
    };

    assert!(dir.path().join(STORE_FILE).exists());
    assert!(!dir.path().join("store.json.tmp").exists());

    let s = Store::open(dir.path()).unwrap();
    let user = s.user_by_name("grace").unwrap();
    assert_eq!(user.id, uid);
    assert_eq!(user.total_completed, 1);
    assert_eq!(user.streak.current, 1);
    assert!(user.has_achievement("getting_started"));

    let t = s.task_for(uid, task_id).unwrap();
    assert_eq!(t.deadline, deadline);
    assert_eq!(t.completion_quality, Some(CompletionQuality::OnTime));
    assert_eq!(t.status(now + Duration::days(40)), TaskStatus::Completed);
    assert_eq!(s.list_tasks(uid, StatusFilter::Completed, now).len(), 1);
}

#[test]
fn ids_keep_increasing_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

    let first = {
        let mut s = Store::open(dir.path()).unwrap();
        let u = s.register_user("lin", "lin@example.com", "UTC", now).unwrap();
        s.create_task(u.id, NewTask::new("a", WindowType::Daily), now).unwrap().id
    };

    let mut s = Store::open(dir.path()).unwrap();
    let uid = s.user_by_name("lin").unwrap().id;
    let second = s.create_task(uid, NewTask::new("b", WindowType::Daily), now).unwrap().id;
    assert!(second > first);
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(STORE_FILE), "{ not json").unwrap();
    let err = Store::open(dir.path()).unwrap_err();
    assert!(matches!(err, StoreError::Serde { .. }));
}

/// A write that fails leaves memory as it was, so the caller can simply retry.
#[test]
fn failed_save_rolls_back_in_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 12, 12, 0, 0).unwrap();

    let mut s = Store::open(dir.path()).unwrap();
    let uid = s.register_user("ines", "ines@example.com", "UTC", now).unwrap().id;
    let t = s.create_task(uid, NewTask::new("File taxes", WindowType::Weekly), now).unwrap();

    // a directory where the tmp file should go makes the next write fail
    let tmp = dir.path().join("store.json.tmp");
    std::fs::create_dir(&tmp).unwrap();

    let err = s.complete_task(uid, t.id, now).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(s.task_for(uid, t.id).unwrap().completed_at, None);
    assert_eq!(s.user(uid).unwrap().total_completed, 0);
    assert!(s.create_task(uid, NewTask::new("other", WindowType::Daily), now).is_err());
    assert_eq!(s.tasks_of(uid).len(), 1);

    std::fs::remove_dir(&tmp).unwrap();
    let out = s.complete_task(uid, t.id, now).unwrap();
    assert_eq!(out.task.completion_quality, Some(CompletionQuality::OnTime));

    let reloaded = Store::open(dir.path()).unwrap();
    assert!(reloaded.task_for(uid, t.id).unwrap().is_completed());
}
