use personjobdept::record::parse_date;
use personjobdept::{ConstraintKind, Database, Department, Error, Job, Person, PersonNumKey};

fn barista(employee: &str) -> Job {
    Job::new(
        "Barista",
        parse_date("2020-01-01").unwrap(),
        parse_date("2021-01-01").unwrap(),
        "35000.00".parse().unwrap(),
        employee,
    )
}

#[test]
fn open_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("personjobdept.db");
    assert!(!path.exists());

    let db = Database::open(&path).unwrap();
    assert!(path.exists());
    assert!(db.foreign_keys_enabled().unwrap());
    db.close().unwrap();
}

#[test]
fn open_in_missing_directory_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("personjobdept.db");

    let err = Database::open(&path).err().unwrap();
    assert!(matches!(err, Error::Connection { .. }), "unexpected error: {err}");
}

#[test]
fn locked_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("personjobdept.db");

    let holder = rusqlite::Connection::open(&path).unwrap();
    holder
        .execute_batch("PRAGMA locking_mode = EXCLUSIVE; BEGIN EXCLUSIVE;")
        .unwrap();

    // Opening the file succeeds lazily; schema setup is what hits the lock.
    let err = Database::open(&path).err().unwrap();
    match err {
        Error::Connection { path: reported, source } => {
            assert_eq!(reported, path.display().to_string());
            assert_eq!(source.sqlite_error_code(), Some(rusqlite::ErrorCode::DatabaseBusy));
        }
        other => panic!("unexpected error: {other}"),
    }

    holder.execute_batch("COMMIT;").unwrap();
}

#[test]
fn rows_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("personjobdept.db");

    {
        let db = Database::open(&path).unwrap();
        db.insert(&Person::new("Alice", "Springfield")).unwrap();
        db.insert(&barista("Alice")).unwrap();
        db.insert(&Department::new("CAFE", "Coffee", "Carol", "Barista")).unwrap();
        db.insert(&PersonNumKey::new("Alice", "Springfield")).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let stats = db.stats().unwrap();
    assert_eq!(stats.persons, 1);
    assert_eq!(stats.jobs, 1);
    assert_eq!(stats.departments, 1);
    assert_eq!(stats.person_num_keys, 1);

    let job: Job = db.get("Barista").unwrap().unwrap();
    assert_eq!(job.salary.to_string(), "35000.00");
    assert_eq!(job.end_date, parse_date("2021-01-01").unwrap());
}

#[test]
fn foreign_keys_enforced_on_every_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("personjobdept.db");

    Database::open(&path).unwrap().close().unwrap();

    // A fresh connection starts with the pragma off in SQLite; open must turn it on.
    let db = Database::open(&path).unwrap();
    assert!(db.foreign_keys_enabled().unwrap());
    let err = db.insert(&barista("Bob")).unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
}

#[test]
fn duplicate_department_code_rejected() {
    let db = Database::open_in_memory().unwrap();
    db.insert(&Person::new("Alice", "Springfield")).unwrap();
    db.insert(&barista("Alice")).unwrap();
    db.insert(&Department::new("CAFE", "Coffee", "Carol", "Barista")).unwrap();

    let err = db
        .insert(&Department::new("CAFE", "Tea", "Dave", "Barista"))
        .unwrap_err();
    assert_eq!(err.constraint_kind(), Some(ConstraintKind::PrimaryKey));
}
