//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use crate::record::{Department, Job, Keyed, Person, PersonNumKey, Record};
use crate::{Error, Result};
use super::schema::{self, TableDef};

/// Handle to the schema database.
///
/// Owns exactly one connection. Callers receive the handle explicitly; the
/// connection is released when the handle is dropped or closed.
pub struct Database {
    conn: Connection,
    location: String,
}

impl Database {
    /// Open a database file (creates if doesn't exist), enable foreign keys and apply the schema
    pub fn open(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        tracing::debug!("Opening database {}", location);
        let conn = Connection::open(path).map_err(|source| Error::Connection {
            path: location.clone(),
            source,
        })?;
        Self::initialize(conn, location)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let location = ":memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|source| Error::Connection {
            path: location.clone(),
            source,
        })?;
        Self::initialize(conn, location)
    }

    fn initialize(conn: Connection, location: String) -> Result<Self> {
        let db = Self { conn, location };
        let setup = db.enable_foreign_keys().and_then(|_| db.initialize_schema());
        if let Err(err) = setup {
            // Anything failing before the handle is usable means the file is unavailable.
            return Err(match err {
                Error::Storage(source) => Error::Connection {
                    path: db.location.clone(),
                    source,
                },
                other => other,
            });
        }
        schema::log_schema();
        Ok(db)
    }

    /// Turn on foreign-key enforcement; SQLite ships with it off.
    ///
    /// Returns whether the engine reports it enabled afterwards. An engine
    /// that ignores the pragma is tolerated with a warning.
    fn enable_foreign_keys(&self) -> Result<bool> {
        self.set_foreign_keys(true)?;
        let enabled = self.foreign_keys_enabled()?;
        if !enabled {
            tracing::warn!("Foreign key enforcement unavailable on {}", self.location);
        }
        Ok(enabled)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(&stmt, [])?;
        }
        Ok(())
    }

    /// Whether `PRAGMA foreign_keys` is currently on for this connection
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let value: Option<i64> = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .optional()?;
        Ok(value == Some(1))
    }

    /// Switch foreign-key enforcement on or off for this connection
    pub fn set_foreign_keys(&self, enabled: bool) -> Result<()> {
        let value = if enabled { "ON" } else { "OFF" };
        self.conn.execute_batch(&format!("PRAGMA foreign_keys = {};", value))?;
        Ok(())
    }

    /// Where this database lives (`:memory:` for in-memory databases)
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing database {}", self.location);
        self.conn.close().map_err(|(_, err)| Error::Storage(err))
    }

    // ========== Record Operations ==========

    /// Insert a record, returning its rowid
    pub fn insert<R: Record>(&self, record: &R) -> Result<i64> {
        let table = R::table();
        let params = record.to_params();
        self.conn
            .execute(&table.insert_sql(), params.as_slice())
            .map_err(Error::from_write)?;
        let rowid = self.conn.last_insert_rowid();
        tracing::debug!("Inserted {} row {}", table.name, rowid);
        Ok(rowid)
    }

    /// Get a record by primary key
    pub fn get<R: Keyed>(&self, key: &str) -> Result<Option<R>> {
        let table = R::table();
        let pk = table.primary_key().ok_or(Error::Unkeyed(table.name))?;
        let sql = format!("{} WHERE {} = ?1", table.select_sql(), pk.name);
        self.conn
            .query_row(&sql, [key], R::from_row)
            .optional()
            .map_err(Into::into)
    }

    /// All records of a type, in insertion order
    pub fn all<R: Record>(&self) -> Result<Vec<R>> {
        let sql = format!("{} ORDER BY rowid", R::table().select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], R::from_row)?
            .collect::<rusqlite::Result<Vec<R>>>()?;
        Ok(records)
    }

    /// Count records of a type
    pub fn count<R: Record>(&self) -> Result<usize> {
        self.count_table(R::table())
    }

    /// Count rows in a table
    pub fn count_table(&self, table: &TableDef) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Jobs held by a person (`was_filled_by`)
    pub fn jobs_for_person(&self, person_name: &str) -> Result<Vec<Job>> {
        self.related::<Job>("was_filled_by", person_name)
    }

    /// Departments backed by a job (`contains_job`)
    pub fn departments_for_job(&self, job_name: &str) -> Result<Vec<Department>> {
        self.related::<Department>("contains_job", job_name)
    }

    /// Records of `R` whose foreign key behind `related_name` equals `key`
    pub fn related<R: Record>(&self, related_name: &str, key: &str) -> Result<Vec<R>> {
        let table = R::table();
        let column = table.relation(related_name).ok_or_else(|| Error::UnknownRelation {
            table: table.name,
            relation: related_name.to_string(),
        })?;
        let sql = format!("{} WHERE {} = ?1 ORDER BY rowid", table.select_sql(), column.name);
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([key], R::from_row)?
            .collect::<rusqlite::Result<Vec<R>>>()?;
        Ok(records)
    }

    // ========== Diagnostics ==========

    /// Rows whose foreign keys point at nothing.
    ///
    /// Only possible for rows written while enforcement was off.
    pub fn foreign_key_violations(&self) -> Result<Vec<ForeignKeyViolation>> {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
        let violations = stmt
            .query_map([], |row| {
                Ok(ForeignKeyViolation {
                    table: row.get(0)?,
                    rowid: row.get(1)?,
                    parent: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(violations)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            persons: self.count::<Person>()?,
            jobs: self.count::<Job>()?,
            departments: self.count::<Department>()?,
            person_num_keys: self.count::<PersonNumKey>()?,
        })
    }
}

/// A row reported by `PRAGMA foreign_key_check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    /// Table the dangling reference points to
    pub parent: String,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub persons: usize,
    pub jobs: usize,
    pub departments: usize,
    pub person_num_keys: usize,
}

impl DbStats {
    /// (table, row count) pairs in schema declaration order
    pub fn rows(&self) -> Vec<(&'static str, usize)> {
        vec![
            (schema::PERSON.name, self.persons),
            (schema::JOB.name, self.jobs),
            (schema::DEPARTMENT.name, self.departments),
            (schema::PERSON_NUM_KEY.name, self.person_num_keys),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConstraintKind;
    use crate::record::parse_date;

    fn alice() -> Person {
        Person::new("Alice", "Springfield")
    }

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
    fn test_foreign_keys_on_after_open() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.foreign_keys_enabled().unwrap());
    }

    #[test]
    fn test_person_crud() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice().with_nickname("Al")).unwrap();

        let retrieved: Person = db.get("Alice").unwrap().unwrap();
        assert_eq!(retrieved.lives_in_town, "Springfield");
        assert_eq!(retrieved.nickname.as_deref(), Some("Al"));

        let missing: Option<Person> = db.get("Nobody").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_duplicate_person_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice()).unwrap();

        let err = db.insert(&Person::new("Alice", "Shelbyville")).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::PrimaryKey));
        assert_eq!(db.count::<Person>().unwrap(), 1);
    }

    #[test]
    fn test_job_scenario() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice()).unwrap();
        db.insert(&barista("Alice")).unwrap();

        let job: Job = db.get("Barista").unwrap().unwrap();
        assert_eq!(job.salary.to_string(), "35000.00");
        assert_eq!(job.start_date, parse_date("2020-01-01").unwrap());
        assert_eq!(job.person_employed, "Alice");

        assert!(db.foreign_keys_enabled().unwrap());
        let mut orphan = barista("Bob");
        orphan.job_name = "Barman".to_string();
        let err = db.insert(&orphan).unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
    }

    #[test]
    fn test_department_requires_job() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .insert(&Department::new("D1", "Coffee", "Carol", "Barista"))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));

        db.insert(&alice()).unwrap();
        db.insert(&barista("Alice")).unwrap();
        db.insert(&Department::new("D1", "Coffee", "Carol", "Barista")).unwrap();

        let depts = db.departments_for_job("Barista").unwrap();
        assert_eq!(depts.len(), 1);
        assert_eq!(depts[0].dept_manager, "Carol");
    }

    #[test]
    fn test_pragma_off_allows_dangling_reference() {
        let db = Database::open_in_memory().unwrap();
        db.set_foreign_keys(false).unwrap();
        assert!(!db.foreign_keys_enabled().unwrap());

        db.insert(&barista("Bob")).unwrap();

        let violations = db.foreign_key_violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].table, "job");
        assert_eq!(violations[0].parent, "person");

        db.set_foreign_keys(true).unwrap();
        assert!(db.foreign_keys_enabled().unwrap());
    }

    #[test]
    fn test_person_num_key_accepts_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert(&PersonNumKey::new("Alice", "Springfield")).unwrap();
        let second = db
            .insert(&PersonNumKey::new("Alice", "Springfield").with_nickname("Ali"))
            .unwrap();
        assert_ne!(first, second);

        let rows: Vec<PersonNumKey> = db.all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].nickname.as_deref(), Some("Ali"));
    }

    #[test]
    fn test_length_bound_enforced() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice()).unwrap();
        db.insert(&barista("Alice")).unwrap();

        let err = db
            .insert(&Department::new("TOOLONG", "Coffee", "Carol", "Barista"))
            .unwrap_err();
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::Check));
    }

    #[test]
    fn test_jobs_for_person() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice()).unwrap();
        db.insert(&barista("Alice")).unwrap();
        let mut second = barista("Alice");
        second.job_name = "Manager".to_string();
        second.salary = "52000.50".parse().unwrap();
        db.insert(&second).unwrap();

        let jobs = db.jobs_for_person("Alice").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].salary.to_string(), "52000.50");
        assert!(db.jobs_for_person("Bob").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_relation() {
        let db = Database::open_in_memory().unwrap();
        let err = db.related::<Job>("contains_job", "Barista").unwrap_err();
        assert!(matches!(err, Error::UnknownRelation { table: "job", .. }));

        let err = db.related::<PersonNumKey>("was_filled_by", "Alice").unwrap_err();
        assert!(matches!(err, Error::UnknownRelation { table: "personnumkey", .. }));
    }

    #[test]
    fn test_stats() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&alice()).unwrap();
        db.insert(&PersonNumKey::new("Alice", "Springfield")).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.persons, 1);
        assert_eq!(stats.jobs, 0);
        assert_eq!(stats.person_num_keys, 1);
        assert_eq!(stats.rows()[0], ("person", 1));
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::open_in_memory().unwrap();
        for table in schema::SCHEMA.iter() {
            let count: i64 = db
                .connection()
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table.name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table.name);
        }
    }
}
