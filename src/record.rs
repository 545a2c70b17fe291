//! Record types and their binding to the schema
//!
//! Every record struct implements `Record`, which names its `TableDef` and
//! converts between the struct and a row. Parameters and row columns follow
//! the table's column declaration order.

use crate::salary::Salary;
use crate::storage::schema::{self, TableDef};
use crate::{Error, Result};
use chrono::NaiveDate;
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};

/// Date format used for every DATE column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| Error::InvalidValue {
        field: "date",
        reason: format!("{:?} is not a YYYY-MM-DD date: {}", s, e),
    })
}

/// A struct stored as one row of a schema table
pub trait Record: Sized {
    /// The table this record is stored in
    fn table() -> &'static TableDef;

    /// Values for every column, in declaration order
    fn to_params(&self) -> Vec<&dyn ToSql>;

    /// Build a record from a row selected with `TableDef::select_sql`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// A record whose table declares a primary key
pub trait Keyed: Record {
    fn key(&self) -> &str;
}

/// Someone for whom we want to research career to date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub person_name: String,
    pub lives_in_town: String,
    pub nickname: Option<String>,
}

impl Person {
    pub fn new(person_name: impl Into<String>, lives_in_town: impl Into<String>) -> Self {
        Self {
            person_name: person_name.into(),
            lives_in_town: lives_in_town.into(),
            nickname: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

impl Record for Person {
    fn table() -> &'static TableDef {
        &schema::PERSON
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.person_name as &dyn ToSql,
            &self.lives_in_town as &dyn ToSql,
            &self.nickname as &dyn ToSql,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            person_name: row.get(0)?,
            lives_in_town: row.get(1)?,
            nickname: row.get(2)?,
        })
    }
}

impl Keyed for Person {
    fn key(&self) -> &str {
        &self.person_name
    }
}

/// A past job held by a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub salary: Salary,
    /// `person_name` of the employee
    pub person_employed: String,
}

impl Job {
    pub fn new(
        job_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        salary: Salary,
        person_employed: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            start_date,
            end_date,
            salary,
            person_employed: person_employed.into(),
        }
    }
}

impl Record for Job {
    fn table() -> &'static TableDef {
        &schema::JOB
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.job_name as &dyn ToSql,
            &self.start_date as &dyn ToSql,
            &self.end_date as &dyn ToSql,
            &self.salary as &dyn ToSql,
            &self.person_employed as &dyn ToSql,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            job_name: row.get(0)?,
            start_date: row.get(1)?,
            end_date: row.get(2)?,
            salary: row.get(3)?,
            person_employed: row.get(4)?,
        })
    }
}

impl Keyed for Job {
    fn key(&self) -> &str {
        &self.job_name
    }
}

/// The department a job belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub dept_num: String,
    pub dept_name: String,
    pub dept_manager: String,
    /// `job_name` of the job backing this department
    pub job_employed: String,
}

impl Department {
    pub fn new(
        dept_num: impl Into<String>,
        dept_name: impl Into<String>,
        dept_manager: impl Into<String>,
        job_employed: impl Into<String>,
    ) -> Self {
        Self {
            dept_num: dept_num.into(),
            dept_name: dept_name.into(),
            dept_manager: dept_manager.into(),
            job_employed: job_employed.into(),
        }
    }
}

impl Record for Department {
    fn table() -> &'static TableDef {
        &schema::DEPARTMENT
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.dept_num as &dyn ToSql,
            &self.dept_name as &dyn ToSql,
            &self.dept_manager as &dyn ToSql,
            &self.job_employed as &dyn ToSql,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            dept_num: row.get(0)?,
            dept_name: row.get(1)?,
            dept_manager: row.get(2)?,
            job_employed: row.get(3)?,
        })
    }
}

impl Keyed for Department {
    fn key(&self) -> &str {
        &self.dept_num
    }
}

/// Alternate person record without a declared primary key.
///
/// Not linked to jobs or departments, and not `Keyed`: two rows may share a
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonNumKey {
    pub person_name: String,
    pub lives_in_town: String,
    pub nickname: Option<String>,
}

impl PersonNumKey {
    pub fn new(person_name: impl Into<String>, lives_in_town: impl Into<String>) -> Self {
        Self {
            person_name: person_name.into(),
            lives_in_town: lives_in_town.into(),
            nickname: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

impl Record for PersonNumKey {
    fn table() -> &'static TableDef {
        &schema::PERSON_NUM_KEY
    }

    fn to_params(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.person_name as &dyn ToSql,
            &self.lives_in_town as &dyn ToSql,
            &self.nickname as &dyn ToSql,
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            person_name: row.get(0)?,
            lives_in_town: row.get(1)?,
            nickname: row.get(2)?,
        })
    }
}
