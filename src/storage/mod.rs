//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - person(person_name, lives_in_town, nickname)
//! - job(job_name, start_date, end_date, salary, person_employed -> person)
//! - department(dept_num, dept_name, dept_manager, job_employed -> job)
//! - personnumkey(person_name, lives_in_town, nickname), no primary key

pub mod schema;
pub mod sqlite;

pub use sqlite::{Database, DbStats, ForeignKeyViolation};
