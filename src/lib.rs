//! # personjobdept - Person / Job / Department schema
//!
//! A small relational schema over an embedded SQLite file.
//!
//! personjobdept provides:
//! - A static schema-definition list (`storage::schema::SCHEMA`) from which DDL is generated
//! - Explicit record structs bound to their tables through the `Record` trait
//! - A `Database` handle that enables foreign-key enforcement and applies the schema

pub mod config;
pub mod record;
pub mod salary;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use record::{Department, Job, Keyed, Person, PersonNumKey, Record};
pub use salary::Salary;
pub use storage::Database;

/// Result type alias for personjobdept operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for personjobdept operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open database {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Constraint violation ({kind}): {message}")]
    Constraint { kind: ConstraintKind, message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Table {0} has no primary key")]
    Unkeyed(&'static str),

    #[error("Table {table} has no relation named {relation}")]
    UnknownRelation { table: &'static str, relation: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Which constraint the engine reported as violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    NotNull,
    Check,
    Unique,
    Other,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Other => "other",
        }
    }

    fn from_extended_code(code: std::os::raw::c_int) -> Self {
        use rusqlite::ffi;
        match code {
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => ConstraintKind::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
            ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
            ffi::SQLITE_CONSTRAINT_UNIQUE => ConstraintKind::Unique,
            _ => ConstraintKind::Other,
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Error {
    /// Classify an engine error raised by a write.
    ///
    /// Constraint failures become `Error::Constraint`; everything else stays a
    /// storage error.
    pub fn from_write(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::Constraint {
                    kind: ConstraintKind::from_extended_code(failure.extended_code),
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            other => Error::Storage(other),
        }
    }

    /// The violated constraint, if this is a constraint error
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Error::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
