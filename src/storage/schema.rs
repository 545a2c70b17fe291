//! Database schema definitions
//!
//! Each table is described once, statically, by a `TableDef`. DDL, insert and
//! select statements are all generated from these descriptions so the record
//! structs and the stored columns cannot drift apart.

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Text with a maximum length in characters
    Text { max_len: usize },
    /// Calendar date stored as `YYYY-MM-DD`
    Date,
    /// Fixed-point decimal
    Decimal { max_digits: u8, decimal_places: u8 },
}

impl ColumnType {
    /// SQL type name as written in the DDL
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Text { max_len } => format!("VARCHAR({})", max_len),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Decimal { max_digits, decimal_places } => {
                format!("DECIMAL({},{})", max_digits, decimal_places)
            }
        }
    }
}

/// Target of a foreign-key column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    /// Name of the reverse relation on the referenced record
    pub related_name: &'static str,
}

/// One column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    pub const fn text(name: &'static str, max_len: usize) -> Self {
        Self {
            name,
            ty: ColumnType::Text { max_len },
            nullable: false,
            primary_key: false,
            references: None,
        }
    }

    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Date,
            nullable: false,
            primary_key: false,
            references: None,
        }
    }

    pub const fn decimal(name: &'static str, max_digits: u8, decimal_places: u8) -> Self {
        Self {
            name,
            ty: ColumnType::Decimal { max_digits, decimal_places },
            nullable: false,
            primary_key: false,
            references: None,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn references(
        mut self,
        table: &'static str,
        column: &'static str,
        related_name: &'static str,
    ) -> Self {
        self.references = Some(ForeignKey { table, column, related_name });
        self
    }

    /// Column clause for CREATE TABLE
    pub fn definition_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.ty.sql_type());
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        // SQLite ignores the VARCHAR bound, so spell it out.
        if let ColumnType::Text { max_len } = self.ty {
            sql.push_str(&format!(" CHECK (length({}) <= {})", self.name, max_len));
        }
        if let Some(fk) = &self.references {
            sql.push_str(&format!(" REFERENCES {} ({})", fk.table, fk.column));
        }
        sql
    }
}

/// A table and the record type stored in it
#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    /// Name of the record struct mapped onto this table
    pub record: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// The primary-key column, if the table declares one
    pub fn primary_key(&self) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &'static ColumnDef> {
        self.columns.iter().filter(|c| c.references.is_some())
    }

    /// The foreign-key column behind a reverse relation, e.g. `was_filled_by`
    pub fn relation(&self, related_name: &str) -> Option<&'static ColumnDef> {
        self.foreign_keys()
            .find(|c| c.references.is_some_and(|fk| fk.related_name == related_name))
    }

    /// SQL to create the table
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.definition_sql()))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            self.name,
            columns.join(",\n")
        )
    }

    /// SQL to index every foreign-key column
    pub fn index_sql(&self) -> Vec<String> {
        self.foreign_keys()
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {table}_{col} ON {table}({col})",
                    table = self.name,
                    col = c.name
                )
            })
            .collect()
    }

    pub fn insert_sql(&self) -> String {
        let placeholders: Vec<String> =
            (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            self.column_names().join(", "),
            placeholders.join(", ")
        )
    }

    /// SELECT of every column in declaration order, without a WHERE clause
    pub fn select_sql(&self) -> String {
        format!("SELECT {} FROM {}", self.column_names().join(", "), self.name)
    }
}

static PERSON_COLUMNS: [ColumnDef; 3] = [
    ColumnDef::text("person_name", 30).primary_key(),
    ColumnDef::text("lives_in_town", 40),
    ColumnDef::text("nickname", 20).nullable(),
];

static JOB_COLUMNS: [ColumnDef; 5] = [
    ColumnDef::text("job_name", 30).primary_key(),
    ColumnDef::date("start_date"),
    ColumnDef::date("end_date"),
    ColumnDef::decimal("salary", 7, 2),
    ColumnDef::text("person_employed", 30).references("person", "person_name", "was_filled_by"),
];

static DEPARTMENT_COLUMNS: [ColumnDef; 4] = [
    ColumnDef::text("dept_num", 4).primary_key(),
    ColumnDef::text("dept_name", 30),
    ColumnDef::text("dept_manager", 30),
    ColumnDef::text("job_employed", 30).references("job", "job_name", "contains_job"),
];

static PERSON_NUM_KEY_COLUMNS: [ColumnDef; 3] = [
    ColumnDef::text("person_name", 30),
    ColumnDef::text("lives_in_town", 40),
    ColumnDef::text("nickname", 20).nullable(),
];

/// Someone whose career to date we track
pub static PERSON: TableDef = TableDef {
    name: "person",
    record: "Person",
    columns: &PERSON_COLUMNS,
};

/// Past jobs held by a person
pub static JOB: TableDef = TableDef {
    name: "job",
    record: "Job",
    columns: &JOB_COLUMNS,
};

/// Department a job belongs to
pub static DEPARTMENT: TableDef = TableDef {
    name: "department",
    record: "Department",
    columns: &DEPARTMENT_COLUMNS,
};

/// Person variant with no declared primary key; rows are only told apart by rowid
pub static PERSON_NUM_KEY: TableDef = TableDef {
    name: "personnumkey",
    record: "PersonNumKey",
    columns: &PERSON_NUM_KEY_COLUMNS,
};

/// Every table, in declaration order. Referenced tables come first.
pub static SCHEMA: [&TableDef; 4] = [&PERSON, &JOB, &DEPARTMENT, &PERSON_NUM_KEY];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<String> {
    let mut stmts: Vec<String> = SCHEMA.iter().map(|t| t.create_sql()).collect();
    stmts.extend(SCHEMA.iter().flat_map(|t| t.index_sql()));
    stmts
}

/// Human-readable one-line summary of a table
pub fn describe(table: &TableDef) -> String {
    let key = match table.primary_key() {
        Some(pk) => format!("primary key {}", pk.name),
        None => "no primary key".to_string(),
    };
    let refs: Vec<String> = table
        .foreign_keys()
        .filter_map(|c| {
            c.references.map(|fk| {
                format!("{} -> {}.{} (as {})", c.name, fk.table, fk.column, fk.related_name)
            })
        })
        .collect();
    if refs.is_empty() {
        format!("{} ({}): {} columns, {}", table.record, table.name, table.columns.len(), key)
    } else {
        format!(
            "{} ({}): {} columns, {}, references {}",
            table.record,
            table.name,
            table.columns.len(),
            key,
            refs.join(", ")
        )
    }
}

/// One `describe` line per table, in declaration order
pub fn summary() -> Vec<String> {
    SCHEMA.iter().copied().map(describe).collect()
}

/// Log the schema once, in declaration order
pub fn log_schema() {
    for line in summary() {
        tracing::info!("Schema: {}", line);
    }
}
