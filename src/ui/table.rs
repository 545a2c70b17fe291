use crate::storage::schema::TableDef;
use crate::storage::{DbStats, ForeignKeyViolation};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct ColumnRow {
    #[tabled(rename = "Table")]
    pub table: &'static str,
    #[tabled(rename = "Column")]
    pub column: &'static str,
    #[tabled(rename = "Type")]
    pub ty: String,
    #[tabled(rename = "Null")]
    pub null: &'static str,
    #[tabled(rename = "Key")]
    pub key: String,
}

impl ColumnRow {
    fn rows_for(table: &TableDef) -> Vec<ColumnRow> {
        table
            .columns
            .iter()
            .map(|c| {
                let key = match (&c.references, c.primary_key) {
                    (_, true) => "PK".to_string(),
                    (Some(fk), false) => format!("FK -> {}({})", fk.table, fk.column),
                    (None, false) => String::new(),
                };
                ColumnRow {
                    table: table.name,
                    column: c.name,
                    ty: c.ty.sql_type(),
                    null: if c.nullable { "yes" } else { "no" },
                    key,
                }
            })
            .collect()
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

#[derive(Tabled)]
struct ViolationRow {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Rowid")]
    rowid: String,
    #[tabled(rename = "References")]
    parent: String,
}

/// One line per column across the given tables
pub fn columns_table(tables: &[&TableDef]) -> String {
    let rows: Vec<ColumnRow> = tables.iter().flat_map(|t| ColumnRow::rows_for(t)).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &DbStats) -> String {
    let rows: Vec<CountRow> = stats
        .rows()
        .into_iter()
        .map(|(table, rows)| CountRow { table, rows })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn violations_table(violations: &[ForeignKeyViolation]) -> String {
    if violations.is_empty() {
        return String::new();
    }
    let rows: Vec<ViolationRow> = violations
        .iter()
        .map(|v| ViolationRow {
            table: v.table.clone(),
            rowid: v.rowid.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            parent: v.parent.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{JOB, SCHEMA};

    #[test]
    fn test_columns_table_marks_keys() {
        let rendered = columns_table(&[&JOB]);
        assert!(rendered.contains("job_name"));
        assert!(rendered.contains("PK"));
        assert!(rendered.contains("FK -> person(person_name)"));
        assert!(rendered.contains("DECIMAL(7,2)"));
    }

    #[test]
    fn test_columns_table_covers_schema() {
        let rendered = columns_table(&SCHEMA);
        assert!(rendered.contains("personnumkey"));
        assert!(rendered.contains("dept_num"));
    }

    #[test]
    fn test_empty_violations_render_nothing() {
        assert!(violations_table(&[]).is_empty());
    }
}
