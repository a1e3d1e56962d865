//! Typed table definitions for migration steps.
//!
//! Historical migrations declare their DDL as data instead of formatted SQL
//! text: identifiers are static strings fixed at compile time and values
//! always travel through bound parameters, so a step cannot introduce
//! injection or silent type mismatches.

use rusqlite::{params, Connection};

#[derive(Debug, Clone, Copy)]
pub enum ColumnType {
    Text,
    Integer,
    Boolean,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

#[derive(Debug)]
struct Column {
    name: &'static str,
    ty: ColumnType,
    not_null: bool,
}

/// Builder for a table with insert-or-replace primary-key semantics.
///
/// The primary key carries `ON CONFLICT REPLACE`, so a later insert with the
/// same key silently supersedes the earlier row. Every table in the schema
/// behaves this way.
#[derive(Debug)]
pub struct TableDef {
    name: &'static str,
    columns: Vec<Column>,
    primary_key: Vec<&'static str>,
}

impl TableDef {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Add a NOT NULL column.
    pub fn column(mut self, name: &'static str, ty: ColumnType) -> Self {
        self.columns.push(Column {
            name,
            ty,
            not_null: true,
        });
        self
    }

    /// Add a nullable column.
    pub fn nullable(mut self, name: &'static str, ty: ColumnType) -> Self {
        self.columns.push(Column {
            name,
            ty,
            not_null: false,
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&'static str]) -> Self {
        self.primary_key = columns.to_vec();
        self
    }

    fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", c.name, c.ty.sql());
                if c.not_null {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();

        if !self.primary_key.is_empty() {
            parts.push(format!(
                "PRIMARY KEY ({}) ON CONFLICT REPLACE",
                self.primary_key.join(", ")
            ));
        }

        format!("CREATE TABLE {} ({})", self.name, parts.join(", "))
    }

    pub fn create(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(&self.create_sql())
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn drop_table(conn: &Connection, name: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!("DROP TABLE {name}"))
}

pub fn rename_table(conn: &Connection, from: &str, to: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!("ALTER TABLE {from} RENAME TO {to}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ColumnType::*;

    #[test]
    fn test_create_sql_shape() {
        let def = TableDef::new("things")
            .column("a", Text)
            .nullable("b", Integer)
            .column("c", Boolean)
            .primary_key(&["a", "c"]);

        assert_eq!(
            def.create_sql(),
            "CREATE TABLE things (a TEXT NOT NULL, b INTEGER, c BOOLEAN NOT NULL, \
             PRIMARY KEY (a, c) ON CONFLICT REPLACE)"
        );
    }

    #[test]
    fn test_composite_key_replaces() {
        let conn = Connection::open_in_memory().unwrap();
        TableDef::new("pairs")
            .column("k1", Text)
            .column("k2", Text)
            .column("v", Text)
            .primary_key(&["k1", "k2"])
            .create(&conn)
            .unwrap();

        conn.execute("INSERT INTO pairs VALUES ('a', 'b', 'first')", []).unwrap();
        conn.execute("INSERT INTO pairs VALUES ('a', 'b', 'second')", []).unwrap();

        let (count, v): (i64, String) = conn
            .query_row("SELECT COUNT(*), MAX(v) FROM pairs", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(v, "second");
    }

    #[test]
    fn test_table_exists() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn, "pairs").unwrap());
        TableDef::new("pairs")
            .column("k", Text)
            .primary_key(&["k"])
            .create(&conn)
            .unwrap();
        assert!(table_exists(&conn, "pairs").unwrap());
    }
}
