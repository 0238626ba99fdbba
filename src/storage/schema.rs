use rusqlite::Connection;

/// Driver and career tables. `driver_name` refers to `drivers.name`, but
/// foreign-key enforcement is left off: the sync engine keeps the two
/// relations consistent through its own key handling.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS drivers (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    nationality  TEXT,
    total_points REAL,
    last_updated TEXT
);
CREATE TABLE IF NOT EXISTS career_path (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    driver_name  TEXT NOT NULL,
    year         INTEGER,
    position     TEXT,
    team         TEXT,
    points       REAL,
    last_updated TEXT,
    FOREIGN KEY (driver_name) REFERENCES drivers (name),
    UNIQUE (driver_name, year)
);
"#;

/// Create both relations if absent. Safe to call on every open.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
        rows.collect::<rusqlite::Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(table_names(&conn), vec!["career_path", "drivers"]);
    }

    #[test]
    fn driver_names_are_unique() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO drivers (name) VALUES ('Alonso')", []).unwrap();
        assert!(conn.execute("INSERT INTO drivers (name) VALUES ('Alonso')", []).is_err());
    }

    #[test]
    fn one_season_per_driver_and_year() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO career_path (driver_name, year) VALUES ('Alonso', 2005)", [])
            .unwrap();
        conn.execute("INSERT INTO career_path (driver_name, year) VALUES ('Alonso', 2006)", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO career_path (driver_name, year) VALUES ('Alonso', 2005)", [])
            .is_err());
    }
}
