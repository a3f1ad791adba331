use sqlbind_connectors_native_sqlite::{SqliteConnection, SqliteConnectionConfig, SqliteConnector};

pub fn connect_to_sqlite() -> SqliteConnection {
    let con = SqliteConnector::connect(SqliteConnectionConfig {
        path: ":memory:".into(),
    })
    .unwrap();

    con.execute_batch(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            name VARCHAR(50),
            salary NUMERIC(38, 2),
            joined DATE,
            active BOOLEAN,
            profile JSON
        )",
    )
    .unwrap();

    con
}
