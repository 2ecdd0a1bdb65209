//! End-to-end scenarios driving [`ddb_query::execute`] against real temp-file tables,
//! covering the universal properties and scenarios of `SPEC_FULL.md` §8.

use std::io::Write;
use std::time::{Duration, Instant};

use ddb_query::config::{Format, TableConfig, TableConfigMap};
use ddb_query::{EngineError, Value};
use tempfile::NamedTempFile;

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(30)
}

fn csv_config(name: &str, path: &str) -> TableConfig {
    TableConfig {
        name: name.to_string(),
        file_path: path.to_string(),
        format: Format::Delimited,
        delimiter: ",".to_string(),
        has_header: true,
        columns: Vec::new(),
        quote: "\"".to_string(),
        escape: "\\".to_string(),
        max_columns: 0,
        trim_spaces: true,
        allow_quoted: true,
        strict_quotes: false,
        skip_empty_lines: true,
        parallel_reading: false,
        worker_threads: 0,
        chunk_size: 0,
        buffer_size: 0,
    }
}

fn users_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,name,city").unwrap();
    writeln!(file, "1,Ada,London").unwrap();
    writeln!(file, "2,Bob,Paris").unwrap();
    writeln!(file, "3,Cleo,London").unwrap();
    file
}

fn tables_with(configs: Vec<TableConfig>) -> TableConfigMap {
    configs.into_iter().map(|c| (c.name.clone(), c)).collect()
}

#[test]
fn test_where_projection_and_limit() {
    let file = users_csv();
    let tables = tables_with(vec![csv_config("users", file.path().to_str().unwrap())]);

    let result = ddb_query::execute(
        deadline(),
        "SELECT id, name FROM users WHERE city = 'London' ORDER BY id LIMIT 1",
        &tables,
    )
    .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.columns, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(result.rows[0].get("name"), Some(&Value::Text("Ada".to_string())));
}

#[test]
fn test_group_by_keeps_one_exemplar_per_city() {
    let file = users_csv();
    let tables = tables_with(vec![csv_config("users", file.path().to_str().unwrap())]);

    let result = ddb_query::execute(deadline(), "SELECT * FROM users GROUP BY city", &tables).unwrap();
    assert_eq!(result.count, 2);
}

#[test]
fn test_order_by_is_stable_for_equal_keys() {
    let file = users_csv();
    let tables = tables_with(vec![csv_config("users", file.path().to_str().unwrap())]);

    let result = ddb_query::execute(deadline(), "SELECT id FROM users ORDER BY city", &tables).unwrap();
    let ids: Vec<i64> = result.rows.iter().map(|r| r.get("id").and_then(Value::as_i64).unwrap()).collect();
    // London rows (1, 3) sort before Paris (2); among the London rows, source order (1 before 3) holds.
    assert_eq!(ids, vec![1, 3, 2]);
}

#[test]
fn test_inner_join_users_and_orders() {
    let users = users_csv();
    let mut orders = NamedTempFile::new().unwrap();
    writeln!(orders, "uid,item").unwrap();
    writeln!(orders, "1,Widget").unwrap();
    writeln!(orders, "2,Gadget").unwrap();
    writeln!(orders, "2,Gizmo").unwrap();

    let tables = tables_with(vec![
        csv_config("users", users.path().to_str().unwrap()),
        csv_config("orders", orders.path().to_str().unwrap()),
    ]);

    let sql = "SELECT name, item FROM users u INNER JOIN orders o ON u.id = o.uid ORDER BY name, item";
    let result = ddb_query::execute(deadline(), sql, &tables).unwrap();
    let pairs: Vec<(String, String)> = result
        .rows
        .iter()
        .map(|r| (r.get("name").unwrap().as_text(), r.get("item").unwrap().as_text()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Bob".to_string(), "Gadget".to_string()),
            ("Bob".to_string(), "Gizmo".to_string()),
            ("Ada".to_string(), "Widget".to_string()),
        ]
    );
}

#[test]
fn test_left_join_includes_unmatched_left_rows() {
    let users = users_csv();
    let mut orders = NamedTempFile::new().unwrap();
    writeln!(orders, "uid,item").unwrap();
    writeln!(orders, "1,Widget").unwrap();

    let tables = tables_with(vec![
        csv_config("users", users.path().to_str().unwrap()),
        csv_config("orders", orders.path().to_str().unwrap()),
    ]);

    let sql = "SELECT name, item FROM users u LEFT JOIN orders o ON u.id = o.uid";
    let result = ddb_query::execute(deadline(), sql, &tables).unwrap();
    assert_eq!(result.count, 3);
    let cleo = result.rows.iter().find(|r| r.get("name") == Some(&Value::Text("Cleo".to_string()))).unwrap();
    assert_eq!(cleo.get("item"), Some(&Value::Null));
}

#[test]
fn test_insert_then_select_round_trip() {
    let file = users_csv();
    let path = file.path().to_str().unwrap().to_string();
    let tables = tables_with(vec![csv_config("users", &path)]);

    ddb_query::execute(deadline(), "INSERT INTO users (id, name, city) VALUES (4, 'Dee', 'Berlin')", &tables).unwrap();

    let result = ddb_query::execute(deadline(), "SELECT * FROM users WHERE id = 4", &tables).unwrap();
    assert_eq!(result.count, 1);
    assert_eq!(result.rows[0].get("name"), Some(&Value::Text("Dee".to_string())));
}

#[test]
fn test_update_without_where_is_refused_before_touching_file() {
    let file = users_csv();
    let path = file.path().to_str().unwrap().to_string();
    let tables = tables_with(vec![csv_config("users", &path)]);

    let before = std::fs::read_to_string(&path).unwrap();
    let result = ddb_query::execute(deadline(), "UPDATE users SET city = 'Nowhere'", &tables);
    assert!(matches!(result, Err(EngineError::Safety(_))));

    let after = std::fs::read_to_string(&path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_update_then_select_reflects_new_value() {
    let file = users_csv();
    let path = file.path().to_str().unwrap().to_string();
    let tables = tables_with(vec![csv_config("users", &path)]);

    ddb_query::execute(deadline(), "UPDATE users SET city = 'Berlin' WHERE id = 2", &tables).unwrap();

    let result = ddb_query::execute(deadline(), "SELECT city FROM users WHERE id = 2", &tables).unwrap();
    assert_eq!(result.rows[0].get("city"), Some(&Value::Text("Berlin".to_string())));
}

#[test]
fn test_delete_then_select_excludes_row() {
    let file = users_csv();
    let path = file.path().to_str().unwrap().to_string();
    let tables = tables_with(vec![csv_config("users", &path)]);

    ddb_query::execute(deadline(), "DELETE FROM users WHERE id = 2", &tables).unwrap();

    let result = ddb_query::execute(deadline(), "SELECT * FROM users", &tables).unwrap();
    assert_eq!(result.count, 2);
    assert!(result.rows.iter().all(|r| r.get("id") != Some(&Value::Integer(2))));
}

#[test]
fn test_limit_never_exceeds_count_even_with_fewer_matches() {
    let file = users_csv();
    let tables = tables_with(vec![csv_config("users", file.path().to_str().unwrap())]);

    let result = ddb_query::execute(deadline(), "SELECT * FROM users LIMIT 100", &tables).unwrap();
    assert_eq!(result.count, 3);
}

#[test]
fn test_unknown_column_in_where_drops_every_row_not_abort() {
    let file = users_csv();
    let tables = tables_with(vec![csv_config("users", file.path().to_str().unwrap())]);

    let result = ddb_query::execute(deadline(), "SELECT * FROM users WHERE nonexistent = 1", &tables).unwrap();
    assert_eq!(result.count, 0);
}

#[test]
fn test_jsonl_table_round_trips_through_insert() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{{\"id\":1,\"name\":\"Ada\"}}").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut config = csv_config("users", &path);
    config.format = Format::ObjectStream;
    let tables = tables_with(vec![config]);

    ddb_query::execute(deadline(), "INSERT INTO users (id, name) VALUES (2, 'Bob')", &tables).unwrap();

    let result = ddb_query::execute(deadline(), "SELECT * FROM users ORDER BY id", &tables).unwrap();
    assert_eq!(result.count, 2);
    assert_eq!(result.rows[1].get("name"), Some(&Value::Text("Bob".to_string())));
}
