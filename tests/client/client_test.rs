//! Client surface: connection options, settings, introspection helpers and a
//! round trip through a scripted worker.

use mssql_compiler::client::{filter_tables, table_from_columns, ClientError, RowLimit};
use mssql_compiler::config::{ConnectOptions, ConnectionError, Settings, DEFAULT_PORT};
use mssql_compiler::ir::{LogicalType, TableName};
use mssql_compiler::worker::protocol::ColumnInfo;

fn column(name: &str, position: i32, data_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        position,
        data_type: data_type.to_string(),
        is_nullable: true,
        numeric_precision: None,
        numeric_scale: None,
    }
}

#[test]
fn test_connect_options_defaults() {
    let options = ConnectOptions::default();
    assert_eq!(options.host, "localhost");
    assert_eq!(options.port, DEFAULT_PORT);
    assert_eq!(options.database, "master");
    assert!(options.trusted_connection());
    assert!(options.validate().is_ok());
    assert_eq!(
        options.to_odbc_string(),
        "DRIVER={ODBC Driver 17 for SQL Server};SERVER=localhost,1433;DATABASE=master;Trusted_Connection=yes"
    );
}

#[test]
fn test_connect_options_with_credentials() {
    let options = ConnectOptions::new()
        .host("db.internal")
        .port(14330)
        .database("sales")
        .user("report")
        .password("s3cret");

    assert!(!options.trusted_connection());
    let url = options.to_connection_string();
    assert!(url.starts_with("sqlserver://db.internal:14330?database=sales"));
    assert!(url.contains("user id=report"));
    assert!(url.contains("password=s3cret"));
}

#[test]
fn test_connect_options_rejects_other_drivers() {
    let err = ConnectOptions::new().driver("postgres").validate().unwrap_err();
    assert!(matches!(err, ConnectionError::UnsupportedDriver(_)));

    let err = ConnectOptions::new().password("x").validate().unwrap_err();
    assert!(matches!(err, ConnectionError::InvalidConfig(_)));
}

#[test]
fn test_row_limit_precedence() {
    assert_eq!(RowLimit::default(), RowLimit::Default);
    assert_eq!(RowLimit::Default.resolve(250), Some(250));
    assert_eq!(RowLimit::Rows(7).resolve(250), Some(7));
    assert_eq!(RowLimit::Unlimited.resolve(250), None);
}

#[test]
fn test_filter_tables() {
    let names = vec![
        "orders".to_string(),
        "customers".to_string(),
        "order_items".to_string(),
        "orders".to_string(),
    ];

    assert_eq!(
        filter_tables(names.clone(), None).unwrap(),
        vec!["customers", "order_items", "orders"]
    );
    assert_eq!(
        filter_tables(names.clone(), Some("^order")).unwrap(),
        vec!["order_items", "orders"]
    );
    assert!(matches!(
        filter_tables(names, Some("(")),
        Err(ClientError::InvalidPattern(_))
    ));
}

#[test]
fn test_table_from_columns_maps_native_types() {
    let mut amount = column("amount", 3, "decimal");
    amount.numeric_precision = Some(10);
    amount.numeric_scale = Some(2);

    let table = table_from_columns(
        TableName::parse("sales.orders"),
        vec![
            amount,
            column("id", 1, "bigint"),
            column("note", 4, "nvarchar"),
            column("shipped", 2, "bit"),
        ],
    )
    .unwrap();

    assert_eq!(table.name.schema.as_deref(), Some("sales"));
    assert_eq!(
        table.columns,
        vec![
            ("id".to_string(), LogicalType::Int64),
            ("shipped".to_string(), LogicalType::Boolean),
            (
                "amount".to_string(),
                LogicalType::Decimal {
                    precision: 10,
                    scale: 2
                }
            ),
            ("note".to_string(), LogicalType::String),
        ]
    );
}

#[test]
fn test_settings_from_toml() {
    let settings: Settings = toml::from_str(
        r#"
[connections.default]
url = "sqlserver://localhost:1433?database=tempdb"

[worker]
path = "/opt/bin/mssql-worker"
timeout_secs = 3

[compiler]
default_limit = 25
"#,
    )
    .unwrap();

    assert_eq!(settings.default_connection().map(|(n, _)| n), Some("default"));
    assert_eq!(
        settings.worker_path().as_deref(),
        Some(std::path::Path::new("/opt/bin/mssql-worker"))
    );
    assert_eq!(settings.worker.timeout_secs, 3);
    assert_eq!(settings.compiler.default_limit, 25);
}

#[cfg(unix)]
mod scripted_worker {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use mssql_compiler::client::{MsSqlClient, RowLimit};
    use mssql_compiler::compiler::Params;
    use mssql_compiler::config::{ConnectOptions, ConnectionSettings, Settings};
    use mssql_compiler::ir::LogicalType;

    const SCRIPT: &str = r#"#!/bin/sh
while IFS= read -r line; do
  id=$(printf '%s\n' "$line" | sed -e 's/^{"id":"\([^"]*\)".*/\1/')
  case "$line" in
    *'"method":"metadata.list_tables"'*)
      result='{"tables":[{"schema":"dbo","name":"orders","type":"TABLE"},{"schema":"dbo","name":"customers","type":"TABLE"},{"schema":"dbo","name":"order_items","type":"TABLE"}]}'
      ;;
    *'"method":"metadata.get_columns"'*)
      result='{"columns":[{"name":"amount","position":2,"data_type":"decimal","is_nullable":true,"numeric_precision":10,"numeric_scale":2},{"name":"id","position":1,"data_type":"int","is_nullable":false}]}'
      ;;
    *'"method":"query.execute"'*)
      result='{"columns":[{"name":"n","data_type":"int"}],"rows":[[1],[2]],"row_count":2}'
      ;;
    *)
      printf '{"id":"%s","success":false,"error":{"code":"METHOD_NOT_FOUND","message":"unknown method"}}\n' "$id"
      continue
      ;;
  esac
  printf '{"id":"%s","success":true,"result":%s}\n' "$id" "$result"
done
"#;

    fn write_script() -> PathBuf {
        let path = std::env::temp_dir().join(format!("mssql-worker-{}.sh", uuid::Uuid::new_v4()));
        std::fs::write(&path, SCRIPT).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_round_trip_through_worker() {
        let script = write_script();
        let mut settings = Settings::default();
        settings.worker.path = Some(script.display().to_string());
        settings.worker.timeout_secs = 10;

        let client = MsSqlClient::connect_with_settings(ConnectOptions::default(), settings)
            .await
            .unwrap();

        let tables = client.list_tables(Some("^order")).await.unwrap();
        assert_eq!(tables, vec!["order_items", "orders"]);

        let orders = client.table("sales.orders").await.unwrap();
        assert_eq!(orders.name.to_string(), "sales.orders");
        assert_eq!(orders.column_type("id"), Some(&LogicalType::Int32));
        assert_eq!(
            orders.column_type("amount"),
            Some(&LogicalType::Decimal {
                precision: 10,
                scale: 2
            })
        );

        let compiled = client
            .compile(orders.relation().limit(5, 0), &Params::new())
            .unwrap();
        assert!(compiled.to_sql().starts_with("SELECT\n  [t0].*\nFROM [sales].[orders] AS [t0]"));

        let result = client
            .execute(&orders, RowLimit::Rows(2), &Params::new())
            .await
            .unwrap();
        assert_eq!(result.columns, vec!["n"]);
        assert_eq!(result.rows.len(), 2);

        drop(client);

        let mut named = Settings::default();
        named.worker.path = Some(script.display().to_string());
        named.connections.insert(
            "reporting".into(),
            ConnectionSettings {
                url: "sqlserver://reports:1433?database=sales".into(),
                odbc_driver: None,
            },
        );
        let client = MsSqlClient::connect_named_with_settings(None, named)
            .await
            .unwrap();
        assert_eq!(
            client.options().to_connection_string(),
            "sqlserver://reports:1433?database=sales"
        );
        assert_eq!(client.list_tables(None).await.unwrap().len(), 3);

        drop(client);
        let _ = std::fs::remove_file(script);
    }
}
