use std::sync::Arc;

use shelf_layout::{
    Cabinet, Lane, LaneAddress, Position, Product, Row, RowSize, ShelfDb, Size, StoreSettings,
    backend::BackendImpl, backend::database::InMemory,
};

// ==========================
// CORE TEST FACTORIES
// ==========================
// Single point of change for backend matrix testing via TEST_BACKEND.

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// TEST_BACKEND=sqlite cargo test --features sqlite
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/shelf_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Arc<dyn BackendImpl> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use shelf_layout::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use shelf_layout::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/shelf_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// An empty database on the selected backend.
pub async fn test_db() -> ShelfDb {
    ShelfDb::new(test_backend().await, StoreSettings::default())
}

// ==========================
// MODEL BUILDERS
// ==========================

pub fn cabinet(number: u32, rows: Vec<Row>) -> Cabinet {
    Cabinet {
        number,
        position: Position { x: 100, y: 0, z: 0 },
        size: Size {
            width: Some(90),
            depth: None,
            height: 180,
        },
        rows,
    }
}

pub fn row(number: u32, lanes: Vec<Lane>) -> Row {
    Row {
        number,
        position_z: (number as i32 - 1) * 40,
        size: RowSize { height: 35 },
        lanes,
    }
}

pub fn lane(number: u32, jan_code: &str, quantity: u32) -> Lane {
    Lane {
        number,
        jan_code: jan_code.to_string(),
        quantity,
        position_x: (number as i32 - 1) * 10,
    }
}

pub fn product(jan_code: &str, name: &str) -> Product {
    Product {
        jan_code: jan_code.to_string(),
        name: name.to_string(),
        size: 2,
        shape: "Bottle".to_string(),
        image_url: format!("https://img.example/{jan_code}.png"),
        x: 0.07,
        y: 0.07,
        z: 0.21,
        timestamp: 1_700_000_000,
    }
}

pub fn at(cabinet: u32, row: u32, lane: u32) -> LaneAddress {
    LaneAddress::new(cabinet, row, lane)
}

/// Cabinet 1 with row 1 holding lanes [1: A x5, 2: B x3] and row 2 holding
/// lane [1: C x7]; cabinet 2 with row 1 holding lane [1: D x1].
pub async fn seeded_db() -> ShelfDb {
    let db = test_db().await;
    db.cabinets()
        .create_cabinets(vec![
            cabinet(
                1,
                vec![
                    row(1, vec![lane(1, "A", 5), lane(2, "B", 3)]),
                    row(2, vec![lane(1, "C", 7)]),
                ],
            ),
            cabinet(2, vec![row(1, vec![lane(1, "D", 1)])]),
        ])
        .await
        .expect("Failed to seed cabinets");
    db
}
