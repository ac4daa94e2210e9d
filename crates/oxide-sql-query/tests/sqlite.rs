//! Rendered statements executed against an in-memory SQLite database.

use oxide_sql_query::builder::Conflict;
use oxide_sql_query::expr::aggregate::count_all;
use oxide_sql_query::{
    Delete, Expr, Flavor, Insert, Render, RenderContext, SqlValue, Table, Update,
};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    sqlx::query(
        "CREATE TABLE items (name TEXT PRIMARY KEY, qty INTEGER NOT NULL, price REAL, \
         active BOOLEAN, added DATE)",
    )
    .execute(&pool)
    .await
    .expect("Failed to create table");
    pool
}

fn bind_param(query: Query<'_>, value: SqlValue) -> Query<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
        SqlValue::Date(d) => query.bind(d),
        SqlValue::Time(t) => query.bind(t),
        SqlValue::Timestamp(ts) => query.bind(ts),
    }
}

fn prepare(node: &dyn Render) -> anyhow::Result<(String, Vec<SqlValue>)> {
    Ok(node.to_sql_with(&RenderContext::new(Flavor::sqlite()))?)
}

async fn execute(pool: &SqlitePool, node: &dyn Render) -> anyhow::Result<u64> {
    let (sql, params) = prepare(node)?;
    let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
    Ok(query.execute(pool).await?.rows_affected())
}

async fn fetch(pool: &SqlitePool, node: &dyn Render) -> anyhow::Result<Vec<SqliteRow>> {
    let (sql, params) = prepare(node)?;
    let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
    Ok(query.fetch_all(pool).await?)
}

async fn seed(pool: &SqlitePool, items: &Table) -> anyhow::Result<()> {
    let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date");
    let insert = Insert::new(items)
        .columns(vec![
            items.c("name"),
            items.c("qty"),
            items.c("price"),
            items.c("active"),
            items.c("added"),
        ])?
        .values(vec![
            vec!["bolt".into(), 10.into(), 0.25.into(), true.into(), day.into()],
            vec!["nut".into(), 25.into(), 0.1.into(), true.into(), day.into()],
            vec!["gear".into(), 3.into(), Expr::from(None::<f64>), false.into(), day.into()],
        ]);
    assert_eq!(execute(pool, &insert).await?, 3);
    Ok(())
}

// ============================================================================
// Statements
// ============================================================================

#[tokio::test]
async fn test_insert_and_select() -> anyhow::Result<()> {
    let pool = create_test_pool().await;
    let items = Table::new("items");
    seed(&pool, &items).await?;

    let select = items
        .select(vec![items.c("name"), items.c("qty")])
        .where_clause(items.c("active").eq(true) & items.c("qty").gt(5))
        .order_by(vec![items.c("qty").desc()]);
    let rows = fetch(&pool, &select).await?;
    let names: Vec<String> = rows.iter().map(|row| row.get("name")).collect();
    assert_eq!(names, ["nut", "bolt"]);

    let missing_price = items
        .select(vec![items.c("name")])
        .where_clause(items.c("price").eq(None::<f64>));
    let rows = fetch(&pool, &missing_price).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get::<String, _>(0), "gear");
    Ok(())
}

#[tokio::test]
async fn test_pagination() -> anyhow::Result<()> {
    let pool = create_test_pool().await;
    let items = Table::new("items");
    seed(&pool, &items).await?;

    let ordered = || items.select(vec![items.c("name")]).order_by(vec![items.c("name").asc()]);

    let rows = fetch(&pool, &ordered().limit(Some(2)).offset(Some(1))).await?;
    let names: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
    assert_eq!(names, ["gear", "nut"]);

    let rows = fetch(&pool, &ordered().offset(Some(2))).await?;
    let names: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
    assert_eq!(names, ["nut"]);
    Ok(())
}

#[tokio::test]
async fn test_upsert_update_delete() -> anyhow::Result<()> {
    let pool = create_test_pool().await;
    let items = Table::new("items");
    seed(&pool, &items).await?;

    let conflict = Conflict::new(&items)
        .indexed_columns(vec![items.c("name")])?
        .update(vec![items.c("qty")], vec![items.c("qty") + 5])?;
    let upsert = Insert::new(&items)
        .columns(vec![items.c("name"), items.c("qty")])?
        .values(vec![vec!["bolt".into(), 1.into()]])
        .on_conflict(conflict)?;
    execute(&pool, &upsert).await?;

    let update = Update::new(&items, vec![items.c("active")], vec![true.into()])?
        .where_clause(items.c("name").eq("gear"));
    assert_eq!(execute(&pool, &update).await?, 1);

    let delete = Delete::new(&items).where_clause(items.c("qty").lt(5));
    assert_eq!(execute(&pool, &delete).await?, 1);

    let rows = fetch(
        &pool,
        &items
            .select(vec![items.c("qty")])
            .where_clause(items.c("name").eq("bolt")),
    )
    .await?;
    assert_eq!(rows[0].get::<i64, _>(0), 15);

    let total = items.select(vec![Expr::from(count_all()).as_("n")]);
    let rows = fetch(&pool, &total).await?;
    assert_eq!(rows[0].get::<i64, _>("n"), 2);
    Ok(())
}
