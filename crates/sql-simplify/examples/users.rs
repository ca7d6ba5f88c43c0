//! Walk through every table operation against Postgres.
//!
//! Run with: `DATABASE_URL=postgres://... cargo run --example users`

use sql_simplify::{
    ColumnDef, Condition, Join, JoinType, OrmResult, Record, Schema, Table, create_pool,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let pool = create_pool(&database_url)?;

    let users = Table::new(
        "users",
        Schema::new()
            .column("id", ColumnDef::integer().auto_increment().primary_key())
            .column("name", ColumnDef::string().default_value(""))
            .column("email", ColumnDef::string().default_value("")),
        pool.clone(),
    )?;
    let orders = Table::new(
        "orders",
        Schema::from_json_str(
            r#"{
                "id": { "type": "integer", "autoInc": true, "primary_key": true },
                "user_id": { "type": "integer" },
                "total": { "type": "float", "default": 0 }
            }"#,
        )?,
        pool,
    )?;

    run(&users, &orders).await?;
    Ok(())
}

async fn run<C: sql_simplify::Connection>(users: &Table<C>, orders: &Table<C>) -> OrmResult<()> {
    users.create_table_in_db().await?;
    orders.create_table_in_db().await?;

    let john = users
        .create(
            Record::new()
                .with("name", "John Doe")
                .with("email", "john@example.com"),
        )
        .await?;
    println!("created: {john:?}");

    let john_id = john.get("id").cloned().unwrap_or_default();
    orders
        .create(Record::new().with("user_id", john_id.clone()).with("total", 42.5))
        .await?;

    println!("all users: {:?}", users.find_all().await?);
    println!(
        "by email: {:?}",
        users
            .find_by(&Condition::eq("email", "john@example.com"))
            .await?
    );

    let joined = users
        .get_by_join(
            &Join::new("orders", "user_id", "id")
                .get(["users.name", "orders.total"])
                .join_type(JoinType::Left)
                .condition(Condition::eq("users.id", john_id.clone())),
        )
        .await?;
    println!("joined: {joined:?}");

    users
        .update(
            &Record::new().with("name", "John Smith"),
            &Condition::eq("id", john_id.clone()),
        )
        .await?;
    orders.delete(&Condition::eq("user_id", john_id.clone())).await?;
    users.delete(&Condition::eq("id", john_id)).await?;
    Ok(())
}
