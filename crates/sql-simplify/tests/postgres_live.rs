use serde::Deserialize;
use serde_json::json;
use sql_simplify::{ColumnDef, Condition, OrmResult, Record, Schema, Table};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Deserialize, PartialEq)]
struct Person {
    id: i32,
    name: String,
    score: f32,
}

fn database_url(test: &str) -> Option<String> {
    match std::env::var("DATABASE_URL") {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn postgres_roundtrip() -> OrmResult<()> {
    let Some(database_url) = database_url("postgres_roundtrip") else {
        return Ok(());
    };

    let client = sql_simplify::connect(&database_url).await?;
    let table_name = unique_name("sql_simplify_people");

    let schema = Schema::new()
        .column("id", ColumnDef::integer().auto_increment().primary_key())
        .column("name", ColumnDef::string().default_value(""))
        .column("score", ColumnDef::float().default_value(0));
    let people = Table::new(table_name.as_str(), schema, client)?;

    people.create_table_in_db().await?;

    let ann = people
        .create(Record::new().with("name", "Ann").with("score", 1.5))
        .await?;
    let id = ann.get("id").and_then(|v| v.as_i64()).expect("generated id");
    people
        .create(Record::new().with("name", "O'Brien").with("score", 3))
        .await?;

    let found: Vec<Person> = people
        .find_by_as(&Condition::eq("name", "O'Brien"))
        .await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "O'Brien");

    people
        .update(&Record::new().with("score", 2.5), &Condition::eq("id", id))
        .await?;
    let all: Vec<Person> = people.find_all_as().await?;
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|p| p.id as i64 == id && p.score == 2.5));

    let out = people.delete(&Condition::eq("id", id)).await?;
    assert_eq!(out.affected_rows, 1);

    people
        .adapter()
        .query(&format!("DROP TABLE {table_name}"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn postgres_reads_types_outside_the_schema() -> OrmResult<()> {
    let Some(database_url) = database_url("postgres_reads_types_outside_the_schema") else {
        return Ok(());
    };

    let client = sql_simplify::connect(&database_url).await?;
    let items_name = unique_name("sql_simplify_items");
    let tags_name = unique_name("sql_simplify_tags");

    let items = Table::new(
        items_name.as_str(),
        Schema::new()
            .column("id", ColumnDef::integer().auto_increment().primary_key())
            .column("name", ColumnDef::string()),
        &client,
    )?;
    let tags = Table::new(
        tags_name.as_str(),
        Schema::new()
            .column("id", ColumnDef::integer().auto_increment().primary_key())
            .column("label", ColumnDef::string()),
        &client,
    )?;

    // Both use the default constraint name.
    items.create_table_in_db().await?;
    tags.create_table_in_db().await?;

    // Several statements in one string, with types the schema does not know.
    items
        .adapter()
        .query(&format!(
            "ALTER TABLE {items_name} ADD COLUMN price NUMERIC(10,2); \
             ALTER TABLE {items_name} ADD COLUMN at TIME"
        ))
        .await?;
    items
        .adapter()
        .query(&format!(
            "INSERT INTO {items_name} (name, price, at) VALUES ('pen', 12.50, '10:30')"
        ))
        .await?;

    let rows = items.find_all().await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&json!(1)));
    assert_eq!(rows[0].get("price"), Some(&json!("12.50")));
    assert_eq!(rows[0].get("at"), Some(&json!("10:30:00")));

    let found = items.find_by(&Condition::eq("name", "pen")).await?;
    assert_eq!(found, rows);

    items
        .adapter()
        .query(&format!("DROP TABLE {items_name}; DROP TABLE {tags_name}"))
        .await?;
    Ok(())
}
