//! Basic usage example for curia-db
//!
//! Run with: cargo run --example basic -p curia-db
//!
//! Optionally set CURIA_DB_PATH in .env or the environment to use a database
//! file instead of an in-memory database, and CURIA_DB_CONFIG to point at a
//! TOML grammar config:
//! CURIA_DB_PATH=/tmp/curia_example.sqlite

use colored::Colorize;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use curia_db::{
    Connection, GrammarConfig, LogConfig, LoggingConnection, QueryBuilder, QueryError, Row,
    SqliteConnection, table,
};
use std::env;
use std::sync::Arc;

fn print_rows(title: &str, rows: &[Row]) {
    println!("\n{}", title.bold().green());
    let Some(first) = rows.first() else {
        println!("{}", "(no rows)".dimmed());
        return;
    };

    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            first
                .columns()
                .iter()
                .map(|c| Cell::new(c).add_attribute(Attribute::Bold).fg(Color::Cyan)),
        );
    for row in rows {
        out.add_row(row.values().iter().map(|v| Cell::new(v.to_string())));
    }
    println!("{out}");
}

fn print_sql(qb: &QueryBuilder) -> Result<(), QueryError> {
    let compiled = qb.compile()?;
    println!("  {} {}", "sql:".yellow(), compiled.sql);
    let bindings: Vec<String> = compiled.bindings.iter().map(ToString::to_string).collect();
    println!("  {} [{}]", "bindings:".yellow(), bindings.join(", "));
    Ok(())
}

fn main() -> Result<(), QueryError> {
    dotenvy::dotenv().ok();

    let sqlite = match env::var("CURIA_DB_PATH") {
        Ok(path) => SqliteConnection::open(path)?,
        Err(_) => SqliteConnection::open_in_memory()?,
    };
    let config = match env::var("CURIA_DB_CONFIG") {
        Ok(path) => GrammarConfig::load(path)?,
        Err(_) => GrammarConfig::default(),
    };
    let config = Arc::new(config);
    let prefix = config.table_prefix.clone();

    sqlite.execute_batch(&format!(
        "
        drop table if exists {prefix}posts;
        drop table if exists {prefix}users;
        create table {prefix}users (
            id integer primary key,
            name text not null,
            email text,
            votes integer not null default 0
        );
        create table {prefix}posts (
            id integer primary key,
            user_id integer not null,
            title text not null
        );
        "
    ))?;

    let conn = LoggingConnection::new(sqlite).with_config(LogConfig::new().max_sql_length(120));

    let insert = format!("insert into {prefix}users (name, email, votes) values (?, ?, ?)");
    for (name, email, votes) in [
        ("alice", Some("alice@example.com"), 120),
        ("bob", None, 40),
        ("carol", Some("carol@example.com"), 75),
    ] {
        conn.insert(&insert, &[name.into(), email.into(), votes.into()])?;
    }
    conn.insert(
        &format!("insert into {prefix}posts (user_id, title) values (?, ?), (?, ?)"),
        &[1.into(), "Hello".into(), 3.into(), "Notes".into()],
    )?;

    let users = || QueryBuilder::with_shared_config(Arc::clone(&config)).from("users");

    // ============================================
    // Filtering and ordering
    // ============================================
    let popular = users()
        .select(["id", "name", "votes"])
        .where_nested(|q| q.where_("votes", ">", 50).or_where_null("email"))
        .order_by("votes", "desc");
    println!("{}", "=== where / order by ===".bold());
    print_sql(&popular)?;
    print_rows("popular or email-less users", &popular.get(&conn)?);

    // ============================================
    // Joins
    // ============================================
    let with_posts = users()
        .select(["users.name", "posts.title"])
        .join("posts", "users.id", "=", "posts.user_id")
        .order_by("posts.id", "asc");
    println!("\n{}", "=== join ===".bold());
    print_sql(&with_posts)?;
    print_rows("users with posts", &with_posts.get(&conn)?);

    // ============================================
    // Aggregates and scalars
    // ============================================
    println!("\n{}", "=== aggregates ===".bold());
    println!("  count: {}", users().count(&conn)?);
    println!("  max votes: {:?}", users().max(&conn, "votes")?);
    println!(
        "  bob's email: {:?}",
        users().where_("name", "=", "bob").value(&conn, "email")?
    );
    println!(
        "  anyone above 100 votes: {}",
        users().where_("votes", ">", 100).exists(&conn)?
    );

    // ============================================
    // Rendering only
    // ============================================
    println!("\n{}", "=== rendering only ===".bold());
    print_sql(
        &table("orders")
            .where_in("status", ["open", "pending"])
            .where_between("total", 10, 100)
            .group_by(["customer_id"])
            .having("total", ">", 50)
            .for_page(2, 25),
    )?;

    Ok(())
}
