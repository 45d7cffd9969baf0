#![cfg(feature = "sqlite")]

use curia_db::{
    Connection, FromRow, GrammarConfig, JoinType, LogConfig, LoggingConnection, QueryBuilder,
    QueryResult, Row, SqliteConnection, Value, raw, table,
};

fn seeded() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().unwrap();
    conn.execute_batch(
        "
        create table users (
            id integer primary key,
            name text not null,
            email text,
            votes integer not null,
            role text not null,
            created_at text not null
        );
        create table posts (
            id integer primary key,
            user_id integer not null,
            title text not null,
            published integer not null
        );
        insert into users values
            (1, 'alice', 'alice@example.com', 10, 'admin', '2024-01-01 10:00:00'),
            (2, 'bob', 'bob@example.com', 50, 'user', '2024-02-01 10:00:00'),
            (3, 'carol', 'carol@example.com', 100, 'user', '2024-03-01 10:00:00'),
            (4, 'dave', null, 0, 'guest', '2024-04-01 10:00:00');
        insert into posts values
            (1, 1, 'Hello', 1),
            (2, 1, 'Draft', 0),
            (3, 2, 'Bob''s post', 1);
        ",
    )
    .unwrap();
    conn
}

fn names(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r.try_get::<String>("name").unwrap()).collect()
}

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }
}

#[test]
fn get_filters_and_orders() {
    let conn = seeded();
    let rows = table("users")
        .where_("votes", ">", 20)
        .order_by("name", "desc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["carol", "bob"]);
}

#[test]
fn get_columns_leaves_builder_untouched() {
    let conn = seeded();
    let qb = table("users").where_("id", "=", 1);
    let rows = qb.get_columns(&conn, ["id", "name"]).unwrap();
    assert_eq!(rows[0].columns(), &["id", "name"]);
    assert!(qb.columns().is_none());

    let rows = qb.get(&conn).unwrap();
    assert_eq!(rows[0].len(), 6);
}

#[test]
fn find_first_and_value() {
    let conn = seeded();
    let carol = table("users").find(&conn, 3).unwrap().unwrap();
    assert_eq!(carol.try_get::<String>("name").unwrap(), "carol");

    assert!(table("users").find(&conn, 99).unwrap().is_none());

    let email = table("users").where_("id", "=", 1).value(&conn, "email").unwrap();
    assert_eq!(email, Some(Value::Text("alice@example.com".into())));

    let first = table("users").order_by_desc("votes").first(&conn).unwrap().unwrap();
    assert_eq!(first.try_get::<i64>("id").unwrap(), 3);
}

#[test]
fn value_honours_existing_selection() {
    let conn = seeded();
    let qb = table("users").select(["id", "name"]).where_("id", "=", 2);
    assert_eq!(qb.value(&conn, "name").unwrap(), Some(Value::Text("bob".into())));
    assert_eq!(qb.value(&conn, "users.id").unwrap(), Some(Value::Int(2)));
}

#[test]
fn aggregates_over_unions() {
    let conn = seeded();
    let ids = table("users")
        .select(["id"])
        .where_("id", "=", 1)
        .union(table("users").select(["id"]).where_("id", "=", 2));
    assert_eq!(ids.get(&conn).unwrap().len(), 2);
    assert_eq!(ids.count(&conn).unwrap(), 2);
    assert_eq!(ids.max(&conn, "id").unwrap(), Some(Value::Int(2)));

    let roles = || table("users").select(["role"]);
    assert_eq!(roles().union(roles()).count(&conn).unwrap(), 3);
    assert_eq!(roles().union_all(roles()).count(&conn).unwrap(), 8);

    let votes = table("users")
        .select(["votes"])
        .where_("role", "=", "admin")
        .union_all(table("users").select(["votes"]).where_("role", "=", "guest"));
    assert_eq!(votes.max(&conn, "votes").unwrap(), Some(Value::Int(10)));
    assert_eq!(votes.sum(&conn, "votes").unwrap(), Some(Value::Int(10)));
}

#[test]
fn first_and_exists_over_unions() {
    let conn = seeded();
    let names = table("users")
        .select(["name"])
        .where_("id", "=", 3)
        .union(table("users").select(["name"]).where_("id", "=", 1))
        .order_by("name", "asc");
    let first = names.first(&conn).unwrap().unwrap();
    assert_eq!(first.try_get::<String>("name").unwrap(), "alice");
    assert_eq!(names.get(&conn).unwrap().len(), 2);

    assert!(names.exists(&conn).unwrap());
    let missing = table("users")
        .where_("id", "=", 98)
        .union(table("users").where_("id", "=", 99));
    assert!(missing.doesnt_exist(&conn).unwrap());
}

#[test]
fn aggregates() {
    let conn = seeded();
    assert_eq!(table("users").count(&conn).unwrap(), 4);
    assert_eq!(table("users").where_("role", "=", "user").count(&conn).unwrap(), 2);
    assert_eq!(table("users").max(&conn, "votes").unwrap(), Some(Value::Int(100)));
    assert_eq!(table("users").min(&conn, "votes").unwrap(), Some(Value::Int(0)));
    assert_eq!(table("users").sum(&conn, "votes").unwrap(), Some(Value::Int(160)));
    assert_eq!(table("users").avg(&conn, "votes").unwrap(), Some(Value::Float(40.0)));
    assert_eq!(table("users").where_("id", ">", 100).max(&conn, "votes").unwrap(), None);
    assert_eq!(table("users").distinct().count(&conn).unwrap(), 4);
}

#[test]
fn exists_and_doesnt_exist() {
    let conn = seeded();
    assert!(table("users").where_("name", "=", "bob").exists(&conn).unwrap());
    assert!(table("users").where_("name", "=", "zoe").doesnt_exist(&conn).unwrap());
}

#[test]
fn null_and_in_predicates() {
    let conn = seeded();
    let rows = table("users").where_null("email").get(&conn).unwrap();
    assert_eq!(names(&rows), ["dave"]);

    let rows = table("users").where_("email", "=", None::<String>).get(&conn).unwrap();
    assert_eq!(names(&rows), ["dave"]);

    assert!(table("users").where_in("id", Vec::<i64>::new()).get(&conn).unwrap().is_empty());
    assert_eq!(table("users").where_not_in("id", Vec::<i64>::new()).get(&conn).unwrap().len(), 4);

    let rows = table("users").where_in("id", [2, 4]).order_by("id", "asc").get(&conn).unwrap();
    assert_eq!(names(&rows), ["bob", "dave"]);
}

#[test]
fn nested_where_groups() {
    let conn = seeded();
    let rows = table("users")
        .where_nested(|q| q.where_("role", "=", "admin").or_where("votes", ">=", 100))
        .where_("email", "like", "%example.com")
        .order_by("id", "asc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["alice", "carol"]);
}

#[test]
fn joins() {
    let conn = seeded();
    let rows = table("users")
        .select(["users.name", "posts.title"])
        .join("posts", "users.id", "=", "posts.user_id")
        .where_("posts.published", "=", true)
        .order_by("posts.id", "asc")
        .get(&conn)
        .unwrap();
    let pairs: Vec<(String, String)> = rows
        .iter()
        .map(|r| (r.try_get("name").unwrap(), r.try_get("title").unwrap()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("alice".to_string(), "Hello".to_string()),
            ("bob".to_string(), "Bob's post".to_string())
        ]
    );

    let rows = table("users")
        .select(["users.name"])
        .left_join("posts", "users.id", "=", "posts.user_id")
        .where_null("posts.id")
        .order_by("users.id", "asc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["carol", "dave"]);

    let rows = table("users as u")
        .select(["u.name"])
        .join_with(JoinType::Inner, "posts as p", |j| {
            j.on("u.id", "=", "p.user_id").where_("p.published", "=", 0)
        })
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["alice"]);
}

#[test]
fn sub_selects() {
    let conn = seeded();
    let published = table("posts").select(["user_id"]).where_("published", "=", 1);
    let rows = table("users")
        .where_in_sub("id", published)
        .order_by("id", "asc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["alice", "bob"]);

    let rows = table("users")
        .where_not_exists(table("posts").where_column("posts.user_id", "=", "users.id"))
        .order_by("id", "asc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["carol", "dave"]);

    let rows = table("users")
        .where_sub("votes", "=", table("users").select_raw("max(votes)", Vec::<Value>::new()))
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["carol"]);
}

#[test]
fn group_by_having() {
    let conn = seeded();
    let rows = table("posts")
        .select(["user_id"])
        .add_select([raw("count(*) as total")])
        .group_by(["user_id"])
        .having_raw("count(*) > ?", [1])
        .get(&conn)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].try_get::<i64>("user_id").unwrap(), 1);
    assert_eq!(rows[0].try_get::<i64>("total").unwrap(), 2);
}

#[test]
fn unions_and_paging() {
    let conn = seeded();
    let rows = table("users")
        .select(["name"])
        .where_("role", "=", "admin")
        .union_all(table("users").select(["name"]).where_("role", "=", "guest"))
        .order_by("name", "desc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["dave", "alice"]);

    let rows = table("users").order_by("id", "asc").for_page(2, 2).get(&conn).unwrap();
    assert_eq!(names(&rows), ["carol", "dave"]);
}

#[test]
fn date_predicates() {
    let conn = seeded();
    let rows = table("users")
        .where_date("created_at", ">=", "2024-03-01")
        .order_by("id", "asc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["carol", "dave"]);
}

#[test]
fn fetch_into_structs() {
    let conn = seeded();
    let users: Vec<User> = table("users")
        .where_("id", "<=", 2)
        .order_by("id", "asc")
        .fetch_all(&conn)
        .unwrap();
    assert_eq!(
        users[0],
        User {
            id: 1,
            name: "alice".into(),
            email: Some("alice@example.com".into())
        }
    );
    assert_eq!(users.len(), 2);

    let row = table("users")
        .find_columns(&conn, 4, ["id", "name", "email"])
        .unwrap()
        .unwrap();
    let dave = User::from_row(&row).unwrap();
    assert_eq!(dave.email, None);

    let err = table("users").where_("id", "=", 99).fetch_one::<User>(&conn).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn table_prefix_resolves_against_real_tables() {
    let conn = SqliteConnection::open_in_memory().unwrap();
    conn.execute_batch(
        "create table app_users (id integer primary key, name text);
         insert into app_users (name) values ('alice'), ('bob');",
    )
    .unwrap();
    let config = GrammarConfig::new().with_table_prefix("app_");
    let rows = QueryBuilder::with_config(config)
        .from("users as u")
        .select(["u.name"])
        .order_by("u.id", "desc")
        .get(&conn)
        .unwrap();
    assert_eq!(names(&rows), ["bob", "alice"]);
}

#[test]
fn logging_connection_is_transparent() {
    let conn = LoggingConnection::new(seeded()).with_config(LogConfig::new().no_truncate());
    assert_eq!(table("users").count(&conn).unwrap(), 4);
    let n = conn
        .update("update users set votes = votes + ? where id = ?", &[Value::Int(1), Value::Int(1)])
        .unwrap();
    assert_eq!(n, 1);
    let votes = table("users").where_("id", "=", 1).value(&conn, "votes").unwrap();
    assert_eq!(votes, Some(Value::Int(11)));
}

#[test]
fn compile_errors_do_not_reach_the_database() {
    let conn = seeded();
    let err = table("users").where_("id", "==", 1).get(&conn).unwrap_err();
    assert!(err.is_compile_error());
}
