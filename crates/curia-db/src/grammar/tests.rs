use super::*;
use crate::query::{Aggregate, AggregateFunction};
use crate::value::{Value, raw};
use crate::{IntoIdent, table};

fn wrap(config: &GrammarConfig, name: &str) -> CompileResult<String> {
    Grammar::new(config).wrap(&name.into_ident())
}

#[test]
fn test_component_order() {
    let names: Vec<&str> = SELECT_COMPONENTS.iter().map(|c| c.as_str()).collect();
    assert_eq!(
        names,
        [
            "aggregate", "columns", "from", "joins", "wheres", "groups", "havings", "orders",
            "limit", "offset", "unions", "lock"
        ]
    );
}

#[test]
fn test_wrap_plain_and_dotted() {
    let config = GrammarConfig::new();
    assert_eq!(wrap(&config, "id").unwrap(), "`id`");
    assert_eq!(wrap(&config, "users.id").unwrap(), "`users`.`id`");
    assert_eq!(wrap(&config, "db.users.id").unwrap(), "`db`.`users`.`id`");
}

#[test]
fn test_wrap_star() {
    let config = GrammarConfig::new();
    assert_eq!(wrap(&config, "*").unwrap(), "*");
    assert_eq!(wrap(&config, "users.*").unwrap(), "`users`.*");
}

#[test]
fn test_wrap_alias() {
    let config = GrammarConfig::new();
    assert_eq!(wrap(&config, "name as n").unwrap(), "`name` as `n`");
    assert_eq!(wrap(&config, "users.name AS user_name").unwrap(), "`users`.`name` as `user_name`");
    // the alias is quoted as a single segment
    assert_eq!(wrap(&config, "a as b.c").unwrap(), "`a` as `b.c`");
}

#[test]
fn test_wrap_raw_is_verbatim() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    assert_eq!(grammar.wrap(&raw("count(*) as total").into_ident()).unwrap(), "count(*) as total");
    assert_eq!(grammar.wrap_table(&raw("(select 1) t").into_ident()).unwrap(), "(select 1) t");
}

#[test]
fn test_wrap_doubles_quote_character() {
    let config = GrammarConfig::new();
    assert_eq!(wrap(&config, "a`b").unwrap(), "`a``b`");

    let ansi = GrammarConfig::new().with_identifier_quote('"');
    assert_eq!(wrap(&ansi, "a\"b.c").unwrap(), "\"a\"\"b\".\"c\"");
    assert_eq!(wrap(&ansi, "a`b").unwrap(), "\"a`b\"");
}

#[test]
fn test_wrap_rejects_malformed_names() {
    let config = GrammarConfig::new();
    for bad in ["", "   ", "users.", ".id", "a..b", "name as ", "nu\0l", "a as b as c"] {
        let err = wrap(&config, bad).unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidIdentifier { .. }),
            "expected InvalidIdentifier for {bad:?}"
        );
    }
}

#[test]
fn test_wrap_table_prefix() {
    let config = GrammarConfig::new().with_table_prefix("app_");
    let grammar = Grammar::new(&config);
    assert_eq!(grammar.wrap_table(&"users".into_ident()).unwrap(), "`app_users`");
    assert_eq!(
        grammar.wrap_table(&"users as u".into_ident()).unwrap(),
        "`app_users` as `app_u`"
    );
    // columns: only the table segment is prefixed
    assert_eq!(grammar.wrap(&"users.id".into_ident()).unwrap(), "`app_users`.`id`");
    assert_eq!(grammar.wrap(&"id".into_ident()).unwrap(), "`id`");
}

#[test]
fn test_parameter() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    assert_eq!(grammar.parameter(&Param::Value(Value::Int(1))), "?");
    assert_eq!(grammar.parameter(&Param::Raw(raw("now()"))), "now()");
    assert_eq!(
        grammar.parameterize(&[
            Param::Value(Value::Int(1)),
            Param::Raw(raw("default")),
            Param::Value(Value::Null),
        ]),
        "?, default, ?"
    );
    assert_eq!(grammar.parameterize(&[]), "");
}

#[test]
fn test_columnize() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let columns = vec!["id".into_ident(), "users.name".into_ident(), raw("1 as one").into_ident()];
    assert_eq!(grammar.columnize(&columns).unwrap(), "`id`, `users`.`name`, 1 as one");
}

#[test]
fn test_remove_leading_boolean() {
    assert_eq!(remove_leading_boolean("and `a` = ?"), "`a` = ?");
    assert_eq!(remove_leading_boolean("or `a` = ? or `b` = ?"), "`a` = ? or `b` = ?");
    assert_eq!(remove_leading_boolean("AND x"), "x");
    assert_eq!(remove_leading_boolean("order = 1"), "order = 1");
    assert_eq!(remove_leading_boolean("é"), "é");
}

#[test]
fn test_count_placeholders() {
    assert_eq!(count_placeholders("select ?", '`'), 1);
    assert_eq!(count_placeholders("select '?', \"?\", `a?b`, ?", '`'), 1);
    assert_eq!(count_placeholders("select 'it''s ?' , ?", '`'), 1);
    assert_eq!(count_placeholders("select \"a?\" , ?", '"'), 1);
    assert_eq!(count_placeholders("select 1", '`'), 0);
}

#[test]
fn test_count_placeholders_backslash_escapes() {
    assert_eq!(count_placeholders(r"name = 'it\'s ?' and id = ?", '`'), 1);
    assert_eq!(count_placeholders(r#"note = "say \"?\"" and id = ?"#, '`'), 1);
    assert_eq!(count_placeholders(r"path = 'c:\\' and id = ?", '`'), 1);
    // no escaping inside quoted identifiers
    assert_eq!(count_placeholders(r"`a\` = ?", '`'), 1);
}

#[test]
fn test_aggregate_over_union_uses_derived_table() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let mut qb = table("a").select(["x"]).union_all(table("b").select(["x"]));
    qb.aggregate = Some(Aggregate {
        function: AggregateFunction::Sum,
        columns: vec!["x".into_ident()],
    });
    assert_eq!(
        grammar.compile_select(&qb).unwrap(),
        "select sum(`x`) as aggregate from (select `x` from `a` union all select `x` from `b`) as `temp_table`"
    );
}

#[test]
fn test_compile_components_individually() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let qb = table("users").where_("id", "=", 1).order_by("id", "desc").limit(3);

    assert_eq!(grammar.compile_component(&qb, SelectComponent::Columns).unwrap(), "select *");
    assert_eq!(grammar.compile_component(&qb, SelectComponent::From).unwrap(), "from `users`");
    assert_eq!(
        grammar.compile_component(&qb, SelectComponent::Wheres).unwrap(),
        "where `id` = ?"
    );
    assert_eq!(
        grammar.compile_component(&qb, SelectComponent::Orders).unwrap(),
        "order by `id` desc"
    );
    assert_eq!(grammar.compile_component(&qb, SelectComponent::Limit).unwrap(), "limit 3");
    assert_eq!(grammar.compile_component(&qb, SelectComponent::Offset).unwrap(), "");
    assert_eq!(grammar.compile_component(&qb, SelectComponent::Joins).unwrap(), "");
    assert_eq!(grammar.compile_component(&qb, SelectComponent::Lock).unwrap(), "");
}

#[test]
fn test_compile_select_free_fn() {
    let config = GrammarConfig::new().with_table_prefix("x_");
    let qb = table("users");
    assert_eq!(compile_select(&qb, &config).unwrap(), "select * from `x_users`");
}

#[test]
fn test_aggregate_supersedes_columns() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let mut qb = table("users").select(["id", "name"]);
    qb.aggregate = Some(Aggregate {
        function: AggregateFunction::Count,
        columns: vec![Ident::star()],
    });
    assert_eq!(
        grammar.compile_select(&qb).unwrap(),
        "select count(*) as aggregate from `users`"
    );
}

#[test]
fn test_aggregate_distinct() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);

    let mut qb = table("users").distinct();
    qb.aggregate = Some(Aggregate {
        function: AggregateFunction::Count,
        columns: vec!["email".into_ident()],
    });
    assert_eq!(
        grammar.compile_select(&qb).unwrap(),
        "select count(distinct `email`) as aggregate from `users`"
    );

    // distinct has no effect on `*`
    qb.aggregate = Some(Aggregate {
        function: AggregateFunction::Count,
        columns: vec![Ident::star()],
    });
    assert_eq!(
        grammar.compile_select(&qb).unwrap(),
        "select count(*) as aggregate from `users`"
    );
}

#[test]
fn test_compile_exists() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let qb = table("users").where_("id", "=", 1);
    assert_eq!(
        grammar.compile_exists(&qb).unwrap(),
        "select exists(select * from `users` where `id` = ?) as `exists`"
    );
}

#[test]
fn test_compile_where_single() {
    let config = GrammarConfig::new();
    let grammar = Grammar::new(&config);
    let qb = table("t").where_between("a", 1, 2);
    assert_eq!(grammar.compile_where(&qb.wheres()[0]).unwrap(), "`a` between ? and ?");
}

#[test]
fn test_operators_are_case_insensitive_and_trimmed() {
    let qb = table("users").where_("name", " LIKE ", "a%");
    assert_eq!(qb.to_sql().unwrap(), "select * from `users` where `name` LIKE ?");
}

#[test]
fn test_custom_operator_allow_list() {
    let config = GrammarConfig::new().with_operators(["="]).allow_operator("@>");
    let qb = crate::QueryBuilder::with_config(config)
        .from("docs")
        .where_("tags", "@>", "x");
    assert_eq!(qb.to_sql().unwrap(), "select * from `docs` where `tags` @> ?");

    let config = GrammarConfig::new().with_operators(["="]);
    let qb = crate::QueryBuilder::with_config(config).from("docs").where_("a", "<", 1);
    assert_eq!(qb.to_sql().unwrap_err(), CompileError::InvalidOperator("<".into()));
}

#[test]
fn test_grammar_is_shareable_across_threads() {
    let config = std::sync::Arc::new(GrammarConfig::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let config = std::sync::Arc::clone(&config);
            std::thread::spawn(move || {
                let qb = table(format!("t{i}")).where_("id", "=", i);
                compile_select(&qb, &config).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("select * from `t{i}` where `id` = ?"));
    }
}
