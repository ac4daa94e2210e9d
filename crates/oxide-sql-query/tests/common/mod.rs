#![allow(dead_code)]

use oxide_sql_query::builder::{Conflict, Merge, When};
use oxide_sql_query::expr::aggregate::{avg, count_all, sum};
use oxide_sql_query::expr::conditionals::{coalesce, nullif};
use oxide_sql_query::expr::functions::{at_time_zone, extract, substring, trim};
use oxide_sql_query::expr::operators::exists;
use oxide_sql_query::expr::window::{lag, rank};
use oxide_sql_query::expr::{Case, Frame, Grouping, Window};
use oxide_sql_query::{
    literal, Delete, Expr, Flavor, Insert, Render, RenderContext, SqlValue, Table, Update,
    Values, With, NULL,
};

pub fn render_with(node: &dyn Render, flavor: Flavor) -> (String, Vec<SqlValue>) {
    node.to_sql_with(&RenderContext::new(flavor))
        .unwrap_or_else(|e| panic!("Failed to render: {e}"))
}

pub fn render(node: &dyn Render) -> (String, Vec<SqlValue>) {
    render_with(node, Flavor::default())
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// Counts bind markers, ignoring the `%%` escape.
pub fn count_markers(sql: &str, marker: &str) -> usize {
    sql.replace("%%", "").matches(marker).count()
}

/// A named corpus of statements and expressions touching every clause.
pub fn corpus() -> Vec<(&'static str, Box<dyn Render>)> {
    let t = Table::new("t");
    let u = Table::new("u");
    let window = Window::new(vec![t.c("g")])
        .order_by(vec![t.c("d").desc()])
        .frame(Frame::Rows)
        .start(Some(-3))
        .end(Some(1));

    let select = t
        .left_join(&u)
        .on(t.c("id").eq(u.c("t_id")) & u.c("kind").like("a%"))
        .select(vec![
            t.c("a").as_("x"),
            (t.c("b") * 2 + 1).as_("y"),
            coalesce(vec![t.c("c"), 0.into()]),
            nullif(t.c("c"), "").as_("z"),
            Expr::from(
                Case::new()
                    .when(t.c("a").gt(10), "big")
                    .when(t.c("a").eq(NULL), NULL)
                    .otherwise("small"),
            ),
            rank(vec![], &window).into(),
            lag(vec![t.c("a"), 1.into()], &window).into(),
            Expr::from(avg(t.c("a")).filter(t.c("b").ne(NULL))).as_("m"),
        ])
        .where_clause(
            t.c("d").between(literal(1), 9)
                & t.c("e").in_(vec![Expr::from(1), 2.into(), 3.into()])
                & exists(u.select(vec![u.c("id")]).where_clause(u.c("x").eq(t.c("x")))),
        )
        .group_by(vec![Grouping::new(vec![vec![t.c("a")], vec![t.c("b")]]).into()])
        .having(Expr::from(count_all()).gt(1))
        .window(&window)
        .order_by(vec![t.c("a").nulls_first(), t.c("b").desc().nulls_last()])
        .limit(Some(20))
        .offset(Some(40));

    let functions = t.select(vec![
        trim(t.c("s")).into(),
        substring(vec![t.c("s"), 2.into(), 3.into()]).into(),
        extract(literal("YEAR"), t.c("d")).into(),
        at_time_zone(t.c("d"), "UTC").into(),
        Expr::from(sum(t.c("n")).distinct()).cast("BIGINT"),
        t.c("s").ilike("%x%"),
        (t.c("n") % 3).as_("r"),
    ]);

    let upsert = Insert::new(&t)
        .columns(vec![t.c("a"), t.c("b")])
        .and_then(|insert| {
            insert
                .values(vec![vec![1.into(), "x".into()], vec![2.into(), "y".into()]])
                .on_conflict(
                    Conflict::new(&t)
                        .indexed_columns(vec![t.c("a")])?
                        .update(vec![t.c("b")], vec![t.c("b").concat("!")])?
                        .where_clause(t.c("b").ne("z"))?,
                )
        })
        .map(|insert| insert.returning(vec![t.c("a")]))
        .unwrap_or_else(|e| panic!("invalid upsert: {e}"));

    let update = Update::new(&t, vec![t.c("a"), t.c("b")], vec![7.into(), u.c("b")])
        .unwrap_or_else(|e| panic!("invalid update: {e}"))
        .from(&u)
        .where_clause(t.c("id").eq(u.c("id")) & !t.c("locked").is(Some(true)));

    let delete = Delete::new(&t)
        .where_clause(t.c("a").not_in(u.select(vec![u.c("a")]).where_clause(u.c("z").lt(5))))
        .returning(vec![t.c("a")]);

    let source = Values::new(vec![vec![1.into(), "a".into()]]);
    let merge = Merge::new(&t, &source, t.c("a").eq(source.c("column1")))
        .unwrap_or_else(|e| panic!("invalid merge: {e}"))
        .when(
            When::matched_update(vec![t.c("b")], vec![source.c("column2")])
                .unwrap_or_else(|e| panic!("invalid when: {e}"))
                .and(t.c("b").ne(source.c("column2"))),
        )
        .when(
            When::not_matched_insert(vec![t.c("a"), t.c("b")], Some(vec![3.into(), "c".into()]))
                .unwrap_or_else(|e| panic!("invalid when: {e}")),
        );

    let union = (t.select(vec![t.c("a")]).where_clause(t.c("a").gt(1))
        | u.select(vec![u.c("a")]).where_clause(u.c("a").lt(2)))
    .order_by(vec![Expr::from(1).asc()])
    .limit(Some(5))
    .offset(Some(1));

    let upto = With::recursive(["n"], |n| {
        Values::new(vec![vec![1.into()]]).union_all(
            n.select(vec![n.c("n") + literal(1)])
                .where_clause(n.c("n").lt(literal(100))),
        )
    });
    let recursive = upto.select(vec![]).with(vec![upto.clone()]);

    vec![
        ("select", Box::new(select)),
        ("functions", Box::new(functions)),
        ("upsert", Box::new(upsert)),
        ("update", Box::new(update)),
        ("delete", Box::new(delete)),
        ("merge", Box::new(merge)),
        ("union", Box::new(union)),
        ("recursive", Box::new(recursive)),
    ]
}
