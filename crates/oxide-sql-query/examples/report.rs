//! Example: Monthly Sales Report
//!
//! Builds one reporting query and prints it for several databases: a
//! correlated subquery, a window function, an aggregate filter and
//! pagination, all from the same query object.
//!
//! Run with: cargo run --example report -p oxide-sql-query

use oxide_sql_query::expr::aggregate::{count_all, sum};
use oxide_sql_query::expr::functions::date_trunc;
use oxide_sql_query::expr::window::rank;
use oxide_sql_query::expr::Window;
use oxide_sql_query::{format2numeric, literal, Expr, Flavor, Render, Select, Table};

// =============================================================================
// Query
// =============================================================================

fn monthly_report(min_total: i64) -> Select {
    let customer = Table::new("customer");
    let invoice = Table::new("invoice");
    let payment = Table::new("payment");

    let month: Expr = date_trunc(literal("month"), invoice.c("issued_at")).into();
    let total: Expr = sum(invoice.c("amount")).into();
    let by_month = Window::new(vec![month.clone()]).order_by(vec![total.clone().desc()]);

    let payments = payment
        .select(vec![Expr::from(count_all())])
        .where_clause(payment.c("customer_id").eq(customer.c("id")));

    customer
        .join(&invoice)
        .on(invoice.c("customer_id").eq(customer.c("id")))
        .select(vec![
            customer.c("name"),
            month.clone().as_("month"),
            total.clone().as_("total"),
            Expr::from(sum(invoice.c("amount")).filter(invoice.c("paid").eq(false))).as_("unpaid"),
            Expr::from(rank(vec![], &by_month)).as_("rank"),
            Expr::from(payments).as_("payments"),
        ])
        .where_clause(customer.c("active").eq(true))
        .group_by(vec![customer.c("name"), month])
        .having(total.ge(min_total))
        .order_by(vec![customer.c("name").asc()])
        .limit(Some(20))
        .offset(Some(40))
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let report = monthly_report(1_000);

    let flavors = [
        ("postgresql", Flavor::postgresql()),
        ("sqlite", Flavor::sqlite()),
        ("sql server", Flavor::mssql()),
        ("oracle", Flavor::oracle()),
        (
            "from config",
            Flavor::from_json(r#"{"limit_style": "fetch", "filter": true}"#)?,
        ),
    ];

    for (name, flavor) in flavors {
        Flavor::set(flavor);
        let (sql, params) = report.build()?;
        println!("-- {name}");
        println!("{sql}");
        println!("-- params: {}", serde_json::to_string(&params)?);
        println!();
    }

    Flavor::set(Flavor::default());
    let (sql, params) = report.build()?;
    let (numbered, _) = format2numeric(&sql, params)?;
    println!("-- numbered");
    println!("{numbered}");

    Ok(())
}
