//! # Orders Demo
//!
//! Runs a short demonstration against a database file: adds, updates and
//! deletes a few orders, prints lookups, then the position aggregates.
//!
//! ## Usage
//! ```bash
//! # Uses ORDERS_DB_PATH or ./orders.db
//! cargo run -p orders-db --bin orders-demo
//!
//! # Specify database path, start from empty tables
//! cargo run -p orders-db --bin orders-demo -- --db ./data/demo.db --reset
//!
//! # Print lookups as JSON
//! cargo run -p orders-db --bin orders-demo -- --json
//! ```
//!
//! Failures of individual steps are printed and the sequence continues,
//! so a second run shows the duplicate-id errors of the plain `add`s.

use std::env;
use std::error::Error;

use chrono::NaiveDate;
use orders_core::{Order, Position};
use orders_db::{Database, DbConfig, RepoResult, Repository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let mut config = DbConfig::from_env()?;
    let mut json = false;
    let mut reset = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--json" => json = true,
            "--reset" => reset = true,
            "--help" | "-h" => {
                println!("Orders Store Demo");
                println!();
                println!("Usage: orders-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $ORDERS_DB_PATH or ./orders.db)");
                println!("      --reset        Drop and recreate the tables first");
                println!("      --json         Print fetched orders as JSON");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    println!("Database: {}", config.database_path.display());

    let db = Database::new(config).await?;
    if reset {
        db.reset_schema().await?;
        println!("Tables reset");
    }
    println!();

    let demo = Demo { db, json };

    demo.step("update order 1", |db| async move {
        let mut repo = db.orders().await?;
        repo.update(&first_order(1000)).await?;
        repo.complete();
        repo.close().await
    })
    .await;
    demo.show(1).await;

    demo.step("add order 2", |db| async move {
        let mut repo = db.orders().await?;
        repo.add(
            &Order::new(2).with_date(date(2016, 1, 18)).with_positions(vec![
                Position::new("ZA965", "jackets", 300, 102.50),
                Position::new("KS878", "trousers", 400, 63.60),
            ]),
        )
        .await?;
        repo.complete();
        repo.close().await
    })
    .await;
    demo.show(2).await;

    demo.step("add order 3", |db| async move {
        let mut repo = db.orders().await?;
        repo.add(
            &Order::new(3).with_date(date(2016, 1, 18)).with_positions(vec![
                Position::new("ZA965", "coats", 500, 150.50),
                Position::new("KS878", "outer_jackets", 500, 140.60),
            ]),
        )
        .await?;
        repo.complete();
        repo.close().await
    })
    .await;
    demo.show(3).await;

    demo.step("update order 1 quantities", |db| async move {
        let mut repo = db.orders().await?;
        repo.update(&first_order(1500)).await?;
        repo.complete();
        repo.close().await
    })
    .await;
    demo.show(1).await;

    demo.step("delete order 3", |db| async move {
        let mut repo = db.orders().await?;
        repo.delete(&Order::new(3)).await?;
        repo.complete();
        repo.close().await
    })
    .await;

    println!();
    demo.stats().await;

    Ok(())
}

/// Only ever called with literal calendar dates.
fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("demo dates are valid calendar dates")
}

fn first_order(qty: i64) -> Order {
    Order::new(1).with_date(date(2016, 1, 19)).with_positions(vec![
        Position::new("KX977", "t-shirts_s_s", qty, 5.50),
        Position::new("KY878", "t-shirts_l_s", qty, 10.20),
    ])
}

struct Demo {
    db: Database,
    json: bool,
}

impl Demo {
    /// Runs one step in its own unit-of-work and reports a failure.
    async fn step<F, Fut>(&self, name: &str, f: F)
    where
        F: FnOnce(Database) -> Fut,
        Fut: std::future::Future<Output = RepoResult<()>>,
    {
        if let Err(e) = f(self.db.clone()).await {
            report(name, &e);
        }
    }

    async fn show(&self, id: i64) {
        let fetched = async {
            let mut repo = self.db.orders().await?;
            let order = repo.get_by_id(id).await?;
            repo.close().await?;
            RepoResult::Ok(order)
        }
        .await;

        match fetched {
            Ok(Some(order)) if self.json => match serde_json::to_string_pretty(&order) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("cannot serialize order {id}: {e}"),
            },
            Ok(Some(order)) => println!("{order}"),
            Ok(None) => println!("order {id}: not found"),
            Err(e) => report("get order", &e),
        }
    }

    async fn stats(&self) {
        let stats = async {
            let mut repo = self.db.positions().await?;
            let mean = repo.mean_quantity().await?;
            let spread = repo.min_mean_max_cost_price().await?;
            repo.close().await?;
            RepoResult::Ok((mean, spread))
        }
        .await;

        match stats {
            Ok((mean, spread)) => {
                match mean {
                    Some(mean) => println!("Average qty of position: {mean:.0}"),
                    None => println!("Average qty of position: no positions"),
                }
                match spread {
                    Some(s) => println!(
                        "MIN, MEAN, MAX costprice of position: ({}, {}, {})",
                        s.min, s.mean, s.max
                    ),
                    None => println!("MIN, MEAN, MAX costprice of position: no positions"),
                }
            }
            Err(e) => report("position stats", &e),
        }
    }
}

fn report(step: &str, err: &dyn Error) {
    eprintln!("{step} failed: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_order_dates_and_totals() {
        let order = first_order(1500);
        assert_eq!(order.date().to_string(), "2016-01-19");
        assert_eq!(order.qty(), 3000);
        assert_eq!(date(2016, 1, 18).to_string(), "2016-01-18");
    }
}
