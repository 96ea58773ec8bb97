//! ids-import - bulk data loader for the IDS database
//!
//! Loads the FAA preferred-route table, boundary crossings, and curated
//! routes from CSV files. Exact-duplicate rows are skipped (the FAA
//! exports carry plenty), and each import runs in one transaction so a
//! malformed file never leaves a half-loaded table.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ids_common::db::init_database;
use ids_common::normalize::{normalize_airport, normalize_route};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

mod records;

use records::{CrossingRecord, PrefRouteRecord, RouteRecord};

#[derive(Parser, Debug)]
#[command(name = "ids-import", about = "Bulk data loader for the IDS database")]
struct Args {
    /// SQLite database file
    #[arg(long, env = "IDS_DB", default_value = "ids.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import the FAA preferred-route table
    Prefroutes {
        /// CSV file (FAA NASR prefroutes export)
        file: PathBuf,
        /// Clear the table before importing
        #[arg(long)]
        replace: bool,
    },
    /// Import boundary crossing restrictions
    Crossings {
        file: PathBuf,
        #[arg(long)]
        replace: bool,
    },
    /// Import curated routes
    Routes {
        file: PathBuf,
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let pool = init_database(&args.database).await?;

    match args.command {
        Command::Prefroutes { file, replace } => import_prefroutes(&pool, &file, replace).await,
        Command::Crossings { file, replace } => import_crossings(&pool, &file, replace).await,
        Command::Routes { file, replace } => import_routes(&pool, &file, replace).await,
    }
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: T =
            result.with_context(|| format!("malformed row in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

async fn import_prefroutes(pool: &SqlitePool, file: &Path, replace: bool) -> Result<()> {
    let records: Vec<PrefRouteRecord> = read_records(file)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let mut tx = pool.begin().await?;
    if replace {
        sqlx::query("DELETE FROM faa_prefroutes").execute(&mut *tx).await?;
    }

    let mut inserted = 0usize;
    for record in records {
        if !seen.insert(record.dedup_key()) {
            continue;
        }
        sqlx::query(
            "INSERT INTO faa_prefroutes
             (orig, route_string, dest, hours, type, area, altitude, aircraft, direction, seq)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.orig.trim().to_uppercase())
        .bind(record.route_string.trim())
        .bind(record.dest.trim().to_uppercase())
        .bind(record.hours.trim())
        .bind(record.route_type.trim())
        .bind(record.area.trim())
        .bind(record.altitude.trim())
        .bind(record.aircraft.trim())
        .bind(record.direction.trim())
        .bind(record.seq.unwrap_or(0))
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }
    tx.commit().await?;

    info!(
        "imported {} FAA preferred routes ({} duplicate rows skipped)",
        inserted,
        total - inserted
    );
    Ok(())
}

async fn import_crossings(pool: &SqlitePool, file: &Path, replace: bool) -> Result<()> {
    let records: Vec<CrossingRecord> = read_records(file)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let mut tx = pool.begin().await?;
    if replace {
        sqlx::query("DELETE FROM crossings").execute(&mut *tx).await?;
    }

    let mut inserted = 0usize;
    for record in records {
        if !seen.insert(record.dedup_key()) {
            continue;
        }
        sqlx::query(
            "INSERT INTO crossings (destination, bdry_fix, restriction, notes, artcc)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(normalize_airport(&record.destination))
        .bind(record.bdry_fix.trim())
        .bind(record.restriction.trim())
        .bind(record.notes.trim())
        .bind(record.artcc.trim().to_uppercase())
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }
    tx.commit().await?;

    info!(
        "imported {} crossings ({} duplicate rows skipped)",
        inserted,
        total - inserted
    );
    Ok(())
}

async fn import_routes(pool: &SqlitePool, file: &Path, replace: bool) -> Result<()> {
    let records: Vec<RouteRecord> = read_records(file)?;
    let total = records.len();

    let mut seen = HashSet::new();
    let mut tx = pool.begin().await?;
    if replace {
        sqlx::query("DELETE FROM routes").execute(&mut *tx).await?;
    }

    let mut inserted = 0usize;
    for record in records {
        if !seen.insert(record.dedup_key()) {
            continue;
        }
        sqlx::query(
            "INSERT INTO routes (origin, destination, route, altitude, notes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(normalize_airport(&record.origin))
        .bind(normalize_airport(&record.destination))
        .bind(normalize_route(&record.route))
        .bind(record.altitude.trim())
        .bind(record.notes.trim())
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }
    tx.commit().await?;

    info!(
        "imported {} routes ({} duplicate rows skipped)",
        inserted,
        total - inserted
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ids_common::db::create_schema;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn routes_import_normalizes_and_skips_duplicates() {
        let pool = pool().await;
        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(
            &dir,
            "routes.csv",
            "origin,destination,route,altitude,notes\n\
             KCLE,KDTW,BONZZ  BONZZ2,,DTW south\n\
             KCLE,KDTW,BONZZ  BONZZ2,,DTW south\n\
             BUF,DTW,DONEO TPGUN2,,DTW south\n",
        );

        import_routes(&pool, &file, false).await.unwrap();

        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT origin, destination, route FROM routes ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ("CLE".into(), "DTW".into(), "BONZZ BONZZ2".into()));
        assert_eq!(rows[1].0, "BUF");
    }

    #[tokio::test]
    async fn replace_clears_the_table_first() {
        let pool = pool().await;
        sqlx::query(
            "INSERT INTO crossings (destination, bdry_fix, restriction, notes, artcc)
             VALUES ('EWR', 'SLT', 'AOB FL330', '', 'ZNY')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(
            &dir,
            "crossings.csv",
            "destination,bdry_fix,restriction,notes,artcc\n\
             KLGA,HAARP,AOB FL280,,ZNY\n",
        );
        import_crossings(&pool, &file, true).await.unwrap();

        let rows: Vec<(String,)> = sqlx::query_as("SELECT destination FROM crossings")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "LGA");
    }

    #[tokio::test]
    async fn malformed_csv_is_an_error() {
        let pool = pool().await;
        let dir = tempfile::tempdir().unwrap();
        let file = write_csv(
            &dir,
            "prefroutes.csv",
            "Orig,Route String,Dest,Seq\nCLE,\"unterminated\n",
        );
        assert!(import_prefroutes(&pool, &file, false).await.is_err());
    }
}
