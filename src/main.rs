// CLI entry point: bulk CSV import and a database summary.
// The web server lives in bin/server.rs behind the `server` feature.

use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};

use fishing_poles::store::{
    import_transactions, load_transactions_csv, open_database, table_counts,
};

fn db_path() -> PathBuf {
    env::var("POLES_DB")
        .unwrap_or_else(|_| "poles.db".to_string())
        .into()
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&args[2..]),
        Some("summary") => run_summary(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  fishing-poles import <transactions.csv> <holding_account_id>");
            eprintln!("  fishing-poles summary");
            eprintln!();
            eprintln!("Database path comes from POLES_DB (default: poles.db)");
            std::process::exit(1);
        }
    }
}

fn run_import(args: &[String]) -> Result<()> {
    let [csv_path, holding_account_id] = args else {
        bail!("import requires <transactions.csv> <holding_account_id>");
    };

    println!("📂 Loading CSV...");
    let transactions = load_transactions_csv(Path::new(csv_path), holding_account_id)?;
    println!("✓ Loaded {} transactions from CSV", transactions.len());

    println!("\n🔧 Opening database...");
    let conn = open_database(&db_path())?;
    println!("✓ Database ready (WAL mode)");

    println!("\n💾 Importing transactions...");
    let (inserted, duplicates) = import_transactions(&conn, &transactions)?;
    println!("✓ Inserted: {}", inserted);
    println!("✓ Duplicates skipped: {}", duplicates);

    Ok(())
}

fn run_summary() -> Result<()> {
    let conn = open_database(&db_path())?;

    println!("📊 Database summary ({:?})", db_path());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (table, count) in table_counts(&conn)? {
        println!("  {:<26} {}", table, count);
    }

    Ok(())
}
