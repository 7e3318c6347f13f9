// Normalized transactions: CRUD, the month-window query the dashboard feeds
// on, and the idempotent bulk import used by the CLI.
//
// Dates are zero-padded YYYY-MM-DD strings, so the inclusive month window is
// a plain lexical BETWEEN.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use super::parse_ts;
use crate::dashboard::Month;
use crate::entities::Transaction;

const TXN_COLUMNS: &str = "id, holding_account_id, profit_center_id, company_id, txn_date, \
                           amount_cents, currency, provider, external_id, description, \
                           raw_event_id, is_projected, created_at";

fn transaction_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        profit_center_id: row.get(2)?,
        company_id: row.get(3)?,
        txn_date: row.get(4)?,
        amount_cents: row.get(5)?,
        currency: row.get(6)?,
        provider: row.get(7)?,
        external_id: row.get(8)?,
        description: row.get(9)?,
        raw_event_id: row.get(10)?,
        is_projected: row.get(11)?,
        created_at: parse_ts(&row.get::<_, String>(12)?)?,
    })
}

pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO normalized_transactions
            (id, holding_account_id, profit_center_id, company_id, txn_date, amount_cents,
             currency, provider, external_id, description, raw_event_id, is_projected,
             created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            tx.id,
            tx.holding_account_id,
            tx.profit_center_id,
            tx.company_id,
            tx.txn_date,
            tx.amount_cents,
            tx.currency,
            tx.provider,
            tx.external_id,
            tx.description,
            tx.raw_event_id,
            tx.is_projected,
            tx.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// CRUD listing with optional filters, newest day first.
pub fn list_transactions(
    conn: &Connection,
    holding_account_id: Option<&str>,
    profit_center_id: Option<&str>,
    month: Option<Month>,
) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM normalized_transactions", TXN_COLUMNS);
    let mut clauses = Vec::new();
    let mut values: Vec<String> = Vec::new();
    if let Some(holding) = holding_account_id {
        clauses.push(format!("holding_account_id = ?{}", values.len() + 1));
        values.push(holding.to_string());
    }
    if let Some(pc) = profit_center_id {
        clauses.push(format!("profit_center_id = ?{}", values.len() + 1));
        values.push(pc.to_string());
    }
    if let Some(month) = month {
        let (start, end) = month.date_range();
        clauses.push(format!(
            "txn_date >= ?{} AND txn_date <= ?{}",
            values.len() + 1,
            values.len() + 2
        ));
        values.push(start);
        values.push(end);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY txn_date DESC, created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let transactions = stmt
        .query_map(rusqlite::params_from_iter(values), transaction_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(transactions)
}

/// One holding account's transactions inside a month window - the exact
/// input set the dashboard aggregator expects.
pub fn list_transactions_for_month(
    conn: &Connection,
    holding_account_id: &str,
    month: Month,
) -> Result<Vec<Transaction>> {
    let (start, end) = month.date_range();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM normalized_transactions
         WHERE holding_account_id = ?1 AND txn_date >= ?2 AND txn_date <= ?3",
        TXN_COLUMNS
    ))?;
    let transactions = stmt
        .query_map(params![holding_account_id, start, end], transaction_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(transactions)
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM normalized_transactions WHERE id = ?1",
        TXN_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], transaction_from_row)?;
    Ok(rows.next().transpose()?)
}

#[derive(Debug, Default)]
pub struct TransactionUpdate {
    pub txn_date: Option<String>,
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub is_projected: Option<bool>,
    pub profit_center_id: Option<String>,
    pub provider: Option<String>,
}

pub fn update_transaction(
    conn: &Connection,
    id: &str,
    update: &TransactionUpdate,
) -> Result<Option<Transaction>> {
    let Some(mut tx) = get_transaction(conn, id)? else {
        return Ok(None);
    };
    if let Some(date) = &update.txn_date {
        tx.txn_date = date.clone();
    }
    if let Some(cents) = update.amount_cents {
        tx.amount_cents = cents;
    }
    if let Some(description) = &update.description {
        tx.description = description.clone();
    }
    if let Some(projected) = update.is_projected {
        tx.is_projected = projected;
    }
    if let Some(pc) = &update.profit_center_id {
        tx.profit_center_id = pc.clone();
    }
    if let Some(provider) = &update.provider {
        tx.provider = provider.clone();
    }

    conn.execute(
        "UPDATE normalized_transactions
         SET txn_date = ?1, amount_cents = ?2, description = ?3, is_projected = ?4,
             profit_center_id = ?5, provider = ?6
         WHERE id = ?7",
        params![
            tx.txn_date,
            tx.amount_cents,
            tx.description,
            tx.is_projected,
            tx.profit_center_id,
            tx.provider,
            id,
        ],
    )?;
    Ok(Some(tx))
}

/// Transactions are the one hard-deletable entity.
pub fn delete_transaction(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM normalized_transactions WHERE id = ?1",
        params![id],
    )?;
    Ok(changed > 0)
}

/// Bulk import with idempotency hashes: re-running the same file inserts
/// nothing the second time. Returns (inserted, duplicates).
pub fn import_transactions(conn: &Connection, transactions: &[Transaction]) -> Result<(usize, usize)> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for tx in transactions {
        let hash = tx.compute_idempotency_hash();
        let result = conn.execute(
            "INSERT INTO normalized_transactions
                (id, holding_account_id, profit_center_id, company_id, txn_date, amount_cents,
                 currency, provider, external_id, description, raw_event_id, is_projected,
                 idempotency_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                tx.id,
                tx.holding_account_id,
                tx.profit_center_id,
                tx.company_id,
                tx.txn_date,
                tx.amount_cents,
                tx.currency,
                tx.provider,
                tx.external_id,
                tx.description,
                tx.raw_event_id,
                tx.is_projected,
                hash,
                tx.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => inserted += 1,
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                duplicates += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((inserted, duplicates))
}

/// Rows imported from a CSV line: `txn_date, profit_center_id, company_id,
/// amount_cents, description[, is_projected]`.
#[derive(Debug, serde::Deserialize)]
pub struct CsvTransactionRow {
    pub txn_date: String,
    pub profit_center_id: String,
    pub company_id: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_projected: bool,
}

/// Load manual transactions from a CSV file for one holding account.
pub fn load_transactions_csv(
    path: &std::path::Path,
    holding_account_id: &str,
) -> Result<Vec<Transaction>> {
    use anyhow::Context;

    let mut rdr = csv::Reader::from_path(path).context("Failed to open CSV file")?;
    let mut transactions = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvTransactionRow = result.context("Failed to deserialize transaction row")?;
        transactions.push(Transaction::new(
            holding_account_id.to_string(),
            row.profit_center_id,
            row.company_id,
            row.txn_date,
            row.amount_cents,
            Some("manual".to_string()),
            Some(row.description),
            row.is_projected,
        ));
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_in_memory;

    fn txn(pc: &str, date: &str, cents: i64) -> Transaction {
        Transaction::new(
            "ha-1".to_string(),
            pc.to_string(),
            "co-1".to_string(),
            date.to_string(),
            cents,
            None,
            Some(format!("{} {}", pc, date)),
            false,
        )
    }

    #[test]
    fn test_month_window_is_inclusive() {
        let conn = open_in_memory().unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-01-31", 100)).unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-02-01", 200)).unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-02-29", 300)).unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-03-01", 400)).unwrap();

        let month = Month { year: 2024, month: 2 };
        let in_month = list_transactions_for_month(&conn, "ha-1", month).unwrap();
        let cents: Vec<i64> = in_month.iter().map(|t| t.amount_cents).collect();
        assert_eq!(in_month.len(), 2);
        assert!(cents.contains(&200) && cents.contains(&300));
    }

    #[test]
    fn test_list_orders_newest_first_and_filters() {
        let conn = open_in_memory().unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-02-01", 100)).unwrap();
        insert_transaction(&conn, &txn("pc-2", "2024-02-15", 200)).unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-02-20", 300)).unwrap();

        let all = list_transactions(&conn, Some("ha-1"), None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].txn_date, "2024-02-20");

        let pc1 = list_transactions(&conn, Some("ha-1"), Some("pc-1"), None).unwrap();
        assert_eq!(pc1.len(), 2);

        let none = list_transactions(&conn, Some("ha-other"), None, None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_import_twice_inserts_no_duplicates() {
        let conn = open_in_memory().unwrap();
        let batch = vec![
            txn("pc-1", "2024-02-01", 10000),
            txn("pc-1", "2024-02-02", 5000),
            txn("pc-2", "2024-02-02", 7500),
        ];

        let (inserted1, dup1) = import_transactions(&conn, &batch).unwrap();
        assert_eq!((inserted1, dup1), (3, 0));

        // Same rows, fresh ids: the hash catches them anyway
        let rerun: Vec<Transaction> = batch
            .iter()
            .map(|t| {
                txn(&t.profit_center_id, &t.txn_date, t.amount_cents)
            })
            .collect();
        let (inserted2, dup2) = import_transactions(&conn, &rerun).unwrap();
        assert_eq!((inserted2, dup2), (0, 3));

        let all = list_transactions(&conn, Some("ha-1"), None, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_manual_inserts_skip_idempotency_hash() {
        let conn = open_in_memory().unwrap();
        // Two identical manual entries are legitimate (two sales, same amount)
        insert_transaction(&conn, &txn("pc-1", "2024-02-01", 100)).unwrap();
        insert_transaction(&conn, &txn("pc-1", "2024-02-01", 100)).unwrap();
        let all = list_transactions(&conn, None, None, None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let conn = open_in_memory().unwrap();
        let tx = txn("pc-1", "2024-02-01", 100);
        insert_transaction(&conn, &tx).unwrap();

        let update = TransactionUpdate {
            amount_cents: Some(250),
            is_projected: Some(true),
            ..Default::default()
        };
        let updated = update_transaction(&conn, &tx.id, &update).unwrap().unwrap();
        assert_eq!(updated.amount_cents, 250);
        assert!(updated.is_projected);
        assert_eq!(updated.txn_date, "2024-02-01");

        assert!(delete_transaction(&conn, &tx.id).unwrap());
        assert!(get_transaction(&conn, &tx.id).unwrap().is_none());
        assert!(!delete_transaction(&conn, &tx.id).unwrap());
    }
}
