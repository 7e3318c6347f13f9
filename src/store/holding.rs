// Holding accounts, companies and profit centers. Companies and profit
// centers are soft-deleted (active = 0) and batch-reordered; the dashboard
// only ever sees the active rows, ordered by display_order.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::parse_ts;
use crate::entities::{Company, HoldingAccount, ProfitCenter};

// ============================================================================
// HOLDING ACCOUNTS
// ============================================================================

fn holding_account_from_row(row: &Row) -> rusqlite::Result<HoldingAccount> {
    Ok(HoldingAccount {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_ts(&row.get::<_, String>(2)?)?,
        updated_at: parse_ts(&row.get::<_, String>(3)?)?,
    })
}

pub fn insert_holding_account(conn: &Connection, account: &HoldingAccount) -> Result<()> {
    conn.execute(
        "INSERT INTO holding_accounts (id, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            account.id,
            account.name,
            account.created_at.to_rfc3339(),
            account.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_holding_accounts(conn: &Connection) -> Result<Vec<HoldingAccount>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at, updated_at FROM holding_accounts ORDER BY created_at",
    )?;
    let accounts = stmt
        .query_map([], holding_account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn get_holding_account(conn: &Connection, id: &str) -> Result<Option<HoldingAccount>> {
    let mut stmt =
        conn.prepare("SELECT id, name, created_at, updated_at FROM holding_accounts WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], holding_account_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn rename_holding_account(
    conn: &Connection,
    id: &str,
    name: &str,
) -> Result<Option<HoldingAccount>> {
    conn.execute(
        "UPDATE holding_accounts SET name = ?1, updated_at = ?2 WHERE id = ?3",
        params![name, Utc::now().to_rfc3339(), id],
    )?;
    get_holding_account(conn, id)
}

// ============================================================================
// COMPANIES
// ============================================================================

fn company_from_row(row: &Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        display_order: row.get(4)?,
        active: row.get(5)?,
        created_at: parse_ts(&row.get::<_, String>(6)?)?,
        updated_at: parse_ts(&row.get::<_, String>(7)?)?,
    })
}

const COMPANY_COLUMNS: &str =
    "id, holding_account_id, name, color, display_order, active, created_at, updated_at";

pub fn insert_company(conn: &Connection, company: &Company) -> Result<()> {
    conn.execute(
        "INSERT INTO companies (id, holding_account_id, name, color, display_order, active,
                                created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            company.id,
            company.holding_account_id,
            company.name,
            company.color,
            company.display_order,
            company.active,
            company.created_at.to_rfc3339(),
            company.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All companies (active or not) for the CRUD surface, ordered for display.
pub fn list_companies(conn: &Connection, holding_account_id: Option<&str>) -> Result<Vec<Company>> {
    let companies = match holding_account_id {
        Some(holding) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM companies WHERE holding_account_id = ?1 ORDER BY display_order",
                COMPANY_COLUMNS
            ))?;
            let rows = stmt.query_map(params![holding], company_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM companies ORDER BY display_order",
                COMPANY_COLUMNS
            ))?;
            let rows = stmt.query_map([], company_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(companies)
}

/// Active companies only - the dashboard's view.
pub fn list_active_companies(conn: &Connection, holding_account_id: &str) -> Result<Vec<Company>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies
         WHERE holding_account_id = ?1 AND active != 0
         ORDER BY display_order",
        COMPANY_COLUMNS
    ))?;
    let companies = stmt
        .query_map(params![holding_account_id], company_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(companies)
}

pub fn get_company(conn: &Connection, id: &str) -> Result<Option<Company>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies WHERE id = ?1",
        COMPANY_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], company_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn count_companies(conn: &Connection, holding_account_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM companies WHERE holding_account_id = ?1",
        params![holding_account_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Fields a PUT may change; None leaves the stored value alone.
#[derive(Debug, Default)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub display_order: Option<i64>,
    pub active: Option<bool>,
}

pub fn update_company(
    conn: &Connection,
    id: &str,
    update: &CompanyUpdate,
) -> Result<Option<Company>> {
    let Some(mut company) = get_company(conn, id)? else {
        return Ok(None);
    };
    if let Some(name) = &update.name {
        company.name = name.clone();
    }
    if let Some(color) = &update.color {
        company.color = color.clone();
    }
    if let Some(order) = update.display_order {
        company.display_order = order;
    }
    if let Some(active) = update.active {
        company.active = active;
    }
    company.updated_at = Utc::now();

    conn.execute(
        "UPDATE companies
         SET name = ?1, color = ?2, display_order = ?3, active = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            company.name,
            company.color,
            company.display_order,
            company.active,
            company.updated_at.to_rfc3339(),
            id,
        ],
    )?;
    Ok(Some(company))
}

/// Soft delete: the row stays because transactions reference it.
pub fn soft_delete_company(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE companies SET active = 0, updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), id],
    )?;
    Ok(changed > 0)
}

/// Persist sequential display_order values for the given id order.
pub fn reorder_companies(conn: &Connection, order: &[String]) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    for (index, id) in order.iter().enumerate() {
        conn.execute(
            "UPDATE companies SET display_order = ?1, updated_at = ?2 WHERE id = ?3",
            params![index as i64, now, id],
        )?;
    }
    Ok(())
}

// ============================================================================
// PROFIT CENTERS
// ============================================================================

fn profit_center_from_row(row: &Row) -> rusqlite::Result<ProfitCenter> {
    // Stored as nullable INTEGER; NULL round-trips to None (included)
    let include_in_projection: Option<bool> = row.get(6)?;
    Ok(ProfitCenter {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        company_id: row.get(2)?,
        name: row.get(3)?,
        display_order: row.get(4)?,
        active: row.get(5)?,
        include_in_projection,
        created_at: parse_ts(&row.get::<_, String>(7)?)?,
        updated_at: parse_ts(&row.get::<_, String>(8)?)?,
    })
}

const PROFIT_CENTER_COLUMNS: &str = "id, holding_account_id, company_id, name, display_order, \
                                     active, include_in_projection, created_at, updated_at";

pub fn insert_profit_center(conn: &Connection, pc: &ProfitCenter) -> Result<()> {
    conn.execute(
        "INSERT INTO profit_centers (id, holding_account_id, company_id, name, display_order,
                                     active, include_in_projection, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            pc.id,
            pc.holding_account_id,
            pc.company_id,
            pc.name,
            pc.display_order,
            pc.active,
            pc.include_in_projection,
            pc.created_at.to_rfc3339(),
            pc.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_profit_centers(
    conn: &Connection,
    holding_account_id: Option<&str>,
    company_id: Option<&str>,
) -> Result<Vec<ProfitCenter>> {
    let mut sql = format!("SELECT {} FROM profit_centers", PROFIT_CENTER_COLUMNS);
    let mut clauses = Vec::new();
    let mut values: Vec<&str> = Vec::new();
    if let Some(holding) = holding_account_id {
        clauses.push(format!("holding_account_id = ?{}", values.len() + 1));
        values.push(holding);
    }
    if let Some(company) = company_id {
        clauses.push(format!("company_id = ?{}", values.len() + 1));
        values.push(company);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY display_order");

    let mut stmt = conn.prepare(&sql)?;
    let centers = stmt
        .query_map(rusqlite::params_from_iter(values), profit_center_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(centers)
}

/// Active profit centers only - the dashboard's view.
pub fn list_active_profit_centers(
    conn: &Connection,
    holding_account_id: &str,
) -> Result<Vec<ProfitCenter>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM profit_centers
         WHERE holding_account_id = ?1 AND active != 0
         ORDER BY display_order",
        PROFIT_CENTER_COLUMNS
    ))?;
    let centers = stmt
        .query_map(params![holding_account_id], profit_center_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(centers)
}

pub fn get_profit_center(conn: &Connection, id: &str) -> Result<Option<ProfitCenter>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM profit_centers WHERE id = ?1",
        PROFIT_CENTER_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], profit_center_from_row)?;
    Ok(rows.next().transpose()?)
}

pub fn count_profit_centers(conn: &Connection, company_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM profit_centers WHERE company_id = ?1",
        params![company_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[derive(Debug, Default)]
pub struct ProfitCenterUpdate {
    pub name: Option<String>,
    pub display_order: Option<i64>,
    pub active: Option<bool>,
    /// Some(false) opts the center out of the holding-wide projection total.
    pub include_in_projection: Option<bool>,
}

pub fn update_profit_center(
    conn: &Connection,
    id: &str,
    update: &ProfitCenterUpdate,
) -> Result<Option<ProfitCenter>> {
    let Some(mut pc) = get_profit_center(conn, id)? else {
        return Ok(None);
    };
    if let Some(name) = &update.name {
        pc.name = name.clone();
    }
    if let Some(order) = update.display_order {
        pc.display_order = order;
    }
    if let Some(active) = update.active {
        pc.active = active;
    }
    if let Some(include) = update.include_in_projection {
        pc.include_in_projection = Some(include);
    }
    pc.updated_at = Utc::now();

    conn.execute(
        "UPDATE profit_centers
         SET name = ?1, display_order = ?2, active = ?3, include_in_projection = ?4,
             updated_at = ?5
         WHERE id = ?6",
        params![
            pc.name,
            pc.display_order,
            pc.active,
            pc.include_in_projection,
            pc.updated_at.to_rfc3339(),
            id,
        ],
    )?;
    Ok(Some(pc))
}

pub fn soft_delete_profit_center(conn: &Connection, id: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE profit_centers SET active = 0, updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), id],
    )?;
    Ok(changed > 0)
}

pub fn reorder_profit_centers(conn: &Connection, order: &[String]) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    for (index, id) in order.iter().enumerate() {
        conn.execute(
            "UPDATE profit_centers SET display_order = ?1, updated_at = ?2 WHERE id = ?3",
            params![index as i64, now, id],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_in_memory;

    fn seed_company(conn: &Connection, name: &str, order: i64) -> Company {
        let mut company = Company::new("ha-1".to_string(), name.to_string(), None, order);
        company.id = format!("co-{}", name.to_lowercase());
        insert_company(conn, &company).unwrap();
        company
    }

    #[test]
    fn test_soft_delete_hides_company_from_dashboard_view() {
        let conn = open_in_memory().unwrap();
        let company = seed_company(&conn, "Acme", 0);
        seed_company(&conn, "Globex", 1);

        assert_eq!(list_active_companies(&conn, "ha-1").unwrap().len(), 2);

        assert!(soft_delete_company(&conn, &company.id).unwrap());

        let active = list_active_companies(&conn, "ha-1").unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Globex");

        // Still visible to the CRUD surface
        assert_eq!(list_companies(&conn, Some("ha-1")).unwrap().len(), 2);
    }

    #[test]
    fn test_reorder_assigns_sequential_display_order() {
        let conn = open_in_memory().unwrap();
        let a = seed_company(&conn, "Acme", 0);
        let b = seed_company(&conn, "Globex", 1);
        let c = seed_company(&conn, "Initech", 2);

        reorder_companies(&conn, &[c.id.clone(), a.id.clone(), b.id.clone()]).unwrap();

        let listed = list_companies(&conn, Some("ha-1")).unwrap();
        let names: Vec<&str> = listed.iter().map(|co| co.name.as_str()).collect();
        assert_eq!(names, vec!["Initech", "Acme", "Globex"]);
        assert_eq!(listed[0].display_order, 0);
        assert_eq!(listed[2].display_order, 2);
    }

    #[test]
    fn test_include_in_projection_null_round_trips_as_none() {
        let conn = open_in_memory().unwrap();
        seed_company(&conn, "Acme", 0);
        let pc = ProfitCenter::new(
            "ha-1".to_string(),
            "co-acme".to_string(),
            "Store".to_string(),
            0,
        );
        insert_profit_center(&conn, &pc).unwrap();

        let loaded = get_profit_center(&conn, &pc.id).unwrap().unwrap();
        assert_eq!(loaded.include_in_projection, None);
        assert!(loaded.included_in_projection());

        let update = ProfitCenterUpdate {
            include_in_projection: Some(false),
            ..Default::default()
        };
        let updated = update_profit_center(&conn, &pc.id, &update).unwrap().unwrap();
        assert_eq!(updated.include_in_projection, Some(false));

        let reloaded = get_profit_center(&conn, &pc.id).unwrap().unwrap();
        assert!(!reloaded.included_in_projection());
    }

    #[test]
    fn test_update_missing_company_returns_none() {
        let conn = open_in_memory().unwrap();
        let update = CompanyUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(update_company(&conn, "nope", &update).unwrap().is_none());
    }

    #[test]
    fn test_holding_account_rename() {
        let conn = open_in_memory().unwrap();
        let account = HoldingAccount::new("My Business".to_string());
        insert_holding_account(&conn, &account).unwrap();

        let renamed = rename_holding_account(&conn, &account.id, "Poles LLC")
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Poles LLC");
        assert_eq!(list_holding_accounts(&conn).unwrap().len(), 1);
    }
}
