// Financial connections and mapping rules. Both are persisted faithfully
// even though the provider integrations behind them are stubs.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use super::{parse_opt_ts, parse_ts};
use crate::entities::{ConnectionStatus, FinancialConnection, MappingRule};

fn status_from_str(s: &str) -> ConnectionStatus {
    match s {
        "connected" => ConnectionStatus::Connected,
        "error" => ConnectionStatus::Error,
        _ => ConnectionStatus::Disconnected,
    }
}

fn connection_from_row(row: &Row) -> rusqlite::Result<FinancialConnection> {
    let metadata_json: String = row.get(5)?;
    Ok(FinancialConnection {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        provider: row.get(2)?,
        status: status_from_str(&row.get::<_, String>(3)?),
        external_account_id: row.get(4)?,
        metadata: serde_json::from_str(&metadata_json).unwrap_or_else(|_| serde_json::json!({})),
        last_synced_at: parse_opt_ts(row.get(6)?),
        created_at: parse_ts(&row.get::<_, String>(7)?)?,
    })
}

pub fn insert_connection(conn: &Connection, connection: &FinancialConnection) -> Result<()> {
    conn.execute(
        "INSERT INTO financial_connections
            (id, holding_account_id, provider, status, external_account_id, metadata,
             last_synced_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            connection.id,
            connection.holding_account_id,
            connection.provider,
            connection.status.as_str(),
            connection.external_account_id,
            serde_json::to_string(&connection.metadata)?,
            connection.last_synced_at.map(|dt| dt.to_rfc3339()),
            connection.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_connections(
    conn: &Connection,
    holding_account_id: Option<&str>,
) -> Result<Vec<FinancialConnection>> {
    let sql = "SELECT id, holding_account_id, provider, status, external_account_id, metadata,
                      last_synced_at, created_at
               FROM financial_connections";
    let connections = match holding_account_id {
        Some(holding) => {
            let mut stmt =
                conn.prepare(&format!("{} WHERE holding_account_id = ?1", sql))?;
            let rows = stmt.query_map(params![holding], connection_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map([], connection_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(connections)
}

fn rule_from_row(row: &Row) -> rusqlite::Result<MappingRule> {
    Ok(MappingRule {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        provider: row.get(2)?,
        match_type: row.get(3)?,
        match_value: row.get(4)?,
        profit_center_id: row.get(5)?,
        priority: row.get(6)?,
        active: row.get(7)?,
        created_at: parse_ts(&row.get::<_, String>(8)?)?,
    })
}

pub fn insert_mapping_rule(conn: &Connection, rule: &MappingRule) -> Result<()> {
    conn.execute(
        "INSERT INTO mapping_rules
            (id, holding_account_id, provider, match_type, match_value, profit_center_id,
             priority, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            rule.id,
            rule.holding_account_id,
            rule.provider,
            rule.match_type,
            rule.match_value,
            rule.profit_center_id,
            rule.priority,
            rule.active,
            rule.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Highest priority first - the order the (future) mapping engine walks them.
pub fn list_mapping_rules(
    conn: &Connection,
    holding_account_id: Option<&str>,
) -> Result<Vec<MappingRule>> {
    let sql = "SELECT id, holding_account_id, provider, match_type, match_value,
                      profit_center_id, priority, active, created_at
               FROM mapping_rules";
    let rules = match holding_account_id {
        Some(holding) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE holding_account_id = ?1 ORDER BY priority DESC",
                sql
            ))?;
            let rows = stmt.query_map(params![holding], rule_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{} ORDER BY priority DESC", sql))?;
            let rows = stmt.query_map([], rule_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open_in_memory;

    #[test]
    fn test_new_connection_starts_disconnected() {
        let conn = open_in_memory().unwrap();
        let connection = FinancialConnection::new("ha-1".to_string(), "stripe".to_string());
        insert_connection(&conn, &connection).unwrap();

        let listed = list_connections(&conn, Some("ha-1")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ConnectionStatus::Disconnected);
        assert!(listed[0].last_synced_at.is_none());
        assert_eq!(listed[0].metadata, serde_json::json!({}));
    }

    #[test]
    fn test_mapping_rules_listed_by_priority() {
        let conn = open_in_memory().unwrap();
        let low = MappingRule::new(
            "ha-1".to_string(),
            "shopify".to_string(),
            "store".to_string(),
            "main-store".to_string(),
            "pc-1".to_string(),
            0,
        );
        let high = MappingRule::new(
            "ha-1".to_string(),
            "shopify".to_string(),
            "sku".to_string(),
            "POLE-*".to_string(),
            "pc-2".to_string(),
            10,
        );
        insert_mapping_rule(&conn, &low).unwrap();
        insert_mapping_rule(&conn, &high).unwrap();

        let rules = list_mapping_rules(&conn, Some("ha-1")).unwrap();
        assert_eq!(rules[0].id, high.id);
        assert_eq!(rules[1].id, low.id);
    }
}
