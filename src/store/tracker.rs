// Notes, overhead, team roster, kanban board, rocks and resource links.
// Plain pass-through persistence; the only behavior worth noting is board
// init (seed default columns once) and column deletion (cards re-home to
// the previous column).

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::parse_ts;
use crate::entities::{
    Frequency, KanbanCard, KanbanColumn, NoteEntry, OverheadItem, Resource, Rock, RockStatus,
    TeamMember, DEFAULT_COLUMNS,
};

// ============================================================================
// NOTES
// ============================================================================

fn note_from_row(row: &Row) -> rusqlite::Result<NoteEntry> {
    Ok(NoteEntry {
        id: row.get(0)?,
        profit_center_id: row.get(1)?,
        text: row.get(2)?,
        created_by: row.get(3)?,
        created_at: parse_ts(&row.get::<_, String>(4)?)?,
    })
}

pub fn insert_note(conn: &Connection, note: &NoteEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO note_entries (id, profit_center_id, text, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            note.id,
            note.profit_center_id,
            note.text,
            note.created_by,
            note.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_notes(conn: &Connection, profit_center_id: Option<&str>) -> Result<Vec<NoteEntry>> {
    let sql = "SELECT id, profit_center_id, text, created_by, created_at FROM note_entries";
    let notes = match profit_center_id {
        Some(pc) => {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE profit_center_id = ?1 ORDER BY created_at DESC",
                sql
            ))?;
            let rows = stmt.query_map(params![pc], note_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{} ORDER BY created_at DESC", sql))?;
            let rows = stmt.query_map([], note_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(notes)
}

pub fn delete_note(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM note_entries WHERE id = ?1", params![id])? > 0)
}

// ============================================================================
// OVERHEAD
// ============================================================================

fn frequency_from_str(s: &str) -> Frequency {
    match s {
        "annual" => Frequency::Annual,
        _ => Frequency::Monthly,
    }
}

fn frequency_to_str(f: Frequency) -> &'static str {
    match f {
        Frequency::Monthly => "monthly",
        Frequency::Annual => "annual",
    }
}

fn overhead_from_row(row: &Row) -> rusqlite::Result<OverheadItem> {
    Ok(OverheadItem {
        id: row.get(0)?,
        profit_center_id: row.get(1)?,
        name: row.get(2)?,
        amount_cents: row.get(3)?,
        frequency: frequency_from_str(&row.get::<_, String>(4)?),
        note: row.get(5)?,
        created_at: parse_ts(&row.get::<_, String>(6)?)?,
        updated_at: parse_ts(&row.get::<_, String>(7)?)?,
    })
}

const OVERHEAD_COLUMNS: &str =
    "id, profit_center_id, name, amount_cents, frequency, note, created_at, updated_at";

pub fn insert_overhead(conn: &Connection, item: &OverheadItem) -> Result<()> {
    conn.execute(
        "INSERT INTO overhead_items (id, profit_center_id, name, amount_cents, frequency, note,
                                     created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.id,
            item.profit_center_id,
            item.name,
            item.amount_cents,
            frequency_to_str(item.frequency),
            item.note,
            item.created_at.to_rfc3339(),
            item.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_overhead(conn: &Connection, profit_center_id: Option<&str>) -> Result<Vec<OverheadItem>> {
    let items = match profit_center_id {
        Some(pc) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM overhead_items WHERE profit_center_id = ?1 ORDER BY created_at DESC",
                OVERHEAD_COLUMNS
            ))?;
            let rows = stmt.query_map(params![pc], overhead_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM overhead_items ORDER BY created_at DESC",
                OVERHEAD_COLUMNS
            ))?;
            let rows = stmt.query_map([], overhead_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(items)
}

pub fn get_overhead(conn: &Connection, id: &str) -> Result<Option<OverheadItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM overhead_items WHERE id = ?1",
        OVERHEAD_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], overhead_from_row)?;
    Ok(rows.next().transpose()?)
}

#[derive(Debug, Default)]
pub struct OverheadUpdate {
    pub name: Option<String>,
    pub amount_cents: Option<i64>,
    pub frequency: Option<Frequency>,
    pub note: Option<String>,
}

pub fn update_overhead(
    conn: &Connection,
    id: &str,
    update: &OverheadUpdate,
) -> Result<Option<OverheadItem>> {
    let Some(mut item) = get_overhead(conn, id)? else {
        return Ok(None);
    };
    if let Some(name) = &update.name {
        item.name = name.clone();
    }
    if let Some(cents) = update.amount_cents {
        item.amount_cents = cents;
    }
    if let Some(frequency) = update.frequency {
        item.frequency = frequency;
    }
    if let Some(note) = &update.note {
        item.note = note.clone();
    }
    item.updated_at = Utc::now();

    conn.execute(
        "UPDATE overhead_items
         SET name = ?1, amount_cents = ?2, frequency = ?3, note = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            item.name,
            item.amount_cents,
            frequency_to_str(item.frequency),
            item.note,
            item.updated_at.to_rfc3339(),
            id,
        ],
    )?;
    Ok(Some(item))
}

pub fn delete_overhead(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM overhead_items WHERE id = ?1", params![id])? > 0)
}

// ============================================================================
// TEAM
// ============================================================================

fn member_from_row(row: &Row) -> rusqlite::Result<TeamMember> {
    Ok(TeamMember {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        created_at: parse_ts(&row.get::<_, String>(4)?)?,
    })
}

pub fn insert_team_member(conn: &Connection, member: &TeamMember) -> Result<()> {
    conn.execute(
        "INSERT INTO team_members (id, holding_account_id, name, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            member.id,
            member.holding_account_id,
            member.name,
            member.role,
            member.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_team_members(conn: &Connection, holding_account_id: &str) -> Result<Vec<TeamMember>> {
    let mut stmt = conn.prepare(
        "SELECT id, holding_account_id, name, role, created_at
         FROM team_members WHERE holding_account_id = ?1 ORDER BY created_at",
    )?;
    let members = stmt
        .query_map(params![holding_account_id], member_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

pub fn delete_team_member(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM team_members WHERE id = ?1", params![id])? > 0)
}

// ============================================================================
// KANBAN COLUMNS
// ============================================================================

fn column_from_row(row: &Row) -> rusqlite::Result<KanbanColumn> {
    Ok(KanbanColumn {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        title: row.get(2)?,
        color: row.get(3)?,
        display_order: row.get(4)?,
        created_at: parse_ts(&row.get::<_, String>(5)?)?,
    })
}

pub fn insert_column(conn: &Connection, column: &KanbanColumn) -> Result<()> {
    conn.execute(
        "INSERT INTO kanban_columns (id, holding_account_id, title, color, display_order,
                                     created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            column.id,
            column.holding_account_id,
            column.title,
            column.color,
            column.display_order,
            column.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_columns(conn: &Connection, holding_account_id: &str) -> Result<Vec<KanbanColumn>> {
    let mut stmt = conn.prepare(
        "SELECT id, holding_account_id, title, color, display_order, created_at
         FROM kanban_columns WHERE holding_account_id = ?1 ORDER BY display_order",
    )?;
    let columns = stmt
        .query_map(params![holding_account_id], column_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Seed the default board once; calling again is a no-op.
pub fn init_board(conn: &Connection, holding_account_id: &str) -> Result<Vec<KanbanColumn>> {
    let existing = list_columns(conn, holding_account_id)?;
    if !existing.is_empty() {
        return Ok(existing);
    }
    for (index, title) in DEFAULT_COLUMNS.iter().enumerate() {
        let column = KanbanColumn::new(
            holding_account_id.to_string(),
            title.to_string(),
            None,
            index as i64,
        );
        insert_column(conn, &column)?;
    }
    list_columns(conn, holding_account_id)
}

#[derive(Debug, Default)]
pub struct ColumnUpdate {
    pub title: Option<String>,
    pub color: Option<String>,
    pub display_order: Option<i64>,
}

pub fn update_column(
    conn: &Connection,
    id: &str,
    update: &ColumnUpdate,
) -> Result<Option<KanbanColumn>> {
    let mut stmt = conn.prepare(
        "SELECT id, holding_account_id, title, color, display_order, created_at
         FROM kanban_columns WHERE id = ?1",
    )?;
    let Some(mut column) = stmt
        .query_map(params![id], column_from_row)?
        .next()
        .transpose()?
    else {
        return Ok(None);
    };
    if let Some(title) = &update.title {
        column.title = title.clone();
    }
    if let Some(color) = &update.color {
        column.color = color.clone();
    }
    if let Some(order) = update.display_order {
        column.display_order = order;
    }
    conn.execute(
        "UPDATE kanban_columns SET title = ?1, color = ?2, display_order = ?3 WHERE id = ?4",
        params![column.title, column.color, column.display_order, id],
    )?;
    Ok(Some(column))
}

/// Delete a column, re-homing its cards to the previous column by
/// display_order (or the next one, when the first column goes). Cards are
/// only deleted when no column remains.
pub fn delete_column(conn: &Connection, id: &str) -> Result<bool> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT holding_account_id, display_order FROM kanban_columns WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    let Some((holding, order)) = row else {
        return Ok(false);
    };

    conn.execute("DELETE FROM kanban_columns WHERE id = ?1", params![id])?;

    let remaining = list_columns(conn, &holding)?;
    let target = remaining
        .iter()
        .filter(|c| c.display_order < order)
        .last()
        .or_else(|| remaining.first());

    match target {
        Some(column) => {
            conn.execute(
                "UPDATE kanban_cards SET column_id = ?1, updated_at = ?2 WHERE column_id = ?3",
                params![column.id, Utc::now().to_rfc3339(), id],
            )?;
        }
        None => {
            conn.execute("DELETE FROM kanban_cards WHERE column_id = ?1", params![id])?;
        }
    }
    Ok(true)
}

// ============================================================================
// KANBAN CARDS
// ============================================================================

fn card_from_row(row: &Row) -> rusqlite::Result<KanbanCard> {
    Ok(KanbanCard {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        profit_center_id: row.get(2)?,
        column_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        amount_cents: row.get(6)?,
        due_date: row.get(7)?,
        priority: row.get(8)?,
        display_order: row.get(9)?,
        completed: row.get(10)?,
        created_at: parse_ts(&row.get::<_, String>(11)?)?,
        updated_at: parse_ts(&row.get::<_, String>(12)?)?,
    })
}

const CARD_COLUMNS: &str = "id, holding_account_id, profit_center_id, column_id, title, \
                            description, amount_cents, due_date, priority, display_order, \
                            completed, created_at, updated_at";

pub fn insert_card(conn: &Connection, card: &KanbanCard) -> Result<()> {
    conn.execute(
        "INSERT INTO kanban_cards (id, holding_account_id, profit_center_id, column_id, title,
                                   description, amount_cents, due_date, priority, display_order,
                                   completed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            card.id,
            card.holding_account_id,
            card.profit_center_id,
            card.column_id,
            card.title,
            card.description,
            card.amount_cents,
            card.due_date,
            card.priority,
            card.display_order,
            card.completed,
            card.created_at.to_rfc3339(),
            card.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn count_cards_in_column(conn: &Connection, column_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM kanban_cards WHERE column_id = ?1",
        params![column_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_cards(
    conn: &Connection,
    holding_account_id: &str,
    profit_center_id: Option<&str>,
    completed: Option<bool>,
) -> Result<Vec<KanbanCard>> {
    let mut sql = format!(
        "SELECT {} FROM kanban_cards WHERE holding_account_id = ?1",
        CARD_COLUMNS
    );
    let mut values: Vec<String> = vec![holding_account_id.to_string()];
    if let Some(pc) = profit_center_id {
        sql.push_str(&format!(" AND profit_center_id = ?{}", values.len() + 1));
        values.push(pc.to_string());
    }
    if let Some(done) = completed {
        sql.push_str(&format!(" AND completed = ?{}", values.len() + 1));
        values.push(if done { "1".to_string() } else { "0".to_string() });
    }
    sql.push_str(" ORDER BY display_order");

    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(rusqlite::params_from_iter(values), card_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cards)
}

pub fn get_card(conn: &Connection, id: &str) -> Result<Option<KanbanCard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM kanban_cards WHERE id = ?1",
        CARD_COLUMNS
    ))?;
    let mut rows = stmt.query_map(params![id], card_from_row)?;
    Ok(rows.next().transpose()?)
}

#[derive(Debug, Default)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<String>,
    pub priority: Option<String>,
    pub profit_center_id: Option<String>,
    pub completed: Option<bool>,
}

pub fn update_card(conn: &Connection, id: &str, update: &CardUpdate) -> Result<Option<KanbanCard>> {
    let Some(mut card) = get_card(conn, id)? else {
        return Ok(None);
    };
    if let Some(title) = &update.title {
        card.title = title.clone();
    }
    if let Some(description) = &update.description {
        card.description = description.clone();
    }
    if let Some(cents) = update.amount_cents {
        card.amount_cents = Some(cents);
    }
    if let Some(due) = &update.due_date {
        card.due_date = Some(due.clone());
    }
    if let Some(priority) = &update.priority {
        card.priority = Some(priority.clone());
    }
    if let Some(pc) = &update.profit_center_id {
        card.profit_center_id = Some(pc.clone());
    }
    if let Some(done) = update.completed {
        card.completed = done;
    }
    card.updated_at = Utc::now();

    conn.execute(
        "UPDATE kanban_cards
         SET title = ?1, description = ?2, amount_cents = ?3, due_date = ?4, priority = ?5,
             profit_center_id = ?6, completed = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            card.title,
            card.description,
            card.amount_cents,
            card.due_date,
            card.priority,
            card.profit_center_id,
            card.completed,
            card.updated_at.to_rfc3339(),
            id,
        ],
    )?;
    Ok(Some(card))
}

/// Drag-and-drop move: new column and position in one shot.
pub fn move_card(
    conn: &Connection,
    card_id: &str,
    column_id: &str,
    new_order: i64,
) -> Result<Option<KanbanCard>> {
    let changed = conn.execute(
        "UPDATE kanban_cards
         SET column_id = ?1, display_order = ?2, updated_at = ?3
         WHERE id = ?4",
        params![column_id, new_order, Utc::now().to_rfc3339(), card_id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    get_card(conn, card_id)
}

pub fn delete_card(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM kanban_cards WHERE id = ?1", params![id])? > 0)
}

// ============================================================================
// ROCKS
// ============================================================================

fn rock_status_from_str(s: &str) -> RockStatus {
    match s {
        "completed" => RockStatus::Completed,
        _ => RockStatus::Active,
    }
}

fn rock_from_row(row: &Row) -> rusqlite::Result<Rock> {
    Ok(Rock {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        profit_center_id: row.get(2)?,
        company_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        owner_id: row.get(6)?,
        due_date: row.get(7)?,
        status: rock_status_from_str(&row.get::<_, String>(8)?),
        created_at: parse_ts(&row.get::<_, String>(9)?)?,
        updated_at: parse_ts(&row.get::<_, String>(10)?)?,
    })
}

const ROCK_COLUMNS: &str = "id, holding_account_id, profit_center_id, company_id, title, \
                            description, owner_id, due_date, status, created_at, updated_at";

pub fn insert_rock(conn: &Connection, rock: &Rock) -> Result<()> {
    conn.execute(
        "INSERT INTO rocks (id, holding_account_id, profit_center_id, company_id, title,
                            description, owner_id, due_date, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            rock.id,
            rock.holding_account_id,
            rock.profit_center_id,
            rock.company_id,
            rock.title,
            rock.description,
            rock.owner_id,
            rock.due_date,
            rock.status.as_str(),
            rock.created_at.to_rfc3339(),
            rock.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_rocks(
    conn: &Connection,
    holding_account_id: &str,
    status: Option<RockStatus>,
    profit_center_id: Option<&str>,
    company_id: Option<&str>,
) -> Result<Vec<Rock>> {
    let mut sql = format!(
        "SELECT {} FROM rocks WHERE holding_account_id = ?1",
        ROCK_COLUMNS
    );
    let mut values: Vec<String> = vec![holding_account_id.to_string()];
    if let Some(status) = status {
        sql.push_str(&format!(" AND status = ?{}", values.len() + 1));
        values.push(status.as_str().to_string());
    }
    if let Some(pc) = profit_center_id {
        sql.push_str(&format!(" AND profit_center_id = ?{}", values.len() + 1));
        values.push(pc.to_string());
    }
    if let Some(company) = company_id {
        sql.push_str(&format!(" AND company_id = ?{}", values.len() + 1));
        values.push(company.to_string());
    }
    sql.push_str(" ORDER BY created_at");

    let mut stmt = conn.prepare(&sql)?;
    let rocks = stmt
        .query_map(rusqlite::params_from_iter(values), rock_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rocks)
}

pub fn get_rock(conn: &Connection, id: &str) -> Result<Option<Rock>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM rocks WHERE id = ?1", ROCK_COLUMNS))?;
    let mut rows = stmt.query_map(params![id], rock_from_row)?;
    Ok(rows.next().transpose()?)
}

#[derive(Debug, Default)]
pub struct RockUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub owner_id: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<RockStatus>,
    pub profit_center_id: Option<String>,
    pub company_id: Option<String>,
}

pub fn update_rock(conn: &Connection, id: &str, update: &RockUpdate) -> Result<Option<Rock>> {
    let Some(mut rock) = get_rock(conn, id)? else {
        return Ok(None);
    };
    if let Some(title) = &update.title {
        rock.title = title.clone();
    }
    if let Some(description) = &update.description {
        rock.description = Some(description.clone());
    }
    if let Some(owner) = &update.owner_id {
        rock.owner_id = Some(owner.clone());
    }
    if let Some(due) = &update.due_date {
        rock.due_date = Some(due.clone());
    }
    if let Some(status) = update.status {
        rock.status = status;
    }
    if let Some(pc) = &update.profit_center_id {
        rock.profit_center_id = Some(pc.clone());
    }
    if let Some(company) = &update.company_id {
        rock.company_id = Some(company.clone());
    }
    rock.updated_at = Utc::now();

    conn.execute(
        "UPDATE rocks
         SET title = ?1, description = ?2, owner_id = ?3, due_date = ?4, status = ?5,
             profit_center_id = ?6, company_id = ?7, updated_at = ?8
         WHERE id = ?9",
        params![
            rock.title,
            rock.description,
            rock.owner_id,
            rock.due_date,
            rock.status.as_str(),
            rock.profit_center_id,
            rock.company_id,
            rock.updated_at.to_rfc3339(),
            id,
        ],
    )?;
    Ok(Some(rock))
}

pub fn delete_rock(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM rocks WHERE id = ?1", params![id])? > 0)
}

// ============================================================================
// RESOURCES
// ============================================================================

fn resource_from_row(row: &Row) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(0)?,
        holding_account_id: row.get(1)?,
        scope_type: row.get(2)?,
        scope_id: row.get(3)?,
        title: row.get(4)?,
        url: row.get(5)?,
        created_at: parse_ts(&row.get::<_, String>(6)?)?,
    })
}

pub fn insert_resource(conn: &Connection, resource: &Resource) -> Result<()> {
    conn.execute(
        "INSERT INTO resources (id, holding_account_id, scope_type, scope_id, title, url,
                                created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            resource.id,
            resource.holding_account_id,
            resource.scope_type,
            resource.scope_id,
            resource.title,
            resource.url,
            resource.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn list_resources(
    conn: &Connection,
    holding_account_id: &str,
    scope_type: Option<&str>,
    scope_id: Option<&str>,
) -> Result<Vec<Resource>> {
    let mut sql = String::from(
        "SELECT id, holding_account_id, scope_type, scope_id, title, url, created_at
         FROM resources WHERE holding_account_id = ?1",
    );
    let mut values: Vec<String> = vec![holding_account_id.to_string()];
    if let Some(scope) = scope_type {
        sql.push_str(&format!(" AND scope_type = ?{}", values.len() + 1));
        values.push(scope.to_string());
    }
    if let Some(scope_id) = scope_id {
        sql.push_str(&format!(" AND scope_id = ?{}", values.len() + 1));
        values.push(scope_id.to_string());
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let resources = stmt
        .query_map(rusqlite::params_from_iter(values), resource_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(resources)
}

pub fn delete_resource(conn: &Connection, id: &str) -> Result<bool> {
    Ok(conn.execute("DELETE FROM resources WHERE id = ?1", params![id])? > 0)
}
