//! SQLite-backed DefinitionStore / CompletionStore.
//!
//! # 設計
//! - 単一コネクションを `Arc<Mutex<Connection>>` で直列化（WAL で読みは並走）
//! - 行の読み出しは「生の列 → ドメイン型」の二段デコード。
//!   定義一覧では壊れた行を skip-and-log、単一取得と完了ログでは
//!   Configuration エラーとして表面化させる
//! - `append_auto_once` は部分ユニークインデックス + INSERT OR IGNORE で
//!   ストア内アトミック

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::warn;
use ulid::Ulid;

use rota_core::domain::{
    Actor, CompletionId, CompletionRecord, DefinitionId, EvidenceRef, Frequency, Id, IdMarker,
    RotaError, Shift, SourceKey, TaskDefinition, VenueId, Weekday,
};
use rota_core::ports::{CompletionStore, DefinitionStore, SignOffOutcome};

use crate::schema;

const DEFINITION_COLUMNS: &str = "id, venue_id, name, area, frequency, weekly_day, shift, \
     scheduled_time, method, requires_reading, responsible_role, auto_tick_source, sort_order, \
     is_active, created_at, updated_at";

const COMPLETION_COLUMNS: &str = "id, definition_id, venue_id, day, completed_by, completed_at, \
     reading, evidence, notes, is_auto, signed_off_by, signed_off_at";

/// Both Rota ports over one SQLite file. Clone shares the connection, so a
/// single value can be handed to the runtime builder as definitions store
/// and completions store.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RotaError> {
        let conn = Connection::open(path).map_err(store_err)?;
        Self::with_connection(conn)
    }

    /// Ephemeral database for tests and demos.
    pub fn open_in_memory() -> Result<Self, RotaError> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, RotaError> {
        schema::apply_schema(&conn).map_err(store_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Stamped schema version of the open database.
    pub async fn schema_version(&self) -> Result<Option<u32>, RotaError> {
        let conn = self.conn.lock().await;
        schema::read_schema_version(&conn).map_err(store_err)
    }
}

#[async_trait]
impl DefinitionStore for SqliteStore {
    async fn insert(&self, definition: TaskDefinition) -> Result<(), RotaError> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO task_definitions ({DEFINITION_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                encode_id(definition.id),
                definition.venue_id.as_str(),
                definition.name,
                definition.area,
                definition.frequency.kind(),
                definition.frequency.weekly_day().map(|day| day.as_str()),
                definition.shift.as_str(),
                definition.scheduled_time.map(encode_time),
                definition.method,
                definition.requires_reading,
                definition.responsible_role,
                definition.auto_tick_source.as_ref().map(|s| s.as_str()),
                definition.sort_order,
                definition.is_active,
                encode_instant(definition.created_at),
                encode_instant(definition.updated_at),
            ],
        )
        .map_err(store_err)?;
        Ok(())
    }

    async fn get(&self, id: &DefinitionId) -> Result<Option<TaskDefinition>, RotaError> {
        let conn = self.conn.lock().await;
        fetch_definition(&conn, id)
    }

    async fn list_active(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        self.list_definitions(venue, true).await
    }

    async fn list_all(&self, venue: &VenueId) -> Result<Vec<TaskDefinition>, RotaError> {
        self.list_definitions(venue, false).await
    }

    async fn set_active(
        &self,
        id: &DefinitionId,
        active: bool,
        at: DateTime<Utc>,
    ) -> Result<TaskDefinition, RotaError> {
        // Fetch and update under one lock so the toggle is atomic.
        let conn = self.conn.lock().await;
        let mut definition =
            fetch_definition(&conn, id)?.ok_or(RotaError::DefinitionNotFound(*id))?;

        if definition.set_active(active, at) {
            conn.execute(
                "UPDATE task_definitions SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
                params![encode_id(*id), active, encode_instant(at)],
            )
            .map_err(store_err)?;
        }
        Ok(definition)
    }
}

impl SqliteStore {
    async fn list_definitions(
        &self,
        venue: &VenueId,
        active_only: bool,
    ) -> Result<Vec<TaskDefinition>, RotaError> {
        let filter = if active_only { " AND is_active = 1" } else { "" };
        let sql = format!(
            "SELECT {DEFINITION_COLUMNS} FROM task_definitions \
             WHERE venue_id = ?1{filter} ORDER BY sort_order, name"
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql).map_err(store_err)?;
        let rows = stmt
            .query_map(params![venue.as_str()], read_definition_row)
            .map_err(store_err)?;

        let mut out = Vec::new();
        for raw in rows {
            let raw = raw.map_err(store_err)?;
            let row_id = raw.id.clone();
            match decode_definition(raw) {
                Ok(definition) => out.push(definition),
                // One bad definition must not hide the rest of the catalog.
                Err(error) => warn!(id = %row_id, %error, "skipping malformed task definition row"),
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl CompletionStore for SqliteStore {
    async fn append(&self, record: CompletionRecord) -> Result<(), RotaError> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO completion_records ({COMPLETION_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                encode_id(record.id),
                encode_id(record.definition_id),
                record.venue_id.as_str(),
                encode_day(record.day),
                record.completed_by.as_str(),
                encode_instant(record.completed_at),
                record.reading,
                record.evidence.as_ref().map(|e| e.as_str()),
                record.notes.as_deref(),
                record.is_auto,
                record.signed_off_by.as_ref().map(|a| a.as_str()),
                record.signed_off_at.map(encode_instant),
            ],
        )
        .map_err(store_err)?;
        Ok(())
    }

    async fn list_for_day(
        &self,
        venue: &VenueId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        self.list_completions(
            "WHERE venue_id = ? AND day = ?",
            vec![venue.as_str().to_string(), encode_day(day)],
        )
        .await
    }

    async fn list_range(
        &self,
        venue: &VenueId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        // ISO dates compare correctly as text, so BETWEEN is inclusive on
        // both ends here just like the port requires.
        self.list_completions(
            "WHERE venue_id = ? AND day BETWEEN ? AND ?",
            vec![
                venue.as_str().to_string(),
                encode_day(from),
                encode_day(to),
            ],
        )
        .await
    }

    async fn append_auto_once(&self, record: CompletionRecord) -> Result<bool, RotaError> {
        let conn = self.conn.lock().await;
        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO completion_records ({COMPLETION_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    encode_id(record.id),
                    encode_id(record.definition_id),
                    record.venue_id.as_str(),
                    encode_day(record.day),
                    record.completed_by.as_str(),
                    encode_instant(record.completed_at),
                    record.reading,
                    record.evidence.as_ref().map(|e| e.as_str()),
                    record.notes.as_deref(),
                    record.is_auto,
                    record.signed_off_by.as_ref().map(|a| a.as_str()),
                    record.signed_off_at.map(encode_instant),
                ],
            )
            .map_err(store_err)?;
        Ok(inserted == 1)
    }

    async fn sign_off(
        &self,
        ids: &[CompletionId],
        reviewer: &Actor,
        at: DateTime<Utc>,
    ) -> Result<SignOffOutcome, RotaError> {
        if ids.is_empty() {
            return Ok(SignOffOutcome {
                matched: 0,
                newly_signed: 0,
            });
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let id_values: Vec<String> = ids.iter().map(|id| encode_id(*id)).collect();

        let conn = self.conn.lock().await;
        let matched = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM completion_records WHERE id IN ({placeholders})"),
                params_from_iter(id_values.iter()),
                |row| row.get::<_, i64>(0),
            )
            .map_err(store_err)? as usize;

        // Unsigned rows only; already-signed rows keep their original pair.
        let mut update_values: Vec<String> =
            vec![reviewer.as_str().to_string(), encode_instant(at)];
        update_values.extend(id_values);
        let newly_signed = conn
            .execute(
                &format!(
                    "UPDATE completion_records SET signed_off_by = ?, signed_off_at = ? \
                     WHERE signed_off_at IS NULL AND id IN ({placeholders})"
                ),
                params_from_iter(update_values.iter()),
            )
            .map_err(store_err)?;

        Ok(SignOffOutcome {
            matched,
            newly_signed,
        })
    }

    async fn list_for_definition_day(
        &self,
        definition: &DefinitionId,
        day: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        self.list_completions(
            "WHERE definition_id = ? AND day = ?",
            vec![encode_id(*definition), encode_day(day)],
        )
        .await
    }
}

impl SqliteStore {
    /// Completion queries differ only in their filter; ordering is always
    /// the log order (completed_at, id). Filter values are all TEXT, passed
    /// owned so the future stays Send. Decode failures here propagate: an
    /// audit log that silently thins out is worse than one that errors.
    async fn list_completions(
        &self,
        filter: &str,
        filter_params: Vec<String>,
    ) -> Result<Vec<CompletionRecord>, RotaError> {
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM completion_records {filter} \
             ORDER BY completed_at, id"
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql).map_err(store_err)?;
        let rows = stmt
            .query_map(params_from_iter(filter_params.iter()), read_completion_row)
            .map_err(store_err)?;

        let mut out = Vec::new();
        for raw in rows {
            out.push(decode_completion(raw.map_err(store_err)?)?);
        }
        Ok(out)
    }
}

// --- row shapes ---

struct DefinitionRow {
    id: String,
    venue_id: String,
    name: String,
    area: String,
    frequency: String,
    weekly_day: Option<String>,
    shift: String,
    scheduled_time: Option<String>,
    method: String,
    requires_reading: bool,
    responsible_role: String,
    auto_tick_source: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

fn read_definition_row(row: &Row<'_>) -> rusqlite::Result<DefinitionRow> {
    Ok(DefinitionRow {
        id: row.get(0)?,
        venue_id: row.get(1)?,
        name: row.get(2)?,
        area: row.get(3)?,
        frequency: row.get(4)?,
        weekly_day: row.get(5)?,
        shift: row.get(6)?,
        scheduled_time: row.get(7)?,
        method: row.get(8)?,
        requires_reading: row.get(9)?,
        responsible_role: row.get(10)?,
        auto_tick_source: row.get(11)?,
        sort_order: row.get(12)?,
        is_active: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn decode_definition(raw: DefinitionRow) -> Result<TaskDefinition, RotaError> {
    let weekly_day = raw
        .weekly_day
        .map(|s| {
            Weekday::parse(&s)
                .ok_or_else(|| RotaError::configuration(format!("unknown weekly day: {s}")))
        })
        .transpose()?;
    let frequency = Frequency::from_parts(&raw.frequency, weekly_day)?;

    let shift = Shift::parse(&raw.shift)
        .ok_or_else(|| RotaError::configuration(format!("unknown shift: {}", raw.shift)))?;

    Ok(TaskDefinition {
        id: decode_id(&raw.id)?,
        venue_id: VenueId::new(raw.venue_id),
        name: raw.name,
        area: raw.area,
        frequency,
        shift,
        scheduled_time: raw.scheduled_time.map(|s| decode_time(&s)).transpose()?,
        method: raw.method,
        requires_reading: raw.requires_reading,
        responsible_role: raw.responsible_role,
        auto_tick_source: raw.auto_tick_source.map(SourceKey::new),
        sort_order: raw.sort_order,
        is_active: raw.is_active,
        created_at: decode_instant(&raw.created_at)?,
        updated_at: decode_instant(&raw.updated_at)?,
    })
}

fn fetch_definition(
    conn: &Connection,
    id: &DefinitionId,
) -> Result<Option<TaskDefinition>, RotaError> {
    let raw = conn
        .query_row(
            &format!("SELECT {DEFINITION_COLUMNS} FROM task_definitions WHERE id = ?1"),
            params![encode_id(*id)],
            read_definition_row,
        )
        .optional()
        .map_err(store_err)?;
    raw.map(decode_definition).transpose()
}

struct CompletionRow {
    id: String,
    definition_id: String,
    venue_id: String,
    day: String,
    completed_by: String,
    completed_at: String,
    reading: Option<f64>,
    evidence: Option<String>,
    notes: Option<String>,
    is_auto: bool,
    signed_off_by: Option<String>,
    signed_off_at: Option<String>,
}

fn read_completion_row(row: &Row<'_>) -> rusqlite::Result<CompletionRow> {
    Ok(CompletionRow {
        id: row.get(0)?,
        definition_id: row.get(1)?,
        venue_id: row.get(2)?,
        day: row.get(3)?,
        completed_by: row.get(4)?,
        completed_at: row.get(5)?,
        reading: row.get(6)?,
        evidence: row.get(7)?,
        notes: row.get(8)?,
        is_auto: row.get(9)?,
        signed_off_by: row.get(10)?,
        signed_off_at: row.get(11)?,
    })
}

fn decode_completion(raw: CompletionRow) -> Result<CompletionRecord, RotaError> {
    // The sign-off pair is set together or not at all.
    let sign_off = match (raw.signed_off_by, raw.signed_off_at) {
        (Some(by), Some(at)) => Some((Actor::new(by), decode_instant(&at)?)),
        (None, None) => None,
        _ => {
            return Err(RotaError::configuration(format!(
                "sign-off pair is half-set on completion record {}",
                raw.id
            )));
        }
    };
    let (signed_off_by, signed_off_at) = match sign_off {
        Some((by, at)) => (Some(by), Some(at)),
        None => (None, None),
    };

    Ok(CompletionRecord {
        id: decode_id(&raw.id)?,
        definition_id: decode_id(&raw.definition_id)?,
        venue_id: VenueId::new(raw.venue_id),
        day: decode_day(&raw.day)?,
        completed_by: Actor::new(raw.completed_by),
        completed_at: decode_instant(&raw.completed_at)?,
        reading: raw.reading,
        evidence: raw.evidence.map(EvidenceRef::new),
        notes: raw.notes,
        is_auto: raw.is_auto,
        signed_off_by,
        signed_off_at,
    })
}

// --- column codecs ---

fn store_err(error: rusqlite::Error) -> RotaError {
    RotaError::store(error.to_string())
}

fn encode_id<T: IdMarker>(id: Id<T>) -> String {
    id.as_ulid().to_string()
}

fn decode_id<T: IdMarker>(s: &str) -> Result<Id<T>, RotaError> {
    Ulid::from_string(s)
        .map(Id::from_ulid)
        .map_err(|_| RotaError::configuration(format!("malformed ulid: {s}")))
}

fn encode_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn decode_day(s: &str) -> Result<NaiveDate, RotaError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| RotaError::configuration(format!("malformed day: {s}")))
}

fn encode_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

fn decode_time(s: &str) -> Result<NaiveTime, RotaError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .map_err(|_| RotaError::configuration(format!("malformed time of day: {s}")))
}

fn encode_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn decode_instant(s: &str) -> Result<DateTime<Utc>, RotaError> {
    DateTime::parse_from_rfc3339(s)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| RotaError::configuration(format!("malformed timestamp: {s}")))
}
