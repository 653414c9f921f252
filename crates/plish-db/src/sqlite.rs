use std::path::Path;

use plish_core::{normalize_gene_name, strip_version, Transcript};
use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    format_exon_lengths, parse_exon_lengths, DatabaseInfo, DbError, TranscriptEntry,
    TranscriptSource,
};

/// Reference databases held in one SQLite file (or in memory).
pub struct SqliteTranscriptStore {
    conn: Connection,
}

impl SqliteTranscriptStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Register a database. Re-adding an id updates its name and comment.
    pub fn add_database(&self, info: &DatabaseInfo) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO databases (db_id, name, comment) VALUES (?1, ?2, ?3)
             ON CONFLICT(db_id) DO UPDATE SET name = excluded.name, comment = excluded.comment",
            params![info.id, info.name, info.comment],
        )?;
        Ok(())
    }

    /// Insert or replace a transcript. The id is stored without its version.
    pub fn insert_transcript(
        &self,
        database: &str,
        transcript: &Transcript,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO transcripts (db_id, transcript_id, gene_name, sequence, exon_lengths)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                database,
                strip_version(&transcript.id),
                transcript.name,
                transcript.sequence,
                format_exon_lengths(&transcript.exon_lengths),
            ],
        )?;
        Ok(())
    }

    pub fn transcript_count(&self, database: &str) -> Result<usize, DbError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transcripts WHERE db_id = ?1",
            params![database],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

/// Create the tables if they do not exist.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS databases (
            db_id   TEXT PRIMARY KEY,
            name    TEXT NOT NULL,
            comment TEXT
        );
        CREATE TABLE IF NOT EXISTS transcripts (
            db_id         TEXT NOT NULL REFERENCES databases(db_id),
            transcript_id TEXT NOT NULL,
            gene_name     TEXT NOT NULL,
            sequence      TEXT NOT NULL,
            exon_lengths  TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (db_id, transcript_id)
        );",
    )
}

impl TranscriptSource for SqliteTranscriptStore {
    fn database_exists(&self, database: &str) -> Result<bool, DbError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM databases WHERE db_id = ?1",
                params![database],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn fetch_transcript(
        &self,
        database: &str,
        transcript_id: &str,
    ) -> Result<Option<TranscriptEntry>, DbError> {
        let entry = self
            .conn
            .query_row(
                "SELECT gene_name, sequence FROM transcripts WHERE db_id = ?1 AND transcript_id = ?2",
                params![database, strip_version(transcript_id)],
                |row| {
                    Ok(TranscriptEntry {
                        gene_name: normalize_gene_name(&row.get::<_, String>(0)?),
                        sequence: row.get::<_, String>(1)?.to_uppercase(),
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn fetch_exon_lengths(&self, database: &str, transcript_id: &str) -> Result<Vec<u32>, DbError> {
        let field: Option<String> = self
            .conn
            .query_row(
                "SELECT exon_lengths FROM transcripts WHERE db_id = ?1 AND transcript_id = ?2",
                params![database, strip_version(transcript_id)],
                |row| row.get(0),
            )
            .optional()?;

        match field {
            None => Ok(Vec::new()),
            Some(field) => parse_exon_lengths(&field).map_err(|reason| DbError::Malformed {
                path: "transcripts.exon_lengths".into(),
                line: 0,
                reason,
            }),
        }
    }

    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT db_id, name, comment FROM databases ORDER BY db_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DatabaseInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                comment: row.get(2)?,
            })
        })?;
        let mut infos = Vec::new();
        for row in rows {
            infos.push(row?);
        }
        Ok(infos)
    }
}
