use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::instant_from_millis};
use crate::models::{Note, PracticePiece};

fn row_to_piece(row: &Row) -> Result<PracticePiece> {
    let started_at: i64 = row.get("started_at")?;
    let notes_json: String = row.get("notes_json")?;
    let notes: Vec<Note> = serde_json::from_str(&notes_json)
        .with_context(|| format!("failed to decode notes for piece {started_at}"))?;

    Ok(PracticePiece {
        started_at: instant_from_millis(started_at, "started_at")?,
        length_ms: row.get("length_ms")?,
        notes,
    })
}

impl Database {
    pub async fn upsert_practice_piece(&self, piece: &PracticePiece) -> Result<()> {
        let started_at = piece.started_at.timestamp_millis();
        let length_ms = piece.length_ms;
        let notes_json = serde_json::to_string(&piece.notes).context("failed to encode notes")?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO practice_pieces (started_at, length_ms, notes_json)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(started_at) DO UPDATE SET
                     length_ms = excluded.length_ms,
                     notes_json = excluded.notes_json",
                params![started_at, length_ms, notes_json],
            )
            .with_context(|| "failed to store practice piece")?;
            Ok(())
        })
        .await
    }

    pub async fn practice_pieces_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PracticePiece>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT started_at, length_ms, notes_json FROM practice_pieces
                 WHERE started_at >= ?1 AND started_at < ?2
                 ORDER BY started_at ASC",
            )?;

            let mut rows =
                stmt.query(params![start.timestamp_millis(), end.timestamp_millis()])?;
            let mut pieces = Vec::new();
            while let Some(row) = rows.next()? {
                pieces.push(row_to_piece(row)?);
            }
            Ok(pieces)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn piece(start: DateTime<Utc>, notes: usize) -> PracticePiece {
        let notes: Vec<Note> = (0..notes)
            .map(|i| Note {
                status: 144,
                data1: 60 + i as i16,
                data2: 80,
                data3: 0,
                relative_timestamp: (i * 500) as i32,
                absolute_timestamp: start + Duration::milliseconds(i as i64 * 500),
            })
            .collect();
        PracticePiece::from_notes(notes).expect("piece")
    }

    #[tokio::test]
    async fn pieces_round_trip_with_notes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(dir.path().join("usage.db")).expect("open database");
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap()
            + Duration::milliseconds(250);

        db.upsert_practice_piece(&piece(start, 3)).await.expect("insert");
        let pieces = db
            .practice_pieces_between(start, start + Duration::hours(1))
            .await
            .expect("query");
        assert_eq!(pieces, vec![piece(start, 3)]);
        assert_eq!(pieces[0].length_ms, 1_000);
    }

    #[tokio::test]
    async fn range_end_is_exclusive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(dir.path().join("usage.db")).expect("open database");
        let day = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let next = day + Duration::days(1);

        db.upsert_practice_piece(&piece(day, 1)).await.expect("insert");
        db.upsert_practice_piece(&piece(next, 1)).await.expect("insert");

        let pieces = db.practice_pieces_between(day, next).await.expect("query");
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].started_at, day);
    }
}
