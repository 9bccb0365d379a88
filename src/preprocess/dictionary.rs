//! Dictionary loading and processed-entry persistence.

use rusqlite::params;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::db::Db;
use crate::error::{LexigraphError, Result};
use crate::preprocess::{ProcessedEntry, Tokenizer};

/// Load a dictionary JSON file (word -> definition) and tokenize every
/// definition.
///
/// Headwords are normalized to lowercase and deserialized into a
/// BTreeMap, so entry order (and therefore graph construction order)
/// is deterministic regardless of the file's key order. Headwords that
/// collide after normalization ("Cat" and "cat") collapse into one
/// entry at the first occurrence's position, with the token lists of
/// all their definitions merged in order.
pub fn process_dictionary(
    dictionary_file: &Path,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<ProcessedEntry>> {
    let raw = std::fs::read_to_string(dictionary_file)?;
    let dictionary: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
        LexigraphError::Parse(format!(
            "Invalid dictionary file {}: {}",
            dictionary_file.display(),
            e
        ))
    })?;

    log::info!("Loaded {} dictionary entries", dictionary.len());

    let mut entries: Vec<ProcessedEntry> = Vec::with_capacity(dictionary.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for (word, definition) in &dictionary {
        let word = word.to_lowercase();
        let tokens = tokenizer.tokenize(definition);
        match index.get(&word) {
            Some(&at) => {
                log::warn!(
                    "Headword '{}' appears more than once after lowercasing; merging definitions",
                    word
                );
                let entry = &mut entries[at];
                for token in tokens {
                    if !entry.tokens.contains(&token) {
                        entry.tokens.push(token);
                    }
                }
            }
            None => {
                index.insert(word.clone(), entries.len());
                entries.push(ProcessedEntry { word, tokens });
            }
        }
    }

    log::info!("Preprocessing complete: {} entries tokenized", entries.len());

    Ok(entries)
}

/// Persist processed entries, replacing any previous set.
pub async fn save_entries(db: &Db, entries: Vec<ProcessedEntry>) -> Result<usize> {
    let count = entries.len();
    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM processed_entries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO processed_entries (ordinal, word, tokens_json) VALUES (?1, ?2, ?3)",
            )?;
            for (ordinal, entry) in entries.iter().enumerate() {
                let tokens_json = serde_json::to_string(&entry.tokens)?;
                stmt.execute(params![ordinal as i64, entry.word, tokens_json])?;
            }
        }
        tx.commit()?;
        Ok(())
    })
    .await?;

    log::info!("Saved {} processed entries", count);
    Ok(count)
}

/// Load processed entries in their original order.
pub async fn load_entries(db: &Db) -> Result<Vec<ProcessedEntry>> {
    db.with_connection(|conn| {
        let mut stmt =
            conn.prepare("SELECT word, tokens_json FROM processed_entries ORDER BY ordinal")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(LexigraphError::Database)?;

        let mut entries = Vec::with_capacity(rows.len());
        for (word, tokens_json) in rows {
            let tokens: Vec<String> = serde_json::from_str(&tokens_json)?;
            entries.push(ProcessedEntry { word, tokens });
        }
        Ok(entries)
    })
    .await
}
