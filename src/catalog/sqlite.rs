use super::{is_valid_level, seed, CatalogState, NewWord, Word, WordCatalog};
use crate::error::CatalogError;
use rusqlite::{params, params_from_iter, types::Value, Connection, Row};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL,
        definition TEXT NOT NULL,
        pos TEXT NOT NULL,
        level INTEGER NOT NULL,
        example TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_words_level ON words(level);
    CREATE INDEX IF NOT EXISTS idx_words_pos_level ON words(pos, level);
"#;

const WORD_COLUMNS: &str = "id, word, definition, pos, level, example";

/// Word catalog backed by a SQLite `words` table.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Option<Connection>,
}

impl SqliteCatalog {
    /// A catalog with no backing database. Every lookup returns an empty result.
    pub fn uninitialized() -> Self {
        Self { conn: None }
    }

    /// Open (or create) the catalog database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("opened word catalog at {}", path.display());

        Ok(Self { conn: Some(conn) })
    }

    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<&Connection, CatalogError> {
        self.conn.as_ref().ok_or(CatalogError::NotOpen)
    }

    /// Insert words in a single transaction, returning how many were added.
    /// Nothing is inserted if any word has a level outside `1..=6` or a blank
    /// word or definition.
    pub fn insert_words(&mut self, words: &[NewWord]) -> Result<usize, CatalogError> {
        for (i, word) in words.iter().enumerate() {
            if !is_valid_level(word.level) {
                return Err(CatalogError::InvalidLevel(word.level));
            }
            if word.word.trim().is_empty() {
                return Err(CatalogError::BlankField { entry: i + 1, field: "word" });
            }
            if word.definition.trim().is_empty() {
                return Err(CatalogError::BlankField { entry: i + 1, field: "definition" });
            }
        }

        let conn = self.conn.as_mut().ok_or(CatalogError::NotOpen)?;
        let tx = conn.transaction()?;
        for word in words {
            tx.execute(
                "INSERT INTO words (word, definition, pos, level, example) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![word.word, word.definition, word.pos, word.level, word.example],
            )?;
        }
        tx.commit()?;

        Ok(words.len())
    }

    /// Load words from CSV with the header `word,definition,pos,level,example`.
    /// An empty `example` column is stored as no example.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<usize, CatalogError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let words = rdr
            .deserialize::<NewWord>()
            .collect::<Result<Vec<_>, _>>()?;
        self.insert_words(&words)
    }

    /// Populate the catalog with the bundled starter word list.
    pub fn seed_starter_words(&mut self) -> Result<usize, CatalogError> {
        let words = seed::starter_words()?;
        self.insert_words(&words)
    }

    pub fn word_count(&self) -> usize {
        self.counts_by_level().values().sum()
    }

    fn query_words<P: rusqlite::Params>(&self, sql: &str, params: P) -> Vec<Word> {
        let Ok(conn) = self.conn() else {
            return Vec::new();
        };

        let result = conn.prepare(sql).and_then(|mut stmt| {
            let words = stmt
                .query_map(params, word_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            words
        });

        match result {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!("word catalog query failed: {e}");
                Vec::new()
            }
        }
    }
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        word: row.get(1)?,
        definition: row.get(2)?,
        pos: row.get(3)?,
        level: row.get(4)?,
        example: row.get(5)?,
    })
}

impl WordCatalog for SqliteCatalog {
    fn state(&self) -> CatalogState {
        if self.conn.is_some() {
            CatalogState::Ready
        } else {
            CatalogState::Uninitialized
        }
    }

    fn words_by_level(&self, level: u8) -> Vec<Word> {
        self.query_words(
            &format!("SELECT {WORD_COLUMNS} FROM words WHERE level = ?1 ORDER BY id"),
            params![level],
        )
    }

    fn distractor_candidates(
        &self,
        pos: &str,
        min_level: u8,
        max_level: u8,
        exclude_id: i64,
        limit: usize,
    ) -> Vec<Word> {
        self.query_words(
            &format!(
                r#"
                SELECT {WORD_COLUMNS} FROM words
                WHERE pos = ?1
                AND level BETWEEN ?2 AND ?3
                AND id != ?4
                ORDER BY RANDOM()
                LIMIT ?5
                "#
            ),
            params![pos, min_level, max_level, exclude_id, limit as i64],
        )
    }

    fn random_words(&self, exclude_ids: &[i64], limit: usize) -> Vec<Word> {
        let mut values: Vec<Value> = exclude_ids.iter().map(|id| Value::Integer(*id)).collect();
        let filter = if exclude_ids.is_empty() {
            String::new()
        } else {
            let placeholders = vec!["?"; exclude_ids.len()].join(", ");
            format!("WHERE id NOT IN ({placeholders})")
        };
        values.push(Value::Integer(limit as i64));

        self.query_words(
            &format!("SELECT {WORD_COLUMNS} FROM words {filter} ORDER BY RANDOM() LIMIT ?"),
            params_from_iter(values),
        )
    }

    fn counts_by_level(&self) -> BTreeMap<u8, usize> {
        let Ok(conn) = self.conn() else {
            return BTreeMap::new();
        };

        let result = conn
            .prepare("SELECT level, COUNT(*) FROM words GROUP BY level")
            .and_then(|mut stmt| {
                let counts = stmt
                    .query_map([], |row| {
                        Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)? as usize))
                    })?
                    .collect::<rusqlite::Result<BTreeMap<_, _>>>();
                counts
            });

        match result {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!("word catalog count failed: {e}");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashSet;

    pub(crate) fn new_word(word: &str, definition: &str, pos: &str, level: u8) -> NewWord {
        NewWord {
            word: word.to_string(),
            definition: definition.to_string(),
            pos: pos.to_string(),
            level,
            example: None,
        }
    }

    pub(crate) fn create_test_catalog() -> SqliteCatalog {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_words(&[
                new_word("cat", "a small domesticated feline", "n.", 1),
                new_word("dog", "a domesticated canine", "n.", 1),
                new_word("run", "to move swiftly on foot", "v.", 1),
                new_word("apple", "a round fruit", "n.", 2),
                new_word("umbrella", "a canopy against rain", "n.", 2),
                new_word("jump", "to push oneself off the ground", "v.", 2),
                new_word("serene", "calm and untroubled", "adj.", 4),
                new_word("ubiquitous", "present everywhere", "adj.", 6),
            ])
            .unwrap();
        catalog
    }

    #[test]
    fn test_uninitialized_catalog_returns_empty() {
        let catalog = SqliteCatalog::uninitialized();
        assert_eq!(catalog.state(), CatalogState::Uninitialized);
        assert!(catalog.words_by_level(1).is_empty());
        assert!(catalog.distractor_candidates("n.", 1, 2, 0, 5).is_empty());
        assert!(catalog.random_words(&[], 5).is_empty());
        assert!(catalog.counts_by_level().is_empty());
    }

    #[test]
    fn test_insert_into_uninitialized_fails() {
        let mut catalog = SqliteCatalog::uninitialized();
        let result = catalog.insert_words(&[new_word("cat", "feline", "n.", 1)]);
        assert_matches!(result, Err(CatalogError::NotOpen));
    }

    #[test]
    fn test_words_by_level() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.state(), CatalogState::Ready);

        let words = catalog.words_by_level(1);
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| w.level == 1));
        assert!(catalog.words_by_level(3).is_empty());
    }

    #[test]
    fn test_counts_by_level() {
        let catalog = create_test_catalog();
        let counts = catalog.counts_by_level();
        assert_eq!(counts.get(&1), Some(&3));
        assert_eq!(counts.get(&2), Some(&3));
        assert_eq!(counts.get(&3), None);
        assert_eq!(counts.get(&6), Some(&1));
        assert_eq!(catalog.word_count(), 8);
    }

    #[test]
    fn test_distractor_candidates_filters() {
        let catalog = create_test_catalog();
        let cat = catalog
            .words_by_level(1)
            .into_iter()
            .find(|w| w.word == "cat")
            .unwrap();

        for _ in 0..20 {
            let found = catalog.distractor_candidates("n.", 1, 2, cat.id, 10);
            assert_eq!(found.len(), 3);
            assert!(found.iter().all(|w| w.pos == "n." && w.id != cat.id));
            assert!(found.iter().all(|w| (1..=2).contains(&w.level)));
        }

        assert_eq!(catalog.distractor_candidates("n.", 1, 2, cat.id, 2).len(), 2);
    }

    #[test]
    fn test_random_words_excludes_ids() {
        let catalog = create_test_catalog();
        let all = catalog.random_words(&[], 100);
        assert_eq!(all.len(), 8);

        let excluded: Vec<i64> = all.iter().take(5).map(|w| w.id).collect();
        let rest = catalog.random_words(&excluded, 100);
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|w| !excluded.contains(&w.id)));

        let ids: HashSet<i64> = rest.iter().map(|w| w.id).collect();
        assert_eq!(ids.len(), rest.len());
    }

    #[test]
    fn test_insert_rejects_invalid_level() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let result = catalog.insert_words(&[
            new_word("ok", "fine", "adj.", 1),
            new_word("bad", "not good", "adj.", 9),
        ]);
        assert_matches!(result, Err(CatalogError::InvalidLevel(9)));
        assert_eq!(catalog.word_count(), 0);
    }

    #[test]
    fn test_insert_rejects_blank_word_or_definition() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let result = catalog.insert_words(&[
            new_word("ok", "fine", "adj.", 1),
            new_word("  ", "something", "n.", 1),
        ]);
        assert_matches!(result, Err(CatalogError::BlankField { entry: 2, field: "word" }));

        let result = catalog.insert_words(&[new_word("calm", "", "adj.", 1)]);
        assert_matches!(result, Err(CatalogError::BlankField { entry: 1, field: "definition" }));
        assert_eq!(catalog.word_count(), 0);
    }

    #[test]
    fn test_load_csv_rejects_blank_word() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let data = "word,definition,pos,level,example
,something,n.,1,
";
        assert_matches!(
            catalog.load_csv(data.as_bytes()),
            Err(CatalogError::BlankField { field: "word", .. })
        );
        assert!(catalog.words_by_level(1).is_empty());
    }

    #[test]
    fn test_load_csv() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let data = "word,definition,pos,level,example\n\
                    brave,showing courage,adj.,2,She was brave.\n\
                    calm,not excited,adj.,1,\n";
        let added = catalog.load_csv(data.as_bytes()).unwrap();
        assert_eq!(added, 2);

        let level_one = catalog.words_by_level(1);
        assert_eq!(level_one.len(), 1);
        assert_eq!(level_one[0].word, "calm");
        assert_eq!(level_one[0].example, None);

        let level_two = catalog.words_by_level(2);
        assert_eq!(level_two[0].example.as_deref(), Some("She was brave."));
    }

    #[test]
    fn test_load_csv_rejects_bad_level() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        let data = "word,definition,pos,level,example\nbrave,showing courage,adj.,two,\n";
        assert_matches!(catalog.load_csv(data.as_bytes()), Err(CatalogError::Csv(_)));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab.db");
        {
            let mut catalog = SqliteCatalog::open(&path).unwrap();
            catalog
                .insert_words(&[new_word("cat", "feline", "n.", 1)])
                .unwrap();
        }
        let reopened = SqliteCatalog::open(&path).unwrap();
        assert_eq!(reopened.words_by_level(1).len(), 1);
    }
}
