//! Where the word catalogue comes from.

use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;

use crate::{SupplyError, WordRecord};

/// A backing store for the word catalogue.
///
/// `fetch` returns the whole catalogue. Implementations may hit a database,
/// a file, or memory; the [`WordCache`](crate::WordCache) in front of them
/// keeps the call rate down. The returned future must be `Send` because it
/// is awaited inside room actor tasks.
///
/// Implementors can simply write `async fn fetch(&self) -> ...`.
pub trait WordSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<WordRecord>, SupplyError>> + Send;
}

// ---------------------------------------------------------------------------
// StaticWordSource
// ---------------------------------------------------------------------------

/// A fixed, in-memory catalogue.
#[derive(Debug, Clone, Default)]
pub struct StaticWordSource {
    words: Vec<WordRecord>,
}

impl StaticWordSource {
    pub fn new(words: Vec<WordRecord>) -> Self {
        Self { words }
    }

    /// Builds a catalogue from `(word, hint)` pairs, dropping blank words.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            words: pairs
                .into_iter()
                .filter_map(|(word, hint)| WordRecord::new(word, hint))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for StaticWordSource {
    async fn fetch(&self) -> Result<Vec<WordRecord>, SupplyError> {
        Ok(self.words.clone())
    }
}

// ---------------------------------------------------------------------------
// JsonFileWordSource
// ---------------------------------------------------------------------------

/// Shape of one entry in a catalogue file. `length` is derived, so any
/// value present in the file is ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    word: String,
    #[serde(default)]
    hint: String,
}

/// Reads the catalogue from a JSON file on every fetch:
///
/// ```json
/// [
///   { "word": "apple", "hint": "A red or green fruit" },
///   { "word": "bridge", "hint": "Crosses a river" }
/// ]
/// ```
///
/// Entries with a blank word are skipped.
#[derive(Debug, Clone)]
pub struct JsonFileWordSource {
    path: PathBuf,
}

impl JsonFileWordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WordSource for JsonFileWordSource {
    async fn fetch(&self) -> Result<Vec<WordRecord>, SupplyError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let raw: Vec<RawRecord> = serde_json::from_str(&text)?;
        let total = raw.len();
        let words: Vec<WordRecord> = raw
            .into_iter()
            .filter_map(|r| WordRecord::new(&r.word, &r.hint))
            .collect();
        if words.len() < total {
            tracing::debug!(
                path = %self.path.display(),
                skipped = total - words.len(),
                "skipped blank catalogue entries"
            );
        }
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_returns_normalized_pairs() {
        let source = StaticWordSource::from_pairs([("Apple", "fruit"), ("  ", "blank")]);
        assert_eq!(source.len(), 1);
        let words = source.fetch().await.unwrap();
        assert_eq!(words[0].word, "apple");
    }

    #[tokio::test]
    async fn test_json_file_source_reads_and_skips_blank() {
        let path = std::env::temp_dir().join(format!(
            "wordrush-words-{}.json",
            std::process::id()
        ));
        tokio::fs::write(
            &path,
            r#"[{"word": "Bridge", "hint": "Crosses a  river"}, {"word": " "}, {"word": "kite"}]"#,
        )
        .await
        .unwrap();

        let words = JsonFileWordSource::new(&path).fetch().await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "bridge");
        assert_eq!(words[0].hint, "Crosses a river");
        assert_eq!(words[1].hint, "");
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file_is_io_error() {
        let source = JsonFileWordSource::new("/definitely/not/here/words.json");
        let result = source.fetch().await;
        assert!(matches!(result, Err(SupplyError::Io(_))));
    }
}
