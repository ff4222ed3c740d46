use std::{collections::HashSet, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

const MATCH_THRESHOLD: f32 = 0.7;

#[derive(Debug, Deserialize)]
struct RawEntry {
	query: String,
	embedding: Vec<f32>,
}

struct TableEntry {
	tokens: HashSet<String>,
	embedding: Vec<f32>,
}

/// Offline table of common queries and their embeddings, consulted when the
/// daily provider quota is exhausted. Entries with the wrong dimensionality
/// or non-finite components are dropped at load time.
pub struct PrecomputedTable {
	entries: Vec<TableEntry>,
}
impl PrecomputedTable {
	pub fn empty() -> Self {
		Self { entries: Vec::new() }
	}

	pub fn load(path: &Path, dimensions: u32) -> Result<Self> {
		let raw = std::fs::read_to_string(path)
			.map_err(|err| Error::Read { path: path.to_path_buf(), source: err })?;
		let raw_entries: Vec<RawEntry> = serde_json::from_str(&raw)
			.map_err(|err| Error::Parse { path: path.to_path_buf(), source: err })?;
		let entries = raw_entries
			.into_iter()
			.filter(|entry| {
				entry.embedding.len() == dimensions as usize
					&& entry.embedding.iter().all(|value| value.is_finite())
			})
			.filter_map(|entry| {
				let tokens = tokenize(&entry.query);

				(!tokens.is_empty())
					.then_some(TableEntry { tokens, embedding: entry.embedding })
			})
			.collect();

		Ok(Self { entries })
	}

	/// Best stored embedding whose query overlaps the given one with Jaccard
	/// similarity of at least 0.7. Ties keep the earlier entry.
	pub fn lookup(&self, query: &str) -> Option<&[f32]> {
		let tokens = tokenize(query);

		if tokens.is_empty() {
			return None;
		}

		let mut best: Option<(&TableEntry, f32)> = None;

		for entry in &self.entries {
			let intersection = tokens.intersection(&entry.tokens).count();
			let union = tokens.len() + entry.tokens.len() - intersection;

			if union == 0 {
				continue;
			}

			let score = intersection as f32 / union as f32;

			if score >= MATCH_THRESHOLD && best.is_none_or(|(_, top)| score > top) {
				best = Some((entry, score));
			}
		}

		best.map(|(entry, _)| entry.embedding.as_slice())
	}
}

/// Single-character tokens carry no signal and are dropped before matching.
fn tokenize(query: &str) -> HashSet<String> {
	query
		.split_whitespace()
		.filter(|token| token.chars().count() > 1)
		.map(|token| token.to_lowercase())
		.collect()
}

#[cfg(test)]
mod tests {
	use petal_testkit::TestDir;

	use super::*;

	fn write_table(dir: &TestDir, body: &str) -> std::path::PathBuf {
		let path = dir.file("common_queries.json");

		std::fs::write(&path, body).expect("write failed");

		path
	}

	#[test]
	fn exact_query_matches() {
		let dir = TestDir::new().expect("test dir failed");
		let path =
			write_table(&dir, r#"[{"query": "vegan serum", "embedding": [0.1, 0.2, 0.3]}]"#);
		let table = PrecomputedTable::load(&path, 3).expect("load failed");

		assert_eq!(table.lookup("Vegan Serum"), Some([0.1, 0.2, 0.3].as_slice()));
	}

	#[test]
	fn partial_overlap_below_threshold_misses() {
		let dir = TestDir::new().expect("test dir failed");
		let path = write_table(
			&dir,
			r#"[{"query": "vegan hydrating night serum", "embedding": [0.1, 0.2, 0.3]}]"#,
		);
		let table = PrecomputedTable::load(&path, 3).expect("load failed");

		// One shared token out of four distinct ones, Jaccard 0.25.
		assert_eq!(table.lookup("serum"), None);
	}

	#[test]
	fn best_overlap_wins() {
		let dir = TestDir::new().expect("test dir failed");
		let path = write_table(
			&dir,
			r#"[
				{"query": "vegan serum cream", "embedding": [1.0, 0.0, 0.0]},
				{"query": "vegan serum", "embedding": [0.0, 1.0, 0.0]}
			]"#,
		);
		let table = PrecomputedTable::load(&path, 3).expect("load failed");

		assert_eq!(table.lookup("vegan serum"), Some([0.0, 1.0, 0.0].as_slice()));
	}

	#[test]
	fn bad_entries_are_dropped_at_load() {
		let dir = TestDir::new().expect("test dir failed");
		let path = write_table(
			&dir,
			r#"[
				{"query": "vegan serum", "embedding": [0.1, 0.2]},
				{"query": "", "embedding": [0.1, 0.2, 0.3]}
			]"#,
		);
		let table = PrecomputedTable::load(&path, 3).expect("load failed");

		assert_eq!(table.lookup("vegan serum"), None);
	}

	#[test]
	fn empty_query_never_matches() {
		let table = PrecomputedTable::empty();

		assert_eq!(table.lookup("  "), None);
		assert_eq!(table.lookup("a"), None);
	}
}
