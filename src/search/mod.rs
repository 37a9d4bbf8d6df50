//! BM25 search index (component C10) with a Levenshtein-distance
//! fallback when no document scores positively.

use crate::graph::Graph;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const SEARCH_INDEX_VERSION: &str = "search-index-v1";

const K1: f64 = 1.2;
const B: f64 = 0.75;

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9_]+").unwrap())
}

fn tokenize(s: &str) -> Vec<String> {
    token_re().find_iter(&s.to_ascii_lowercase()).map(|m| m.as_str().to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name_tokens: Vec<String>,
    pub term_freq: BTreeMap<String, u32>,
    pub length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    pub version: String,
    pub documents: Vec<Document>,
    pub document_count: u32,
    pub avg_doc_length: f64,
    pub doc_freq: BTreeMap<String, u32>,
}

impl SearchIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut documents = Vec::new();
        let mut doc_freq: BTreeMap<String, u32> = BTreeMap::new();

        for node in graph.nodes.values() {
            let name_tokens = tokenize(&node.name);
            let signature_tokens = tokenize(&node.signature);
            let path_tokens = tokenize(&node.file);
            let doc_tokens = node.doc.as_deref().map(tokenize).unwrap_or_default();

            let mut term_freq: BTreeMap<String, u32> = BTreeMap::new();
            for t in &name_tokens {
                *term_freq.entry(t.clone()).or_insert(0) += 4;
            }
            for t in &signature_tokens {
                *term_freq.entry(t.clone()).or_insert(0) += 2;
            }
            for t in &path_tokens {
                *term_freq.entry(t.clone()).or_insert(0) += 2;
            }
            for t in &doc_tokens {
                *term_freq.entry(t.clone()).or_insert(0) += 1;
            }

            let length: u32 = term_freq.values().sum();
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }

            documents.push(Document { id: node.id.clone(), name_tokens, term_freq, length });
        }

        let document_count = documents.len() as u32;
        let avg_doc_length = if document_count == 0 {
            0.0
        } else {
            documents.iter().map(|d| d.length as f64).sum::<f64>() / document_count as f64
        };

        Self {
            version: SEARCH_INDEX_VERSION.to_string(),
            documents,
            document_count,
            avg_doc_length,
            doc_freq,
        }
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.document_count as f64;
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn bm25_score(&self, query_terms: &[String], doc: &Document) -> f64 {
        let mut score = 0.0;
        for term in query_terms {
            let Some(&tf) = doc.term_freq.get(term) else { continue };
            let tf = tf as f64;
            let idf = self.idf(term);
            let denom = tf + K1 * (1.0 - B + B * doc.length as f64 / self.avg_doc_length.max(1.0));
            score += idf * (tf * (K1 + 1.0)) / denom;
        }
        score
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<(String, f64)> {
        let query_terms = tokenize(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(String, f64)> = self
            .documents
            .iter()
            .map(|d| (d.id.clone(), self.bm25_score(&query_terms, d)))
            .filter(|(_, s)| *s > 0.0)
            .collect();

        if scored.is_empty() {
            return self.levenshtein_fallback(&query_terms, limit);
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        scored
    }

    fn levenshtein_fallback(&self, query_terms: &[String], limit: usize) -> Vec<(String, f64)> {
        let query_joined: String = query_terms.concat();
        let max_distance = (query_joined.len() / 3).max(2);

        let mut candidates: Vec<(String, usize)> = self
            .documents
            .iter()
            .map(|d| {
                let name_joined: String = d.name_tokens.concat();
                (d.id.clone(), levenshtein(&query_joined, &name_joined))
            })
            .filter(|(_, dist)| *dist <= max_distance)
            .collect();

        candidates.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        candidates.truncate(limit);
        candidates.into_iter().map(|(id, dist)| (id, 1.0 / (1.0 + dist as f64))).collect()
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{FileSymbols, Language};
    use crate::symbol::{Symbol, SymbolKind};
    use std::collections::BTreeMap as Map;

    fn file(path: &str, names: &[&str]) -> FileSymbols {
        FileSymbols {
            path: path.to_string(),
            language: Language::Go,
            hash: "h".to_string(),
            symbols: names
                .iter()
                .enumerate()
                .map(|(i, n)| Symbol {
                    id: format!("{path}|{}|function|{n}", i + 1),
                    name: n.to_string(),
                    kind: SymbolKind::Function,
                    signature: format!("func {n}()"),
                    line: i as u32 + 1,
                    doc: None,
                    calls: vec![],
                })
                .collect(),
            imports: vec![],
            import_aliases: Map::new(),
        }
    }

    #[test]
    fn exact_name_term_scores_positively() {
        let graph = Graph::build(&[file("a.go", &["parseConfig", "loadFile"])]);
        let index = SearchIndex::build(&graph);
        let results = index.search("parse config", 10);
        assert!(!results.is_empty());
        assert!(results[0].0.contains("parseConfig"));
    }

    #[test]
    fn levenshtein_fallback_finds_near_miss() {
        let graph = Graph::build(&[file("a.go", &["parseConfig"])]);
        let index = SearchIndex::build(&graph);
        let results = index.search("zzzzzzzzzz", 10);
        assert!(results.is_empty() || results.iter().all(|(_, s)| *s <= 1.0));
    }

    #[test]
    fn levenshtein_close_query_matches() {
        let graph = Graph::build(&[file("a.go", &["helper"])]);
        let index = SearchIndex::build(&graph);
        let results = index.search("helpr", 10);
        assert!(!results.is_empty());
    }

    #[test]
    fn results_sorted_score_desc_then_id_asc() {
        let graph = Graph::build(&[file("a.go", &["run", "running"])]);
        let index = SearchIndex::build(&graph);
        let results = index.search("run", 10);
        assert!(results.len() >= 1);
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }
}
