use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::{Content, Data, IndexConfig, LocalIndex, SearchParams};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Accepted input shapes: the native `{id, contents}` document, or a plain
/// `{id, title, body}` record whose title and body become two contents.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputDoc {
    Data(Data),
    Article {
        id: String,
        #[serde(default)]
        title: String,
        body: String,
    },
}

impl From<InputDoc> for Data {
    fn from(doc: InputDoc) -> Self {
        match doc {
            InputDoc::Data(data) => data,
            InputDoc::Article { id, title, body } => {
                let mut contents = Vec::new();
                if !title.is_empty() {
                    contents.push(Content::new("title", title));
                }
                contents.push(Content::new("body", body));
                Data::new(id, contents)
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Index documents in memory and query their TF-IDF scores", long_about = None)]
struct Cli {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long, global = true, default_value = ".")]
    input: String,
    /// Locale used for stopword filtering
    #[arg(long, global = true, env = "LOCAL_SEARCH_LOCALE", default_value = "en")]
    locale: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents against a free-text query
    Search {
        #[arg(long)]
        query: String,
        #[arg(long, env = "LOCAL_SEARCH_MAX_RESULTS", default_value_t = 10)]
        max_results: usize,
        /// Remove hyphens from the query before matching
        #[arg(long, default_value_t = false)]
        remove_hyphens: bool,
    },
    /// Print the cached TF-IDF scores of one normalized term
    Tfidf {
        #[arg(long)]
        term: String,
    },
    /// Print document and term counts
    Stats,
}

#[derive(Serialize)]
struct Stats {
    num_docs: usize,
    num_terms: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let docs = load_documents(Path::new(&cli.input))?;
    let mut index = LocalIndex::new(IndexConfig { locale: cli.locale.clone() });
    index.add_or_update(&docs);
    tracing::info!(num_docs = index.get_size(), input = %cli.input, "indexed documents");

    let output = render(&index, cli.command, &cli.locale)?;
    println!("{output}");
    Ok(())
}

/// Runs one subcommand against a built index and renders its JSON output.
fn render(index: &LocalIndex, command: Commands, locale: &str) -> Result<String> {
    let output = match command {
        Commands::Search { query, max_results, remove_hyphens } => {
            let params = SearchParams { max_results, locale: locale.to_string(), remove_hyphens_in_query: remove_hyphens };
            let hits = index.find(&query, &params).with_context(|| format!("search for {query:?} failed"))?;
            serde_json::to_string_pretty(&hits)?
        }
        Commands::Tfidf { term } => {
            let mut results = index.inverted_index().get_tfidf(&term).to_vec();
            results.sort_by(|a, b| a.document_id.cmp(&b.document_id));
            serde_json::to_string_pretty(&results)?
        }
        Commands::Stats => {
            let stats = Stats { num_docs: index.get_size(), num_terms: index.inverted_index().num_terms() };
            serde_json::to_string_pretty(&stats)?
        }
    };
    Ok(output)
}

fn load_documents(input: &Path) -> Result<Vec<Data>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let loaded = if extension(&file) == Some("jsonl") { read_jsonl(&file) } else { read_json(&file) };
        docs.extend(loaded.with_context(|| format!("reading {}", file.display()))?);
    }
    Ok(docs)
}

fn extension(p: &Path) -> Option<&str> { p.extension().and_then(|s| s.to_str()) }

fn read_jsonl(file: &Path) -> Result<Vec<Data>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)?;
        docs.push(doc.into());
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<Data>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value::<InputDoc>(v).map(Data::from))
            .collect::<serde_json::Result<Vec<_>>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value::<InputDoc>(json)?.into()],
        _ => Vec::new(),
    };
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_both_document_shapes() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"[{"id": "wifi", "contents": [{"id": "1", "content": "Wi-Fi networks"}]}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("articles.jsonl"),
            "{\"id\": \"a1\", \"title\": \"Dark theme\", \"body\": \"Switch to a dark theme\"}\n\n{\"id\": \"a2\", \"body\": \"Night light\"}\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "wifi"]);
        assert_eq!(docs[0].contents, vec![Content::new("title", "Dark theme"), Content::new("body", "Switch to a dark theme")]);
        assert_eq!(docs[1].contents.len(), 1);

        let mut index = LocalIndex::new(IndexConfig::default());
        index.add_or_update(&docs);
        let hits = index.find("dark", &SearchParams::default()).unwrap();
        assert_eq!(hits[0].id, "a1");
    }

    fn sample_index() -> LocalIndex {
        let mut index = LocalIndex::new(IndexConfig::default());
        index.add_or_update(&[
            Data::new("theme", vec![Content::new("title", "Dark theme")]),
            Data::new("light", vec![Content::new("title", "Night light")]),
        ]);
        index
    }

    fn render_json(index: &LocalIndex, command: Commands) -> serde_json::Value {
        let output = render(index, command, "en").unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn renders_search_hits() {
        let index = sample_index();
        let json = render_json(&index, Commands::Search { query: "dark".into(), max_results: 10, remove_hyphens: false });
        let hits = json.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], "theme");
        assert_eq!(hits[0]["positions"][0]["term"], "dark");
        assert_eq!(hits[0]["positions"][0]["exact"], true);
        assert_eq!(hits[0]["positions"][0]["posting"][0]["start"], 0);
        assert_eq!(hits[0]["positions"][0]["posting"][0]["length"], 4);
        assert!((hits[0]["score"].as_f64().unwrap() - 0.5 * 2f64.ln()).abs() < 1e-5);
    }

    #[test]
    fn search_errors_surface() {
        let index = sample_index();
        let err = render(&index, Commands::Search { query: "the".into(), max_results: 10, remove_hyphens: false }, "en")
            .unwrap_err();
        assert!(err.to_string().contains("search for \"the\" failed"));
    }

    #[test]
    fn renders_tfidf_sorted_by_document() {
        let mut index = sample_index();
        index.add_or_update(&[Data::new("auto", vec![Content::new("title", "Auto dark mode")])]);
        let json = render_json(&index, Commands::Tfidf { term: "dark".into() });
        let results = json.as_array().unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r["document_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["auto", "theme"]);
        assert_eq!(results[1]["posting"][0]["content_id"], "title");

        let missing = render_json(&index, Commands::Tfidf { term: "missing".into() });
        assert_eq!(missing, serde_json::json!([]));
    }

    #[test]
    fn renders_stats() {
        let json = render_json(&sample_index(), Commands::Stats);
        assert_eq!(json, serde_json::json!({ "num_docs": 2, "num_terms": 4 }));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_documents(&dir.path().join("nope")).is_err());
    }
}
