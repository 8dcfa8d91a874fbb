use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ircore::persist::{load_collection, save_collection};
use ircore::{extract_collection_from, Collection, DocId, Document, Evaluator, ModelKind, Preprocessing};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build document collections and query them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a collection from a text file or a directory of .txt files
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output collection file (JSON)
        #[arg(long)]
        output: String,
    },
    /// Run a query against a saved collection
    Query {
        /// Collection file (JSON)
        #[arg(long, default_value = "./collection.json")]
        collection: String,
        /// linear-boolean, inverted-boolean, vector-space, fuzzy-set or signature
        #[arg(long, default_value = "vector-space")]
        model: ModelKind,
        /// Remove stopwords from documents and query
        #[arg(long, default_value_t = false)]
        stopwords: bool,
        /// Stem documents and query
        #[arg(long, default_value_t = false)]
        stemming: bool,
        /// Also print documents scoring zero
        #[arg(long, default_value_t = false)]
        all: bool,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_collection(&input, &output),
        Commands::Query { collection, model, stopwords, stemming, all, query } => {
            run_query(&collection, model, Preprocessing::new(stopwords, stemming), all, &query)
        }
    }
}

fn build_collection(input: &str, output: &str) -> Result<()> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("input {input} does not exist");
    }

    let mut next_doc_id: DocId = 0;
    let mut docs: Vec<Document> = Vec::new();
    for file in files {
        let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        let extracted = extract_collection_from(&text, next_doc_id);
        tracing::info!(file = %file.display(), docs = extracted.len(), "extracted");
        next_doc_id += extracted.len() as DocId;
        docs.extend(extracted);
    }

    let collection = Collection::new(docs)?;
    save_collection(output, &collection)?;
    tracing::info!(output, num_docs = collection.len(), "collection build complete");
    Ok(())
}

fn run_query(path: &str, model: ModelKind, preprocessing: Preprocessing, all: bool, query: &str) -> Result<()> {
    let evaluator = Evaluator::new(load_collection(path)?);
    let hits = evaluator.search(model, query, preprocessing)?;
    println!("{model}: {} document(s) scored", hits.len());
    for hit in hits.iter().filter(|h| all || h.score > 0.0) {
        println!("{:>8.4}  [{}] {}", hit.score, hit.document.id, hit.document.title);
    }
    Ok(())
}
