use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

use tableunion::alignment::expansion::{compute_expansion, Expansion};
use tableunion::alignment::{align_tables, Alignment, ColumnAligner, ColumnVectorizer};
use tableunion::config::Config;
use tableunion::embedding::{self, codec};
use tableunion::output::terminal;
use tableunion::pipeline::{self, SearchOptions};
use tableunion::retrieval::IndexClient;
use tableunion::table::csv_store::{load_csv, CsvTableStore};

/// tableunion: find and align unionable tables.
///
/// Columns are embedded by summing word vectors over their values, compared
/// by cosine similarity, and paired one-to-one by maximum-weight matching.
#[derive(Parser)]
#[command(name = "tableunion", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the token embedding store
    Init,

    /// Load word vectors from a text embedding file (fastText .vec format)
    LoadEmbeddings {
        /// Whitespace-separated file: `word v1 v2 ...` per line
        file: PathBuf,

        /// Rows per insert transaction (default: 10000)
        #[arg(long, default_value = "10000")]
        batch_size: usize,
    },

    /// Align the columns of two CSV tables
    Align {
        /// Query table (CSV)
        query: PathBuf,

        /// Candidate table (CSV)
        candidate: PathBuf,

        /// Ignore column pairs below this similarity
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Also print the full similarity matrix
        #[arg(long)]
        graph: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Retrieve candidate tables from the index and align each one
    Search {
        /// Query table (CSV)
        query: PathBuf,

        /// Results per retrieval request (default: TABLEUNION_CANDIDATES_K)
        #[arg(long)]
        k: Option<usize>,

        /// Ask the index for whole-table unions instead of per-column matches
        #[arg(long)]
        whole_table: bool,

        /// Columns a whole-table candidate must align (default: all query columns)
        #[arg(long)]
        n: Option<usize>,

        /// Retrieval requests in flight at once (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Ignore column pairs below this similarity
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Measure how much a union with the candidate adds to the query
    Expansion {
        /// Query table (CSV)
        query: PathBuf,

        /// Candidate table (CSV)
        candidate: PathBuf,

        /// Ignore column pairs below this similarity
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute one column's vector and write it as big-endian f64s
    Vectorize {
        /// Table (CSV)
        table: PathBuf,

        /// Column name
        column: String,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Show system status (embedding store, table directory, index)
    Status,
}

#[derive(Serialize)]
struct AlignReport<'a> {
    generated_at: DateTime<Utc>,
    k_unionability: Option<f64>,
    alignment: &'a Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    expansion: Option<&'a Expansion>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tableunion=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let config = Config::load()?;
            info!(
                path = config.embedding_db.as_str(),
                "Initializing embedding store"
            );
            let store = embedding::initialize(&config.embedding_db)?;
            let stats = store.stats()?;
            println!("Embedding store initialized at: {}", config.embedding_db);
            println!("Words stored: {}", stats.words);
            if stats.words == 0 {
                println!("\nNext step: tableunion load-embeddings <wiki.en.vec>");
            }
        }

        Commands::LoadEmbeddings { file, batch_size } => {
            let config = Config::load()?;
            let store = embedding::initialize(&config.embedding_db)?;
            let reader = BufReader::new(
                File::open(&file)
                    .with_context(|| format!("Failed to open embedding file {}", file.display()))?,
            );

            println!("Loading word vectors from {}...", file.display());
            let loaded = store.load_text_embeddings(reader, batch_size)?;
            let stats = store.stats()?;
            println!(
                "{}",
                format!(
                    "Loaded {} vectors ({} words in store{})",
                    loaded,
                    stats.words,
                    stats
                        .dimension
                        .map(|d| format!(", {d}-dim"))
                        .unwrap_or_default()
                )
                .bold()
            );
        }

        Commands::Align {
            query,
            candidate,
            min_similarity,
            graph: show_graph,
            json,
        } => {
            let config = Config::load()?;
            config.require_embedding_store()?;
            let store = embedding::open(&config.embedding_db)?;
            let aligner = column_aligner(&config, min_similarity);

            let (query, candidate) = (load_table(&query)?, load_table(&candidate)?);
            let (graph, alignment) =
                align_tables(&store, &config.vectorizer, &aligner, &query, &candidate)?;

            if json {
                print_json(&AlignReport {
                    generated_at: Utc::now(),
                    k_unionability: alignment.k_unionability(),
                    alignment: &alignment,
                    expansion: None,
                })?;
            } else {
                terminal::display_alignment(&alignment, &query, &candidate);
                if show_graph {
                    terminal::display_graph(&graph);
                }
            }
        }

        Commands::Search {
            query,
            k,
            whole_table,
            n,
            concurrency,
            min_similarity,
            json,
        } => {
            let config = Config::load()?;
            config.require_embedding_store()?;
            let store = embedding::open(&config.embedding_db)?;
            let provider = CsvTableStore::new(&config.table_dir);
            let client = IndexClient::new(&config.index_url, config.index_timeout)?;
            let aligner = column_aligner(&config, min_similarity);
            let query = load_table(&query)?;

            let options = SearchOptions {
                k: k.unwrap_or(config.candidates_k),
                whole_table,
                n,
                concurrency,
            };

            if !json {
                println!(
                    "Searching {} for tables unionable with {}...",
                    client.base_url(),
                    query.id
                );
            }
            let report = pipeline::search(
                &store,
                &provider,
                &client,
                &config.vectorizer,
                &aligner,
                &query,
                &options,
            )
            .await?;

            if json {
                print_json(&report)?;
            } else {
                terminal::display_search_report(&report);
            }
        }

        Commands::Expansion {
            query,
            candidate,
            min_similarity,
            json,
        } => {
            let config = Config::load()?;
            config.require_embedding_store()?;
            let store = embedding::open(&config.embedding_db)?;
            let aligner = column_aligner(&config, min_similarity);

            let (query, candidate) = (load_table(&query)?, load_table(&candidate)?);
            let (_graph, alignment) =
                align_tables(&store, &config.vectorizer, &aligner, &query, &candidate)?;
            let expansion = compute_expansion(&query, &candidate, &alignment.column_mapping());

            if json {
                print_json(&AlignReport {
                    generated_at: Utc::now(),
                    k_unionability: alignment.k_unionability(),
                    alignment: &alignment,
                    expansion: Some(&expansion),
                })?;
            } else {
                terminal::display_alignment(&alignment, &query, &candidate);
                terminal::display_expansion(&query, &expansion);
            }
        }

        Commands::Vectorize { table, column, out } => {
            let config = Config::load()?;
            config.require_embedding_store()?;
            let store = embedding::open(&config.embedding_db)?;
            let table = load_table(&table)?;
            let values = &table
                .column(&column)
                .with_context(|| format!("No column named {column:?} in {}", table.id))?
                .values;

            let vectorizer = ColumnVectorizer::with_options(&store, config.vectorizer.clone());
            match vectorizer.vectorize(values)? {
                Some(vec) => {
                    codec::write_vec_to_file(&vec, &out)?;
                    println!("Wrote {}-dim vector to {}", vec.len(), out.display());
                }
                None => {
                    println!(
                        "{}",
                        format!("No value in column {column:?} resolved to a word vector.").yellow()
                    );
                }
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            tableunion::status::show(&config)?;
        }
    }

    Ok(())
}

/// Aligner threshold: the command-line flag wins over TABLEUNION_MIN_SIMILARITY.
fn column_aligner(config: &Config, min_similarity: Option<f64>) -> ColumnAligner {
    ColumnAligner {
        min_similarity: min_similarity.or(config.min_similarity),
    }
}

fn load_table(path: &Path) -> Result<tableunion::table::Table> {
    load_csv(path).with_context(|| format!("Failed to load table {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
