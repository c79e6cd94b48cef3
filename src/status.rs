// System status display: embedding store stats and configured endpoints.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::embedding;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    let db_path = config.embedding_db.as_str();
    if !Path::new(db_path).exists() {
        println!("Embedding store: not initialized");
        println!("\nRun `tableunion init` to create it at {db_path}.");
        return Ok(());
    }

    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Embedding store: {} ({})", db_path, file_size);

    let store = embedding::open(db_path)?;
    let stats = store.stats()?;
    match stats.dimension {
        Some(dim) => println!("Words: {} ({}-dim vectors)", stats.words, dim),
        None => {
            println!("Words: none loaded yet");
            println!("  Run `tableunion load-embeddings <file>` to fill the store");
        }
    }

    let table_dir = if config.table_dir.is_dir() {
        config.table_dir.display().to_string()
    } else {
        format!("{} (missing)", config.table_dir.display())
    };
    println!("Table directory: {table_dir}");
    println!(
        "Retrieval index: {} (timeout {}s, k = {})",
        config.index_url,
        config.index_timeout.as_secs(),
        config.candidates_k
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
