// Colored terminal output for alignments, similarity graphs and reports.
//
// main.rs delegates all terminal formatting here.

use colored::Colorize;

use crate::alignment::expansion::Expansion;
use crate::alignment::{Alignment, SimilarityGraph};
use crate::pipeline::SearchReport;
use crate::table::Table;

/// Display one alignment as a column-pair table, with value samples when
/// the tables are at hand.
pub fn display_alignment(alignment: &Alignment, query: &Table, candidate: &Table) {
    println!(
        "\n{}",
        format!(
            "=== {} <-> {} ({} aligned) ===",
            alignment.query_table,
            alignment.candidate_table,
            alignment.len()
        )
        .bold()
    );

    if alignment.is_empty() {
        println!("  No columns aligned.");
        if query.is_same_table(candidate) {
            println!("  {}", "A table is never aligned with itself.".dimmed());
        }
        return;
    }

    println!();
    println!(
        "  {:<24} {:<24} {:>10}",
        "Query column".dimmed(),
        "Candidate column".dimmed(),
        "Similarity".dimmed(),
    );
    println!("  {}", "-".repeat(60).dimmed());

    for pair in &alignment.pairs {
        println!(
            "  {:<24} {:<24} {:>10}",
            super::truncate_chars(&pair.query_column, 22),
            super::truncate_chars(&pair.candidate_column, 22),
            colorize_similarity(pair.similarity),
        );
        if let (Some(q), Some(c)) = (
            query.columns.get(pair.query_index),
            candidate.columns.get(pair.candidate_index),
        ) {
            let q_sample = super::format_sample(q.sample(super::SAMPLE_SIZE), 20);
            let c_sample = super::format_sample(c.sample(super::SAMPLE_SIZE), 20);
            println!("    {} {}", "q:".dimmed(), q_sample.dimmed());
            println!("    {} {}", "c:".dimmed(), c_sample.dimmed());
        }
    }

    println!();
    if let Some(k) = alignment.k_unionability() {
        println!("  k-unionability: {}", colorize_similarity(k));
    }
    if !alignment.unmatched_query.is_empty() {
        println!(
            "  Unmatched query columns: {}",
            alignment.unmatched_query.join(", ")
        );
    }
    if !alignment.unmatched_candidate.is_empty() {
        println!(
            "  Unmatched candidate columns: {}",
            alignment.unmatched_candidate.join(", ")
        );
    }
}

/// Display the full weight matrix of a similarity graph.
pub fn display_graph(graph: &SimilarityGraph) {
    if graph.is_empty() {
        return;
    }

    println!("\n  {}", "Similarity graph:".bold());
    print!("  {:<20}", "");
    for node in &graph.right {
        print!(" {:>12}", super::truncate_chars(&node.name, 9));
    }
    println!();

    for (l, node) in graph.left.iter().enumerate() {
        print!("  {:<20}", super::truncate_chars(&node.name, 17));
        for r in 0..graph.right.len() {
            match graph.weight(l, r) {
                Some(w) => print!(" {:>12.3}", w),
                None => print!(" {:>12}", "-".dimmed()),
            }
        }
        println!();
    }
}

/// Display a ranked candidate list from a search.
pub fn display_search_report(report: &SearchReport) {
    if report.candidates.is_empty() {
        println!("No candidates returned for {}.", report.query_table);
        return;
    }

    println!(
        "\n{}",
        format!(
            "=== Candidates for {} ({} retrieved, {} aligned) ===",
            report.query_table,
            report.candidates.len(),
            report.alignments.len()
        )
        .bold()
    );
    println!();
    println!(
        "  {:>4}  {:<40} {:>7}  {:>8}",
        "Rank".dimmed(),
        "Table".dimmed(),
        "Columns".dimmed(),
        "k-union".dimmed(),
    );
    println!("  {}", "-".repeat(64).dimmed());

    for (i, alignment) in report.alignments.iter().enumerate() {
        let k = alignment
            .k_unionability()
            .map(|k| colorize_similarity(k).to_string())
            .unwrap_or_else(|| "-".dimmed().to_string());
        println!(
            "  {:>4}. {:<40} {:>7}  {:>8}",
            i + 1,
            super::truncate_chars(&alignment.candidate_table, 38),
            alignment.len(),
            k,
        );
    }

    let skipped = report.candidates.len().saturating_sub(report.alignments.len());
    if skipped > 0 {
        println!(
            "\n  {} {} candidates could not be aligned (see log)",
            "!".yellow(),
            skipped
        );
    }
}

/// Display what a union with the candidate adds to the query.
pub fn display_expansion(query: &Table, expansion: &Expansion) {
    println!("\n  {}", "Union expansion:".bold());
    for (column, added) in query.columns.iter().zip(&expansion.column_expansions) {
        let added_str = if *added > 0 {
            format!("+{added}").green().to_string()
        } else {
            "0".dimmed().to_string()
        };
        let name = super::truncate_chars(&column.name, 22);
        println!("    {:<24} {}", name, added_str);
    }
    println!(
        "  New distinct values: {}  |  New rows: {}",
        expansion.total_new_values(),
        expansion.row_expansion
    );
}

/// Colorize a similarity by strength.
fn colorize_similarity(similarity: f64) -> colored::ColoredString {
    let text = format!("{similarity:.3}");
    if similarity >= 0.8 {
        text.green().bold()
    } else if similarity >= 0.5 {
        text.green()
    } else if similarity >= 0.2 {
        text.yellow()
    } else {
        text.dimmed()
    }
}
