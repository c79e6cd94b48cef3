// Union expansion: how much new data a candidate adds to the query.
//
// Given an alignment (query column -> candidate column), the candidate's rows
// are projected into the query's column layout and appended. Expansion is the
// number of new distinct values per query column and the number of new
// distinct rows. Query columns without a partner receive empty cells.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// New distinct values per query column, in query column order.
    pub column_expansions: Vec<usize>,
    /// New distinct rows.
    pub row_expansion: usize,
}

impl Expansion {
    pub fn total_new_values(&self) -> usize {
        self.column_expansions.iter().sum()
    }
}

/// Compute the expansion of `query` by a union with `candidate` under
/// `mapping` (query column position -> candidate column position).
pub fn compute_expansion(
    query: &Table,
    candidate: &Table,
    mapping: &BTreeMap<usize, usize>,
) -> Expansion {
    let n_cols = query.columns.len();

    let mut column_values: Vec<HashSet<&str>> = query
        .columns
        .iter()
        .map(|c| c.values.iter().map(String::as_str).collect())
        .collect();
    let mut rows: HashSet<Vec<&str>> = (0..query.num_rows())
        .map(|r| (0..n_cols).map(|c| query.cell(r, c)).collect())
        .collect();

    let before_values: Vec<usize> = column_values.iter().map(HashSet::len).collect();
    let before_rows = rows.len();

    for r in 0..candidate.num_rows() {
        let row: Vec<&str> = (0..n_cols)
            .map(|c| match mapping.get(&c) {
                Some(&cand_col) => candidate.cell(r, cand_col),
                None => "",
            })
            .collect();
        for (c, value) in row.iter().enumerate() {
            column_values[c].insert(*value);
        }
        rows.insert(row);
    }

    Expansion {
        column_expansions: column_values
            .iter()
            .zip(before_values)
            .map(|(after, before)| after.len() - before)
            .collect(),
        row_expansion: rows.len() - before_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_expansion_counts_new_values_and_rows() {
        let query = Table::new(
            "q",
            vec![
                Column::categorical("country", strings(&["USA", "Canada"])),
                Column::categorical("capital", strings(&["Washington", "Ottawa"])),
            ],
        );
        let candidate = Table::new(
            "c",
            vec![
                Column::categorical("city", strings(&["Ottawa", "Mexico City"])),
                Column::categorical("nation", strings(&["Canada", "Mexico"])),
            ],
        );
        let mapping = BTreeMap::from([(0, 1), (1, 0)]);
        let exp = compute_expansion(&query, &candidate, &mapping);
        assert_eq!(exp.column_expansions, vec![1, 1]);
        // (Canada, Ottawa) already present; (Mexico, Mexico City) is new
        assert_eq!(exp.row_expansion, 1);
        assert_eq!(exp.total_new_values(), 2);
    }

    #[test]
    fn test_unaligned_columns_get_empty_cells() {
        let query = Table::new(
            "q",
            vec![
                Column::categorical("a", strings(&["x"])),
                Column::categorical("b", strings(&["y"])),
            ],
        );
        let candidate = Table::new("c", vec![Column::categorical("a2", strings(&["x", "z"]))]);
        let mapping = BTreeMap::from([(0, 0)]);
        let exp = compute_expansion(&query, &candidate, &mapping);
        // column b gains the empty string once
        assert_eq!(exp.column_expansions, vec![1, 1]);
        assert_eq!(exp.row_expansion, 2);
    }

    #[test]
    fn test_empty_mapping_adds_at_most_one_blank_row() {
        let query = Table::new("q", vec![Column::categorical("a", strings(&["x"]))]);
        let candidate = Table::new("c", vec![Column::categorical("b", strings(&["1", "2"]))]);
        let exp = compute_expansion(&query, &candidate, &BTreeMap::new());
        assert_eq!(exp.column_expansions, vec![1]);
        assert_eq!(exp.row_expansion, 1);
    }
}
