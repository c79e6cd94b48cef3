// Maximum-weight bipartite matching over a sparse edge list.
//
// Objective, in order:
//   1. as many matched pairs as possible (maximum cardinality);
//   2. among those, the largest total weight.
//
// Solved as a rectangular assignment problem with the Hungarian method. Every
// real edge is worth `C + w` and every non-edge is worth 0, where C exceeds
// the largest possible weight swing of a matching (weights are cosines in
// [-1, 1]), so one extra pair always beats any reshuffle of weights. Non-edges
// picked by the assignment are dropped from the result.
//
// Ties are broken deterministically: the solver scans columns in order and
// only moves on a strictly better reduced cost, so equal-weight alternatives
// resolve toward lower node positions.

use std::collections::BTreeMap;

/// Pairs of (left position, right position) forming a matching, sorted by
/// left position.
pub fn max_weight_matching(
    n_left: usize,
    n_right: usize,
    edges: &[(usize, usize, f64)],
) -> Vec<(usize, usize)> {
    // Keep the best weight per pair and drop anything out of range.
    let mut best: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(l, r, w) in edges {
        if l >= n_left || r >= n_right || !w.is_finite() {
            continue;
        }
        best.entry((l, r))
            .and_modify(|cur| *cur = cur.max(w))
            .or_insert(w);
    }
    if best.is_empty() {
        return Vec::new();
    }

    // The assignment solver wants rows <= columns.
    let transpose = n_left > n_right;
    let (rows, cols) = if transpose {
        (n_right, n_left)
    } else {
        (n_left, n_right)
    };

    let max_abs = best.values().fold(1.0_f64, |acc, w| acc.max(w.abs()));
    let bonus = 2.0 * max_abs * rows as f64 + 1.0;

    // Minimize cost = -(value).
    let mut cost = vec![vec![0.0_f64; cols]; rows];
    for (&(l, r), &w) in &best {
        let (i, j) = if transpose { (r, l) } else { (l, r) };
        cost[i][j] = -(bonus + w);
    }

    let assignment = hungarian(&cost);

    let mut pairs: Vec<(usize, usize)> = assignment
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| {
            let (l, r) = if transpose { (j, i) } else { (i, j) };
            best.contains_key(&(l, r)).then_some((l, r))
        })
        .collect();
    pairs.sort_unstable();
    pairs
}

/// Minimum-cost assignment of every row to a distinct column, rows <= cols.
/// Returns the column chosen for each row.
fn hungarian(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    let m = cost[0].len();

    // 1-indexed potentials; p[j] is the row assigned to column j (0 = free).
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}
