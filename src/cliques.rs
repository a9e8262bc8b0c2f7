//! Maximal clique enumeration over adjacency-list graphs.
//!
//! Compatibility graphs of pattern collections are tiny (one vertex per
//! pattern), so Bron-Kerbosch with pivoting enumerates all maximal cliques
//! comfortably even though the problem is exponential in general. The
//! enumeration is deterministic: vertices are visited in ascending order and
//! the pivot is the first vertex maximizing coverage of the candidate set.

use rustc_hash::FxHashSet;

/// Returns all maximal cliques of an undirected graph.
///
/// The graph is given as adjacency lists: `graph[v]` holds the neighbors of
/// vertex `v`. Edges must be symmetric and self loops must be absent. Every
/// returned clique lists its vertices in ascending order; every vertex
/// appears in at least one clique (an isolated vertex forms a clique of
/// size one).
pub fn max_cliques(graph: &[Vec<usize>]) -> Vec<Vec<usize>> {
    if graph.is_empty() {
        return Vec::new();
    }
    let adjacency: Vec<FxHashSet<usize>> = graph
        .iter()
        .map(|neighbors| neighbors.iter().copied().collect())
        .collect();

    let mut cliques = Vec::new();
    let mut current = Vec::new();
    let candidates: Vec<usize> = (0..graph.len()).collect();
    bron_kerbosch(
        &adjacency,
        &mut current,
        candidates,
        Vec::new(),
        &mut cliques,
    );
    cliques
}

/// One recursion step: `current` is the clique built so far, `candidates`
/// the vertices that extend it, `excluded` the vertices already covered by
/// earlier branches. A maximal clique is reported when both sets are empty.
fn bron_kerbosch(
    adjacency: &[FxHashSet<usize>],
    current: &mut Vec<usize>,
    candidates: Vec<usize>,
    excluded: Vec<usize>,
    cliques: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        let mut clique = current.clone();
        clique.sort_unstable();
        cliques.push(clique);
        return;
    }

    // Pivot on the vertex covering the most candidates; only candidates
    // outside its neighborhood need their own branch.
    let mut pivot: Option<usize> = None;
    let mut pivot_coverage = 0;
    for &vertex in candidates.iter().chain(excluded.iter()) {
        let coverage = candidates
            .iter()
            .filter(|v| adjacency[vertex].contains(v))
            .count();
        if pivot.is_none() || coverage > pivot_coverage {
            pivot = Some(vertex);
            pivot_coverage = coverage;
        }
    }
    let branch_vertices: Vec<usize> = match pivot {
        Some(pivot) => candidates
            .iter()
            .copied()
            .filter(|v| !adjacency[pivot].contains(v))
            .collect(),
        None => Vec::new(),
    };

    let mut candidates = candidates;
    let mut excluded = excluded;
    for vertex in branch_vertices {
        let neighbors = &adjacency[vertex];
        let next_candidates: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|v| neighbors.contains(v))
            .collect();
        let next_excluded: Vec<usize> = excluded
            .iter()
            .copied()
            .filter(|v| neighbors.contains(v))
            .collect();

        current.push(vertex);
        bron_kerbosch(adjacency, current, next_candidates, next_excluded, cliques);
        current.pop();

        candidates.retain(|&v| v != vertex);
        excluded.push(vertex);
    }
}
