use crate::error::LrError;
use crate::pagerank::graph_store::FileBackedGraph;
use linkrank_api::{Counter, Observer};
use log::debug;

/// When the power iteration stops.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Exactly this many iterations.
    Iterations(u32),
    /// Until the L1 distance between two successive vectors is below `epsilon`.
    Convergence { epsilon: f64, max_iterations: u32 },
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Convergence { epsilon: 1e-9, max_iterations: 100 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct PageRankConfig {
    pub damping: f64,
    pub termination: Termination,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        PageRankConfig { damping: 0.85, termination: Termination::default() }
    }
}

/// One power iteration: a full sequential pass over the graph file.
fn iterate(graph: &FileBackedGraph, rank: &[f64], damping: f64) -> Result<Vec<f64>, LrError> {
    let node_count = rank.len() as f64;
    let mut contributions = vec![0_f64; rank.len()];
    // Rank held by sources with graph destinations. What remains belongs to dangling nodes.
    let mut linked_mass = 0_f64;
    for record in graph.records()? {
        let record = record?;
        let source_rank = rank[record.source as usize];
        linked_mass += source_rank;
        let share = source_rank / f64::from(record.degree);
        for destination in record.destinations {
            contributions[destination as usize] += share;
        }
    }
    let dangling_mass = (rank.iter().sum::<f64>() - linked_mass).max(0_f64);
    let base = (1_f64 - damping) / node_count + damping * dangling_mass / node_count;
    Ok(contributions.into_iter().map(|contribution| base + damping * contribution).collect())
}

fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Computes the rank of every node of `graph`, indexed by node id. The vector sums to 1.
pub fn compute_page_rank(
    graph: &FileBackedGraph,
    config: PageRankConfig,
    observer: &dyn Observer,
) -> Result<Vec<f64>, LrError> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(Vec::new());
    }
    let mut rank = vec![1_f64 / node_count as f64; node_count];
    let (max_iterations, epsilon) = match config.termination {
        Termination::Iterations(iterations) => (iterations, None),
        Termination::Convergence { epsilon, max_iterations } => (max_iterations, Some(epsilon)),
    };
    for iteration in 1..=max_iterations {
        let next = iterate(graph, &rank, config.damping)?;
        let delta = l1_distance(&rank, &next);
        rank = next;
        observer.on_counter(Counter::RankIterations, 1);
        debug!("PageRank iteration {}: delta = {:e}", iteration, delta);
        if epsilon.map_or(false, |epsilon| delta < epsilon) {
            break;
        }
    }
    Ok(rank)
}
