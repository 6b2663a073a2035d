//! Rank assignment and in-rank ordering through `rust-sugiyama`.

use std::{collections::HashMap, panic};

use log::{debug, trace};
use rust_sugiyama::configure::Config;

use crate::engine::EngineError;

const VERTEX_SPACING: f64 = 10.0;
const RANK_TOLERANCE: f64 = 1e-3;

/// Ranks of one connected component, each ordered left to right.
///
/// Every entry is a node index paired with its horizontal position in column
/// units: neighbours in a rank are at least one unit apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedComponent {
    ranks: Vec<Vec<(usize, f32)>>,
}

impl RankedComponent {
    pub fn ranks(&self) -> &[Vec<(usize, f32)>] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.iter().map(Vec::len).sum()
    }

    fn rank_of(&self) -> HashMap<usize, usize> {
        self.ranks
            .iter()
            .enumerate()
            .flat_map(|(rank, members)| members.iter().map(move |(node, _)| (*node, rank)))
            .collect()
    }
}

/// Ranks every connected component spanned by `edges`.
///
/// `edges` must not contain self-loops. Nodes that appear in no edge are not
/// part of any component. A panic inside the layout crate is reported as
/// [`EngineError::Layout`].
pub fn rank_components(edges: &[(usize, usize)]) -> Result<Vec<RankedComponent>, EngineError> {
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    // Dense ids so the layout graph has no phantom isolated vertices.
    let mut dense: HashMap<usize, u32> = HashMap::new();
    let mut nodes: Vec<usize> = Vec::new();
    let mut dense_edges = Vec::with_capacity(edges.len());
    for &(source, target) in edges {
        let mut id_of = |node: usize| -> Result<u32, EngineError> {
            if let Some(&id) = dense.get(&node) {
                return Ok(id);
            }
            let id = u32::try_from(nodes.len())
                .map_err(|_| EngineError::Layout("too many nodes for layered layout".to_string()))?;
            dense.insert(node, id);
            nodes.push(node);
            Ok(id)
        };
        let source = id_of(source)?;
        let target = id_of(target)?;
        dense_edges.push((source, target));
    }

    debug!(
        nodes = nodes.len(),
        edges = dense_edges.len();
        "Applying Sugiyama algorithm"
    );

    let layouts = panic::catch_unwind(move || {
        let config = Config {
            minimum_length: 1,
            vertex_spacing: VERTEX_SPACING,
            ..Default::default()
        };
        rust_sugiyama::from_edges(&dense_edges, &config)
    })
    .map_err(|err| {
        let message = if let Some(msg) = err.downcast_ref::<String>() {
            msg.clone()
        } else if let Some(msg) = err.downcast_ref::<&str>() {
            (*msg).to_string()
        } else {
            "unknown panic".to_string()
        };
        EngineError::Layout(format!("layered layout panicked: {message}"))
    })?;

    if layouts.is_empty() {
        return Err(EngineError::Layout(
            "layered layout returned no components".to_string(),
        ));
    }

    let mut components = Vec::with_capacity(layouts.len());
    for (coords, _, _) in &layouts {
        let mut placed: Vec<(usize, f64, f64)> = Vec::with_capacity(coords.len());
        for &(id, (x, y)) in coords {
            match nodes.get(id) {
                Some(&node) => placed.push((node, x, y)),
                None => trace!(id = id; "Ignoring layout vertex without a node"),
            }
        }
        if !placed.is_empty() {
            components.push(group_ranks(placed));
        }
    }

    for component in &mut components {
        orient(component, edges);
    }

    let positioned: usize = components.iter().map(RankedComponent::len).sum();
    if positioned != nodes.len() {
        return Err(EngineError::Layout(format!(
            "layered layout positioned {positioned} of {} nodes",
            nodes.len()
        )));
    }

    Ok(components)
}

fn group_ranks(mut placed: Vec<(usize, f64, f64)>) -> RankedComponent {
    placed.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.1.total_cmp(&b.1)));

    let mut ranks: Vec<Vec<(usize, f32)>> = Vec::new();
    let mut last_y: Option<f64> = None;
    for (node, x, y) in placed {
        let same_rank = last_y.is_some_and(|prev| (y - prev).abs() <= RANK_TOLERANCE);
        if !same_rank {
            ranks.push(Vec::new());
        }
        last_y = Some(y);
        if let Some(rank) = ranks.last_mut() {
            rank.push((node, (x / VERTEX_SPACING) as f32));
        }
    }

    for rank in &mut ranks {
        rank.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    RankedComponent { ranks }
}

/// Flips the rank order when most edges point against it.
fn orient(component: &mut RankedComponent, edges: &[(usize, usize)]) {
    let rank_of = component.rank_of();
    let (mut forward, mut backward) = (0usize, 0usize);
    for (source, target) in edges {
        if let (Some(s), Some(t)) = (rank_of.get(source), rank_of.get(target)) {
            match s.cmp(t) {
                std::cmp::Ordering::Less => forward += 1,
                std::cmp::Ordering::Greater => backward += 1,
                std::cmp::Ordering::Equal => {}
            }
        }
    }
    if backward > forward {
        trace!(forward = forward, backward = backward; "Reversing rank order");
        component.ranks.reverse();
    }
}
