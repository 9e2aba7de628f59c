use crate::discretization::MeshTopology;
use crate::error::{Result, RomError};
use std::collections::VecDeque;

/// Cells within `layers` face hops of `seed`, in breadth-first discovery order.
/// `layers == 0` returns only the seed.
pub fn stencil<M: MeshTopology>(mesh: &M, seed: usize, layers: i32) -> Result<Vec<usize>> {
    let depth = check_layers(layers)?;
    check_seed(mesh, seed)?;
    let mut visited = vec![false; mesh.num_cells()];
    let mut order = Vec::new();
    expand(mesh, seed, depth, &mut visited, &mut order);
    Ok(order)
}

/// Union of the neighbourhoods of two seeds: all of `seed_a`'s cells first,
/// then the cells only reachable from `seed_b`, each part in BFS order.
///
/// The two neighbourhoods are not interleaved layer by layer. On a 3x3 grid
/// with seeds 0 and 8 and one layer the result is `[0, 1, 3, 8, 5, 7]`, where
/// a joint expansion from both seeds would give `[0, 8, 1, 3, 5, 7]`.
pub fn stencil_pair<M: MeshTopology>(
    mesh: &M,
    seed_a: usize,
    seed_b: usize,
    layers: i32,
) -> Result<Vec<usize>> {
    let depth = check_layers(layers)?;
    check_seed(mesh, seed_a)?;
    check_seed(mesh, seed_b)?;

    let mut order = Vec::new();
    let mut visited = vec![false; mesh.num_cells()];
    expand(mesh, seed_a, depth, &mut visited, &mut order);

    // seed_b's traversal must not stop at cells already taken by seed_a
    let mut visited_b = vec![false; mesh.num_cells()];
    let mut order_b = Vec::new();
    expand(mesh, seed_b, depth, &mut visited_b, &mut order_b);
    order.extend(order_b.into_iter().filter(|&c| !visited[c]));
    Ok(order)
}

fn expand<M: MeshTopology>(
    mesh: &M,
    seed: usize,
    depth: usize,
    visited: &mut [bool],
    order: &mut Vec<usize>,
) {
    let mut queue = VecDeque::from([(seed, 0usize)]);
    visited[seed] = true;
    order.push(seed);

    while let Some((cell, d)) = queue.pop_front() {
        if d == depth {
            continue;
        }
        for &next in mesh.neighbors(cell) {
            if !visited[next] {
                visited[next] = true;
                order.push(next);
                queue.push_back((next, d + 1));
            }
        }
    }
    log::trace!("stencil of cell {seed} over {depth} layers: {} cells", order.len());
}

fn check_layers(layers: i32) -> Result<usize> {
    usize::try_from(layers)
        .map_err(|_| RomError::InvalidArgument(format!("negative layer count {layers}")))
}

fn check_seed<M: MeshTopology>(mesh: &M, seed: usize) -> Result<()> {
    if seed >= mesh.num_cells() {
        return Err(RomError::IndexOutOfRange {
            index: seed,
            len: mesh.num_cells(),
        });
    }
    Ok(())
}
