use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a [`Mesh`]. Fields remember the tag of the mesh
/// they were created on so that mixing meshes can be detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshTag(u64);

impl MeshTag {
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MeshTag(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The complete computational grid.
pub struct Mesh {
    pub cells: Vec<Cell>,
    pub faces: Vec<Face>,
    pub nodes: Vec<Node>,
    pub patches: Vec<Patch>,
    tag: MeshTag,
    /// Face-sharing neighbours of each cell, ascending and unique.
    adjacency: Vec<Vec<usize>>,
}

/// A single control volume.
pub struct Cell {
    pub id: usize,
    pub volume: f64,
    pub centroid: [f64; 3],
    pub face_ids: Vec<usize>,
}

/// An interface between two cells.
pub struct Face {
    pub area: f64,
    /// Unit normal pointing from the first cell of `neighbor_cell_ids` to the second
    /// (outwards for a boundary face).
    pub normal: [f64; 3],
    /// Tuple of (cell1_id, optional cell2_id). `None` indicates a boundary face.
    pub neighbor_cell_ids: (usize, Option<usize>),
    pub centroid: [f64; 3],
}

pub struct Node {
    pub position: [f64; 3],
}

/// A named group of boundary faces.
#[derive(Clone, Debug)]
pub struct Patch {
    pub name: String,
    pub face_ids: Vec<usize>,
}

impl Mesh {
    pub fn new(cells: Vec<Cell>, faces: Vec<Face>, nodes: Vec<Node>, patches: Vec<Patch>) -> Self {
        let adjacency = build_adjacency(cells.len(), &faces);
        Self {
            cells,
            faces,
            nodes,
            patches,
            tag: MeshTag::fresh(),
            adjacency,
        }
    }

    pub fn tag(&self) -> MeshTag {
        self.tag
    }

    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    pub fn num_interior_faces(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| f.neighbor_cell_ids.1.is_some())
            .count()
    }

    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(|c| c.volume).sum()
    }

    pub fn patch(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }
}

fn build_adjacency(num_cells: usize, faces: &[Face]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); num_cells];
    for face in faces {
        if let (k, Some(l)) = face.neighbor_cell_ids {
            if k == l || k >= num_cells || l >= num_cells {
                log::warn!("skipping degenerate face between cells {k} and {l}");
                continue;
            }
            adjacency[k].push(l);
            adjacency[l].push(k);
        }
    }
    for neighbors in adjacency.iter_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}
