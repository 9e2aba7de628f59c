use super::mesh::{Cell, Face, Mesh, Node, Patch};

const PATCH_NAMES: [[&str; 2]; 3] = [["xmin", "xmax"], ["ymin", "ymax"], ["zmin", "zmax"]];

/// Build a structured hexahedral mesh of the box [0, width[0]] × [0, width[1]] × [0, width[2]]
/// with `n[0] × n[1] × n[2]` cells.
///
/// Cells are numbered with x fastest, then y, then z, so a flat `nx × ny` grid is
/// numbered row-major. Boundary faces are grouped into the patches
/// `xmin`, `xmax`, `ymin`, `ymax`, `zmin` and `zmax`.
pub fn create_cartesian_mesh(width: [f64; 3], n: [usize; 3]) -> Mesh {
    let [nx, ny, nz] = n;
    let h = [
        width[0] / nx as f64,
        width[1] / ny as f64,
        width[2] / nz as f64,
    ];
    let volume = h[0] * h[1] * h[2];
    let cell_index = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    let mut cells = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                cells.push(Cell {
                    id: cell_index(i, j, k),
                    volume,
                    centroid: [
                        (i as f64 + 0.5) * h[0],
                        (j as f64 + 0.5) * h[1],
                        (k as f64 + 0.5) * h[2],
                    ],
                    face_ids: Vec::with_capacity(6),
                });
            }
        }
    }

    let mut faces = Vec::new();
    let mut patches: Vec<Patch> = PATCH_NAMES
        .iter()
        .flatten()
        .map(|name| Patch {
            name: name.to_string(),
            face_ids: Vec::new(),
        })
        .collect();

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let idx = [i, j, k];
                let owner = cell_index(i, j, k);
                let centroid = cells[owner].centroid;

                for axis in 0..3 {
                    let area = volume / h[axis];
                    let mut normal = [0.0; 3];
                    normal[axis] = 1.0;
                    let mut face_centroid = centroid;
                    face_centroid[axis] += 0.5 * h[axis];

                    // each interior face is created once, by its lower cell
                    let upper = if idx[axis] + 1 < n[axis] {
                        let mut next = idx;
                        next[axis] += 1;
                        Some(cell_index(next[0], next[1], next[2]))
                    } else {
                        None
                    };

                    let face_id = faces.len();
                    faces.push(Face {
                        area,
                        normal,
                        neighbor_cell_ids: (owner, upper),
                        centroid: face_centroid,
                    });
                    cells[owner].face_ids.push(face_id);
                    match upper {
                        Some(l) => cells[l].face_ids.push(face_id),
                        None => patches[2 * axis + 1].face_ids.push(face_id),
                    }

                    if idx[axis] == 0 {
                        let mut outward = [0.0; 3];
                        outward[axis] = -1.0;
                        let mut low_centroid = centroid;
                        low_centroid[axis] -= 0.5 * h[axis];

                        let face_id = faces.len();
                        faces.push(Face {
                            area,
                            normal: outward,
                            neighbor_cell_ids: (owner, None),
                            centroid: low_centroid,
                        });
                        cells[owner].face_ids.push(face_id);
                        patches[2 * axis].face_ids.push(face_id);
                    }
                }
            }
        }
    }

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push(Node {
                    position: [i as f64 * h[0], j as f64 * h[1], k as f64 * h[2]],
                });
            }
        }
    }

    Mesh::new(cells, faces, nodes, patches)
}

/// Create a flat mesh of `nx × ny` cells, one cell thick in z.
pub fn create_flat_mesh(width: [f64; 2], nx: usize, ny: usize, thickness: f64) -> Mesh {
    create_cartesian_mesh([width[0], width[1], thickness], [nx, ny, 1])
}
