use super::{Field, FieldValue};
use crate::discretization::MeshTopology;
use crate::error::{Result, RomError};
use glam::DVec3;

/// Set every internal value of `field` to `value`.
pub fn assign_internal<V: FieldValue>(field: &mut Field<V>, value: V) {
    field.values_mut().fill(value);
}

/// Set the listed cells of a scalar field to one, leaving the others untouched.
/// Typically fed with a stencil to build an indicator field.
pub fn assign_one(field: &mut Field<f64>, cells: &[usize]) -> Result<()> {
    let len = field.num_cells();
    if let Some(&index) = cells.iter().find(|&&c| c >= len) {
        return Err(RomError::IndexOutOfRange { index, len });
    }
    let values = field.values_mut();
    for &c in cells {
        values[c] = 1.0;
    }
    Ok(())
}

/// Set `value` on every cell whose centroid lies inside the axis-aligned box
/// spanned by the two corners (inclusive, corners in any order).
/// Returns the number of cells painted.
pub fn set_box_to_value<M: MeshTopology>(
    field: &mut Field<f64>,
    mesh: &M,
    corners: [DVec3; 2],
    value: f64,
) -> Result<usize> {
    field.ensure_on(mesh)?;
    let lo = corners[0].min(corners[1]);
    let hi = corners[0].max(corners[1]);

    let mut painted = 0;
    let values = field.values_mut();
    for (cell, v) in values.iter_mut().enumerate() {
        let c = mesh.cell_centroid(cell);
        if c.cmpge(lo).all() && c.cmple(hi).all() {
            *v = value;
            painted += 1;
        }
    }
    log::debug!("box {lo:?}..{hi:?} painted {painted} cells");
    Ok(painted)
}
