use crate::discretization::MeshTopology;
use crate::error::{Result, RomError};
use crate::fields::{Field, FieldName, FieldSet, FieldValue};
use nalgebra::{DMatrix, DVector};

/// Flatten one field into a column: cell 0's components, then cell 1's, ...
pub fn vectorize_field<V: FieldValue>(field: &Field<V>) -> DVector<f64> {
    let c = V::COMPONENTS;
    DVector::from_fn(field.dofs(), |row, _| field.value(row / c).component(row % c))
}

/// Stack a sequence of fields as the columns of a dense matrix.
pub fn vectorize_fields<V: FieldValue>(fields: &[Field<V>]) -> Result<DMatrix<f64>> {
    let first = fields
        .first()
        .ok_or(RomError::EmptyInput("no fields to vectorize"))?;
    for field in &fields[1..] {
        first.ensure_compatible(field)?;
    }

    let c = V::COMPONENTS;
    let dofs = first.dofs();
    let mut matrix = DMatrix::zeros(dofs, fields.len());
    for (j, field) in fields.iter().enumerate() {
        let mut column = matrix.column_mut(j);
        for (cell, value) in field.values().iter().enumerate() {
            for k in 0..c {
                column[cell * c + k] = value.component(k);
            }
        }
    }
    Ok(matrix)
}

/// Per-dof weights: each cell volume repeated `components` times.
pub fn dof_weights<M: MeshTopology>(mesh: &M, components: usize) -> DVector<f64> {
    let volumes = mesh.volumes();
    DVector::from_fn(volumes.len() * components, |row, _| volumes[row / components])
}

/// Turn every column of `matrix` back into a field named `{name}{j}`.
pub fn unvectorize_columns<V: FieldValue, M: MeshTopology>(
    name: &str,
    mesh: &M,
    matrix: &DMatrix<f64>,
) -> Result<FieldSet<V>> {
    matrix
        .column_iter()
        .enumerate()
        .map(|(j, column)| {
            Field::from_dvector(FieldName::new(format!("{name}{j}")), mesh, &column.into_owned())
        })
        .collect()
}
