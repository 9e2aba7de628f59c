pub mod assign;

use crate::discretization::{MeshTag, MeshTopology};
use crate::error::{Result, RomError};
use glam::DVec3;
use nalgebra::DVector;
use std::fmt::Debug;
use std::ops::{Deref, Index, Sub};
use std::sync::Arc;

/// Field identifier stored as a shared string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldName(pub Arc<str>);

impl FieldName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<Arc<str>>> From<T> for FieldName {
    fn from(name: T) -> Self {
        FieldName::new(name)
    }
}

/// Per-cell value of a discretised field. `COMPONENTS` is the number of
/// entries a cell contributes to a vectorised column.
pub trait FieldValue: Copy + Debug + PartialEq + Send + Sync + Sub<Output = Self> + 'static {
    const COMPONENTS: usize;
    const ZERO: Self;

    fn component(&self, i: usize) -> f64;

    /// Build a value from exactly `COMPONENTS` entries.
    fn from_components(c: &[f64]) -> Self;

    fn norm_squared(&self) -> f64;
}

impl FieldValue for f64 {
    const COMPONENTS: usize = 1;
    const ZERO: Self = 0.0;

    #[inline]
    fn component(&self, _i: usize) -> f64 {
        *self
    }

    #[inline]
    fn from_components(c: &[f64]) -> Self {
        c[0]
    }

    #[inline]
    fn norm_squared(&self) -> f64 {
        self * self
    }
}

impl FieldValue for DVec3 {
    const COMPONENTS: usize = 3;
    const ZERO: Self = DVec3::ZERO;

    #[inline]
    fn component(&self, i: usize) -> f64 {
        self[i]
    }

    #[inline]
    fn from_components(c: &[f64]) -> Self {
        DVec3::new(c[0], c[1], c[2])
    }

    #[inline]
    fn norm_squared(&self) -> f64 {
        self.length_squared()
    }
}

/// Cell-centred field: one value per cell of the mesh it was created on.
/// Only internal values are stored.
#[derive(Clone, Debug)]
pub struct Field<V: FieldValue> {
    name: FieldName,
    mesh: MeshTag,
    values: Vec<V>,
}

pub type ScalarField = Field<f64>;
pub type VectorField = Field<DVec3>;

impl<V: FieldValue> Field<V> {
    pub fn new<M: MeshTopology>(name: impl Into<FieldName>, mesh: &M, values: Vec<V>) -> Result<Self> {
        if values.len() != mesh.num_cells() {
            return Err(RomError::ShapeMismatch(format!(
                "{} values for a mesh of {} cells",
                values.len(),
                mesh.num_cells()
            )));
        }
        Ok(Self {
            name: name.into(),
            mesh: mesh.tag(),
            values,
        })
    }

    pub fn uniform<M: MeshTopology>(name: impl Into<FieldName>, mesh: &M, value: V) -> Self {
        Self {
            name: name.into(),
            mesh: mesh.tag(),
            values: vec![value; mesh.num_cells()],
        }
    }

    pub fn zeros<M: MeshTopology>(name: impl Into<FieldName>, mesh: &M) -> Self {
        Self::uniform(name, mesh, V::ZERO)
    }

    /// Evaluate `f(cell, centroid)` on every cell.
    pub fn from_fn<M, F>(name: impl Into<FieldName>, mesh: &M, mut f: F) -> Self
    where
        M: MeshTopology,
        F: FnMut(usize, DVec3) -> V,
    {
        let values = (0..mesh.num_cells())
            .map(|c| f(c, mesh.cell_centroid(c)))
            .collect();
        Self {
            name: name.into(),
            mesh: mesh.tag(),
            values,
        }
    }

    /// Inverse of vectorisation: read a column laid out cell by cell,
    /// `COMPONENTS` entries per cell.
    pub fn from_dvector<M: MeshTopology>(
        name: impl Into<FieldName>,
        mesh: &M,
        column: &DVector<f64>,
    ) -> Result<Self> {
        let c = V::COMPONENTS;
        if column.len() != mesh.num_cells() * c {
            return Err(RomError::ShapeMismatch(format!(
                "column of length {} cannot hold {} cells with {} components",
                column.len(),
                mesh.num_cells(),
                c
            )));
        }
        let values = column
            .as_slice()
            .chunks_exact(c)
            .map(V::from_components)
            .collect();
        Ok(Self {
            name: name.into(),
            mesh: mesh.tag(),
            values,
        })
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn mesh_tag(&self) -> MeshTag {
        self.mesh
    }

    pub fn num_cells(&self) -> usize {
        self.values.len()
    }

    pub fn components(&self) -> usize {
        V::COMPONENTS
    }

    pub fn dofs(&self) -> usize {
        self.values.len() * V::COMPONENTS
    }

    pub fn value(&self, cell: usize) -> V {
        self.values[cell]
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    pub fn is_on<M: MeshTopology>(&self, mesh: &M) -> bool {
        self.mesh == mesh.tag() && self.values.len() == mesh.num_cells()
    }

    pub(crate) fn ensure_on<M: MeshTopology>(&self, mesh: &M) -> Result<()> {
        if self.is_on(mesh) {
            Ok(())
        } else {
            Err(RomError::ShapeMismatch(format!(
                "field '{}' does not live on the given mesh",
                self.name.as_str()
            )))
        }
    }

    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<()> {
        if self.mesh != other.mesh || self.values.len() != other.values.len() {
            return Err(RomError::ShapeMismatch(format!(
                "fields '{}' and '{}' live on different meshes",
                self.name.as_str(),
                other.name.as_str()
            )));
        }
        Ok(())
    }

    /// Cell-wise `self - other`.
    pub fn difference(&self, other: &Self) -> Result<Self> {
        self.ensure_compatible(other)?;
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| *a - *b)
            .collect();
        Ok(Self {
            name: FieldName::new(format!("{}-{}", self.name.as_str(), other.name.as_str())),
            mesh: self.mesh,
            values,
        })
    }

    /// Same field under a different name.
    pub fn renamed(mut self, name: impl Into<FieldName>) -> Self {
        self.name = name.into();
        self
    }
}

/// Ordered, owning collection of fields (modes or snapshots).
/// Fields are addressed by their position.
#[derive(Clone, Debug)]
pub struct FieldSet<V: FieldValue> {
    fields: Vec<Field<V>>,
}

impl<V: FieldValue> Default for FieldSet<V> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<V: FieldValue> FieldSet<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field and return its index.
    pub fn push(&mut self, field: Field<V>) -> usize {
        self.fields.push(field);
        self.fields.len() - 1
    }

    /// The first `n` fields as a new set.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            fields: self.fields.iter().take(n).cloned().collect(),
        }
    }
}

impl<V: FieldValue> Deref for FieldSet<V> {
    type Target = [Field<V>];

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl<V: FieldValue> Index<usize> for FieldSet<V> {
    type Output = Field<V>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.fields[i]
    }
}

impl<V: FieldValue> From<Vec<Field<V>>> for FieldSet<V> {
    fn from(fields: Vec<Field<V>>) -> Self {
        Self { fields }
    }
}

impl<V: FieldValue> FromIterator<Field<V>> for FieldSet<V> {
    fn from_iter<I: IntoIterator<Item = Field<V>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a, V: FieldValue> IntoIterator for &'a FieldSet<V> {
    type Item = &'a Field<V>;
    type IntoIter = std::slice::Iter<'a, Field<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
