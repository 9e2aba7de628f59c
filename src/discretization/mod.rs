pub mod generator;
pub mod mesh;
pub mod topology;

pub use mesh::{Mesh, MeshTag};
pub use topology::MeshTopology;
