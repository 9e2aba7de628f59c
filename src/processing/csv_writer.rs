use crate::discretization::MeshTopology;
use crate::fields::{Field, FieldValue};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write data to CSV file with headers, one `Vec` per column.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);

    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| {
                if i < col.len() {
                    format!("{:.15e}", col[i])
                } else {
                    String::new()
                }
            })
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    file.flush()
}

/// Write a single column of data with a header
pub fn write_single_column<P: AsRef<Path>>(path: P, header: &str, data: &[f64]) -> io::Result<()> {
    write_csv(path, &[header], &[data.to_vec()])
}

/// Write a dense matrix; columns are headed `{prefix}0`, `{prefix}1`, ...
pub fn write_matrix<P: AsRef<Path>>(path: P, prefix: &str, matrix: &DMatrix<f64>) -> io::Result<()> {
    let headers: Vec<String> = (0..matrix.ncols()).map(|j| format!("{prefix}{j}")).collect();
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    let columns: Vec<Vec<f64>> = matrix
        .column_iter()
        .map(|c| c.iter().copied().collect())
        .collect();
    write_csv(path, &headers, &columns)
}

/// Write the cell centroids followed by the field components, one row per cell.
pub fn write_field<P, V, M>(path: P, field: &Field<V>, mesh: &M) -> io::Result<()>
where
    P: AsRef<Path>,
    V: FieldValue,
    M: MeshTopology,
{
    if !field.is_on(mesh) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("field '{}' does not live on this mesh", field.name().as_str()),
        ));
    }

    let name = field.name().as_str();
    let mut headers = vec!["x".to_string(), "y".to_string(), "z".to_string()];
    if V::COMPONENTS == 1 {
        headers.push(name.to_string());
    } else {
        headers.extend((0..V::COMPONENTS).map(|k| format!("{name}_{k}")));
    }
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();

    let mut columns = vec![Vec::with_capacity(field.num_cells()); 3 + V::COMPONENTS];
    for (cell, value) in field.values().iter().enumerate() {
        let centroid = mesh.cell_centroid(cell);
        for axis in 0..3 {
            columns[axis].push(centroid[axis]);
        }
        for k in 0..V::COMPONENTS {
            columns[3 + k].push(value.component(k));
        }
    }
    write_csv(path, &headers, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::create_flat_mesh;
    use crate::fields::VectorField;
    use glam::DVec3;
    use std::fs;

    #[test]
    fn test_write_csv() {
        let path = std::env::temp_dir().join("vfrom_test_output.csv");
        let headers = &["x", "y", "z"];
        let data = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ];

        write_csv(&path, headers, &data).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("x,y,z"));
        assert_eq!(content.lines().count(), 4);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_matrix_and_field() {
        let dir = std::env::temp_dir();
        let matrix_path = dir.join("vfrom_test_matrix.csv");
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        write_matrix(&matrix_path, "c", &m).unwrap();
        let content = fs::read_to_string(&matrix_path).unwrap();
        assert!(content.starts_with("c0,c1\n"));
        assert_eq!(content.lines().count(), 3);
        fs::remove_file(&matrix_path).ok();

        let field_path = dir.join("vfrom_test_field.csv");
        let mesh = create_flat_mesh([2.0, 1.0], 2, 1, 1.0);
        let u = VectorField::uniform("U", &mesh, DVec3::new(1.0, 2.0, 3.0));
        write_field(&field_path, &u, &mesh).unwrap();
        let content = fs::read_to_string(&field_path).unwrap();
        assert!(content.starts_with("x,y,z,U_0,U_1,U_2\n"));
        assert_eq!(content.lines().count(), 3);
        fs::remove_file(&field_path).ok();
    }
}
