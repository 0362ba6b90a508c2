use std::io::BufRead;
use std::path::Path;
use anyhow::{anyhow, Context};

use crate::structs::Vertex;

/// Flat triangle list of one mesh, three vertices per triangle, no index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Loads an OBJ file from disk.
///
/// # Arguments
///
/// * `file_path` - Path of the `.obj` file. Material libraries are ignored.
///
/// # Returns
///
/// The de-indexed mesh, or an error if the file is missing, malformed or has no triangles.
pub fn load_obj(file_path: &Path) -> anyhow::Result<MeshData> {
    let (models, _) = tobj::load_obj(file_path, &load_options())
        .with_context(|| format!("Could not load mesh {}", file_path.display()))?;
    let mesh = flatten(&models)
        .with_context(|| format!("Could not load mesh {}", file_path.display()))?;
    log::debug!("Loaded {} with {} vertices", file_path.display(), mesh.vertex_count());
    Ok(mesh)
}

/// Loads an OBJ mesh from an in-memory reader, see [`load_obj`].
pub fn load_obj_buf<B: BufRead>(reader: &mut B) -> anyhow::Result<MeshData> {
    let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| Ok(Default::default()))
        .context("Could not parse OBJ data")?;
    flatten(&models)
}

fn flatten(models: &[tobj::Model]) -> anyhow::Result<MeshData> {
    let mut vertices = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        let has_normals = !mesh.normals.is_empty();
        let has_uvs = !mesh.texcoords.is_empty();

        for &index in &mesh.indices {
            let i = index as usize;
            let position = mesh.positions.get(3 * i..3 * i + 3)
                .ok_or_else(|| anyhow!("Vertex index {} out of range in {}", i, model.name))?;
            let normal = if has_normals {
                mesh.normals.get(3 * i..3 * i + 3)
                    .map_or([0.0; 3], |n| [n[0], n[1], n[2]])
            } else {
                [0.0; 3]
            };
            // OBJ puts v = 0 at the bottom of the image
            let uv = if has_uvs {
                mesh.texcoords.get(2 * i..2 * i + 2)
                    .map_or([0.0; 2], |t| [t[0], 1.0 - t[1]])
            } else {
                [0.0; 2]
            };
            vertices.push(Vertex::new([position[0], position[1], position[2]], normal, uv));
        }
    }

    if vertices.is_empty() {
        return Err(anyhow!("Mesh contains no triangles"));
    }
    Ok(MeshData { vertices })
}
