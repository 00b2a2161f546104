//! Numbered model sets (`<dir>/0.obj`, `<dir>/1.obj`, ...), e.g. one mesh per digit.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{mesh::Vertex, obj};

/// Leading digits of pi, in the order the digit meshes are laid out.
pub const PI_DIGITS: [u32; 88] = [
    3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9, 3, 2, 3, 8, 4, 6, 2, 6, 4, 3, 3, 8, 3, 2, 7, 9, 5,
    0, 2, 8, 8, 4, 1, 9, 7, 1, 6, 9, 3, 9, 9, 3, 7, 5, 1, 0, 5, 8, 2, 0, 9, 7, 4, 9, 4, 4, 5, 9, 2,
    3, 0, 7, 8, 1, 6, 4, 0, 6, 2, 8, 6, 2, 8, 9, 9, 8, 6, 2, 8, 0, 3, 4, 8,
];

/// Meshes keyed by numeric id. Ids whose file was missing or produced no
/// triangles are still present, with an empty vertex list.
#[derive(Clone, Debug, Default)]
pub struct ModelLibrary {
    dir: PathBuf,
    models: BTreeMap<u32, Vec<Vertex>>,
}

impl ModelLibrary {
    /// Import `<dir>/<id>.obj` for every id.
    pub fn load_numbered(dir: impl AsRef<Path>, ids: impl IntoIterator<Item = u32>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let mut models = BTreeMap::new();

        for id in ids {
            let path = dir.join(format!("{id}.obj"));
            let vertices = obj::import(&path);
            if vertices.is_empty() {
                log::error!("Failed to load model {} ({})", id, path.display());
            } else {
                log::info!("Loaded model {} with {} vertices", id, vertices.len());
            }
            models.insert(id, vertices);
        }

        Self { dir, models }
    }

    /// Load the ten digit meshes `0.obj` ..= `9.obj`.
    pub fn load_digits(dir: impl AsRef<Path>) -> Self {
        Self::load_numbered(dir, 0..=9)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Vertices for `id`, if it was requested.
    pub fn get(&self, id: u32) -> Option<&[Vertex]> {
        self.models.get(&id).map(Vec::as_slice)
    }

    /// Ids that came back empty.
    pub fn missing(&self) -> Vec<u32> {
        self.models
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// `true` when every requested model has at least one vertex.
    pub fn is_complete(&self) -> bool {
        !self.models.is_empty() && self.models.values().all(|v| !v.is_empty())
    }

    /// Map a sequence of ids to their meshes, skipping ids that were never
    /// requested or came back empty.
    pub fn sequence<'a>(
        &'a self,
        ids: &'a [u32],
    ) -> impl Iterator<Item = (u32, &'a [Vertex])> + 'a {
        ids.iter().filter_map(move |&id| match self.get(id) {
            Some(v) if !v.is_empty() => Some((id, v)),
            _ => None,
        })
    }
}
