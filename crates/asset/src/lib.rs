//! Asset loading/parsers (meshes, textures, shaders).
//! OBJ importer producing flat, renderer-ready vertex lists.
//! Texture loading (RGBA8) and shader source loading.

pub mod library;
pub mod mesh;
pub mod obj;
pub mod shader;
pub mod texture;

pub use mesh::Vertex;
pub use obj::{ImportIssue, ImportStats, ObjImport};
