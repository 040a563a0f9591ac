pub mod backend;
pub mod mesh;
pub mod shader;
pub mod texture;

#[cfg(test)]
pub(crate) mod sim;

pub use backend::{Gl, GlApi, NativeGl};
pub use mesh::{Mesh, VertexAttribute, VertexLayout};
pub use shader::{ShaderError, ShaderFailurePolicy, ShaderProgram, ShaderSource, ShaderStage};
pub use texture::{Texture, TextureError, TextureImage, TextureParams};
