pub mod app;
pub mod config;
pub mod lessons;
pub mod render;

// Re-export commonly used types
pub use app::{launch, Lesson, LaunchError};
pub use config::{AppConfig, AssetConfig, RenderConfig, WindowConfig};
pub use render::{Gl, GlApi, Mesh, NativeGl, ShaderError, ShaderFailurePolicy, ShaderProgram, ShaderSource};
pub use render::{Texture, TextureError, VertexLayout};
