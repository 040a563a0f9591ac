//! The tutorial programs, one [`Lesson`](crate::app::Lesson) per step.

pub mod hello_triangle;
pub mod hello_window;
pub mod textures;
pub mod two_triangles;
pub mod uniform_color;
pub mod vertex_colors;

pub use hello_triangle::HelloTriangle;
pub use hello_window::HelloWindow;
pub use textures::Textures;
pub use two_triangles::TwoTriangles;
pub use uniform_color::UniformColor;
pub use vertex_colors::VertexColors;

/// Status used by lessons that abort on a broken shader.
pub const SHADER_EXIT_STATUS: i32 = 1;
