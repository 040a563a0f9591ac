use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub gl_major: u8,
    pub gl_minor: u8,
    pub vsync: bool,
    /// Draw polygons as outlines (`GL_LINE`) instead of filled.
    pub wireframe: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gl_major: 3,
            gl_minor: 3,
            vsync: true,
            wireframe: false,
        }
    }
}
