use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{Gl, Mesh, ShaderFailurePolicy, ShaderProgram, VertexLayout};
use anyhow::{Context, Result};

#[rustfmt::skip]
const TRIANGLE: [f32; 18] = [
    // positions       // colors
    -0.5, -0.5, 0.0,   1.0, 0.0, 0.0, // bottom left
     0.5, -0.5, 0.0,   0.0, 1.0, 0.0, // bottom right
     0.0,  0.5, 0.0,   0.0, 0.0, 1.0, // top
];

const CLEAR_COLOR: [f32; 4] = [1.0, 0.8, 0.9, 1.0];

/// Horizontal shift applied in the vertex stage, in clip units.
pub fn horizontal_offset(elapsed: f32) -> f32 {
    elapsed.sin() / 2.0
}

/// Per-vertex colors interpolated across the triangle, which sways
/// left and right over time.
pub struct VertexColors {
    gl: Gl,
    shader: ShaderProgram,
    mesh: Mesh,
}

impl Lesson for VertexColors {
    const TITLE: &'static str = "Vertex Colors";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        let shader = ShaderProgram::load(
            gl.clone(),
            config.assets.shader("vertex_colors.vert"),
            config.assets.shader("vertex_colors.frag"),
            ShaderFailurePolicy::Propagate,
        )
        .context("Failed to build vertex color shader")?;
        let mesh = Mesh::new(gl.clone(), &TRIANGLE, &VertexLayout::position_color());

        Ok(Self { gl, shader, mesh })
    }

    fn render(&mut self, elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        self.shader.activate();
        self.shader.set_float("horizontalOffset", horizontal_offset(elapsed));
        self.mesh.draw();
    }
}
