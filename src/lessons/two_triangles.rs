use super::SHADER_EXIT_STATUS;
use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{Gl, Mesh, ShaderFailurePolicy, ShaderProgram, VertexLayout};
use anyhow::{Context, Result};

const FIRST_TRIANGLE: [f32; 9] = [
    -0.75, 0.9, 0.0, //
    -0.75, 0.25, 0.0, //
    -0.25, 0.9, 0.0,
];

const SECOND_TRIANGLE: [f32; 9] = [
    0.75, -0.9, 0.0, //
    0.75, -0.25, 0.0, //
    0.25, -0.9, 0.0,
];

const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

/// Two triangles in separate vertex arrays, each drawn with its own
/// program. Both programs share the vertex stage source.
pub struct TwoTriangles {
    gl: Gl,
    orange: ShaderProgram,
    yellow: ShaderProgram,
    first: Mesh,
    second: Mesh,
}

impl Lesson for TwoTriangles {
    const TITLE: &'static str = "Two Triangles";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        let vertex = config.assets.shader("triangle.vert");
        let policy = ShaderFailurePolicy::Exit(SHADER_EXIT_STATUS);

        let orange = ShaderProgram::load(gl.clone(), &vertex, config.assets.shader("orange.frag"), policy.clone())
            .context("Failed to build orange shader")?;
        let yellow = ShaderProgram::load(gl.clone(), &vertex, config.assets.shader("yellow.frag"), policy)
            .context("Failed to build yellow shader")?;

        let layout = VertexLayout::position();
        let first = Mesh::new(gl.clone(), &FIRST_TRIANGLE, &layout);
        let second = Mesh::new(gl.clone(), &SECOND_TRIANGLE, &layout);

        Ok(Self {
            gl,
            orange,
            yellow,
            first,
            second,
        })
    }

    fn render(&mut self, _elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        self.orange.activate();
        self.first.draw();

        self.yellow.activate();
        self.second.draw();
    }
}
