use super::SHADER_EXIT_STATUS;
use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{Gl, Mesh, ShaderFailurePolicy, ShaderProgram, VertexLayout};
use anyhow::{Context, Result};

pub const TRIANGLE: [f32; 9] = [
    -0.5, -0.5, 0.0, // left
    0.5, -0.5, 0.0, // right
    0.0, 0.5, 0.0, // top
];

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

pub struct HelloTriangle {
    gl: Gl,
    shader: ShaderProgram,
    mesh: Mesh,
}

impl Lesson for HelloTriangle {
    const TITLE: &'static str = "Hello Triangle";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        let shader = ShaderProgram::load(
            gl.clone(),
            config.assets.shader("triangle.vert"),
            config.assets.shader("orange.frag"),
            ShaderFailurePolicy::Exit(SHADER_EXIT_STATUS),
        )
        .context("Failed to build triangle shader")?;
        let mesh = Mesh::new(gl.clone(), &TRIANGLE, &VertexLayout::position());

        Ok(Self { gl, shader, mesh })
    }

    fn render(&mut self, _elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        self.shader.activate();
        self.mesh.draw();
    }
}
