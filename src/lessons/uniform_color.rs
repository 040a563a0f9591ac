use super::hello_triangle::TRIANGLE;
use super::SHADER_EXIT_STATUS;
use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{Gl, Mesh, ShaderFailurePolicy, ShaderProgram, VertexLayout};
use anyhow::{Context, Result};
use glam::Vec4;

const CLEAR_COLOR: [f32; 4] = [0.1, 0.3, 0.3, 1.0];

/// Green channel pulsing between 0 and 1 over time.
pub fn pulse_color(elapsed: f32) -> Vec4 {
    let green = elapsed.sin() / 2.0 + 0.5;
    Vec4::new(0.0, green, 0.0, 1.0)
}

pub struct UniformColor {
    gl: Gl,
    shader: ShaderProgram,
    mesh: Mesh,
}

impl Lesson for UniformColor {
    const TITLE: &'static str = "Uniform Color";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        let shader = ShaderProgram::load(
            gl.clone(),
            config.assets.shader("triangle.vert"),
            config.assets.shader("uniform_color.frag"),
            ShaderFailurePolicy::Exit(SHADER_EXIT_STATUS),
        )
        .context("Failed to build uniform color shader")?;
        let mesh = Mesh::new(gl.clone(), &TRIANGLE, &VertexLayout::position());

        Ok(Self { gl, shader, mesh })
    }

    fn render(&mut self, elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        self.shader.activate();
        self.shader.set_vec4("ourColor", pulse_color(elapsed));
        self.mesh.draw();
    }
}
