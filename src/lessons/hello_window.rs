use super::SHADER_EXIT_STATUS;
use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{Gl, ShaderFailurePolicy, ShaderProgram};
use anyhow::{Context, Result};

pub const CLEAR_COLOR: [f32; 4] = [0.2, 0.3, 0.3, 1.0];

/// A window cleared every frame. The program is built and made current but
/// nothing is drawn with it.
///
/// The shipped `hello_window.frag` is missing a semicolon after its output
/// declaration, so the default run logs the compiler error and exits.
pub struct HelloWindow {
    gl: Gl,
    shader: ShaderProgram,
}

impl HelloWindow {
    fn build(gl: Gl, config: &AppConfig, policy: ShaderFailurePolicy) -> Result<Self> {
        let shader = ShaderProgram::load(
            gl.clone(),
            config.assets.shader("triangle.vert"),
            config.assets.shader("hello_window.frag"),
            policy,
        )
        .context("Failed to build hello window shader")?;
        shader.activate();

        Ok(Self { gl, shader })
    }
}

impl Lesson for HelloWindow {
    const TITLE: &'static str = "Hello Window";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        Self::build(gl, config, ShaderFailurePolicy::Exit(SHADER_EXIT_STATUS))
    }

    fn render(&mut self, _elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);
    }
}
