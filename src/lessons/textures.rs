use crate::app::Lesson;
use crate::config::AppConfig;
use crate::render::{
    Gl, Mesh, ShaderFailurePolicy, ShaderProgram, ShaderSource, Texture, TextureParams, VertexLayout,
};
use anyhow::{Context, Result};
use log::error;

#[rustfmt::skip]
const QUAD: [f32; 32] = [
    // positions       // colors        // texture coords
     0.5,  0.5, 0.0,   1.0, 0.0, 0.0,   1.0, 1.0, // top right
     0.5, -0.5, 0.0,   0.0, 1.0, 0.0,   1.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,   0.0, 0.0, 1.0,   0.0, 0.0, // bottom left
    -0.5,  0.5, 0.0,   1.0, 1.0, 0.0,   0.0, 1.0, // top left
];

const INDICES: [u32; 6] = [
    0, 1, 3, // first triangle
    1, 2, 3, // second triangle
];

const CLEAR_COLOR: [f32; 4] = [0.1, 0.3, 0.3, 1.0];

pub const TEXTURE_FILE: &str = "container.jpg";
const SAMPLER_UNIT: u32 = 0;

// Vertex colors only, used when the textured program cannot be built.
const FALLBACK_VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;
out vec3 ourColor;

void main()
{
    gl_Position = vec4(aPos, 1.0);
    ourColor = aColor;
}
";

const FALLBACK_FRAGMENT: &str = "#version 330 core
in vec3 ourColor;
out vec4 FragColor;

void main()
{
    FragColor = vec4(ourColor, 1.0);
}
";

/// An indexed quad sampling an image texture, tinted by vertex colors.
pub struct Textures {
    gl: Gl,
    shader: ShaderProgram,
    mesh: Mesh,
    texture: Option<Texture>,
}

impl Lesson for Textures {
    const TITLE: &'static str = "Textures";

    fn init(gl: Gl, config: &AppConfig) -> Result<Self> {
        let mut shader = ShaderProgram::load(
            gl.clone(),
            config.assets.shader("textures.vert"),
            config.assets.shader("textures.frag"),
            ShaderFailurePolicy::Fallback(ShaderSource::new(FALLBACK_VERTEX, FALLBACK_FRAGMENT)),
        )
        .context("Failed to build texture shader")?;
        shader.activate();
        shader.set_int("ourTexture", SAMPLER_UNIT as i32);

        let mesh = Mesh::indexed(gl.clone(), &QUAD, &INDICES, &VertexLayout::position_color_tex());

        let path = config.assets.texture(TEXTURE_FILE);
        let texture = match Texture::from_file(gl.clone(), &path, TextureParams::default()) {
            Ok(texture) => Some(texture),
            Err(e) => {
                error!("{}", e);
                None
            }
        };

        Ok(Self {
            gl,
            shader,
            mesh,
            texture,
        })
    }

    fn render(&mut self, _elapsed: f32) {
        self.gl.clear_color(CLEAR_COLOR);
        self.gl.clear(gl::COLOR_BUFFER_BIT);

        if let Some(texture) = &self.texture {
            texture.bind(SAMPLER_UNIT);
        }
        self.shader.activate();
        self.mesh.draw();
    }
}
