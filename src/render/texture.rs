use super::backend::Gl;
use gl::types::*;
use image::DynamicImage;
use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to decode image at {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Image at {} is too large to upload ({width}x{height})", path.display())]
    Dimensions { path: PathBuf, width: u32, height: u32 },
}

/// Decoded pixels ready for upload, bottom row first.
#[derive(Debug, Clone)]
pub struct TextureImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl TextureImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = (img.width(), img.height());
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(TextureError::Dimensions {
                path: path.to_path_buf(),
                width,
                height,
            });
        }

        Ok(Self::from_dynamic(img))
    }

    /// Flips to GL's bottom-left origin and keeps alpha only when present.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let img = img.flipv();
        let (width, height) = (img.width(), img.height());

        let (channels, data) = if img.color().has_alpha() {
            (4, img.to_rgba8().into_raw())
        } else {
            (3, img.to_rgb8().into_raw())
        };

        Self {
            width,
            height,
            channels,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn gl_format(&self) -> GLenum {
        match self.channels {
            4 => gl::RGBA,
            _ => gl::RGB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap_s: GLenum,
    pub wrap_t: GLenum,
    pub min_filter: GLenum,
    pub mag_filter: GLenum,
    pub mipmaps: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            wrap_s: gl::REPEAT,
            wrap_t: gl::REPEAT,
            min_filter: gl::LINEAR_MIPMAP_LINEAR,
            mag_filter: gl::LINEAR,
            mipmaps: true,
        }
    }
}

pub struct Texture {
    gl: Gl,
    id: GLuint,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn from_file<P: AsRef<Path>>(gl: Gl, path: P, params: TextureParams) -> Result<Self, TextureError> {
        let image = TextureImage::open(path.as_ref())?;
        let texture = Self::from_image(gl, &image, params);
        info!(
            "Loaded texture {} ({}x{}, {} channels) from {}",
            texture.id,
            image.width(),
            image.height(),
            image.channels(),
            path.as_ref().display()
        );
        Ok(texture)
    }

    pub fn from_image(gl: Gl, image: &TextureImage, params: TextureParams) -> Self {
        let id = gl.create_texture();
        gl.bind_texture(gl::TEXTURE_2D, id);

        gl.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, params.wrap_s as GLint);
        gl.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, params.wrap_t as GLint);
        gl.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, params.min_filter as GLint);
        gl.tex_parameter(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, params.mag_filter as GLint);

        // RGB rows are not 4-byte aligned in general
        gl.unpack_alignment(1);
        gl.tex_image_2d(
            gl::TEXTURE_2D,
            image.gl_format() as GLint,
            image.width() as GLsizei,
            image.height() as GLsizei,
            image.gl_format(),
            image.data(),
        );
        gl.unpack_alignment(4);

        if params.mipmaps {
            gl.generate_mipmap(gl::TEXTURE_2D);
        }
        gl.bind_texture(gl::TEXTURE_2D, 0);

        Self {
            gl,
            id,
            width: image.width(),
            height: image.height(),
        }
    }

    /// Binds to texture unit `unit` (0 for `GL_TEXTURE0`).
    pub fn bind(&self, unit: u32) {
        self.gl.active_texture(gl::TEXTURE0 + unit);
        self.gl.bind_texture(gl::TEXTURE_2D, self.id);
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.gl.delete_texture(self.id);
    }
}
