use super::backend::Gl;
use gl::types::*;
use log::{debug, warn};
use std::mem;

const FLOAT_SIZE: usize = mem::size_of::<f32>();

/// One `f32` vector attribute in an interleaved vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: GLuint,
    pub components: usize,
}

/// Ordered attribute list describing an interleaved vertex buffer.
///
/// Stride and offsets are derived from the list, so they always agree with
/// each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Attributes bound to consecutive locations starting at 0.
    pub fn new(components: &[usize]) -> Self {
        let attributes = components
            .iter()
            .enumerate()
            .map(|(location, &components)| VertexAttribute {
                location: location as GLuint,
                components,
            })
            .collect();
        Self { attributes }
    }

    /// `vec3 aPos`
    pub fn position() -> Self {
        Self::new(&[3])
    }

    /// `vec3 aPos`, `vec3 aColor`
    pub fn position_color() -> Self {
        Self::new(&[3, 3])
    }

    /// `vec3 aPos`, `vec3 aColor`, `vec2 aTexCoord`
    pub fn position_color_tex() -> Self {
        Self::new(&[3, 3, 2])
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.attributes.iter().map(|a| a.components).sum()
    }

    pub fn stride_bytes(&self) -> usize {
        self.floats_per_vertex() * FLOAT_SIZE
    }

    /// Byte offset of the attribute at `index` within one vertex.
    pub fn offset_bytes(&self, index: usize) -> usize {
        self.attributes[..index].iter().map(|a| a.components).sum::<usize>() * FLOAT_SIZE
    }
}

/// Static geometry uploaded once: a VAO, its vertex buffer and an optional
/// element buffer.
pub struct Mesh {
    gl: Gl,
    vao: GLuint,
    vbo: GLuint,
    ebo: Option<GLuint>,
    vertex_count: usize,
    index_count: usize,
}

impl Mesh {
    pub fn new(gl: Gl, vertices: &[f32], layout: &VertexLayout) -> Self {
        Self::upload(gl, vertices, None, layout)
    }

    pub fn indexed(gl: Gl, vertices: &[f32], indices: &[u32], layout: &VertexLayout) -> Self {
        Self::upload(gl, vertices, Some(indices), layout)
    }

    fn upload(gl: Gl, vertices: &[f32], indices: Option<&[u32]>, layout: &VertexLayout) -> Self {
        let per_vertex = layout.floats_per_vertex();
        if per_vertex == 0 || vertices.len() % per_vertex != 0 {
            warn!(
                "Vertex data of {} floats is not a whole number of {}-float vertices",
                vertices.len(),
                per_vertex
            );
        }
        let vertex_count = vertices.len().checked_div(per_vertex).unwrap_or(0);

        let vao = gl.create_vertex_array();
        gl.bind_vertex_array(vao);

        let vbo = gl.create_buffer();
        gl.bind_buffer(gl::ARRAY_BUFFER, vbo);
        gl.buffer_data(gl::ARRAY_BUFFER, bytemuck::cast_slice(vertices), gl::STATIC_DRAW);

        let ebo = indices.map(|indices| {
            let ebo = gl.create_buffer();
            gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl.buffer_data(gl::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(indices), gl::STATIC_DRAW);
            ebo
        });

        let stride = layout.stride_bytes() as GLsizei;
        for (index, attribute) in layout.attributes().iter().enumerate() {
            gl.vertex_attrib_pointer(
                attribute.location,
                attribute.components as GLint,
                stride,
                layout.offset_bytes(index),
            );
            gl.enable_vertex_attrib_array(attribute.location);
        }

        // Unbind the VAO first so the element buffer binding stays recorded in it
        gl.bind_vertex_array(0);
        gl.bind_buffer(gl::ARRAY_BUFFER, 0);

        debug!(
            "Uploaded mesh vao={} with {} vertices, {} indices",
            vao,
            vertex_count,
            indices.map_or(0, <[u32]>::len)
        );

        Self {
            gl,
            vao,
            vbo,
            ebo,
            vertex_count,
            index_count: indices.map_or(0, <[u32]>::len),
        }
    }

    /// Issues one triangle-list draw call for the whole mesh.
    pub fn draw(&self) {
        self.gl.bind_vertex_array(self.vao);
        match self.ebo {
            Some(_) => self.gl.draw_elements(gl::TRIANGLES, self.index_count as GLsizei),
            None => self.gl.draw_arrays(gl::TRIANGLES, 0, self.vertex_count as GLsizei),
        }
    }

    pub fn vao(&self) -> GLuint {
        self.vao
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vao);
        self.gl.delete_buffer(self.vbo);
        if let Some(ebo) = self.ebo {
            self.gl.delete_buffer(ebo);
        }
    }
}
