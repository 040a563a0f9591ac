use gl::types::*;
use std::ffi::{c_void, CStr};
use std::ptr;
use std::rc::Rc;

/// Shared handle to the active GL implementation.
///
/// Every GPU resource keeps one of these so it can release itself on drop.
pub type Gl = Rc<dyn GlApi>;

/// The subset of the OpenGL 3.3 core API used by the renderer.
///
/// Methods take `&self`; implementations must only be used from the thread
/// that owns the current context.
pub trait GlApi {
    // Shaders
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compiled(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    // Programs
    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_linked(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    // Uniforms
    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: GLfloat);
    fn uniform_4f(&self, location: GLint, value: [GLfloat; 4]);

    // Vertex arrays and buffers
    fn create_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, vao: GLuint);
    fn delete_vertex_array(&self, vao: GLuint);
    fn create_buffer(&self) -> GLuint;
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum);
    fn delete_buffer(&self, buffer: GLuint);
    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
    fn draw_elements(&self, mode: GLenum, count: GLsizei);

    // Textures
    fn create_texture(&self) -> GLuint;
    fn active_texture(&self, unit: GLenum);
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    fn tex_parameter(&self, target: GLenum, pname: GLenum, value: GLint);
    fn unpack_alignment(&self, alignment: GLint);
    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        pixels: &[u8],
    );
    fn generate_mipmap(&self, target: GLenum);
    fn delete_texture(&self, texture: GLuint);

    // Framebuffer state
    fn clear_color(&self, color: [GLfloat; 4]);
    fn clear(&self, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn polygon_mode(&self, face: GLenum, mode: GLenum);
}

/// Forwards every call to the `gl` crate's loaded function pointers.
///
/// Only construct this after `gl::load_with` has run against a current
/// context; see [`NativeGl::load`].
pub struct NativeGl {
    _private: (),
}

impl NativeGl {
    /// Loads the GL function pointers through `loader` and returns the backend.
    pub fn load<F>(mut loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(|symbol| loader(symbol));
        Self { _private: () }
    }

    /// Whether the entry points this backend relies on resolved.
    pub fn is_loaded(&self) -> bool {
        gl::CreateShader::is_loaded()
            && gl::CreateProgram::is_loaded()
            && gl::GenVertexArrays::is_loaded()
            && gl::DrawArrays::is_loaded()
    }

    fn read_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
        if len <= 0 {
            return String::new();
        }

        let mut buffer: Vec<u8> = vec![0; len as usize];
        let mut written: GLsizei = 0;
        fetch(len, &mut written, buffer.as_mut_ptr() as *mut GLchar);
        buffer.truncate(written.max(0) as usize);

        String::from_utf8_lossy(&buffer).trim_end().to_string()
    }
}

impl GlApi for NativeGl {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compiled(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success != 0
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        }
        Self::read_log(len, |len, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, len, written, buf);
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_linked(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success != 0
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        }
        Self::read_log(len, |len, written, buf| unsafe {
            gl::GetProgramInfoLog(program, len, written, buf);
        })
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { gl::Uniform1i(location, value) }
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        unsafe { gl::Uniform1f(location, value) }
    }

    fn uniform_4f(&self, location: GLint, value: [GLfloat; 4]) {
        unsafe { gl::Uniform4f(location, value[0], value[1], value[2], value[3]) }
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        vao
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn create_buffer(&self) -> GLuint {
        let mut buffer = 0;
        unsafe {
            gl::GenBuffers(1, &mut buffer);
        }
        buffer
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                usage,
            );
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei) {
        unsafe { gl::DrawElements(mode, count, gl::UNSIGNED_INT, ptr::null()) }
    }

    fn create_texture(&self) -> GLuint {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
        }
        texture
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn tex_parameter(&self, target: GLenum, pname: GLenum, value: GLint) {
        unsafe { gl::TexParameteri(target, pname, value) }
    }

    fn unpack_alignment(&self, alignment: GLint) {
        unsafe { gl::PixelStorei(gl::UNPACK_ALIGNMENT, alignment) }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        pixels: &[u8],
    ) {
        unsafe {
            gl::TexImage2D(
                target,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
        }
    }

    fn generate_mipmap(&self, target: GLenum) {
        unsafe { gl::GenerateMipmap(target) }
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn clear_color(&self, color: [GLfloat; 4]) {
        unsafe { gl::ClearColor(color[0], color[1], color[2], color[3]) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        unsafe { gl::PolygonMode(face, mode) }
    }
}
