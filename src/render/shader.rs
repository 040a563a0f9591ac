// shader.rs - Shader program loading, linking and uniform access

use super::backend::Gl;
use gl::types::*;
use glam::Vec4;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::ffi::{CString, NulError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to read shader source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Shader source contains a null byte: {0}")]
    Nul(#[from] NulError),
    #[error("Failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Program linking failed: {log}")]
    Link { log: String },
}

/// Vertex and fragment source text for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Reads both stages fully into memory.
    pub fn from_files(vertex_path: &Path, fragment_path: &Path) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_source(vertex_path)?,
            fragment: read_source(fragment_path)?,
        })
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// What to do when a program fails to build.
#[derive(Debug, Clone, Default)]
pub enum ShaderFailurePolicy {
    /// Hand the error back to the caller.
    #[default]
    Propagate,
    /// Log the error and terminate the process with this status.
    Exit(i32),
    /// Log the error and build this in-memory program instead.
    Fallback(ShaderSource),
}

impl ShaderFailurePolicy {
    fn resolve(
        self,
        gl: Gl,
        result: Result<ShaderProgram, ShaderError>,
    ) -> Result<ShaderProgram, ShaderError> {
        let err = match result {
            Ok(program) => return Ok(program),
            Err(err) => err,
        };

        match self {
            ShaderFailurePolicy::Propagate => Err(err),
            ShaderFailurePolicy::Exit(code) => {
                error!("{}", err);
                error!("Aborting with exit status {}", code);
                process::exit(code)
            }
            ShaderFailurePolicy::Fallback(source) => {
                error!("{}", err);
                warn!("Substituting fallback shader program");
                ShaderProgram::from_source(gl, source)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum ShaderOrigin {
    Files { vertex: PathBuf, fragment: PathBuf },
    Source(ShaderSource),
}

impl ShaderOrigin {
    fn load(&self) -> Result<ShaderSource, ShaderError> {
        match self {
            ShaderOrigin::Files { vertex, fragment } => ShaderSource::from_files(vertex, fragment),
            ShaderOrigin::Source(source) => Ok(source.clone()),
        }
    }
}

/// A linked vertex + fragment program.
///
/// A value of this type always wraps a successfully linked program; failed
/// builds surface as [`ShaderError`] instead. The program is deleted on drop.
pub struct ShaderProgram {
    gl: Gl,
    id: GLuint,
    origin: ShaderOrigin,
    uniforms: HashMap<String, GLint>,
}

impl ShaderProgram {
    /// Reads, compiles and links the two source files.
    pub fn from_files(
        gl: Gl,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let origin = ShaderOrigin::Files {
            vertex: vertex_path.as_ref().to_path_buf(),
            fragment: fragment_path.as_ref().to_path_buf(),
        };
        let source = origin.load()?;
        let id = Self::build(&gl, &source)?;
        info!(
            "Linked shader program {} from {} + {}",
            id,
            vertex_path.as_ref().display(),
            fragment_path.as_ref().display()
        );

        Ok(Self {
            gl,
            id,
            origin,
            uniforms: HashMap::new(),
        })
    }

    pub fn from_source(gl: Gl, source: ShaderSource) -> Result<Self, ShaderError> {
        let id = Self::build(&gl, &source)?;
        debug!("Linked shader program {} from memory", id);

        Ok(Self {
            gl,
            id,
            origin: ShaderOrigin::Source(source),
            uniforms: HashMap::new(),
        })
    }

    /// [`ShaderProgram::from_files`] with the failure handled by `policy`.
    pub fn load(
        gl: Gl,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        policy: ShaderFailurePolicy,
    ) -> Result<Self, ShaderError> {
        let result = Self::from_files(gl.clone(), vertex_path, fragment_path);
        policy.resolve(gl, result)
    }

    fn build(gl: &Gl, source: &ShaderSource) -> Result<GLuint, ShaderError> {
        let vertex_shader = Self::compile_stage(gl, ShaderStage::Vertex, &source.vertex)?;
        let fragment_shader = match Self::compile_stage(gl, ShaderStage::Fragment, &source.fragment) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(vertex_shader);
                return Err(err);
            }
        };

        let program = gl.create_program();
        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        // Stages are no longer needed once the link has been attempted.
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.program_linked(program) {
            let log = non_empty_log(gl.program_info_log(program));
            gl.delete_program(program);
            return Err(ShaderError::Link { log });
        }

        Ok(program)
    }

    fn compile_stage(gl: &Gl, stage: ShaderStage, source: &str) -> Result<GLuint, ShaderError> {
        let source = CString::new(source.as_bytes())?;

        let shader = gl.create_shader(stage.gl_enum());
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);

        if !gl.shader_compiled(shader) {
            let log = non_empty_log(gl.shader_info_log(shader));
            gl.delete_shader(shader);
            return Err(ShaderError::Compile { stage, log });
        }

        Ok(shader)
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    /// Makes this the program used by subsequent draw calls.
    pub fn activate(&self) {
        self.gl.use_program(self.id);
    }

    /// Rebuilds from the stored sources and swaps the program in place.
    ///
    /// On failure the current program stays usable and the error is returned.
    /// A successful reload drops every cached uniform location.
    pub fn reload(&mut self) -> Result<(), ShaderError> {
        let source = self.origin.load()?;
        let id = Self::build(&self.gl, &source)?;

        self.gl.delete_program(self.id);
        self.id = id;
        self.uniforms.clear();
        info!("Reloaded shader program {}", id);
        Ok(())
    }

    /// Location of `name`, looked up once and cached; -1 when inactive.
    pub fn uniform_location(&mut self, name: &str) -> GLint {
        if let Some(location) = self.uniforms.get(name) {
            return *location;
        }

        let location = match CString::new(name) {
            Ok(cname) => self.gl.uniform_location(self.id, &cname),
            Err(_) => -1,
        };

        if location == -1 {
            warn!("Uniform '{}' not found in shader program {}", name, self.id);
        }

        self.uniforms.insert(name.to_string(), location);
        location
    }

    // Uniform setters write to the currently active program; call
    // `activate` first. Unknown names resolve to -1, which GL ignores.
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_int(name, value as i32);
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        let location = self.uniform_location(name);
        self.gl.uniform_1i(location, value);
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        let location = self.uniform_location(name);
        self.gl.uniform_1f(location, value);
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        let location = self.uniform_location(name);
        self.gl.uniform_4f(location, value.to_array());
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

fn non_empty_log(log: String) -> String {
    if log.trim().is_empty() {
        "no diagnostic output from driver".to_string()
    } else {
        log
    }
}
