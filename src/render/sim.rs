//! Software stand-in for a GL driver, used by the unit tests.
//!
//! It tracks object lifetimes, runs a crude GLSL syntax check, resolves
//! uniforms and varyings from declarations and rasterizes solid-colored
//! triangles into a small RGBA framebuffer.

use super::backend::GlApi;
use gl::types::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::CStr;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec4([f32; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub program: GLuint,
    pub vao: GLuint,
    pub mode: GLenum,
    pub count: GLsizei,
    pub indexed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttribPointer {
    pub buffer: GLuint,
    pub components: GLint,
    pub stride: GLsizei,
    pub offset: usize,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimTexture {
    pub width: i32,
    pub height: i32,
    pub internal_format: GLint,
    pub format: GLenum,
    pub bytes: usize,
    pub params: HashMap<GLenum, GLint>,
    pub mipmaps: bool,
    pub unpack_alignment: GLint,
}

struct SimShader {
    kind: GLenum,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct SimProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: HashMap<GLint, UniformValue>,
    fragment_color: Option<[f32; 4]>,
}

#[derive(Default)]
struct SimVertexArray {
    attribs: HashMap<GLuint, AttribPointer>,
    element_buffer: GLuint,
}

#[derive(Default)]
struct State {
    next_id: GLuint,
    shaders: HashMap<GLuint, SimShader>,
    programs: HashMap<GLuint, SimProgram>,
    vertex_arrays: HashMap<GLuint, SimVertexArray>,
    buffers: HashMap<GLuint, Vec<u8>>,
    textures: HashMap<GLuint, SimTexture>,
    current_program: GLuint,
    bound_vao: GLuint,
    bound_array_buffer: GLuint,
    bound_texture: GLuint,
    active_unit: GLenum,
    unpack_alignment: GLint,
    clear_color: [f32; 4],
    polygon_mode: GLenum,
    viewport: (GLsizei, GLsizei),
    framebuffer: Vec<[f32; 4]>,
    draws: Vec<DrawCall>,
    uniform_lookups: usize,
}

impl State {
    fn alloc(&mut self) -> GLuint {
        self.next_id += 1;
        self.next_id
    }
}

pub struct SimGl {
    width: usize,
    height: usize,
    state: Mutex<State>,
}

impl SimGl {
    pub fn new(width: usize, height: usize) -> Rc<Self> {
        let state = State {
            unpack_alignment: 4,
            active_unit: gl::TEXTURE0,
            polygon_mode: gl::FILL,
            viewport: (width as GLsizei, height as GLsizei),
            framebuffer: vec![[0.0; 4]; width * height],
            ..State::default()
        };
        Rc::new(Self {
            width,
            height,
            state: Mutex::new(state),
        })
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.lock().draws.clone()
    }

    /// Pixel at column `x`, row `y` counted from the bottom edge.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        self.state.lock().framebuffer[y * self.width + x]
    }

    pub fn uniform_lookups(&self) -> usize {
        self.state.lock().uniform_lookups
    }

    pub fn uniform_value(&self, program: GLuint, name: &str) -> Option<UniformValue> {
        let state = self.state.lock();
        let program = state.programs.get(&program)?;
        let location = program.uniforms.iter().position(|u| u == name)? as GLint;
        program.values.get(&location).copied()
    }

    pub fn uniform_values(&self, program: GLuint) -> HashMap<GLint, UniformValue> {
        let state = self.state.lock();
        state
            .programs
            .get(&program)
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.lock().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.lock().programs.len()
    }

    pub fn program_exists(&self, program: GLuint) -> bool {
        self.state.lock().programs.contains_key(&program)
    }

    pub fn current_program(&self) -> GLuint {
        self.state.lock().current_program
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.lock().vertex_arrays.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.lock().buffers.len()
    }

    pub fn attrib(&self, vao: GLuint, index: GLuint) -> Option<AttribPointer> {
        let state = self.state.lock();
        state.vertex_arrays.get(&vao)?.attribs.get(&index).copied()
    }

    pub fn bound_vertex_array(&self) -> GLuint {
        self.state.lock().bound_vao
    }

    pub fn texture(&self, texture: GLuint) -> Option<SimTexture> {
        self.state.lock().textures.get(&texture).cloned()
    }

    pub fn bound_texture(&self) -> (GLenum, GLuint) {
        let state = self.state.lock();
        (state.active_unit, state.bound_texture)
    }

    pub fn polygon_mode(&self) -> GLenum {
        self.state.lock().polygon_mode
    }

    pub fn viewport(&self) -> (GLsizei, GLsizei) {
        self.state.lock().viewport
    }

    fn rasterize(&self, state: &mut State, color: [f32; 4], positions: &[[f32; 2]]) {
        let (w, h) = (self.width as f32, self.height as f32);
        for tri in positions.chunks_exact(3) {
            let screen: Vec<[f32; 2]> = tri
                .iter()
                .map(|p| [(p[0] + 1.0) * 0.5 * w, (p[1] + 1.0) * 0.5 * h])
                .collect();
            let area = edge(screen[0], screen[1], screen[2]);
            if area == 0.0 {
                continue;
            }
            for y in 0..self.height {
                for x in 0..self.width {
                    let p = [x as f32 + 0.5, y as f32 + 0.5];
                    let w0 = edge(screen[1], screen[2], p) / area;
                    let w1 = edge(screen[2], screen[0], p) / area;
                    let w2 = edge(screen[0], screen[1], p) / area;
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        state.framebuffer[y * self.width + x] = color;
                    }
                }
            }
        }
    }

    fn positions(state: &State, vao: GLuint, indices: Option<Vec<u32>>, first: usize, count: usize) -> Vec<[f32; 2]> {
        let Some(attrib) = state
            .vertex_arrays
            .get(&vao)
            .and_then(|v| v.attribs.get(&0))
            .filter(|a| a.enabled)
        else {
            return Vec::new();
        };
        let Some(bytes) = state.buffers.get(&attrib.buffer) else {
            return Vec::new();
        };
        let floats: Vec<f32> = bytemuck::pod_collect_to_vec::<u8, f32>(bytes.as_slice());
        let stride = if attrib.stride == 0 {
            attrib.components as usize
        } else {
            attrib.stride as usize / 4
        };
        let offset = attrib.offset / 4;

        let vertex_ids: Vec<usize> = match indices {
            Some(indices) => indices.into_iter().take(count).map(|i| i as usize).collect(),
            None => (first..first + count).collect(),
        };
        vertex_ids
            .into_iter()
            .filter_map(|v| {
                let base = v * stride + offset;
                Some([*floats.get(base)?, *floats.get(base + 1)?])
            })
            .collect()
    }

    fn draw(&self, mode: GLenum, first: GLint, count: GLsizei, indexed: bool) {
        let mut state = self.state.lock();
        let call = DrawCall {
            program: state.current_program,
            vao: state.bound_vao,
            mode,
            count,
            indexed,
        };
        state.draws.push(call);

        if mode != gl::TRIANGLES || state.polygon_mode != gl::FILL {
            return;
        }
        let Some(program) = state.programs.get(&call.program).filter(|p| p.linked) else {
            return;
        };
        let color = program
            .uniforms
            .iter()
            .position(|u| u == "ourColor")
            .and_then(|loc| program.values.get(&(loc as GLint)))
            .and_then(|v| match v {
                UniformValue::Vec4(c) => Some(*c),
                _ => None,
            })
            .or(program.fragment_color)
            .unwrap_or([1.0; 4]);

        let indices = if indexed {
            state
                .vertex_arrays
                .get(&call.vao)
                .and_then(|v| state.buffers.get(&v.element_buffer))
                .map(|bytes| bytemuck::pod_collect_to_vec::<u8, u32>(bytes.as_slice()))
        } else {
            None
        };
        let positions = Self::positions(&state, call.vao, indices, first.max(0) as usize, count.max(0) as usize);
        self.rasterize(&mut state, color, &positions);
    }
}

fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Names declared by lines starting with `keyword`, e.g. `out vec3 color;`.
fn declared(source: &str, keyword: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = match line.strip_prefix("layout") {
                Some(rest) => rest.split_once(')')?.1.trim_start(),
                None => line,
            };
            let rest = rest.strip_prefix(keyword)?;
            if !rest.starts_with(' ') {
                return None;
            }
            let name = rest.trim_end_matches(';').split_whitespace().last()?;
            Some(name.to_string())
        })
        .collect()
}

fn check_syntax(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("ERROR: 0:0: '' : empty shader source".to_string());
    }

    let mut depth = 0i32;
    for (number, line) in source.lines().enumerate() {
        let line = line.trim();
        let is_declaration = ["in ", "out ", "uniform ", "layout"]
            .iter()
            .any(|prefix| line.starts_with(prefix));
        if is_declaration && !line.ends_with(';') {
            return Err(format!(
                "ERROR: 0:{}: '{}' : syntax error: expected ';'",
                number + 1,
                line.split_whitespace().last().unwrap_or_default()
            ));
        }
        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;
        if depth < 0 {
            return Err(format!("ERROR: 0:{}: '}}' : syntax error", number + 1));
        }
    }
    if depth != 0 {
        return Err("ERROR: 0:0: '' : unexpected end of file".to_string());
    }
    if !source.contains("void main") {
        return Err("ERROR: 0:0: 'main' : function not defined".to_string());
    }
    Ok(())
}

/// First `vec4(r, g, b, a)` literal assigned in a fragment shader.
fn literal_color(source: &str) -> Option<[f32; 4]> {
    let start = source.find("= vec4(")? + "= vec4(".len();
    let end = start + source[start..].find(')')?;
    let parts: Vec<f32> = source[start..end]
        .split(',')
        .map(|p| p.trim().trim_end_matches('f').parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    parts.try_into().ok()
}

impl GlApi for SimGl {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.shaders.insert(
            id,
            SimShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        id
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        if let Some(s) = self.state.lock().shaders.get_mut(&shader) {
            s.source = source.to_string_lossy().into_owned();
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        if let Some(s) = self.state.lock().shaders.get_mut(&shader) {
            match check_syntax(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = log;
                }
            }
        }
    }

    fn shader_compiled(&self, shader: GLuint) -> bool {
        self.state.lock().shaders.get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        self.state
            .lock()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        self.state.lock().shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.programs.insert(id, SimProgram::default());
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        if let Some(p) = self.state.lock().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.state.lock();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let stages: Vec<&SimShader> = attached.iter().filter_map(|id| state.shaders.get(id)).collect();

        let vertex = stages.iter().find(|s| s.kind == gl::VERTEX_SHADER);
        let fragment = stages.iter().find(|s| s.kind == gl::FRAGMENT_SHADER);
        let result = match (vertex, fragment) {
            _ if stages.iter().any(|s| !s.compiled) => {
                Err("error: linking with uncompiled shader".to_string())
            }
            (Some(vertex), Some(fragment)) => {
                let outputs = declared(&vertex.source, "out");
                match declared(&fragment.source, "in")
                    .into_iter()
                    .find(|input| !outputs.contains(input))
                {
                    Some(missing) => Err(format!(
                        "error: fragment shader input '{missing}' has no matching vertex output"
                    )),
                    None => {
                        let mut uniforms = Vec::new();
                        for name in declared(&vertex.source, "uniform")
                            .into_iter()
                            .chain(declared(&fragment.source, "uniform"))
                        {
                            if !uniforms.contains(&name) {
                                uniforms.push(name);
                            }
                        }
                        Ok((uniforms, literal_color(&fragment.source)))
                    }
                }
            }
            _ => Err("error: program needs a vertex and a fragment stage".to_string()),
        };

        if let Some(p) = state.programs.get_mut(&program) {
            p.values.clear();
            match result {
                Ok((uniforms, color)) => {
                    p.linked = true;
                    p.log.clear();
                    p.uniforms = uniforms;
                    p.fragment_color = color;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                    p.uniforms.clear();
                }
            }
        }
    }

    fn program_linked(&self, program: GLuint) -> bool {
        self.state.lock().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        self.state
            .lock()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: GLuint) {
        self.state.lock().current_program = program;
    }

    fn delete_program(&self, program: GLuint) {
        let mut state = self.state.lock();
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        let mut state = self.state.lock();
        state.uniform_lookups += 1;
        let name = name.to_string_lossy();
        state
            .programs
            .get(&program)
            .filter(|p| p.linked)
            .and_then(|p| p.uniforms.iter().position(|u| *u == name))
            .map_or(-1, |loc| loc as GLint)
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        store_uniform(&self.state, location, UniformValue::Int(value));
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        store_uniform(&self.state, location, UniformValue::Float(value));
    }

    fn uniform_4f(&self, location: GLint, value: [GLfloat; 4]) {
        store_uniform(&self.state, location, UniformValue::Vec4(value));
    }

    fn create_vertex_array(&self) -> GLuint {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.vertex_arrays.insert(id, SimVertexArray::default());
        id
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        self.state.lock().bound_vao = vao;
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        let mut state = self.state.lock();
        state.vertex_arrays.remove(&vao);
        if state.bound_vao == vao {
            state.bound_vao = 0;
        }
    }

    fn create_buffer(&self) -> GLuint {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.buffers.insert(id, Vec::new());
        id
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        let mut state = self.state.lock();
        match target {
            gl::ARRAY_BUFFER => state.bound_array_buffer = buffer,
            gl::ELEMENT_ARRAY_BUFFER => {
                let vao = state.bound_vao;
                if let Some(v) = state.vertex_arrays.get_mut(&vao) {
                    v.element_buffer = buffer;
                }
            }
            _ => {}
        }
    }

    fn buffer_data(&self, target: GLenum, data: &[u8], _usage: GLenum) {
        let mut state = self.state.lock();
        let buffer = match target {
            gl::ARRAY_BUFFER => state.bound_array_buffer,
            gl::ELEMENT_ARRAY_BUFFER => state
                .vertex_arrays
                .get(&state.bound_vao)
                .map_or(0, |v| v.element_buffer),
            _ => 0,
        };
        if let Some(b) = state.buffers.get_mut(&buffer) {
            *b = data.to_vec();
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.state.lock().buffers.remove(&buffer);
    }

    fn vertex_attrib_pointer(&self, index: GLuint, components: GLint, stride: GLsizei, offset: usize) {
        let mut state = self.state.lock();
        let (vao, buffer) = (state.bound_vao, state.bound_array_buffer);
        if let Some(v) = state.vertex_arrays.get_mut(&vao) {
            let enabled = v.attribs.get(&index).is_some_and(|a| a.enabled);
            v.attribs.insert(
                index,
                AttribPointer {
                    buffer,
                    components,
                    stride,
                    offset,
                    enabled,
                },
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        let mut state = self.state.lock();
        let vao = state.bound_vao;
        if let Some(a) = state
            .vertex_arrays
            .get_mut(&vao)
            .and_then(|v| v.attribs.get_mut(&index))
        {
            a.enabled = true;
        }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        self.draw(mode, first, count, false);
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei) {
        self.draw(mode, 0, count, true);
    }

    fn create_texture(&self) -> GLuint {
        let mut state = self.state.lock();
        let id = state.alloc();
        state.textures.insert(id, SimTexture::default());
        id
    }

    fn active_texture(&self, unit: GLenum) {
        self.state.lock().active_unit = unit;
    }

    fn bind_texture(&self, _target: GLenum, texture: GLuint) {
        self.state.lock().bound_texture = texture;
    }

    fn tex_parameter(&self, _target: GLenum, pname: GLenum, value: GLint) {
        let mut state = self.state.lock();
        let bound = state.bound_texture;
        if let Some(t) = state.textures.get_mut(&bound) {
            t.params.insert(pname, value);
        }
    }

    fn unpack_alignment(&self, alignment: GLint) {
        self.state.lock().unpack_alignment = alignment;
    }

    fn tex_image_2d(
        &self,
        _target: GLenum,
        internal_format: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        pixels: &[u8],
    ) {
        let mut state = self.state.lock();
        let (bound, alignment) = (state.bound_texture, state.unpack_alignment);
        if let Some(t) = state.textures.get_mut(&bound) {
            t.width = width;
            t.height = height;
            t.internal_format = internal_format;
            t.format = format;
            t.bytes = pixels.len();
            t.unpack_alignment = alignment;
            t.mipmaps = false;
        }
    }

    fn generate_mipmap(&self, _target: GLenum) {
        let mut state = self.state.lock();
        let bound = state.bound_texture;
        if let Some(t) = state.textures.get_mut(&bound) {
            t.mipmaps = true;
        }
    }

    fn delete_texture(&self, texture: GLuint) {
        let mut state = self.state.lock();
        state.textures.remove(&texture);
        if state.bound_texture == texture {
            state.bound_texture = 0;
        }
    }

    fn clear_color(&self, color: [GLfloat; 4]) {
        self.state.lock().clear_color = color;
    }

    fn clear(&self, mask: GLbitfield) {
        let mut state = self.state.lock();
        if mask & gl::COLOR_BUFFER_BIT != 0 {
            let color = state.clear_color;
            state.framebuffer.fill(color);
        }
    }

    fn viewport(&self, _x: GLint, _y: GLint, width: GLsizei, height: GLsizei) {
        self.state.lock().viewport = (width, height);
    }

    fn polygon_mode(&self, _face: GLenum, mode: GLenum) {
        self.state.lock().polygon_mode = mode;
    }
}

fn store_uniform(state: &Mutex<State>, location: GLint, value: UniformValue) {
    if location < 0 {
        return;
    }
    let mut state = state.lock();
    let current = state.current_program;
    if let Some(p) = state.programs.get_mut(&current).filter(|p| p.linked) {
        if (location as usize) < p.uniforms.len() {
            p.values.insert(location, value);
        }
    }
}
