use crate::config::AppConfig;
use crate::render::{Gl, NativeGl};
use anyhow::{anyhow, bail, Context, Result};
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{error, info, warn, LevelFilter};
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use std::{ffi::CString, num::NonZeroU32, process::ExitCode, ptr, rc::Rc, time::Instant};
use thiserror::Error;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

/// Exit status for window, context or loader failures (-1 as a byte).
pub const INIT_FAILURE_STATUS: u8 = 255;

/// One tutorial program: GPU setup once, then one frame per redraw.
pub trait Lesson: Sized {
    const TITLE: &'static str;

    fn init(gl: Gl, config: &AppConfig) -> Result<Self>;

    /// Draws one frame; `elapsed` is seconds since the window opened.
    fn render(&mut self, elapsed: f32);
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to initialize window or GL context: {0:#}")]
    Init(anyhow::Error),
    #[error("Failed to set up lesson: {0:#}")]
    Lesson(anyhow::Error),
    #[error("Event loop terminated abnormally: {0}")]
    EventLoop(winit::error::EventLoopError),
}

impl LaunchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::Init(_) => INIT_FAILURE_STATUS,
            LaunchError::Lesson(_) | LaunchError::EventLoop(_) => 1,
        }
    }
}

struct GlWindowContext {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    gl: Gl,
}

struct App<L: Lesson> {
    // Declared first so lesson resources drop while the context is alive.
    lesson: L,
    gl: Gl,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    started: Instant,
}

impl<L: Lesson> App<L> {
    /// Returns true when the window should close.
    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => true,
            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.gl_surface.resize(&self.gl_context, width, height);
                    self.gl.viewport(0, 0, size.width as i32, size.height as i32);
                }
                false
            }
            WindowEvent::RedrawRequested => {
                self.lesson.render(self.started.elapsed().as_secs_f32());
                if let Err(e) = self.gl_surface.swap_buffers(&self.gl_context) {
                    error!("Failed to swap buffers: {}", e);
                }
                false
            }
            _ => false,
        }
    }
}

/// Runs lesson `L` to completion and maps the outcome to a process status.
pub fn launch<L: Lesson>() -> ExitCode {
    if let Err(e) = SimpleLogger::new().with_level(LevelFilter::Info).init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("{}; using default configuration", e);
        AppConfig::default()
    });

    match run::<L>(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

pub fn run<L: Lesson>(config: AppConfig) -> Result<(), LaunchError> {
    info!("Starting lesson: {}", L::TITLE);
    let (event_loop, context) = create_window(&config, L::TITLE).map_err(LaunchError::Init)?;

    let size = context.window.inner_size();
    apply_render_state(&context.gl, &config, size.width, size.height);

    let lesson = L::init(context.gl.clone(), &config).map_err(LaunchError::Lesson)?;
    let mut app = App {
        lesson,
        gl: context.gl,
        gl_surface: context.gl_surface,
        gl_context: context.gl_context,
        window: context.window,
        started: Instant::now(),
    };

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => {
                if app.handle_window_event(&event) {
                    info!("Closing {}", L::TITLE);
                    elwt.exit();
                }
            }
            Event::AboutToWait => app.window.request_redraw(),
            _ => (),
        })
        .map_err(LaunchError::EventLoop)
}

/// Initial viewport and polygon mode for a fresh context.
pub fn apply_render_state(gl: &Gl, config: &AppConfig, width: u32, height: u32) {
    gl.viewport(0, 0, width as i32, height as i32);
    if config.render.wireframe {
        gl.polygon_mode(gl::FRONT_AND_BACK, gl::LINE);
    }
}

fn create_window(config: &AppConfig, title: &str) -> Result<(EventLoop<()>, GlWindowContext)> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .context("Failed to create event loop")?;

    let window_builder = WindowBuilder::new()
        .with_title(format!("{} - {}", config.window.title, title))
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

    let template = ConfigTemplateBuilder::new().with_alpha_size(8);
    let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

    let (window, gl_config) = display_builder
        .build(&event_loop, template, |configs| {
            configs
                .reduce(|accum, config| {
                    if config.num_samples() > accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .expect("glutin offers at least one config to the picker")
        })
        .map_err(|e| anyhow!("Failed to create GL window: {}", e))?;

    let window = window.context("Display builder returned no window")?;
    let raw_window_handle = window.raw_window_handle();

    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(
            config.render.gl_major,
            config.render.gl_minor,
        ))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_window_handle));

    let gl_display = gl_config.display();
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .context("Failed to create OpenGL context")?;

    let attrs = window.build_surface_attributes(<_>::default());
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
        .context("Failed to create GL surface")?;

    let gl_context = not_current
        .make_current(&gl_surface)
        .context("Failed to make context current")?;

    if config.render.vsync {
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN)) {
            warn!("Failed to enable vsync: {}", e);
        }
    }

    // Load OpenGL functions
    let native = NativeGl::load(|symbol| match CString::new(symbol) {
        Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()) as *const _,
        Err(_) => ptr::null(),
    });
    if !native.is_loaded() {
        bail!("Failed to load OpenGL function pointers");
    }
    info!(
        "Created OpenGL {}.{} core context",
        config.render.gl_major, config.render.gl_minor
    );

    Ok((
        event_loop,
        GlWindowContext {
            window,
            gl_context,
            gl_surface,
            gl: Rc::new(native),
        },
    ))
}
