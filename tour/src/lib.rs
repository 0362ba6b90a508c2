use std::sync::Arc;
use anyhow::anyhow;
use winit::{event::*, event_loop::{ControlFlow, EventLoop}, keyboard::{Key, NamedKey}};

pub mod error;
pub mod frame;
pub mod helper;
pub mod state;

pub use error::TourError;
use crate::state::{load_config, State};

/// Starts the campus tour.
///
/// This function initializes the logger, loads the configuration, creates the window, and starts the event loop.
/// `RUST_LOG` controls the log level, segment changes are logged at debug level.
///
/// The event loop is set to continuously run, even if the OS hasn't dispatched any events.
/// It handles the window events:
/// - Closing the window when requested by the user or when the escape key is pressed
/// - Updating and rendering the state when a redraw is requested
/// - Resizing the state when the window size changes
///
/// # Errors
///
/// Returns `TourError::Initialization` if the config, window or gpu setup fails and `TourError::AssetLoad`
/// if a scene, mesh or texture file can not be loaded.
pub async fn run(config_path: Option<String>) -> Result<(), TourError> {
    let _ = env_logger::try_init();

    let userconfig = load_config(config_path.as_deref())?;

    let event_loop = EventLoop::new()
        .map_err(|e| TourError::Initialization(anyhow!("Could not create event loop: {}", e)))?;
    let window = winit::window::WindowBuilder::new()
        .with_title(userconfig.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(userconfig.window.width, userconfig.window.height))
        .build(&event_loop)
        .map_err(|e| TourError::Initialization(anyhow!("Could not create window: {}", e)))?;
    let window = Arc::new(window);

    // ControlFlow::Poll continuously runs the event loop,
    // even if the OS hasn't dispatched any events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = State::new(window, userconfig).await?;
    let mut last_render_time = instant::Instant::now();

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window.id() && !state.input(event) => {
                match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                logical_key: Key::Named(NamedKey::Escape),
                                ..
                            },
                        ..
                    } => elwt.exit(),
                    WindowEvent::RedrawRequested => {
                        let now = instant::Instant::now();
                        let dt = now - last_render_time;
                        last_render_time = now;
                        state.update(dt);
                        match state.render() {
                            Ok(_) => {}
                            // Reconfigure the surface if it's lost or outdated
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size()),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("Out of gpu memory");
                                elwt.exit();
                            }
                            // We're ignoring timeouts
                            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                        }
                    }
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        log::debug!("Window={window_id:?} changed scale to {scale_factor}");
                    }
                    _ => {}
                };
            }
            // Request a redraw before the system goes to idle
            Event::AboutToWait => {
                state.window.request_redraw();
            }
            _ => ()
        }
    })
    .map_err(|e| TourError::Initialization(anyhow!("Event loop failed: {}", e)))
}
