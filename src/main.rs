use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridcaster::actor::InputState;
use gridcaster::level::Level;
use gridcaster::net::{Outbox, SnapshotCell};
use gridcaster::scaler::Upscaler;
use gridcaster::{EngineConfig, World, renderer};

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    world: World,

    // Network boundary: listener threads publish into the cell, the relay
    // drains the outbox. Both sides are external; this binary just logs
    // what it would send.
    net_cell: SnapshotCell,
    outbox: Outbox,
    epoch: Instant,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Internal framebuffer, one pixel column per ray
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,

    upscaler: Upscaler,

    // Input and movement
    keys_down: HashSet<KeyCode>,
    mouse_dx: f32,
    fire_down: bool,
    aim_down: bool,
    last_tick: Instant,
}

impl App {
    fn new(world: World) -> Self {
        let fb_w = world.config.ray_density.columns();
        let fb_h = fb_w * 3 / 4;
        Self {
            window: None,
            surface: None,
            world,

            net_cell: SnapshotCell::new(),
            outbox: Outbox::new(),
            epoch: Instant::now(),

            frame_counter: 0,
            last_fps_print: Instant::now(),

            fb_small: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,

            upscaler: Upscaler::empty(),

            keys_down: HashSet::new(),
            mouse_dx: 0.0,
            fire_down: false,
            aim_down: false,
            last_tick: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Gridcaster")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = Rc::new(event_loop.create_window(attributes).expect("create window"));

        let context = softbuffer::Context::new(window.clone()).expect("softbuffer context");
        let surface =
            softbuffer::Surface::new(&context, window.clone()).expect("softbuffer surface");

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        self.surface = Some(surface);
        self.window = Some(window);

        self.last_tick = Instant::now();
        self.window.as_ref().unwrap().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested, stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    match state {
                        ElementState::Pressed => {
                            self.keys_down.insert(code);
                            if code == KeyCode::KeyE && !repeat {
                                if let Some(obj) = self.world.claim_pickup() {
                                    log::info!("picked up object kind {}", obj.kind);
                                }
                            }
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&code);
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let down = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.fire_down = down,
                    MouseButton::Right => self.aim_down = down,
                    _ => (),
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (dw, dh) = (size.width as usize, size.height as usize);
                if dw == 0 || dh == 0 {
                    return; // Minimized window, skip drawing
                }

                surface
                    .resize(
                        NonZeroU32::new(dw as u32).unwrap(),
                        NonZeroU32::new(dh as u32).unwrap(),
                    )
                    .unwrap();

                let mut buf = surface.buffer_mut().expect("buffer_mut");
                self.upscaler.blit(&mut buf, dw, &self.fb_small);
                buf.present().unwrap();

                // The relay would drain these; solo runs just trace them.
                for message in self.outbox.drain() {
                    log::trace!("outbound {message}");
                }

                self.frame_counter += 1;
                let now = Instant::now();
                if now.duration_since(self.last_fps_print).as_secs_f32() >= 1.0 {
                    let fps = self.frame_counter as f32
                        / now.duration_since(self.last_fps_print).as_secs_f32();
                    log::debug!("fps {fps:.1}");
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }

                self.window.as_ref().unwrap().request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                let (dw, dh) = (new_size.width as usize, new_size.height as usize);
                self.rebuild_internal_fb_and_lut(dw, dh);
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse_dx += delta.0 as f32;
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let mut dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if dt > Duration::from_millis(100) {
            dt = Duration::from_millis(100);
        }
        let dt_s = dt.as_secs_f32();

        let mut forward = 0.0;
        let mut strafe = 0.0;
        if self.keys_down.contains(&KeyCode::KeyW) {
            forward += 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyS) {
            forward -= 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyD) {
            strafe += 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyA) {
            strafe -= 1.0;
        }

        let input = InputState {
            forward,
            strafe,
            turn: std::mem::take(&mut self.mouse_dx),
            run: self.keys_down.contains(&KeyCode::ShiftLeft),
            aim: self.aim_down,
            fire: self.fire_down || self.keys_down.contains(&KeyCode::Space),
            reload: self.keys_down.contains(&KeyCode::KeyR),
            switch: self.keys_down.contains(&KeyCode::KeyQ),
            melee: self.keys_down.contains(&KeyCode::KeyV),
        };

        self.world
            .sync_remotes(&self.net_cell, self.epoch.elapsed().as_secs_f64());
        let commands = self
            .world
            .frame(&input, dt_s, self.fb_w, self.fb_h, &self.outbox);
        renderer::render_frame(&mut self.fb_small, self.fb_w, self.fb_h, &commands);
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // One internal column per ray; height follows the window aspect.
        let target_w = self.world.config.ray_density.columns();
        let aspect = if dst_w > 0 {
            dst_h as f32 / dst_w as f32
        } else {
            0.75
        };
        let target_h = ((target_w as f32 * aspect).round() as usize).max(1);

        if target_w != self.fb_w || target_h != self.fb_h {
            self.fb_w = target_w;
            self.fb_h = target_h;
            self.fb_small = vec![0u32; self.fb_w * self.fb_h];
        }

        self.upscaler = Upscaler::new(dst_w, dst_h, self.fb_w, self.fb_h);
    }
}

fn main() {
    env_logger::init();

    let config = EngineConfig::default()
        .validated()
        .expect("default config is valid");
    let level = Level::demo(config.tile_size);
    let world = World::new(level, config).expect("demo world");

    let event_loop = EventLoop::new().unwrap();

    // ControlFlow::Wait pauses the event loop when no events are pending;
    // about_to_wait keeps a redraw queued, so frames keep coming.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(world);
    let _ = event_loop.run_app(&mut app);
}
