//! Crystal Die entry point
//!
//! Handles platform-specific initialization and runs the render loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_view {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, PageTransitionEvent};

    use crystal_die::die::Viewport;
    use crystal_die::renderer::DieRenderState;
    use crystal_die::scene::{Camera, FrameContext};
    use crystal_die::view::{DieView, PointerInput, Subscription};
    use crystal_die::{DiePose, Settings};
    use glam::{Vec2, Vec3};

    /// Everything the animation frame callback touches
    struct App {
        view: DieView,
        render_state: Option<DieRenderState>,
        frame: FrameContext,
        settings: Settings,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        fn new(view: DieView, settings: Settings) -> Self {
            Self {
                view,
                render_state: None,
                frame: FrameContext::default(),
                settings,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Pose the die for this frame and draw it
        fn update(&mut self, time: f64) -> DiePose {
            let pose = self.view.frame(Some(time));

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            pose
        }

        fn render(&mut self) {
            self.view.render(&mut self.frame);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.frame, &self.settings) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn update_hud(&self) {
            if !self.settings.show_fps {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("fps") {
                el.set_text_content(Some(&self.fps.to_string()));
            }
        }
    }

    /// Window pixel size and the matching world viewport at the die
    fn window_viewport(camera: &Camera) -> Viewport {
        let Some(window) = web_sys::window() else {
            return Viewport::default();
        };
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        camera.viewport_at(Vec3::ZERO, Vec2::new(w as f32, h as f32))
    }

    /// Registered window listener, removed on cancel
    struct WindowListener {
        event: &'static str,
        closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    }

    impl WindowListener {
        fn register(
            event: &'static str,
            handler: impl FnMut(web_sys::Event) + 'static,
        ) -> Result<Box<Self>, JsValue> {
            let window = web_sys::window().ok_or("no window")?;
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            Ok(Box::new(Self {
                event,
                closure: Some(closure),
            }))
        }
    }

    impl Subscription for WindowListener {
        fn cancel(&mut self) {
            let Some(closure) = self.closure.take() else {
                return;
            };
            if let Some(window) = web_sys::window() {
                let _ = window.remove_event_listener_with_callback(
                    self.event,
                    closure.as_ref().unchecked_ref(),
                );
            }
            log::debug!("Removed {} listener", self.event);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Crystal Die starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load();

        // Set canvas size, capped by the quality preset
        let dpr = settings.pixel_ratio(window.device_pixel_ratio());
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let camera = Camera::default();
        let seed = js_sys::Date::now() as u64;
        let (view, input) = DieView::mount(&settings, seed, window_viewport(&camera));
        // The pointer writer lives apart from the frame state
        let input = Rc::new(RefCell::new(input));
        let app = Rc::new(RefCell::new(App::new(view, settings)));

        if let Some(fps) = document.get_element_by_id("fps") {
            let class = if app.borrow().settings.show_fps { "" } else { "hidden" };
            let _ = fps.set_attribute("class", class);
        }

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = DieRenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        render_state.camera = camera;
        app.borrow_mut().render_state = Some(render_state);

        setup_pointer_handler(&app, input.clone())?;
        setup_resize_handler(&app, input, canvas, camera)?;
        setup_page_lifecycle(app.clone())?;

        request_animation_frame(app);

        log::info!("Crystal Die running!");
        Ok(())
    }

    fn setup_pointer_handler(
        app: &Rc<RefCell<App>>,
        input: Rc<RefCell<PointerInput>>,
    ) -> Result<(), JsValue> {
        let listener = WindowListener::register("mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            input
                .borrow()
                .pointer_moved(Vec2::new(event.client_x() as f32, event.client_y() as f32));
        })?;
        app.borrow_mut().view.attach(listener);
        Ok(())
    }

    fn setup_resize_handler(
        app: &Rc<RefCell<App>>,
        input: Rc<RefCell<PointerInput>>,
        canvas: HtmlCanvasElement,
        camera: Camera,
    ) -> Result<(), JsValue> {
        let handler_app = app.clone();
        let listener = WindowListener::register("resize", move |_event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            input.borrow_mut().resize(window_viewport(&camera));

            let mut a = handler_app.borrow_mut();
            let dpr = a.settings.pixel_ratio(window.device_pixel_ratio());
            let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
            let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(ref mut render_state) = a.render_state {
                render_state.resize(width, height);
            }
            log::debug!("Resized to {}x{}", width, height);
        })?;
        app.borrow_mut().view.attach(listener);
        Ok(())
    }

    /// Suspend on bfcache entry, resume on restore, unmount when the page is discarded
    fn setup_page_lifecycle(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let persisted = event
                    .dyn_ref::<PageTransitionEvent>()
                    .is_some_and(|e| e.persisted());
                let mut a = app.borrow_mut();
                a.settings.save();
                a.view.page_hidden(persisted);
            });
            window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let restart = app.borrow_mut().view.page_shown();
                if restart {
                    request_animation_frame(app.clone());
                }
            });
            window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            render_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn render_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            if !a.view.is_running() {
                log::info!("View not running, stopping render loop");
                return;
            }
            a.update(time);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_view::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Crystal Die (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    print_sample_poses();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Step a headless view through a few seconds and print the poses
#[cfg(not(target_arch = "wasm32"))]
fn print_sample_poses() {
    use crystal_die::Settings;
    use crystal_die::scene::{Camera, FrameContext};
    use crystal_die::view::DieView;
    use glam::{Vec2, Vec3};

    let camera = Camera::default();
    let viewport = camera.viewport_at(Vec3::ZERO, Vec2::new(1280.0, 720.0));
    let (mut view, input) = DieView::mount(&Settings::default(), 42, viewport);

    let mut frame = FrameContext::default();
    for step in 0..=8 {
        let ms = step as f64 * 500.0;
        // Sweep the pointer left to right across the window
        input.pointer_moved(Vec2::new(160.0 * step as f32, 360.0));
        let pose = view.frame(Some(ms));
        view.render(&mut frame);
        let r = pose.rotation;
        let y = pose.translation().y;
        println!(
            "t={:>4.1}s  rot=({:+.3}, {:+.3}, {:+.3})  y={:+.3}  draws={}",
            ms / 1000.0,
            r.x,
            r.y,
            r.z,
            y,
            frame.draws().len()
        );
    }

    view.unmount();
}
