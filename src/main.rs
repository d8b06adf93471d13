//! Cosmic Ride entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{AudioBuffer, AudioContext, HtmlCanvasElement, MouseEvent, TouchEvent};

    use cosmic_ride::Game;
    use cosmic_ride::assets::{self, AssetBundle, AssetError, AssetLoader, ImageAsset, SoundAsset};
    use cosmic_ride::audio::{self, AudioManager, Mixer};
    use cosmic_ride::consts::*;
    use cosmic_ride::platform::LocalStorage;
    use cosmic_ride::renderer::{RenderState, scene, vertex::colors};
    use cosmic_ride::sim::GamePhase;

    type Loader = AssetLoader<image::RgbaImage, AudioBuffer>;

    /// Page state wrapped around the game
    struct App {
        game: Game<LocalStorage>,
        render_state: RenderState,
        audio: AudioManager,
        canvas: HtmlCanvasElement,
        /// Shared with the fetch tasks until every asset has resolved
        loader: Rc<RefCell<Loader>>,
        /// Set once loading finished; textures live in the renderer
        assets: Option<AssetBundle<(), AudioBuffer>>,
        last_time: f64,
        blurred: bool,
        // Last values written to the DOM
        hud_text: String,
        hud_phase: Option<GamePhase>,
    }

    impl App {
        fn loaded(&self) -> bool {
            self.assets.is_some()
        }

        /// Run simulation ticks, or wait for the loader
        fn update(&mut self, dt: f32) {
            if !self.loaded() {
                self.poll_loader();
                return;
            }
            let out = self.game.frame(dt);
            for effect in out.sounds {
                self.audio.play(effect);
            }
            if let Some(cue) = out.music {
                self.audio.music(cue);
            }
        }

        /// Hand the loaded assets to the renderer and audio once all resolved
        fn poll_loader(&mut self) {
            if !self.loader.borrow().is_complete() {
                return;
            }
            let loader = std::mem::take(&mut *self.loader.borrow_mut());
            let bundle = self.render_state.upload_images(loader.finish());
            self.audio.attach(&bundle);
            self.assets = Some(bundle);

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                set_hidden(&document, "loading", true);
                set_hidden(&document, "hud", false);
            }
            log::info!("Cosmic Ride running!");
        }

        /// Render the current frame
        fn render(&mut self) {
            let sprites = match &self.assets {
                Some(assets) => scene::build(self.game.world(), assets),
                None => scene::build_loading(self.game.world().size, self.loader.borrow().progress()),
            };
            match self.render_state.render(&sprites, colors::BACKGROUND) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let text = self.game.hud_text();
            if text != self.hud_text {
                if let Some(el) = document.get_element_by_id("hud-coins") {
                    el.set_text_content(Some(&text));
                }
                self.hud_text = text;
            }

            let phase = self.game.world().phase;
            if self.hud_phase != Some(phase) {
                set_hidden(&document, "game-over", phase != GamePhase::GameOver);
                self.hud_phase = Some(phase);
            }
        }

        fn resize(&mut self) {
            let (css_w, css_h, width, height) = fit_canvas(&self.canvas);
            self.render_state.resize(width, height);
            self.render_state.set_logical_size(css_w, css_h);
            self.game.resize(css_w, css_h);
        }

        /// Push the current settings and focus state to the audio output
        fn refresh_mixer(&mut self) {
            let mut mixer = Mixer::from_settings(self.game.settings());
            mixer.set_blurred(self.blurred);
            self.audio.set_mixer(mixer);
        }

        fn set_blurred(&mut self, blurred: bool) {
            let blurred = blurred && self.game.settings().mute_on_blur;
            if blurred != self.blurred {
                self.blurred = blurred;
                self.refresh_mixer();
            }
        }
    }

    fn set_hidden(document: &web_sys::Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Size the canvas backing store to its CSS box times the device pixel
    /// ratio. Returns the CSS size and the pixel size.
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32, u32, u32) {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (client_w as f32, client_h as f32, width, height)
    }

    /// Touch position relative to the canvas
    fn touch_x(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<f32> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(touch.client_x() as f32 - rect.left() as f32)
    }

    /// Fetch and decode every manifest entry in the background
    fn start_loading(loader: &Rc<RefCell<Loader>>, ctx: Option<AudioContext>) {
        for asset in ImageAsset::all() {
            let loader = loader.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let path = asset.path();
                let result = match assets::web::fetch_bytes(path).await {
                    Ok(bytes) => assets::decode_image(path, &bytes),
                    Err(e) => Err(e),
                };
                loader.borrow_mut().resolve_image(asset, result);
            });
        }

        for asset in SoundAsset::ALL {
            let loader = loader.clone();
            let ctx = ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let path = asset.path();
                let result = match ctx {
                    Some(ctx) => match assets::web::fetch_array_buffer(path).await {
                        Ok(data) => audio::decode(&ctx, path, &data).await,
                        Err(e) => Err(e),
                    },
                    None => Err(AssetError::Decode {
                        path: path.to_string(),
                        reason: "no audio context".to_string(),
                    }),
                };
                loader.borrow_mut().resolve_sound(asset, result);
            });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Cosmic Ride starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document");
            return;
        };
        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .map(|el| el.dyn_into::<HtmlCanvasElement>())
        {
            Some(Ok(canvas)) => canvas,
            _ => {
                log::error!("No canvas element with id 'canvas'");
                return;
            }
        };

        let (css_w, css_h, width, height) = fit_canvas(&canvas);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(seed, css_w, css_h, LocalStorage::new());
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut render_state = match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => render_state,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                return;
            }
        };
        render_state.set_logical_size(css_w, css_h);

        let audio = AudioManager::new(Mixer::from_settings(game.settings()));
        let loader = Rc::new(RefCell::new(Loader::new()));
        start_loading(&loader, audio.context());

        let app = Rc::new(RefCell::new(App {
            game,
            render_state,
            audio,
            canvas: canvas.clone(),
            loader,
            assets: None,
            last_time: 0.0,
            blurred: false,
            hud_text: String::new(),
            hud_phase: None,
        }));

        setup_input_handlers(&canvas, app.clone());
        setup_keyboard(app.clone());
        setup_resize(app.clone());
        setup_focus_handlers(app.clone());

        // Start game loop (draws the loading bar until assets are in)
        request_animation_frame(app);

        log::info!("Loading assets...");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse down - take control, or restart after game over
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                if a.loaded() {
                    a.game.pointer_down(event.offset_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if a.loaded() {
                    a.game.pointer_move(event.offset_x() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up / leave
        for name in ["mouseup", "mouseleave"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().game.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.audio.resume();
                if let (true, Some(x)) = (a.loaded(), touch_x(&canvas_clone, &event)) {
                    a.game.pointer_down(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                if let (true, Some(x)) = (a.loaded(), touch_x(&canvas_clone, &event)) {
                    a.game.pointer_move(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end / cancel
        for name in ["touchend", "touchcancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                app.borrow_mut().game.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut a = app.borrow_mut();
            match event.key().as_str() {
                "i" | "I" => {
                    a.game.toggle_autopilot();
                }
                "m" | "M" => {
                    a.game.toggle_mute();
                    a.refresh_mixer();
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Silence audio while the page is hidden or unfocused, if enabled
    fn setup_focus_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                app.borrow_mut().set_blurred(hidden);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur / focus
        for (name, blurred) in [("blur", true), ("focus", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().set_blurred(blurred);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            if a.loaded() {
                a.update_hud();
            }
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    log::info!("Cosmic Ride (native) starting...");
    log::info!("Rendering needs a browser - build for wasm32 to play");

    run_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Let the autopilot play a few minutes of simulated time headlessly
#[cfg(not(target_arch = "wasm32"))]
fn run_demo() {
    use cosmic_ride::Game;
    use cosmic_ride::consts::SIM_DT;
    use cosmic_ride::platform::MemoryStore;
    use cosmic_ride::sim::GameEvent;

    const DEMO_SECONDS: f32 = 180.0;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut game = Game::new(seed, 1280.0, 720.0, MemoryStore::new());
    game.toggle_autopilot();

    let frames = (DEMO_SECONDS / SIM_DT) as u32;
    let mut sessions = 0;
    let mut coins = 0;
    for _ in 0..frames {
        for event in game.frame(SIM_DT).events {
            match event {
                GameEvent::CoinCollected { .. } => coins += 1,
                GameEvent::GameOver { coins: session_coins } => {
                    sessions += 1;
                    log::info!("Session {} over with {} coins", sessions, session_coins);
                }
                _ => {}
            }
        }
    }

    println!(
        "Autopilot: {} coins over {} finished sessions in {}s (seed {}). {}",
        coins,
        sessions,
        DEMO_SECONDS,
        seed,
        game.hud_text()
    );
}
