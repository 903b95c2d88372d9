//! Mood Slicer entry point
//!
//! In the browser this wires DOM input, the camera and WebGPU to a `Session`.
//! Natively it runs a scripted headless session and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::{Clamped, JsCast};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CanvasRenderingContext2d, DomException, HtmlCanvasElement, HtmlInputElement,
        HtmlVideoElement, MediaStream, MediaStreamConstraints, MouseEvent, TouchEvent,
    };

    use mood_slicer::audio::{AudioManager, SoundEffect};
    use mood_slicer::consts::*;
    use mood_slicer::content::{expand_prompt, level_from_prompt};
    use mood_slicer::renderer::{Presenter, RenderState, ShapeBatch, TextAlign, TextCommand};
    use mood_slicer::screen_to_field;
    use mood_slicer::settings::QualityPreset;
    use mood_slicer::sim::level::{CustomItem, Language, LevelDescriptor, Mood};
    use mood_slicer::sim::motion::{Frame, InputError, InputMode, sample_resolution};
    use mood_slicer::sim::state::{GameEvent, StatsSnapshot};
    use mood_slicer::{FrameInput, Session, SessionConfig, Settings};

    /// Hidden video element plus a tiny canvas used to read its pixels
    struct CameraFeed {
        video: HtmlVideoElement,
        scratch: CanvasRenderingContext2d,
    }

    impl CameraFeed {
        /// Grab the current video frame at sampler resolution, mirrored
        fn capture(&self) -> Option<Frame> {
            // HAVE_CURRENT_DATA
            if self.video.ready_state() < 2 {
                return None;
            }
            let (w, h) = sample_resolution();
            self.scratch
                .draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, w as f64, h as f64)
                .ok()?;
            let image = self.scratch.get_image_data(0.0, 0.0, w as f64, h as f64).ok()?;
            let Clamped(rgba) = image.data();
            match Frame::downsample_mirrored(w, h, &rgba) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    log::warn!("Dropping camera frame: {}", e);
                    None
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Option<Session>,
        presenter: Presenter,
        batch: ShapeBatch,
        render_state: Option<RenderState>,
        text_ctx: Option<CanvasRenderingContext2d>,
        settings: Settings,
        audio: AudioManager,
        camera: Option<CameraFeed>,
        /// Set once acquisition failed; sessions inherit it
        camera_error: Option<InputError>,
        camera_requested: bool,
        last_time: f64,
        /// Canvas CSS size, for pointer mapping
        display: Vec2,
        was_over: bool,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let mut audio = AudioManager::new();
            audio.set_volumes(settings.master_volume, settings.sfx_volume, settings.music_volume);
            audio.set_muted(!settings.audio_enabled());
            Self {
                session: None,
                presenter: presenter_for(&settings),
                batch: ShapeBatch::new(),
                render_state: None,
                text_ctx: None,
                settings,
                audio,
                camera: None,
                camera_error: None,
                camera_requested: false,
                last_time: 0.0,
                display: Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
                was_over: false,
            }
        }

        fn start_session(&mut self, level: LevelDescriptor, items: Vec<CustomItem>) {
            let seed = js_sys::Date::now() as u64;
            let config = SessionConfig::new(level, items)
                .with_settings(&self.settings)
                .with_seed(seed);
            let mut session = Session::start(config);
            if let Some(err) = &self.camera_error {
                session.camera_failed(err.clone());
            }
            self.session = Some(session);
            self.was_over = false;
            self.audio.resume();
            show(&["hud"]);
            hide(&["menu", "game-over"]);
        }

        /// Persist a settings change and push it into the live subsystems.
        /// The session picks the rest up on its next start.
        fn settings_changed(&mut self) {
            self.settings.save();
            self.presenter = presenter_for(&self.settings);
            self.audio.set_muted(!self.settings.audio_enabled());
            show_settings(&self.settings);
        }

        fn back_to_menu(&mut self) {
            if let Some(mut session) = self.session.take() {
                session.end();
            }
            show(&["menu"]);
            hide(&["hud", "game-over"]);
        }

        fn pointer_moved(&mut self, screen: Vec2) {
            if let Some(session) = &mut self.session {
                session.pointer_moved(screen_to_field(screen, self.display));
            }
        }

        /// Run one display frame
        fn update(&mut self, frame_ms: f64) {
            let Some(session) = &mut self.session else {
                return;
            };

            let camera_frame = self.camera.as_ref().and_then(CameraFeed::capture);
            let events = session.tick(FrameInput {
                frame_ms,
                camera_frame,
            });
            self.presenter.observe(&events);

            for event in &events {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
                if let GameEvent::StatsUpdated(stats) = event {
                    dispatch_stats(stats);
                }
            }
            if session.due_kick().is_some() {
                self.audio.kick(session.beat_clock().theme());
            }

            if session.is_over() && !self.was_over {
                self.was_over = true;
                show_game_over(&session.run().snapshot());
            }
        }

        fn render(&mut self) {
            let Some(session) = &self.session else {
                return;
            };
            self.presenter.draw(&session.view(), &mut self.batch);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.batch) {
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
            if let Some(ctx) = &self.text_ctx {
                draw_texts(ctx, &self.batch.texts);
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(session) = &self.session else {
                return;
            };
            let run = session.run();
            set_text("#hud-score .hud-value", &run.score.to_string());
            set_text("#hud-combo .hud-value", &run.combo.to_string());
            set_text("#hud-energy .hud-value", &(run.energy.floor() as u64).to_string());
        }
    }

    fn presenter_for(settings: &Settings) -> Presenter {
        let detail = if settings.quality.background_detail() { 40 } else { 0 };
        Presenter::new(settings.effective_screen_shake(), detail)
    }

    fn show_settings(settings: &Settings) {
        set_text("#quality-value", settings.quality.as_str());
        set_text("#sensitivity-value", &settings.sensitivity.to_string());
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_text(selector: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.query_selector(selector).ok().flatten()) {
            el.set_text_content(Some(text));
        }
    }

    fn show(ids: &[&str]) {
        set_class(ids, "");
    }

    fn hide(ids: &[&str]) {
        set_class(ids, "hidden");
    }

    fn set_class(ids: &[&str], class: &str) {
        let Some(document) = document() else {
            return;
        };
        for id in ids {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", class);
            }
        }
    }

    fn show_game_over(stats: &StatsSnapshot) {
        set_text("#final-score", &stats.score.to_string());
        set_text("#final-combo", &stats.max_combo.to_string());
        set_text("#final-vent", &stats.vent_value.to_string());
        show(&["game-over"]);
    }

    /// Forward a stats snapshot to the page as a `mood-stats` CustomEvent
    fn dispatch_stats(stats: &StatsSnapshot) {
        let Ok(json) = serde_json::to_string(stats) else {
            return;
        };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&JsValue::from_str(&json));
        if let (Some(window), Ok(event)) = (
            web_sys::window(),
            web_sys::CustomEvent::new_with_event_init_dict("mood-stats", &init),
        ) {
            let _ = window.dispatch_event(&event);
        }
    }

    fn css_color(color: [f32; 4]) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
        format!(
            "rgba({}, {}, {}, {:.3})",
            byte(color[0]),
            byte(color[1]),
            byte(color[2]),
            color[3].clamp(0.0, 1.0)
        )
    }

    /// Draw the batch's text layer; the context is already scaled to field units
    fn draw_texts(ctx: &CanvasRenderingContext2d, texts: &[TextCommand]) {
        ctx.clear_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
        ctx.set_text_baseline("middle");
        for text in texts {
            ctx.save();
            let _ = ctx.translate(text.pos.x as f64, text.pos.y as f64);
            if text.rotation != 0.0 {
                let _ = ctx.rotate(text.rotation as f64);
            }
            let weight = if text.bold { "bold " } else { "" };
            ctx.set_font(&format!("{}{}px sans-serif", weight, text.size.round()));
            ctx.set_text_align(match text.align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
                TextAlign::Right => "right",
            });
            ctx.set_fill_style_str(&css_color(text.color));
            let _ = ctx.fill_text(&text.text, 0.0, 0.0);
            ctx.restore();
        }
    }

    fn input_error_from(value: &JsValue) -> InputError {
        match value.dyn_ref::<DomException>().map(|e| e.name()) {
            Some(name) if name == "NotAllowedError" || name == "PermissionDeniedError" => {
                InputError::PermissionDenied
            }
            Some(name) if name == "NotFoundError" || name == "DevicesNotFoundError" => InputError::NoDevice,
            Some(name) => InputError::Acquisition(name),
            None => InputError::Acquisition(format!("{:?}", value)),
        }
    }

    async fn acquire_camera() -> Result<CameraFeed, InputError> {
        let window = web_sys::window().ok_or(InputError::NoDevice)?;
        let document = window.document().ok_or(InputError::NoDevice)?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| input_error_from(&e))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&JsValue::TRUE);
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| input_error_from(&e))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|e| input_error_from(&e))?
            .dyn_into()
            .map_err(|e| input_error_from(&e))?;

        let video: HtmlVideoElement = document
            .create_element("video")
            .map_err(|e| input_error_from(&e))?
            .dyn_into()
            .map_err(|e| input_error_from(&e))?;
        video.set_muted(true);
        let _ = video.set_attribute("playsinline", "");
        video.set_src_object(Some(&stream));
        if let Ok(play) = video.play() {
            JsFuture::from(play).await.map_err(|e| input_error_from(&e))?;
        }

        let (w, h) = sample_resolution();
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| input_error_from(&e))?
            .dyn_into()
            .map_err(|e| input_error_from(&e))?;
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        let scratch: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| input_error_from(&e))?
            .ok_or_else(|| InputError::Acquisition("no 2d context".into()))?
            .dyn_into()
            .map_err(|e| input_error_from(&e))?;

        Ok(CameraFeed { video, scratch })
    }

    /// Request the camera once; the outcome sticks for the page's lifetime
    fn ensure_camera(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.settings.input_mode != InputMode::Camera || g.camera_requested {
                return;
            }
            g.camera_requested = true;
        }
        wasm_bindgen_futures::spawn_local(async move {
            let result = acquire_camera().await;
            let mut g = game.borrow_mut();
            match result {
                Ok(feed) => {
                    log::info!("Camera acquired");
                    g.camera = Some(feed);
                }
                Err(err) => {
                    log::warn!("Camera unavailable: {}", err);
                    if let Some(session) = &mut g.session {
                        session.camera_failed(err.clone());
                    }
                    g.camera_error = Some(err);
                }
            }
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Mood Slicer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(settings)));
        game.borrow_mut().display = Vec2::new(client_w as f32, client_h as f32);

        // Text overlay, scaled so it draws in field units
        if let Some(text_canvas) = document
            .get_element_by_id("text-canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            text_canvas.set_width(width);
            text_canvas.set_height(height);
            if let Ok(Some(ctx)) = text_canvas.get_context("2d")
                && let Ok(ctx) = ctx.dyn_into::<CanvasRenderingContext2d>()
            {
                let _ = ctx.set_transform(
                    width as f64 / FIELD_WIDTH as f64,
                    0.0,
                    0.0,
                    height as f64 / FIELD_HEIGHT as f64,
                    0.0,
                    0.0,
                );
                game.borrow_mut().text_ctx = Some(ctx);
            }
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_menu(game.clone());
        setup_settings(game.clone());
        ensure_camera(game.clone());

        show(&["menu"]);
        request_animation_frame(game);

        log::info!("Mood Slicer running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .pointer_moved(Vec2::new(event.offset_x() as f32, event.offset_y() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/move
        for kind in ["touchstart", "touchmove"] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    game.borrow_mut().pointer_moved(Vec2::new(x, y));
                }
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Canvas resize tracking for pointer mapping
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.display = Vec2::new(canvas_clone.client_width() as f32, canvas_clone.client_height() as f32);
            });
            if let Some(window) = web_sys::window() {
                let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Escape" {
                    game.borrow_mut().back_to_menu();
                }
            });
            if let Some(window) = web_sys::window() {
                let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id(id)) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Calls `handler` with the element's value whenever it changes
    fn on_change(id: &str, mut handler: impl FnMut(String) + 'static) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let value = event
                .target()
                .and_then(|t| js_sys::Reflect::get(&t, &JsValue::from_str("value")).ok())
                .and_then(|v| v.as_string());
            if let Some(value) = value {
                handler(value);
            }
        });
        let _ = el.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_settings(game: Rc<RefCell<Game>>) {
        show_settings(&game.borrow().settings);

        {
            let game = game.clone();
            on_change("quality-select", move |value| {
                let Some(quality) = QualityPreset::from_str(&value) else {
                    log::warn!("Unknown quality preset '{}'", value);
                    return;
                };
                let mut g = game.borrow_mut();
                g.settings.quality = quality;
                g.settings_changed();
            });
        }

        {
            let game = game.clone();
            on_change("sensitivity-input", move |value| {
                let Ok(sensitivity) = value.trim().parse::<u32>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                g.settings.set_sensitivity(sensitivity);
                g.settings_changed();
            });
        }

        on_change("language-select", move |value| {
            let Some(language) = Language::from_str(&value) else {
                log::warn!("Unknown language '{}'", value);
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.language = language;
            g.settings_changed();
        });
    }

    fn setup_menu(game: Rc<RefCell<Game>>) {
        for (id, mood, key) in [
            ("mood-angry", Mood::Angry, "angry"),
            ("mood-sad", Mood::Sad, "sad"),
            ("mood-happy", Mood::Happy, "happy"),
        ] {
            let game = game.clone();
            on_click(id, move || {
                let level = LevelDescriptor::preset(mood);
                let items = level.default_custom_items(key);
                log::info!("Level chosen: {}", level.label);
                game.borrow_mut().start_session(level, items);
            });
        }

        // Free-text mood prompt
        {
            let game = game.clone();
            on_click("prompt-btn", move || {
                let prompt = document()
                    .and_then(|d| d.get_element_by_id("prompt-input"))
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                if prompt.trim().is_empty() {
                    return;
                }
                let mut g = game.borrow_mut();
                let level = level_from_prompt(&prompt, g.settings.language);
                let items = expand_prompt(&prompt);
                log::info!("Level from prompt: {} ({} items)", level.label, items.len());
                g.start_session(level, items);
            });
        }

        {
            let game = game.clone();
            on_click("restart-btn", move || {
                let mut g = game.borrow_mut();
                if let Some(session) = &mut g.session {
                    session.reset();
                }
                g.was_over = false;
                hide(&["game-over"]);
            });
        }

        on_click("menu-btn", move || game.borrow_mut().back_to_menu());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Tab switches produce huge gaps; never let one frame cover them
            let frame_ms = if g.last_time > 0.0 {
                (time - g.last_time).clamp(0.0, 100.0)
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(frame_ms);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
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
    log::info!("Mood Slicer (native) starting...");
    log::info!("Native mode runs a headless demo - use `trunk serve` for the web version");

    let summary = run_demo(0xC0FFEE, 60 * 60);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted session: a pointer sweeping a figure-eight across the field
#[cfg(not(target_arch = "wasm32"))]
fn run_demo(seed: u64, frames: u32) -> mood_slicer::sim::state::StatsSnapshot {
    use glam::Vec2;
    use mood_slicer::consts::*;
    use mood_slicer::renderer::{Presenter, ShapeBatch};
    use mood_slicer::sim::level::{LevelDescriptor, Mood};
    use mood_slicer::sim::state::GameEvent;
    use mood_slicer::{FrameInput, Session, SessionConfig, Settings};

    let settings = Settings::load();
    let level = LevelDescriptor::preset(Mood::Angry);
    let items = level.default_custom_items("angry");
    let config = SessionConfig::new(level, items)
        .with_settings(&settings)
        .with_seed(seed);
    let mut session = Session::start(config);
    let mut presenter = Presenter::new(settings.effective_screen_shake(), 0);
    let mut batch = ShapeBatch::new();

    for frame in 0..frames {
        let t = frame as f32 * 0.05;
        let pointer = Vec2::new(
            FIELD_WIDTH / 2.0 + t.sin() * FIELD_WIDTH * 0.4,
            FIELD_HEIGHT / 2.0 + (t * 2.0).sin() * FIELD_HEIGHT * 0.25,
        );
        session.pointer_moved(pointer);

        let events = session.tick(FrameInput::new(FRAME_MS));
        presenter.observe(&events);
        presenter.draw(&session.view(), &mut batch);

        for event in &events {
            match event {
                GameEvent::StatsUpdated(stats) => {
                    log::debug!("frame {}: score {} combo max {}", frame, stats.score, stats.max_combo)
                }
                GameEvent::RunTerminated => log::info!("Run over at frame {}", frame),
                _ => {}
            }
        }
        if session.is_over() {
            break;
        }
    }

    session.end();
    session.run().snapshot()
}
