//! Tank Arena entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent,
    };

    use tank_arena::renderer::{Frame, Label, RenderState, TextAlign};
    use tank_arena::{HudField, HudSink, Session, Settings};

    /// HUD elements looked up once at startup
    struct DomHud {
        elements: HashMap<HudField, Element>,
    }

    impl DomHud {
        fn bind(document: &Document) -> Self {
            let mut elements = HashMap::new();
            for field in HudField::ALL {
                match document.get_element_by_id(field.element_id()) {
                    Some(el) => {
                        elements.insert(field, el);
                    }
                    None => log::debug!("HUD element #{} not found", field.element_id()),
                }
            }
            Self { elements }
        }
    }

    impl HudSink for DomHud {
        fn set_text(&mut self, field: HudField, text: &str) {
            if let Some(el) = self.elements.get(&field) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Everything the shell touches in the page, resolved once
    struct ViewBindings {
        canvas: HtmlCanvasElement,
        label_canvas: Option<HtmlCanvasElement>,
        labels: Option<CanvasRenderingContext2d>,
        /// Wrapper holding both canvases; moved between containers
        stage: Option<Element>,
        page_container: Option<Element>,
        fullscreen_container: Option<Element>,
        hud: DomHud,
    }

    impl ViewBindings {
        fn bind(document: &Document, canvas: HtmlCanvasElement) -> Self {
            let label_canvas: Option<HtmlCanvasElement> = document
                .get_element_by_id("label-canvas")
                .and_then(|el| el.dyn_into().ok());
            let labels = label_canvas
                .as_ref()
                .and_then(|c| c.get_context("2d").ok().flatten())
                .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            if labels.is_none() {
                log::warn!("No label canvas, text overlays disabled");
            }

            Self {
                canvas,
                label_canvas,
                labels,
                stage: document.get_element_by_id("game-stage"),
                page_container: document.get_element_by_id("game-container"),
                fullscreen_container: document.get_element_by_id("fullscreen-container"),
                hud: DomHud::bind(document),
            }
        }

        /// Match the backing stores to the displayed size.
        /// Returns (CSS size, device pixel size).
        fn fit(&self, dpr: f64) -> (Vec2, (u32, u32)) {
            let css_w = self.canvas.client_width().max(1);
            let css_h = self.canvas.client_height().max(1);
            let width = (css_w as f64 * dpr) as u32;
            let height = (css_h as f64 * dpr) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref labels) = self.label_canvas {
                labels.set_width(width);
                labels.set_height(height);
            }
            (Vec2::new(css_w as f32, css_h as f32), (width, height))
        }

        fn move_stage(&self, fullscreen: bool) {
            let (Some(stage), Some(page), Some(full)) =
                (&self.stage, &self.page_container, &self.fullscreen_container)
            else {
                log::warn!("Fullscreen containers missing");
                return;
            };
            let target = if fullscreen { full } else { page };
            if let Err(e) = target.append_child(stage) {
                log::warn!("Failed to move stage: {:?}", e);
            }
            let _ = full.class_list().toggle_with_force("active", fullscreen);
        }
    }

    /// Game instance holding the session and presentation state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        view: ViewBindings,
        dpr: f64,
        /// Handle of the pending animation frame
        raf_handle: Option<i32>,
    }

    impl Game {
        fn present(&mut self, frame: &Frame) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame.vertices, frame.viewport) {
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
            if let Some(ref ctx) = self.view.labels {
                draw_labels(ctx, &frame.labels, frame.viewport, self.dpr);
            }
        }

        /// Draw the current state without advancing it
        fn redraw(&mut self) {
            let frame = self.session.render();
            self.present(&frame);
            self.session.write_hud(&mut self.view.hud);
        }

        fn resize(&mut self) {
            if let Some(window) = web_sys::window() {
                self.dpr = window.device_pixel_ratio();
            }
            let (css, (width, height)) = self.view.fit(self.dpr);
            self.session.resize(css.x, css.y);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }
    }

    fn css_color(c: [f32; 4]) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({}, {}, {}, {:.3})", byte(c[0]), byte(c[1]), byte(c[2]), c[3])
    }

    fn draw_labels(ctx: &CanvasRenderingContext2d, labels: &[Label], viewport: Vec2, dpr: f64) {
        let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, viewport.x as f64, viewport.y as f64);
        ctx.set_text_baseline("middle");
        for label in labels {
            ctx.set_font(&format!("bold {}px sans-serif", label.size.round()));
            ctx.set_text_align(match label.align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
                TextAlign::Right => "right",
            });
            ctx.set_fill_style_str(&css_color(label.color));
            let _ = ctx.fill_text(&label.text, label.pos.x as f64, label.pos.y as f64);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Tank Arena starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element, nothing to run");
            return;
        };

        let settings = Settings::from_json_or_default(canvas.get_attribute("data-settings").as_deref());
        let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);

        let view = ViewBindings::bind(&document, canvas.clone());
        let dpr = window.device_pixel_ratio();
        let (css, (width, height)) = view.fit(dpr);

        let mut session = Session::new(seed, settings);
        session.resize(css.x, css.y);
        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: None,
            view,
            dpr,
            raf_handle: None,
        }));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {:?}", e);
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
                log::error!("Failed to get adapter: {:?}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("Failed to create device: {:?}", e);
                return;
            }
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_visibility(&document, game.clone());
        setup_resize(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Title screen; the loop starts with the game
        game.borrow_mut().redraw();

        log::info!("Tank Arena ready (seed {})", seed);
    }

    /// After a control changes the phase: keep the loop alive while running,
    /// otherwise draw the overlay once
    fn refresh(game: &Rc<RefCell<Game>>) {
        let running = game.borrow().session.should_rearm();
        if running {
            schedule(game);
        } else {
            game.borrow_mut().redraw();
        }
    }

    fn schedule(game: &Rc<RefCell<Game>>) {
        if game.borrow_mut().session.arm() {
            request_animation_frame(game);
        }
    }

    fn request_animation_frame(game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let game_clone = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game_clone, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().raf_handle = Some(handle),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                game.borrow_mut().session.suspend();
            }
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.raf_handle = None;
            let frame = g.session.frame(time);
            g.present(&frame);
            let Game { session, view, .. } = &mut *g;
            session.write_hud(&mut view.hud);
        }

        schedule(&game);
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().session.mouse_move(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down (fire)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() != 0 {
                    return;
                }
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().session.mouse_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere ends auto-fire
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.mouse_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let consumed = game.borrow_mut().session.key_down(
                    &event.key(),
                    event.ctrl_key(),
                    event.shift_key(),
                );
                if consumed {
                    event.prevent_default();
                    refresh(&game);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().session.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: held keys would otherwise stick
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().session.release_inputs();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Game)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::debug!("Button #{} not found", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            action(&mut game.borrow_mut());
            refresh(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        on_click(document, "start-btn", game.clone(), |g| {
            g.session.start_game();
        });
        on_click(document, "restart-btn", game.clone(), |g| g.session.reset_game());
        on_click(document, "pause-btn", game.clone(), |g| {
            g.session.toggle_pause();
        });
        on_click(document, "fullscreen-btn", game, |g| {
            let fullscreen = g.session.toggle_fullscreen();
            g.view.move_stage(fullscreen);
            g.resize();
        });
    }

    fn setup_visibility(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if let (Some(handle), Some(window)) = (g.raf_handle.take(), web_sys::window()) {
                    let _ = window.cancel_animation_frame(handle);
                }
                g.session.suspend();
                log::info!("Loop suspended (tab hidden)");
            } else {
                let resume = game.borrow_mut().session.resume();
                if resume {
                    request_animation_frame(&game);
                    log::info!("Loop resumed");
                }
            }
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
            refresh(&game);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
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
    log::info!("Tank Arena (native) starting...");
    log::info!("Native mode runs a headless autopilot - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    autopilot(seed, 120.0);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play up to `seconds` of game time: hold the mouse on the nearest enemy
/// and strafe between compass directions
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(seed: u64, seconds: f64) {
    use std::collections::HashMap;
    use tank_arena::consts::FRAME_MS;
    use tank_arena::{HudField, Session, Settings};

    let mut session = Session::new(seed, Settings::default());
    session.resize(1280.0, 720.0);
    session.start_game();

    let mut hud: HashMap<HudField, String> = HashMap::new();
    let directions = ["w", "d", "s", "a"];
    let mut held = directions[0];
    session.key_down(held, false, false);

    let frames = (seconds * 1000.0 / FRAME_MS as f64) as usize;
    let mut t = 0.0;
    for frame in 0..frames {
        if frame % 180 == 0 {
            session.key_up(held);
            held = directions[(frame / 180) % directions.len()];
            session.key_down(held, false, false);
        }

        let player = session.state.player.pos;
        let nearest = session
            .state
            .enemies
            .iter()
            .min_by(|a, b| a.pos.distance(player).total_cmp(&b.pos.distance(player)))
            .map(|e| e.pos);
        match nearest {
            Some(target) => {
                let screen = session.state.camera.world_to_screen(target);
                session.mouse_down(screen);
            }
            None => session.mouse_up(),
        }

        session.frame(t);
        t += FRAME_MS as f64;
        if !session.should_rearm() {
            break;
        }
    }

    session.write_hud(&mut hud);
    println!("\nAutopilot finished (seed {})", seed);
    for field in HudField::ALL {
        println!("  {:<14} {}", field.label(), hud.get(&field).map_or("-", String::as_str));
    }
}
