pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod mold;
pub mod preview;
mod renderer;
pub mod storage;
pub mod wizard;

use eframe::egui;
use std::{
    future::Future,
    sync::{Arc, Mutex},
};

use api::{ApiClient, Health, PromptTemplates};
use config::Settings;
use error::ApiError;
use media::{ImageUpload, PickedFile};
use mold::MoldParams;
use preview::{Camera, PreviewModel, View};
use wizard::{Applied, JobOutcome, Source, Stage, StageStatus, Step, Wizard};

/// Results of background tasks, drained by the UI once per frame.
pub type Mailbox<T> = Arc<Mutex<Vec<T>>>;

pub fn post<T>(mailbox: &Mailbox<T>, value: T) {
    match mailbox.lock() {
        Ok(mut queue) => queue.push(value),
        Err(poisoned) => poisoned.into_inner().push(value),
    }
}

pub fn drain<T>(mailbox: &Mailbox<T>) -> Vec<T> {
    match mailbox.lock() {
        Ok(mut queue) => std::mem::take(&mut *queue),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
}

const THUMBNAIL_EDGE: u32 = 512;
const GRID_SPACING_MM: f32 = 10.0;
const ERROR_COLOUR: egui::Color32 = egui::Color32::from_rgb(230, 90, 80);
const WARN_COLOUR: egui::Color32 = egui::Color32::from_rgb(235, 180, 60);
const OK_COLOUR: egui::Color32 = egui::Color32::from_rgb(110, 200, 120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceTab {
    Upload,
    Prompt,
}

#[derive(Debug, Clone, PartialEq)]
enum BackendStatus {
    Checking,
    Healthy,
    Unreachable(String),
}

#[derive(Default)]
struct Thumbnails {
    upload: Option<egui::TextureHandle>,
    subject: Option<egui::TextureHandle>,
    depth_map: Option<egui::TextureHandle>,
}

#[derive(Default)]
struct Mailboxes {
    picked: Mailbox<PickedFile>,
    outcomes: Mailbox<JobOutcome>,
    health: Mailbox<Result<Health, ApiError>>,
    templates: Mailbox<Result<PromptTemplates, ApiError>>,
}

pub struct CandlrApp {
    settings: Settings,
    client: ApiClient,
    /// Text field contents for the backend address.
    api_base_edit: String,
    backend: BackendStatus,
    templates: Option<PromptTemplates>,

    wizard: Wizard,
    tab: SourceTab,
    prompt_text: String,
    upload: Option<ImageUpload>,
    params: MoldParams,
    /// Last user-facing problem that is not a stage failure.
    notice: Option<String>,

    mail: Mailboxes,
    thumbs: Thumbnails,

    preview: Option<PreviewModel>,
    camera: Camera,
    grid: bool,
    gpu: Option<Arc<renderer::GpuLines>>,
    gpu_failed: bool,
    /// Vertex buffer needs re-uploading (model or grid changed).
    gpu_dirty: bool,
    vertex_storage: Vec<f32>,
}

impl CandlrApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let params = storage::load_json::<MoldParams>(mold::STORAGE_KEY)
            .map(MoldParams::clamped)
            .unwrap_or_default();
        log::info!("backend at {:?}", settings.api_base);

        let app = Self {
            client: ApiClient::new(settings.api_base.clone()),
            api_base_edit: settings.api_base.clone(),
            settings,
            backend: BackendStatus::Checking,
            templates: None,
            wizard: Wizard::new(),
            tab: SourceTab::Upload,
            prompt_text: String::new(),
            upload: None,
            params,
            notice: None,
            mail: Mailboxes::default(),
            thumbs: Thumbnails::default(),
            preview: None,
            camera: Camera::default(),
            grid: true,
            gpu: None,
            gpu_failed: false,
            gpu_dirty: false,
            vertex_storage: Vec::new(),
        };
        app.probe_backend(&cc.egui_ctx);
        app
    }

    /// Health check and prompt templates; both are informative only.
    fn probe_backend(&self, ctx: &egui::Context) {
        let client = self.client.clone();
        let health = Arc::clone(&self.mail.health);
        let templates = Arc::clone(&self.mail.templates);
        let ctx = ctx.clone();
        execute(async move {
            post(&health, client.health().await);
            ctx.request_repaint();
            post(&templates, client.prompts().await);
            ctx.request_repaint();
        });
    }

    fn apply_api_base(&mut self, ctx: &egui::Context) {
        let base = self.api_base_edit.trim().to_owned();
        if base.is_empty() {
            storage::remove(config::API_BASE_KEY);
            self.settings.api_base = Settings::load().api_base;
        } else {
            storage::save_string(config::API_BASE_KEY, &base);
            self.settings.api_base = config::resolve_api_base(Some(&base), None, None);
        }
        self.api_base_edit = self.settings.api_base.clone();
        self.client = ApiClient::new(self.settings.api_base.clone());
        self.backend = BackendStatus::Checking;
        self.templates = None;
        log::info!("backend changed to {:?}", self.settings.api_base);
        self.probe_backend(ctx);
    }

    // ------------------------------------------------------------------
    // Background results
    // ------------------------------------------------------------------

    fn poll_mail(&mut self, ctx: &egui::Context) {
        for picked in drain(&self.mail.picked) {
            match ImageUpload::from_file(&picked.name, picked.bytes) {
                Ok(upload) => {
                    self.thumbs.upload = load_thumbnail(ctx, "upload", &upload.bytes);
                    self.upload = Some(upload);
                    self.notice = None;
                }
                Err(e) => {
                    log::warn!("rejected upload: {e:#}");
                    self.notice = Some(format!("{e:#}"));
                }
            }
        }

        for result in drain(&self.mail.health) {
            self.backend = match result {
                Ok(h) if h.is_healthy() => BackendStatus::Healthy,
                Ok(h) => BackendStatus::Unreachable(format!("status {:?}", h.status)),
                Err(e) => BackendStatus::Unreachable(e.to_string()),
            };
        }

        for result in drain(&self.mail.templates) {
            match result {
                Ok(templates) => self.templates = Some(templates),
                Err(e) => log::warn!("prompt templates unavailable: {e}"),
            }
        }

        for outcome in drain(&self.mail.outcomes) {
            if let Applied::Completed(stage) = self.wizard.apply(outcome) {
                self.on_stage_completed(ctx, stage);
            }
        }

        // anything the wizard dropped (back / reset / restart) goes too
        if self.wizard.subject().is_none() {
            self.thumbs.subject = None;
        }
        if self.wizard.depth_map().is_none() {
            self.thumbs.depth_map = None;
        }
        if self.wizard.mold().is_none() && self.preview.is_some() {
            self.preview = None;
            self.gpu_dirty = true;
        }
    }

    fn on_stage_completed(&mut self, ctx: &egui::Context, stage: Stage) {
        match stage {
            Stage::ExtractSubject | Stage::GenerateImage => {
                self.thumbs.subject = self
                    .wizard
                    .subject()
                    .and_then(|out| decode_stage_image(ctx, "subject", &out.image_base64));
            }
            Stage::CreateDepthMap => {
                self.thumbs.depth_map = self
                    .wizard
                    .depth_map()
                    .and_then(|out| decode_stage_image(ctx, "depth_map", &out.image_base64));
            }
            Stage::GenerateMold => {
                let Some(file) = self.wizard.mold() else { return };
                match PreviewModel::from_stl(&file.bytes) {
                    Ok(model) => {
                        log::info!(
                            "preview: {} triangles, {:.1} x {:.1} x {:.1} mm",
                            model.triangles(),
                            model.bounds().size().x,
                            model.bounds().size().y,
                            model.bounds().size().z
                        );
                        self.preview = Some(model);
                        self.camera = Camera::default();
                    }
                    Err(e) => {
                        log::error!("preview failed: {e:#}");
                        self.preview = None;
                        self.notice = Some(format!("The mold was generated but cannot be previewed: {e:#}"));
                    }
                }
                self.gpu_dirty = true;
            }
        }
    }

    /// Sends the next due request, if any.
    fn dispatch(&mut self, ctx: &egui::Context) {
        let Some(job) = self.wizard.next_job() else { return };
        let client = self.client.clone();
        let outcomes = Arc::clone(&self.mail.outcomes);
        let ctx = ctx.clone();
        execute(async move {
            let outcome = job.run(&client).await;
            post(&outcomes, outcome);
            ctx.request_repaint();
        });
    }

    fn start(&mut self) {
        let source = match self.tab {
            SourceTab::Upload => match &self.upload {
                Some(upload) => Source::Upload(upload.clone()),
                None => {
                    self.notice = Some("Choose an image first.".into());
                    return;
                }
            },
            SourceTab::Prompt => match Source::prompt(&self.prompt_text) {
                Ok(source) => source,
                Err(e) => {
                    self.notice = Some(e.to_string());
                    return;
                }
            },
        };
        self.notice = None;
        self.wizard.start(source);
    }

    fn request_mold(&mut self) {
        self.params = self.params.clamped();
        match self.wizard.generate_mold(&self.params) {
            Ok(()) => {
                storage::save_json(mold::STORAGE_KEY, &self.params);
                self.notice = None;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn download(&mut self) {
        let Some(file) = self.wizard.mold() else { return };
        if let Err(e) = media::save_download(&file.filename, &file.bytes, media::STL_MIME) {
            log::error!("download failed: {e:#}");
            self.notice = Some(format!("Download failed: {e:#}"));
        }
    }
}

impl CandlrApp {
    /// (Re-)builds the VBO if the model or grid changed.
    unsafe fn sync_buffers(&mut self, gl: &glow::Context) {
        if !self.gpu_dirty {
            return;
        }
        self.vertex_storage.clear();

        if let Some(model) = &self.preview {
            // ── 1) build plate grid ──────────────────────────────────────
            if self.grid {
                self.vertex_storage
                    .extend(preview::grid_vertices(&model.bounds(), GRID_SPACING_MM));
            }
            // ── 2) model edges ───────────────────────────────────────────
            self.vertex_storage.extend_from_slice(model.vertices());
        }

        // Upload (only when we still own the *single* strong ref)
        if let Some(gpu_arc) = &mut self.gpu {
            if let Some(gpu) = Arc::get_mut(gpu_arc) {
                unsafe { gpu.upload_vertices(gl, &self.vertex_storage) };
                self.gpu_dirty = false;
            }
        }
    }
}

fn load_thumbnail(ctx: &egui::Context, name: &str, bytes: &[u8]) -> Option<egui::TextureHandle> {
    match media::decode_thumbnail(bytes, THUMBNAIL_EDGE) {
        Ok(image) => Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR)),
        Err(e) => {
            log::warn!("{name} thumbnail: {e:#}");
            None
        }
    }
}

fn decode_stage_image(ctx: &egui::Context, name: &str, base64: &str) -> Option<egui::TextureHandle> {
    match media::decode_base64_image(base64) {
        Ok(bytes) => load_thumbnail(ctx, name, &bytes),
        Err(e) => {
            log::warn!("{name}: {e:#}");
            None
        }
    }
}

fn thumbnail(ui: &mut egui::Ui, texture: &egui::TextureHandle, max: f32) {
    ui.add(egui::Image::new(texture).max_size(egui::vec2(max, max)));
}

// ----------------------------------------------------------------------
// Views
// ----------------------------------------------------------------------

impl CandlrApp {
    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("side_panel")
            .resizable(false)
            .min_width(230.0)
            .show(ctx, |ui| {
                ui.heading("Candlr");
                ui.label("Custom candle molds from a picture or an idea.");

                ui.separator();
                match &self.backend {
                    BackendStatus::Checking => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Contacting backend…");
                        });
                    }
                    BackendStatus::Healthy => {
                        ui.colored_label(OK_COLOUR, "● Backend online");
                    }
                    BackendStatus::Unreachable(why) => {
                        ui.colored_label(ERROR_COLOUR, "● Backend unreachable")
                            .on_hover_text(why.as_str());
                    }
                }
                ui.collapsing("Backend address", |ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.api_base_edit)
                            .hint_text("same origin"),
                    );
                    if ui.button("Apply").clicked() {
                        self.apply_api_base(ctx);
                    }
                });

                ui.separator();
                let steps = [Step::Source, Step::Processing, Step::Settings, Step::Result];
                for (i, step) in steps.into_iter().enumerate() {
                    let text = format!("{}. {}", i + 1, step.label());
                    if step == self.wizard.step() {
                        ui.strong(text);
                    } else {
                        ui.weak(text);
                    }
                }

                if !self.wizard.stages().is_empty() {
                    ui.separator();
                    let (done, total) = self.wizard.progress();
                    ui.add(
                        egui::ProgressBar::new(done as f32 / total.max(1) as f32)
                            .text(format!("{done} / {total} stages")),
                    );
                    for record in self.wizard.stages() {
                        ui.horizontal(|ui| {
                            match &record.status {
                                StageStatus::Pending => {
                                    ui.weak("○");
                                }
                                StageStatus::Running => {
                                    ui.spinner();
                                }
                                StageStatus::Done => {
                                    ui.colored_label(OK_COLOUR, "✔");
                                }
                                StageStatus::Failed(_) => {
                                    ui.colored_label(ERROR_COLOUR, "✖");
                                }
                            }
                            ui.label(record.stage.label());
                        });
                        if let Some(model) = &record.model_used {
                            ui.small(format!("    model: {model}"));
                        }
                        if record.fallback {
                            ui.colored_label(WARN_COLOUR, "    ⚠ model failed, local fallback used");
                        }
                    }
                }
            });
    }

    fn source_view(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("What should your candle look like?");
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, SourceTab::Upload, "Upload image");
            ui.selectable_value(&mut self.tab, SourceTab::Prompt, "Describe it");
        });
        ui.separator();

        match self.tab {
            SourceTab::Upload => {
                if ui.button("Choose image…").clicked() {
                    media::pick_image(Arc::clone(&self.mail.picked), ctx.clone());
                }
                ui.small(format!(
                    "{} up to {}",
                    media::ACCEPTED_EXTENSIONS.join(", "),
                    media::human_size(media::MAX_UPLOAD_BYTES)
                ));
                if let Some(upload) = &self.upload {
                    ui.label(format!(
                        "{} · {}×{} px · {}",
                        upload.name,
                        upload.dimensions.0,
                        upload.dimensions.1,
                        media::human_size(upload.bytes.len())
                    ));
                    if let Some(texture) = &self.thumbs.upload {
                        thumbnail(ui, texture, 320.0);
                    }
                }
            }
            SourceTab::Prompt => {
                ui.add(
                    egui::TextEdit::multiline(&mut self.prompt_text)
                        .hint_text("e.g. a sleeping fox curled into a circle")
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                );
            }
        }

        ui.add_space(8.0);
        let ready = match self.tab {
            SourceTab::Upload => self.upload.is_some(),
            SourceTab::Prompt => !self.prompt_text.trim().is_empty(),
        };
        if ui.add_enabled(ready, egui::Button::new("Start")).clicked() {
            self.start();
        }
    }

    fn processing_view(&mut self, ui: &mut egui::Ui) {
        if let Some((stage, message)) = self.wizard.failure().map(|(s, m)| (s, m.to_owned())) {
            ui.heading(format!("{} failed", stage.label()));
            ui.colored_label(ERROR_COLOUR, message);
            ui.horizontal(|ui| {
                if ui.button("Retry").clicked() {
                    self.wizard.retry();
                }
                if ui.button("Back").clicked() {
                    self.wizard.back();
                }
                if ui.button("Start over").clicked() {
                    self.wizard.reset();
                }
            });
        } else if let Some(stage) = self.wizard.running() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.heading(format!("{}…", stage.label()));
            });
            if let Some(templates) = &self.templates {
                let user_prompt = self.wizard.source().and_then(Source::user_prompt);
                let template = templates.template(stage);
                ui.small(format!("model: {}", template.model));
                ui.collapsing("Prompt", |ui| {
                    egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                        ui.label(templates.for_stage(stage, user_prompt));
                    });
                });
            }
            if ui.button("Cancel").clicked() {
                self.wizard.back();
            }
        } else {
            ui.spinner();
        }

        ui.separator();
        ui.horizontal(|ui| {
            if let Some(texture) = &self.thumbs.subject {
                ui.vertical(|ui| {
                    ui.label("Subject");
                    thumbnail(ui, texture, 256.0);
                });
            }
            if let Some(texture) = &self.thumbs.depth_map {
                ui.vertical(|ui| {
                    ui.label("Depth map");
                    thumbnail(ui, texture, 256.0);
                });
            }
        });
    }

    fn settings_view(&mut self, ui: &mut egui::Ui) {
        ui.heading("Mold settings");
        ui.horizontal(|ui| {
            if let Some(texture) = &self.thumbs.subject {
                thumbnail(ui, texture, 200.0);
            }
            if let Some(texture) = &self.thumbs.depth_map {
                thumbnail(ui, texture, 200.0);
            }
        });
        if self.wizard.stages().iter().any(|r| r.fallback) {
            ui.colored_label(
                WARN_COLOUR,
                "⚠ Part of the pipeline used a local fallback; the result may be rough.",
            );
        }
        ui.separator();

        let p = &mut self.params;
        ui.add(egui::Slider::new(&mut p.wall_thickness, mold::WALL_THICKNESS).text("Wall thickness").suffix(" mm"));
        ui.add(egui::Slider::new(&mut p.max_width, mold::MAX_WIDTH).text("Max width").suffix(" mm"));
        ui.add(egui::Slider::new(&mut p.max_height, mold::MAX_HEIGHT).text("Max height").suffix(" mm"));
        ui.add(egui::Slider::new(&mut p.max_depth, mold::MAX_DEPTH).text("Max depth").suffix(" mm"));
        ui.checkbox(&mut p.include_registration_marks, "Registration marks");
        ui.checkbox(&mut p.include_pouring_channel, "Pouring channel");
        if ui.button("Reset to defaults").clicked() {
            *p = MoldParams::default();
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Back").clicked() {
                self.wizard.back();
            }
            if ui.button("Generate mold").clicked() {
                self.request_mold();
            }
        });
    }

    fn result_view(&mut self, ui: &mut egui::Ui, frame: &mut eframe::Frame) {
        ui.horizontal(|ui| {
            if let Some(file) = self.wizard.mold() {
                ui.heading(&file.filename);
                ui.label(media::human_size(file.bytes.len()));
            }
            if let Some(model) = &self.preview {
                let size = model.bounds().size();
                ui.label(format!(
                    "{} triangles · {:.1} × {:.1} × {:.1} mm",
                    model.triangles(),
                    size.x,
                    size.y,
                    size.z
                ));
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Download STL").clicked() {
                self.download();
            }
            if ui.button("Adjust settings").clicked() {
                self.wizard.back();
            }
            if ui.button("Start over").clicked() {
                self.wizard.reset();
            }
            ui.separator();
            for view in View::ALL {
                if ui.button(view.label()).clicked() {
                    self.camera.snap(view);
                }
            }
            if ui.checkbox(&mut self.grid, "grid").changed() {
                self.gpu_dirty = true;
            }
        });
        ui.separator();
        self.viewport(ui, frame);
    }

    fn viewport(&mut self, ui: &mut egui::Ui, frame: &mut eframe::Frame) {
        let Some(bounds) = self.preview.as_ref().map(PreviewModel::bounds) else {
            ui.label("No preview available.");
            return;
        };
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());

        // ───── Interaction ─────
        if response.dragged() {
            let delta = response.drag_delta();
            let (primary, secondary) = ui.input(|i| (i.pointer.primary_down(), i.pointer.secondary_down()));
            if primary {
                // left‑drag → orbit
                self.camera.orbit(delta.x, delta.y);
            } else if secondary {
                // right‑drag → pan
                self.camera.pan_by(delta.x, delta.y);
            }
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.0 {
                self.camera.zoom_by(scroll);
            }
        }

        let Some(gl) = frame.gl() else {
            ui.label("WebGL is not available; download the STL to view it.");
            return;
        };
        // ── 1) create once ─────────────────────────────────────────────
        if self.gpu.is_none() && !self.gpu_failed {
            match unsafe { renderer::GpuLines::new(gl) } {
                Ok(gpu) => {
                    self.gpu = Some(Arc::new(gpu));
                    self.gpu_dirty = true;
                }
                Err(e) => {
                    log::error!("3D preview unavailable: {e}");
                    self.gpu_failed = true;
                    self.notice = Some(format!("3D preview unavailable: {e}"));
                }
            }
        }

        // ── 2) keep vertex buffer in sync ─────────────────────────────
        unsafe { self.sync_buffers(gl) };

        // ── 3) schedule GL paint right after egui’s own meshes ────────
        if let Some(gpu_arc) = &self.gpu {
            let gpu_for_cb = Arc::clone(gpu_arc);
            let mvp = self.camera.mvp(&bounds, rect.width(), rect.height());
            let callback = egui_glow::CallbackFn::new(move |_info, painter| unsafe {
                gpu_for_cb.paint(painter.gl(), mvp);
            });
            ui.painter().add(egui::PaintCallback { rect, callback: Arc::new(callback) });
        }
    }
}

impl eframe::App for CandlrApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.poll_mail(ctx);
        self.dispatch(ctx);

        self.side_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(notice) = self.notice.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(ERROR_COLOUR, notice);
                    if ui.small_button("dismiss").clicked() {
                        self.notice = None;
                    }
                });
                ui.separator();
            }

            match self.wizard.step() {
                Step::Source => self.source_view(ui, ctx),
                Step::Processing => self.processing_view(ui),
                Step::Settings => self.settings_view(ui),
                Step::Result => self.result_view(ui, frame),
            }
        });
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let (Some(gl), Some(gpu)) = (gl, &self.gpu) {
            unsafe { gpu.destroy(gl) };
        }
    }
}

// ── Web entry‑point ──
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
const CANVAS_ID: &str = "candlr_canvas";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    let settings = Settings::load();

    // Redirect `log` macros & panic messages to the browser console
    eframe::WebLogger::init(settings.log_level).ok();
    console_error_panic_hook::set_once();

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CANVAS_ID))
        .ok_or_else(|| JsValue::from_str("missing #candlr_canvas element"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("#candlr_canvas is not a <canvas>"))?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| Ok(Box::new(CandlrApp::new(cc, settings)))),
        )
        .await?;

    Ok(())
}

// Executes an async future without blocking the egui thread
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn execute<F: Future<Output = ()> + Send + 'static>(f: F) {
    std::thread::spawn(move || futures::executor::block_on(f));
}
#[cfg(target_arch = "wasm32")]
pub(crate) fn execute<F: Future<Output = ()> + 'static>(f: F) {
    wasm_bindgen_futures::spawn_local(f);
}
