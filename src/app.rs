use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiCommand, ApiHandle, ApiMessage, TokenStore};
use crate::config::AppConfig;
use crate::model::{Block, Event};
use crate::ui;
use crate::ui::timeline::{TimelineAction, TimelineView};

/// Where the admin login currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    Idle,
    Sending,
    AwaitingCode,
    Verifying,
    Done,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub step: AuthStep,
    pub email: String,
    pub code: String,
}

/// What the details window shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Block(Block),
    Event(Event),
}

/// Main application state.
pub struct TimelineApp {
    pub config: AppConfig,
    api: Option<ApiHandle>,
    tokens: TokenStore,

    pub current_events: Vec<Event>,
    pub all_events: Vec<Event>,
    pub loading: bool,

    pub auth: AuthForm,
    pub timeline: TimelineView,
    pub selection: Option<Selection>,
    pub jump_date: NaiveDate,

    // Dialog state
    pub show_about: bool,

    // Status message
    pub status_message: String,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, client: ApiClient) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let tokens = client.tokens().clone();
        let repaint = cc.egui_ctx.clone();
        let api = match ApiHandle::spawn(client, move || repaint.request_repaint()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(error = %e, "failed to start api worker");
                None
            }
        };

        let mut app = Self::with_api(config, api, tokens);
        app.reload();
        app
    }

    /// Build the state around an already running worker (or none).
    ///
    /// `tokens` must be the store the worker's client uses.
    pub fn with_api(config: AppConfig, api: Option<ApiHandle>, tokens: TokenStore) -> Self {
        let authenticated = tokens.access().is_some();
        let today = chrono::Local::now().date_naive();
        Self {
            timeline: TimelineView::new(config.day_width),
            config,
            api,
            tokens,
            current_events: Vec::new(),
            all_events: Vec::new(),
            loading: true,
            auth: AuthForm {
                step: if authenticated {
                    AuthStep::Done
                } else {
                    AuthStep::Idle
                },
                email: String::new(),
                code: String::new(),
            },
            selection: None,
            jump_date: today,
            show_about: false,
            status_message: "Ready".to_string(),
        }
    }

    fn send(&mut self, command: ApiCommand) -> bool {
        let result = match &self.api {
            Some(api) => api.send(command),
            None => Err(crate::error::ApiError::WorkerStopped),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "api command not sent");
                self.status_message = e.to_string();
                false
            }
        }
    }

    /// Drain worker messages queued since the last frame.
    fn poll_api(&mut self) {
        let mut messages = Vec::new();
        if let Some(api) = self.api.as_mut() {
            while let Some(message) = api.try_recv() {
                messages.push(message);
            }
        }
        for message in messages {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::CodeSent => {
                self.auth.step = AuthStep::AwaitingCode;
                self.status_message = format!("Login code sent to {}", self.auth.email);
            }
            ApiMessage::CodeRejected(e) => {
                self.auth.step = AuthStep::Idle;
                self.status_message = format!("Could not send code: {e}");
            }
            ApiMessage::LoggedIn => {
                self.auth.step = AuthStep::Done;
                self.auth.code.clear();
                self.status_message = "Logged in".to_string();
                self.reload();
            }
            ApiMessage::LoginFailed(e) => {
                self.auth.step = AuthStep::AwaitingCode;
                self.status_message = format!("Login failed: {e}");
            }
            ApiMessage::LoggedOut => {
                self.auth.step = AuthStep::Idle;
                self.status_message = "Logged out".to_string();
            }
            ApiMessage::CurrentEventsLoaded(events) => {
                self.current_events = events;
            }
            ApiMessage::AllEventsLoaded(events) => {
                info!(count = events.len(), "events loaded");
                self.status_message = format!("Loaded {} events", events.len());
                self.all_events = events;
                self.loading = false;
            }
            ApiMessage::AllEventsFailed(e) => {
                self.loading = false;
                self.status_message = format!("Loading events failed: {e}");
            }
            ApiMessage::EventLoaded(event) => {
                if let Some(Selection::Event(selected)) = &mut self.selection {
                    if selected.id == event.id {
                        *selected = event;
                    }
                }
            }
            ApiMessage::BlockLoaded(block) => {
                if let Some(Selection::Block(selected)) = &mut self.selection {
                    if selected.id == block.id {
                        *selected = block;
                    }
                }
            }
            ApiMessage::Error(e) => {
                self.status_message = e;
            }
        }
    }

    // --- Auth ---

    pub fn request_code(&mut self) {
        let email = self.auth.email.trim().to_string();
        if email.is_empty() || self.auth.step == AuthStep::Sending {
            return;
        }
        self.auth.step = AuthStep::Sending;
        if !self.send(ApiCommand::SendCode(email)) {
            self.auth.step = AuthStep::Idle;
        }
    }

    pub fn verify_code(&mut self) {
        let code = self.auth.code.trim().to_string();
        if code.is_empty() || self.auth.step == AuthStep::Verifying {
            return;
        }
        let email = self.auth.email.trim().to_string();
        self.auth.step = AuthStep::Verifying;
        if !self.send(ApiCommand::VerifyCode { email, code }) {
            self.auth.step = AuthStep::AwaitingCode;
        }
    }

    pub fn logout(&mut self) {
        if !self.send(ApiCommand::Logout) {
            self.tokens.clear();
        }
        self.auth.step = AuthStep::Idle;
        self.auth.code.clear();
    }

    // --- Data ---

    pub fn reload(&mut self) {
        self.loading = self.all_events.is_empty();
        if self.send(ApiCommand::RefreshAll) {
            self.status_message = "Loading events…".to_string();
        } else {
            self.loading = false;
        }
    }

    pub fn select_block(&mut self, block: Block) {
        let id = block.id;
        self.selection = Some(Selection::Block(block));
        self.send(ApiCommand::FetchBlock(id));
    }

    pub fn select_event(&mut self, event: Event) {
        let id = event.id;
        self.selection = Some(Selection::Event(event));
        self.send(ApiCommand::FetchEvent(id));
    }

    pub fn open_link(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "failed to open link");
            self.status_message = format!("Could not open link: {e}");
        }
    }

    // --- File operations ---

    pub fn open_snapshot(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Events snapshot", &["json"])
            .pick_file()
        {
            match crate::io::load_snapshot(&path) {
                Ok(events) => {
                    self.status_message = format!("Opened {} events from snapshot", events.len());
                    self.all_events = events;
                    self.loading = false;
                    self.selection = None;
                }
                Err(e) => {
                    error!(error = %format!("{e:#}"), "snapshot load failed");
                    self.status_message = format!("Error loading: {e:#}");
                }
            }
        }
    }

    pub fn save_snapshot(&mut self) {
        if self.all_events.is_empty() {
            self.status_message = "Nothing to save, no events loaded".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Events snapshot", &["json"])
            .set_file_name("events.json")
            .save_file()
        {
            match crate::io::save_snapshot(&self.all_events, &path) {
                Ok(()) => self.status_message = "Snapshot saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {e:#}"),
            }
        }
    }

    pub fn export_csv(&mut self) {
        if self.all_events.is_empty() {
            self.status_message = "Nothing to export, no events loaded".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("blocks.csv")
            .save_file()
        {
            match crate::io::export_csv(&self.all_events, &path) {
                Ok(count) => self.status_message = format!("Exported {count} blocks to CSV"),
                Err(e) => self.status_message = format!("CSV export failed: {e:#}"),
            }
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        self.poll_api();

        let today = chrono::Local::now().date_naive();

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui::toolbar::show_navigation(self, ui, today);
        });

        egui::TopBottomPanel::top("highlights")
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_DARK)
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0)),
            )
            .show(ctx, |ui| {
                ui::highlights::show_highlights(&self.current_events, ui);
            });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Events: {}", self.all_events.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(" · ")
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "Zoom: {:.0}%",
                                self.timeline.day_width / self.config.day_width * 100.0
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline
        let mut action = TimelineAction::None;
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_DARK)
                    .inner_margin(egui::Margin::ZERO),
            )
            .show(ctx, |ui| {
                if self.loading {
                    ui.add_space(20.0);
                    ui.horizontal(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.label("Loading…");
                    });
                    return;
                }

                // Pinch / Ctrl+Scroll zoom over the timeline
                if ui.rect_contains_pointer(ui.max_rect()) {
                    let zoom = ui.input(|i| i.zoom_delta());
                    if zoom > 1.0 {
                        self.timeline.zoom_in();
                    } else if zoom < 1.0 {
                        self.timeline.zoom_out();
                    }
                }

                action = self.timeline.show(ui, &self.all_events, &self.config, today);
            });

        match action {
            TimelineAction::SelectBlock(block) => self.select_block(block),
            TimelineAction::SelectEvent(event) => self.select_event(event),
            TimelineAction::None => {}
        }

        // Dialogs
        if self.selection.is_some() {
            ui::dialogs::show_details_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
