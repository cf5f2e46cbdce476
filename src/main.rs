use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use automation_panel::config::PanelArgs;
use automation_panel::controller::{
    Completed, DesktopDraft, DesktopField, DocumentDraft, DocumentField, WebDraft, WebField,
};
use automation_panel::preview::{Preview, PreviewReady};
use automation_panel::{
    ApiClient, AppName, AutomationForm, Controller, DesktopAction, DesktopController,
    DocumentController, JobResult, SelectedFile, SubmissionState, WebController,
};
use clap::Parser;
use eframe::egui;
use strum::IntoEnumIterator;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Work finished off the UI thread, applied at the start of the next frame.
enum UiEvent {
    Web(Completed<WebDraft>),
    Desktop(Completed<DesktopDraft>),
    Document(Completed<DocumentDraft>),
    FileLoaded { token: u64, result: Result<SelectedFile, String> },
    Preview(PreviewReady),
    Health(bool),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Web,
    Desktop,
    Document,
}

struct PanelApp {
    runtime: Handle,
    client: ApiClient,
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    tab: Tab,
    web: WebController,
    desktop: DesktopController,
    document: DocumentController,
    file_path: String,
    file_error: Option<String>,
    backend_healthy: Option<bool>,
}

impl PanelApp {
    fn new(cc: &eframe::CreationContext<'_>, runtime: Handle, client: ApiClient) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let app = Self {
            runtime,
            client,
            events_tx,
            events_rx,
            tab: Tab::Web,
            web: WebController::default(),
            desktop: DesktopController::default(),
            document: DocumentController::default(),
            file_path: String::new(),
            file_error: None,
            backend_healthy: None,
        };
        app.check_health(&cc.egui_ctx);
        app
    }

    fn spawn<Fut>(&self, ctx: &egui::Context, task: Fut)
    where
        Fut: Future<Output = Option<UiEvent>> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            if let Some(event) = task.await {
                let _ = tx.send(event);
                ctx.request_repaint();
            }
        });
    }

    fn check_health(&self, ctx: &egui::Context) {
        let client = self.client.clone();
        self.spawn(ctx, async move {
            let healthy = client.health().await.unwrap_or_else(|e| {
                warn!(error = %e, "health check failed");
                false
            });
            Some(UiEvent::Health(healthy))
        });
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                UiEvent::Web(done) => {
                    self.web.complete(done);
                }
                UiEvent::Desktop(done) => {
                    self.desktop.complete(done);
                }
                UiEvent::Document(done) => {
                    self.document.complete(done);
                }
                UiEvent::FileLoaded { token, .. } if !self.document.is_latest_selection(token) => {
                    debug!(token, "ignoring superseded file load");
                }
                UiEvent::FileLoaded { token, result: Ok(file) } => {
                    self.file_error = None;
                    if let Some(job) = self.document.accept_selection(token, file) {
                        self.spawn(ctx, async move {
                            match tokio::task::spawn_blocking(move || job.run()).await {
                                Ok(ready) => Some(UiEvent::Preview(ready)),
                                Err(e) => {
                                    warn!(error = %e, "preview task panicked");
                                    None
                                }
                            }
                        });
                    }
                }
                UiEvent::FileLoaded { result: Err(message), .. } => self.file_error = Some(message),
                UiEvent::Preview(ready) => {
                    self.document.apply_preview(ready);
                }
                UiEvent::Health(healthy) => self.backend_healthy = Some(healthy),
            }
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                egui::RichText::new("Automation Dashboard")
                    .size(28.0)
                    .strong()
                    .color(egui::Color32::from_rgb(79, 70, 229)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.backend_healthy = None;
                    self.check_health(ui.ctx());
                }
                let (text, color) = match self.backend_healthy {
                    Some(true) => ("backend online", egui::Color32::DARK_GREEN),
                    Some(false) => ("backend unreachable", egui::Color32::RED),
                    None => ("checking backend...", egui::Color32::GRAY),
                };
                ui.label(egui::RichText::new(text).color(color));
            });
        });
    }

    fn render_tabs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.tab, Tab::Web, "Web Automation");
            ui.selectable_value(&mut self.tab, Tab::Desktop, "Desktop Automation");
            ui.selectable_value(&mut self.tab, Tab::Document, "Document Automation");
        });
    }

    fn render_web(&mut self, ui: &mut egui::Ui) {
        section_intro(
            ui,
            "Web Automation",
            "Automate website interactions like login, search, and form filling.",
        );
        let web = &mut self.web;
        text_field(ui, web, WebField::Url, "Website URL *", "https://example.com", |d| &mut d.url);
        text_field(ui, web, WebField::Username, "Username (if login required)", "username", |d| {
            &mut d.username
        });
        password_field(ui, web, WebField::Password, "Password (if login required)", |d| {
            &mut d.password
        });
        text_field(
            ui,
            web,
            WebField::SearchQuery,
            "Search Query (optional)",
            "What are you looking for?",
            |d| &mut d.search_query,
        );

        if submit_button(ui, web.can_submit(), !web.can_submit(), "Run Web Automation", "Processing...") {
            if let Some(pending) = self.web.begin_submit() {
                let client = self.client.clone();
                self.spawn(ui.ctx(), async move { Some(UiEvent::Web(pending.run(client).await)) });
            }
        }
        render_job_state(ui, self.web.state());
    }

    fn render_desktop(&mut self, ui: &mut egui::Ui) {
        section_intro(
            ui,
            "Desktop Automation",
            "Automate desktop applications like Notepad.",
        );
        let desktop = &mut self.desktop;

        let mut app_name = desktop.draft().app_name.clone();
        egui::ComboBox::from_label("Application")
            .selected_text(
                app_name
                    .parse::<AppName>()
                    .map(AppName::label)
                    .unwrap_or("Select application"),
            )
            .show_ui(ui, |ui| {
                for app in AppName::iter() {
                    ui.selectable_value(&mut app_name, app.to_string(), app.label());
                }
            });
        if app_name != desktop.draft().app_name {
            desktop.edit(|d| d.app_name = app_name);
            desktop.blur(DesktopField::AppName);
        }
        field_errors(ui, desktop.form().visible_errors(DesktopField::AppName));

        let mut action = desktop.draft().action.clone();
        egui::ComboBox::from_label("Action")
            .selected_text(
                action
                    .parse::<DesktopAction>()
                    .map(DesktopAction::label)
                    .unwrap_or("Select action"),
            )
            .show_ui(ui, |ui| {
                for a in DesktopAction::iter() {
                    ui.selectable_value(&mut action, a.to_string(), a.label());
                }
            });
        if action != desktop.draft().action {
            desktop.edit(|d| d.action = action);
            desktop.blur(DesktopField::Action);
        }
        field_errors(ui, desktop.form().visible_errors(DesktopField::Action));

        if desktop.draft().shows_text() {
            ui.label("Text to Type");
            let mut text = desktop.draft().text.clone();
            let response = ui.add(
                egui::TextEdit::multiline(&mut text)
                    .hint_text("Enter the text you want to type...")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                desktop.edit(|d| d.text = text);
            }
            if response.lost_focus() {
                desktop.blur(DesktopField::Text);
            }
            field_errors(ui, desktop.form().visible_errors(DesktopField::Text));
        }

        if submit_button(ui, desktop.can_submit(), !desktop.can_submit(), "Run Desktop Automation", "Processing...") {
            if let Some(pending) = self.desktop.begin_submit() {
                let client = self.client.clone();
                self.spawn(ui.ctx(), async move {
                    Some(UiEvent::Desktop(pending.run(client).await))
                });
            }
        }
        render_job_state(ui, self.desktop.state());
    }

    fn render_document(&mut self, ui: &mut egui::Ui) {
        section_intro(
            ui,
            "Document Automation",
            "Extract text from images and PDFs using OCR.",
        );

        let load_clicked = ui
            .horizontal(|ui| {
                let path_width = ui.available_width() - 80.0;
                ui.add(
                    egui::TextEdit::singleline(&mut self.file_path)
                        .hint_text("Path to a PDF, JPG, or PNG file")
                        .desired_width(path_width),
                );
                ui.button("Load").clicked()
            })
            .inner;
        if load_clicked && !self.file_path.trim().is_empty() {
            let path = PathBuf::from(self.file_path.trim());
            let token = self.document.begin_selection();
            self.spawn(ui.ctx(), async move {
                let result = SelectedFile::load(&path).await.map_err(|e| format!("{e:#}"));
                Some(UiEvent::FileLoaded { token, result })
            });
        }
        ui.label(egui::RichText::new("PDF, JPG, PNG up to 10MB").small().color(egui::Color32::GRAY));
        if let Some(message) = &self.file_error {
            ui.colored_label(egui::Color32::RED, message);
        }
        field_errors(ui, self.document.form().visible_errors(DocumentField::File));

        match self.document.preview() {
            Preview::None => {}
            Preview::FileName(name) => {
                ui.label(format!("Selected: {name}"));
            }
            Preview::Image(data_url) => {
                let name = self
                    .document
                    .draft()
                    .file
                    .as_ref()
                    .map(|f| f.name.as_str())
                    .unwrap_or_default();
                ui.label(format!("Preview ready for {name} ({} bytes encoded)", data_url.len()));
            }
        }

        let has_file = self.document.draft().file.is_some();
        if submit_button(
            ui,
            self.document.can_submit() && has_file,
            !self.document.can_submit(),
            "Extract Text",
            "Extracting text...",
        ) {
            if let Some(pending) = self.document.begin_submit() {
                let client = self.client.clone();
                self.spawn(ui.ctx(), async move {
                    Some(UiEvent::Document(pending.run(client).await))
                });
            }
        }

        match self.document.state() {
            SubmissionState::Succeeded(result) => {
                banner(ui, true, "Extraction Complete", |ui| {
                    egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                        ui.label(egui::RichText::new(result.display_text()).monospace());
                    });
                });
            }
            SubmissionState::Failed(error) => {
                banner(ui, false, "Error", |ui| {
                    ui.label(&error.display_message);
                });
            }
            SubmissionState::Idle | SubmissionState::Submitting(_) => {}
        }
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let width = f32::min(900.0, ui.available_width() - 40.0);
            ui.vertical_centered(|ui| {
                ui.set_max_width(width);
                ui.add_space(16.0);
                self.render_header(ui);
                ui.add_space(10.0);
                self.render_tabs(ui);
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.with_layout(egui::Layout::top_down(egui::Align::LEFT), |ui| {
                            match self.tab {
                                Tab::Web => self.render_web(ui),
                                Tab::Desktop => self.render_desktop(ui),
                                Tab::Document => self.render_document(ui),
                            }
                        });
                    });
            });
        });
    }
}

fn section_intro(ui: &mut egui::Ui, title: &str, blurb: &str) {
    ui.add_space(8.0);
    ui.label(egui::RichText::new(title).size(18.0).strong());
    ui.label(egui::RichText::new(blurb).color(egui::Color32::GRAY));
    ui.add_space(8.0);
}

fn field_errors(ui: &mut egui::Ui, messages: &[String]) {
    for message in messages {
        ui.colored_label(egui::Color32::RED, message);
    }
}

fn text_field<F: AutomationForm>(
    ui: &mut egui::Ui,
    controller: &mut Controller<F>,
    field: F::Field,
    label: &str,
    hint: &str,
    value: impl Fn(&mut F) -> &mut String,
) {
    edit_field(ui, controller, field, label, hint, false, value);
}

fn password_field<F: AutomationForm>(
    ui: &mut egui::Ui,
    controller: &mut Controller<F>,
    field: F::Field,
    label: &str,
    value: impl Fn(&mut F) -> &mut String,
) {
    edit_field(ui, controller, field, label, "••••••••", true, value);
}

fn edit_field<F: AutomationForm>(
    ui: &mut egui::Ui,
    controller: &mut Controller<F>,
    field: F::Field,
    label: &str,
    hint: &str,
    password: bool,
    value: impl Fn(&mut F) -> &mut String,
) {
    ui.label(label);
    let mut draft = controller.draft().clone();
    let mut text = std::mem::take(value(&mut draft));
    let response = ui.add(
        egui::TextEdit::singleline(&mut text)
            .hint_text(hint)
            .password(password)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        controller.edit(|d| *value(d) = text);
    }
    if response.lost_focus() {
        controller.blur(field);
    }
    field_errors(ui, controller.form().visible_errors(field));
    ui.add_space(6.0);
}

/// Returns true when clicked. `busy` switches the caption while a request
/// is in flight; a button disabled for any other reason keeps its label.
fn submit_button(ui: &mut egui::Ui, enabled: bool, busy: bool, label: &str, busy_label: &str) -> bool {
    ui.add_space(8.0);
    let text = submit_caption(busy, label, busy_label);
    ui.add_enabled(
        enabled,
        egui::Button::new(egui::RichText::new(text).strong().color(egui::Color32::WHITE))
            .fill(egui::Color32::from_rgb(79, 70, 229))
            .min_size(egui::vec2(180.0, 30.0)),
    )
    .clicked()
}

fn submit_caption<'a>(busy: bool, label: &'a str, busy_label: &'a str) -> &'a str {
    if busy { busy_label } else { label }
}

fn banner(ui: &mut egui::Ui, success: bool, title: &str, body: impl FnOnce(&mut egui::Ui)) {
    let (fill, color) = if success {
        (egui::Color32::from_rgb(240, 253, 244), egui::Color32::DARK_GREEN)
    } else {
        (egui::Color32::from_rgb(254, 242, 242), egui::Color32::DARK_RED)
    };
    ui.add_space(12.0);
    egui::Frame::new()
        .fill(fill)
        .corner_radius(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(title).strong().color(color));
            body(ui);
        });
}

fn render_job_state(ui: &mut egui::Ui, state: &SubmissionState<JobResult>) {
    match state {
        SubmissionState::Idle => {}
        SubmissionState::Submitting(_) => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for the backend...");
            });
        }
        SubmissionState::Succeeded(result) => {
            banner(ui, true, "Success", |ui| {
                ui.label(format!("status: {}", result.status));
                for line in result.message.lines() {
                    ui.label(egui::RichText::new(line).monospace());
                }
            });
        }
        SubmissionState::Failed(error) => {
            banner(ui, false, "Error", |ui| {
                ui.label(&error.display_message);
            });
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("automation_panel=info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = PanelArgs::parse();
    init_tracing(args.log.as_deref());

    let runtime = tokio::runtime::Runtime::new()?;
    let config = args.client_config();
    let client = ApiClient::new(&config)?;
    info!(backend = %config.base_url, timeout = ?config.timeout, "starting automation panel");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([520.0, 480.0]),
        ..Default::default()
    };

    let handle = runtime.handle().clone();
    eframe::run_native(
        "Automation Dashboard",
        native_options,
        Box::new(move |cc| Ok(Box::new(PanelApp::new(cc, handle, client)))),
    )
    .map_err(|e| anyhow::anyhow!("panel window failed: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_only_changes_while_busy() {
        assert_eq!(submit_caption(false, "Extract Text", "Extracting text..."), "Extract Text");
        assert_eq!(submit_caption(true, "Extract Text", "Extracting text..."), "Extracting text...");
    }
}
