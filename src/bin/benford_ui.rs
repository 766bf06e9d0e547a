//! Benford Workbench - Graphical User Interface
//!
//! One window driving the whole workflow: stage and upload a tabular data
//! file, refresh the server's file listing, run the analysis, then inspect
//! each column's leading-digit distribution against Benford's expected
//! curve.
//!
//! Every network call runs as a task whose completion is delivered as a
//! [`Message`]; all state mutation happens in [`App::update`] on the single
//! event thread. Responses are applied in arrival order, not issue order.

use benford_workbench::client::{ApiClient, ApiError};
use benford_workbench::model::{AnalysisReport, ColumnEntry, LeadDigitChart, BENFORD_EXPECTED};
use benford_workbench::workflow::Workbench;
use iced::widget::{
    button, column, container, pick_list, progress_bar, row, rule, scrollable, text, text_input,
};
use iced::{Center, Element, Fill, Task, Theme};
use std::path::PathBuf;
use std::time::Duration;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(App::new, App::update, App::view)
        .theme(App::theme)
        .centered()
        .run()
}

// ============================================================================
// App State
// ============================================================================

/// How long a notice stays on screen.
const NOTICE_SECS: u64 = 2;

/// Full scale of the chart bars, in percent. Observed values above this
/// clamp visually; the numeric label next to the bar stays exact.
const CHART_FULL_SCALE: f32 = 50.0;

const DEFAULT_SERVER: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Error,
}

/// One transient notice. Removed by the timer task spawned when it was
/// pushed.
#[derive(Debug, Clone)]
struct Notice {
    id: u64,
    kind: NoticeKind,
    message: String,
}

/// Observed half of the digit chart. The expected half is the fixed
/// Benford series and is drawn straight from [`BENFORD_EXPECTED`].
#[derive(Debug, Clone, Default)]
struct DigitChart {
    observed: Option<[f64; 9]>,
}

impl LeadDigitChart for DigitChart {
    fn set_observed(&mut self, series: [f64; 9]) {
        self.observed = Some(series);
    }
}

struct App {
    client: ApiClient,
    server_url: String,

    bench: Workbench,
    chart: DigitChart,

    // In-flight guards; re-entrant upload/analyze is refused while pending.
    is_uploading: bool,
    is_analyzing: bool,

    notices: Vec<Notice>,
    next_notice_id: u64,
}

impl App {
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn new() -> (Self, Task<Message>) {
        let server_url = load_config();
        let client = ApiClient::new(&server_url);
        let startup = Task::batch([
            refresh_files(client.clone(), None),
            refresh_extensions(client.clone()),
        ]);
        (
            App {
                client,
                server_url,
                bench: Workbench::default(),
                chart: DigitChart::default(),
                is_uploading: false,
                is_analyzing: false,
                notices: Vec::new(),
                next_notice_id: 0,
            },
            startup,
        )
    }

    /// Show a notice and schedule its removal.
    fn push_notice(&mut self, kind: NoticeKind, message: impl Into<String>) -> Task<Message> {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            message: message.into(),
        });
        Task::perform(
            async move {
                tokio::time::sleep(Duration::from_secs(NOTICE_SECS)).await;
                id
            },
            Message::NoticeExpired,
        )
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone)]
enum Message {
    // Server connection
    ServerUrlChanged(String),
    ServerUrlSubmitted,

    // File listing
    RefreshFiles,
    FilesLoaded(Option<String>, Result<Vec<String>, ApiError>),
    FileSelected(String),

    // Upload
    BrowseFile,
    FileStaged(Option<PathBuf>),
    UploadStart,
    UploadFinished(Result<String, ApiError>),

    // Analysis
    ExtensionsLoaded(Result<Vec<String>, ApiError>),
    ExtensionSelected(String),
    AnalyzeStart,
    AnalyzeFinished(Result<AnalysisReport, ApiError>),

    // Columns / chart
    ColumnChosen(ColumnEntry),

    // Notices
    NoticeExpired(u64),
}

/// Fetch the file listing; `select` is re-asserted against the fresh list
/// when the response lands.
fn refresh_files(client: ApiClient, select: Option<String>) -> Task<Message> {
    Task::perform(
        async move { (select, client.list_files().await) },
        |(select, result)| Message::FilesLoaded(select, result),
    )
}

fn refresh_extensions(client: ApiClient) -> Task<Message> {
    Task::perform(
        async move { client.list_extensions().await },
        Message::ExtensionsLoaded,
    )
}

/// Notice text for a failed operation: quote the server's message when one
/// was received, stay generic when nothing usable came back.
fn failure_text(action: &str, err: &ApiError) -> String {
    match err {
        ApiError::Server(msg) => format!("{}: {}", action, msg),
        ApiError::Network(_) => format!("{}: server unreachable", action),
        ApiError::Decode(_) => format!("{}: unexpected server response", action),
    }
}

// ============================================================================
// Update
// ============================================================================

impl App {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- Server connection --
            Message::ServerUrlChanged(v) => {
                self.server_url = v;
                Task::none()
            }
            Message::ServerUrlSubmitted => {
                self.client = ApiClient::new(&self.server_url);
                save_config(&self.server_url);
                Task::batch([
                    refresh_files(self.client.clone(), None),
                    refresh_extensions(self.client.clone()),
                ])
            }

            // -- File listing --
            Message::RefreshFiles => refresh_files(
                self.client.clone(),
                self.bench.registry.selected().map(str::to_string),
            ),
            Message::FilesLoaded(select, result) => match result {
                Ok(files) => {
                    self.bench.apply_file_listing(files, select.as_deref());
                    Task::none()
                }
                // Prior listing stays untouched; the failure is surfaced.
                Err(e) => self.push_notice(
                    NoticeKind::Error,
                    failure_text("Could not load file list", &e),
                ),
            },
            Message::FileSelected(name) => {
                self.bench.registry.select(&name);
                Task::none()
            }

            // -- Upload --
            Message::BrowseFile => Task::perform(
                async {
                    let file = rfd::AsyncFileDialog::new()
                        .add_filter("Data files", &["csv", "tsv"])
                        .pick_file()
                        .await;
                    file.map(|f| f.path().to_path_buf())
                },
                Message::FileStaged,
            ),
            Message::FileStaged(path) => {
                // Staging is local only; nothing is sent until Upload.
                if let Some(p) = path {
                    self.bench.upload.set_file(p);
                }
                Task::none()
            }
            Message::UploadStart => {
                if self.is_uploading {
                    return Task::none();
                }
                let path = match self.bench.upload_request() {
                    Ok(p) => p,
                    Err(e) => return self.push_notice(NoticeKind::Error, e.to_string()),
                };
                self.is_uploading = true;
                let client = self.client.clone();
                Task::perform(
                    async move { client.upload(&path).await },
                    Message::UploadFinished,
                )
            }
            Message::UploadFinished(result) => {
                self.is_uploading = false;
                match result {
                    Ok(name) => {
                        let notice = self.push_notice(NoticeKind::Success, "File has been uploaded");
                        // Re-list and auto-select the fresh upload.
                        let refresh = refresh_files(self.client.clone(), Some(name));
                        Task::batch([notice, refresh])
                    }
                    Err(e) => self.push_notice(
                        NoticeKind::Error,
                        failure_text("Could not upload file", &e),
                    ),
                }
            }

            // -- Analysis --
            Message::ExtensionsLoaded(result) => match result {
                Ok(extensions) => {
                    self.bench.apply_extensions(extensions);
                    Task::none()
                }
                Err(e) => self.push_notice(
                    NoticeKind::Error,
                    failure_text("Could not load analysis modes", &e),
                ),
            },
            Message::ExtensionSelected(ext) => {
                self.bench.select_extension(ext);
                Task::none()
            }
            Message::AnalyzeStart => {
                if self.is_analyzing {
                    return Task::none();
                }
                let request = match self.bench.analyze_request() {
                    Ok(r) => r,
                    // Validation failed: one notice, no request sent.
                    Err(e) => return self.push_notice(NoticeKind::Error, e.to_string()),
                };
                self.is_analyzing = true;
                let client = self.client.clone();
                Task::perform(
                    async move { client.analyze(&request).await },
                    Message::AnalyzeFinished,
                )
            }
            Message::AnalyzeFinished(result) => {
                self.is_analyzing = false;
                match result {
                    Ok(report) => {
                        self.bench.apply_report(report);
                        self.push_notice(
                            NoticeKind::Success,
                            "File has been analyzed, now select column",
                        )
                    }
                    // The previous report and chart stay as they were.
                    Err(e) => self.push_notice(
                        NoticeKind::Error,
                        failure_text("Could not analyze file", &e),
                    ),
                }
            }

            // -- Columns / chart --
            Message::ColumnChosen(entry) => {
                if let Some(series) = self.bench.choose_column(&entry) {
                    self.chart.set_observed(series);
                }
                Task::none()
            }

            // -- Notices --
            Message::NoticeExpired(id) => {
                self.notices.retain(|n| n.id != id);
                Task::none()
            }
        }
    }
}

// ============================================================================
// View
// ============================================================================

impl App {
    fn view(&self) -> Element<'_, Message> {
        let header = column![
            text("Benford Workbench").size(28),
            text("Leading-digit analysis against Benford's law").size(14),
        ]
        .spacing(4);

        let body = column![
            header,
            self.view_notices(),
            self.view_server(),
            rule::horizontal(1),
            self.view_upload(),
            rule::horizontal(1),
            self.view_files(),
            rule::horizontal(1),
            self.view_analyze(),
            rule::horizontal(1),
            self.view_result(),
            rule::horizontal(1),
            self.view_chart(),
        ]
        .spacing(16);

        scrollable(container(body).padding(20).width(Fill)).into()
    }

    fn view_notices(&self) -> Element<'_, Message> {
        let mut items: Vec<Element<'_, Message>> = Vec::new();
        for notice in &self.notices {
            let color = match notice.kind {
                NoticeKind::Success => iced::Color::from_rgb(0.4, 0.9, 0.4),
                NoticeKind::Error => iced::Color::from_rgb(0.95, 0.4, 0.4),
            };
            items.push(text(&notice.message).size(14).color(color).into());
        }
        column(items).spacing(4).into()
    }

    fn view_server(&self) -> Element<'_, Message> {
        row![
            text("Server:").size(13).width(70),
            text_input(DEFAULT_SERVER, &self.server_url)
                .on_input(Message::ServerUrlChanged)
                .on_submit(Message::ServerUrlSubmitted)
                .width(Fill),
            button(text("Connect").size(13)).on_press(Message::ServerUrlSubmitted),
        ]
        .spacing(10)
        .align_y(Center)
        .into()
    }

    fn view_upload(&self) -> Element<'_, Message> {
        let staged = self
            .bench
            .upload
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let mut browse = button(text("Browse").size(13));
        if !self.is_uploading {
            browse = browse.on_press(Message::BrowseFile);
        }

        let upload_label = if self.is_uploading {
            "Uploading..."
        } else {
            "Upload"
        };
        let upload = button(text(upload_label)).on_press_maybe(
            (!self.is_uploading && self.bench.upload.path().is_some())
                .then_some(Message::UploadStart),
        );

        column![
            text("Upload").size(16),
            row![
                text_input("Browse for a .csv or .tsv file...", &staged).width(Fill),
                browse,
                upload,
            ]
            .spacing(10)
            .align_y(Center),
        ]
        .spacing(8)
        .into()
    }

    fn view_files(&self) -> Element<'_, Message> {
        let refresh = button(text("Refresh").size(13)).on_press(Message::RefreshFiles);

        let listing: Element<'_, Message> = if self.bench.registry.files().is_empty() {
            text("No files on the server yet. Upload one.")
                .size(13)
                .color(iced::Color::from_rgb(0.6, 0.6, 0.6))
                .into()
        } else {
            let selected = self.bench.registry.selected().map(str::to_string);
            pick_list(self.bench.registry.files(), selected, Message::FileSelected)
                .placeholder("Select file")
                .width(Fill)
                .into()
        };

        column![
            row![text("Files").size(16).width(Fill), refresh].align_y(Center),
            listing,
        ]
        .spacing(8)
        .into()
    }

    fn view_analyze(&self) -> Element<'_, Message> {
        let modes: Element<'_, Message> = if self.bench.extensions().is_empty() {
            text("Analysis modes not loaded")
                .size(13)
                .color(iced::Color::from_rgb(0.6, 0.6, 0.6))
                .into()
        } else {
            let selected = self.bench.selected_extension().map(str::to_string);
            pick_list(self.bench.extensions(), selected, Message::ExtensionSelected).into()
        };

        let label = if self.is_analyzing {
            "Analyzing..."
        } else {
            "Analyze"
        };
        let analyze = button(text(label))
            .on_press_maybe((!self.is_analyzing).then_some(Message::AnalyzeStart));

        column![
            text("Analyze").size(16),
            row![text("Mode:").size(13).width(70), modes, analyze]
                .spacing(10)
                .align_y(Center),
        ]
        .spacing(8)
        .into()
    }

    fn view_result(&self) -> Element<'_, Message> {
        let report = match self.bench.report() {
            Some(r) => r,
            None => {
                return column![
                    text("Columns").size(16),
                    text("Analyze a file to populate its columns.")
                        .size(13)
                        .color(iced::Color::from_rgb(0.6, 0.6, 0.6)),
                ]
                .spacing(8)
                .into();
            }
        };

        let summary = &report.summary;
        let summary_line = format!(
            "{} ({}): {} columns, {} lines parsed, {} omitted, {} values",
            summary.filename,
            summary.ext,
            summary.header_size,
            summary.parsed_lines,
            summary.omitted_lines,
            summary.parsed_words,
        );

        let selected = self
            .bench
            .columns
            .chosen()
            .map(|name| ColumnEntry::Column(name.to_string()))
            .unwrap_or(ColumnEntry::Placeholder);
        let picker = pick_list(
            self.bench.columns.entries(),
            Some(selected),
            Message::ColumnChosen,
        )
        .width(Fill);

        let badge: Element<'_, Message> = match self
            .bench
            .columns
            .chosen()
            .and_then(|name| report.column_stats(name))
        {
            Some(stats) => {
                let (verdict, color) = if stats.is_compliant() {
                    ("Benford-compliant", iced::Color::from_rgb(0.4, 0.9, 0.4))
                } else {
                    ("not compliant", iced::Color::from_rgb(0.95, 0.4, 0.4))
                };
                text(format!(
                    "score {:.4} | {}",
                    stats.benford_p_value * 100.0,
                    verdict
                ))
                .size(14)
                .color(color)
                .into()
            }
            None => text("Select a column to chart it.")
                .size(13)
                .color(iced::Color::from_rgb(0.6, 0.6, 0.6))
                .into(),
        };

        column![
            text("Columns").size(16),
            text(summary_line).size(13),
            row![picker, badge].spacing(10).align_y(Center),
        ]
        .spacing(8)
        .into()
    }

    fn view_chart(&self) -> Element<'_, Message> {
        let mut rows: Vec<Element<'_, Message>> = Vec::new();
        rows.push(
            row![
                text("Digit").size(12).width(40),
                text("Expected (Benford)").size(12).width(Fill),
                text("").size(12).width(44),
                text("Observed").size(12).width(Fill),
                text("").size(12).width(44),
            ]
            .spacing(10)
            .into(),
        );
        rows.push(rule::horizontal(1).into());

        for (i, expected) in BENFORD_EXPECTED.iter().enumerate() {
            let observed = self.chart.observed.map(|series| series[i]);
            let observed_text = observed
                .map(|v| format!("{:>5.1}", v))
                .unwrap_or_else(|| "   --".to_string());
            rows.push(
                row![
                    text(format!("{}", i + 1))
                        .size(13)
                        .font(iced::Font::MONOSPACE)
                        .width(40),
                    progress_bar(0.0..=CHART_FULL_SCALE, *expected as f32),
                    text(format!("{:>5.1}", expected))
                        .size(12)
                        .font(iced::Font::MONOSPACE)
                        .width(44),
                    progress_bar(0.0..=CHART_FULL_SCALE, observed.unwrap_or(0.0) as f32),
                    text(observed_text)
                        .size(12)
                        .font(iced::Font::MONOSPACE)
                        .width(44),
                ]
                .spacing(10)
                .align_y(Center)
                .into(),
            );
        }

        column![
            text("Leading-digit distribution").size(16),
            column(rows).spacing(4),
        ]
        .spacing(8)
        .into()
    }
}

// ============================================================================
// Config persistence
// ============================================================================

/// Get the config file path: ~/.benford-workbench.conf
fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".benford-workbench.conf"))
}

/// Load the server URL from the config file, with a localhost default.
fn load_config() -> String {
    let path = match config_path() {
        Some(p) => p,
        None => return DEFAULT_SERVER.to_string(),
    };
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return DEFAULT_SERVER.to_string(),
    };

    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "server_url" && !value.trim().is_empty() {
                return value.trim().to_string();
            }
        }
    }
    DEFAULT_SERVER.to_string()
}

/// Save the server URL to the config file.
fn save_config(server_url: &str) {
    if let Some(path) = config_path() {
        let _ = std::fs::write(&path, format!("server_url={}\n", server_url));
    }
}
