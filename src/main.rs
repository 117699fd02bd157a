use iced::widget::{column, container, horizontal_rule};
use iced::{Element, Length, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tracing::{error, info, warn};

mod encode;
mod error;
mod logging;
mod state;
mod ui;

use encode::batch::BatchReport;
use error::CompressError;
use state::data::human_mb;
use state::events::{create_event_channel, EventReceiver};
use state::poller::{self, AppState, Notice, NoticeLevel, POLL_INTERVAL};
use state::selection::{Selection, VIDEO_EXTENSIONS};
use state::settings::EncoderSettings;

/// Main application state
struct VideoCompressor {
    /// Everything the window shows
    state: AppState,
    /// Encoder parameters for new batches
    settings: EncoderSettings,
    /// Receiving end of the running batch's event channel
    events: Option<EventReceiver>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked the "Select Files" button
    SelectFiles,
    /// User clicked the "Select Folder" button
    SelectFolder,
    /// Poll timer fired
    Tick,
    /// Background batch worker returned
    BatchFinished(Result<BatchReport, String>),
}

impl VideoCompressor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = EncoderSettings::load();

        // Write the defaults once so they can be edited by hand
        if let Some(path) = EncoderSettings::default_path() {
            if !path.exists() {
                if let Err(e) = settings.save_to(&path) {
                    warn!("⚠️  Could not write {}: {}", path.display(), e);
                }
            }
        }

        info!(
            "🎬 Video Compressor ready ({} -crf {} -preset {})",
            settings.video_codec, settings.crf, settings.preset
        );

        (
            VideoCompressor {
                state: AppState::new(),
                settings,
                events: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectFiles => {
                let picked = FileDialog::new()
                    .set_title("Select Video Files")
                    .add_filter("Video files", VIDEO_EXTENSIONS)
                    .pick_files();

                // Cancelling the picker is a no-op
                match picked.map(|paths| Selection::from_files(&paths)) {
                    Some(Ok(selection)) => self.start_compression(selection),
                    Some(Err(e)) => {
                        self.report_selection_error(e);
                        Task::none()
                    }
                    None => Task::none(),
                }
            }
            Message::SelectFolder => {
                let picked = FileDialog::new()
                    .set_title("Select Folder Containing Videos")
                    .pick_folder();

                match picked.map(|folder| Selection::from_folder(&folder)) {
                    Some(Ok(selection)) => self.start_compression(selection),
                    Some(Err(e)) => {
                        self.report_selection_error(e);
                        Task::none()
                    }
                    None => Task::none(),
                }
            }
            Message::Tick => {
                if let Some(receiver) = self.events.as_mut() {
                    let (notices, closed) = poller::drain(receiver, &mut self.state);
                    if closed {
                        self.events = None;
                    }
                    for notice in notices {
                        show_notice(&notice);
                    }
                }
                Task::none()
            }
            Message::BatchFinished(result) => {
                match result {
                    Ok(report) => info!(
                        "📊 Batch summary: {} of {} processed, {} compressed",
                        report.processed(),
                        report.total,
                        report.succeeded.len()
                    ),
                    Err(e) => error!("❌ Batch aborted: {}", e),
                }
                Task::none()
            }
        }
    }

    /// Launch the background worker for a selection
    fn start_compression(&mut self, selection: Selection) -> Task<Message> {
        let Selection {
            mode,
            files,
            out_dir,
        } = selection;
        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        info!(
            "📂 {:?} selection: {} file(s), {:.2} MB",
            mode,
            files.len(),
            human_mb(total_bytes)
        );

        self.state.begin_batch(files.len(), &out_dir);

        let (sender, receiver) = create_event_channel();
        self.events = Some(receiver);

        Task::perform(
            encode::run_batch_async(files, out_dir, self.settings.clone(), sender),
            Message::BatchFinished,
        )
    }

    /// Pre-batch problems are informational, never fatal
    fn report_selection_error(&mut self, e: CompressError) {
        let notice = match &e {
            CompressError::NoVideosFound { .. } => {
                Notice::info("No Videos", "No video files found in the selected folder.")
            }
            _ => Notice::info("Invalid Selection", e.to_string()),
        };
        warn!("⚠️  {}", e);
        self.state.push_log(e.to_string());
        show_notice(&notice);
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = column![
            ui::panels::selection_bar(&self.state),
            horizontal_rule(1),
            ui::panels::progress_panel(&self.state),
            ui::panels::log_panel(&self.state),
        ]
        .spacing(12)
        .padding(12);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Poll the event channel only while a batch is draining
    fn subscription(&self) -> Subscription<Message> {
        if self.events.is_some() {
            iced::time::every(POLL_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Show a blocking native message box
fn show_notice(notice: &Notice) {
    let level = match notice.level {
        NoticeLevel::Info => MessageLevel::Info,
        NoticeLevel::Error => MessageLevel::Error,
    };

    MessageDialog::new()
        .set_level(level)
        .set_title(notice.title.as_str())
        .set_description(notice.message.as_str())
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn main() -> iced::Result {
    logging::init_logging();

    iced::application(
        "Video Compressor",
        VideoCompressor::update,
        VideoCompressor::view,
    )
    .subscription(VideoCompressor::subscription)
    .theme(VideoCompressor::theme)
    .window_size((560.0, 420.0))
    .centered()
    .run_with(VideoCompressor::new)
}
