use iced::widget::{button, column, horizontal_rule, progress_bar, row, scrollable, text, Column};
use iced::{Alignment, Element, Length};

use crate::state::poller::AppState;
use crate::Message;

/// Selection buttons, disabled while a batch is running
pub fn selection_bar(state: &AppState) -> Element<'_, Message> {
    let idle = !state.running;

    column![
        text("Choose how you want to compress:").size(18),
        row![
            button("Select Files")
                .on_press_maybe(idle.then_some(Message::SelectFiles))
                .padding(10)
                .width(180),
            button("Select Folder")
                .on_press_maybe(idle.then_some(Message::SelectFolder))
                .padding(10)
                .width(180),
        ]
        .spacing(16),
    ]
    .spacing(10)
    .align_x(Alignment::Center)
    .width(Length::Fill)
    .into()
}

/// Current file and overall progress bars with their labels
pub fn progress_panel(state: &AppState) -> Element<'_, Message> {
    column![
        text(state.current_file_label()),
        text(state.duration_label()).size(13),
        progress_bar(0.0..=100.0, state.file_percent as f32).height(14),
        text(state.file_progress_label()),
        progress_bar(0.0..=100.0, state.batch.overall_percent() as f32).height(14),
        text(state.overall_label()),
    ]
    .spacing(6)
    .into()
}

/// Scrolling read-only log
pub fn log_panel(state: &AppState) -> Element<'_, Message> {
    let lines: Column<Message> = state
        .log
        .iter()
        .fold(Column::new().spacing(2), |col, line| col.push(text(line).size(13)));

    column![
        text("Log:"),
        horizontal_rule(1),
        scrollable(lines).height(Length::Fill).width(Length::Fill),
    ]
    .spacing(4)
    .height(Length::Fill)
    .into()
}
