/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Lifecycle events and the worker -> UI channel (events.rs)
/// - UI-side state and the event poller (poller.rs)
/// - Input selection and output folders (selection.rs)
/// - Encoder settings persisted as JSON (settings.rs)

pub mod data;
pub mod events;
pub mod poller;
pub mod selection;
pub mod settings;
