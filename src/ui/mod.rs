/// Window layout pieces
///
/// Each function renders one area of the window from the current `AppState`.

pub mod panels;
