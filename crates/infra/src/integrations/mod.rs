//! External service integrations

pub mod calendar;
pub mod monday;

pub use calendar::GoogleCalendarFeed;
pub use monday::MondayBoardClient;
