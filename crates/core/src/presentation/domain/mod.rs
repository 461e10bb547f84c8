pub mod display;
pub mod notification;
pub mod result_presenter;
