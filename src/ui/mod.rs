//! UI components of the markdown viewer

pub mod control_panel;
pub mod convert;
pub mod editor;
pub mod home;
pub mod preview;
pub mod theme;
pub mod toast;
