// Icon loader module for resolving midlet icons from installed app folders

pub mod icon_loader;

pub use icon_loader::{FsIconProvider, IconProvider};
