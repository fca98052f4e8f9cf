//! Static-site blog targets

mod hugo;

pub use hugo::{HugoPublisher, HugoSettings};
