//! Platform key -> publisher lookup

use crate::ports::Publisher;

/// Social publishers selected by platform key, in registration order
#[derive(Default)]
pub struct PublisherRegistry {
    publishers: Vec<Box<dyn Publisher>>,
}

impl PublisherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a publisher, replacing any already registered for the same platform
    pub fn register(&mut self, publisher: Box<dyn Publisher>) {
        let platform = publisher.platform().to_string();
        self.publishers.retain(|p| p.platform() != platform);
        self.publishers.push(publisher);
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.publishers.iter().any(|p| p.platform() == platform)
    }

    pub fn get(&self, platform: &str) -> Option<&dyn Publisher> {
        self.publishers
            .iter()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, platform: &str) -> Option<&mut (dyn Publisher + 'static)> {
        self.publishers
            .iter_mut()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_mut())
    }

    /// Registered platform keys
    pub fn platforms(&self) -> Vec<&str> {
        self.publishers.iter().map(|p| p.platform()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}
