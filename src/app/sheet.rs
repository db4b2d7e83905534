use crate::config::StickerTab;
use tracing::debug;

/// The sticker picker: a sheet with tabbed categories
#[derive(Debug, Clone)]
pub struct StickerSheet {
    tabs: Vec<StickerTab>,
    open: bool,
    active_tab: usize,
}

impl StickerSheet {
    pub fn new(tabs: Vec<StickerTab>) -> Self {
        Self {
            tabs,
            open: false,
            active_tab: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open on the last active tab (the first one initially)
    pub fn open(&mut self) {
        self.open = true;
        debug!(
            "Sticker sheet opened on tab {:?}",
            self.active_tab().map(|t| t.name.as_str())
        );
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Returns the new open state
    pub fn toggle(&mut self) -> bool {
        if self.open {
            self.close();
        } else {
            self.open();
        }
        self.open
    }

    pub fn tabs(&self) -> &[StickerTab] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&StickerTab> {
        self.tabs.get(self.active_tab)
    }

    /// Switch tabs by name. Returns false for an unknown tab.
    pub fn activate_tab(&mut self, name: &str) -> bool {
        match self.tabs.iter().position(|t| t.name == name) {
            Some(index) => {
                self.active_tab = index;
                true
            }
            None => false,
        }
    }

    /// Image path of the `index`-th sticker on the active tab
    pub fn sticker_path(&self, index: usize) -> Option<&str> {
        self.active_tab()
            .and_then(|tab| tab.images.get(index))
            .map(String::as_str)
    }
}
