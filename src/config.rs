use std::path::PathBuf;

use crate::metrics::TOTAL_FEE;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::session::Viewer;
use crate::views::{Layout, ViewConfig};

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Registration export; the built-in sample is used when unset.
    pub data_path: Option<PathBuf>,
    pub ledger_path: Option<PathBuf>,
    pub page_size: usize,
    pub total_fee: u64,
    pub columns: u16,
    pub color: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            ledger_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            total_fee: TOTAL_FEE,
            columns: 120,
            color: false,
        }
    }
}

impl DashboardConfig {
    pub fn layout(&self) -> Layout {
        Layout::for_width(self.columns)
    }

    pub fn view_config(&self, viewer: Viewer) -> ViewConfig {
        let base = match viewer {
            Viewer::Admin => ViewConfig::admin(self.total_fee),
            Viewer::Student(_) => ViewConfig::student(self.total_fee),
        };
        base.with_color(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::ContactChannel;

    #[test]
    fn defaults_match_programme() {
        let config = DashboardConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.total_fee, 36_696);
        assert_eq!(config.layout(), Layout::Table);
    }

    #[test]
    fn narrow_terminal_uses_cards() {
        let config = DashboardConfig {
            columns: 60,
            ..DashboardConfig::default()
        };
        assert_eq!(config.layout(), Layout::Cards);
    }

    #[test]
    fn viewer_picks_preset() {
        let config = DashboardConfig {
            color: true,
            ..DashboardConfig::default()
        };
        let admin = config.view_config(Viewer::Admin);
        assert!(admin.contacts.contains(&ContactChannel::Phone));
        assert!(admin.color);
        let student = config.view_config(Viewer::Student(0));
        assert!(!student.contacts.contains(&ContactChannel::Phone));
    }
}
