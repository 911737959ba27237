//! Section switching for the single-page client.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Dashboard,
    Students,
    Add,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Dashboard, Section::Students, Section::Add];

    /// Parse a section id. Ids are matched exactly, as the nav links carry them.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "dashboard" => Some(Self::Dashboard),
            "students" => Some(Self::Students),
            "add" => Some(Self::Add),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Students => "students",
            Self::Add => "add",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Side effect requested by activating a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Reload the record store from the service
    Reload,
    /// Recompute the dashboard from memory
    RefreshDashboard,
    None,
}

#[derive(Debug, Default)]
pub struct Navigator {
    active: Section,
}

impl Navigator {
    pub fn active(&self) -> Section {
        self.active
    }

    /// Make `id` the only active section. Unknown ids change nothing and
    /// return `None`.
    pub fn activate(&mut self, id: &str) -> Option<NavEffect> {
        let section = Section::from_id(id)?;
        self.active = section;
        Some(match section {
            Section::Students => NavEffect::Reload,
            Section::Dashboard => NavEffect::RefreshDashboard,
            Section::Add => NavEffect::None,
        })
    }
}
