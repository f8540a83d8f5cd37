// 🧭 Navigation Access Filter - role-gated sidebar entries
//
// Each entry carries the full set of roles allowed to see it. Visibility is a
// lookup against that set; entries keep their static order.

use crate::entities::Role;
use crate::locale::LocaleCatalog;
use serde::Serialize;

// ============================================================================
// NAVIGATION ITEMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavSection {
    Main,
    Administration,
}

impl NavSection {
    /// Catalog key for the section heading
    pub fn heading_key(&self) -> &'static str {
        match self {
            NavSection::Main => "navigation",
            NavSection::Administration => "administration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem {
    pub path: &'static str,
    pub label_key: &'static str,
    pub allowed_roles: &'static [Role],
    pub section: NavSection,
}

impl NavigationItem {
    pub const fn new(
        path: &'static str,
        label_key: &'static str,
        allowed_roles: &'static [Role],
        section: NavSection,
    ) -> Self {
        NavigationItem {
            path,
            label_key,
            allowed_roles,
            section,
        }
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

const EVERYONE: &[Role] = &[Role::Farmer, Role::Agronomist, Role::Extension, Role::Admin];
const STAFF: &[Role] = &[Role::Agronomist, Role::Extension, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];

const DEFAULT_NAVIGATION: [NavigationItem; 9] = [
    NavigationItem::new("/", "dashboard", EVERYONE, NavSection::Main),
    NavigationItem::new("/diagnose", "diagnose", EVERYONE, NavSection::Main),
    NavigationItem::new("/history", "history", EVERYONE, NavSection::Main),
    NavigationItem::new("/analytics", "analytics", STAFF, NavSection::Main),
    NavigationItem::new("/recommendations", "recommendations", EVERYONE, NavSection::Main),
    NavigationItem::new("/reports", "reports", STAFF, NavSection::Main),
    NavigationItem::new("/admin/users", "manage_users", ADMIN_ONLY, NavSection::Administration),
    NavigationItem::new("/admin/ai-models", "ai_models", ADMIN_ONLY, NavSection::Administration),
    NavigationItem::new("/admin/settings", "system_settings", ADMIN_ONLY, NavSection::Administration),
];

/// The application's static sidebar, in display order
pub fn default_navigation() -> Vec<NavigationItem> {
    DEFAULT_NAVIGATION.to_vec()
}

// ============================================================================
// FILTER
// ============================================================================

/// Items visible to `role`, order preserved. A missing role is treated as
/// `Farmer`, so it never widens visibility.
pub fn filter_visible(items: &[NavigationItem], role: Option<Role>) -> Vec<NavigationItem> {
    let role = Role::effective(role);

    items
        .iter()
        .filter(|item| item.is_visible_to(role))
        .cloned()
        .collect()
}

/// A translated, visible entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub path: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavGroup {
    pub section: NavSection,
    pub heading: String,
    pub entries: Vec<NavEntry>,
}

/// Visible items grouped under translated section headings.
/// Sections with no visible entry are left out.
pub fn visible_sections(
    items: &[NavigationItem],
    role: Option<Role>,
    catalog: &LocaleCatalog,
) -> Vec<NavGroup> {
    let visible = filter_visible(items, role);
    let mut groups: Vec<NavGroup> = Vec::new();

    for section in [NavSection::Main, NavSection::Administration] {
        let entries: Vec<NavEntry> = visible
            .iter()
            .filter(|item| item.section == section)
            .map(|item| NavEntry {
                path: item.path,
                label: catalog.translate(item.label_key),
            })
            .collect();

        if !entries.is_empty() {
            groups.push(NavGroup {
                section,
                heading: catalog.translate(section.heading_key()),
                entries,
            });
        }
    }

    groups
}
