// 🌍 Locale Catalog - translation lookup with key-as-fallback
//
// Lookups never fail: a key missing from the active locale (or mapped to an
// empty string) resolves to the key itself.

use crate::error::LocaleError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

// ============================================================================
// LOCALE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Hi,
    Sw,
}

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Es, Locale::Hi, Locale::Sw];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Hi => "hi",
            Locale::Sw => "sw",
        }
    }

    /// Name of the language in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
            Locale::Hi => "हिंदी",
            Locale::Sw => "Kiswahili",
        }
    }

    /// Parse a locale code, tolerating case and region tags ("es-MX", "sw_KE")
    pub fn parse(value: &str) -> Result<Locale, LocaleError> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");

        match lang {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            "hi" => Ok(Locale::Hi),
            "sw" => Ok(Locale::Sw),
            _ => Err(LocaleError(value.to_string())),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// CATALOG
// ============================================================================

pub struct LocaleCatalog {
    active: Locale,
    entries: HashMap<Locale, HashMap<String, String>>,
}

impl LocaleCatalog {
    /// Built-in catalogs, English active
    pub fn new() -> Self {
        let mut entries = HashMap::new();

        for locale in Locale::ALL {
            let map = builtin_entries(locale)
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            entries.insert(locale, map);
        }

        LocaleCatalog {
            active: Locale::En,
            entries,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.active = locale;
        self
    }

    /// Merge a JSON override file shaped `{ "<locale>": { "<key>": "<text>" } }`
    pub fn with_overrides_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog overrides: {:?}", path.as_ref()))?;

        let overrides: HashMap<Locale, HashMap<String, String>> = serde_json::from_str(&content)
            .context("Failed to parse catalog overrides JSON")?;

        let mut merged = 0;
        for (locale, map) in overrides {
            merged += map.len();
            self.entries.entry(locale).or_default().extend(map);
        }

        info!(entries = merged, "merged catalog overrides");
        Ok(self)
    }

    pub fn locale(&self) -> Locale {
        self.active
    }

    /// Affects future lookups only
    pub fn set_locale(&mut self, locale: Locale) {
        if locale != self.active {
            info!(from = %self.active, to = %locale, "locale changed");
        }
        self.active = locale;
    }

    pub fn set_locale_code(&mut self, code: &str) -> Result<(), LocaleError> {
        let locale = Locale::parse(code)?;
        self.set_locale(locale);
        Ok(())
    }

    /// Resolve `key` in the active locale, falling back to `key` itself.
    /// The result is empty only for the empty key, which echoes back as "".
    pub fn translate(&self, key: &str) -> String {
        self.translate_in(self.active, key)
    }

    pub fn translate_in(&self, locale: Locale, key: &str) -> String {
        match self
            .entries
            .get(&locale)
            .and_then(|map| map.get(key))
            .filter(|text| !text.is_empty())
        {
            Some(text) => text.clone(),
            None => {
                debug!(locale = %locale, key, "missing translation, using key");
                key.to_string()
            }
        }
    }

    pub fn contains_key(&self, locale: Locale, key: &str) -> bool {
        self.entries
            .get(&locale)
            .map(|map| map.get(key).is_some_and(|text| !text.is_empty()))
            .unwrap_or(false)
    }

    /// English keys with no usable translation in `locale`, sorted
    pub fn missing_keys(&self, locale: Locale) -> Vec<String> {
        let Some(english) = self.entries.get(&Locale::En) else {
            return Vec::new();
        };

        let mut missing: Vec<String> = english
            .keys()
            .filter(|key| !self.contains_key(locale, key))
            .cloned()
            .collect();
        missing.sort();
        missing
    }

    pub fn key_count(&self, locale: Locale) -> usize {
        self.entries.get(&locale).map(|m| m.len()).unwrap_or(0)
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_entries(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => EN_CATALOG,
        Locale::Es => ES_CATALOG,
        Locale::Hi => HI_CATALOG,
        Locale::Sw => SW_CATALOG,
    }
}

// ============================================================================
// BUILT-IN CATALOGS
// ============================================================================

const EN_CATALOG: &[(&str, &str)] = &[
    // Navigation
    ("dashboard", "Dashboard"),
    ("diagnose", "Diagnose Crop"),
    ("history", "Diagnosis History"),
    ("analytics", "Analytics"),
    ("recommendations", "Recommendations"),
    ("reports", "Reports"),
    ("navigation", "Navigation"),
    ("administration", "Administration"),

    // User Management
    ("manage_users", "Manage Users"),
    ("ai_models", "AI Models"),
    ("system_settings", "System Settings"),
    ("profile", "Profile"),
    ("settings", "Settings"),
    ("logout", "Logout"),
    ("guest", "Guest"),

    // Diagnosis
    ("upload_image", "Upload Crop Image"),
    ("take_photo", "Take Photo"),
    ("analyzing", "Analyzing..."),
    ("analysis_complete", "Analysis Complete"),
    ("disease_detected", "Disease Detected"),
    ("healthy_crop", "Healthy Crop"),
    ("severity", "Severity"),
    ("affected_area", "Affected Area"),
    ("confidence", "Confidence"),

    // Common
    ("submit", "Submit"),
    ("cancel", "Cancel"),
    ("save", "Save"),
    ("delete", "Delete"),
    ("edit", "Edit"),
    ("view", "View"),
    ("search", "Search"),
    ("filter", "Filter"),
    ("loading", "Loading..."),
    ("error", "Error"),
    ("success", "Success"),

    // Status
    ("low", "Low"),
    ("medium", "Medium"),
    ("high", "High"),
    ("critical", "Critical"),
];

const ES_CATALOG: &[(&str, &str)] = &[
    // Navigation
    ("dashboard", "Panel de Control"),
    ("diagnose", "Diagnosticar Cultivo"),
    ("history", "Historial de Diagnósticos"),
    ("analytics", "Análisis"),
    ("recommendations", "Recomendaciones"),
    ("reports", "Informes"),
    ("navigation", "Navegación"),
    ("administration", "Administración"),

    // User Management
    ("manage_users", "Gestionar Usuarios"),
    ("ai_models", "Modelos de IA"),
    ("system_settings", "Configuración del Sistema"),
    ("profile", "Perfil"),
    ("settings", "Configuración"),
    ("logout", "Cerrar Sesión"),
    ("guest", "Invitado"),

    // Diagnosis
    ("upload_image", "Subir Imagen del Cultivo"),
    ("take_photo", "Tomar Foto"),
    ("analyzing", "Analizando..."),
    ("analysis_complete", "Análisis Completo"),
    ("disease_detected", "Enfermedad Detectada"),
    ("healthy_crop", "Cultivo Saludable"),
    ("severity", "Severidad"),
    ("affected_area", "Área Afectada"),
    ("confidence", "Confianza"),

    // Common
    ("submit", "Enviar"),
    ("cancel", "Cancelar"),
    ("save", "Guardar"),
    ("delete", "Eliminar"),
    ("edit", "Editar"),
    ("view", "Ver"),
    ("search", "Buscar"),
    ("filter", "Filtrar"),
    ("loading", "Cargando..."),
    ("error", "Error"),
    ("success", "Éxito"),

    // Status
    ("low", "Bajo"),
    ("medium", "Medio"),
    ("high", "Alto"),
    ("critical", "Crítico"),
];

const HI_CATALOG: &[(&str, &str)] = &[
    // Navigation
    ("dashboard", "डैशबोर्ड"),
    ("diagnose", "फसल निदान"),
    ("history", "निदान इतिहास"),
    ("analytics", "विश्लेषण"),
    ("recommendations", "सुझाव"),
    ("reports", "रिपोर्ट"),
    ("navigation", "नेविगेशन"),
    ("administration", "प्रशासन"),

    // User Management
    ("manage_users", "उपयोगकर्ता प्रबंधन"),
    ("ai_models", "एआई मॉडल"),
    ("system_settings", "सिस्टम सेटिंग्स"),
    ("profile", "प्रोफ़ाइल"),
    ("settings", "सेटिंग्स"),
    ("logout", "लॉग आउट"),
    ("guest", "अतिथि"),

    // Diagnosis
    ("upload_image", "फसल छवि अपलोड करें"),
    ("take_photo", "फोटो लें"),
    ("analyzing", "विश्लेषण..."),
    ("analysis_complete", "विश्लेषण पूर्ण"),
    ("disease_detected", "बीमारी का पता चला"),
    ("healthy_crop", "स्वस्थ फसल"),
    ("severity", "गंभीरता"),
    ("affected_area", "प्रभावित क्षेत्र"),
    ("confidence", "विश्वास"),

    // Common
    ("submit", "सबमिट करें"),
    ("cancel", "रद्द करें"),
    ("save", "सहेजें"),
    ("delete", "हटाएं"),
    ("edit", "संपादित करें"),
    ("view", "देखें"),
    ("search", "खोजें"),
    ("filter", "फ़िल्टर"),
    ("loading", "लोड हो रहा है..."),
    ("error", "त्रुटि"),
    ("success", "सफलता"),

    // Status
    ("low", "कम"),
    ("medium", "मध्यम"),
    ("high", "उच्च"),
    ("critical", "गंभीर"),
];

const SW_CATALOG: &[(&str, &str)] = &[
    // Navigation
    ("dashboard", "Dashibodi"),
    ("diagnose", "Chunguza Mazao"),
    ("history", "Historia ya Uchunguzi"),
    ("analytics", "Uchanganuzi"),
    ("recommendations", "Mapendekezo"),
    ("reports", "Ripoti"),
    ("navigation", "Uongozi"),
    ("administration", "Utawala"),

    // User Management
    ("manage_users", "Simamia Watumiaji"),
    ("ai_models", "Mifano ya AI"),
    ("system_settings", "Mipangilio ya Mfumo"),
    ("profile", "Wasifu"),
    ("settings", "Mipangilio"),
    ("logout", "Toka"),
    ("guest", "Mgeni"),

    // Diagnosis
    ("upload_image", "Pakia Picha ya Mazao"),
    ("take_photo", "Piga Picha"),
    ("analyzing", "Inachanganua..."),
    ("analysis_complete", "Uchanganuzi Umekamilika"),
    ("disease_detected", "Ugonjwa Umegunduliwa"),
    ("healthy_crop", "Mazao Mazuri"),
    ("severity", "Ukali"),
    ("affected_area", "Eneo Lililoathiriwa"),
    ("confidence", "Imani"),

    // Common
    ("submit", "Wasilisha"),
    ("cancel", "Ghairi"),
    ("save", "Hifadhi"),
    ("delete", "Futa"),
    ("edit", "Hariri"),
    ("view", "Ona"),
    ("search", "Tafuta"),
    ("filter", "Chuja"),
    ("loading", "Inapakia..."),
    ("error", "Hitilafu"),
    ("success", "Mafanikio"),

    // Status
    ("low", "Chini"),
    ("medium", "Kati"),
    ("high", "Juu"),
    ("critical", "Hatari"),
];

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_dashboard_in_spanish() {
        let mut catalog = LocaleCatalog::new();
        assert_eq!(catalog.translate("dashboard"), "Dashboard");

        catalog.set_locale(Locale::Es);
        assert_eq!(catalog.translate("dashboard"), "Panel de Control");
    }

    #[test]
    fn test_missing_key_returns_key_for_every_locale() {
        let mut catalog = LocaleCatalog::new();

        for locale in Locale::ALL {
            catalog.set_locale(locale);
            assert_eq!(catalog.translate("nonexistent_key"), "nonexistent_key");
        }
    }

    #[test]
    fn test_translate_never_returns_empty() {
        let catalog = LocaleCatalog::new();

        for locale in Locale::ALL {
            for (key, _) in EN_CATALOG {
                assert!(!catalog.translate_in(locale, key).is_empty());
            }
        }
    }

    #[test]
    fn test_empty_key_echoes_empty() {
        let mut catalog = LocaleCatalog::new();

        for locale in Locale::ALL {
            catalog.set_locale(locale);
            assert_eq!(catalog.translate(""), "");
            assert!(!catalog.translate(" ").is_empty());
        }
    }

    #[test]
    fn test_builtin_catalogs_are_complete() {
        let catalog = LocaleCatalog::new();

        for locale in Locale::ALL {
            assert_eq!(catalog.key_count(locale), EN_CATALOG.len());
            assert!(catalog.missing_keys(locale).is_empty(), "{} has gaps", locale);
        }
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!(Locale::parse("es"), Ok(Locale::Es));
        assert_eq!(Locale::parse("es-MX"), Ok(Locale::Es));
        assert_eq!(Locale::parse("SW_ke"), Ok(Locale::Sw));
        assert_eq!(Locale::parse("fr"), Err(LocaleError("fr".to_string())));
        assert!(Locale::parse("").is_err());
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn test_set_locale_code_rejects_unknown() {
        let mut catalog = LocaleCatalog::new().with_locale(Locale::Hi);

        assert!(catalog.set_locale_code("de").is_err());
        assert_eq!(catalog.locale(), Locale::Hi);

        catalog.set_locale_code("sw").unwrap();
        assert_eq!(catalog.translate("logout"), "Toka");
    }

    #[test]
    fn test_past_translations_unaffected() {
        let mut catalog = LocaleCatalog::new();
        let before = catalog.translate("history");

        catalog.set_locale(Locale::Hi);

        assert_eq!(before, "Diagnosis History");
        assert_eq!(catalog.translate("history"), "निदान इतिहास");
    }

    #[test]
    fn test_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"{ "sw": { "reports": "", "weather": "Hali ya Hewa" },
                 "en": { "weather": "Weather" } }"#,
        )
        .unwrap();

        let catalog = LocaleCatalog::new()
            .with_overrides_from_file(&path)
            .unwrap()
            .with_locale(Locale::Sw);

        assert_eq!(catalog.translate("weather"), "Hali ya Hewa");
        // Empty override falls back to the key
        assert_eq!(catalog.translate("reports"), "reports");
        assert_eq!(catalog.missing_keys(Locale::Sw), vec!["reports".to_string()]);
        assert_eq!(catalog.missing_keys(Locale::Es), vec!["weather".to_string()]);
    }

    #[test]
    fn test_overrides_reject_unknown_locale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "fr": { "dashboard": "Tableau de bord" } }"#).unwrap();

        assert!(LocaleCatalog::new().with_overrides_from_file(&path).is_err());
    }
}
