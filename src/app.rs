// 🌱 Application Context
//
// Wires the session, the locale catalog and the configuration together.
// Locale and session state live here and are passed by reference to the
// components that need them.

use crate::config::AppConfig;
use crate::entities::{Role, User};
use crate::error::{AuthError, LocaleError};
use crate::inference::InferenceBackend;
use crate::locale::{Locale, LocaleCatalog};
use crate::navigation::{default_navigation, visible_sections, NavGroup};
use crate::session::{AuthBackend, DemoAuthenticator, SessionState};
use crate::workflow::DiagnosisWorkflow;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    config: AppConfig,
    session: SessionState,
    catalog: LocaleCatalog,
}

impl AppContext {
    /// Build from config with the demo authenticator and nobody signed in
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_auth(config, Arc::new(DemoAuthenticator))
    }

    pub fn with_auth(config: AppConfig, auth: Arc<dyn AuthBackend>) -> Result<Self> {
        config.validate()?;

        let mut catalog = LocaleCatalog::new().with_locale(config.default_locale);
        if let Some(path) = &config.catalog_overrides {
            catalog = catalog.with_overrides_from_file(path)?;
        }

        info!(locale = %catalog.locale(), "application context ready");

        Ok(AppContext {
            config,
            session: SessionState::anonymous(auth),
            catalog,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        self.session.login(email, password)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn current_role(&self) -> Option<Role> {
        self.session.role()
    }

    pub fn display_name(&self) -> String {
        self.session.display_name(&self.catalog)
    }

    pub fn locale(&self) -> Locale {
        self.catalog.locale()
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.catalog.set_locale(locale);
    }

    pub fn set_locale_code(&mut self, code: &str) -> Result<(), LocaleError> {
        self.catalog.set_locale_code(code)
    }

    pub fn translate(&self, key: &str) -> String {
        self.catalog.translate(key)
    }

    /// Navigation visible to the current user, translated into the active locale
    pub fn navigation(&self) -> Vec<NavGroup> {
        visible_sections(&default_navigation(), self.session.role(), &self.catalog)
    }

    pub fn new_workflow(&self, backend: Arc<dyn InferenceBackend>) -> DiagnosisWorkflow {
        DiagnosisWorkflow::new(backend, self.config.workflow_settings())
    }
}
