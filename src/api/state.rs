use std::sync::Arc;

use handlebars::Handlebars;

use crate::auth::TokenIssuer;
use crate::calendar::{CalendarService, EventSource};
use crate::core::AppConfig;
use crate::google::GoogleCalendar;
use crate::presentation::templates;
use crate::web::{InternalApiClient, SessionStore};

pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenIssuer,
    pub calendar: CalendarService,
    // Web tier sessions, the only state mutated after startup
    pub sessions: SessionStore,
    pub api_client: InternalApiClient,
    pub templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let source = Arc::new(GoogleCalendar::from_config(&config));
        Self::with_event_source(config, source)
    }

    /// State backed by any event source. Tests use this to avoid Google.
    pub fn with_event_source(config: AppConfig, source: Arc<dyn EventSource>) -> Self {
        Self {
            tokens: TokenIssuer::new(&config),
            calendar: CalendarService::new(
                &config.users_config_path,
                source,
                config.batch_concurrency,
            ),
            sessions: SessionStore::new(config.session_validity_minutes),
            api_client: InternalApiClient::new(&config.api_base_url),
            templates: Arc::new(templates()),
            config,
        }
    }
}
