//! Home page route handler.
//!
//! Renders the catalog shell: navbar, cart drawer and a loading catalog
//! that lazy-loads `/catalog`. While the page is open it polls
//! `/session/check` at the configured interval.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use mercado_core::{CategoryFilter, Translator};
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use super::catalog::CatalogView;
use crate::error::Result;
use crate::middleware::{Locale, RequireToken};
use crate::models::session::cart_id;
use crate::services::catalog::CatalogState;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub t: Translator,
    pub layout: Layout,
    /// Initial cart badge value.
    pub count: usize,
    /// Session guard poll interval; `None` disables polling.
    pub poll_ms: Option<u128>,
    pub catalog: CatalogView,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    RequireToken(_): RequireToken,
    session: Session,
    Locale(t): Locale,
) -> Result<HomeTemplate> {
    let count = state.carts().count(cart_id(&session).await?).await;
    let catalog = CatalogView::new(&CatalogState::Loading, &CategoryFilter::All, "", &t);

    Ok(HomeTemplate {
        layout: Layout::new(t.language(), "/home"),
        t,
        count,
        poll_ms: state.config().guard.poll_millis(),
        catalog,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use mercado_core::Language;

    use super::*;
    use crate::i18n::load_catalog;

    fn template(poll_ms: Option<u128>) -> HomeTemplate {
        let t = Translator::new(Arc::new(load_catalog().unwrap()), Language::Es);
        HomeTemplate {
            layout: Layout::new(t.language(), "/home"),
            catalog: CatalogView::new(&CatalogState::Loading, &CategoryFilter::All, "", &t),
            t,
            count: 2,
            poll_ms,
        }
    }

    #[test]
    fn test_shell_lazy_loads_catalog() {
        let html = template(None).render().unwrap();
        assert!(html.contains("<html lang=\"es\">"));
        assert!(html.contains("hx-get=\"/catalog\""));
        assert!(html.contains("hx-get=\"/cart\""));
        assert!(html.contains(">2</span>"));
        assert!(!html.contains("/session/check"));
    }

    #[test]
    fn test_shell_polls_session_when_configured() {
        let html = template(Some(2000)).render().unwrap();
        assert!(html.contains("hx-get=\"/session/check\""));
        assert!(html.contains("every 2000ms"));
    }
}
