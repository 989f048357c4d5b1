//! AI insight route.
//!
//! Always answers 200 with an HTML fragment; when the data fetch or the
//! model call fails, the fragment is the canned fallback. See
//! `crate::services::insight` for the failure contract.

use axum::extract::State;
use axum::response::Html;
use axum::routing::post;
use axum::Router;
use tracing::warn;

use crate::routes::AppState;
use crate::services::insight::FALLBACK_INSIGHT;

/// Build the insight router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/insights", post(generate))
}

/// Generates a sales insight from recent sales and the current catalog.
async fn generate(State(state): State<AppState>) -> Html<String> {
    let sales = match state.db.sales().list().await {
        Ok(sales) => sales,
        Err(err) => {
            warn!("Insight data fetch failed: {}", err);
            return Html(FALLBACK_INSIGHT.to_string());
        }
    };
    let products = match state.db.products().list().await {
        Ok(products) => products,
        Err(err) => {
            warn!("Insight data fetch failed: {}", err);
            return Html(FALLBACK_INSIGHT.to_string());
        }
    };

    Html(state.insights.generate(&sales, &products).await)
}
