//! Home page: every pad, rendered through `home.html`.

use axum::extract::State;
use axum::response::Html;
use faser_db::models::pad::Pads;
use faser_db::repositories::PadRepo;
use tera::{Context, Tera};

use crate::error::AppResult;
use crate::middleware::transaction::Tx;
use crate::state::AppState;

/// GET /
pub async fn index(State(state): State<AppState>, tx: Tx) -> AppResult<Html<String>> {
    let pads = {
        let mut guard = tx.lock().await;
        let rows = PadRepo::all(guard.conn()?).await?;
        Pads::from(rows)
    };
    tracing::debug!(count = pads.len(), "Loaded pads for home page");

    let body = render_home(&state.templates, &pads)?;
    Ok(Html(body))
}

/// Render `home.html` with the pads available as `pads`.
pub fn render_home(templates: &Tera, pads: &Pads) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("pads", pads);
    templates.render("home.html", &context)
}
