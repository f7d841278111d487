//! Live collection feeds over SSE.
//!
//! Clients get a `snapshot` event holding the whole (filtered)
//! collection on connect and again after every committed write to it.
//! Replaying the full state keeps subscribers correct across missed
//! messages; a lagged receiver is handled the same way.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use serde_json::Value;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{collections, DocStore};

/// Collections clients may watch. The customer list stays private.
const SUBSCRIBABLE: &[&str] = &[
    collections::BOOKINGS,
    collections::SERVICES,
    collections::PROMO_CODES,
    collections::PARTNERS,
    collections::PARTNER_CONDITIONS,
    collections::GALLERY,
    collections::UPDATES,
    collections::NOTIFICATIONS,
];

// GET /api/events/:collection — SSE stream
#[derive(Deserialize)]
pub struct EventsQuery {
    pub phone: Option<String>,
    pub partner: Option<String>,
    pub contact: Option<String>,
}

fn snapshot(store: &DocStore, collection: &str, query: &EventsQuery) -> anyhow::Result<Vec<Value>> {
    let mut docs: Vec<Value> = store.list(collection)?;
    if let Some(phone) = query.phone.as_deref() {
        docs.retain(|d| d["phone"].as_str() == Some(phone));
    }
    if let Some(partner) = query.partner.as_deref() {
        docs.retain(|d| d["partner_id"].as_str() == Some(partner));
    }
    if let Some(contact) = query.contact.as_deref() {
        docs.retain(|d| d["contact"].as_str() == Some(contact));
    }
    Ok(docs)
}

fn snapshot_event(
    store: &DocStore,
    collection: &str,
    query: &EventsQuery,
) -> Option<Result<Event, Infallible>> {
    match snapshot(store, collection, query) {
        Ok(docs) => {
            let data = serde_json::to_string(&docs).unwrap_or_default();
            Some(Ok(Event::default().event("snapshot").data(data)))
        }
        Err(e) => {
            tracing::error!(collection, error = %e, "failed to build snapshot");
            None
        }
    }
}

pub async fn collection_stream(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    if !SUBSCRIBABLE.contains(&collection.as_str()) {
        return Err(AppError::NotFound(format!("collection {collection}")));
    }

    let rx = state.store.watch();
    let store = state.store.clone();

    let initial = snapshot_event(&store, &collection, &query);
    let initial_stream = tokio_stream::iter(initial);

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(changed) if changed == collection => snapshot_event(&store, &collection, &query),
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(_)) => {
            snapshot_event(&store, &collection, &query)
        }
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = initial_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
