use crate::{errors::DohError, state::AppState};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use ferrous_doh_domain::{accepts_doh, ResolveParams, DOH_CONTENT_TYPE};
use tracing::{debug, instrument};

#[instrument(skip_all, name = "doh_resolve")]
pub async fn resolve_doh_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ResolveParams>, QueryRejection>,
) -> Result<Response, DohError> {
    let accept = headers
        .get(header::ACCEPT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    if !accepts_doh(accept.as_deref()) {
        return Err(DohError::UnsupportedContentType(accept.unwrap_or_default()));
    }

    let Query(params) = params.map_err(|e| DohError::MalformedParameters(e.body_text()))?;

    let answer = state.resolve.execute(&params).await?;

    debug!(
        bytes = answer.bytes.len(),
        cache_hit = answer.cache_hit,
        "Sending DoH answer"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, DOH_CONTENT_TYPE)],
        answer.bytes,
    )
        .into_response())
}
