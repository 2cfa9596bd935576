//! Instance resolution from incoming HTTP requests.
//!
//! Callers may carry the instance id in three places, checked in order:
//!
//! 1. the path segment immediately after the `mcp` segment
//! 2. the `instance_id` query parameter (legacy alias `id`)
//! 3. the `X-MCP-Instance-ID` header
//!
//! The first non-empty candidate wins; later carriers are not consulted.

use crate::constants::{
    INSTANCE_ID_HEADER, INSTANCE_ID_PARAM, INSTANCE_ID_PARAM_ALIAS, INSTANCE_PATH_MARKER,
};
use crate::error::ServerError;
use crate::registry::{Instance, InstanceRegistry};
use axum::extract::OriginalUri;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::debug;

/// Extract the instance id from the request surface, if any carrier holds
/// one.
pub fn extract_instance_id(
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Option<String> {
    if let Some(id) = id_from_path(path) {
        return Some(id);
    }

    if let Some(query) = query {
        if let Some(id) = id_from_query(query) {
            return Some(id);
        }
    }

    headers
        .get(INSTANCE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The path segment immediately following the `mcp` segment, when present
/// and non-empty.
fn id_from_path(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());

    while let Some(segment) = segments.next() {
        if segment == INSTANCE_PATH_MARKER {
            return segments.next().map(str::to_string);
        }
    }

    None
}

/// The `instance_id` (or `id`) query parameter, when present and non-empty.
///
/// Values are taken verbatim, without percent-decoding: instance ids are
/// generated uuids and never contain reserved characters.
fn id_from_query(query: &str) -> Option<String> {
    let mut fallback = None;

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if value.is_empty() {
            continue;
        }
        if key == INSTANCE_ID_PARAM {
            return Some(value.to_string());
        }
        if key == INSTANCE_ID_PARAM_ALIAS && fallback.is_none() {
            fallback = Some(value.to_string());
        }
    }

    fallback
}

/// Extract the instance id from HTTP request parts.
///
/// The original URI extension is preferred because service nesting strips
/// the mount prefix from `parts.uri`, which would hide the path segment.
pub fn instance_id_from_parts(parts: &Parts) -> Option<String> {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);

    extract_instance_id(uri.path(), uri.query(), &parts.headers)
}

/// Resolves instance records for incoming requests.
pub struct InstanceResolver {
    registry: Arc<InstanceRegistry>,
}

impl InstanceResolver {
    pub fn new(registry: Arc<InstanceRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve the instance addressed by a request.
    ///
    /// A request carrying no id and a request carrying an unknown id are
    /// distinct failures, so callers can report them differently.
    pub fn resolve_parts(&self, parts: &Parts) -> Result<Instance, ServerError> {
        let id = instance_id_from_parts(parts)
            .ok_or_else(|| ServerError::invalid_input("No instance_id found in request"))?;

        debug!("Resolving instance {}", id);

        self.registry
            .find(&id)?
            .ok_or_else(|| ServerError::instance_not_found(&id))
    }
}
