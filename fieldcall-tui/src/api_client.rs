//! PostgREST client for the external store and its auth endpoint.

use crate::config::TuiConfig;
use crate::wire::{
    CadenceSettingPatch, CadenceSettingRow, LocationRow, NewVisitRow, PostgrestError,
    TargetOverridePatch, TargetRow, VisitRow,
};
use async_trait::async_trait;
use fieldcall_core::{
    CadenceSetting, CadenceSettingId, Location, LocationId, NewVisit, StoreError, StoreOp, Target,
    TargetId, Visit, VisitRecord,
};
use fieldcall_storage::{
    AuthGateway, CadenceSettingUpdate, DataStore, LocationQuery, TargetOrder, TargetOverrideUpdate,
    TargetQuery, TargetSource, VisitQuery,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

const LOCATIONS: &str = "dispensaries";
const TARGETS: &str = "target_dispensaries";
const AVAILABLE_TARGETS: &str = "available_targets";
const DUE_TARGETS: &str = "due_targets";
const VISITS: &str = "visits";
const CADENCE_SETTINGS: &str = "visit_cadence_settings";
const RPC_REFRESH_DUE_DATES: &str = "update_all_next_due_dates";
const RPC_MATCH_LOCATIONS: &str = "match_target_dispensaries";

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unexpected response ({status}): {message}")]
    InvalidResponse { status: u16, message: String },
    #[error("Config error: {0}")]
    Config(String),
}

impl ApiClientError {
    /// Tag a transport failure with the store operation that hit it.
    pub fn into_store_error(self, op: StoreOp) -> StoreError {
        match self {
            ApiClientError::Http(err) if err.is_timeout() => StoreError::Request {
                op,
                reason: "request timed out".to_string(),
            },
            ApiClientError::Http(err) if err.is_decode() => StoreError::Decode {
                op,
                reason: err.to_string(),
            },
            ApiClientError::Http(err) => StoreError::Request {
                op,
                reason: err.to_string(),
            },
            ApiClientError::Serde(err) => StoreError::Decode {
                op,
                reason: err.to_string(),
            },
            ApiClientError::InvalidResponse { status, message } => StoreError::Rejected {
                op,
                status,
                message,
            },
            ApiClientError::Config(reason) => StoreError::Unexpected { op, reason },
        }
    }
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let token = config
            .auth
            .access_token
            .as_deref()
            .unwrap_or(&config.auth.anon_key);
        let headers = build_auth_headers(&config.auth.anon_key, token)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn rest_url(&self, relation: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, relation)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        relation: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiClientError> {
        let response = self
            .client
            .get(self.rest_url(relation))
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await?;
        parse_response(response).await
    }

    async fn post_returning<T, B>(&self, relation: &str, body: &B) -> Result<Vec<T>, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.rest_url(relation))
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        parse_response(response).await
    }

    /// PATCH the rows matching `params`. Returns how many rows changed.
    async fn patch_returning<B>(
        &self,
        relation: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<usize, ApiClientError>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .patch(self.rest_url(relation))
            .headers(self.headers.clone())
            .header("Prefer", "return=representation")
            .query(params)
            .json(body)
            .send()
            .await?;
        let rows: Vec<Value> = parse_response(response).await?;
        Ok(rows.len())
    }

    async fn rpc(&self, function: &str) -> Result<Value, ApiClientError> {
        let response = self
            .client
            .post(self.rest_url(&format!("rpc/{}", function)))
            .headers(self.headers.clone())
            .json(&serde_json::json!({}))
            .send()
            .await?;
        parse_response(response).await
    }
}

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

/// `ilike` filter on the display name. PostgREST wildcards typed by the user
/// are dropped so the pattern stays a plain substring match.
pub fn location_params(query: &LocationQuery) -> Vec<(&'static str, String)> {
    let needle: String = query
        .name_contains
        .trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%'))
        .collect();
    vec![
        ("select", "*".to_string()),
        ("Survey_Display_Name", format!("ilike.*{}*", needle)),
        ("limit", query.limit.to_string()),
    ]
}

/// Relation and parameters for a target query.
pub fn target_params(query: &TargetQuery) -> (&'static str, Vec<(&'static str, String)>) {
    let relation = match query.source {
        TargetSource::Available => AVAILABLE_TARGETS,
        TargetSource::DueOnly => DUE_TARGETS,
    };
    let mut params = vec![("select", "*".to_string())];
    if query.matched_only {
        params.push(("dispensary_id", "not.is.null".to_string()));
    }
    if query.custom_cadence_only {
        params.push(("custom_cadence_days", "not.is.null".to_string()));
    }
    let order = match query.order {
        TargetOrder::PriorityDesc => "priority_score.desc",
        TargetOrder::NameAsc => "dispensary_name.asc",
    };
    params.push(("order", order.to_string()));
    params.push(("limit", query.limit.to_string()));
    (relation, params)
}

pub fn visit_params(query: &VisitQuery) -> Vec<(&'static str, String)> {
    vec![
        (
            "select",
            "*,dispensaries(survey_display_name,hoodie_id)".to_string(),
        ),
        ("rep_email", format!("eq.{}", query.rep_email)),
        ("order", "visit_timestamp.desc".to_string()),
        ("limit", query.limit.to_string()),
    ]
}

fn id_param(id: impl std::fmt::Display) -> Vec<(&'static str, String)> {
    vec![("id", format!("eq.{}", id))]
}

// ============================================================================
// STORE IMPLEMENTATION
// ============================================================================

#[async_trait]
impl DataStore for RestClient {
    async fn query_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, StoreError> {
        let op = StoreOp::QueryLocations;
        let started = Instant::now();
        let rows: Vec<LocationRow> = self
            .get_rows(LOCATIONS, &location_params(query))
            .await
            .map_err(|e| e.into_store_error(op))?;
        let locations: Vec<Location> = rows.into_iter().filter_map(LocationRow::into_location).collect();
        tracing::debug!(
            op = %op,
            results = locations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Location search finished"
        );
        Ok(locations)
    }

    async fn get_location(&self, id: LocationId) -> Result<Location, StoreError> {
        let op = StoreOp::GetLocation;
        let mut params = vec![("select", "*".to_string())];
        params.extend(id_param(id));
        let rows: Vec<LocationRow> = self
            .get_rows(LOCATIONS, &params)
            .await
            .map_err(|e| e.into_store_error(op))?;
        rows.into_iter()
            .find_map(LocationRow::into_location)
            .ok_or_else(|| StoreError::NotFound {
                op,
                id: id.to_string(),
            })
    }

    async fn query_targets(&self, query: &TargetQuery) -> Result<Vec<Target>, StoreError> {
        let op = StoreOp::QueryTargets;
        let (relation, params) = target_params(query);
        let rows: Vec<TargetRow> = self
            .get_rows(relation, &params)
            .await
            .map_err(|e| e.into_store_error(op))?;
        let targets: Vec<Target> = rows.into_iter().filter_map(TargetRow::into_target).collect();
        tracing::debug!(op = %op, relation, results = targets.len(), "Targets loaded");
        Ok(targets)
    }

    async fn insert_visit(&self, visit: &NewVisit) -> Result<Visit, StoreError> {
        let op = StoreOp::InsertVisit;
        let rows: Vec<VisitRow> = self
            .post_returning(VISITS, &NewVisitRow::from(visit))
            .await
            .map_err(|e| e.into_store_error(op))?;
        let stored = rows
            .into_iter()
            .find_map(VisitRow::into_visit)
            .ok_or_else(|| StoreError::Decode {
                op,
                reason: "store returned no visit row".to_string(),
            })?;
        tracing::info!(
            op = %op,
            visit_id = %stored.visit_id,
            location_id = %stored.location_id,
            "Visit recorded"
        );
        Ok(stored)
    }

    async fn query_visits(&self, query: &VisitQuery) -> Result<Vec<VisitRecord>, StoreError> {
        let op = StoreOp::QueryVisits;
        let rows: Vec<VisitRow> = self
            .get_rows(VISITS, &visit_params(query))
            .await
            .map_err(|e| e.into_store_error(op))?;
        Ok(rows.into_iter().filter_map(VisitRow::into_record).collect())
    }

    async fn get_cadence_settings(&self) -> Result<Vec<CadenceSetting>, StoreError> {
        let op = StoreOp::GetCadenceSettings;
        let params = [
            ("select", "*".to_string()),
            ("order", "target_tier".to_string()),
        ];
        let rows: Vec<CadenceSettingRow> = self
            .get_rows(CADENCE_SETTINGS, &params)
            .await
            .map_err(|e| e.into_store_error(op))?;
        Ok(rows
            .into_iter()
            .filter_map(CadenceSettingRow::into_setting)
            .collect())
    }

    async fn update_cadence_setting(
        &self,
        id: CadenceSettingId,
        update: &CadenceSettingUpdate,
    ) -> Result<(), StoreError> {
        let op = StoreOp::UpdateCadenceSetting;
        let body = CadenceSettingPatch {
            default_cadence_days: update.default_cadence_days,
            updated_at: update.updated_at,
        };
        let changed = self
            .patch_returning(CADENCE_SETTINGS, &id_param(id), &body)
            .await
            .map_err(|e| e.into_store_error(op))?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                op,
                id: id.to_string(),
            });
        }
        tracing::info!(op = %op, setting_id = %id, days = update.default_cadence_days, "Cadence setting updated");
        Ok(())
    }

    async fn update_target_override(
        &self,
        id: TargetId,
        update: &TargetOverrideUpdate,
    ) -> Result<(), StoreError> {
        let op = StoreOp::UpdateTargetOverride;
        let body = TargetOverridePatch {
            custom_cadence_days: update.custom_cadence_days,
            visit_notes: update.visit_notes.clone(),
        };
        let changed = self
            .patch_returning(TARGETS, &id_param(id), &body)
            .await
            .map_err(|e| e.into_store_error(op))?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                op,
                id: id.to_string(),
            });
        }
        tracing::info!(
            op = %op,
            target_id = %id,
            custom_days = ?update.custom_cadence_days,
            "Target override updated"
        );
        Ok(())
    }

    async fn refresh_due_dates(&self) -> Result<u64, StoreError> {
        let op = StoreOp::RefreshDueDates;
        let value = self
            .rpc(RPC_REFRESH_DUE_DATES)
            .await
            .map_err(|e| e.into_store_error(op))?;
        rpc_count(op, &value)
    }

    async fn match_locations(&self) -> Result<u64, StoreError> {
        let op = StoreOp::MatchLocations;
        let value = self
            .rpc(RPC_MATCH_LOCATIONS)
            .await
            .map_err(|e| e.into_store_error(op))?;
        rpc_count(op, &value)
    }
}

#[async_trait]
impl AuthGateway for RestClient {
    async fn sign_out(&self) -> Result<(), StoreError> {
        let op = StoreOp::SignOut;
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| ApiClientError::from(e).into_store_error(op))?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(op = %op, "Signed out");
            return Ok(());
        }
        let text = response
            .text()
            .await
            .map_err(|e| ApiClientError::from(e).into_store_error(op))?;
        Err(error_from_body(status.as_u16(), &text).into_store_error(op))
    }
}

// ============================================================================
// RESPONSE HANDLING
// ============================================================================

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiClientError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &text));
    }
    let body = if text.trim().is_empty() { "null" } else { text.as_str() };
    Ok(serde_json::from_str(body)?)
}

fn error_from_body(status: u16, text: &str) -> ApiClientError {
    let message = serde_json::from_str::<PostgrestError>(text)
        .ok()
        .and_then(|e| e.describe())
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                text.trim().to_string()
            }
        });
    ApiClientError::InvalidResponse { status, message }
}

/// RPCs return a bare integer, sometimes wrapped as a string.
fn rpc_count(op: StoreOp, value: &Value) -> Result<u64, StoreError> {
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null => Some(0),
        _ => None,
    };
    count.ok_or_else(|| StoreError::Decode {
        op,
        reason: format!("expected a row count, got {}", value),
    })
}

fn build_auth_headers(anon_key: &str, token: &str) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("apikey"),
        HeaderValue::from_str(anon_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
    );
    let bearer = format!("Bearer {}", token);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&bearer).map_err(|e| ApiClientError::Config(e.to_string()))?,
    );
    Ok(headers)
}
