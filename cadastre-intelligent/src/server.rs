//! Serveur HTTP (axum)

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::resolve::{ResolveSettings, Resolver};
use crate::response::{ResolveResponse, ZoneResponse};
use crate::upstream::{ApiCartoClient, BuildingLookup, OverpassClient, ParcelLookup};
use crate::ServiceError;

/// État partagé entre les requêtes
pub struct AppState<P, B> {
    pub resolver: Resolver<P, B>,
    pub zone_default_radius_m: f64,
}

#[derive(Debug, Deserialize)]
pub struct PointParams {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Deserialize)]
pub struct CommuneParams {
    pub code_insee: String,
}

#[derive(Debug, Deserialize)]
pub struct ZoneParams {
    pub lon: f64,
    pub lat: f64,
    pub radius: Option<f64>,
}

/// Routes de l'API
pub fn router<P, B>(state: Arc<AppState<P, B>>) -> Router
where
    P: ParcelLookup + Send + Sync + 'static,
    B: BuildingLookup + Send + Sync + 'static,
{
    Router::new()
        .route("/api/cadastre/parcelle", get(get_parcelle::<P, B>))
        .route("/api/cadastre/parcelles-zone", get(get_parcelles_zone::<P, B>))
        .route("/api/cadastre/commune", get(get_commune::<P, B>))
        .with_state(state)
}

/// Construit les clients amont et sert l'API sur `config.listen_addr`
pub async fn serve(config: &ServiceConfig) -> Result<()> {
    let state = Arc::new(AppState {
        resolver: Resolver::new(
            ApiCartoClient::new(config)?,
            OverpassClient::new(config)?,
            ResolveSettings::from(config),
        ),
        zone_default_radius_m: config.zone_default_radius_m,
    });

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .context(format!("Failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, apicarto = %config.apicarto_url, overpass = %config.overpass_url, "Listening");

    axum::serve(listener, router(state).into_make_service())
        .await
        .context("HTTP server failed")
}

async fn get_parcelle<P, B>(
    State(state): State<Arc<AppState<P, B>>>,
    Query(params): Query<PointParams>,
) -> Result<Json<ResolveResponse>, ServiceError>
where
    P: ParcelLookup + Send + Sync + 'static,
    B: BuildingLookup + Send + Sync + 'static,
{
    let resolution = state.resolver.resolve(params.lon, params.lat).await?;
    Ok(Json(ResolveResponse::from(&resolution)))
}

async fn get_parcelles_zone<P, B>(
    State(state): State<Arc<AppState<P, B>>>,
    Query(params): Query<ZoneParams>,
) -> Result<Json<ZoneResponse>, ServiceError>
where
    P: ParcelLookup + Send + Sync + 'static,
    B: BuildingLookup + Send + Sync + 'static,
{
    let radius = params.radius.unwrap_or(state.zone_default_radius_m);
    let zone = state
        .resolver
        .parcels_around(params.lon, params.lat, radius)
        .await?;
    Ok(Json(ZoneResponse::from(&zone)))
}

async fn get_commune<P, B>(
    State(state): State<Arc<AppState<P, B>>>,
    Query(params): Query<CommuneParams>,
) -> Result<Json<Value>, ServiceError>
where
    P: ParcelLookup + Send + Sync + 'static,
    B: BuildingLookup + Send + Sync + 'static,
{
    let boundary = state.resolver.commune_boundary(&params.code_insee).await?;
    Ok(Json(boundary))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!(status = status.as_u16(), error = %self, "Request failed");

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
