//! Scénarios de résolution contre des services amont simulés

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cadastre_intelligent::resolve::{ResolveSettings, Resolver};
use cadastre_intelligent::response::ResolveResponse;
use cadastre_intelligent::server::{router, AppState};
use cadastre_intelligent::upstream::{BuildingLookup, OverpassClient, ParcelLookup};
use cadastre_intelligent::{ServiceConfig, ServiceError};
use geo::{LineString, Polygon};
use parcelle::{BoundingBox, BuildingFeature, Mode, ParcelCollection, Resolution};
use serde_json::{json, Value};

/// Service parcellaire simulé : réponses en file, requêtes enregistrées
#[derive(Default)]
struct FakeParcels {
    responses: Mutex<VecDeque<Result<ParcelCollection, ServiceError>>>,
    calls: Arc<Mutex<Vec<Value>>>,
    /// Limites de commune servies, absentes = service en panne
    commune: Option<Value>,
}

impl FakeParcels {
    fn with(responses: Vec<Result<ParcelCollection, ServiceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Arc::default(),
            commune: None,
        }
    }
}

impl ParcelLookup for FakeParcels {
    async fn parcels(&self, geom: &Value) -> Result<ParcelCollection, ServiceError> {
        self.calls.lock().unwrap().push(geom.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ParcelCollection::default()))
    }

    async fn commune(&self, code_insee: &str) -> Result<Value, ServiceError> {
        match &self.commune {
            Some(boundary) if boundary["code_insee"] == code_insee => Ok(boundary.clone()),
            Some(_) => Ok(json!({"type": "FeatureCollection", "features": []})),
            None => Err(ServiceError::upstream("API Carto", "HTTP 503 Service Unavailable")),
        }
    }
}

/// Service bâtiments simulé
#[derive(Default)]
struct FakeBuildings {
    buildings: Vec<BuildingFeature>,
    calls: Arc<Mutex<Vec<BoundingBox>>>,
}

impl BuildingLookup for FakeBuildings {
    async fn buildings(&self, bbox: &BoundingBox) -> Vec<BuildingFeature> {
        self.calls.lock().unwrap().push(*bbox);
        self.buildings.clone()
    }
}

fn parcel(idu: &str, x0: f64, x1: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[
            [x0, 48.0], [x1, 48.0], [x1, 48.0004], [x0, 48.0004], [x0, 48.0]
        ]]},
        "properties": {
            "idu": idu, "numero": &idu[idu.len() - 4..], "section": "AB", "feuille": 1,
            "contenance": 420, "code_insee": "14229", "nom_com": "Dozulé", "code_dep": "14"
        }
    })
}

fn collection(features: Vec<Value>) -> Result<ParcelCollection, ServiceError> {
    Ok(ParcelCollection::from_value(json!({
        "type": "FeatureCollection",
        "features": features
    }))
    .unwrap())
}

fn house(id: i64, x0: f64, x1: f64) -> BuildingFeature {
    BuildingFeature {
        id,
        source: "osm".into(),
        polygon: Polygon::new(
            LineString::from(vec![
                (x0, 48.0001),
                (x1, 48.0001),
                (x1, 48.0003),
                (x0, 48.0003),
                (x0, 48.0001),
            ]),
            vec![],
        ),
    }
}

fn found(resolution: Resolution) -> parcelle::ResolutionOutcome {
    match resolution {
        Resolution::Found(outcome) => outcome,
        Resolution::NotFound => panic!("expected a parcel"),
    }
}

#[tokio::test]
async fn test_single_parcel_without_buildings() {
    let parcels = FakeParcels::with(vec![
        collection(vec![parcel("14229000AB0001", 2.0, 2.0005)]),
        collection(vec![parcel("14229000AB0001", 2.0, 2.0005)]),
    ]);
    let buildings = FakeBuildings::default();
    let parcel_calls = parcels.calls.clone();
    let resolver = Resolver::new(parcels, buildings, ResolveSettings::default());

    let outcome = found(resolver.resolve(2.0002, 48.0002).await.unwrap());

    assert_eq!(outcome.mode, Mode::Uncertain);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
    assert_eq!(outcome.parcels.len(), 1, "widened duplicate merged away");

    // Point d'abord, puis cercle de 6 m (33 sommets)
    let calls = parcel_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["type"], "Point");
    assert_eq!(calls[1]["type"], "Polygon");
    assert_eq!(calls[1]["coordinates"][0].as_array().unwrap().len(), 33);
}

#[tokio::test]
async fn test_two_parcels_two_buildings() {
    let parcels = FakeParcels::with(vec![collection(vec![
        parcel("14229000AB0001", 2.0, 2.0005),
        parcel("14229000AB0002", 2.0005, 2.001),
    ])]);
    let buildings = FakeBuildings {
        buildings: vec![house(100, 2.0002, 2.0004), house(101, 2.0006, 2.0008)],
        ..Default::default()
    };
    let resolver = Resolver::new(parcels, buildings, ResolveSettings::default());

    let outcome = found(resolver.resolve(2.00055, 48.0002).await.unwrap());

    assert_eq!(outcome.mode, Mode::MultiParcel);
    assert_eq!(outcome.buildings.len(), 2);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0002"));
    // Champs historiques : première parcelle
    assert_eq!(
        outcome.primary.unwrap().idu.as_deref(),
        Some("14229000AB0001")
    );
}

#[tokio::test]
async fn test_single_parcel_widened_to_neighbour() {
    // Le point ne touche qu'une parcelle, le cercle de 6 m ramène la voisine
    let parcels = FakeParcels::with(vec![
        collection(vec![parcel("14229000AB0001", 2.0, 2.0005)]),
        collection(vec![
            parcel("14229000AB0001", 2.0, 2.0005),
            parcel("14229000AB0002", 2.0005, 2.001),
        ]),
    ]);
    let parcel_calls = parcels.calls.clone();
    let buildings = FakeBuildings {
        buildings: vec![house(100, 2.0002, 2.0004), house(101, 2.0006, 2.0008)],
        ..Default::default()
    };
    let resolver = Resolver::new(parcels, buildings, ResolveSettings::default());

    let outcome = found(resolver.resolve(2.00048, 48.0002).await.unwrap());

    assert_eq!(parcel_calls.lock().unwrap().len(), 2);
    assert_eq!(outcome.parcels.len(), 2, "widened parcels merged");
    assert_eq!(outcome.mode, Mode::MultiParcel);
    assert_eq!(outcome.buildings.len(), 2);
    // Centroïdes à 2.00025 et 2.00075 : le premier est plus proche
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
    // Champs historiques issus de la requête initiale
    assert_eq!(outcome.primary_collection["features"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_point_geometry_parcel_not_a_candidate() {
    let mut point = parcel("14229000AB0009", 2.0, 2.0005);
    point["geometry"] = json!({"type": "Point", "coordinates": [2.0003, 48.0002]});

    let resolver = Resolver::new(
        FakeParcels::with(vec![collection(vec![parcel("14229000AB0001", 2.0, 2.0005), point])]),
        FakeBuildings {
            buildings: vec![house(100, 2.0002, 2.0004)],
            ..Default::default()
        },
        ResolveSettings::default(),
    );

    let outcome = found(resolver.resolve(2.0003, 48.0002).await.unwrap());

    assert_eq!(outcome.parcels.len(), 2);
    assert_eq!(outcome.mode, Mode::SingleConfirmed);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
}

#[tokio::test]
async fn test_commune_boundary_passthrough() {
    let boundary = json!({"code_insee": "14229", "type": "FeatureCollection", "features": []});
    let parcels = FakeParcels {
        commune: Some(boundary.clone()),
        ..Default::default()
    };
    let resolver = Resolver::new(parcels, FakeBuildings::default(), ResolveSettings::default());

    assert_eq!(resolver.commune_boundary("14229").await.unwrap(), boundary);

    let down = Resolver::new(FakeParcels::default(), FakeBuildings::default(), ResolveSettings::default());
    let err = down.commune_boundary("14229").await.unwrap_err();
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_building_bbox_covers_candidates() {
    let buildings = FakeBuildings::default();
    let bbox_calls = buildings.calls.clone();
    let resolver = Resolver::new(
        FakeParcels::with(vec![collection(vec![
            parcel("14229000AB0001", 2.0, 2.0005),
            parcel("14229000AB0002", 2.0005, 2.001),
        ])]),
        buildings,
        ResolveSettings::default(),
    );

    resolver.resolve(2.0003, 48.0002).await.unwrap();

    let calls = bbox_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![BoundingBox::new(48.0, 2.0, 48.0004, 2.001)]);
}

#[tokio::test]
async fn test_no_usable_geometry_skips_buildings() {
    let mut broken = parcel("14229000AB0001", 2.0, 2.0005);
    broken["geometry"] = Value::Null;
    let buildings = FakeBuildings::default();
    let bbox_calls = buildings.calls.clone();
    let resolver = Resolver::new(
        FakeParcels::with(vec![collection(vec![broken]), collection(vec![])]),
        buildings,
        ResolveSettings::default(),
    );

    let outcome = found(resolver.resolve(2.0003, 48.0002).await.unwrap());

    assert!(bbox_calls.lock().unwrap().is_empty());
    assert_eq!(outcome.mode, Mode::Uncertain);
    // Repli sur la première parcelle trouvée
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
}

#[tokio::test]
async fn test_nothing_found_twice() {
    let parcels = FakeParcels::with(vec![collection(vec![]), collection(vec![])]);
    let parcel_calls = parcels.calls.clone();
    let resolver = Resolver::new(parcels, FakeBuildings::default(), ResolveSettings::default());

    let resolution = resolver.resolve(2.0, 48.0).await.unwrap();
    assert!(matches!(resolution, Resolution::NotFound));

    let body = serde_json::to_value(ResolveResponse::from(&resolution)).unwrap();
    assert_eq!(
        body,
        json!({"success": false, "message": "Aucune parcelle trouvée à ces coordonnées"})
    );

    // Un seul élargissement, à 15 m
    let calls = parcel_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    let first_vertex = &calls[1]["coordinates"][0][0];
    let dlat = first_vertex[1].as_f64().unwrap() - 48.0;
    assert!(dlat.abs() < 1e-12);
    let dlon = first_vertex[0].as_f64().unwrap() - 2.0;
    let expected = 15.0 / 111_000.0 / 48f64.to_radians().cos();
    assert!((dlon - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_widened_empty_result_is_used_as_is() {
    let parcels = FakeParcels::with(vec![
        collection(vec![]),
        collection(vec![parcel("14229000AB0003", 2.0, 2.0005)]),
    ]);
    let parcel_calls = parcels.calls.clone();
    let resolver = Resolver::new(parcels, FakeBuildings::default(), ResolveSettings::default());

    let outcome = found(resolver.resolve(2.0007, 48.0002).await.unwrap());

    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0003"));
    assert_eq!(outcome.primary_collection["features"].as_array().unwrap().len(), 1);
    assert_eq!(parcel_calls.lock().unwrap().len(), 2, "no second widen");
}

#[tokio::test]
async fn test_building_service_down() {
    // Overpass injoignable : liste vide, jamais SINGLE_CONFIRMED
    let config = ServiceConfig {
        overpass_url: "http://127.0.0.1:9/api/interpreter".into(),
        building_timeout_secs: 1,
        ..ServiceConfig::default()
    };
    let resolver = Resolver::new(
        FakeParcels::with(vec![
            collection(vec![parcel("14229000AB0001", 2.0, 2.0005)]),
            collection(vec![]),
        ]),
        OverpassClient::new(&config).unwrap(),
        ResolveSettings::from(&config),
    );

    let outcome = found(resolver.resolve(2.0002, 48.0002).await.unwrap());

    assert!(outcome.buildings.is_empty());
    assert_ne!(outcome.mode, Mode::SingleConfirmed);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
}

#[tokio::test]
async fn test_primary_failure_is_fatal() {
    let resolver = Resolver::new(
        FakeParcels::with(vec![Err(ServiceError::upstream("API Carto", "timed out"))]),
        FakeBuildings::default(),
        ResolveSettings::default(),
    );

    let err = resolver.resolve(2.0, 48.0).await.unwrap_err();
    assert!(matches!(err, ServiceError::Upstream { .. }));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn test_widened_failure_keeps_previous_result() {
    let resolver = Resolver::new(
        FakeParcels::with(vec![
            collection(vec![parcel("14229000AB0001", 2.0, 2.0005)]),
            Err(ServiceError::upstream("API Carto", "HTTP 503")),
        ]),
        FakeBuildings {
            buildings: vec![house(100, 2.0002, 2.0004)],
            ..Default::default()
        },
        ResolveSettings::default(),
    );

    let outcome = found(resolver.resolve(2.0003, 48.0002).await.unwrap());

    assert_eq!(outcome.parcels.len(), 1);
    assert_eq!(outcome.mode, Mode::SingleConfirmed);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
}

#[tokio::test]
async fn test_malformed_geometry_stays_listed() {
    let mut broken = parcel("14229000AB0009", 2.0005, 2.001);
    broken["geometry"] = json!({"type": "Polygon", "coordinates": "oops"});

    let resolver = Resolver::new(
        FakeParcels::with(vec![collection(vec![parcel("14229000AB0001", 2.0, 2.0005), broken])]),
        FakeBuildings {
            buildings: vec![house(100, 2.0002, 2.0004)],
            ..Default::default()
        },
        ResolveSettings::default(),
    );

    let outcome = found(resolver.resolve(2.0003, 48.0002).await.unwrap());

    assert_eq!(outcome.parcels.len(), 2);
    // Seule la parcelle valide compte pour la classification
    assert_eq!(outcome.mode, Mode::SingleConfirmed);
    assert_eq!(outcome.selected_parcel_id.as_deref(), Some("14229000AB0001"));
}

#[tokio::test]
async fn test_parcels_around_uses_circle() {
    let parcels = FakeParcels::with(vec![collection(vec![
        parcel("14229000AB0001", 2.0, 2.0005),
        parcel("14229000AB0002", 2.0005, 2.001),
    ])]);
    let parcel_calls = parcels.calls.clone();
    let resolver = Resolver::new(parcels, FakeBuildings::default(), ResolveSettings::default());

    let zone = resolver.parcels_around(2.0005, 48.0002, 100.0).await.unwrap();

    assert_eq!(zone.collection.len(), 2);
    assert_eq!(zone.radius_m, 100.0);
    let calls = parcel_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["type"], "Polygon");
}

// --- HTTP ---

async fn spawn_app(parcels: FakeParcels) -> String {
    let state = Arc::new(AppState {
        resolver: Resolver::new(parcels, FakeBuildings::default(), ResolveSettings::default()),
        zone_default_radius_m: 100.0,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state).into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_not_found_is_200() {
    let base = spawn_app(FakeParcels::with(vec![collection(vec![]), collection(vec![])])).await;

    let response = reqwest::get(format!("{}/api/cadastre/parcelle?lon=2.0&lat=48.0", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_http_found_body() {
    let base = spawn_app(FakeParcels::with(vec![collection(vec![
        parcel("14229000AB0001", 2.0, 2.0005),
        parcel("14229000AB0002", 2.0005, 2.001),
    ])]))
    .await;

    let body: Value = reqwest::get(format!("{}/api/cadastre/parcelle?lon=2.0002&lat=48.0002", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["mode"], "MULTI_PARCEL");
    assert_eq!(body["selectedParcelId"], "14229000AB0001");
    assert_eq!(body["parcelles"].as_array().unwrap().len(), 2);
    assert_eq!(body["parcellesGeojson"]["features"].as_array().unwrap().len(), 2);
    assert_eq!(body["parcelle"]["code_departement"], "14");
    assert_eq!(body["buildings"], json!([]));
}

#[tokio::test]
async fn test_http_upstream_failure_is_502() {
    let base = spawn_app(FakeParcels::with(vec![Err(ServiceError::upstream(
        "API Carto",
        "timed out",
    ))]))
    .await;

    let response = reqwest::get(format!("{}/api/cadastre/parcelle?lon=2.0&lat=48.0", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "API Carto error: timed out");
}

#[tokio::test]
async fn test_http_missing_parameter_is_400() {
    let base = spawn_app(FakeParcels::default()).await;

    let response = reqwest::get(format!("{}/api/cadastre/parcelle?lon=2.0", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_http_zone_default_radius() {
    let base = spawn_app(FakeParcels::with(vec![collection(vec![parcel(
        "14229000AB0001",
        2.0,
        2.0005,
    )])]))
    .await;

    let body: Value = reqwest::get(format!("{}/api/cadastre/parcelles-zone?lon=2.0&lat=48.0", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["radius_m"], 100.0);
    assert_eq!(body["center"], json!([2.0, 48.0]));
    assert_eq!(body["parcelles"][0]["idu"], "14229000AB0001");
}

#[tokio::test]
async fn test_http_commune() {
    let boundary = json!({"code_insee": "14229", "type": "FeatureCollection", "features": []});
    let base = spawn_app(FakeParcels {
        commune: Some(boundary.clone()),
        ..Default::default()
    })
    .await;

    let response = reqwest::get(format!("{}/api/cadastre/commune?code_insee=14229", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, boundary);

    let response = reqwest::get(format!("{}/api/cadastre/commune", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_http_commune_upstream_failure_is_502() {
    let base = spawn_app(FakeParcels::default()).await;

    let response = reqwest::get(format!("{}/api/cadastre/commune?code_insee=14229", base))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "API Carto error: HTTP 503 Service Unavailable");
}
