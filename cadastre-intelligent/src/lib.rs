//! # cadastre-intelligent
//!
//! Service HTTP qui retrouve la parcelle cadastrale d'un point GPS, en
//! croisant API Carto (IGN) et les bâtiments OpenStreetMap (Overpass).
//!
//! ## Features
//!
//! - `/api/cadastre/parcelle` : parcelle sous le point, niveau de confiance
//!   (`SINGLE_CONFIRMED`, `MULTI_PARCEL`, `UNCERTAIN`) et bâtiments
//! - `/api/cadastre/parcelles-zone` : parcelles dans un rayon
//! - `/api/cadastre/commune` : limites d'une commune (relais API Carto)
//! - Élargissement automatique de la recherche (15 m / 6 m)
//! - Bâtiments facultatifs : Overpass indisponible ne fait pas échouer la requête
//!
//! ## Usage CLI
//!
//! ```bash
//! # API HTTP
//! cadastre-intelligent serve --listen 127.0.0.1:8000
//!
//! # Résolution ponctuelle
//! cadastre-intelligent resolve --lon 5.7245 --lat 45.1885
//! ```

pub mod config;
pub mod error;
pub mod resolve;
pub mod response;
pub mod server;
pub mod upstream;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use resolve::{ResolveSettings, Resolver};
