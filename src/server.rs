use actix_web::{
    error::InternalError, http::StatusCode, web, App, HttpResponse, HttpServer, Responder,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    geo::LatLng,
    maps::{Directions, DistanceMatrix, Place, PlaceSearch, TextValue},
    report::{navigation_url, route_feature_collection, InfoPanel, Language},
    resolver::{select_place, NearestStop, NearestStopResolver, ResolveError, ResolverConfig},
    stops::{stop::Stop, StopSet},
};

pub struct AppState<M> {
    pub stops: StopSet,
    pub maps: M,
    pub config: ResolverConfig,
    pub lang: Language,
}

#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    lat: Option<f64>,
    lng: Option<f64>,
    place: Option<String>,
    lang: Option<Language>,
}

#[derive(Serialize)]
struct NearestResponse {
    place: Option<Place>,
    origin: LatLng,
    stop: Stop,
    nearest: NearestStop,
    distance: TextValue,
    duration: TextValue,
    info: String,
    navigation_url: String,
    route: FeatureCollection,
}

pub fn config<M>(cfg: &mut web::ServiceConfig)
where
    M: PlaceSearch + DistanceMatrix + Directions + 'static,
{
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    });

    cfg.app_data(query_config)
        .route("/health", web::get().to(health))
        .route("/nearest", web::get().to(nearest::<M>));
}

pub async fn run<M>(state: AppState<M>, address: String, port: u16) -> std::io::Result<()>
where
    M: PlaceSearch + DistanceMatrix + Directions + Send + Sync + 'static,
{
    info!(%address, port, stops = state.stops.len(), "starting HTTP server");

    let state = web::Data::new(state);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(config::<M>))
        .bind((address, port))?
        .run()
        .await
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

async fn nearest<M>(state: web::Data<AppState<M>>, query: web::Query<NearestQuery>) -> HttpResponse
where
    M: PlaceSearch + DistanceMatrix + Directions,
{
    let query = query.into_inner();
    let lang = query.lang.unwrap_or(state.lang);

    match find_nearest(&state, query, lang).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            warn!("nearest stop request failed: {e}");
            HttpResponse::build(status_for(&e)).json(json!({ "error": e.to_string() }))
        }
    }
}

async fn find_nearest<M>(
    state: &AppState<M>,
    query: NearestQuery,
    lang: Language,
) -> Result<NearestResponse, ResolveError>
where
    M: PlaceSearch + DistanceMatrix + Directions,
{
    let (place, origin) = match (query.lat, query.lng, query.place.as_deref()) {
        (Some(lat), Some(lng), _) => (None, LatLng::new(lat, lng)),
        (None, None, Some(q)) => {
            let place = select_place(&state.maps, q).await?;
            let origin = place.location;
            (Some(place), origin)
        }
        _ => {
            return Err(ResolveError::InvalidPlace(
                "give either lat and lng or place".to_owned(),
            ))
        }
    };

    let resolver = NearestStopResolver::new(&state.maps, state.config);
    let resolution = resolver.resolve(origin, &state.stops.stops).await?;

    Ok(NearestResponse {
        place,
        origin,
        navigation_url: navigation_url(origin, resolution.nearest.stop.location),
        route: route_feature_collection(&resolution),
        info: InfoPanel::new(&resolution).render(lang),
        stop: resolution.nearest.stop.clone(),
        nearest: resolution.nearest,
        distance: resolution.route.distance,
        duration: resolution.route.duration,
    })
}

fn status_for(err: &ResolveError) -> StatusCode {
    match err {
        ResolveError::InvalidPlace(_) => StatusCode::BAD_REQUEST,
        ResolveError::NoStops | ResolveError::NoReachableStop => StatusCode::NOT_FOUND,
        ResolveError::PlaceSearch(_)
        | ResolveError::DistanceMatrix(_)
        | ResolveError::Directions(_) => StatusCode::BAD_GATEWAY,
    }
}
