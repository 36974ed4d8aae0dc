use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use sea_orm::DbErr;

use crate::{
    AppState,
    models::auction::{
        Auction, AuctionListResponse, AuctionRangeQuery, AuctionStatsResponse, ErrorResponse,
        HealthResponse, RunReport,
    },
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn database_error(e: DbErr) -> ApiError {
    tracing::error!("Database error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Handler for GET /api/auctions
pub async fn get_all_auctions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Auction>>, ApiError> {
    let auctions = state.repository.find_all().await.map_err(database_error)?;
    Ok(Json(auctions))
}

/// Handler for GET /api/auctions/latest
pub async fn get_latest_auction(
    State(state): State<AppState>,
) -> Result<Json<Auction>, ApiError> {
    state
        .repository
        .find_latest()
        .await
        .map_err(database_error)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "No auctions recorded yet".to_string(),
                }),
            )
        })
}

/// Handler for GET /api/auctions/range?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
pub async fn get_auctions_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<AuctionRangeQuery>,
) -> Result<Json<Vec<Auction>>, ApiError> {
    let start_date = NaiveDate::parse_from_str(&query.start_date, "%Y-%m-%d")
        .map_err(|_| bad_request(format!("Invalid start_date format: '{}'", query.start_date)))?;
    let end_date = NaiveDate::parse_from_str(&query.end_date, "%Y-%m-%d")
        .map_err(|_| bad_request(format!("Invalid end_date format: '{}'", query.end_date)))?;

    if start_date > end_date {
        return Err(bad_request(
            "start_date must be before or equal to end_date".to_string(),
        ));
    }

    let auctions = state
        .repository
        .find_between(start_date, end_date)
        .await
        .map_err(database_error)?;

    tracing::debug!(
        "Found {} auctions from {} to {}",
        auctions.len(),
        start_date,
        end_date
    );

    Ok(Json(auctions))
}

/// Every auction, or 404 when nothing has been scraped yet.
async fn auction_list(state: &AppState) -> Result<Json<AuctionListResponse>, ApiError> {
    let auctions = state.repository.find_all().await.map_err(database_error)?;

    if auctions.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No auctions recorded yet".to_string(),
            }),
        ));
    }

    Ok(Json(AuctionListResponse {
        total_auctions: auctions.len(),
        auctions,
    }))
}

/// Handler for GET /api/auctions/regions
pub async fn get_regional_data(
    State(state): State<AppState>,
) -> Result<Json<AuctionListResponse>, ApiError> {
    auction_list(&state).await
}

/// Handler for GET /api/auctions/technologies
pub async fn get_technology_data(
    State(state): State<AppState>,
) -> Result<Json<AuctionListResponse>, ApiError> {
    auction_list(&state).await
}

/// Handler for GET /api/auctions/stats
pub async fn get_auction_stats(
    State(state): State<AppState>,
) -> Result<Json<AuctionStatsResponse>, ApiError> {
    let total_auctions = state.repository.count().await.map_err(database_error)?;
    let latest = state.repository.find_latest().await.map_err(database_error)?;

    Ok(Json(AuctionStatsResponse {
        total_auctions,
        latest_auction_date: latest.as_ref().map(|a| a.auction_date),
        latest_production_month: latest.as_ref().map(|a| a.production_month.clone()),
        regions_count: latest.as_ref().map(|a| a.regions.len()),
        technologies_count: latest.as_ref().map(|a| a.technologies.len()),
    }))
}

/// Handler for GET /api/auctions/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Auction API is running".to_string(),
    })
}

/// Handler for POST /api/auctions/scrape
///
/// Runs the scraper synchronously and returns its report. Waits if a
/// scheduled run is already in progress.
pub async fn trigger_scrape(State(state): State<AppState>) -> Json<RunReport> {
    tracing::info!("Manual scraping triggered");
    Json(state.scraper.run_once().await)
}
