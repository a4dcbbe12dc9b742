//! Fan-out orchestration over the backend services.
//!
//! The orchestrator only knows the service traits in [`crate::backend`]; it
//! holds no data of its own. Any downstream failure fails the whole request.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::backend::{
    GeoService, ProfileService, RateService, RecommendationService, RequestContext,
    ReservationService,
};
use crate::config::DEFAULT_ROOMS_PER_RESERVATION;
use crate::error_handling::SearchError;
use crate::geo::NearbyRequest;
use crate::profile::{HotelProfile, ProfileRequest};
use crate::rate::RateRequest;
use crate::recommendation::RecommendationRequest;
use crate::reservation::{ReservationRequest, ReservationResult};

/// Nearby hotels priced for a stay.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub lat: f64,
    pub lon: f64,
    pub in_date: NaiveDate,
    pub out_date: NaiveDate,
}

/// One hotel id per rate plan, highest total rate first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub hotel_ids: Vec<String>,
}

pub struct SearchOrchestrator {
    geo: Arc<dyn GeoService>,
    rate: Arc<dyn RateService>,
    recommendation: Arc<dyn RecommendationService>,
    profile: Arc<dyn ProfileService>,
    reservation: Arc<dyn ReservationService>,
}

impl SearchOrchestrator {
    pub fn new(
        geo: Arc<dyn GeoService>,
        rate: Arc<dyn RateService>,
        recommendation: Arc<dyn RecommendationService>,
        profile: Arc<dyn ProfileService>,
        reservation: Arc<dyn ReservationService>,
    ) -> Self {
        SearchOrchestrator {
            geo,
            rate,
            recommendation,
            profile,
            reservation,
        }
    }

    /// Geo lookup, then rates for the hits. A hotel with several plans
    /// appears once per plan.
    pub async fn nearby_search(
        &self,
        ctx: &RequestContext,
        request: &SearchRequest,
    ) -> Result<SearchResult, SearchError> {
        let nearby = self
            .geo
            .nearby(
                ctx,
                &NearbyRequest {
                    lat: request.lat,
                    lon: request.lon,
                },
            )
            .await?;

        let rates = self
            .rate
            .get_rates(
                ctx,
                &RateRequest {
                    hotel_ids: nearby.hotel_ids,
                    in_date: request.in_date,
                    out_date: request.out_date,
                },
            )
            .await?;

        Ok(SearchResult {
            hotel_ids: rates.hotel_ids(),
        })
    }

    /// Drops the hotels without a free room for the stay. Order and repeats of
    /// the remaining ids are kept.
    pub async fn available(
        &self,
        ctx: &RequestContext,
        request: &SearchRequest,
        hotel_ids: Vec<String>,
    ) -> Result<Vec<String>, SearchError> {
        if hotel_ids.is_empty() {
            return Ok(hotel_ids);
        }
        let free = self
            .reservation
            .check_availability(
                ctx,
                &ReservationRequest {
                    customer_name: String::new(),
                    hotel_ids: hotel_ids.clone(),
                    in_date: request.in_date,
                    out_date: request.out_date,
                    room_number: DEFAULT_ROOMS_PER_RESERVATION,
                },
            )
            .await?;
        Ok(hotel_ids
            .into_iter()
            .filter(|id| free.hotel_ids.contains(id))
            .collect())
    }

    pub async fn reserve(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError> {
        self.reservation.make_reservation(ctx, request).await
    }

    /// Recommended hotels with their display profiles.
    pub async fn recommend(
        &self,
        ctx: &RequestContext,
        request: &RecommendationRequest,
        locale: &str,
    ) -> Result<Vec<HotelProfile>, SearchError> {
        let recommended = self.recommendation.get_recommendations(ctx, request).await?;
        self.profiles(ctx, &recommended.hotel_ids, locale).await
    }

    pub async fn profiles(
        &self,
        ctx: &RequestContext,
        hotel_ids: &[String],
        locale: &str,
    ) -> Result<Vec<HotelProfile>, SearchError> {
        let result = self
            .profile
            .get_profiles(
                ctx,
                &ProfileRequest {
                    hotel_ids: hotel_ids.to_vec(),
                    locale: locale.to_string(),
                },
            )
            .await?;
        Ok(result.hotels)
    }
}
