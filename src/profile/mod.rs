//! Hotel profile lookup.

mod types;

pub use types::{Address, HotelProfile, ProfileRequest, ProfileResult};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{ProfileReader, ProfileService, RequestContext};
use crate::error_handling::SearchError;

/// Reads profiles straight from the primary store. Nothing is cached.
pub struct ProfileDirectory {
    reader: Arc<dyn ProfileReader>,
}

impl ProfileDirectory {
    pub fn new(reader: Arc<dyn ProfileReader>) -> Self {
        ProfileDirectory { reader }
    }
}

#[async_trait]
impl ProfileService for ProfileDirectory {
    /// Repeated ids yield repeated profiles so the result lines up with
    /// the caller's id list.
    async fn get_profiles(
        &self,
        ctx: &RequestContext,
        request: &ProfileRequest,
    ) -> Result<ProfileResult, SearchError> {
        if request.hotel_ids.is_empty() {
            return Ok(ProfileResult::default());
        }

        let mut unique: Vec<String> = request.hotel_ids.clone();
        unique.sort();
        unique.dedup();

        let found = ctx.call(self.reader.find_profiles(&unique)).await?;
        let by_id: HashMap<&str, &HotelProfile> =
            found.iter().map(|p| (p.id.as_str(), p)).collect();

        let hotels: Vec<HotelProfile> = request
            .hotel_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|p| (*p).clone()))
            .collect();

        if hotels.len() < request.hotel_ids.len() {
            log::debug!(
                "{} of {} requested hotels have no profile",
                request.hotel_ids.len() - hotels.len(),
                request.hotel_ids.len()
            );
        }
        log::debug!("Profiles for locale {}: {}", request.locale, hotels.len());
        Ok(ProfileResult { hotels })
    }
}
