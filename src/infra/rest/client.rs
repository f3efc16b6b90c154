//! REST client for the hosted relational store.
//!
//! The store exposes its tables over a PostgREST-style HTTP interface:
//! filters and ordering ride in the query string, results come back as JSON
//! arrays. Observations are paged with limit/offset and flattened into the
//! core's row type; fare lookups are single-row queries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use commute_pulse::fetch::auth::ApiKey;
use commute_pulse::fetch::{BasicClient, fetch_json};
use commute_pulse::model::{CommuteObservation, DrivingReference, ShuttleFare, TransitFare};

use crate::services::store_api::CommuteStore;

const PAGE_SIZE: usize = 500;

/// Wire shape of an observation row, with the route's endpoints joined in
/// as a nested object.
#[derive(Deserialize)]
struct ObservationRow {
    id: Option<String>,
    date: Option<String>,
    time: Option<String>,
    rounded_time: Option<String>,
    route_name: Option<String>,
    weekday: Option<String>,
    is_morning: Option<bool>,
    is_commuting_day: Option<bool>,
    duration_minutes: Option<f64>,
    congestion_pricing: Option<bool>,
    routes: Option<EndpointRow>,
}

#[derive(Deserialize)]
struct EndpointRow {
    starting_point: Option<String>,
    finish_point: Option<String>,
}

impl From<ObservationRow> for CommuteObservation {
    fn from(row: ObservationRow) -> Self {
        let (starting_point, finish_point) = match row.routes {
            Some(endpoints) => (endpoints.starting_point, endpoints.finish_point),
            None => (None, None),
        };

        CommuteObservation {
            id: row.id,
            date: row.date,
            time: row.time,
            rounded_time: row.rounded_time,
            route_name: row.route_name,
            weekday: row.weekday,
            is_morning: row.is_morning,
            is_commuting_day: row.is_commuting_day,
            duration_minutes: row.duration_minutes,
            congestion_pricing: row.congestion_pricing,
            starting_point,
            finish_point,
        }
    }
}

#[derive(Deserialize)]
struct DrivingReferenceRow {
    mpg: Option<f64>,
    gas_price_per_gallon: Option<f64>,
    tolls: Option<f64>,
    parking: Option<f64>,
    congestion_fee: Option<f64>,
}

pub struct RestStore {
    base_url: String,
    client: ApiKey<BasicClient>,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: ApiKey::new(BasicClient::new(), api_key),
        }
    }

    fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/rest/v1/{}", self.base_url, table),
            params,
        )
        .with_context(|| format!("bad store URL for table '{table}'"))?;
        Ok(url.to_string())
    }

    async fn fetch_single_row<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let url = self.table_url(table, params)?;
        let mut rows: Vec<T> = fetch_json(&self.client, &url).await?;
        Ok((!rows.is_empty()).then(|| rows.swap_remove(0)))
    }
}

#[async_trait]
impl CommuteStore for RestStore {
    async fn fetch_observations(&self, is_morning: bool) -> Result<Vec<CommuteObservation>> {
        let morning_filter = format!("eq.{is_morning}");
        let mut results = Vec::new();
        let mut offset = 0usize;

        loop {
            let limit = PAGE_SIZE.to_string();
            let offset_text = offset.to_string();
            let url = self.table_url(
                "commute_observations",
                &[
                    (
                        "select",
                        "id,date,time,rounded_time,route_name,weekday,is_morning,\
                         is_commuting_day,duration_minutes,congestion_pricing,\
                         routes(starting_point,finish_point)",
                    ),
                    ("is_morning", &morning_filter),
                    ("is_commuting_day", "eq.true"),
                    ("order", "date.asc"),
                    ("limit", &limit),
                    ("offset", &offset_text),
                ],
            )?;

            let page: Vec<ObservationRow> = fetch_json(&self.client, &url).await?;
            let page_len = page.len();
            debug!(offset, page_len, "Observation page fetched");

            results.extend(page.into_iter().map(CommuteObservation::from));

            if page_len < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(results)
    }

    async fn fetch_transit_fare(&self, station: &str) -> Result<Option<TransitFare>> {
        let station_filter = format!("eq.{station}");
        self.fetch_single_row(
            "transit_fares",
            &[
                ("select", "*"),
                ("station", &station_filter),
                ("limit", "1"),
            ],
        )
        .await
    }

    async fn fetch_shuttle_fare(&self, station: &str) -> Result<Option<ShuttleFare>> {
        let station_filter = format!("eq.{station}");
        self.fetch_single_row(
            "shuttle_fares",
            &[
                ("select", "*"),
                ("station", &station_filter),
                ("limit", "1"),
            ],
        )
        .await
    }

    async fn fetch_driving_reference(&self) -> Result<Option<DrivingReference>> {
        let row: Option<DrivingReferenceRow> = self
            .fetch_single_row(
                "driving_cost_reference",
                &[
                    ("select", "*"),
                    ("order", "effective_date.desc"),
                    ("limit", "1"),
                ],
            )
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // The reference row is the baseline for every driving figure; a
        // gap in it is a data problem, not a soft condition.
        let reference = DrivingReference {
            mpg: row.mpg.context("driving reference is missing mpg")?,
            gas_price_per_gallon: row
                .gas_price_per_gallon
                .context("driving reference is missing gas price")?,
            tolls: row.tolls.context("driving reference is missing tolls")?,
            parking: row.parking.context("driving reference is missing parking")?,
            congestion_fee: row
                .congestion_fee
                .context("driving reference is missing congestion fee")?,
        };
        Ok(Some(reference))
    }
}
