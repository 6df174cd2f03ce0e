//! Query catalog: the statements behind each analytics route.
//!
//! [`CatalogQuery`] names every query the API can run and owns its SQL text.
//! [`QueryCatalog`] is the seam handlers call through; [`PostgresCatalog`]
//! runs the statements on a `deadpool-postgres` pool and renders each row as
//! a JSON object keyed by column name.

use crate::config::{ConfigError, DatabaseConfig};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::{error::Error as StdError, fmt::Write, sync::Arc};
use thiserror::Error;
use tokio_postgres::{
    types::{FromSql, ToSql, Type},
    Row,
};

/// One result row, column name to value.
pub type JsonRow = Map<String, Value>;

/// Catalog shared by all workers.
pub type SharedCatalog = Arc<dyn QueryCatalog>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database unavailable: {0}")]
    Pool(String),
    #[error("query {query} failed: {message}")]
    Query { query: &'static str, message: String },
    #[error("cannot decode column {column} ({type_name}): {message}")]
    Decode {
        column: String,
        type_name: String,
        message: String,
    },
}

/// Every statement the API knows how to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogQuery {
    HourlyEvents,
    DailyEvents,
    /// Daily totals split by point of interest.
    DailyEventsPerPoi,
    /// Daily totals for a single point of interest.
    DailyEventsForPoi(i64),
    HourlyStats,
    DailyStats,
    Poi,
}

impl CatalogQuery {
    /// Stable name used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            CatalogQuery::HourlyEvents => "hourly_events",
            CatalogQuery::DailyEvents => "daily_events",
            CatalogQuery::DailyEventsPerPoi => "daily_events_per_poi",
            CatalogQuery::DailyEventsForPoi(_) => "daily_events_for_poi",
            CatalogQuery::HourlyStats => "hourly_stats",
            CatalogQuery::DailyStats => "daily_stats",
            CatalogQuery::Poi => "poi",
        }
    }

    /// Aggregates are cast to `int8`/`float8` so they decode as JSON numbers.
    pub fn sql(&self) -> &'static str {
        match self {
            CatalogQuery::HourlyEvents => {
                "SELECT date, hour, events \
                 FROM public.hourly_events \
                 ORDER BY date, hour \
                 LIMIT 168"
            }
            CatalogQuery::DailyEvents => {
                "SELECT date, SUM(events)::int8 AS events \
                 FROM public.hourly_events \
                 GROUP BY date \
                 ORDER BY date \
                 LIMIT 7"
            }
            CatalogQuery::DailyEventsPerPoi => {
                "SELECT date, poi_id, SUM(events)::int8 AS events \
                 FROM public.hourly_events \
                 GROUP BY date, poi_id \
                 ORDER BY date, poi_id"
            }
            CatalogQuery::DailyEventsForPoi(_) => {
                "SELECT date, poi_id, SUM(events)::int8 AS events \
                 FROM public.hourly_events \
                 WHERE poi_id = $1::int8 \
                 GROUP BY date, poi_id \
                 ORDER BY date \
                 LIMIT 7"
            }
            CatalogQuery::HourlyStats => {
                "SELECT date, hour, impressions, clicks, revenue::float8 AS revenue \
                 FROM public.hourly_stats \
                 ORDER BY date, hour \
                 LIMIT 168"
            }
            CatalogQuery::DailyStats => {
                "SELECT date, \
                     SUM(impressions)::int8 AS impressions, \
                     SUM(clicks)::int8 AS clicks, \
                     SUM(revenue)::float8 AS revenue \
                 FROM public.hourly_stats \
                 GROUP BY date \
                 ORDER BY date \
                 LIMIT 7"
            }
            CatalogQuery::Poi => "SELECT * FROM public.poi",
        }
    }

    /// Values bound to the `$n` placeholders of [`CatalogQuery::sql`].
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        match self {
            CatalogQuery::DailyEventsForPoi(poi_id) => vec![poi_id as &(dyn ToSql + Sync)],
            _ => Vec::new(),
        }
    }
}

/// Source of analytics rows
#[async_trait]
pub trait QueryCatalog: Send + Sync {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<JsonRow>, CatalogError>;

    /// Cheap connectivity probe.
    async fn health_check(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

/// PostgreSQL-backed catalog
pub struct PostgresCatalog {
    pool: deadpool_postgres::Pool,
}

impl PostgresCatalog {
    /// Build the connection pool. No connection is opened until the first
    /// query.
    pub fn new(config: &DatabaseConfig) -> Result<Self, ConfigError> {
        let pg_config = config.to_pg_config()?;
        let mgr_config = deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        };
        let mgr =
            deadpool_postgres::Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config);
        let pool = deadpool_postgres::Pool::builder(mgr)
            .max_size(config.max_pool_size)
            .build()
            .map_err(|e| ConfigError::Pool(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn client(&self) -> Result<deadpool_postgres::Client, CatalogError> {
        self.pool
            .get()
            .await
            .map_err(|e| CatalogError::Pool(e.to_string()))
    }
}

#[async_trait]
impl QueryCatalog for PostgresCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<JsonRow>, CatalogError> {
        let client = self.client().await?;
        let query_error = |e: tokio_postgres::Error| CatalogError::Query {
            query: query.name(),
            message: e.to_string(),
        };

        let statement = client.prepare_cached(query.sql()).await.map_err(query_error)?;
        let rows = client
            .query(&statement, &query.params())
            .await
            .map_err(query_error)?;

        tracing::debug!(query = query.name(), rows = rows.len(), "Catalog query finished");
        rows.iter().map(row_to_json).collect()
    }

    async fn health_check(&self) -> Result<(), CatalogError> {
        let client = self.client().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| CatalogError::Query {
                query: "health_check",
                message: e.to_string(),
            })?;
        Ok(())
    }
}

/// Render a row as a JSON object keyed by column name.
pub fn row_to_json(row: &Row) -> Result<JsonRow, CatalogError> {
    let mut object = Map::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let type_name = column.type_().name();
        let decode_error = |e: tokio_postgres::Error| CatalogError::Decode {
            column: column.name().to_string(),
            type_name: type_name.to_string(),
            message: e.to_string(),
        };

        let value = match type_name {
            "bool" => opt(row.try_get::<_, Option<bool>>(idx).map_err(decode_error)?),
            "int2" => opt(row.try_get::<_, Option<i16>>(idx).map_err(decode_error)?),
            "int4" => opt(row.try_get::<_, Option<i32>>(idx).map_err(decode_error)?),
            "int8" => opt(row.try_get::<_, Option<i64>>(idx).map_err(decode_error)?),
            "float4" => opt(row.try_get::<_, Option<f32>>(idx).map_err(decode_error)?),
            "float8" => opt(row.try_get::<_, Option<f64>>(idx).map_err(decode_error)?),
            "date" => opt(row
                .try_get::<_, Option<NaiveDate>>(idx)
                .map_err(decode_error)?
                .map(|d| d.format("%Y-%m-%d").to_string())),
            "timestamp" => opt(row
                .try_get::<_, Option<NaiveDateTime>>(idx)
                .map_err(decode_error)?
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            "timestamptz" => opt(row
                .try_get::<_, Option<DateTime<Utc>>>(idx)
                .map_err(decode_error)?
                .map(|t| t.to_rfc3339())),
            "numeric" => opt(row
                .try_get::<_, Option<NumericText>>(idx)
                .map_err(decode_error)?
                .map(|n| n.0)),
            "json" | "jsonb" => row
                .try_get::<_, Option<Value>>(idx)
                .map_err(decode_error)?
                .unwrap_or(Value::Null),
            // text, varchar, bpchar, name and anything else with a text form
            _ => opt(row.try_get::<_, Option<String>>(idx).map_err(decode_error)?),
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}

fn opt<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

/// A `numeric` value as its exact decimal text.
struct NumericText(String);

impl<'a> FromSql<'a> for NumericText {
    fn from_sql(_: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        decode_numeric(raw).map(NumericText)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Binary `numeric`: digit count, weight, sign and display scale, followed
/// by base-10000 digits, most significant first.
fn decode_numeric(raw: &[u8]) -> Result<String, Box<dyn StdError + Sync + Send>> {
    let word = |i: usize| -> Result<u16, Box<dyn StdError + Sync + Send>> {
        raw.get(i * 2..i * 2 + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = usize::from(word(0)?);
    let weight = i32::from(word(1)? as i16);
    let sign = word(2)?;
    let dscale = usize::from(word(3)?);
    let digits = (0..ndigits)
        .map(|i| word(4 + i))
        .collect::<Result<Vec<_>, _>>()?;

    match sign {
        0 | NUMERIC_NEG => {}
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        other => return Err(format!("invalid numeric sign {other:#06x}").into()),
    }

    let group = |i: i32| -> u16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        write!(out, "{}", group(0))?;
        for i in 1..=weight {
            write!(out, "{:04}", group(i))?;
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            write!(fraction, "{:04}", group(i))?;
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }
    Ok(out)
}
