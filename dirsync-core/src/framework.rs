use sqlx::PgPool;

/// Runs queries against the shared connection pool.
///
/// Every query in [`crate::entities`] is a `kanau` [`Processor`] input
/// implemented for this type.
///
/// [`Processor`]: kanau::processor::Processor
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
