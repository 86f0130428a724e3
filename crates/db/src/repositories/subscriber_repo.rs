//! Read-only queries against the `users` table.

use sqlx::PgPool;

use crate::models::subscriber::SubscriberRow;

pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Users with both latitude and longitude set.
    pub async fn list_with_coordinates(pool: &PgPool) -> Result<Vec<SubscriberRow>, sqlx::Error> {
        sqlx::query_as::<_, SubscriberRow>(
            "SELECT email, latitude, longitude, roles, push_token FROM users \
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
             ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}
