//! Plant record persistence gateway
//!
//! All-or-nothing insert/select/update/delete over the plants table. Writes
//! are fire-once with no idempotency key: a duplicate user-triggered save
//! produces a duplicate row, an accepted limitation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::plant::PlantRecord;
use scanplant_common::Result;

/// List-view projection without the image payload
#[derive(Debug, Clone, Serialize)]
pub struct PlantSummary {
    pub id: Uuid,
    pub scientific_name: String,
    pub common_name: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a plant record
pub async fn insert_plant(pool: &SqlitePool, record: &PlantRecord) -> Result<()> {
    let id = record.id.to_string();
    let created_at = record.created_at.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO plants (
            id, image_data, scientific_name, common_name,
            latitude, longitude, city, location_name,
            wiki_description, family, genus,
            care_instructions, enhanced_description,
            created_at, owner_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&record.image_data)
    .bind(&record.scientific_name)
    .bind(&record.common_name)
    .bind(record.latitude)
    .bind(record.longitude)
    .bind(&record.city)
    .bind(&record.location_name)
    .bind(&record.wiki_description)
    .bind(&record.family)
    .bind(&record.genus)
    .bind(&record.care_instructions)
    .bind(&record.enhanced_description)
    .bind(&created_at)
    .bind(&record.owner_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a plant record by id
pub async fn get_plant(pool: &SqlitePool, id: Uuid) -> Result<Option<PlantRecord>> {
    let id_str = id.to_string();

    let row = sqlx::query(
        r#"
        SELECT id, image_data, scientific_name, common_name,
               latitude, longitude, city, location_name,
               wiki_description, family, genus,
               care_instructions, enhanced_description,
               created_at, owner_id
        FROM plants
        WHERE id = ?
        "#,
    )
    .bind(id_str)
    .fetch_optional(pool)
    .await?;

    row.map(record_from_row).transpose()
}

/// List plant summaries, newest first, optionally filtered by owner
pub async fn list_plants(pool: &SqlitePool, owner_id: Option<&str>) -> Result<Vec<PlantSummary>> {
    let rows = match owner_id {
        Some(owner) => {
            sqlx::query(
                r#"
                SELECT id, scientific_name, common_name, city, created_at
                FROM plants
                WHERE owner_id = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(owner)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, scientific_name, common_name, city, created_at
                FROM plants
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.into_iter()
        .map(|row| {
            Ok(PlantSummary {
                id: parse_uuid(row.get("id"))?,
                scientific_name: row.get("scientific_name"),
                common_name: row.get("common_name"),
                city: row.get("city"),
                created_at: parse_timestamp(row.get("created_at"))?,
            })
        })
        .collect()
}

/// Patch the user-editable common name; returns false when no row matched
pub async fn update_common_name(pool: &SqlitePool, id: Uuid, common_name: &str) -> Result<bool> {
    let id_str = id.to_string();

    let result = sqlx::query("UPDATE plants SET common_name = ? WHERE id = ?")
        .bind(common_name)
        .bind(id_str)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a plant record; returns false when no row matched
pub async fn delete_plant(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let id_str = id.to_string();

    let result = sqlx::query("DELETE FROM plants WHERE id = ?")
        .bind(id_str)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn record_from_row(row: sqlx::sqlite::SqliteRow) -> Result<PlantRecord> {
    Ok(PlantRecord {
        id: parse_uuid(row.get("id"))?,
        image_data: row.get("image_data"),
        scientific_name: row.get("scientific_name"),
        common_name: row.get("common_name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        city: row.get("city"),
        location_name: row.get("location_name"),
        wiki_description: row.get("wiki_description"),
        family: row.get("family"),
        genus: row.get("genus"),
        care_instructions: row.get("care_instructions"),
        enhanced_description: row.get("enhanced_description"),
        created_at: parse_timestamp(row.get("created_at"))?,
        owner_id: row.get("owner_id"),
    })
}

fn parse_uuid(value: String) -> Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|e| scanplant_common::Error::Internal(format!("Failed to parse id: {}", e)))
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| scanplant_common::Error::Internal(format!("Failed to parse created_at: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plant::{PlantDraft, ResolvedLocation};

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    fn test_record(scientific_name: &str) -> PlantRecord {
        let draft = PlantDraft {
            scientific_name: Some(scientific_name.to_string()),
            common_name: Some("Rosa".to_string()),
            family: Some("Rosaceae".to_string()),
            genus: Some("Rosa".to_string()),
            wiki_description: Some("Uma rosa.".to_string()),
            wiki_url: Some("https://pt.wikipedia.org/wiki/Rosa".to_string()),
            enhanced_description: Some("Planta ornamental.".to_string()),
            care_instructions: Some("Regar.".to_string()),
        };
        PlantRecord::seal(
            &draft,
            "data:image/jpeg;base64,AAAA".to_string(),
            None,
            ResolvedLocation {
                location_name: "Rua A, Centro, Lisboa".to_string(),
                city: "Lisboa".to_string(),
            },
            Some("user-1".to_string()),
        )
    }

    #[tokio::test]
    async fn insert_then_get_roundtrip() {
        let pool = test_pool().await;
        let record = test_record("Rosa gallica");

        insert_plant(&pool, &record).await.unwrap();

        let loaded = get_plant(&pool, record.id).await.unwrap().unwrap();
        assert_eq!(loaded.scientific_name, "Rosa gallica");
        assert_eq!(loaded.common_name, "Rosa");
        assert_eq!(loaded.city, "Lisboa");
        assert_eq!(loaded.owner_id.as_deref(), Some("user-1"));
        assert!(loaded.latitude.is_none());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let pool = test_pool().await;
        assert!(get_plant(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_owner() {
        let pool = test_pool().await;
        insert_plant(&pool, &test_record("Rosa gallica")).await.unwrap();

        let mut other = test_record("Aloe vera");
        other.owner_id = Some("user-2".to_string());
        insert_plant(&pool, &other).await.unwrap();

        let all = list_plants(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let mine = list_plants(&pool, Some("user-2")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].scientific_name, "Aloe vera");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let pool = test_pool().await;
        let record = test_record("Rosa gallica");
        insert_plant(&pool, &record).await.unwrap();

        assert!(update_common_name(&pool, record.id, "Rosa do jardim").await.unwrap());
        let loaded = get_plant(&pool, record.id).await.unwrap().unwrap();
        assert_eq!(loaded.common_name, "Rosa do jardim");

        assert!(delete_plant(&pool, record.id).await.unwrap());
        assert!(!delete_plant(&pool, record.id).await.unwrap());
        assert!(get_plant(&pool, record.id).await.unwrap().is_none());
    }
}
