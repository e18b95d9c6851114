use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::models::*;
use crate::db::store::StoreError;
use crate::import::ProductDraft;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Initialize database connection and create tables
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        // Use sqlite:// with ?mode=rwc to create if it doesn't exist
        let database_url = format!("sqlite://{}?mode=rwc", database_path);
        info!("Connecting to {}", database_url);
        let pool = SqlitePool::connect(&database_url).await?;

        let db = Database { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// Create all necessary tables
    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        // Products table. discogs_id is UNIQUE so two racing imports of the
        // same release cannot both land.
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                short_description TEXT NOT NULL,
                sku TEXT UNIQUE,
                status TEXT NOT NULL DEFAULT '{}',
                discogs_id TEXT UNIQUE,
                image_path TEXT,
                image_url TEXT,
                image_alt TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            PRODUCT_STATUS_DRAFT
        ))
        .execute(&self.pool)
        .await?;

        // Per-product key/value metadata
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS product_meta (
                product_id TEXT NOT NULL,
                meta_key TEXT NOT NULL,
                meta_value TEXT NOT NULL,
                FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE,
                PRIMARY KEY (product_id, meta_key)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Category tree (genre → style)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES categories (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // NULL parents never compare equal in a plain UNIQUE, so key on IFNULL
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name_parent \
             ON categories (name, IFNULL(parent_id, ''))",
        )
        .execute(&self.pool)
        .await?;

        // Product-Category junction table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS product_categories (
                product_id TEXT NOT NULL,
                category_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES categories (id) ON DELETE CASCADE,
                PRIMARY KEY (product_id, category_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Global settings (Discogs token, default product status)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new product from a draft, returning its id
    ///
    /// A second product for the same Discogs release fails with
    /// `StoreError::Conflict`.
    pub async fn insert_product(&self, draft: &ProductDraft) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, short_description, sku,
                status, discogs_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.short_description)
        .bind(&draft.sku)
        .bind(draft.status.as_str())
        .bind(&draft.discogs_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!("Inserted product {} for release {}", id, draft.discogs_id);
                Ok(id)
            }
            // Only the discogs_id constraint means "already imported"; a clashing
            // sku from a draft hook stays a plain database error
            Err(sqlx::Error::Database(e))
                if e.is_unique_violation() && e.message().contains("products.discogs_id") =>
            {
                Err(StoreError::Conflict(draft.discogs_id.clone()))
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Find the product created from a Discogs release (duplicate guard)
    pub async fn find_product_by_discogs_id(
        &self,
        discogs_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT id FROM products WHERE discogs_id = ? LIMIT 1")
            .bind(discogs_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("id")))
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Option<DbProduct>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    pub async fn count_products(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// Insert or replace one metadata value
    pub async fn set_product_meta(
        &self,
        product_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO product_meta (product_id, meta_key, meta_value)
            VALUES (?, ?, ?)
            ON CONFLICT (product_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value
            "#,
        )
        .bind(product_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_product_meta(
        &self,
        product_id: &str,
    ) -> Result<Vec<DbProductMeta>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT product_id, meta_key, meta_value FROM product_meta \
             WHERE product_id = ? ORDER BY rowid",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DbProductMeta {
                product_id: row.get("product_id"),
                meta_key: row.get("meta_key"),
                meta_value: row.get("meta_value"),
            })
            .collect())
    }

    /// Get a category by name and parent, creating it when missing
    pub async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<DbCategory, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO categories (id, name, parent_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(parent_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, name, parent_id FROM categories WHERE name = ? AND parent_id IS ?",
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(category_from_row(&row))
    }

    /// Replace the categories assigned to a product
    pub async fn set_product_categories(
        &self,
        product_id: &str,
        category_ids: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM product_categories WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        for (position, category_id) in category_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO product_categories (product_id, category_id, position)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(product_id)
            .bind(category_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_product_categories(
        &self,
        product_id: &str,
    ) -> Result<Vec<DbCategory>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.parent_id
            FROM categories c
            JOIN product_categories pc ON pc.category_id = c.id
            WHERE pc.product_id = ?
            ORDER BY pc.position
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    pub async fn get_categories(&self) -> Result<Vec<DbCategory>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, name, parent_id FROM categories ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Record the sideloaded cover image of a product and its alt text
    pub async fn set_product_image(
        &self,
        product_id: &str,
        image_path: &str,
        image_url: &str,
        image_alt: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE products SET image_path = ?, image_url = ?, image_alt = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(image_path)
        .bind(image_url)
        .bind(image_alt)
        .bind(Utc::now().to_rfc3339())
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write a setting only when it has never been set
    pub async fn add_setting(&self, key: &str, value: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn product_from_row(row: &SqliteRow) -> Result<DbProduct, StoreError> {
    let status: String = row.get("status");

    Ok(DbProduct {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        short_description: row.get("short_description"),
        sku: row.get("sku"),
        status: status.parse().map_err(StoreError::InvalidData)?,
        discogs_id: row.get("discogs_id"),
        image_path: row.get("image_path"),
        image_url: row.get("image_url"),
        image_alt: row.get("image_alt"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
    })
}

fn category_from_row(row: &SqliteRow) -> DbCategory {
    DbCategory {
        id: row.get("id"),
        name: row.get("name"),
        parent_id: row.get("parent_id"),
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("Bad timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::CategoryBranch;
    use tempfile::TempDir;

    async fn test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    fn draft(discogs_id: &str) -> ProductDraft {
        ProductDraft {
            name: "Blue Train".to_string(),
            description: "<p>Hard bop.</p>".to_string(),
            short_description: "1957 • US • Jazz".to_string(),
            sku: format!("DISCOGS-{}", discogs_id),
            status: ProductStatus::Draft,
            discogs_id: discogs_id.to_string(),
            meta: Vec::new(),
            categories: vec![CategoryBranch {
                name: "Jazz".to_string(),
                children: vec!["Hard Bop".to_string()],
            }],
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back_product() {
        let (db, _dir) = test_db().await;

        let id = db.insert_product(&draft("1001")).await.unwrap();
        let product = db.get_product(&id).await.unwrap().unwrap();

        assert_eq!(product.name, "Blue Train");
        assert_eq!(product.sku.as_deref(), Some("DISCOGS-1001"));
        assert_eq!(product.status, ProductStatus::Draft);
        assert_eq!(
            db.find_product_by_discogs_id("1001").await.unwrap(),
            Some(id)
        );
        assert_eq!(db.find_product_by_discogs_id("1002").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unique_discogs_id_maps_to_conflict() {
        let (db, _dir) = test_db().await;

        db.insert_product(&draft("1001")).await.unwrap();
        let err = db.insert_product(&draft("1001")).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict(ref id) if id == "1001"));
        assert_eq!(db.count_products().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sku_clash_is_not_a_release_conflict() {
        let (db, _dir) = test_db().await;

        db.insert_product(&draft("1001")).await.unwrap();
        let mut clash = draft("1002");
        clash.sku = "DISCOGS-1001".to_string();
        let err = db.insert_product(&clash).await.unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(db.count_products().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_product_image_stores_alt_text() {
        let (db, _dir) = test_db().await;
        let id = db.insert_product(&draft("55")).await.unwrap();

        db.set_product_image(&id, "/media/a.jpg", "https://img/a.jpg", "Blue Train")
            .await
            .unwrap();

        let product = db.get_product(&id).await.unwrap().unwrap();
        assert_eq!(product.image_path.as_deref(), Some("/media/a.jpg"));
        assert_eq!(product.image_url.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(product.image_alt.as_deref(), Some("Blue Train"));
    }

    #[tokio::test]
    async fn test_get_or_create_category_is_keyed_on_name_and_parent() {
        let (db, _dir) = test_db().await;

        let jazz = db.get_or_create_category("Jazz", None).await.unwrap();
        let again = db.get_or_create_category("Jazz", None).await.unwrap();
        assert_eq!(jazz.id, again.id);
        assert_eq!(jazz.parent_id, None);

        let funk = db.get_or_create_category("Funk", None).await.unwrap();
        let fusion_in_jazz = db
            .get_or_create_category("Fusion", Some(&jazz.id))
            .await
            .unwrap();
        let fusion_in_funk = db
            .get_or_create_category("Fusion", Some(&funk.id))
            .await
            .unwrap();

        assert_ne!(fusion_in_jazz.id, fusion_in_funk.id);
        assert_eq!(fusion_in_jazz.parent_id.as_deref(), Some(jazz.id.as_str()));
        assert_eq!(db.get_categories().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_product_meta_upserts() {
        let (db, _dir) = test_db().await;
        let id = db.insert_product(&draft("7")).await.unwrap();

        db.set_product_meta(&id, "artist", "John Coltrane")
            .await
            .unwrap();
        db.set_product_meta(&id, "country", "US").await.unwrap();
        db.set_product_meta(&id, "artist", "John Coltrane Quintet")
            .await
            .unwrap();

        let meta = db.get_product_meta(&id).await.unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[0].meta_key, "artist");
        assert_eq!(meta[0].meta_value, "John Coltrane Quintet");
    }

    #[tokio::test]
    async fn test_settings_add_does_not_overwrite() {
        let (db, _dir) = test_db().await;

        assert!(db.add_setting("default_product_status", "draft").await.unwrap());
        db.set_setting("default_product_status", "publish")
            .await
            .unwrap();
        assert!(!db.add_setting("default_product_status", "draft").await.unwrap());

        assert_eq!(
            db.get_setting("default_product_status").await.unwrap(),
            Some("publish".to_string())
        );
        assert_eq!(db.get_setting("missing").await.unwrap(), None);
    }
}
