use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::DbError;
use crate::models::Ad;

pub const ADS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("ads");

pub fn create_ad(db: &Database, ad: &Ad) -> Result<(), DbError> {
    let id_bytes = ad.id.into_bytes();
    let doc = serde_json::to_string(ad)?;

    let write_txn = db.begin_write()?;
    {
        let mut ads_table = write_txn.open_table(ADS)?;
        ads_table.insert(&id_bytes, doc.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

/// Campaigns visible to the public right now, i.e. the effective-activation
/// predicate evaluated against the current clock, never the stored flag
/// alone. Ordered by start date ascending (id as tie-break) so page loads
/// are deterministic.
pub fn list_active(db: &Database, now: DateTime<Utc>) -> Result<Vec<Ad>, DbError> {
    let mut ads = read_all(db)?;
    ads.retain(|ad| ad.is_effectively_active(now));
    ads.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(ads)
}

/// Admin view: every campaign regardless of state, newest-first.
pub fn list_all(db: &Database) -> Result<Vec<Ad>, DbError> {
    let mut ads = read_all(db)?;
    ads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(ads)
}

fn read_all(db: &Database) -> Result<Vec<Ad>, DbError> {
    let read_txn = db.begin_read()?;
    let ads_table = read_txn.open_table(ADS)?;
    let mut ads = Vec::new();
    for item in ads_table.iter()? {
        let (_, doc) = item?;
        ads.push(serde_json::from_str(doc.value())?);
    }
    Ok(ads)
}

/// Soft delete: clears `is_active` but keeps the record for history.
/// Retiring an already-retired campaign is a successful no-op.
pub fn retire_ad(db: &Database, id: Uuid) -> Result<Ad, DbError> {
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    let retired = {
        let mut ads_table = write_txn.open_table(ADS)?;
        let mut ad: Ad = {
            let guard = ads_table
                .get(&id_bytes)?
                .ok_or_else(|| DbError::NotFound(id.to_string()))?;
            serde_json::from_str(guard.value())?
        };
        if ad.is_active {
            ad.is_active = false;
            let doc = serde_json::to_string(&ad)?;
            ads_table.insert(&id_bytes, doc.as_str())?;
        }
        ad
    };
    write_txn.commit()?;
    Ok(retired)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use redb::Database;
    use uuid::Uuid;

    use super::*;
    use crate::models::{campaign_end_date, AdActionType, AdFormat};

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create(dir.path().join("content.db")).unwrap();
        crate::setup::db_setup::setup_content_db(&db).unwrap();
        (dir, db)
    }

    fn sample_ad(title: &str, start: chrono::DateTime<Utc>, duration_days: u32) -> Ad {
        Ad {
            id: Uuid::new_v4(),
            title: title.to_string(),
            image: "https://cdn.example.com/banner.png".to_string(),
            link: "https://example.com".to_string(),
            action_type: AdActionType::Link,
            whatsapp_number: None,
            format: AdFormat::Card,
            start_date: start,
            duration_days,
            end_date: campaign_end_date(start, duration_days),
            is_active: true,
            created_at: start,
        }
    }

    #[test]
    fn active_listing_applies_the_effective_predicate() {
        let (_dir, db) = open_db();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();

        let running = sample_ad("running", now - Duration::days(2), 7);
        let expired = sample_ad("expired", now - Duration::days(30), 7);
        let future = sample_ad("future", now + Duration::days(1), 7);
        let mut retired = sample_ad("retired", now - Duration::days(1), 7);
        retired.is_active = false;

        for ad in [&running, &expired, &future, &retired] {
            create_ad(&db, ad).unwrap();
        }

        let active = list_active(&db, now).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "running");

        // All four survive in the admin view.
        assert_eq!(list_all(&db).unwrap().len(), 4);
    }

    #[test]
    fn active_listing_orders_by_start_date_ascending() {
        let (_dir, db) = open_db();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let late = sample_ad("late", now - Duration::days(1), 30);
        let early = sample_ad("early", now - Duration::days(5), 30);
        create_ad(&db, &late).unwrap();
        create_ad(&db, &early).unwrap();

        let titles: Vec<String> = list_active(&db, now)
            .unwrap()
            .into_iter()
            .map(|ad| ad.title)
            .collect();
        assert_eq!(titles, vec!["early".to_string(), "late".to_string()]);
    }

    #[test]
    fn retire_is_idempotent() {
        let (_dir, db) = open_db();
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let ad = sample_ad("banner", now, 14);
        create_ad(&db, &ad).unwrap();

        let first = retire_ad(&db, ad.id).unwrap();
        assert!(!first.is_active);
        let second = retire_ad(&db, ad.id).unwrap();
        assert!(!second.is_active);
        assert_eq!(second.end_date, first.end_date);

        assert!(matches!(
            retire_ad(&db, Uuid::new_v4()).unwrap_err(),
            DbError::NotFound(_)
        ));
    }
}
