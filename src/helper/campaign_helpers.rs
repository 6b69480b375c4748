use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::helper::content_helpers::ContentError;
use crate::models::{campaign_end_date, Ad, AdActionType, AdDraft, AdFormat};

/// Validates a new campaign submission and derives the schedule. The
/// campaign runs from the moment of creation; the end date is computed
/// here and on every later schedule change, never taken from the caller.
pub fn build_campaign(draft: &AdDraft, now: DateTime<Utc>) -> Result<Ad, ContentError> {
    let title = draft
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ContentError::MissingField("title"))?;
    let image = draft
        .image
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .ok_or(ContentError::MissingMedia)?;
    let duration_days = draft.duration_days.ok_or(ContentError::InvalidDuration)?;
    if duration_days < 1 {
        return Err(ContentError::InvalidDuration);
    }

    let action_type = draft.action_type.unwrap_or(AdActionType::Link);
    // The two click actions are mutually exclusive: a WhatsApp campaign
    // needs a number and gets a placeholder link, a link campaign drops
    // any number that was sent along.
    let (link, whatsapp_number) = match action_type {
        AdActionType::Whatsapp => {
            let number = draft
                .whatsapp_number
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or(ContentError::MissingField("whatsapp_number"))?;
            ("#".to_string(), Some(number.to_string()))
        }
        AdActionType::Link => {
            let link = draft
                .link
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or("#");
            (link.to_string(), None)
        }
    };

    Ok(Ad {
        id: Uuid::new_v4(),
        title: title.to_string(),
        image: image.to_string(),
        link,
        action_type,
        whatsapp_number,
        format: draft.format.unwrap_or(AdFormat::Card),
        start_date: now,
        duration_days,
        end_date: campaign_end_date(now, duration_days),
        is_active: true,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn draft() -> AdDraft {
        AdDraft {
            title: Some("Summer solvents sale".to_string()),
            image: Some("https://cdn.example.com/banner.png".to_string()),
            link: Some("https://example.com/sale".to_string()),
            action_type: None,
            whatsapp_number: None,
            format: None,
            duration_days: Some(14),
        }
    }

    #[test]
    fn end_date_is_start_plus_duration() {
        let ad = build_campaign(&draft(), now()).unwrap();
        assert_eq!(ad.end_date, now() + Duration::days(14));
        assert!(ad.is_active);
        assert_eq!(ad.action_type, AdActionType::Link);
        assert_eq!(ad.format, AdFormat::Card);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut d = draft();
        d.duration_days = Some(0);
        assert_eq!(build_campaign(&d, now()).unwrap_err(), ContentError::InvalidDuration);
        d.duration_days = None;
        assert_eq!(build_campaign(&d, now()).unwrap_err(), ContentError::InvalidDuration);
    }

    #[test]
    fn missing_image_is_rejected() {
        let mut d = draft();
        d.image = Some("   ".to_string());
        assert_eq!(build_campaign(&d, now()).unwrap_err(), ContentError::MissingMedia);
    }

    #[test]
    fn whatsapp_campaign_needs_a_number_and_gets_a_placeholder_link() {
        let mut d = draft();
        d.action_type = Some(AdActionType::Whatsapp);
        assert_eq!(
            build_campaign(&d, now()).unwrap_err(),
            ContentError::MissingField("whatsapp_number")
        );

        d.whatsapp_number = Some("+911234567890".to_string());
        let ad = build_campaign(&d, now()).unwrap();
        assert_eq!(ad.link, "#");
        assert_eq!(ad.whatsapp_number.as_deref(), Some("+911234567890"));
    }

    #[test]
    fn link_campaign_drops_a_stray_whatsapp_number() {
        let mut d = draft();
        d.whatsapp_number = Some("+911234567890".to_string());
        let ad = build_campaign(&d, now()).unwrap();
        assert_eq!(ad.whatsapp_number, None);
        assert_eq!(ad.link, "https://example.com/sale");
    }
}
