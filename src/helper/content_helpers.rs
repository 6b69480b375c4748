use chrono::{DateTime, Utc};
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::helper::sanitization_helpers;
use crate::models::{default_excerpt_color, Category, Post, PostDraft};

/// Validation failures for content and campaign writes. All of these map to
/// 400 with a field-level message at the route layer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContentError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("field '{0}' is required for {1} posts")]
    MissingCategoryField(&'static str, &'static str),
    #[error("no slug could be derived; supply a slug, a title, or a fallback field")]
    MissingSlugSource,
    #[error("duration must be at least 1 day")]
    InvalidDuration,
    #[error("an image URL is required")]
    MissingMedia,
    #[error("unknown subcategory '{0}'")]
    UnknownSubcategory(String),
}

/// The marketplace subcategories the public site knows how to render.
const SUBCATEGORIES: [&str; 5] = [
    "Cosmetics",
    "Pharmaceutical",
    "Industrial Chemicals",
    "Laboratory Equipment",
    "Others",
];

/// Lowercases and strips to URL-safe characters: alphanumeric runs joined by
/// single hyphens, nothing else.
pub fn slugify(input: &str) -> String {
    let non_url_safe = Regex::new(r"[^a-z0-9]+").unwrap();
    non_url_safe
        .replace_all(&input.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Slug source order: explicit slug, then title, then the category-specific
/// fallbacks (company name, product name, research topic, startup topic) --
/// first non-empty wins. Collisions are detected at persist time and
/// rejected outright; no disambiguating suffix is appended.
pub fn derive_slug(draft: &PostDraft) -> Result<String, ContentError> {
    let source = [
        draft.slug.as_deref(),
        draft.title.as_deref(),
        draft.company_name.as_deref(),
        draft.product_name.as_deref(),
        draft.research_topic.as_deref(),
        draft.topic.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.trim().is_empty())
    .ok_or(ContentError::MissingSlugSource)?;

    let slug = slugify(source);
    if slug.is_empty() {
        return Err(ContentError::MissingSlugSource);
    }
    Ok(slug)
}

/// expiry = created_at + duration calendar days, Chemical Mart only. Every
/// mutation path recomputes this; it is never accepted from a caller.
pub fn expiry_for(
    category: Category,
    created_at: DateTime<Utc>,
    ad_duration: Option<u32>,
) -> Option<DateTime<Utc>> {
    match (category, ad_duration) {
        (Category::ChemicalMart, Some(days)) => {
            Some(created_at + chrono::Duration::days(i64::from(days)))
        }
        _ => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Category-conditional requiredness, enforced server-side on every write.
/// Chemical Mart is the only category with a hard extra field set; the rest
/// only need title and content.
fn check_required_fields(post: &Post) -> Result<(), ContentError> {
    if post.content.trim().is_empty() {
        return Err(ContentError::MissingField("content"));
    }
    match post.category {
        Category::ChemicalMart => {
            let required: [(&str, bool); 5] = [
                ("company_name", non_empty(&post.company_name).is_some()),
                ("product_name", non_empty(&post.product_name).is_some()),
                ("contact_number", non_empty(&post.contact_number).is_some()),
                ("ad_size", post.ad_size.is_some()),
                ("ad_duration", post.ad_duration.is_some()),
            ];
            for (field, present) in required {
                if !present {
                    return Err(ContentError::MissingCategoryField(field, "Chemical Mart"));
                }
            }
            if post.ad_duration.is_some_and(|d| d < 1) {
                return Err(ContentError::InvalidDuration);
            }
            if let Some(sub) = &post.subcategory {
                if !SUBCATEGORIES.contains(&sub.as_str()) {
                    return Err(ContentError::UnknownSubcategory(sub.clone()));
                }
            }
        }
        _ => {
            if post.title.trim().is_empty() {
                return Err(ContentError::MissingField("title"));
            }
        }
    }
    Ok(())
}

/// Validates and normalises an admin create submission into a persistable
/// post: slug and expiry derived, content sanitised, title defaulted from
/// the slug source for Chemical Mart listings submitted without one.
pub fn build_post(draft: &PostDraft, now: DateTime<Utc>) -> Result<Post, ContentError> {
    let category = draft.category.ok_or(ContentError::MissingField("category"))?;
    let slug = derive_slug(draft)?;

    let title = match non_empty(&draft.title) {
        Some(title) => title.to_string(),
        None => [&draft.company_name, &draft.product_name, &draft.research_topic, &draft.topic]
            .into_iter()
            .find_map(|f| non_empty(f))
            .unwrap_or_default()
            .to_string(),
    };

    let content = draft
        .content
        .as_deref()
        .map(sanitization_helpers::sanitize_rich_content)
        .unwrap_or_default();

    let mut post = Post {
        id: Uuid::new_v4(),
        slug,
        title,
        content,
        image: draft.image.clone().unwrap_or_default(),
        category,
        author: non_empty(&draft.author).unwrap_or("Admin").to_string(),
        created_at: now,
        views: 0,
        is_story_of_the_day: draft.is_story_of_the_day.unwrap_or(false),
        excerpt_color: non_empty(&draft.excerpt_color)
            .map(str::to_string)
            .unwrap_or_else(default_excerpt_color),
        company_name: draft.company_name.clone(),
        product_name: draft.product_name.clone(),
        contact_number: draft.contact_number.clone(),
        website: draft.website.clone(),
        email: draft.email.clone(),
        subcategory: draft.subcategory.clone(),
        ad_size: draft.ad_size,
        ad_duration: draft.ad_duration,
        expiry_date: None,
        research_topic: draft.research_topic.clone(),
        video: draft.video.clone(),
        ceo_details: draft.ceo_details.clone(),
        company_services: draft.company_services.clone(),
        early_beginning: draft.early_beginning.clone(),
        fails: draft.fails.clone(),
        success: draft.success.clone(),
        awards: draft.awards.clone(),
        topic: draft.topic.clone(),
    };

    check_required_fields(&post)?;
    post.expiry_date = expiry_for(post.category, post.created_at, post.ad_duration);
    Ok(post)
}

/// Partial admin edit: only supplied fields overwrite, the slug and creation
/// time stay stable, and the expiry is recomputed after the merge so it can
/// never go stale.
pub fn apply_update(post: &mut Post, draft: &PostDraft) -> Result<(), ContentError> {
    if let Some(title) = non_empty(&draft.title) {
        post.title = title.to_string();
    }
    if let Some(content) = draft.content.as_deref() {
        post.content = sanitization_helpers::sanitize_rich_content(content);
    }
    if let Some(category) = draft.category {
        post.category = category;
    }
    if let Some(image) = non_empty(&draft.image) {
        post.image = image.to_string();
    }
    if let Some(flag) = draft.is_story_of_the_day {
        post.is_story_of_the_day = flag;
    }
    if let Some(color) = non_empty(&draft.excerpt_color) {
        post.excerpt_color = color.to_string();
    }

    let optional_fields = [
        (&draft.company_name, &mut post.company_name),
        (&draft.product_name, &mut post.product_name),
        (&draft.contact_number, &mut post.contact_number),
        (&draft.website, &mut post.website),
        (&draft.email, &mut post.email),
        (&draft.subcategory, &mut post.subcategory),
        (&draft.research_topic, &mut post.research_topic),
        (&draft.video, &mut post.video),
        (&draft.ceo_details, &mut post.ceo_details),
        (&draft.company_services, &mut post.company_services),
        (&draft.early_beginning, &mut post.early_beginning),
        (&draft.fails, &mut post.fails),
        (&draft.success, &mut post.success),
        (&draft.awards, &mut post.awards),
        (&draft.topic, &mut post.topic),
    ];
    for (incoming, stored) in optional_fields {
        if let Some(value) = incoming {
            *stored = Some(value.clone());
        }
    }
    if let Some(size) = draft.ad_size {
        post.ad_size = Some(size);
    }
    if let Some(days) = draft.ad_duration {
        post.ad_duration = Some(days);
    }

    check_required_fields(post)?;
    post.expiry_date = expiry_for(post.category, post.created_at, post.ad_duration);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::AdSize;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    fn mart_draft() -> PostDraft {
        PostDraft {
            content: Some("<p>Bulk ethanol, 99.9%</p>".to_string()),
            category: Some(Category::ChemicalMart),
            company_name: Some("Helix Labs".to_string()),
            product_name: Some("Ethanol".to_string()),
            contact_number: Some("+91 98000 00000".to_string()),
            ad_size: Some(AdSize::TwoByOne),
            ad_duration: Some(30),
            ..PostDraft::default()
        }
    }

    #[test]
    fn slugify_strips_to_url_safe() {
        assert_eq!(slugify("Solvent Prices: Q2 Review!"), "solvent-prices-q2-review");
        assert_eq!(slugify("  --Ethanol 99.9%--  "), "ethanol-99-9");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slug_falls_back_through_category_fields() {
        let mut draft = mart_draft();
        assert_eq!(derive_slug(&draft).unwrap(), "helix-labs");

        draft.company_name = None;
        assert_eq!(derive_slug(&draft).unwrap(), "ethanol");

        draft.title = Some("Ethanol supply".to_string());
        assert_eq!(derive_slug(&draft).unwrap(), "ethanol-supply");

        draft.slug = Some("Custom Slug".to_string());
        assert_eq!(derive_slug(&draft).unwrap(), "custom-slug");
    }

    #[test]
    fn missing_slug_source_is_rejected() {
        let draft = PostDraft {
            content: Some("body".to_string()),
            category: Some(Category::NewsRoundup),
            ..PostDraft::default()
        };
        assert_eq!(derive_slug(&draft).unwrap_err(), ContentError::MissingSlugSource);
    }

    #[test]
    fn chemical_mart_requires_its_field_set() {
        let mut draft = mart_draft();
        draft.contact_number = None;
        assert_eq!(
            build_post(&draft, now()).unwrap_err(),
            ContentError::MissingCategoryField("contact_number", "Chemical Mart")
        );
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let mut draft = mart_draft();
        draft.company_name = Some("   ".to_string());
        assert_eq!(
            build_post(&draft, now()).unwrap_err(),
            ContentError::MissingCategoryField("company_name", "Chemical Mart")
        );

        draft.company_name = Some("Helix Labs".to_string());
        draft.product_name = Some(String::new());
        assert_eq!(
            build_post(&draft, now()).unwrap_err(),
            ContentError::MissingCategoryField("product_name", "Chemical Mart")
        );
    }

    #[test]
    fn unknown_subcategory_is_rejected() {
        let mut draft = mart_draft();
        draft.subcategory = Some("Agrochemicals".to_string());
        assert_eq!(
            build_post(&draft, now()).unwrap_err(),
            ContentError::UnknownSubcategory("Agrochemicals".to_string())
        );
        draft.subcategory = Some("Pharmaceutical".to_string());
        assert!(build_post(&draft, now()).is_ok());
    }

    #[test]
    fn chemical_mart_expiry_is_created_at_plus_duration_days() {
        let post = build_post(&mart_draft(), now()).unwrap();
        assert_eq!(post.expiry_date, Some(now() + Duration::days(30)));
        // Title defaulted from the slug source.
        assert_eq!(post.title, "Helix Labs");
    }

    #[test]
    fn other_categories_never_carry_an_expiry() {
        let draft = PostDraft {
            title: Some("Weekly roundup".to_string()),
            content: Some("body".to_string()),
            category: Some(Category::NewsRoundup),
            ..PostDraft::default()
        };
        let post = build_post(&draft, now()).unwrap();
        assert_eq!(post.expiry_date, None);
        assert_eq!(post.slug, "weekly-roundup");
        assert_eq!(post.author, "Admin");
    }

    #[test]
    fn update_recomputes_expiry_and_keeps_slug_stable() {
        let mut post = build_post(&mart_draft(), now()).unwrap();
        let update = PostDraft {
            ad_duration: Some(7),
            ..PostDraft::default()
        };
        apply_update(&mut post, &update).unwrap();
        assert_eq!(post.expiry_date, Some(now() + Duration::days(7)));
        assert_eq!(post.slug, "helix-labs");
    }

    #[test]
    fn update_cannot_strip_a_required_field_via_category_switch() {
        let draft = PostDraft {
            title: Some("Profile: Helix".to_string()),
            content: Some("body".to_string()),
            category: Some(Category::CorporateProfile),
            ..PostDraft::default()
        };
        let mut post = build_post(&draft, now()).unwrap();
        let update = PostDraft {
            category: Some(Category::ChemicalMart),
            ..PostDraft::default()
        };
        assert!(matches!(
            apply_update(&mut post, &update).unwrap_err(),
            ContentError::MissingCategoryField(_, _)
        ));
    }
}
