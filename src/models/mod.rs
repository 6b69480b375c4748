use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editorial categories. The wire names are the exact strings the public
/// site renders, so serde uses them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "News Roundup")]
    NewsRoundup,
    #[serde(rename = "Chemical Mart")]
    ChemicalMart,
    #[serde(rename = "Research & Reports")]
    ResearchAndReports,
    #[serde(rename = "Corporate Profile")]
    CorporateProfile,
    #[serde(rename = "START UP")]
    StartUp,
    #[serde(rename = "Services")]
    Services,
    #[serde(rename = "Executive Brief")]
    ExecutiveBrief,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NewsRoundup => "News Roundup",
            Category::ChemicalMart => "Chemical Mart",
            Category::ResearchAndReports => "Research & Reports",
            Category::CorporateProfile => "Corporate Profile",
            Category::StartUp => "START UP",
            Category::Services => "Services",
            Category::ExecutiveBrief => "Executive Brief",
        }
    }

    /// Exact, case-sensitive match. "All" is a filter sentinel handled by the
    /// caller, not a category.
    pub fn parse(s: &str) -> Option<Category> {
        match s {
            "News Roundup" => Some(Category::NewsRoundup),
            "Chemical Mart" => Some(Category::ChemicalMart),
            "Research & Reports" => Some(Category::ResearchAndReports),
            "Corporate Profile" => Some(Category::CorporateProfile),
            "START UP" => Some(Category::StartUp),
            "Services" => Some(Category::Services),
            "Executive Brief" => Some(Category::ExecutiveBrief),
            _ => None,
        }
    }
}

/// Grid footprint of a Chemical Mart listing, e.g. "2x1" = 2 columns, 1 row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdSize {
    #[serde(rename = "1x1")]
    OneByOne,
    #[serde(rename = "2x1")]
    TwoByOne,
    #[serde(rename = "1x2")]
    OneByTwo,
    #[serde(rename = "2x2")]
    TwoByTwo,
    #[serde(rename = "3x1")]
    ThreeByOne,
    #[serde(rename = "1x3")]
    OneByThree,
}

/// A content record. Storage uses this single wide shape for every category;
/// which optional fields are required is decided at the validation boundary
/// (see `helper::content_helpers`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: String,
    pub category: Category,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub is_story_of_the_day: bool,
    #[serde(default = "default_excerpt_color")]
    pub excerpt_color: String,

    // Chemical Mart
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub ad_size: Option<AdSize>,
    #[serde(default)]
    pub ad_duration: Option<u32>,
    /// Derived: created_at + ad_duration calendar days. Chemical Mart only.
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,

    // Research & Reports
    #[serde(default)]
    pub research_topic: Option<String>,
    #[serde(default)]
    pub video: Option<String>,

    // Corporate Profile
    #[serde(default)]
    pub ceo_details: Option<String>,
    #[serde(default)]
    pub company_services: Option<String>,
    #[serde(default)]
    pub early_beginning: Option<String>,
    #[serde(default)]
    pub fails: Option<String>,
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,

    // START UP
    #[serde(default)]
    pub topic: Option<String>,
}

pub fn default_excerpt_color() -> String {
    "#FFFF00".to_string()
}

/// Raw admin submission for creating or partially updating a post. Every
/// field is optional here; what is actually required depends on the category
/// and on whether this is a create or a merge.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<Category>,
    pub author: Option<String>,
    pub is_story_of_the_day: Option<bool>,
    pub excerpt_color: Option<String>,
    pub company_name: Option<String>,
    pub product_name: Option<String>,
    pub contact_number: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub subcategory: Option<String>,
    pub ad_size: Option<AdSize>,
    pub ad_duration: Option<u32>,
    pub research_topic: Option<String>,
    pub video: Option<String>,
    pub ceo_details: Option<String>,
    pub company_services: Option<String>,
    pub early_beginning: Option<String>,
    pub fails: Option<String>,
    pub success: Option<String>,
    pub awards: Option<String>,
    pub topic: Option<String>,
}

/// What clicking an ad does: open a link, or start a WhatsApp chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdActionType {
    Link,
    Whatsapp,
}

/// Where an ad surfaces: a one-off interstitial or an in-feed card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdFormat {
    Popup,
    Card,
}

/// A paid campaign. `end_date` is always derived from `start_date` and
/// `duration_days`; it is never accepted from a caller. "Deleting" a
/// campaign only clears `is_active` so history survives for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub link: String,
    pub action_type: AdActionType,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(rename = "type")]
    pub format: AdFormat,
    pub start_date: DateTime<Utc>,
    pub duration_days: u32,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    /// The activation predicate every public read must go through. The
    /// stored `is_active` flag alone is never trusted for visibility.
    pub fn is_effectively_active(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

/// start + N days. UTC has no DST, so a fixed-day offset is exact calendar
/// day arithmetic here.
pub fn campaign_end_date(start: DateTime<Utc>, duration_days: u32) -> DateTime<Utc> {
    start + chrono::Duration::days(i64::from(duration_days))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdDraft {
    pub title: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub action_type: Option<AdActionType>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(rename = "type", default)]
    pub format: Option<AdFormat>,
    pub duration_days: Option<u32>,
}

/// A reader comment. Created unapproved; moderation either approves or
/// deletes, never edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Pending-queue view of a comment, with the post title for context.
#[derive(Debug, Clone, Serialize)]
pub struct PendingComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub post_title: String,
}

/// Newsletter/contact lead. The lowercased email is the dedupe key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "moderator" => Some(Role::Moderator),
            _ => None,
        }
    }
}

/// A staff account. Password hashes never leave the database layer.
#[derive(Debug, Serialize)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_time: Option<String>,
}

/// Grid placement of one feed item. `cols_wide` is the column span above
/// the responsive breakpoint; only the 3x1 size differs there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridSpan {
    pub cols: u8,
    pub rows: u8,
    pub cols_wide: u8,
}

impl GridSpan {
    pub const DEFAULT: GridSpan = GridSpan { cols: 1, rows: 1, cols_wide: 1 };
}

/// One entry in a composed feed: an organic post or a paid campaign card.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum FeedEntry {
    Post(Post),
    Ad(Ad),
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub entry: FeedEntry,
    pub span: GridSpan,
}

pub mod db_operations;
