use crate::models::{Ad, AdSize, Category, FeedEntry, FeedItem, GridSpan, Post};

/// Grid footprint for a listing size. `cols_wide` only differs for 3x1,
/// which widens to three columns above the responsive breakpoint.
pub fn grid_span(size: AdSize) -> GridSpan {
    match size {
        AdSize::OneByOne => GridSpan::DEFAULT,
        AdSize::TwoByOne => GridSpan { cols: 2, rows: 1, cols_wide: 2 },
        AdSize::OneByTwo => GridSpan { cols: 1, rows: 2, cols_wide: 1 },
        AdSize::TwoByTwo => GridSpan { cols: 2, rows: 2, cols_wide: 2 },
        AdSize::ThreeByOne => GridSpan { cols: 2, rows: 1, cols_wide: 3 },
        AdSize::OneByThree => GridSpan { cols: 1, rows: 3, cols_wide: 1 },
    }
}

/// Only Chemical Mart listings carry a grid footprint; every other post and
/// every ad card renders as a single cell.
fn span_for_post(post: &Post) -> GridSpan {
    match (post.category, post.ad_size) {
        (Category::ChemicalMart, Some(size)) => grid_span(size),
        _ => GridSpan::DEFAULT,
    }
}

fn post_item(post: Post) -> FeedItem {
    let span = span_for_post(&post);
    FeedItem { entry: FeedEntry::Post(post), span }
}

fn ad_item(ad: Ad) -> FeedItem {
    FeedItem { entry: FeedEntry::Ad(ad), span: GridSpan::DEFAULT }
}

/// Home feed interleave: one ad after every 4th post while unconsumed ads
/// remain, each ad appearing at most once, and any ads still unplaced when
/// the posts run out are appended at the end. Campaigns a sponsor paid for
/// are never silently dropped here.
pub fn compose_home_feed(posts: Vec<Post>, ads: Vec<Ad>) -> Vec<FeedItem> {
    let mut feed = Vec::with_capacity(posts.len() + ads.len());
    let mut ads_iter = ads.into_iter();

    for (i, post) in posts.into_iter().enumerate() {
        feed.push(post_item(post));
        if (i + 1) % 4 == 0 {
            if let Some(ad) = ads_iter.next() {
                feed.push(ad_item(ad));
            }
        }
    }
    feed.extend(ads_iter.map(ad_item));
    feed
}

/// All-posts interleave: an ad after every 3rd post, cycling through the
/// active set so long lists repeat campaigns. Nothing is appended after the
/// last post.
pub fn compose_posts_feed(posts: Vec<Post>, ads: Vec<Ad>) -> Vec<FeedItem> {
    let mut feed = Vec::with_capacity(posts.len() + posts.len() / 3);
    let mut ad_index = 0usize;

    for (i, post) in posts.into_iter().enumerate() {
        feed.push(post_item(post));
        if (i + 1) % 3 == 0 && !ads.is_empty() {
            feed.push(ad_item(ads[ad_index % ads.len()].clone()));
            ad_index += 1;
        }
    }
    feed
}
