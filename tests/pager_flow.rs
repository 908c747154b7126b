use async_trait::async_trait;
use stay_feed::pager::{CursorPager, PageRequest};
use stay_feed::prelude::*;
use stay_feed::{AccommodationDetail, Cursor, ListingItem, Page, StayDates};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Listing source that replays scripted responses and records every request.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page, FeedError>>>,
    requests: Mutex<Vec<PageRequest>>,
    details: Mutex<Vec<(u64, StayDates)>>,
    yield_once: bool,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Page, FeedError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            details: Mutex::new(Vec::new()),
            yield_once: false,
        }
    }

    /// Suspend once inside every fetch so other futures can interleave.
    fn yielding(mut self) -> Self {
        self.yield_once = true;
        self
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FeedError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        if self.yield_once {
            tokio::task::yield_now().await;
        }
        next.unwrap_or_else(|| Err(FeedError::Network("no scripted response".into())))
    }

    async fn fetch_detail(
        &self,
        id: u64,
        dates: &StayDates,
    ) -> Result<AccommodationDetail, FeedError> {
        self.details.lock().unwrap().push((id, dates.clone()));
        let raw = format!(r#"{{"id":{id},"name":"Seaside Hotel","rooms":[]}}"#);
        serde_json::from_str(&raw).map_err(|e| FeedError::MalformedResponse(e.to_string()))
    }
}

fn item(id: u64, min_price: u64) -> ListingItem {
    ListingItem {
        id,
        title: format!("Stay #{id}"),
        min_price,
        region: "Seoul".to_string(),
        thumbnail_url: format!("https://picsum.photos/id/{id}/200"),
    }
}

fn page(ids: std::ops::Range<u64>, has_more: bool, next_id: u64, next_price: u64) -> Page {
    Page {
        items: ids.map(|id| item(id, 10_000 + id)).collect(),
        has_more,
        next_cursor_id: next_id,
        next_cursor_min_price: next_price,
    }
}

fn feed(source: ScriptedSource) -> ListingFeed<MemoryStore, ScriptedSource> {
    ListingFeed::new(MemoryStore::new(), source, &FeedConfig::default())
}

#[tokio::test]
async fn first_request_has_no_cursor_then_follows_server_cursor() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![
        Ok(page(1..13, true, 7, 30_000)),
        Ok(page(13..25, true, 19, 41_000)),
    ]));

    assert_eq!(feed.enter("hotel").await, ViewPhase::Cold);
    let first = feed.load_more("hotel").await?;
    assert_eq!(
        first,
        LoadOutcome::Appended {
            items: 12,
            has_more: true
        }
    );
    assert_eq!(feed.phase("hotel"), ViewPhase::Loaded);

    feed.load_more("hotel").await?;

    let requests = feed.source().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].query_pairs(),
        vec![("category", "hotel".to_string()), ("size", "12".to_string())]
    );

    let second = requests[1].query_pairs();
    assert!(second.contains(&("cursorId", "7".to_string())));
    assert!(second.contains(&("cursorMinPrice", "30000".to_string())));

    assert_eq!(feed.items("hotel").len(), 24);
    Ok(())
}

#[test]
fn advance_derives_cursor_until_last_page() {
    let pages = [
        page(1..3, true, 2, 12_000),
        page(3..5, true, 4, 15_000),
        page(5..6, false, 0, 0),
    ];

    let cursors: Vec<Option<Cursor>> = pages.iter().map(CursorPager::advance).collect();
    assert_eq!(
        cursors,
        vec![
            Some(Cursor {
                min_price: 12_000,
                id: 2
            }),
            Some(Cursor {
                min_price: 15_000,
                id: 4
            }),
            None,
        ]
    );
}

#[test]
fn filter_seeds_first_page_cursor_price() {
    let pager = CursorPager::new(12);

    let cold = pager.next_request(Cursor::FIRST, PriceFilter::From50000, "motel");
    assert_eq!(
        cold.cursor,
        Cursor {
            min_price: 50_000,
            id: 0
        }
    );

    // later pages ignore the filter and trust the server's cursor
    let later = pager.next_request(
        Cursor {
            min_price: 61_000,
            id: 33,
        },
        PriceFilter::From50000,
        "motel",
    );
    assert_eq!(later.cursor.min_price, 61_000);
    assert_eq!(later.cursor.id, 33);
}

#[tokio::test]
async fn last_page_stops_sentinel_fetches() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![Ok(page(1..5, false, 0, 0))]));
    feed.enter("hotel").await;

    let outcome = feed.on_sentinel("hotel", 1.0).await?;
    assert_eq!(
        outcome,
        LoadOutcome::Appended {
            items: 4,
            has_more: false
        }
    );

    // sentinel stays on screen
    for _ in 0..3 {
        assert_eq!(feed.on_sentinel("hotel", 1.0).await?, LoadOutcome::Exhausted);
    }
    assert_eq!(feed.source().requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn partially_visible_sentinel_does_not_fetch() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![Ok(page(1..5, true, 4, 9_000))]));
    feed.enter("pension").await;

    assert_eq!(
        feed.on_sentinel("pension", 0.99).await?,
        LoadOutcome::NotVisible
    );
    assert!(feed.source().requests().is_empty());
    assert_eq!(feed.phase("pension"), ViewPhase::Cold);
    Ok(())
}

#[tokio::test]
async fn filter_change_abandons_cache_and_restarts() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![
        Ok(page(1..13, true, 12, 22_000)),
        Ok(page(100..112, true, 111, 52_000)),
    ]));
    feed.enter("hotel").await;
    feed.load_more("hotel").await?;
    assert_eq!(feed.items("hotel").len(), 12);

    feed.set_filter("hotel", PriceFilter::From50000);
    assert_eq!(feed.filter("hotel"), PriceFilter::From50000);
    assert_eq!(feed.phase("hotel"), ViewPhase::Cold);
    assert!(feed.items("hotel").is_empty());

    feed.load_more("hotel").await?;

    let requests = feed.source().requests();
    let pairs = requests[1].query_pairs();
    assert!(pairs.contains(&("cursorMinPrice", "50000".to_string())));
    assert!(!pairs.iter().any(|(k, _)| *k == "cursorId"));

    let ids: Vec<u64> = feed.items("hotel").iter().map(|i| i.id).collect();
    assert_eq!(ids, (100..112).collect::<Vec<_>>());

    // going back to the old filter starts over too
    feed.set_filter("hotel", PriceFilter::Lowest);
    assert!(feed.items("hotel").is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_triggers_collapse_into_one_request() -> anyhow::Result<()> {
    let feed = feed(
        ScriptedSource::new(vec![
            Ok(page(1..13, true, 12, 20_000)),
            Ok(page(13..25, true, 24, 30_000)),
        ])
        .yielding(),
    );
    feed.enter("hotel").await;

    let (a, b) = tokio::join!(feed.on_sentinel("hotel", 1.0), feed.on_sentinel("hotel", 1.0));
    let mut outcomes = vec![a?, b?];
    outcomes.sort_by_key(|o| matches!(o, LoadOutcome::InFlight));

    assert_eq!(
        outcomes,
        vec![
            LoadOutcome::Appended {
                items: 12,
                has_more: true
            },
            LoadOutcome::InFlight,
        ]
    );
    assert_eq!(feed.source().requests().len(), 1);
    assert_eq!(feed.items("hotel").len(), 12);
    Ok(())
}

#[tokio::test]
async fn failed_fetch_keeps_cursor() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![
        Ok(page(1..13, true, 7, 30_000)),
        Err(FeedError::Network("status 502 Bad Gateway".into())),
        Err(FeedError::MalformedResponse("missing field `nextData`".into())),
        Ok(page(13..20, false, 0, 0)),
    ]));
    feed.enter("hotel").await;
    feed.load_more("hotel").await?;

    let err = feed.load_more("hotel").await.unwrap_err();
    assert!(matches!(err, FeedError::Network(_)));
    assert_eq!(feed.phase("hotel"), ViewPhase::Loaded);

    let err = feed.load_more("hotel").await.unwrap_err();
    assert!(matches!(err, FeedError::MalformedResponse(_)));

    feed.load_more("hotel").await?;

    let requests = feed.source().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1], requests[2]);
    assert_eq!(requests[2], requests[3]);
    assert_eq!(feed.items("hotel").len(), 19);
    Ok(())
}

#[tokio::test]
async fn failed_first_page_returns_to_cold() {
    let feed = feed(ScriptedSource::new(vec![Err(FeedError::Network(
        "connection refused".into(),
    ))]));
    feed.enter("hotel").await;

    assert!(feed.load_more("hotel").await.is_err());
    assert_eq!(feed.phase("hotel"), ViewPhase::Cold);
}

#[tokio::test]
async fn late_response_for_abandoned_filter_is_discarded() -> anyhow::Result<()> {
    let feed = feed(
        ScriptedSource::new(vec![
            Ok(page(1..13, true, 12, 20_000)),
            Ok(page(50..62, true, 61, 31_000)),
        ])
        .yielding(),
    );
    feed.enter("hotel").await;

    let (outcome, _) = tokio::join!(feed.load_more("hotel"), async {
        tokio::task::yield_now().await;
        feed.set_filter("hotel", PriceFilter::From30000);
    });
    assert_eq!(outcome?, LoadOutcome::Discarded);
    assert!(feed.items("hotel").is_empty());

    // the new key is not blocked by the abandoned request
    feed.load_more("hotel").await?;
    let ids: Vec<u64> = feed.items("hotel").iter().map(|i| i.id).collect();
    assert_eq!(ids, (50..62).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn duplicate_ids_across_pages_are_kept() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![
        Ok(page(1..4, true, 3, 10_003)),
        Ok(page(3..6, false, 0, 0)),
    ]));
    feed.enter("hotel").await;
    feed.load_more("hotel").await?;
    feed.load_more("hotel").await?;

    let ids: Vec<u64> = feed.items("hotel").iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 3, 4, 5]);
    Ok(())
}

#[tokio::test]
async fn categories_page_independently() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![
        Ok(page(1..3, false, 0, 0)),
        Ok(page(10..12, true, 11, 40_000)),
    ]));
    feed.enter("hotel").await;
    feed.enter("resort").await;

    feed.load_more("hotel").await?;
    assert_eq!(
        feed.load_more("resort").await?,
        LoadOutcome::Appended {
            items: 2,
            has_more: true
        }
    );
    assert_eq!(feed.load_more("hotel").await?, LoadOutcome::Exhausted);

    let requests = feed.source().requests();
    assert_eq!(requests[1].category, "resort");
    assert!(requests[1].cursor.is_first());
    Ok(())
}

#[tokio::test]
async fn detail_lookup_goes_through_source() -> anyhow::Result<()> {
    let feed = feed(ScriptedSource::new(vec![]));
    let dates = StayDates::new("2026-11-02", "2026-11-04");

    let detail = feed.detail(5, &dates).await?;
    assert_eq!(detail.id(), Some(5));
    assert_eq!(detail.fields["name"], "Seaside Hotel");
    assert_eq!(*feed.source().details.lock().unwrap(), vec![(5, dates)]);
    Ok(())
}
