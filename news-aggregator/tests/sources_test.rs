use chrono::{TimeZone, Utc};
use news_aggregator::parser::ParsedEntry;
use news_aggregator::sources::bbc::relay_endpoint;
use news_aggregator::sources::{BbcSource, GuardianSource, RedditSource, YleSource};
use news_aggregator::{FetchConfig, Fetcher, NewsSource, Topic};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

// Nothing listens on the discard port, so every request fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn test_fetcher() -> Fetcher {
    Fetcher::new(FetchConfig {
        user_agent: "News-Aggregator-Test/1.0".to_string(),
        timeout_seconds: 2,
        connect_timeout_seconds: 1,
        max_response_size_mb: 1,
    })
    .unwrap()
}

fn labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

#[test]
fn test_guardian_response_conversion() {
    let body = r#"{
        "response": {
            "status": "ok",
            "results": [
                {
                    "id": "politics/2024/may/01/budget",
                    "webTitle": "BREAKING: Minister slams budget plan!!",
                    "webUrl": "https://www.theguardian.com/politics/2024/may/01/budget",
                    "sectionName": "Politics",
                    "webPublicationDate": "2024-05-01T09:30:00Z",
                    "fields": {
                        "trailText": "",
                        "bodyText": "The minister set out objections to the plan in a statement on Wednesday, saying the proposed changes needed further consultation with regional councils."
                    }
                },
                {
                    "id": "film/2024/may/01/review",
                    "webTitle": "Festival opens",
                    "sectionName": "Film",
                    "webPublicationDate": "not a date"
                }
            ]
        }
    }"#;

    let articles = GuardianSource::parse_response(body).unwrap();
    assert_eq!(articles.len(), 2);

    let first = &articles[0];
    assert_eq!(first.id, "guardian-politics/2024/may/01/budget");
    assert_eq!(first.headline, "Minister criticizes budget plan");
    assert_eq!(first.category, Topic::Politics);
    assert!(first.summary.starts_with("The minister set out objections"));
    assert_eq!(first.sources[0].name, "The Guardian");
    assert_eq!(first.published_at.to_rfc3339(), "2024-05-01T09:30:00+00:00");

    let second = &articles[1];
    assert_eq!(second.category, Topic::Entertainment);
    assert!(second.sources[0].is_placeholder());
    assert_eq!(
        second.summary,
        "News about festival opens. More details available from the source."
    );
}

#[test]
fn test_yle_response_conversion() {
    let body = r#"{
        "data": [
            {
                "id": "1-123",
                "title": { "fi": "Helsinki avaa uuden linjan", "en": "" },
                "description": { "en": "Helsinki opened a new tram line connecting the harbour with the eastern suburbs on Monday morning." },
                "subject": [ { "title": { "en": "Technology" } } ],
                "datePublished": "2024-05-01T06:00:00+03:00",
                "url": { "full": "https://yle.fi/a/1-123" }
            },
            { "id": "1-456" }
        ]
    }"#;

    let articles = YleSource::parse_response(body).unwrap();
    assert_eq!(articles.len(), 2);

    assert_eq!(articles[0].id, "yle-1-123");
    assert_eq!(articles[0].headline, "Helsinki avaa uuden linjan");
    assert_eq!(articles[0].category, Topic::Technology);
    assert_eq!(articles[0].sources[0].url, "https://yle.fi/a/1-123");
    assert_eq!(articles[0].published_at.to_rfc3339(), "2024-05-01T03:00:00+00:00");

    assert_eq!(articles[1].headline, "Finnish News");
    assert_eq!(articles[1].category, Topic::World);
    assert!(articles[1].sources[0].is_placeholder());
}

#[test]
fn test_reddit_listing_drops_low_score_posts() {
    let body = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                { "data": { "id": "abc", "title": "Parliament passes new law", "url": "https://example.org/law",
                            "subreddit": "europe", "created_utc": 1714557600.0, "selftext": "", "score": 540 } },
                { "data": { "id": "def", "title": "Low effort post", "url": "https://example.org/low",
                            "subreddit": "news", "created_utc": 1714557600.0, "score": 100 } }
            ]
        }
    }"#;

    let articles = RedditSource::parse_listing(body).unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].id, "reddit-abc");
    assert_eq!(articles[0].sources[0].name, "r/europe");
    assert_eq!(articles[0].published_at.timestamp(), 1_714_557_600);
}

#[test]
fn test_bbc_feed_topics_skip_unknown_labels() {
    let bbc = BbcSource::new(test_fetcher());

    let topics = bbc.feed_topics(Some(labels(&["UK", "Gardening", "Sport", "UK"]).as_slice()));
    assert_eq!(topics, vec![Topic::Uk, Topic::Sport]);

    assert_eq!(bbc.feed_topics(None).len(), 10);
    let nothing: Vec<String> = Vec::new();
    assert!(bbc.feed_topics(Some(nothing.as_slice())).is_empty());

    let mut feeds = BTreeMap::new();
    feeds.insert(Topic::World, format!("{}/world.xml", UNREACHABLE));
    let narrow = BbcSource::new(test_fetcher()).with_feeds(feeds);
    assert_eq!(narrow.feed_topics(Some(labels(&["UK", "World"]).as_slice())), vec![Topic::World]);
}

#[tokio::test]
async fn test_unconfigured_sources_serve_fallback() {
    init_tracing();

    let guardian = GuardianSource::new(test_fetcher(), None);
    let articles = guardian.fetch(None).await;
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.sources[0].is_placeholder()));

    let yle = YleSource::new(test_fetcher(), Some("id".to_string()), None);
    let articles = yle.fetch(None).await;
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.category == Topic::World));
}

#[tokio::test]
async fn test_unreachable_sources_serve_fallback() {
    init_tracing();

    let guardian = GuardianSource::new(test_fetcher(), Some("key".to_string())).with_base_url(UNREACHABLE);
    assert_eq!(guardian.fetch(None).await.len(), 2);

    let reddit = RedditSource::new(test_fetcher()).with_base_url(UNREACHABLE);
    let articles = reddit.fetch(None).await;
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].sources[0].name, "r/worldnews");

    let feeds: BTreeMap<Topic, String> = Topic::ALL
        .iter()
        .map(|topic| (*topic, format!("{}/{}.xml", UNREACHABLE, topic.key())))
        .collect();
    let bbc = BbcSource::new(test_fetcher()).with_feeds(feeds);

    let articles = bbc.fetch(Some(labels(&["Health", "Sport"]).as_slice())).await;
    info!("BBC fallback served {} articles", articles.len());
    assert_eq!(articles.len(), 4);
    assert!(articles
        .iter()
        .all(|a| a.category == Topic::Health || a.category == Topic::Sport));

    assert_eq!(bbc.fetch(None).await.len(), 18);
}

#[test]
fn test_fallback_links_resolve_to_section_pages() {
    let fetcher = test_fetcher();
    let bbc = BbcSource::new(fetcher.clone());
    let reddit = RedditSource::new(fetcher);

    let sport = bbc
        .fallback_articles(Some(labels(&["Sport"]).as_slice()))
        .pop()
        .unwrap();
    assert_eq!(bbc.resolve_url(&sport).as_deref(), Some("https://www.bbc.com/sport"));

    let post = reddit.fallback_articles(None).pop().unwrap();
    assert_eq!(
        reddit.resolve_url(&post).as_deref(),
        Some("https://www.reddit.com/r/worldnews")
    );
}

const BBC_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>BBC News - UK</title>
    <link>https://www.bbc.co.uk/news/uk</link>
    <description>UK news</description>
    <item>
      <title>BREAKING: Rail strike called off</title>
      <description><![CDATA[<p>Unions and operators reached an agreement late on Tuesday, ending the dispute over pay and working conditions for drivers.</p>]]></description>
      <link>https://www.bbc.co.uk/news/articles/rail</link>
      <guid isPermaLink="false">https://www.bbc.co.uk/news/articles/rail#0</guid>
      <pubDate>Wed, 01 May 2024 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>Flood defences completed</title>
      <link>https://www.bbc.co.uk/news/articles/flood</link>
      <guid isPermaLink="false">https://www.bbc.co.uk/news/articles/flood#0</guid>
      <pubDate>Wed, 01 May 2024 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

/// Answers every request with `body` and records the request lines.
async fn serve(body: String, content_type: &'static str) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            if let Some(line) = request.lines().next() {
                seen.lock().unwrap().push(line.to_string());
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                content_type,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), requests)
}

#[test]
fn test_bbc_entries_convert_with_feed_topic() {
    let published = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let entries = vec![
        ParsedEntry {
            guid: Some("https://www.bbc.co.uk/news/articles/abc".to_string()),
            url: "https://www.bbc.co.uk/news/articles/abc".to_string(),
            title: "BREAKING: Festival line-up announced".to_string(),
            description: Some(
                "<p>Organisers confirmed the full line-up for the summer festival, with <b>headline acts</b> from across Europe and beyond.</p>"
                    .to_string(),
            ),
            published_at: Some(published),
        },
        ParsedEntry {
            guid: None,
            url: "https://www.bbc.co.uk/news/articles/def".to_string(),
            title: "Gallery reopens".to_string(),
            description: None,
            published_at: None,
        },
    ];

    let before = Utc::now();
    let articles = BbcSource::convert_entries(entries, Topic::Entertainment);
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.category == Topic::Entertainment));
    assert!(articles.iter().all(|a| a.sources[0].name == "BBC News"));

    let first = &articles[0];
    assert_eq!(first.id, "https://www.bbc.co.uk/news/articles/abc");
    assert_eq!(first.headline, "Festival line-up announced");
    assert!(first.summary.starts_with("Organisers confirmed the full line-up"));
    assert!(!first.summary.contains('<'));
    assert_eq!(first.published_at, published);
    assert_eq!(first.sources[0].url, "https://www.bbc.co.uk/news/articles/abc");

    let second = &articles[1];
    assert_eq!(second.id, "bbc-entertainment-1");
    assert!(second.published_at >= before);
    assert!(second.published_at <= Utc::now());
    assert_eq!(
        second.summary,
        "News about gallery reopens. More details available from the source."
    );
}

#[tokio::test]
async fn test_bbc_reads_feed_directly() {
    init_tracing();

    let (base, requests) = serve(BBC_RSS.to_string(), "application/rss+xml").await;
    let mut feeds = BTreeMap::new();
    feeds.insert(Topic::Uk, format!("{}/news/uk/rss.xml", base));
    feeds.insert(Topic::Sport, format!("{}/sport/rss.xml", base));
    let bbc = BbcSource::new(test_fetcher()).with_feeds(feeds);

    let articles = bbc.pull(Some(labels(&["UK"]).as_slice())).await.unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].id, "https://www.bbc.co.uk/news/articles/rail#0");
    assert_eq!(articles[0].headline, "Rail strike called off");
    assert!(articles[0].summary.starts_with("Unions and operators reached an agreement"));
    assert_eq!(articles[0].sources[0].url, "https://www.bbc.co.uk/news/articles/rail");
    assert!(articles.iter().all(|a| a.category == Topic::Uk));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /news/uk/rss.xml"));
}

#[tokio::test]
async fn test_bbc_reads_feed_through_relay() {
    init_tracing();

    let envelope = serde_json::json!({ "contents": BBC_RSS }).to_string();
    let (base, requests) = serve(envelope, "application/json").await;

    let mut feeds = BTreeMap::new();
    feeds.insert(Topic::World, "http://feeds.bbci.co.uk/news/world/rss.xml".to_string());
    let bbc = BbcSource::new(test_fetcher())
        .with_feeds(feeds)
        .with_relay(Some(format!("{}/get?url=", base)));

    let articles = bbc.fetch(Some(labels(&["World"]).as_slice())).await;
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.category == Topic::World));
    assert_eq!(articles[1].headline, "Flood defences completed");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /get?url=http"));
    assert_eq!(requests[0].matches("url=").count(), 1);
}

#[test]
fn test_relay_endpoint_drops_query_prefix() {
    assert_eq!(relay_endpoint("https://api.allorigins.win/get?url="), "https://api.allorigins.win/get");
    assert_eq!(relay_endpoint("https://relay.example/get?"), "https://relay.example/get");
    assert_eq!(relay_endpoint(" https://api.allorigins.win/get "), "https://api.allorigins.win/get");
}
