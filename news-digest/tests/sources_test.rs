mod common;

use common::{init_tracing, rss_feed, test_fetch_config};
use news_digest::sources::adapter_for;
use news_digest::sources::github_trending::{parse_trending_page, NO_DESCRIPTION};
use news_digest::sources::hacker_news::discussion_url;
use news_digest::{
    DigestError, FeedSource, Fetcher, HackerNewsSource, SourceAdapter, SourceConfig, SourceKind,
    TrendingSource,
};
use serde_json::json;
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRENDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
  <article class="Box-row">
    <h2 class="h3 lh-condensed">
      <a href="/owner/repo-one">
        owner /
        repo-one
      </a>
    </h2>
    <p class="col-9 color-fg-muted my-1 pr-4">
      Agents for everything
    </p>
  </article>
  <article class="Box-row">
    <h2 class="h3 lh-condensed">
      <a href="/owner/repo-two">owner / repo-two</a>
    </h2>
  </article>
  <article class="Box-row">
    <h2 class="h3 lh-condensed"><a href="/owner/repo-three">owner / repo-three</a></h2>
    <p class="col-9">Third</p>
  </article>
</body>
</html>"#;

fn fetcher() -> Fetcher {
    Fetcher::new(test_fetch_config()).unwrap()
}

fn known(links: &[&str]) -> HashSet<String> {
    links.iter().map(|l| l.to_string()).collect()
}

async fn serve(server: &MockServer, route: &str, body: String, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, content_type))
        .mount(server)
        .await;
}

async fn fail(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

#[tokio::test]
async fn feed_skips_already_delivered_links() {
    init_tracing();
    let server = MockServer::start().await;
    let feed = rss_feed(&[
        ("First", "https://a.com/1", "Old news"),
        ("Second", "https://a.com/2", "Fresh news"),
    ]);
    serve(&server, "/feed.xml", feed, "application/rss+xml").await;

    let source = FeedSource::new("Test Feed", format!("{}/feed.xml", server.uri()), 10);
    let items = source
        .pull(&fetcher(), &known(&["https://a.com/1"]))
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].link, "https://a.com/2");
    assert_eq!(items[0].title, "Test Feed: Second");
    assert_eq!(items[0].summary, "Fresh news");
    assert_eq!(items[0].kind, SourceKind::Feed);
    assert_eq!(items[0].source_name, "Test Feed");
}

#[tokio::test]
async fn feed_takes_only_the_first_entries() {
    init_tracing();
    let server = MockServer::start().await;
    let feed = rss_feed(&[
        ("One", "https://a.com/1", ""),
        ("Two", "https://a.com/2", ""),
        ("Three", "https://a.com/3", ""),
    ]);
    serve(&server, "/feed.xml", feed, "application/rss+xml").await;

    // the limit applies before known links are removed
    let source = FeedSource::new("Test Feed", format!("{}/feed.xml", server.uri()), 2);
    let items = source
        .pull(&fetcher(), &known(&["https://a.com/1"]))
        .await
        .unwrap();

    let links: Vec<&str> = items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(links, vec!["https://a.com/2"]);
}

#[tokio::test]
async fn feed_summaries_are_plain_text_and_bounded() {
    init_tracing();
    let server = MockServer::start().await;
    let long_text = "word ".repeat(100);
    let markup = "&lt;p&gt;Model &lt;b&gt;weights&lt;/b&gt; released&lt;/p&gt;";
    let feed = rss_feed(&[
        ("Markup", "https://a.com/markup", markup),
        ("Long", "https://a.com/long", long_text.as_str()),
    ]);
    serve(&server, "/feed.xml", feed, "application/rss+xml").await;

    let source = FeedSource::new("Test Feed", format!("{}/feed.xml", server.uri()), 10);
    let items = source.pull(&fetcher(), &HashSet::new()).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].summary, "Model weights released");
    assert!(items[1].summary.ends_with("..."));
    assert_eq!(items[1].summary.chars().count(), 203);
}

#[tokio::test]
async fn failing_feed_yields_nothing() {
    init_tracing();
    let server = MockServer::start().await;
    fail(&server, "/broken.xml").await;
    serve(&server, "/garbage.xml", "this is not a feed".to_string(), "text/plain").await;

    let broken = FeedSource::new("Broken", format!("{}/broken.xml", server.uri()), 10);
    let garbage = FeedSource::new("Garbage", format!("{}/garbage.xml", server.uri()), 10);

    assert!(matches!(
        broken.pull(&fetcher(), &HashSet::new()).await,
        Err(DigestError::Status { status: 500, .. })
    ));
    assert!(broken.fetch(&fetcher(), &HashSet::new()).await.is_empty());
    assert!(garbage.fetch(&fetcher(), &HashSet::new()).await.is_empty());
}

#[test]
fn trending_page_rows_are_parsed() {
    let repos = parse_trending_page(TRENDING_PAGE, "https://github.com", 10).unwrap();

    assert_eq!(repos.len(), 3);
    assert_eq!(repos[0].name, "owner/repo-one");
    assert_eq!(repos[0].link.as_deref(), Some("https://github.com/owner/repo-one"));
    assert_eq!(repos[0].description, "Agents for everything");
    assert_eq!(repos[1].description, NO_DESCRIPTION);
}

#[test]
fn trending_page_respects_limit_and_tolerates_empty_pages() {
    let repos = parse_trending_page(TRENDING_PAGE, "https://github.com", 2).unwrap();
    assert_eq!(repos.len(), 2);

    let none = parse_trending_page("<html><body>Nothing here</body></html>", "https://github.com", 10)
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn trending_source_builds_items_from_the_page() {
    init_tracing();
    let server = MockServer::start().await;
    serve(&server, "/trending/python", TRENDING_PAGE.to_string(), "text/html").await;

    let source = TrendingSource::new("python", 10).with_base_url(server.uri());
    let repo_two = format!("{}/owner/repo-two", server.uri());
    let items = source
        .pull(&fetcher(), &known(&[repo_two.as_str()]))
        .await
        .unwrap();

    assert_eq!(source.source_name(), "GitHub Trending (python)");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "GitHub Trending (python): owner/repo-one");
    assert_eq!(items[0].link, format!("{}/owner/repo-one", server.uri()));
    assert_eq!(items[0].kind, SourceKind::Trending);
    assert_eq!(items[1].title, "GitHub Trending (python): owner/repo-three");
}

#[tokio::test]
async fn trending_topics_with_spaces_are_encoded() {
    let source = TrendingSource::new("google colab", 5);

    assert_eq!(
        source.page_url().unwrap(),
        "https://github.com/trending/google%20colab"
    );
}

#[tokio::test]
async fn unavailable_trending_page_yields_nothing() {
    init_tracing();
    let server = MockServer::start().await;
    fail(&server, "/trending/python").await;

    let source = TrendingSource::new("python", 10).with_base_url(server.uri());

    assert!(source.fetch(&fetcher(), &HashSet::new()).await.is_empty());
}

#[tokio::test]
async fn hacker_news_skips_bad_stories() {
    init_tracing();
    let server = MockServer::start().await;
    serve(&server, "/topstories.json", json!([1, 2, 3, 4, 5]).to_string(), "application/json").await;
    serve(
        &server,
        "/item/1.json",
        json!({"id": 1, "title": "Show HN: A tiny LLM", "url": "https://tiny.dev", "text": "<p>Hello <i>HN</i></p>"})
            .to_string(),
        "application/json",
    )
    .await;
    fail(&server, "/item/2.json").await;
    serve(
        &server,
        "/item/3.json",
        json!({"id": 3, "title": "Ask HN: Best agent frameworks?"}).to_string(),
        "application/json",
    )
    .await;
    serve(&server, "/item/4.json", "null".to_string(), "application/json").await;
    serve(
        &server,
        "/item/5.json",
        json!({"id": 5, "url": "https://a.com/untitled"}).to_string(),
        "application/json",
    )
    .await;

    let source = HackerNewsSource::new("Hacker News", 10).with_base_url(server.uri());
    let items = source.pull(&fetcher(), &HashSet::new()).await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "Hacker News: Show HN: A tiny LLM");
    assert_eq!(items[0].link, "https://tiny.dev");
    assert_eq!(items[0].summary, "Hello HN");
    assert_eq!(items[0].kind, SourceKind::Aggregator);

    assert_eq!(items[1].link, discussion_url(3));
    assert_eq!(items[1].link, "https://news.ycombinator.com/item?id=3");
    assert_eq!(items[1].summary, "Click to read more or join the discussion.");

    assert_eq!(items[2].title, "Hacker News: No Title");
    assert_eq!(items[2].link, "https://a.com/untitled");
}

#[tokio::test]
async fn hacker_news_limit_bounds_detail_requests() {
    init_tracing();
    let server = MockServer::start().await;
    serve(&server, "/topstories.json", json!([10, 11, 12]).to_string(), "application/json").await;
    Mock::given(method("GET"))
        .and(path("/item/10.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 10, "title": "First", "url": "https://a.com/10"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/11.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 11})))
        .expect(0)
        .mount(&server)
        .await;

    let source = HackerNewsSource::new("Hacker News", 1).with_base_url(server.uri());
    let items = source
        .pull(&fetcher(), &known(&["https://a.com/10"]))
        .await
        .unwrap();

    assert!(items.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn hacker_news_list_failure_yields_nothing() {
    init_tracing();
    let server = MockServer::start().await;
    fail(&server, "/topstories.json").await;

    let source = HackerNewsSource::new("Hacker News", 10).with_base_url(server.uri());

    assert!(source.fetch(&fetcher(), &HashSet::new()).await.is_empty());
}

#[test]
fn adapters_follow_their_configuration() {
    let feed = adapter_for(&SourceConfig::feed("OpenAI Blog", "https://openai.com/news/rss.xml", 10));
    let trending = adapter_for(&SourceConfig::trending("python", 10));
    let hacker_news = adapter_for(&SourceConfig::hacker_news(20));

    assert_eq!(feed.kind(), SourceKind::Feed);
    assert_eq!(feed.source_name(), "OpenAI Blog");
    assert_eq!(trending.kind(), SourceKind::Trending);
    assert_eq!(trending.source_name(), "GitHub Trending (python)");
    assert_eq!(hacker_news.kind(), SourceKind::Aggregator);
    assert_eq!(hacker_news.limit(), 20);
}
