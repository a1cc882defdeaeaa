use crate::test_repository_crawler;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use sumi_harvest::github::{DirectoryEntry, EntryKind, RepositoryDescriptor, API_ACCEPT};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repository_page(range: std::ops::Range<usize>) -> Value {
    Value::Array(
        range
            .map(|i| json!({ "id": i, "full_name": format!("acme/repo-{:03}", i), "private": false }))
            .collect(),
    )
}

async fn mount_repository_pages(server: &MockServer, total: usize, per_page: usize) {
    let pages = (total + per_page - 1) / per_page + 1;
    for page in 1..=pages {
        let start = ((page - 1) * per_page).min(total);
        let end = (page * per_page).min(total);
        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("per_page", per_page.to_string()))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(repository_page(start..end)))
            .mount(server)
            .await;
    }
}

fn file_entry(server: &MockServer, repo: &str, file_path: &str) -> Value {
    let name = file_path.rsplit('/').next().unwrap_or(file_path);
    json!({
        "type": "file",
        "name": name,
        "path": file_path,
        "download_url": format!("{}/raw/acme/{}/main/{}", server.uri(), repo, file_path),
        "html_url": format!("https://example.com/acme/{}/blob/main/{}", repo, file_path),
        "url": format!("{}/repos/acme/{}/contents/{}", server.uri(), repo, file_path),
    })
}

fn dir_entry(dir_path: &str) -> Value {
    let name = dir_path.rsplit('/').next().unwrap_or(dir_path);
    json!({ "type": "dir", "name": name, "path": dir_path, "download_url": null })
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_listing_truncates_to_limit_in_order() {
    let mock_server = MockServer::start().await;
    mount_repository_pages(&mock_server, 250, 100).await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", Some(120)).await;

    assert_eq!(repositories.len(), 120);
    for (i, repository) in repositories.iter().enumerate() {
        assert_eq!(repository.full_name, format!("acme/repo-{:03}", i));
    }

    // Two full pages were enough
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_listing_without_limit_stops_at_empty_page() {
    let mock_server = MockServer::start().await;
    mount_repository_pages(&mock_server, 250, 100).await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", None).await;

    assert_eq!(repositories.len(), 250);
    assert_eq!(repositories[249].full_name, "acme/repo-249");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_small_limit_becomes_page_size() {
    let mock_server = MockServer::start().await;
    mount_repository_pages(&mock_server, 50, 5).await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", Some(5)).await;

    assert_eq!(repositories.len(), 5);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_failure_returns_partial_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_page(0..100)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", None).await;

    assert_eq!(repositories.len(), 100);
}

#[tokio::test]
async fn test_requests_carry_token_and_media_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(header("authorization", "token secret"))
        .and(header("accept", API_ACCEPT))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_page(0..1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", Some(1)).await;
    assert_eq!(repositories.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_waits_until_reset_then_retries() {
    let mock_server = MockServer::start().await;
    let reset = chrono::Utc::now().timestamp() + 2;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", reset.to_string().as_str()),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_page(0..3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let start = Instant::now();
    let repositories = crawler.list_repositories("acme", Some(3)).await;
    let elapsed = start.elapsed();

    assert_eq!(repositories.len(), 3);
    assert!(elapsed >= Duration::from_secs(1), "waited only {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "waited {:?}", elapsed);
}

#[tokio::test]
async fn test_abuse_detection_cools_down_and_retries_repeatedly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repository_page(0..2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let repositories = crawler.list_repositories("acme", Some(2)).await;

    assert_eq!(repositories.len(), 2);
}

#[tokio::test]
async fn test_plain_forbidden_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    assert!(crawler.list_repositories("acme", None).await.is_empty());
}

#[tokio::test]
async fn test_tree_walk_collects_markdown_and_skips_github_dir() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/repos/acme/docs/contents",
        json!([
            file_entry(&mock_server, "docs", "README.md"),
            dir_entry(".github"),
            dir_entry("guides"),
            file_entry(&mock_server, "docs", "logo.png"),
            { "type": "symlink", "name": "LINK.md", "path": "LINK.md" }
        ]),
    )
    .await;
    mount_json(
        &mock_server,
        "/repos/acme/docs/contents/guides",
        json!([
            file_entry(&mock_server, "docs", "guides/setup.md"),
            dir_entry("guides/advanced"),
        ]),
    )
    .await;
    mount_json(
        &mock_server,
        "/repos/acme/docs/contents/guides/advanced",
        json!([file_entry(&mock_server, "docs", "guides/advanced/tuning.md")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/docs/contents/.github"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let files = crawler
        .list_markdown_files(&RepositoryDescriptor::new("acme/docs"), "")
        .await;

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["README.md", "guides/setup.md", "guides/advanced/tuning.md"]
    );
    assert!(files.iter().all(|f| f.kind == EntryKind::File));
}

#[tokio::test]
async fn test_unlistable_subdirectory_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/repos/acme/docs/contents",
        json!([dir_entry("broken"), file_entry(&mock_server, "docs", "README.md")]),
    )
    .await;
    // `/contents/broken` has no mock and answers 404

    let crawler = test_repository_crawler(&mock_server.uri());
    let files = crawler
        .list_markdown_files(&RepositoryDescriptor::new("acme/docs"), "")
        .await;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "README.md");
}

#[tokio::test]
async fn test_nested_github_dir_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/repos/acme/docs/contents",
        json!([file_entry(&mock_server, "docs", "a.md"), dir_entry("sub")]),
    )
    .await;
    mount_json(
        &mock_server,
        "/repos/acme/docs/contents/sub",
        json!([
            file_entry(&mock_server, "docs", "sub/b.md"),
            dir_entry("sub/.github"),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/docs/contents/sub/.github"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([file_entry(&mock_server, "docs", "sub/.github/c.md")])),
        )
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let files = crawler
        .list_markdown_files(&RepositoryDescriptor::new("acme/docs"), "")
        .await;

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["a.md", "sub/b.md"]);
}

#[tokio::test]
async fn test_directory_names_are_percent_encoded() {
    let mock_server = MockServer::start().await;

    mount_json(
        &mock_server,
        "/repos/acme/docs/contents",
        json!([dir_entry("C#")]),
    )
    .await;
    mount_json(
        &mock_server,
        "/repos/acme/docs/contents/C%23",
        json!([file_entry(&mock_server, "docs", "C#/intro.md")]),
    )
    .await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let files = crawler
        .list_markdown_files(&RepositoryDescriptor::new("acme/docs"), "")
        .await;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "C#/intro.md");
}

#[tokio::test]
async fn test_materialize_builds_record_with_commit_date() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/acme/docs/main/guides/setup.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Setup\n\nRun it."))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/docs/commits"))
        .and(query_param("path", "guides/setup.md"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "sha": "abc", "commit": { "committer": { "name": "dev", "date": "2024-09-20T10:11:12Z" } } }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let entry: DirectoryEntry =
        serde_json::from_value(file_entry(&mock_server, "docs", "guides/setup.md")).unwrap();
    let crawler = test_repository_crawler(&mock_server.uri());
    let record = crawler
        .materialize(&RepositoryDescriptor::new("acme/docs"), &entry)
        .await
        .expect("record");

    assert_eq!(record.content(), "# Setup\n\nRun it.");
    assert_eq!(record.metadata().title(), "docs/guides/setup.md");
    assert_eq!(
        record.metadata().url(),
        "https://example.com/acme/docs/blob/main/guides/setup.md"
    );
    assert_eq!(record.metadata().headline(), "");
    assert_eq!(record.metadata().date(), "2024-09-20");
}

#[tokio::test]
async fn test_materialize_without_history_is_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/acme/docs/main/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&mock_server)
        .await;
    mount_json(&mock_server, "/repos/acme/docs/commits", json!([])).await;

    let entry: DirectoryEntry =
        serde_json::from_value(file_entry(&mock_server, "docs", "README.md")).unwrap();
    let crawler = test_repository_crawler(&mock_server.uri());
    let record = crawler
        .materialize(&RepositoryDescriptor::new("acme/docs"), &entry)
        .await
        .expect("record");

    assert_eq!(record.metadata().date(), "Unknown");
}

#[tokio::test]
async fn test_failed_download_skips_file() {
    let mock_server = MockServer::start().await;
    mount_json(&mock_server, "/repos/acme/docs/commits", json!([])).await;

    let entry: DirectoryEntry =
        serde_json::from_value(file_entry(&mock_server, "docs", "MISSING.md")).unwrap();
    let crawler = test_repository_crawler(&mock_server.uri());

    assert!(crawler
        .materialize(&RepositoryDescriptor::new("acme/docs"), &entry)
        .await
        .is_none());
}

#[tokio::test]
async fn test_scrape_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "full_name": "acme/alpha" },
            { "full_name": "acme/beta" }
        ])))
        .mount(&mock_server)
        .await;
    mount_json(&mock_server, "/orgs/acme/repos", json!([])).await;

    mount_json(
        &mock_server,
        "/repos/acme/alpha/contents",
        json!([file_entry(&mock_server, "alpha", "README.md")]),
    )
    .await;
    mount_json(
        &mock_server,
        "/repos/acme/beta/contents",
        json!([
            file_entry(&mock_server, "beta", "CHANGELOG.md"),
            file_entry(&mock_server, "beta", "build.rs")
        ]),
    )
    .await;

    for (route, body) in [
        ("/raw/acme/alpha/main/README.md", "alpha readme"),
        ("/raw/acme/beta/main/CHANGELOG.md", "beta changes"),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
    }
    mount_json(
        &mock_server,
        "/repos/acme/alpha/commits",
        json!([{ "commit": { "committer": { "date": "2023-05-01T00:00:00Z" } } }]),
    )
    .await;
    mount_json(&mock_server, "/repos/acme/beta/commits", json!([])).await;

    let crawler = test_repository_crawler(&mock_server.uri());
    let records = crawler.scrape("acme", None).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].metadata().title(), "alpha/README.md");
    assert_eq!(records[0].content(), "alpha readme");
    assert_eq!(records[0].metadata().date(), "2023-05-01");
    assert_eq!(records[1].metadata().title(), "beta/CHANGELOG.md");
    assert_eq!(records[1].metadata().date(), "Unknown");
}
