mod support;

use support::*;
use vinyl_shop::discogs::{DiscogsClient, DiscogsError};

#[tokio::test]
async fn test_search_normalizes_results_and_pagination() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    let page = mock.client().search("Blue Train", 2).await.unwrap();

    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.pagination.items, 41);
    assert_eq!(page.results.len(), 2);

    let first = &page.results[0];
    assert_eq!(first.id, FULL_RELEASE_ID);
    assert_eq!(first.title, "John Coltrane - Blue Train");
    assert_eq!(first.format, "Vinyl, LP, Album");
    assert_eq!(first.label, "Blue Note, Blue Note");
    assert_eq!(first.genre, "Jazz");

    // Numeric year and missing list fields
    let second = &page.results[1];
    assert_eq!(second.year, "1958");
    assert_eq!(second.format, "");
    assert_eq!(second.thumb, "");
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    mock.client().get_release(FULL_RELEASE_ID).await.unwrap();

    assert_eq!(mock.user_agents(), vec![TEST_USER_AGENT.to_string()]);
}

#[tokio::test]
async fn test_get_release_parses_optional_fields() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    let release = mock.client().get_release(FULL_RELEASE_ID).await.unwrap();
    assert_eq!(release.title.as_deref(), Some("Blue Train"));
    assert_eq!(release.year.as_deref(), Some("1957"));
    assert_eq!(release.tracklist().len(), 3);

    let bare = mock.client().get_release(BARE_RELEASE_ID).await.unwrap();
    assert_eq!(bare.title.as_deref(), Some("Untitled"));
    assert!(bare.genres().is_empty());
    assert!(bare.images.is_none());
}

#[tokio::test]
async fn test_error_status_includes_upstream_message() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    let err = mock.client().get_release(MISSING_RELEASE_ID).await.unwrap_err();
    match err {
        DiscogsError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(
                message,
                "Discogs API returned error code 404: Release not found."
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // Non-JSON error body keeps the bare message
    let err = mock.client().get_release(BROKEN_RELEASE_ID).await.unwrap_err();
    assert_eq!(err.to_string(), "Discogs API returned error code 500");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    let err = mock.client().get_release(GARBLED_RELEASE_ID).await.unwrap_err();
    assert!(matches!(err, DiscogsError::Decode(_)));
}

#[tokio::test]
async fn test_rejected_token_surfaces_as_api_error() {
    tracing_init();
    let mock = MockDiscogs::start().await;
    let client = DiscogsClient::new(Some("wrong".to_string())).with_base_url(&mock.base_url);

    let err = client.search("Blue Train", 1).await.unwrap_err();
    assert!(matches!(err, DiscogsError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_missing_token_and_empty_query_never_reach_network() {
    tracing_init();
    let mock = MockDiscogs::start().await;

    let no_token = DiscogsClient::new(None).with_base_url(&mock.base_url);
    assert!(matches!(
        no_token.get_release(FULL_RELEASE_ID).await,
        Err(DiscogsError::MissingToken)
    ));

    assert!(matches!(
        mock.client().search("   ", 1).await,
        Err(DiscogsError::InvalidInput(_))
    ));
    assert!(matches!(
        mock.client().get_release(0).await,
        Err(DiscogsError::InvalidInput(_))
    ));

    assert_eq!(mock.hits(), 0);
}
