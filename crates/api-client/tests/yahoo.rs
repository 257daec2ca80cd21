use api_client::error::ApiError;
use api_client::{MarketDataProvider, YahooClient};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chart_body() -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "currency": "USD" },
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, 182.15],
                        "high":   [188.44, 185.88, 183.09],
                        "low":    [183.89, 183.43, 180.88],
                        "close":  [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn fetches_and_maps_chart_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "3mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let series = client.fetch_bars("AAPL", "3mo", "1d").await.unwrap();

    assert_eq!(series.symbol(), "AAPL");
    assert_eq!(series.len(), 3);
    assert_eq!(series.first().close, Decimal::new(18564, 2));
    assert_eq!(series.last().volume, Decimal::from(71_983_600));
    assert_eq!(series.first().timestamp.timestamp(), 1704205800);
}

#[tokio::test]
async fn unknown_symbol_surfaces_the_chart_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let err = client.fetch_bars("NOPE", "3mo", "1d").await.unwrap_err();
    match err {
        ApiError::ApiError(msg) => assert!(msg.contains("Not Found"), "unexpected message: {msg}"),
        other => panic!("expected ApiError::ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_range_is_data_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let err = client.fetch_bars("AAPL", "1d", "1m").await.unwrap_err();
    assert!(matches!(err, ApiError::DataUnavailable(_)));
}

#[tokio::test]
async fn non_positive_price_is_rejected() {
    let mut body = chart_body();
    body["chart"]["result"][0]["indicators"]["quote"][0]["low"][1] = json!(0.0);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let err = client.fetch_bars("AAPL", "3mo", "1d").await.unwrap_err();
    assert!(matches!(err, ApiError::DataUnavailable(_)));
}

#[tokio::test]
async fn invalid_interval_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let err = client.fetch_bars("AAPL", "3mo", "daily").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
