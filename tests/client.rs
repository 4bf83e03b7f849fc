use pvwatts::{Client, ClientConfig, Error, Proxies, RequestParams};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/api/pvwatts/v4.json";

fn endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), ENDPOINT)
}

fn client(url: &str, key: &str) -> Client {
    Client::with_config(ClientConfig {
        url: url.to_string(),
        api_key: key.to_string(),
        proxies: None,
    })
    .unwrap()
}

// The blocking client is built, used and dropped off the async workers.
async fn blocking<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

async fn sent_queries(server: &MockServer) -> Vec<BTreeMap<String, String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.query_pairs().into_owned().collect())
        .collect()
}

fn monthly_body() -> Value {
    json!({
        "inputs": {"system_size": "4", "lat": "40", "lon": "-105"},
        "errors": [],
        "warnings": [],
        "version": "4.0.0",
        "ssc_info": {"version": 34, "build": "Linux 64 bit GNU/C++ Jul  7 2014 14:21:38"},
        "station_info": {"lat": 40.0167, "lon": -105.25, "city": "BOULDER", "state": "CO"},
        "outputs": {
            "ac_monthly": [474.3, 485.0, 608.9, 612.1, 613.5, 578.2, 581.4, 577.9, 563.1, 546.7, 454.9, 441.6],
            "ac_annual": 6537.6,
            "solrad_annual": 5.4
        }
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_request_sends_only_defaults_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"outputs": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "test-key";
    blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap();

    let sent = sent_queries(&server).await;
    let expected: BTreeMap<String, String> = [
        ("dataset", "tmy3"),
        ("timeframe", "monthly"),
        ("tilt_eq_lat", "0"),
        ("track_mode", "1"),
        ("api_key", "test-key"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(sent, vec![expected]);
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_validated_parameters_and_user_agent() {
    let server = MockServer::start().await;
    let ua = format!("pvwatts-rs/{} (Rust)", pvwatts::version());
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(header("user-agent", ua.as_str()))
        .and(query_param("system_size", "4"))
        .and(query_param("lat", "40"))
        .and(query_param("lon", "-105"))
        .and(query_param("derate", "0.77"))
        .and(query_param("dataset", "tmy2"))
        .and(query_param("api_key", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(monthly_body()))
        .expect(1)
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "abc";
    let params = RequestParams::default()
        .system_size(4.0)
        .lat(40.0)
        .lon(-105.0)
        .derate(0.77)
        .dataset("tmy2");
    let result = blocking(move || client(&url, key).request(&params)).await.unwrap();

    assert_eq!(result.ac_annual(), Some(6537.6));
    assert_eq!(result.station_info().unwrap().city.as_deref(), Some("BOULDER"));
}

#[tokio::test(flavor = "multi_thread")]
async fn result_equals_decoded_body() {
    let server = MockServer::start().await;
    let body = monthly_body();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let result = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap();

    assert_eq!(result.raw(), &body);
    assert_eq!(result.into_raw(), body);
}

#[tokio::test(flavor = "multi_thread")]
async fn array_bodies_are_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let result = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap();
    assert_eq!(result.raw(), &json!([1, 2, 3]));
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_is_an_authorization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": "API_KEY_INVALID", "message": "An invalid api_key was supplied."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "bad-key";
    let err = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authorization), "{err:?}");
    assert!(err.to_string().contains("Forbidden"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_parameters_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let err = blocking(move || {
        client(&url, key).request(&RequestParams::default().lat(40.0).gamma(0.0))
    })
    .await
    .unwrap_err();

    match err {
        Error::Validation(e) => {
            assert_eq!(e.to_string(), "gamma must be >= -2 and <= -0.01");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn json_error_bodies_are_returned_as_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": ["You must specify an address or lat/lon."],
            "outputs": {}
        })))
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let result = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap();
    assert_eq!(result.errors(), vec!["You must specify an address or lat/lon."]);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let err = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap_err();

    match err {
        Error::Status { status, body } => {
            assert_eq!(status.as_u16(), 502);
            assert!(body.contains("Bad Gateway"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"outputs\": "))
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let err = blocking(move || client(&url, key).request(&RequestParams::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "{err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_data_sends_raw_pairs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("file_id", "0-94018"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let url = endpoint(&server);
    let key = "k";
    let data = blocking(move || client(&url, key).get_data(&[("file_id", "0-94018")]))
        .await
        .unwrap();
    assert_eq!(data, json!({"ok": true}));
}

#[tokio::test(flavor = "multi_thread")]
async fn from_value_params_round_trip_to_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let params = RequestParams::from_value(&json!({
        "address": "Boulder, CO",
        "system_size": 2.5,
        "timeframe": "hourly",
        "tilt_eq_lat": 1,
        "callback": "handle"
    }))
    .unwrap();
    let url = endpoint(&server);
    let key = "k";
    blocking(move || client(&url, key).request(&params)).await.unwrap();

    let sent = sent_queries(&server).await;
    assert_eq!(sent.len(), 1);
    let q = &sent[0];
    assert_eq!(q["address"], "Boulder, CO");
    assert_eq!(q["system_size"], "2.5");
    assert_eq!(q["timeframe"], "hourly");
    assert_eq!(q["tilt_eq_lat"], "1");
    assert_eq!(q["callback"], "handle");
    assert!(!q.contains_key("lat"));
}

#[tokio::test(flavor = "multi_thread")]
async fn configured_proxy_carries_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"via": "proxy"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut proxies = Proxies::new();
    proxies.insert("http".to_string(), server.uri());
    let result = blocking(move || {
        Client::with_config(ClientConfig {
            url: "http://pvwatts.invalid/api/pvwatts/v4.json".to_string(),
            api_key: "k".to_string(),
            proxies: Some(proxies),
        })
        .unwrap()
        .request(&RequestParams::default())
    })
    .await
    .unwrap();

    assert_eq!(result.raw(), &json!({"via": "proxy"}));
    let sent = sent_queries(&server).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["api_key"], "k");
    assert_eq!(sent[0]["dataset"], "tmy3");
}
