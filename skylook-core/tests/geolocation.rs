use std::time::Duration;

use skylook_core::{
    Coordinates, GeolocationError,
    geolocation::{GeolocationOptions, Geolocator, IpGeolocator},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn locator(server: &MockServer, options: GeolocationOptions) -> IpGeolocator {
    IpGeolocator::new(&format!("{}/json/", server.uri()), options)
}

async fn mount(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_position_and_reuses_recent_fix() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success", "lat": 52.52, "lon": 13.405
        })),
        1,
    )
    .await;

    let locator = locator(&server, GeolocationOptions::default());

    let first = locator.current_position().await.unwrap();
    assert_eq!(first, Coordinates::new(52.52, 13.405));

    let second = locator.current_position().await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn forbidden_maps_to_permission_denied() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(403), 1).await;

    let err = locator(&server, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PermissionDenied);
}

#[tokio::test]
async fn unauthorized_maps_to_permission_denied() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(401), 1).await;

    let err = locator(&server, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PermissionDenied);
}

#[tokio::test]
async fn malformed_body_maps_to_position_unavailable() {
    let server = MockServer::start().await;
    let body = ResponseTemplate::new(200).set_body_string("<html>");
    mount(&server, body, 1).await;

    let err = locator(&server, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PositionUnavailable);
}

#[tokio::test]
async fn unreachable_service_maps_to_position_unavailable() {
    // A standalone server is shut down on drop, unlike the pooled ones.
    let endpoint = {
        let server = MockServer::builder().start().await;
        format!("{}/json/", server.uri())
    };

    let err = IpGeolocator::new(&endpoint, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PositionUnavailable);
}

#[tokio::test]
async fn failed_lookup_maps_to_position_unavailable() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail", "message": "private range"
        })),
        1,
    )
    .await;

    let err = locator(&server, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PositionUnavailable);
}

#[tokio::test]
async fn server_error_maps_to_position_unavailable() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500), 1).await;

    let err = locator(&server, GeolocationOptions::default())
        .current_position()
        .await
        .unwrap_err();
    assert_eq!(err, GeolocationError::PositionUnavailable);
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"status": "success", "lat": 1.0, "lon": 1.0}))
            .set_delay(Duration::from_secs(2)),
        1,
    )
    .await;

    let options = GeolocationOptions {
        timeout: Duration::from_millis(50),
        ..GeolocationOptions::default()
    };

    let err = locator(&server, options).current_position().await.unwrap_err();
    assert_eq!(err, GeolocationError::Timeout);
}
