use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use cars_mpg_ml::{CleanRecord, DataLoader, PipelineError};

const CARS_JSON: &str = r#"[
    {"Name": "chevrolet chevelle malibu", "Miles_per_Gallon": 18, "Cylinders": 8, "Horsepower": 130},
    {"Name": "ford torino", "Miles_per_Gallon": 17, "Cylinders": 8, "Horsepower": 140},
    {"Name": "citroen ds-21 pallas", "Miles_per_Gallon": null, "Cylinders": 4, "Horsepower": 115},
    {"Name": "ford pinto", "Miles_per_Gallon": 25, "Cylinders": 4, "Horsepower": null},
    {"Name": "toyota corona mark ii", "Miles_per_Gallon": 24, "Cylinders": 4, "Horsepower": 95}
]"#;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn loader() -> DataLoader {
    DataLoader::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetches_and_cleans_records_in_order() {
    let base = serve(Router::new().route("/cars.json", get(|| async { CARS_JSON }))).await;

    let records = loader().fetch_clean_records(&format!("{}/cars.json", base)).await.unwrap();

    assert_eq!(
        records,
        vec![
            CleanRecord { mpg: 18.0, horsepower: 130.0 },
            CleanRecord { mpg: 17.0, horsepower: 140.0 },
            CleanRecord { mpg: 24.0, horsepower: 95.0 },
        ]
    );
}

#[tokio::test]
async fn server_error_is_network_error() {
    let base = serve(Router::new().route(
        "/cars.json",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "nope") }),
    ))
    .await;

    let err = loader().fetch_clean_records(&format!("{}/cars.json", base)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Network(_)));
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let base = serve(Router::new().route("/cars.json", get(|| async { "<html>not json</html>" }))).await;

    let err = loader().fetch_clean_records(&format!("{}/cars.json", base)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
}

#[tokio::test]
async fn slow_server_hits_timeout() {
    let base = serve(Router::new().route(
        "/cars.json",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            CARS_JSON
        }),
    ))
    .await;

    let loader = DataLoader::new(Duration::from_millis(200)).unwrap();
    let err = loader.fetch_clean_records(&format!("{}/cars.json", base)).await.unwrap_err();
    match err {
        PipelineError::Network(e) => assert!(e.is_timeout()),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    // порт закрыт: сервер не запущен
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = loader().fetch_clean_records(&format!("http://{}/cars.json", addr)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Network(_)));
}
