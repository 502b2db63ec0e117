use crate::application::PredictionService;
use crate::domain::{PredictionError, PredictionRequest, StrategyResponse};
use reqwest::blocking::Client;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict_strategy";

/// Prediction service reached over HTTP with a JSON `POST`.
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpPredictionService {
    /// Client that waits as long as the service takes to answer.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, None)
    }

    /// Client with an explicit request deadline. `None` disables reqwest's
    /// built-in 30 second default.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl PredictionService for HttpPredictionService {
    fn predict(&self, request: &PredictionRequest) -> Result<StrategyResponse, PredictionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| PredictionError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PredictionError::Status {
                code: status.as_u16(),
                body,
            });
        }

        response
            .json::<StrategyResponse>()
            .map_err(|e| PredictionError::MalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{filled_fields, sample_options};
    use crate::domain::{build_request, StopRecord};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::{mpsc, Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Value>>>;

    fn spawn_server(app: Router) -> SocketAddr {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
                tx.send(listener.local_addr().expect("addr")).expect("send addr");
                let _ = axum::serve(listener, app).await;
            });
        });
        rx.recv().expect("server address")
    }

    async fn predict_two_stops(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
        let reply = json!({
            "track": body["track"],
            "year": body["year"],
            "team": body["team"],
            "driver": body["driver"],
            "total_pitstops": 2,
            "pit_stop_laps": [15, 32],
            "tire_strategy": [
                {"lap": 15, "tire": "MEDIUM"},
                {"lap": 32, "tire": "HARD"}
            ]
        });
        seen.lock().unwrap().push(body);
        Json(reply)
    }

    fn service_for(addr: SocketAddr) -> HttpPredictionService {
        HttpPredictionService::new(format!("http://{addr}/predict_strategy")).unwrap()
    }

    fn sample_request() -> PredictionRequest {
        build_request(&filled_fields(), &sample_options()).unwrap()
    }

    #[test]
    fn test_predict_posts_json_payload() {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/predict_strategy", post(predict_two_stops))
            .with_state(seen.clone());
        let service = service_for(spawn_server(app));

        let response = service.predict(&sample_request()).unwrap();

        assert_eq!(response.total_pitstops, 2);
        assert_eq!(
            response.tire_strategy,
            vec![
                StopRecord { lap: 15, tire: "MEDIUM".to_string() },
                StopRecord { lap: 32, tire: "HARD".to_string() },
            ]
        );

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["year"], json!(2021));
        assert_eq!(bodies[0]["track"], json!("Monza"));
        assert_eq!(bodies[0]["lapNumberAtBeginingOfStint"], json!(2));
        assert_eq!(bodies[0]["fuelConsumptionPerStint"], json!(0.006));
        assert_eq!(bodies[0]["CircuitLength"], json!(5.8));
    }

    #[test]
    fn test_predict_reports_error_status() {
        let app = Router::new().route(
            "/predict_strategy",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed: model missing") }),
        );
        let service = service_for(spawn_server(app));

        let err = service.predict(&sample_request()).unwrap_err();
        assert_eq!(
            err,
            PredictionError::Status {
                code: 500,
                body: "Prediction failed: model missing".to_string()
            }
        );
    }

    #[test]
    fn test_predict_rejects_malformed_body() {
        let app = Router::new().route("/predict_strategy", post(|| async { "not json" }));
        let service = service_for(spawn_server(app));

        let err = service.predict(&sample_request()).unwrap_err();
        assert!(matches!(err, PredictionError::MalformedBody(_)));
    }

    async fn predict_slowly() -> Json<Value> {
        tokio::time::sleep(Duration::from_millis(600)).await;
        Json(json!({"total_pitstops": 1, "tire_strategy": [{"lap": 20, "tire": "HARD"}]}))
    }

    #[test]
    fn test_default_client_has_no_deadline() {
        let service = HttpPredictionService::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(service.timeout(), None);
    }

    #[test]
    fn test_slow_response_past_deadline_is_accepted_without_one() {
        let app = Router::new().route("/predict_strategy", post(predict_slowly));
        let addr = spawn_server(app);
        let url = format!("http://{addr}/predict_strategy");

        let short = HttpPredictionService::with_timeout(url.clone(), Some(Duration::from_millis(150))).unwrap();
        let err = short.predict(&sample_request()).unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));

        let unbounded = HttpPredictionService::new(url).unwrap();
        let response = unbounded.predict(&sample_request()).unwrap();
        assert_eq!(response.total_pitstops, 1);
        assert_eq!(response.tire_strategy, vec![StopRecord { lap: 20, tire: "HARD".to_string() }]);
    }

    #[test]
    fn test_predict_reports_connection_failure() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let service = service_for(addr);

        let err = service.predict(&sample_request()).unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));
    }
}
