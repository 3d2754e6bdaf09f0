// Shared fakes and sample payloads for application tests
use crate::application::dashboard_source::{DashboardSource, Endpoint, EndpointRequest, FetchError};
use crate::domain::telemetry::Bundle;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

pub fn ok(data: Value) -> Value {
    json!({"success": true, "data": data, "timestamp": "2024-05-20T10:15:00"})
}

pub fn failed(message: &str) -> Value {
    json!({"success": false, "error": message})
}

pub fn sensor_data() -> Value {
    json!({
        "temperature": {"value": 72.3, "unit": "°C", "status": "normal", "location": "Line 1"},
        "pressure": {"value": 24.55, "unit": "bar", "status": "normal", "location": "DE-Hydraulic System"},
        "humidity": {"value": 45.2, "unit": "%", "status": "normal", "location": "DE-Climate Control"},
        "vibration": {"value": 1.25, "unit": "mm/s", "status": "warning", "location": "DE-Motor Assembly"}
    })
}

pub fn mes_data() -> Value {
    json!({
        "overall_equipment_effectiveness": {
            "oee": 84.2, "availability": 92.1, "performance": 88.4, "quality": 96.7
        },
        "production_lines": [
            {"id": "DE-LINE_001", "name": "DE-Assembly Line 1", "status": "running",
             "efficiency": 104.5, "output_rate": 60, "target_rate": 60},
            {"id": "DE-LINE_002", "name": "DE-Assembly Line 2", "status": "idle",
             "efficiency": 85.0, "output_rate": 45, "target_rate": 50},
            {"id": "DE-LINE_003", "name": "DE-Packaging Line", "status": "maintenance",
             "efficiency": 88.0, "output_rate": 70, "target_rate": 100}
        ],
        "quality_metrics": {"defect_rate": 0.8, "first_pass_yield": 97.2, "rework_rate": 2.4}
    })
}

pub fn erp_data() -> Value {
    json!({
        "inventory": {
            "raw_materials": {
                "steel_sheets": {"current_stock": 40, "minimum_stock": 50, "unit": "kg", "status": "low"},
                "aluminum_bars": {"current_stock": 150, "minimum_stock": 100, "unit": "bars", "status": "adequate"}
            },
            "finished_goods": {"product_a": 80}
        },
        "financial_metrics": {
            "daily_revenue": 10000, "production_cost": 6500, "efficiency_savings": 2500.5,
            "target_revenue": 9000, "currency": "EUR"
        },
        "supply_chain": {"supplier_performance": 93.5, "delivery_delays": 1, "pending_orders": 12}
    })
}

pub fn work_orders() -> Value {
    json!([
        {"id": "DE-WO2024005", "product": "Product A", "quantity": 120, "status": "in_progress",
         "progress": 45, "priority": "high", "assigned_line": "DE-Line 1",
         "start_date": "2024-05-18", "due_date": "2024-05-30"},
        {"id": "DE-WO2024001", "product": "Product B", "quantity": 300, "status": "completed",
         "progress": 100, "priority": "low", "assigned_line": "DE-Line 3",
         "start_date": "2024-05-14", "due_date": "2024-05-22"}
    ])
}

pub fn production_metrics() -> Value {
    json!({
        "daily_production": {"target": 120, "actual": 110, "efficiency": 92.5},
        "weekly_trend": [{"day": "Mon", "production": 100}, {"day": "Tue", "production": 150}],
        "downtime": {"total_minutes": 150, "planned": 45, "unplanned": 105}
    })
}

pub fn historical_data() -> Value {
    json!({
        "time_range": "24h",
        "data_points": [
            {"timestamp": "08:00", "temperature": 24.1, "pressure": 18.2, "production_rate": 58},
            {"timestamp": "09:00", "temperature": 25.0, "pressure": 19.1, "production_rate": 61}
        ]
    })
}

pub fn sites() -> Value {
    json!({
        "germany": {"name": "Germany Manufacturing", "timezone": "Europe/Berlin",
                    "currency": "EUR", "location_prefix": "DE-"},
        "uk": {"name": "UK Manufacturing", "timezone": "Europe/London",
               "currency": "GBP", "location_prefix": "UK-"}
    })
}

pub fn sample_bundle() -> Bundle {
    Bundle {
        sensors: serde_json::from_value(sensor_data()).unwrap(),
        mes: serde_json::from_value(mes_data()).unwrap(),
        erp: serde_json::from_value(erp_data()).unwrap(),
        work_orders: serde_json::from_value(work_orders()).unwrap(),
        production: serde_json::from_value(production_metrics()).unwrap(),
    }
}

/// In-memory source answering every endpoint from a response table
pub struct FakeSource {
    responses: Mutex<HashMap<Endpoint, Result<Value, FetchError>>>,
    calls: Mutex<Vec<EndpointRequest>>,
    hold: Option<watch::Receiver<bool>>,
}

impl FakeSource {
    pub fn healthy() -> Self {
        let responses = HashMap::from([
            (Endpoint::SensorData, Ok(ok(sensor_data()))),
            (Endpoint::MesData, Ok(ok(mes_data()))),
            (Endpoint::ErpData, Ok(ok(erp_data()))),
            (Endpoint::WorkOrders, Ok(ok(work_orders()))),
            (Endpoint::ProductionMetrics, Ok(ok(production_metrics()))),
            (Endpoint::HistoricalData, Ok(ok(historical_data()))),
            (Endpoint::Sites, Ok(ok(sites()))),
        ]);
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            hold: None,
        }
    }

    /// Main-bundle requests wait until the returned sender publishes `true`
    pub fn held(mut self) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        self.hold = Some(rx);
        (self, tx)
    }

    pub fn respond(&self, endpoint: Endpoint, response: Result<Value, FetchError>) {
        self.responses.lock().unwrap().insert(endpoint, response);
    }

    pub fn calls(&self) -> Vec<EndpointRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.endpoint == endpoint)
            .count()
    }
}

#[async_trait]
impl DashboardSource for FakeSource {
    async fn fetch(&self, request: &EndpointRequest) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(request.clone());

        let is_main = !matches!(request.endpoint, Endpoint::HistoricalData | Endpoint::Sites);
        if let (true, Some(hold)) = (is_main, &self.hold) {
            let mut hold = hold.clone();
            let _ = hold.wait_for(|open| *open).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(&request.endpoint)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    endpoint: request.endpoint,
                    message: "no fake response".to_string(),
                })
            })
    }
}
