// Factory telemetry payloads, one per upstream endpoint
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorReading {
    pub value: f64,
    pub unit: String,
    pub status: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorReadings {
    pub temperature: SensorReading,
    pub pressure: SensorReading,
    pub humidity: SensorReading,
    pub vibration: SensorReading,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OeeBreakdown {
    pub oee: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductionLine {
    pub id: String,
    pub name: String,
    pub status: String,
    pub efficiency: f64,
    pub output_rate: f64,
    pub target_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QualityMetrics {
    pub defect_rate: f64,
    pub first_pass_yield: f64,
    pub rework_rate: f64,
}

/// Manufacturing execution system data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MesData {
    #[serde(rename = "overall_equipment_effectiveness")]
    pub oee: OeeBreakdown,
    pub production_lines: Vec<ProductionLine>,
    pub quality_metrics: QualityMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMaterial {
    pub current_stock: f64,
    pub minimum_stock: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Inventory {
    /// Materials in the order the upstream mapping lists them
    #[serde(deserialize_with = "ordered_entries")]
    pub raw_materials: Vec<(String, RawMaterial)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinancialMetrics {
    pub daily_revenue: f64,
    pub production_cost: f64,
    pub target_revenue: f64,
    pub currency: String,
}

/// Enterprise resource planning data
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErpData {
    pub inventory: Inventory,
    pub financial_metrics: FinancialMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub product: String,
    pub quantity: u64,
    #[allow(dead_code)]
    #[serde(default)]
    pub status: String,
    pub progress: f64,
    pub priority: String,
    pub assigned_line: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub start_date: Option<String>,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyProduction {
    pub target: f64,
    pub actual: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendDay {
    pub day: String,
    pub production: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Downtime {
    pub total_minutes: f64,
    pub planned: f64,
    pub unplanned: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductionMetrics {
    pub daily_production: DailyProduction,
    pub weekly_trend: Vec<TrendDay>,
    pub downtime: Downtime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalPoint {
    pub timestamp: String,
    pub temperature: f64,
    #[allow(dead_code)]
    #[serde(default)]
    pub pressure: f64,
    pub production_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalData {
    #[allow(dead_code)]
    #[serde(default)]
    pub time_range: String,
    pub data_points: Vec<HistoricalPoint>,
}

/// Everything one refresh cycle fetched for a site
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub sensors: SensorReadings,
    pub mes: MesData,
    pub erp: ErpData,
    pub work_orders: Vec<WorkOrder>,
    pub production: ProductionMetrics,
}

/// Deserialize a JSON object into `(key, value)` pairs, keeping document order
pub fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}
