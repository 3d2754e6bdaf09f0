// Dashboard view model: UI update commands, widget items and chart specs
use super::metrics::{DerivedMetric, Severity};
use serde::Serialize;
use std::fmt;

/// One update addressed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    SetText { element: String, text: String },
    SetClass { element: String, class: String },
    ReplaceChildren { container: String, items: Vec<ViewItem> },
    RenderChart { slot: ChartSlot, spec: ChartSpec },
    SetBusy { busy: bool },
    ShowError { message: String },
    ClearError,
}

impl UiCommand {
    pub fn text(element: impl Into<String>, text: impl Into<String>) -> Self {
        UiCommand::SetText {
            element: element.into(),
            text: text.into(),
        }
    }

    pub fn class(element: impl Into<String>, class: impl Into<String>) -> Self {
        UiCommand::SetClass {
            element: element.into(),
            class: class.into(),
        }
    }

    pub fn children(container: impl Into<String>, items: Vec<ViewItem>) -> Self {
        UiCommand::ReplaceChildren {
            container: container.into(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewItem {
    Metric(DerivedMetric),
    ProductionLine(ProductionLineCard),
    WorkOrder(WorkOrderCard),
    Material(MaterialRow),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionLineCard {
    pub id: String,
    pub name: String,
    pub status: String,
    pub efficiency: f64,
    pub output: String,
    pub output_percentage: i64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOrderCard {
    pub id: String,
    pub priority: String,
    pub priority_class: String,
    pub product: String,
    pub quantity: u64,
    pub assigned_line: String,
    pub due_date: String,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRow {
    pub label: String,
    pub stock: String,
    pub percentage: i64,
    pub is_low: bool,
    pub severity: Severity,
}

/// Named rendering target holding at most one live chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSlot {
    Oee,
    Production,
    Efficiency,
}

impl ChartSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartSlot::Oee => "oee",
            ChartSlot::Production => "production",
            ChartSlot::Efficiency => "efficiency",
        }
    }

    pub fn canvas(self) -> &'static str {
        match self {
            ChartSlot::Oee => "oeeChart",
            ChartSlot::Production => "productionChart",
            ChartSlot::Efficiency => "efficiencyChart",
        }
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// Overrides the chart kind for mixed charts
    pub kind: Option<ChartKind>,
    pub axis: Option<String>,
    pub colors: Vec<String>,
    pub fill: bool,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data,
            kind: None,
            axis: None,
            colors: Vec::new(),
            fill: false,
        }
    }

    pub fn colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn rendered_as(mut self, kind: ChartKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn on_axis(mut self, axis: &str) -> Self {
        self.axis = Some(axis.to_string());
        self
    }

    pub fn filled(mut self) -> Self {
        self.fill = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartOptions {
    pub legend_position: Option<String>,
    pub cutout_percent: Option<u8>,
    pub value_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}
