// View updater - Derives display metrics and turns a bundle into UI commands
//
// Everything here is a pure function of its input: the same bundle always
// yields the same command sequence.
use crate::domain::dashboard::{
    ChartKind, ChartOptions, ChartSlot, ChartSpec, Dataset, MaterialRow, ProductionLineCard,
    UiCommand, ViewItem, WorkOrderCard,
};
use crate::domain::metrics::{
    currency_symbol, group_thousands, minutes_to_hours, ratio_percent, round_half_up,
    rounded_percent, DerivedMetric, Severity,
};
use crate::domain::site::SiteInfo;
use crate::domain::telemetry::{
    Bundle, DailyProduction, Downtime, FinancialMetrics, HistoricalData, Inventory, OeeBreakdown,
    ProductionLine, ProductionMetrics, QualityMetrics, SensorReading, SensorReadings, TrendDay,
    WorkOrder,
};

pub const PRODUCTION_LINES: &str = "productionLines";
pub const WORK_ORDERS: &str = "workOrdersList";
pub const INVENTORY: &str = "inventoryStatus";
pub const FINANCIAL: &str = "financialMetrics";
pub const QUALITY: &str = "qualityMetrics";
pub const DAILY_PRODUCTION: &str = "dailyProductionMetrics";
pub const DOWNTIME: &str = "downtimeMetrics";
pub const WEEKLY_PERFORMANCE: &str = "weeklyPerformanceMetrics";
pub const OEE_VALUE: &str = "oeeValue";

const BLUE: &str = "#3b82f6";
const GREEN: &str = "#10b981";
const AMBER: &str = "#f59e0b";
const RED: &str = "#ef4444";

/// Build the full command sequence for one successfully fetched bundle
pub fn apply(bundle: &Bundle) -> Vec<UiCommand> {
    let mut commands = sensor_widgets(&bundle.sensors);
    commands.push(production_lines(&bundle.mes.production_lines));
    commands.extend(oee_chart(&bundle.mes.oee));
    commands.push(work_orders(&bundle.work_orders));
    commands.push(inventory_status(&bundle.erp.inventory));
    commands.push(metric_rows(FINANCIAL, financial_metrics(&bundle.erp.financial_metrics)));
    commands.push(metric_rows(QUALITY, quality_metrics(&bundle.mes.quality_metrics)));
    commands.push(metric_rows(
        DAILY_PRODUCTION,
        daily_production_metrics(&bundle.production.daily_production),
    ));
    commands.push(metric_rows(DOWNTIME, downtime_metrics(&bundle.production.downtime)));
    commands.push(metric_rows(
        WEEKLY_PERFORMANCE,
        weekly_performance_metrics(&bundle.production),
    ));
    commands.push(efficiency_chart(&bundle.production));
    commands
}

/// Commands for the historical sub-fetch: the production trend chart only
pub fn apply_historical(history: &HistoricalData) -> Vec<UiCommand> {
    vec![production_trend_chart(history)]
}

/// Active/inactive classes and labels for the site selector buttons
pub fn site_selector(sites: &[SiteInfo], active: &str) -> Vec<UiCommand> {
    sites
        .iter()
        .flat_map(|site| {
            let element = format!("site-{}", site.id);
            let class = if site.id == active {
                "site-btn active"
            } else {
                "site-btn"
            };
            [
                UiCommand::text(element.clone(), site.name.clone()),
                UiCommand::class(element, class),
            ]
        })
        .collect()
}

fn metric_rows(container: &str, metrics: Vec<DerivedMetric>) -> UiCommand {
    UiCommand::children(container, metrics.into_iter().map(ViewItem::Metric).collect())
}

fn sensor_widgets(sensors: &SensorReadings) -> Vec<UiCommand> {
    let mut commands = Vec::with_capacity(16);
    for (prefix, reading) in [
        ("temp", &sensors.temperature),
        ("pressure", &sensors.pressure),
        ("humidity", &sensors.humidity),
        ("vibration", &sensors.vibration),
    ] {
        commands.extend(sensor_widget(prefix, reading));
    }
    commands
}

fn sensor_widget(prefix: &str, reading: &SensorReading) -> [UiCommand; 4] {
    let status = format!("{}Status", prefix);
    [
        UiCommand::text(format!("{}Value", prefix), format!("{} {}", reading.value, reading.unit)),
        UiCommand::text(format!("{}Location", prefix), reading.location.clone()),
        UiCommand::text(status.clone(), reading.status.clone()),
        UiCommand::class(status, format!("widget-status status-{}", reading.status)),
    ]
}

pub fn production_line_card(line: &ProductionLine) -> ProductionLineCard {
    let efficiency = line.efficiency.min(100.0);
    let output_percentage = rounded_percent(line.output_rate, line.target_rate);

    ProductionLineCard {
        id: line.id.clone(),
        name: line.name.clone(),
        status: line.status.clone(),
        efficiency,
        output: format!("{}/{}", line.output_rate, line.target_rate),
        output_percentage,
        severity: Severity::at_least(output_percentage as f64, 100.0, 80.0),
    }
}

fn production_lines(lines: &[ProductionLine]) -> UiCommand {
    let cards = lines
        .iter()
        .map(|line| ViewItem::ProductionLine(production_line_card(line)))
        .collect();
    UiCommand::children(PRODUCTION_LINES, cards)
}

fn oee_chart(oee: &OeeBreakdown) -> [UiCommand; 2] {
    let spec = ChartSpec {
        kind: ChartKind::Doughnut,
        labels: vec![
            "Availability".to_string(),
            "Performance".to_string(),
            "Quality".to_string(),
        ],
        datasets: vec![
            Dataset::new("OEE", vec![oee.availability, oee.performance, oee.quality])
                .colors(&[BLUE, GREEN, AMBER]),
        ],
        options: ChartOptions {
            legend_position: Some("bottom".to_string()),
            cutout_percent: Some(60),
            value_suffix: Some("%".to_string()),
        },
    };

    [
        UiCommand::RenderChart {
            slot: ChartSlot::Oee,
            spec,
        },
        UiCommand::text(OEE_VALUE, format!("{}%", oee.oee)),
    ]
}

fn work_orders(orders: &[WorkOrder]) -> UiCommand {
    // Endpoint order is preserved; no client-side sorting
    let cards = orders
        .iter()
        .map(|order| {
            ViewItem::WorkOrder(WorkOrderCard {
                id: order.id.clone(),
                priority: order.priority.clone(),
                priority_class: format!("priority-{}", order.priority),
                product: order.product.clone(),
                quantity: order.quantity,
                assigned_line: order.assigned_line.clone(),
                due_date: order.due_date.clone(),
                progress: order.progress.clamp(0.0, 100.0),
            })
        })
        .collect();
    UiCommand::children(WORK_ORDERS, cards)
}

pub fn material_rows(inventory: &Inventory) -> Vec<MaterialRow> {
    inventory
        .raw_materials
        .iter()
        .map(|(material, stock)| {
            let is_low = stock.current_stock <= stock.minimum_stock;
            MaterialRow {
                label: material.replace('_', " ").to_uppercase(),
                stock: format!("{} {}", stock.current_stock, stock.unit),
                percentage: rounded_percent(stock.current_stock, stock.minimum_stock * 2.0),
                is_low,
                severity: if is_low {
                    Severity::Negative
                } else {
                    Severity::Positive
                },
            }
        })
        .collect()
}

fn inventory_status(inventory: &Inventory) -> UiCommand {
    let rows = material_rows(inventory)
        .into_iter()
        .map(ViewItem::Material)
        .collect();
    UiCommand::children(INVENTORY, rows)
}

pub fn financial_metrics(financial: &FinancialMetrics) -> Vec<DerivedMetric> {
    let profit_margin = ratio_percent(
        financial.daily_revenue - financial.production_cost,
        financial.daily_revenue,
    );
    let target_percentage = ratio_percent(financial.daily_revenue, financial.target_revenue);
    let symbol = currency_symbol(&financial.currency);

    vec![
        DerivedMetric::new(
            "Daily Revenue",
            format!("{}{}", symbol, group_thousands(financial.daily_revenue)),
            Severity::Positive,
        ),
        DerivedMetric::new(
            "Production Cost",
            format!("{}{}", symbol, group_thousands(financial.production_cost)),
            Severity::Neutral,
        ),
        DerivedMetric::new(
            "Profit Margin",
            format!("{:.1}%", round_half_up(profit_margin, 1)),
            Severity::positive_or_warning(profit_margin > 30.0),
        ),
        DerivedMetric::new(
            "Target Achievement",
            format!("{:.1}%", round_half_up(target_percentage, 1)),
            Severity::positive_or_warning(target_percentage >= 100.0),
        ),
    ]
}

pub fn quality_metrics(quality: &QualityMetrics) -> Vec<DerivedMetric> {
    vec![
        DerivedMetric::new(
            "Defect Rate",
            format!("{}%", quality.defect_rate),
            Severity::below(quality.defect_rate, 1.0, 2.0),
        ),
        DerivedMetric::new(
            "First Pass Yield",
            format!("{}%", quality.first_pass_yield),
            Severity::above(quality.first_pass_yield, 98.0, 95.0),
        ),
        DerivedMetric::new(
            "Rework Rate",
            format!("{}%", quality.rework_rate),
            Severity::below(quality.rework_rate, 1.0, 2.0),
        ),
    ]
}

pub fn daily_production_metrics(daily: &DailyProduction) -> Vec<DerivedMetric> {
    let achievement = rounded_percent(daily.actual, daily.target);

    vec![
        DerivedMetric::new("Target", group_thousands(daily.target), Severity::Neutral),
        DerivedMetric::new(
            "Actual",
            group_thousands(daily.actual),
            Severity::positive_or_warning(daily.actual >= daily.target),
        ),
        DerivedMetric::new(
            "Efficiency",
            format!("{}%", daily.efficiency),
            Severity::at_least(daily.efficiency, 100.0, 90.0),
        ),
        DerivedMetric::new(
            "Achievement",
            format!("{}%", achievement),
            Severity::at_least(achievement as f64, 100.0, 85.0),
        ),
    ]
}

pub fn downtime_metrics(downtime: &Downtime) -> Vec<DerivedMetric> {
    let total_hours = minutes_to_hours(downtime.total_minutes);
    let planned_hours = minutes_to_hours(downtime.planned);
    let unplanned_hours = minutes_to_hours(downtime.unplanned);
    let unplanned_percentage = rounded_percent(downtime.unplanned, downtime.total_minutes);

    vec![
        DerivedMetric::new(
            "Total Downtime",
            format!("{}h", total_hours),
            Severity::below(total_hours, 2.0, 4.0),
        ),
        DerivedMetric::new("Planned", format!("{}h", planned_hours), Severity::Neutral),
        DerivedMetric::new(
            "Unplanned",
            format!("{}h", unplanned_hours),
            Severity::below(unplanned_hours, 1.0, 2.0),
        ),
        DerivedMetric::new(
            "Unplanned %",
            format!("{}%", unplanned_percentage),
            Severity::below(unplanned_percentage as f64, 30.0, 50.0),
        ),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary<'a> {
    pub total: f64,
    pub average: f64,
    pub daily_target: f64,
    pub weekly_target: f64,
    pub achievement: i64,
    pub best: Option<&'a TrendDay>,
    pub worst: Option<&'a TrendDay>,
}

pub fn weekly_summary(production: &ProductionMetrics) -> WeeklySummary<'_> {
    let trend = &production.weekly_trend;
    let total: f64 = trend.iter().map(|day| day.production).sum();
    let average = if trend.is_empty() {
        0.0
    } else {
        round_half_up(total / trend.len() as f64, 0)
    };
    let daily_target = production.daily_production.target;
    let weekly_target = daily_target * 7.0;

    // Strict comparisons keep the first day on ties
    let best = trend.iter().reduce(|best, day| {
        if day.production > best.production {
            day
        } else {
            best
        }
    });
    let worst = trend.iter().reduce(|worst, day| {
        if day.production < worst.production {
            day
        } else {
            worst
        }
    });

    WeeklySummary {
        total,
        average,
        daily_target,
        weekly_target,
        achievement: rounded_percent(total, weekly_target),
        best,
        worst,
    }
}

pub fn weekly_performance_metrics(production: &ProductionMetrics) -> Vec<DerivedMetric> {
    let summary = weekly_summary(production);

    let mut metrics = vec![
        DerivedMetric::new(
            "Weekly Total",
            group_thousands(summary.total),
            Severity::positive_or_warning(summary.total >= summary.weekly_target),
        ),
        DerivedMetric::new(
            "Daily Average",
            group_thousands(summary.average),
            Severity::positive_or_warning(summary.average >= summary.daily_target),
        ),
        DerivedMetric::new(
            "Achievement",
            format!("{}%", summary.achievement),
            Severity::at_least(summary.achievement as f64, 100.0, 85.0),
        ),
    ];

    if let Some(best) = summary.best {
        metrics.push(DerivedMetric::new(
            format!("Best: {}", best.day),
            group_thousands(best.production),
            Severity::Positive,
        ));
    }
    if let Some(worst) = summary.worst {
        metrics.push(DerivedMetric::new(
            format!("Worst: {}", worst.day),
            group_thousands(worst.production),
            Severity::Neutral,
        ));
    }

    metrics
}

fn efficiency_chart(production: &ProductionMetrics) -> UiCommand {
    let trend = &production.weekly_trend;
    let target = production.daily_production.target;

    let spec = ChartSpec {
        kind: ChartKind::Bar,
        labels: trend.iter().map(|day| day.day.clone()).collect(),
        datasets: vec![
            Dataset::new("Production", trend.iter().map(|day| day.production).collect())
                .colors(&[BLUE]),
            Dataset::new("Target", vec![target; trend.len()])
                .rendered_as(ChartKind::Line)
                .colors(&[RED]),
        ],
        options: ChartOptions {
            legend_position: Some("top".to_string()),
            ..ChartOptions::default()
        },
    };

    UiCommand::RenderChart {
        slot: ChartSlot::Efficiency,
        spec,
    }
}

fn production_trend_chart(history: &HistoricalData) -> UiCommand {
    let points = &history.data_points;

    let spec = ChartSpec {
        kind: ChartKind::Line,
        labels: points.iter().map(|p| p.timestamp.clone()).collect(),
        datasets: vec![
            Dataset::new(
                "Production Rate",
                points.iter().map(|p| p.production_rate).collect(),
            )
            .on_axis("y")
            .colors(&[BLUE])
            .filled(),
            Dataset::new(
                "Temperature (°C)",
                points.iter().map(|p| p.temperature).collect(),
            )
            .on_axis("y1")
            .colors(&[AMBER]),
        ],
        options: ChartOptions::default(),
    };

    UiCommand::RenderChart {
        slot: ChartSlot::Production,
        spec,
    }
}
