//! Built-in dashboard widgets and the data they render from.

use std::collections::BTreeMap;
use std::sync::Arc;

use crm_config::Configuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{Widget, WidgetError, WidgetMeta, WidgetRegistry};

const RECENT_LIMIT: usize = 5;

/// Records fetched from the backend for dashboard widgets.
///
/// Records are opaque JSON objects; widgets read the attributes they know and
/// skip the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub customers: Vec<Value>,
    #[serde(default)]
    pub quotes: Vec<Value>,
}

/// Everything a widget may read while rendering.
#[derive(Debug, Clone, Default)]
pub struct WidgetContext {
    pub config: Arc<Configuration>,
    pub data: DashboardData,
}

impl WidgetContext {
    pub fn new(config: Arc<Configuration>, data: DashboardData) -> Self {
        Self { config, data }
    }

    fn money(&self, amount: f64) -> String {
        format!("{} {:.2}", self.config.general.currency, amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub route: String,
}

/// Widget content, independent of any toolkit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WidgetBody {
    Stats { items: Vec<Stat> },
    Table { columns: Vec<String>, rows: Vec<Vec<String>> },
    Chart { labels: Vec<String>, values: Vec<f64> },
    Links { items: Vec<Link> },
    List { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub title: String,
    pub body: WidgetBody,
}

impl WidgetView {
    pub fn new(title: impl Into<String>, body: WidgetBody) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }
}

pub(crate) fn register_builtins(registry: &mut WidgetRegistry) {
    registry.register(
        "CustomerStats",
        WidgetMeta::new("Customer Statistics", "Displays key customer metrics", "users"),
        || Box::new(CustomerStats),
    );
    registry.register(
        "RecentQuotes",
        WidgetMeta::new("Recent Quotes", "Shows a list of recent quotes", "file-text"),
        || Box::new(RecentQuotes),
    );
    registry.register(
        "SalesChart",
        WidgetMeta::new("Sales Chart", "Visualizes sales performance", "bar-chart"),
        || Box::new(SalesChart),
    );
    registry.register(
        "QuickActions",
        WidgetMeta::new("Quick Actions", "Shows common actions for easy access", "zap"),
        || Box::new(QuickActions),
    );
    registry.register(
        "UpcomingTasks",
        WidgetMeta::new("Upcoming Tasks", "Lists tasks due soon", "check-square"),
        || Box::new(UpcomingTasks),
    );
    registry.register(
        "RecentActivity",
        WidgetMeta::new("Recent Activity", "Shows recent system activity", "activity"),
        || Box::new(RecentActivity),
    );
}

struct CustomerStats;

impl Widget for CustomerStats {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let quoted = ctx.data.quotes.iter().map(amount).sum::<Result<f64, _>>()?;
        let items = vec![
            Stat {
                label: "Total Customers".into(),
                value: ctx.data.customers.len().to_string(),
            },
            Stat {
                label: "Open Quotes".into(),
                value: ctx.data.quotes.len().to_string(),
            },
            Stat {
                label: "Quoted Value".into(),
                value: ctx.money(quoted),
            },
        ];
        Ok(WidgetView::new("Customer Statistics", WidgetBody::Stats { items }))
    }
}

struct RecentQuotes;

impl Widget for RecentQuotes {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let mut quotes: Vec<&Value> = ctx.data.quotes.iter().collect();
        quotes.sort_by(|a, b| text(b, "quoteDate").cmp(&text(a, "quoteDate")));

        let rows = quotes
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|q| {
                Ok(vec![
                    text(q, "quoteNumber").unwrap_or_else(|| id(q)),
                    customer_name(ctx, q),
                    text(q, "quoteDate").unwrap_or_default(),
                    ctx.money(amount(q)?),
                ])
            })
            .collect::<Result<Vec<_>, WidgetError>>()?;

        Ok(WidgetView::new(
            "Recent Quotes",
            WidgetBody::Table {
                columns: ["Quote", "Customer", "Date", "Amount"]
                    .map(String::from)
                    .to_vec(),
                rows,
            },
        ))
    }
}

struct SalesChart;

impl Widget for SalesChart {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let mut months: BTreeMap<String, f64> = BTreeMap::new();
        for quote in &ctx.data.quotes {
            let Some(date) = text(quote, "quoteDate") else {
                continue;
            };
            let month: String = date.chars().take(7).collect();
            *months.entry(month).or_default() += amount(quote)?;
        }
        let (labels, values): (Vec<String>, Vec<f64>) = months.into_iter().unzip();
        Ok(WidgetView::new(
            "Sales Chart",
            WidgetBody::Chart { labels, values },
        ))
    }
}

struct QuickActions;

impl Widget for QuickActions {
    fn render(&self, _ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let items = [
            ("Create Quote", "/quotes/create"),
            ("View Customers", "/customers"),
            ("View Invoices", "/invoices"),
            ("Customize", "/customization"),
        ]
        .into_iter()
        .map(|(label, route)| Link {
            label: label.into(),
            route: route.into(),
        })
        .collect();
        Ok(WidgetView::new("Quick Actions", WidgetBody::Links { items }))
    }
}

/// Quotes closest to expiry, as follow-up reminders.
struct UpcomingTasks;

impl Widget for UpcomingTasks {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let mut expiring: Vec<(String, &Value)> = ctx
            .data
            .quotes
            .iter()
            .filter_map(|q| text(q, "expirationDate").map(|d| (d, q)))
            .collect();
        expiring.sort_by(|a, b| a.0.cmp(&b.0));

        let items = expiring
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|(date, q)| {
                format!(
                    "Follow up on quote {} for {} before {date}",
                    text(q, "quoteNumber").unwrap_or_else(|| id(q)),
                    customer_name(ctx, q)
                )
            })
            .collect();
        Ok(WidgetView::new("Upcoming Tasks", WidgetBody::List { items }))
    }
}

/// Newest records first: the tail of each collection.
struct RecentActivity;

impl Widget for RecentActivity {
    fn render(&self, ctx: &WidgetContext) -> Result<WidgetView, WidgetError> {
        let quotes = ctx.data.quotes.iter().rev().map(|q| {
            format!(
                "Quote {} created for {}",
                text(q, "quoteNumber").unwrap_or_else(|| id(q)),
                customer_name(ctx, q)
            )
        });
        let customers = ctx.data.customers.iter().rev().map(|c| {
            format!(
                "Customer {} added",
                text(c, "name").unwrap_or_else(|| id(c))
            )
        });
        let items = quotes.chain(customers).take(RECENT_LIMIT).collect();
        Ok(WidgetView::new("Recent Activity", WidgetBody::List { items }))
    }
}

/// String or number attribute rendered as text.
fn text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id(record: &Value) -> String {
    text(record, "id").unwrap_or_else(|| "?".into())
}

/// `totalAmount` as a number. Missing counts as zero; anything unreadable fails the widget.
fn amount(record: &Value) -> Result<f64, WidgetError> {
    match record.get("totalAmount") {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| WidgetError::new(format!("quote {} has an invalid total", id(record)))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| WidgetError::new(format!("quote {} has an invalid total", id(record)))),
        Some(_) => Err(WidgetError::new(format!(
            "quote {} has an invalid total",
            id(record)
        ))),
    }
}

fn customer_name(ctx: &WidgetContext, quote: &Value) -> String {
    if let Some(name) = text(quote, "customerName") {
        return name;
    }
    let Some(customer_id) = text(quote, "customerId") else {
        return "Unknown customer".into();
    };
    ctx.data
        .customers
        .iter()
        .find(|c| text(c, "id").as_deref() == Some(customer_id.as_str()))
        .and_then(|c| text(c, "name"))
        .unwrap_or(customer_id)
}
