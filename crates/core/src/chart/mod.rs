pub mod options;
pub mod recording;

use crate::view::projector::{CandleBinding, GaugeBinding, PieBinding, RenderPlan};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChartId(pub usize);

pub trait ChartSurface: Send {
    fn init(&mut self, container: &str) -> anyhow::Result<ChartId>;
    fn set_option(&mut self, id: ChartId, option: Value);
    fn resize(&mut self, id: ChartId);
}

#[derive(Debug, Default)]
pub struct ChartAdapter {
    instances: BTreeMap<String, ChartId>,
    resize_listeners: Vec<ChartId>,
}

impl ChartAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self, container: &str) -> Option<ChartId> {
        self.instances.get(container).copied()
    }

    pub fn bind_plan(&mut self, surface: &mut dyn ChartSurface, plan: &RenderPlan) {
        if let Some(gauge) = &plan.gauge {
            self.bind_gauge(surface, gauge);
        }
        for candles in &plan.candles {
            self.bind_candles(surface, candles);
        }
        if let Some(pie) = &plan.pie {
            self.bind_pie(surface, pie);
        }
    }

    pub fn bind_gauge(&mut self, surface: &mut dyn ChartSurface, binding: &GaugeBinding) -> Option<ChartId> {
        self.bind(
            surface,
            &binding.container,
            || options::gauge_option(binding.value, binding.color),
            || options::gauge_data(binding.value, binding.color),
        )
    }

    pub fn bind_candles(&mut self, surface: &mut dyn ChartSurface, binding: &CandleBinding) -> Option<ChartId> {
        if binding.history.is_empty() {
            tracing::debug!(container = %binding.container, "no price history; chart skipped");
            return None;
        }
        self.bind(
            surface,
            &binding.container,
            || options::candle_option(&binding.history),
            || options::candle_data(&binding.history),
        )
    }

    pub fn bind_pie(&mut self, surface: &mut dyn ChartSurface, binding: &PieBinding) -> Option<ChartId> {
        if binding.slices.is_empty() {
            tracing::debug!(container = %binding.container, "no category data; chart skipped");
            return None;
        }
        let selected = binding.selected.as_deref();
        self.bind(
            surface,
            &binding.container,
            || options::pie_option(&binding.slices, selected),
            || options::pie_data(&binding.slices, selected),
        )
    }

    pub fn handle_resize(&self, surface: &mut dyn ChartSurface) {
        for id in &self.resize_listeners {
            surface.resize(*id);
        }
    }

    fn bind(
        &mut self,
        surface: &mut dyn ChartSurface,
        container: &str,
        full: impl FnOnce() -> Value,
        data: impl FnOnce() -> Value,
    ) -> Option<ChartId> {
        if let Some(id) = self.instance(container) {
            surface.set_option(id, data());
            return Some(id);
        }

        let id = match surface.init(container) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(container, error = %e, "chart init failed; chart skipped");
                return None;
            }
        };
        surface.set_option(id, full());
        self.instances.insert(container.to_string(), id);
        self.resize_listeners.push(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::recording::RecordingChartSurface;
    use super::*;
    use crate::domain::record::{Candle, CategoryCount};

    fn gauge(value: f64) -> GaugeBinding {
        GaugeBinding {
            container: "temperatureGauge".to_string(),
            value,
            color: crate::view::projector::gauge_color(value),
        }
    }

    #[test]
    fn first_bind_inits_and_rebind_patches_same_instance() {
        let mut surface = RecordingChartSurface::new();
        let mut adapter = ChartAdapter::new();

        let first = adapter.bind_gauge(&mut surface, &gauge(72.5)).unwrap();
        let second = adapter.bind_gauge(&mut surface, &gauge(40.0)).unwrap();

        assert_eq!(first, second);
        assert_eq!(surface.init_count(), 1);
        let chart = surface.chart("temperatureGauge").unwrap();
        assert_eq!(chart.options.len(), 2);
        assert_eq!(chart.options[0]["series"][0]["type"], "gauge");
        assert!(chart.options[1]["series"][0].get("type").is_none());
        assert_eq!(chart.options[1]["series"][0]["data"][0]["value"], 40.0);
    }

    #[test]
    fn resize_reaches_each_instance_once() {
        let mut surface = RecordingChartSurface::new();
        let mut adapter = ChartAdapter::new();
        adapter.bind_gauge(&mut surface, &gauge(60.0));
        adapter.bind_gauge(&mut surface, &gauge(61.0));
        adapter.bind_pie(
            &mut surface,
            &PieBinding {
                container: "categoryChart".to_string(),
                slices: vec![CategoryCount {
                    category: "经济数据".to_string(),
                    count: 2,
                }],
                selected: None,
            },
        );

        adapter.handle_resize(&mut surface);
        assert!(surface.charts.iter().all(|c| c.resizes == 1));
        assert_eq!(surface.init_count(), 2);
    }

    #[test]
    fn empty_series_are_skipped_without_error() {
        let mut surface = RecordingChartSurface::new();
        let mut adapter = ChartAdapter::new();

        let candles = adapter.bind_candles(
            &mut surface,
            &CandleBinding {
                container: "chart-159770".to_string(),
                history: Vec::new(),
            },
        );
        let pie = adapter.bind_pie(
            &mut surface,
            &PieBinding {
                container: "categoryChart".to_string(),
                slices: Vec::new(),
                selected: None,
            },
        );

        assert!(candles.is_none());
        assert!(pie.is_none());
        assert_eq!(surface.init_count(), 0);
    }

    #[test]
    fn missing_container_is_skipped() {
        let mut surface = RecordingChartSurface::new().without_container("chart-515860");
        let mut adapter = ChartAdapter::new();
        let bound = adapter.bind_candles(
            &mut surface,
            &CandleBinding {
                container: "chart-515860".to_string(),
                history: vec![Candle {
                    date: "2025-10-22".to_string(),
                    open: 1.0,
                    close: 1.1,
                    low: 0.9,
                    high: 1.2,
                    volume: 10.0,
                }],
            },
        );
        assert!(bound.is_none());
        assert!(adapter.instance("chart-515860").is_none());
    }
}
