use crate::chart::{ChartId, ChartSurface};
use anyhow::bail;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedChart {
    pub container: String,
    pub options: Vec<Value>,
    pub resizes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingChartSurface {
    pub charts: Vec<RecordedChart>,
    #[serde(skip)]
    missing: BTreeSet<String>,
}

impl RecordingChartSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `init` fail for `container`, as if the element were absent.
    pub fn without_container(mut self, container: &str) -> Self {
        self.missing.insert(container.to_string());
        self
    }

    pub fn chart(&self, container: &str) -> Option<&RecordedChart> {
        self.charts.iter().find(|c| c.container == container)
    }

    pub fn init_count(&self) -> usize {
        self.charts.len()
    }
}

impl ChartSurface for RecordingChartSurface {
    fn init(&mut self, container: &str) -> anyhow::Result<ChartId> {
        if self.missing.contains(container) {
            bail!("chart container {container} not found");
        }
        self.charts.push(RecordedChart {
            container: container.to_string(),
            options: Vec::new(),
            resizes: 0,
        });
        Ok(ChartId(self.charts.len() - 1))
    }

    fn set_option(&mut self, id: ChartId, option: Value) {
        if let Some(chart) = self.charts.get_mut(id.0) {
            chart.options.push(option);
        }
    }

    fn resize(&mut self, id: ChartId) {
        if let Some(chart) = self.charts.get_mut(id.0) {
            chart.resizes += 1;
        }
    }
}
