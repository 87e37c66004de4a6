use crate::domain::record::{Candle, CategoryCount};
use serde_json::{json, Value};

const GAUGE_NAME: &str = "投资温度";
const CANDLE_UP: &str = "#ef4444";
const CANDLE_DOWN: &str = "#10b981";
const FIRST_BAR: &str = "#999";

pub fn gauge_option(value: f64, color: &str) -> Value {
    json!({
        "series": [{
            "type": "gauge",
            "startAngle": 180,
            "endAngle": 0,
            "min": 0,
            "max": 100,
            "splitNumber": 10,
            "itemStyle": {"color": color},
            "progress": {"show": true, "width": 18},
            "pointer": {"show": true, "length": "70%", "width": 8},
            "axisLine": {
                "lineStyle": {
                    "width": 18,
                    "color": [[0.3, "#FF6B6B"], [0.7, "#FFD93D"], [1, "#6BCF7F"]]
                }
            },
            "anchor": {
                "show": true,
                "showAbove": true,
                "size": 20,
                "itemStyle": {"borderWidth": 8, "borderColor": color}
            },
            "detail": {
                "valueAnimation": true,
                "fontSize": 40,
                "offsetCenter": [0, "50%"],
                "formatter": "{value}°",
                "color": "auto"
            },
            "data": [{"value": value, "name": GAUGE_NAME}]
        }]
    })
}

pub fn gauge_data(value: f64, color: &str) -> Value {
    json!({
        "series": [{
            "itemStyle": {"color": color},
            "anchor": {"itemStyle": {"borderColor": color}},
            "data": [{"value": value, "name": GAUGE_NAME}]
        }]
    })
}

pub fn candle_option(history: &[Candle]) -> Value {
    let (dates, ohlc, volumes) = candle_series(history);
    json!({
        "grid": [
            {"left": "10%", "right": "8%", "top": "10%", "height": "50%"},
            {"left": "10%", "right": "8%", "top": "70%", "height": "15%"}
        ],
        "xAxis": [
            {"type": "category", "data": dates, "gridIndex": 0, "show": false},
            {"type": "category", "data": dates, "gridIndex": 1}
        ],
        "yAxis": [
            {"scale": true, "gridIndex": 0, "splitLine": {"show": false}},
            {"scale": true, "gridIndex": 1, "splitLine": {"show": false}}
        ],
        "series": [
            {
                "type": "candlestick",
                "data": ohlc,
                "xAxisIndex": 0,
                "yAxisIndex": 0,
                "itemStyle": {
                    "color": CANDLE_UP,
                    "color0": CANDLE_DOWN,
                    "borderColor": CANDLE_UP,
                    "borderColor0": CANDLE_DOWN
                }
            },
            {
                "type": "bar",
                "data": volumes,
                "xAxisIndex": 1,
                "yAxisIndex": 1
            }
        ],
        "tooltip": {"trigger": "axis", "axisPointer": {"type": "cross"}}
    })
}

pub fn candle_data(history: &[Candle]) -> Value {
    let (dates, ohlc, volumes) = candle_series(history);
    json!({
        "xAxis": [{"data": dates}, {"data": dates}],
        "series": [{"data": ohlc}, {"data": volumes}]
    })
}

fn candle_series(history: &[Candle]) -> (Vec<&str>, Vec<[f64; 4]>, Vec<Value>) {
    let dates = history.iter().map(|c| c.date.as_str()).collect();
    let ohlc = history
        .iter()
        .map(|c| [c.open, c.close, c.low, c.high])
        .collect();
    let volumes = history
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            json!({
                "value": c.volume,
                "itemStyle": {"color": volume_color(history, idx)}
            })
        })
        .collect();
    (dates, ohlc, volumes)
}

pub fn volume_color(history: &[Candle], idx: usize) -> &'static str {
    if idx == 0 {
        return FIRST_BAR;
    }
    match (history.get(idx), history.get(idx - 1)) {
        (Some(bar), Some(prev)) if bar.close >= prev.close => CANDLE_UP,
        (Some(_), Some(_)) => CANDLE_DOWN,
        _ => FIRST_BAR,
    }
}

pub fn pie_option(slices: &[CategoryCount], selected: Option<&str>) -> Value {
    json!({
        "tooltip": {"trigger": "item", "formatter": "{b}: {c} ({d}%)"},
        "legend": {"orient": "vertical", "left": "left"},
        "series": [{
            "type": "pie",
            "radius": ["40%", "70%"],
            "selectedMode": "single",
            "itemStyle": {"borderRadius": 10, "borderColor": "#fff", "borderWidth": 2},
            "label": {"show": false},
            "data": pie_slices(slices, selected)
        }]
    })
}

pub fn pie_data(slices: &[CategoryCount], selected: Option<&str>) -> Value {
    json!({"series": [{"data": pie_slices(slices, selected)}]})
}

fn pie_slices(slices: &[CategoryCount], selected: Option<&str>) -> Vec<Value> {
    slices
        .iter()
        .map(|s| {
            json!({
                "name": s.category,
                "value": s.count,
                "selected": selected == Some(s.category.as_str())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> Candle {
        Candle {
            date: "2025-10-22".to_string(),
            open: 1.0,
            close,
            low: 0.9,
            high: 1.3,
            volume: 100.0,
        }
    }

    #[test]
    fn volume_colours_follow_prior_close() {
        let history = vec![bar(1.0), bar(1.1), bar(1.1), bar(1.05)];
        let colours: Vec<_> = (0..history.len()).map(|i| volume_color(&history, i)).collect();
        assert_eq!(colours, vec!["#999", "#ef4444", "#ef4444", "#10b981"]);
    }

    #[test]
    fn candle_quadruples_are_open_close_low_high() {
        let option = candle_option(&[bar(1.2)]);
        assert_eq!(option["series"][0]["data"][0], json!([1.0, 1.2, 0.9, 1.3]));
        assert_eq!(option["series"][1]["data"][0]["itemStyle"]["color"], "#999");
        assert_eq!(option["xAxis"][1]["data"][0], "2025-10-22");
    }

    #[test]
    fn pie_marks_selected_slice() {
        let slices = vec![
            CategoryCount {
                category: "经济数据".to_string(),
                count: 3,
            },
            CategoryCount {
                category: "货币政策".to_string(),
                count: 1,
            },
        ];
        let data = pie_data(&slices, Some("货币政策"));
        assert_eq!(data["series"][0]["data"][0]["selected"], false);
        assert_eq!(data["series"][0]["data"][1]["selected"], true);
    }
}
