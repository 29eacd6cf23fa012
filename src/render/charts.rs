//! SVG line charts and sparklines
//!
//! Input is a metric time series of `[rfc3339-timestamp, value]` points as
//! found in the snapshot. Flat series and single points are handled by
//! substituting 1 for a zero value range so scaling never divides by zero.

use chrono::DateTime;

use super::escape_xml;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub label: Option<String>,
    /// Unique per rendered instance; namespaces the gradient id.
    pub chart_id: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            color: "#3b82f6".to_string(),
            label: None,
            chart_id: "chart".to_string(),
        }
    }
}

const PADDING: f64 = 40.0;

/// Render a line chart with area fill, axis extremes, and per-point markers.
pub fn line_chart(points: &[(String, f64)], opts: &ChartOptions) -> String {
    if points.is_empty() {
        return r#"<p class="small">No data available</p>"#.to_string();
    }

    let xs: Vec<f64> = points.iter().map(|(ts, _)| epoch_ms(ts)).collect();
    let ys: Vec<f64> = points.iter().map(|(_, v)| *v).collect();

    let x_min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let y_min = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let y_max = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let chart_w = opts.width - PADDING * 2.0;
    let chart_h = opts.height - PADDING * 2.0;
    let x_range = if x_max > x_min { x_max - x_min } else { 1.0 };
    let y_range = if y_max > y_min { y_max - y_min } else { 1.0 };

    let scale_x = |x: f64| (x - x_min) / x_range * chart_w + PADDING;
    let scale_y = |y: f64| opts.height - ((y - y_min) / y_range * chart_h + PADDING);

    let mut path = String::new();
    for (i, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        path.push_str(&format!("{cmd} {:.2} {:.2} ", scale_x(x), scale_y(y)));
    }
    let path = path.trim_end().to_string();

    let baseline = opts.height - PADDING;
    let area = format!(
        "M {:.2} {baseline:.2} {} L {:.2} {baseline:.2} Z",
        scale_x(xs[0]),
        path.replacen('M', "L", 1),
        scale_x(xs[xs.len() - 1]),
    );

    let markers: String = points
        .iter()
        .zip(xs.iter().zip(&ys))
        .map(|((ts, v), (&x, &y))| {
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="{}" class="chart-point" data-value="{v:.1}" data-time="{}"/>"#,
                scale_x(x),
                scale_y(y),
                opts.color,
                escape_xml(ts),
            )
        })
        .collect();

    let label = opts
        .label
        .as_deref()
        .map(|l| format!(r#"<text x="{PADDING}" y="16" class="chart-label">{}</text>"#, escape_xml(l)))
        .unwrap_or_default();
    let gradient_id = format!("gradient-{}", opts.chart_id);

    format!(
        concat!(
            r#"<svg viewBox="0 0 {w} {h}" class="line-chart">"#,
            r#"<defs><linearGradient id="{gid}" x1="0%" y1="0%" x2="0%" y2="100%">"#,
            r#"<stop offset="0%" stop-color="{color}" stop-opacity="0.3"/>"#,
            r#"<stop offset="100%" stop-color="{color}" stop-opacity="0.05"/>"#,
            r#"</linearGradient></defs>"#,
            "{label}",
            r#"<line x1="{pad}" y1="{baseline}" x2="{inner_w}" y2="{baseline}" stroke="rgba(0,0,0,0.1)"/>"#,
            r#"<line x1="{pad}" y1="{pad}" x2="{pad}" y2="{baseline}" stroke="rgba(0,0,0,0.1)"/>"#,
            r#"<path d="{area}" fill="url(#{gid})"/>"#,
            r#"<path d="{path}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            r#"<text x="5" y="{pad}" font-size="10">{ymax:.1}</text>"#,
            r#"<text x="5" y="{baseline}" font-size="10">{ymin:.1}</text>"#,
            "{markers}",
            "</svg>"
        ),
        w = opts.width,
        h = opts.height,
        gid = gradient_id,
        color = opts.color,
        label = label,
        pad = PADDING,
        inner_w = opts.width - PADDING,
        baseline = baseline,
        area = area,
        path = path,
        ymax = y_max,
        ymin = y_min,
        markers = markers,
    )
}

/// Render a 60x20 sparkline from the values alone (x is the point index).
pub fn sparkline(points: &[(String, f64)], color: &str) -> String {
    if points.is_empty() {
        return String::new();
    }

    let width = 60.0;
    let height = 20.0;
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };
    let last = (values.len() as f64 - 1.0).max(1.0);

    let mut path = String::new();
    for (i, v) in values.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let x = i as f64 / last * width;
        let y = height - (v - min) / range * height;
        path.push_str(&format!("{cmd} {x:.2} {y:.2} "));
    }

    format!(
        r#"<svg viewBox="0 0 {width} {height}" class="sparkline"><path d="{}" fill="none" stroke="{color}" stroke-width="1.5"/></svg>"#,
        path.trim_end(),
    )
}

fn epoch_ms(ts: &str) -> f64 {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<(String, f64)> {
        vec![
            ("2024-01-01T00:00:00Z".to_string(), 10.0),
            ("2024-01-01T00:05:00Z".to_string(), 30.0),
            ("2024-01-01T00:10:00Z".to_string(), 20.0),
        ]
    }

    #[test]
    fn empty_series_renders_placeholder() {
        assert!(line_chart(&[], &ChartOptions::default()).contains("No data available"));
        assert_eq!(sparkline(&[], "#000"), "");
    }

    #[test]
    fn chart_contains_viewbox_path_and_markers() {
        let svg = line_chart(&series(), &ChartOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 400 200""#));
        assert!(svg.contains("M ") && svg.contains("L "));
        assert_eq!(svg.matches("chart-point").count(), 3);
        assert!(svg.contains("30.0")); // y-max axis label
    }

    #[test]
    fn gradient_is_namespaced_by_chart_id() {
        let opts = ChartOptions {
            chart_id: "cpu-42".into(),
            ..Default::default()
        };
        let svg = line_chart(&series(), &opts);
        assert!(svg.contains("gradient-cpu-42"));
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let flat = vec![
            ("2024-01-01T00:00:00Z".to_string(), 5.0),
            ("2024-01-01T00:05:00Z".to_string(), 5.0),
        ];
        let svg = line_chart(&flat, &ChartOptions::default());
        assert!(!svg.contains("NaN"));
        let spark = sparkline(&flat, "#000");
        assert!(!spark.contains("NaN"));
    }

    #[test]
    fn single_point_is_handled() {
        let one = vec![("2024-01-01T00:00:00Z".to_string(), 5.0)];
        assert!(!line_chart(&one, &ChartOptions::default()).contains("NaN"));
        assert!(!sparkline(&one, "#000").contains("NaN"));
    }

    #[test]
    fn label_is_escaped() {
        let opts = ChartOptions {
            label: Some("CPU <fast & furious>".into()),
            ..Default::default()
        };
        let svg = line_chart(&series(), &opts);
        assert!(svg.contains("CPU &lt;fast &amp; furious&gt;"));
    }
}
