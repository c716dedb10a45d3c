//! The tagged chart-update record streamed by the event log. `Serialize`
//! gives the embedding server the SSE-ready JSON named in `spec.md` §6
//! (`data: <json>\n\n`) without it having to know this crate's internal
//! shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plot {
    Throughput,
    Latency,
    System,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameOp {
    Extend,
    Replace,
}

/// A scatter-plot `{x,y}` pair or a table of parallel columns. Untagged so
/// `data` serializes as a bare object or array, matching the wire schema in
/// `spec.md` §6 (`{x,y}` for scatter plots, `[[...],[...],...]` for tables)
/// rather than a Rust-enum-shaped `{"Point": {...}}` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameData {
    Point { x: f64, y: f64 },
    Columns(Vec<Vec<serde_json::Value>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub plot: Plot,
    pub trace: u32,
    pub operation: FrameOp,
    pub data: FrameData,
}

impl Frame {
    #[must_use]
    pub fn point(plot: Plot, trace: u32, operation: FrameOp, x: f64, y: f64) -> Self {
        Self {
            plot,
            trace,
            operation,
            data: FrameData::Point { x, y },
        }
    }

    #[must_use]
    pub fn table(plot: Plot, trace: u32, operation: FrameOp, columns: Vec<Vec<serde_json::Value>>) -> Self {
        Self {
            plot,
            trace,
            operation,
            data: FrameData::Columns(columns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_frame_serializes_to_the_sse_wire_schema() -> Result<(), String> {
        let frame = Frame::point(Plot::Throughput, 1, FrameOp::Extend, 2.0, 3.5);
        let json = serde_json::to_value(&frame).map_err(|err| err.to_string())?;
        let expected = serde_json::json!({
            "plot": "throughput",
            "trace": 1,
            "operation": "extend",
            "data": {"x": 2.0, "y": 3.5},
        });
        if json != expected {
            return Err(format!("unexpected JSON: {json}"));
        }
        Ok(())
    }

    #[test]
    fn table_frame_serializes_data_as_a_bare_column_array() -> Result<(), String> {
        let frame = Frame::table(
            Plot::Error,
            0,
            FrameOp::Replace,
            vec![vec![serde_json::Value::from("500")], vec![serde_json::Value::from(3)]],
        );
        let json = serde_json::to_value(&frame).map_err(|err| err.to_string())?;
        let expected = serde_json::json!({
            "plot": "error",
            "trace": 0,
            "operation": "replace",
            "data": [["500"], [3]],
        });
        if json != expected {
            return Err(format!("unexpected JSON: {json}"));
        }
        Ok(())
    }
}
