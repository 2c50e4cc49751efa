use crate::layout::{Diagnostic, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f64,
    pub height: f64,
    pub circles: Vec<CircleDump>,
    pub segments: Vec<SegmentDump>,
    pub labels: Vec<LabelDump>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct CircleDump {
    pub id: String,
    pub center: [f64; 2],
    pub radius: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDump {
    pub id: String,
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub requested_start: [f64; 2],
    pub requested_end: [f64; 2],
    pub target: Option<String>,
    pub arrow: bool,
    pub nudges: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub owner_id: String,
    pub text: String,
    pub anchor: [f64; 2],
    pub position: [f64; 2],
    pub bounds: [f64; 4],
    pub collision_score: f64,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let circles = layout
            .circles
            .values()
            .map(|circle| CircleDump {
                id: circle.id.clone(),
                center: [circle.center.x, circle.center.y],
                radius: circle.radius,
            })
            .collect();

        let segments = layout
            .segments
            .iter()
            .map(|seg| SegmentDump {
                id: seg.segment.id.clone(),
                start: [seg.segment.start.x, seg.segment.start.y],
                end: [seg.segment.end.x, seg.segment.end.y],
                requested_start: [seg.requested.start.x, seg.requested.start.y],
                requested_end: [seg.requested.end.x, seg.requested.end.y],
                target: seg.target.clone(),
                arrow: seg.arrow,
                nudges: seg.nudges,
            })
            .collect();

        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                owner_id: label.label.owner_id.clone(),
                text: label.label.text.clone(),
                anchor: [label.label.anchor.x, label.label.anchor.y],
                position: [label.position.x, label.position.y],
                bounds: [
                    label.bounds.x,
                    label.bounds.y,
                    label.bounds.width,
                    label.bounds.height,
                ],
                collision_score: label.collision_score,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            circles,
            segments,
            labels,
            diagnostics: layout.diagnostics.clone(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
