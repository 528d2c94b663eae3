//! RS-274X layer serialisation.
//!
//! Coordinates are written exactly as the layer stream holds them: absolute,
//! millimetres, four integer and three decimal digits.

use gerber_types::{Circle, Unit};
use indexmap::IndexMap;

use crate::board::{Feature, FeatureKind, Layer};
use crate::codec::{encode, Instruction};

/// Output unit of every layer file.
pub const LAYER_UNIT: Unit = Unit::Millimeters;

/// Coordinate format matching [`crate::codec::UNITS_PER_MM`].
pub const FORMAT_DIRECTIVE: &str = "%FSLAX43Y43*%";

/// Aperture used to stroke drill ring outlines.
pub const RING_APERTURE_MM: f64 = 0.1;

/// First D-code available for user apertures.
const FIRST_APERTURE_CODE: i32 = 10;

/// Circular apertures keyed by their diameter in codec units, in first-use
/// order.
#[derive(Debug, Default)]
struct ApertureTable {
    codes: IndexMap<i64, (i32, Circle)>,
}

impl ApertureTable {
    fn collect(layer: &Layer) -> Self {
        let mut table = Self::default();
        for feature in layer.features() {
            if let Some(diameter) = stroke_diameter(feature) {
                table.insert(diameter);
            }
        }
        table
    }

    fn insert(&mut self, diameter: f64) {
        let next = FIRST_APERTURE_CODE.saturating_add(
            i32::try_from(self.codes.len()).unwrap_or(i32::MAX - FIRST_APERTURE_CODE),
        );
        self.codes
            .entry(encode(diameter))
            .or_insert_with(|| (next, Circle::new(diameter)));
    }

    fn code_for(&self, diameter: f64) -> Option<i32> {
        self.codes.get(&encode(diameter)).map(|(code, _)| *code)
    }

    fn definitions(&self) -> impl Iterator<Item = String> + '_ {
        self.codes
            .values()
            .map(|(code, circle)| format!("%ADD{code}C,{:.3}*%", circle.diameter))
    }
}

fn stroke_diameter(feature: &Feature) -> Option<f64> {
    match feature.kind {
        FeatureKind::Trace | FeatureKind::TracePath => Some(feature.effective_width()),
        FeatureKind::Ring => Some(RING_APERTURE_MM),
        FeatureKind::Region => None,
    }
}

const fn mode_directive(unit: Unit) -> &'static str {
    match unit {
        Unit::Inches => "%MOIN*%",
        Unit::Millimeters => "%MOMM*%",
    }
}

/// Terminates a coordinate line; raw content is written verbatim.
fn statement(instruction: &Instruction) -> String {
    match instruction {
        Instruction::Raw(text) => text.clone(),
        other => format!("{other}*"),
    }
}

/// Renders one layer as a complete Gerber file.
///
/// Strokes select the circular aperture of their width; regions are wrapped
/// in `G36`/`G37`; raw instructions pass through untouched.
pub fn render_layer(layer: &Layer) -> String {
    let apertures = ApertureTable::collect(layer);
    let instructions = layer.instructions();

    let mut lines: Vec<String> = vec![
        format!("G04 {} *", layer.name()),
        mode_directive(LAYER_UNIT).to_string(),
        FORMAT_DIRECTIVE.to_string(),
        "%LPD*%".to_string(),
        "G01*".to_string(),
        "G04 APERTURE LIST*".to_string(),
    ];
    lines.extend(apertures.definitions());
    lines.push("G04 APERTURE END LIST*".to_string());

    let mut cursor = 0;
    for feature in layer.features() {
        let before = instructions.get(cursor..feature.span.start).unwrap_or(&[]);
        lines.extend(before.iter().map(statement));

        let body = instructions.get(feature.span.clone()).unwrap_or(&[]);
        if let Some(code) = stroke_diameter(feature).and_then(|d| apertures.code_for(d)) {
            lines.push(format!("D{code}*"));
            lines.extend(body.iter().map(statement));
        } else {
            lines.push("G36*".to_string());
            lines.extend(body.iter().map(statement));
            lines.push("G37*".to_string());
        }
        cursor = feature.span.end;
    }
    let rest = instructions.get(cursor..).unwrap_or(&[]);
    lines.extend(rest.iter().map(statement));

    lines.push("M02*".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
