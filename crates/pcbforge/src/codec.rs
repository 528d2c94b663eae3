//! Fixed-point coordinate codec.
//!
//! Board coordinates are real millimetres. Layer streams store them as
//! integer micrometres (three decimal digits), truncated toward zero, and
//! print them as seven-digit zero-padded signed fields:
//!
//! ```text
//! (1.5, -2.25) as a first point  ->  X0001500Y-0002250D02
//! ```
//!
//! The first point of every contour is a move (`D02`, pen up); every
//! following point is a draw (`D01`, pen down).

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CodecError;
use crate::geometry::Point;

/// Fixed-point units per millimetre.
pub const UNITS_PER_MM: f64 = 1000.0;

/// Minimum number of digits printed for each coordinate magnitude.
pub const COORDINATE_DIGITS: usize = 7;

/// Operation code for a pen-up move.
pub const MOVE_CODE: &str = "D02";

/// Operation code for a pen-down draw.
pub const DRAW_CODE: &str = "D01";

/// Converts millimetres to fixed-point units, truncating toward zero.
///
/// Out-of-range and NaN inputs saturate the way `as` casts do.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(mm: f64) -> i64 {
    (mm * UNITS_PER_MM).trunc() as i64
}

/// Converts fixed-point units back to millimetres.
#[allow(clippy::cast_precision_loss)]
pub fn decode(units: i64) -> f64 {
    units as f64 / UNITS_PER_MM
}

/// A board position in fixed-point units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct FixedPoint {
    /// X in micrometres.
    pub x: i64,
    /// Y in micrometres.
    pub y: i64,
}

impl FixedPoint {
    /// Encodes a board-space point.
    pub fn from_point(point: Point) -> Self {
        Self {
            x: encode(point.x),
            y: encode(point.y),
        }
    }

    /// Decodes back into millimetres.
    pub fn to_point(self) -> Point {
        Point::new(decode(self.x), decode(self.y))
    }
}

impl From<Point> for FixedPoint {
    fn from(point: Point) -> Self {
        Self::from_point(point)
    }
}

/// One entry of a layer's drawing stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Pen-up positioning (`D02`).
    Move(FixedPoint),
    /// Pen-down straight segment from the previous position (`D01`).
    Draw(FixedPoint),
    /// Literal content passed through unchanged.
    Raw(String),
}

impl Instruction {
    /// Move to a board-space point.
    pub fn move_to(point: Point) -> Self {
        Self::Move(FixedPoint::from_point(point))
    }

    /// Draw to a board-space point.
    pub fn draw_to(point: Point) -> Self {
        Self::Draw(FixedPoint::from_point(point))
    }

    /// Target position for move/draw instructions.
    pub const fn position(&self) -> Option<FixedPoint> {
        match self {
            Self::Move(p) | Self::Draw(p) => Some(*p),
            Self::Raw(_) => None,
        }
    }

    /// Operation code for move/draw instructions.
    pub const fn operation_code(&self) -> Option<&'static str> {
        match self {
            Self::Move(_) => Some(MOVE_CODE),
            Self::Draw(_) => Some(DRAW_CODE),
            Self::Raw(_) => None,
        }
    }

    /// `true` for pen-up moves.
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }

    /// `true` for pen-down draws.
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::Draw(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(p) => write_coordinate_op(f, *p, MOVE_CODE),
            Self::Draw(p) => write_coordinate_op(f, *p, DRAW_CODE),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Instruction {
    type Err = CodecError;

    /// Parses `X<int>Y<int>D01` / `D02`, with an optional trailing `*`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let line = line.strip_suffix('*').unwrap_or(line);

        let Some(after_x) = line.strip_prefix('X') else {
            return Err(CodecError::Malformed(s.to_string()));
        };
        let Some((x_raw, rest)) = after_x.split_once('Y') else {
            return Err(CodecError::Malformed(s.to_string()));
        };
        let Some((y_raw, op)) = rest.rsplit_once('D') else {
            return Err(CodecError::Malformed(s.to_string()));
        };

        let point = FixedPoint {
            x: parse_coordinate(x_raw, 'X')?,
            y: parse_coordinate(y_raw, 'Y')?,
        };

        match op {
            "01" => Ok(Self::Draw(point)),
            "02" => Ok(Self::Move(point)),
            other => Err(CodecError::UnsupportedOperation(format!("D{other}"))),
        }
    }
}

/// Lowers a contour into one move followed by a draw per remaining point.
pub fn lower_contour<I>(points: I) -> Vec<Instruction>
where
    I: IntoIterator<Item = Point>,
{
    points
        .into_iter()
        .enumerate()
        .map(|(idx, point)| {
            if idx == 0 {
                Instruction::move_to(point)
            } else {
                Instruction::draw_to(point)
            }
        })
        .collect()
}

/// Formats one coordinate field: sign, then at least seven digits.
pub fn format_coordinate(units: i64) -> String {
    let width = COORDINATE_DIGITS;
    if units < 0 {
        format!("-{:0width$}", units.unsigned_abs())
    } else {
        format!("{units:0width$}")
    }
}

fn write_coordinate_op(f: &mut fmt::Formatter<'_>, p: FixedPoint, code: &str) -> fmt::Result {
    write!(
        f,
        "X{}Y{}{code}",
        format_coordinate(p.x),
        format_coordinate(p.y)
    )
}

fn parse_coordinate(raw: &str, axis: char) -> Result<i64, CodecError> {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CodecError::InvalidCoordinate {
            axis,
            raw: raw.to_string(),
        });
    }
    raw.parse::<i64>().map_err(|_| CodecError::InvalidCoordinate {
        axis,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_truncates_to_micrometres() {
        assert_eq!(encode(1.5), 1500);
        assert_eq!(encode(-2.25), -2250);
        assert_eq!(encode(0.0), 0);
        assert_eq!(encode(12.3456), 12345);
    }

    #[test]
    fn negative_values_truncate_toward_zero() {
        assert_eq!(encode(-0.0009), 0);
        assert_eq!(encode(-1.2345), -1234);
    }

    #[test]
    fn decode_recovers_three_decimals() {
        for value in [0.0, 0.5, 1.5, -2.25, 12.125, 99.999, -45.001, 250.0] {
            let back = decode(encode(value));
            assert!(
                (back - value).abs() <= 1e-3 + 1e-9,
                "{value} decoded as {back}"
            );
        }
    }

    #[test]
    fn first_point_formats_as_move() {
        let insn = Instruction::move_to(Point::new(1.5, -2.25));
        assert_eq!(insn.to_string(), "X0001500Y-0002250D02");
    }

    #[test]
    fn draw_formats_with_d01() {
        let insn = Instruction::draw_to(Point::new(0.0, 10.0));
        assert_eq!(insn.to_string(), "X0000000Y0010000D01");
    }

    #[test]
    fn wide_values_keep_all_digits() {
        assert_eq!(format_coordinate(12_345_678), "12345678");
        assert_eq!(format_coordinate(-5), "-0000005");
    }

    #[test]
    fn raw_passes_through() {
        let insn = Instruction::Raw("G04 logo *".to_string());
        assert_eq!(insn.to_string(), "G04 logo *");
        assert_eq!(insn.position(), None);
        assert_eq!(insn.operation_code(), None);
    }

    #[test]
    fn lower_contour_moves_then_draws() {
        let stream = lower_contour([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        assert_eq!(stream.len(), 3);
        assert!(stream.first().is_some_and(Instruction::is_move));
        assert!(stream.iter().skip(1).all(Instruction::is_draw));
    }

    #[test]
    fn lower_contour_of_nothing_is_empty() {
        assert!(lower_contour(Vec::new()).is_empty());
    }

    #[test]
    fn parse_reads_back_formatted_instruction() {
        let parsed = "X0001500Y-0002250D02*".parse::<Instruction>();
        assert_eq!(
            parsed,
            Ok(Instruction::Move(FixedPoint { x: 1500, y: -2250 }))
        );
        let parsed = "X0000010Y0000020D01".parse::<Instruction>();
        assert_eq!(parsed, Ok(Instruction::Draw(FixedPoint { x: 10, y: 20 })));
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(matches!(
            "G04 comment*".parse::<Instruction>(),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            "X12a4Y0D01".parse::<Instruction>(),
            Err(CodecError::InvalidCoordinate { axis: 'X', .. })
        ));
        assert!(matches!(
            "X1Y2D03".parse::<Instruction>(),
            Err(CodecError::UnsupportedOperation(op)) if op == "D03"
        ));
    }

    #[test]
    fn fixed_point_round_trips_points() {
        let fp = FixedPoint::from(Point::new(3.25, -0.5));
        assert_eq!(fp, FixedPoint { x: 3250, y: -500 });
        assert!(fp.to_point().approx_eq(Point::new(3.25, -0.5), 1e-12));
    }
}
