//! Excellon drill file synthesis.

use crate::board::Board;
use crate::codec::encode;

/// A drill hit collected from a via or a hole, in board millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillHole {
    /// Board X of the drill centre.
    pub x: f64,
    /// Board Y of the drill centre.
    pub y: f64,
    /// Finished drill diameter.
    pub diameter: f64,
}

/// A tool assigned by [`tool_table`], written as `T<number>C<diameter>` in
/// the `M48` header and selected before its hits in the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolDefinition {
    /// Number emitted after `T`; assigned from 1 in first-use order.
    pub number: u32,
    /// Diameter in millimetres, emitted with three decimals.
    pub diameter: f64,
}

/// Every drill on the board: via drills first, then holes.
pub fn drill_holes(board: &Board) -> Vec<DrillHole> {
    board
        .vias()
        .iter()
        .map(|via| DrillHole {
            x: via.position.x,
            y: via.position.y,
            diameter: via.hole,
        })
        .chain(board.holes().iter().map(|hole| DrillHole {
            x: hole.position.x,
            y: hole.position.y,
            diameter: hole.diameter,
        }))
        .collect()
}

/// One tool per distinct diameter, numbered from 1 in first-use order.
///
/// Diameters equal to the micrometre share a tool.
pub fn tool_table(holes: &[DrillHole]) -> Vec<ToolDefinition> {
    let mut tools: Vec<ToolDefinition> = Vec::new();
    for hole in holes {
        if tools
            .iter()
            .any(|tool| encode(tool.diameter) == encode(hole.diameter))
        {
            continue;
        }
        let number = u32::try_from(tools.len()).map_or(u32::MAX, |n| n.saturating_add(1));
        tools.push(ToolDefinition {
            number,
            diameter: hole.diameter,
        });
    }
    tools
}

/// Renders a metric Excellon file with decimal coordinates.
pub fn render_drill(holes: &[DrillHole]) -> String {
    let tools = tool_table(holes);

    let mut lines = vec!["M48".to_string(), "METRIC".to_string()];
    lines.extend(
        tools
            .iter()
            .map(|tool| format!("T{}C{:.3}", tool.number, tool.diameter)),
    );
    lines.push("%".to_string());
    lines.push("G90".to_string());
    lines.push("G05".to_string());

    for tool in &tools {
        lines.push(format!("T{}", tool.number));
        lines.extend(
            holes
                .iter()
                .filter(|hole| encode(hole.diameter) == encode(tool.diameter))
                .map(|hole| format!("X{:.3}Y{:.3}", hole.x, hole.y)),
        );
    }
    lines.push("M30".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn vias_come_before_holes() {
        let mut board = Board::new("drill", 10.0, 10.0);
        board.hole(Point::new(5.0, 5.0), 3.2, None);
        board.add_via(Point::new(1.0, 1.0), "GTL", "GBL", 0.6, 0.3);
        let holes = drill_holes(&board);
        assert_eq!(holes.len(), 2);
        assert_eq!(holes.first().map(|h| h.diameter), Some(0.3));
    }

    #[test]
    fn equal_diameters_share_a_tool() {
        let holes = [
            DrillHole { x: 0.0, y: 0.0, diameter: 0.3 },
            DrillHole { x: 1.0, y: 0.0, diameter: 1.0 },
            DrillHole { x: 2.0, y: 0.0, diameter: 0.3 },
        ];
        let tools = tool_table(&holes);
        assert_eq!(
            tools,
            vec![
                ToolDefinition { number: 1, diameter: 0.3 },
                ToolDefinition { number: 2, diameter: 1.0 },
            ]
        );
    }

    #[test]
    fn drill_file_groups_hits_by_tool() {
        let holes = [
            DrillHole { x: 0.0, y: 0.0, diameter: 0.3 },
            DrillHole { x: 1.0, y: -2.5, diameter: 1.0 },
            DrillHole { x: 2.0, y: 0.0, diameter: 0.3 },
        ];
        let text = render_drill(&holes);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "M48",
                "METRIC",
                "T1C0.300",
                "T2C1.000",
                "%",
                "G90",
                "G05",
                "T1",
                "X0.000Y0.000",
                "X2.000Y0.000",
                "T2",
                "X1.000Y-2.500",
                "M30",
            ]
        );
    }
}
