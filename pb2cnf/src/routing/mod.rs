//! Routing of pairs of points through a grid, as a pseudo-Boolean optimisation problem.
//!
//! An instance is an `n × m` grid of cells and a list of pairs of endpoints. Every pair has to be
//! connected by a path of horizontally or vertically adjacent cells, and no cell may be used by
//! more than one path. The number of used cells is minimised.
//!
//! The input format is
//! ```text
//! n m
//! p
//! x1 y1 x1' y1'
//! ...
//! xp yp xp' yp'
//! ```
//! with `0 <= x < n` and `0 <= y < m`.

mod instance;
mod model;
mod solution;

pub use instance::Point;
pub use instance::RoutingError;
pub use instance::RoutingInstance;
pub use model::RoutingModel;
pub use solution::RoutingSolution;

use std::fmt::Formatter;

/// Writes a grid with one row per `y`, right-aligning the value of every cell.
fn write_grid(
    f: &mut Formatter<'_>,
    width: u32,
    height: u32,
    cell: impl Fn(Point) -> usize,
) -> std::fmt::Result {
    let column_width = (0..height)
        .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
        .map(|point| cell(point).to_string().len())
        .max()
        .unwrap_or(1);

    for y in 0..height {
        let row = (0..width)
            .map(|x| format!("{:>column_width$}", cell(Point::new(x, y))))
            .collect::<Vec<_>>();
        writeln!(f, "{}", row.join(" "))?;
    }

    Ok(())
}
