use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Read;

use thiserror::Error;

use crate::basic_types::Literal;
use crate::basic_types::PropositionalVariable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Point {
        Point { x, y }
    }

    pub fn manhattan_distance(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pairs are numbered from 1 in messages, as in the rendered grids.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("failed to read the routing instance")]
    Io(#[from] std::io::Error),
    #[error("expected {expected}, but the input ended")]
    MissingValue { expected: &'static str },
    #[error("'{value}' is not a non-negative integer")]
    InvalidNumber { value: String },
    #[error("unexpected '{value}' after the last pair")]
    TrailingInput { value: String },
    #[error("the grid has no cells")]
    EmptyGrid,
    #[error("point {point} of pair {pair} is outside of the grid")]
    PointOutOfBounds { pair: usize, point: Point },
    #[error("the endpoints of pair {pair} coincide")]
    CoincidingEndpoints { pair: usize },
    #[error("point {point} is an endpoint of both pair {pair} and pair {other}")]
    SharedEndpoint {
        pair: usize,
        other: usize,
        point: Point,
    },
    #[error("an endpoint of pair {pair} is not on its path")]
    MissingEndpoint { pair: usize },
    #[error("the endpoints of pair {pair} are not connected")]
    DisconnectedPath { pair: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingInstance {
    width: u32,
    height: u32,
    pairs: Vec<(Point, Point)>,
}

impl RoutingInstance {
    pub fn new(
        width: u32,
        height: u32,
        pairs: Vec<(Point, Point)>,
    ) -> Result<RoutingInstance, RoutingError> {
        if width == 0 || height == 0 {
            return Err(RoutingError::EmptyGrid);
        }

        for (index, &(first, second)) in pairs.iter().enumerate() {
            let pair = index + 1;
            for point in [first, second] {
                if point.x >= width || point.y >= height {
                    return Err(RoutingError::PointOutOfBounds { pair, point });
                }
            }
            if first == second {
                return Err(RoutingError::CoincidingEndpoints { pair });
            }

            for (other_index, &(other_first, other_second)) in pairs.iter().enumerate().skip(pair) {
                if let Some(&point) = [first, second]
                    .iter()
                    .find(|point| **point == other_first || **point == other_second)
                {
                    return Err(RoutingError::SharedEndpoint {
                        pair,
                        other: other_index + 1,
                        point,
                    });
                }
            }
        }

        Ok(RoutingInstance {
            width,
            height,
            pairs,
        })
    }

    /// Reads `n m`, `p` and `p` lines `x1 y1 x2 y2`. Only the order of the numbers matters, not
    /// how they are spread over lines.
    pub fn parse(mut source: impl Read) -> Result<RoutingInstance, RoutingError> {
        let mut contents = String::new();
        let _ = source.read_to_string(&mut contents)?;
        let mut numbers = contents.split_ascii_whitespace();

        let mut next_number = |expected: &'static str| -> Result<u32, RoutingError> {
            let value = numbers
                .next()
                .ok_or(RoutingError::MissingValue { expected })?;
            value.parse().map_err(|_| RoutingError::InvalidNumber {
                value: value.to_owned(),
            })
        };

        let width = next_number("the width of the grid")?;
        let height = next_number("the height of the grid")?;
        let num_pairs = next_number("the number of pairs")?;

        let mut pairs = vec![];
        for _ in 0..num_pairs {
            let first = Point::new(next_number("a coordinate")?, next_number("a coordinate")?);
            let second = Point::new(next_number("a coordinate")?, next_number("a coordinate")?);
            pairs.push((first, second));
        }

        if let Some(value) = numbers.next() {
            return Err(RoutingError::TrailingInput {
                value: value.to_owned(),
            });
        }

        RoutingInstance::new(width, height, pairs)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pairs(&self) -> &[(Point, Point)] {
        &self.pairs
    }

    pub fn num_cells(&self) -> u32 {
        self.width * self.height
    }

    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Point::new(x, y)))
    }

    /// The literal which is true when `cell` is on the path of pair `pair` (counting from 0);
    /// its variable is `x + n·y + n·m·pair + 1`, which is also its name in the OPB model.
    pub fn cell_literal(&self, cell: Point, pair: usize) -> Literal {
        let index = cell.x + self.width * cell.y + self.num_cells() * pair as u32 + 1;
        Literal::new(PropositionalVariable::new(index), true)
    }

    pub fn num_variables(&self) -> u32 {
        self.num_cells() * self.pairs.len() as u32
    }

    pub fn is_endpoint(&self, cell: Point) -> bool {
        self.pairs
            .iter()
            .any(|&(first, second)| cell == first || cell == second)
    }

    /// The cells left, above, right and below `cell`, as far as they are in the grid.
    pub fn neighbours(&self, cell: Point) -> impl Iterator<Item = Point> {
        let left = (cell.x > 0).then(|| Point::new(cell.x - 1, cell.y));
        let up = (cell.y > 0).then(|| Point::new(cell.x, cell.y - 1));
        let right = (cell.x + 1 < self.width).then(|| Point::new(cell.x + 1, cell.y));
        let down = (cell.y + 1 < self.height).then(|| Point::new(cell.x, cell.y + 1));

        [left, up, right, down].into_iter().flatten()
    }

    /// Every path uses at least the cells of a shortest path between its endpoints.
    pub fn min_num_cells(&self) -> u64 {
        self.pairs
            .iter()
            .map(|&(first, second)| u64::from(first.manhattan_distance(second)) + 1)
            .sum()
    }
}

/// The grid with the endpoints of every pair marked with its number.
impl Display for RoutingInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        super::write_grid(f, self.width, self.height, |cell| {
            self.pairs
                .iter()
                .position(|&(first, second)| cell == first || cell == second)
                .map_or(0, |index| index + 1)
        })
    }
}
