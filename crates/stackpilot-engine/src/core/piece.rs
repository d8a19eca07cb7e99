use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{
    action::{Direction, Rotation},
    bit_board::BitBoard,
};

/// A piece (tetromino) with position, rotation, and type.
///
/// Pieces are immutable values: movement and rotation return new `Piece`s,
/// and the board decides whether the result is legal.
///
/// # Coordinate System
///
/// - Position is the top-left corner of the piece's 4×4 grid, in board
///   columns/rows (row 0 at the top). It can be negative near the walls.
/// - Rotation is tracked as 0 (spawn), 1 (90° clockwise), 2, or 3
///
/// # Example
///
/// ```
/// use stackpilot_engine::{Piece, PieceKind, PiecePosition};
///
/// let piece = Piece::new(PieceKind::T, PiecePosition::new(3, 0));
/// let moved = piece.right();
/// let rotated = moved.rotated_right();
/// assert_eq!(rotated.rotation().as_u8(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '#' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let mut kind_chars = kind_str.chars();
        let (Some(kind_char), None) = (kind_chars.next(), kind_chars.next()) else {
            return Err(serde::de::Error::custom(format!(
                "piece kind must be single character, got '{kind_str}'"
            )));
        };
        let kind = PieceKind::from_char(kind_char)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid piece kind: {kind_char}")))?;

        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '@' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let rotation_num = rotation_str.parse::<u8>().map_err(|e| {
            serde::de::Error::custom(format!("invalid rotation: {rotation_str} ({e})"))
        })?;
        if rotation_num > 3 {
            return Err(serde::de::Error::custom(format!(
                "rotation must be 0-3, got {rotation_num}"
            )));
        }

        let (x_str, y_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing ',' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let x = x_str
            .parse::<i16>()
            .map_err(|e| serde::de::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i16>()
            .map_err(|e| serde::de::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Piece {
            position: PiecePosition::new(x, y),
            rotation: PieceRotation(rotation_num),
            kind,
        })
    }
}

/// Bounding box of a piece's occupied cells, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceBounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl PieceBounds {
    #[must_use]
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }
}

impl Piece {
    #[must_use]
    pub fn new(kind: PieceKind, position: PiecePosition) -> Self {
        Self {
            position,
            rotation: PieceRotation::default(),
            kind,
        }
    }

    /// Creates a piece at the spawn position of a `board_width`-wide board.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        Self::new(kind, PiecePosition::spawn(board_width))
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Board coordinates `(column, row)` of the four cells.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let x0 = i32::from(self.position.x);
        let y0 = i32::from(self.position.y);
        self.kind
            .cells(self.rotation)
            .iter()
            .map(move |&(dx, dy)| (x0 + i32::from(dx), y0 + i32::from(dy)))
    }

    #[must_use]
    pub fn bounds(&self) -> PieceBounds {
        let mut bounds = PieceBounds {
            left: i32::MAX,
            right: i32::MIN,
            top: i32::MAX,
            bottom: i32::MIN,
        };
        for (x, y) in self.occupied_positions() {
            bounds.left = bounds.left.min(x);
            bounds.right = bounds.right.max(x);
            bounds.top = bounds.top.min(y);
            bounds.bottom = bounds.bottom.max(y);
        }
        bounds
    }

    #[must_use]
    pub fn shifted(&self, dx: i16, dy: i16) -> Self {
        Self {
            position: PiecePosition::new(self.position.x + dx, self.position.y + dy),
            ..*self
        }
    }

    #[must_use]
    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.shifted(dx, dy)
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.shifted(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.shifted(1, 0)
    }

    #[must_use]
    pub fn up(&self) -> Self {
        self.shifted(0, -1)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    #[must_use]
    pub fn rotated_right(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..*self
        }
    }

    #[must_use]
    pub fn rotated_left(&self) -> Self {
        Self {
            rotation: self.rotation.rotated_left(),
            ..*self
        }
    }

    /// Rotates with the simplified wall kick; `None` when every kick collides.
    #[must_use]
    pub fn super_rotated(&self, rotation: Rotation, board: &BitBoard) -> Option<Self> {
        let piece = match rotation {
            Rotation::Clockwise => self.rotated_right(),
            Rotation::Anticlockwise => self.rotated_left(),
        };
        if !board.is_colliding(&piece) {
            return Some(piece);
        }
        super_rotation(board, piece)
    }

    /// Distinct orientations reachable from this piece by clockwise rotation,
    /// starting with the piece itself.
    #[must_use]
    pub fn super_rotations(&self, board: &BitBoard) -> ArrayVec<Self, 4> {
        let mut rotations = ArrayVec::new();
        rotations.push(*self);
        let mut prev = *self;
        for _ in 1..self.kind.distinct_rotations() {
            let Some(piece) = prev.super_rotated(Rotation::Clockwise, board) else {
                break;
            };
            rotations.push(piece);
            prev = piece;
        }
        rotations
    }

    #[must_use]
    pub fn simulate_drop_position(&self, board: &BitBoard) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if board.is_colliding(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}

/// Attempts simplified wall kick after a failed rotation.
///
/// This is **not** a full Super Rotation System (SRS) implementation. Instead, it tries
/// 4 simple offsets in order: up, right, down, left. The first valid position is returned.
fn super_rotation(board: &BitBoard, piece: Piece) -> Option<Piece> {
    [piece.up(), piece.right(), piece.down(), piece.left()]
        .into_iter()
        .find(|piece| !board.is_colliding(piece))
}

/// Position of a piece's 4×4 grid on the board.
///
/// - X increases rightward (columns)
/// - Y increases downward (rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i16,
    y: i16,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Spawn position: horizontally centered grid touching the top row.
    #[must_use]
    pub fn spawn(board_width: usize) -> Self {
        let width = i16::try_from(board_width).unwrap_or(i16::MAX);
        Self::new((width - 4) / 2, 0)
    }

    #[must_use]
    pub fn x(self) -> i16 {
        self.x
    }

    #[must_use]
    pub fn y(self) -> i16 {
        self.y
    }
}

/// Rotation state of a piece.
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° anticlockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_left(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Number of rotation states that produce distinct shapes.
    ///
    /// The O-piece looks the same in every state, and I/S/Z repeat after 180°.
    #[must_use]
    pub const fn distinct_rotations(self) -> u8 {
        match self {
            PieceKind::O => 1,
            PieceKind::I | PieceKind::S | PieceKind::Z => 2,
            PieceKind::J | PieceKind::L | PieceKind::T => 4,
        }
    }

    fn cells(self, rotation: PieceRotation) -> &'static PieceCells {
        &PIECE_CELLS[self as usize][rotation.as_usize()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use stackpilot_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Cell offsets `(dx, dy)` of a piece within its 4×4 grid.
type PieceCells = [(u8, u8); 4];

/// Generates all 4 rotation states by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `offset` - Column offset added after rotation (centers the O-piece)
/// * `cells` - Cells at 0° rotation
const fn cell_rotations(size: u8, offset: u8, cells: PieceCells) -> [PieceCells; 4] {
    let mut rotations = [cells; 4];
    let mut i = 1;
    while i < 4 {
        let mut j = 0;
        while j < 4 {
            let (x, y) = rotations[i - 1][j];
            rotations[i][j] = (size - 1 - y, x);
            j += 1;
        }
        i += 1;
    }
    let mut i = 0;
    while i < 4 {
        let mut j = 0;
        while j < 4 {
            rotations[i][j].0 += offset;
            j += 1;
        }
        i += 1;
    }
    rotations
}

const PIECE_CELLS: [[PieceCells; 4]; PieceKind::LEN] = [
    // I-piece: ....
    //          IIII
    cell_rotations(4, 0, [(0, 1), (1, 1), (2, 1), (3, 1)]),
    // O-piece: .OO.
    //          .OO.
    cell_rotations(2, 1, [(0, 0), (1, 0), (0, 1), (1, 1)]),
    // S-piece: .SS
    //          SS.
    cell_rotations(3, 0, [(1, 0), (2, 0), (0, 1), (1, 1)]),
    // Z-piece: ZZ.
    //          .ZZ
    cell_rotations(3, 0, [(0, 0), (1, 0), (1, 1), (2, 1)]),
    // J-piece: J..
    //          JJJ
    cell_rotations(3, 0, [(0, 0), (0, 1), (1, 1), (2, 1)]),
    // L-piece: ..L
    //          LLL
    cell_rotations(3, 0, [(2, 0), (0, 1), (1, 1), (2, 1)]),
    // T-piece: .T.
    //          TTT
    cell_rotations(3, 0, [(1, 0), (0, 1), (1, 1), (2, 1)]),
];

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn cell_set(piece: &Piece) -> BTreeSet<(i32, i32)> {
        piece.occupied_positions().collect()
    }

    #[test]
    fn test_spawn_positions_on_default_board() {
        let o = Piece::spawn(PieceKind::O, 10);
        assert_eq!(
            o.bounds(),
            PieceBounds {
                left: 4,
                right: 5,
                top: 0,
                bottom: 1
            }
        );
        let i = Piece::spawn(PieceKind::I, 10);
        assert_eq!(i.bounds().left, 3);
        assert_eq!(i.bounds().width(), 4);
        assert_eq!(i.bounds().height(), 1);
        let t = Piece::spawn(PieceKind::T, 10);
        assert_eq!((t.bounds().left, t.bounds().right), (3, 5));
    }

    #[test]
    fn test_o_piece_rotation_is_stationary() {
        let o = Piece::spawn(PieceKind::O, 10);
        assert_eq!(cell_set(&o), cell_set(&o.rotated_right()));
        assert_eq!(cell_set(&o), cell_set(&o.rotated_left()));
    }

    #[test]
    fn test_rotation_symmetry_matches_distinct_rotations() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind, PiecePosition::new(3, 3));
            let mut rotated = piece;
            for _ in 0..kind.distinct_rotations() {
                rotated = rotated.rotated_right();
            }
            // After `distinct_rotations` quarter turns the shape repeats (up to translation).
            let normalize = |p: &Piece| {
                let b = p.bounds();
                p.occupied_positions()
                    .map(|(x, y)| (x - b.left, y - b.top))
                    .collect::<BTreeSet<_>>()
            };
            assert_eq!(normalize(&piece), normalize(&rotated), "{kind:?}");
        }
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind, 10);
            let rotated = piece
                .rotated_left()
                .rotated_left()
                .rotated_left()
                .rotated_left();
            assert_eq!(piece, rotated);
            assert_eq!(
                cell_set(&piece.rotated_left().rotated_left().rotated_left()),
                cell_set(&piece.rotated_right())
            );
        }
    }

    #[test]
    fn test_super_rotation_kicks_off_the_wall() {
        let board = BitBoard::default();
        // Vertical I in column 1: the plain rotation would poke through the wall
        let piece = Piece::spawn(PieceKind::I, 10).rotated_right();
        let piece = piece.shifted(1 - i16::try_from(piece.bounds().left).unwrap(), 0);
        assert_eq!(piece.bounds().left, 1);
        assert!(!board.is_colliding(&piece));
        assert!(board.is_colliding(&piece.rotated_right()));
        let rotated = piece.super_rotated(Rotation::Clockwise, &board).unwrap();
        assert!(!board.is_colliding(&rotated));
        assert_eq!(rotated.bounds().height(), 1);
        assert_eq!(rotated.bounds().left, 0);
    }

    #[test]
    fn test_super_rotations_count() {
        let board = BitBoard::default();
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind, 10);
            assert_eq!(
                piece.super_rotations(&board).len(),
                usize::from(kind.distinct_rotations())
            );
        }
    }

    #[test]
    fn test_simulate_drop_position() {
        let board = BitBoard::from_ascii(
            24,
            r"
            ....#.....
            ",
        );
        let o = Piece::spawn(PieceKind::O, 10).simulate_drop_position(&board);
        assert_eq!(o.bounds().bottom, 22);
        let o = o.shifted(2, 0).simulate_drop_position(&board);
        assert_eq!(o.bounds().bottom, 23);
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece {
            position: PiecePosition::new(-1, 18),
            rotation: PieceRotation(1),
            kind: PieceKind::S,
        };

        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"S#1@-1,18\"");

        let deserialized: Piece = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, piece);
    }

    #[test]
    fn test_piece_deserialization_error_cases() {
        assert!(serde_json::from_str::<Piece>("\"S1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1#4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@4\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"X#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"SS#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#4@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@abc,18\"").is_err());
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
