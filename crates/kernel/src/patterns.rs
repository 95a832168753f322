//! Well-known starting patterns, as cell offsets from an anchor.
//!
//! Offsets use grid orientation: `x` grows to the right, `z` grows upward.

/// A named set of live cells relative to an anchor coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const BLOCK: Pattern = Pattern {
    name: "block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

/// Horizontal phase.
pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    cells: &[(0, 0), (1, 0), (2, 0)],
};

pub const TOAD: Pattern = Pattern {
    name: "toad",
    cells: &[(1, 0), (2, 0), (3, 0), (0, -1), (1, -1), (2, -1)],
};

pub const BEACON: Pattern = Pattern {
    name: "beacon",
    cells: &[
        (0, 0),
        (1, 0),
        (0, -1),
        (1, -1),
        (2, -2),
        (3, -2),
        (2, -3),
        (3, -3),
    ],
};

/// Travels one cell toward `+x, -z` every four generations.
pub const GLIDER: Pattern = Pattern {
    name: "glider",
    cells: &[(1, 0), (2, -1), (0, -2), (1, -2), (2, -2)],
};

pub const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    cells: &[(1, 0), (2, 0), (0, -1), (1, -1), (1, -2)],
};

/// Lightweight spaceship, travels along `x` two cells every four generations.
pub const LWSS: Pattern = Pattern {
    name: "lwss",
    cells: &[
        (1, 0),
        (4, 0),
        (0, -1),
        (0, -2),
        (4, -2),
        (0, -3),
        (1, -3),
        (2, -3),
        (3, -3),
    ],
};

#[rustfmt::skip]
pub const GOSPER_GLIDER_GUN: Pattern = Pattern {
    name: "gosper-glider-gun",
    cells: &[
        (0, -4), (0, -5), (1, -4), (1, -5),
        (10, -4), (10, -5), (10, -6), (11, -3), (11, -7), (12, -2), (12, -8),
        (13, -2), (13, -8), (14, -5), (15, -3), (15, -7), (16, -4), (16, -5),
        (16, -6), (17, -5), (20, -2), (20, -3), (20, -4), (21, -2), (21, -3),
        (21, -4), (22, -1), (22, -5), (24, 0), (24, -1), (24, -5), (24, -6),
        (34, -2), (34, -3), (35, -2), (35, -3),
    ],
};

pub const PATTERNS: &[Pattern] = &[
    BLOCK,
    BLINKER,
    TOAD,
    BEACON,
    GLIDER,
    R_PENTOMINO,
    LWSS,
    GOSPER_GLIDER_GUN,
];

/// Look up a pattern by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
