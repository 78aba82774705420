use thiserror::Error;

/// Errors raised while building a `TileGrid`.
#[derive(Debug, Error, PartialEq)]
pub enum TileMapError {
    #[error("tile grid must have non-zero dimensions, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("tile size must be positive, got {0}")]
    TileSize(f32),

    #[error("expected {expected} cells for the grid, got {actual}")]
    CellCount { expected: usize, actual: usize },

    #[error("row {row} has {len} columns, expected {expected}")]
    RaggedRow { row: usize, len: usize, expected: usize },

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// Errors raised by `CollisionConfig::validate`.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample spacing must be positive, got {0}")]
    SampleSpacing(f32),

    #[error("edge inset must be non-negative, got {0}")]
    EdgeInset(f32),

    #[error("overlap tolerance must be non-negative, got {0}")]
    OverlapTolerance(f32),

    #[error("{0} must be at least 1")]
    ZeroStepBound(&'static str),
}
