//! Request validation for the Session Table.
//!
//! - Dimensions: positive, within the configured maximum, and large enough
//!   to hold two open interior cells.

use mazebox_engine::generator::validate_size;

use crate::TableConfig;
use crate::error::MazeError;

/// Validate requested maze dimensions against the table configuration.
pub fn validate_dimensions(
    width: i32,
    height: i32,
    config: &TableConfig,
) -> Result<(), MazeError> {
    if width > config.max_width || height > config.max_height {
        return Err(MazeError::InvalidSize { width, height });
    }
    validate_size(width, height)?;
    Ok(())
}
