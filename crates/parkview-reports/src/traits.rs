//! Builder trait shared by the report series builders.

use parkview_common::Result;

/// Pure transformation from store rows into a presentation series.
///
/// Builders never touch the store and either return the whole series or an
/// error; there is no partial output.
pub trait SeriesBuilder {
    /// Row type consumed by the builder.
    type Input;

    /// Series produced from the rows.
    type Output;

    /// Builds the series from rows in the order given.
    fn build(&self, rows: &[Self::Input]) -> Result<Self::Output>;

    /// Gets the name of this series type.
    fn name(&self) -> &'static str;
}
