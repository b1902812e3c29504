use strum_macros::{Display, EnumIter, EnumString};

/// Layout hint for whoever ends up drawing the photo. Nothing in this
/// workspace renders, the value is carried along as metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ContentMode {
    ScaleToFill,
    AspectFit,
    #[default]
    AspectFill,
    Redraw,
    Center,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}
