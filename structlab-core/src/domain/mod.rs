//! Domain types for StructLab

pub mod candle;
pub mod currency;
pub mod direction;
pub mod ids;
pub mod timeframe;

pub use candle::{closes, Candle};
pub use currency::{
    implied_usd_bias, index_usd_bias, usd_direction, usd_position, SymbolError, UsdBias,
    UsdPosition,
};
pub use direction::Direction;
pub use ids::ConfigId;
pub use timeframe::{ParseTimeframeError, Timeframe};

/// Symbol type alias
pub type Symbol = String;
