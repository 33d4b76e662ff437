//! Fitted preprocessing objects shared by training and scoring

pub mod encoder;
pub mod scaler;

pub use encoder::LabelEncoder;
pub use scaler::StandardScaler;
