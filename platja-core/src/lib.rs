pub mod analysis;
pub mod config;
pub mod controller;
pub mod map;
pub mod payload;
pub mod render;
pub mod state;

#[cfg(test)]
mod testing;

pub use analysis::{AnalysisClient, AnalysisError, AnalysisResult, Notifier};
pub use config::{FormSelectors, Messages, UploaderConfig};
pub use controller::{FormView, SelectedFile, UploadController};
pub use render::{DrawSurface, Intrinsic, LoadImage, RenderError};
pub use state::{Presentation, UiState};
