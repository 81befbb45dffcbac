//! Space view abstraction - base trait for the dashboard pages

use egui::Ui;
use serde_json::Value;

use crate::ViewerContext;

/// Stable identifier of a page, used as its persistence key
pub type SpaceViewId = &'static str;

/// A dashboard page
pub trait SpaceView: Send + Sync {
    fn id(&self) -> SpaceViewId;

    /// Tab title
    fn title(&self) -> &str;

    /// Get the view type (for serialization)
    fn view_type(&self) -> &str;

    /// Start whatever loads the current filters and settings require.
    /// Called every frame before `ui`; must be cheap when nothing changed.
    fn refresh(&mut self, ctx: &ViewerContext);

    /// Draw the UI
    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui);

    /// Settings worth keeping between sessions
    fn save_config(&self) -> Value {
        Value::Null
    }

    fn load_config(&mut self, _config: Value) {}

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
