use foundation::CountryId;
use serde::{Deserialize, Serialize};

/// Polygon lift for the selected country, in globe radii.
pub const SELECTED_ALTITUDE: f64 = 0.06;
pub const RESTING_ALTITUDE: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Hover highlights, clicks select and open the info panel.
    #[default]
    Explore,
    /// Hover highlights only; clicks are reported but never select (game view).
    HoverHighlightOnly,
}

/// Input routed from the globe renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// Pointer over a country, or over empty space.
    Hover { country: Option<CountryId> },
    /// Click on a country, or on the background.
    Click { country: Option<CountryId> },
    Escape,
    ClosePanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    None,
    Hovered,
    Selected,
}

/// What an event changed.
///
/// `clicked` is reported in every mode; a hover-highlight-only view bound to a
/// game hands it to that game as the player's answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionUpdate {
    pub hover_changed: bool,
    pub selection_changed: bool,
    pub clicked: Option<CountryId>,
}

/// Single owner of hover and selection for one globe view.
///
/// The renderer reads it through [`InteractionState::highlight`] and
/// [`InteractionState::altitude`]; all mutation goes through `apply`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    mode: InteractionMode,
    hovered: Option<CountryId>,
    selected: Option<CountryId>,
}

impl InteractionState {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, event: InteractionEvent) -> InteractionUpdate {
        let mut update = InteractionUpdate::default();
        match event {
            InteractionEvent::Hover { country } => {
                update.hover_changed = self.hovered != country;
                self.hovered = country;
            }
            InteractionEvent::Click { country: Some(id) } => {
                update.clicked = Some(id);
                if self.mode == InteractionMode::Explore {
                    update.selection_changed = self.selected != Some(id);
                    self.selected = Some(id);
                }
            }
            InteractionEvent::Click { country: None }
            | InteractionEvent::Escape
            | InteractionEvent::ClosePanel => {
                update.selection_changed = self.selected.take().is_some();
            }
        }
        update
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        if mode == InteractionMode::HoverHighlightOnly {
            self.selected = None;
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn hovered(&self) -> Option<CountryId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<CountryId> {
        self.selected
    }

    /// Selection wins over hover.
    pub fn highlight(&self, id: CountryId) -> Highlight {
        if self.selected == Some(id) {
            Highlight::Selected
        } else if self.hovered == Some(id) {
            Highlight::Hovered
        } else {
            Highlight::None
        }
    }

    pub fn altitude(&self, id: CountryId) -> f64 {
        if self.selected == Some(id) {
            SELECTED_ALTITUDE
        } else {
            RESTING_ALTITUDE
        }
    }
}
