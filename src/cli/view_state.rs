//! View state management for the terminal player
//!
//! Tracks what the presentation hooks have put on screen (background
//! music, pictures, weather) and reports only what changed.

use crate::runtime::hooks::HookCall;
use crate::types::command::CommandKind;
use std::collections::BTreeMap;

/// Clear the terminal screen (cross-platform)
pub fn clear_screen() {
    // ANSI escape codes work on most terminals
    print!("\x1b[2J\x1b[H");

    if std::io::Write::flush(&mut std::io::stdout()).is_err() {
        for _ in 0..50 {
            println!();
        }
    }
}

/// The current visual and audio state of the terminal player
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub bgm: Option<String>,
    /// Picture id -> picture name
    pub pictures: BTreeMap<u64, String>,
    pub weather: Option<String>,
    /// Last played SE (for display purposes)
    pub se_last: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one pass-through command and return the rendering delta
    pub fn apply(&mut self, call: &HookCall<'_>) -> RenderDelta {
        let mut delta = RenderDelta::new();
        let name = call
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let picture_id = call
            .params
            .get("picture_id")
            .and_then(|v| v.as_u64())
            .unwrap_or(1);

        match call.kind {
            CommandKind::PlayBgm => {
                if let Some(bgm) = name
                    && self.bgm.as_ref() != Some(&bgm)
                {
                    delta.effects_added.push(format!("PlayBGM: {}", bgm));
                    self.bgm = Some(bgm);
                }
            }
            CommandKind::FadeoutBgm => {
                if let Some(bgm) = self.bgm.take() {
                    delta.effects_added.push(format!("FadeoutBGM: {}", bgm));
                }
            }
            // SE always triggers (not persistent state)
            CommandKind::PlaySe => {
                let se = name.unwrap_or_else(|| "?".to_string());
                delta.effects_added.push(format!("PlaySE: {}", se));
                self.se_last = Some(se);
            }
            CommandKind::ShowPicture => {
                if let Some(name) = name
                    && self.pictures.get(&picture_id) != Some(&name)
                {
                    delta
                        .effects_added
                        .push(format!("ShowPicture: {} (#{})", name, picture_id));
                    self.pictures.insert(picture_id, name);
                }
            }
            CommandKind::ErasePicture => {
                if self.pictures.remove(&picture_id).is_some() {
                    delta
                        .effects_added
                        .push(format!("ErasePicture: #{}", picture_id));
                }
            }
            CommandKind::ChangeWeather => {
                let weather = call
                    .params
                    .get("weather")
                    .and_then(|v| v.as_str())
                    .filter(|w| *w != "none")
                    .map(str::to_string);
                if weather != self.weather {
                    delta.effects_added.push(format!(
                        "Weather: {}",
                        weather.as_deref().unwrap_or("clear")
                    ));
                    self.weather = weather;
                }
            }
            kind => {
                let params = serde_json::Value::Object(call.params.clone());
                delta
                    .effects_added
                    .push(format!("{}: {}", kind.tag(), params));
            }
        }

        delta
    }
}

/// What needs to be rendered (the delta from the previous state)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDelta {
    /// Effects that were added (human-readable strings)
    pub effects_added: Vec<String>,
}

impl RenderDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.effects_added.is_empty()
    }
}

/// Render a delta to the console
pub fn render_delta(delta: &RenderDelta) {
    for effect in &delta.effects_added {
        println!("  [{}]", effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::command::Parameters;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Parameters {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Parameters::new(),
        }
    }

    fn call(kind: CommandKind, params: &Parameters) -> HookCall<'_> {
        HookCall {
            map_id: 1,
            event_id: 1,
            index: 0,
            kind,
            params,
        }
    }

    #[test]
    fn test_empty_view_state() {
        let view = ViewState::new();
        assert_eq!(view.bgm, None);
        assert!(view.pictures.is_empty());
        assert_eq!(view.se_last, None);
    }

    #[test]
    fn test_bgm_change() {
        let mut view = ViewState::new();
        let p = params(json!({"name": "town"}));

        let delta = view.apply(&call(CommandKind::PlayBgm, &p));
        assert_eq!(delta.effects_added, vec!["PlayBGM: town".to_string()]);
        assert_eq!(view.bgm, Some("town".to_string()));

        // same BGM again is not a change
        let delta = view.apply(&call(CommandKind::PlayBgm, &p));
        assert!(delta.is_empty());

        let delta = view.apply(&call(CommandKind::FadeoutBgm, &Parameters::new()));
        assert_eq!(delta.effects_added, vec!["FadeoutBGM: town".to_string()]);
        assert_eq!(view.bgm, None);
    }

    #[test]
    fn test_pictures_by_id() {
        let mut view = ViewState::new();
        let shown = params(json!({"picture_id": 2, "name": "portrait"}));
        let erased = params(json!({"picture_id": 2}));

        let delta = view.apply(&call(CommandKind::ShowPicture, &shown));
        assert_eq!(
            delta.effects_added,
            vec!["ShowPicture: portrait (#2)".to_string()]
        );
        assert!(view.apply(&call(CommandKind::ShowPicture, &shown)).is_empty());

        view.apply(&call(CommandKind::ErasePicture, &erased));
        assert!(view.pictures.is_empty());
        assert!(view.apply(&call(CommandKind::ErasePicture, &erased)).is_empty());
    }

    #[test]
    fn test_se_always_triggers() {
        let mut view = ViewState::new();
        let p = params(json!({"name": "door"}));
        for _ in 0..2 {
            let delta = view.apply(&call(CommandKind::PlaySe, &p));
            assert_eq!(delta.effects_added, vec!["PlaySE: door".to_string()]);
        }
    }

    #[test]
    fn test_other_commands_are_described() {
        let mut view = ViewState::new();
        let p = params(json!({"duration": 30}));
        let delta = view.apply(&call(CommandKind::ShakeScreen, &p));
        assert_eq!(
            delta.effects_added,
            vec![r#"shake_screen: {"duration":30}"#.to_string()]
        );
    }
}
