//! Event commands: the individual operations of a page's script

use serde::{Deserialize, Serialize};

/// Untyped parameter map attached to every command
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Every command kind an event page may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    // Message
    ShowText,
    ShowScrollingText,
    ShowChoices,
    InputNumber,
    // Flow control
    ConditionalBranch,
    Loop,
    BreakLoop,
    Label,
    JumpToLabel,
    ExitEvent,
    EraseEvent,
    Wait,
    Comment,
    // Game state
    ControlSwitches,
    ControlVariables,
    ControlSelfSwitch,
    ChangeGold,
    ChangeItems,
    ChangePartyMember,
    // Movement
    TransferPlayer,
    SetEventLocation,
    SetMovementRoute,
    ScrollMap,
    ChangeTransparency,
    // Screen
    FadeoutScreen,
    FadeinScreen,
    TintScreen,
    FlashScreen,
    ShakeScreen,
    ShowPicture,
    ErasePicture,
    ShowAnimation,
    ShowBalloon,
    ChangeWeather,
    // Audio
    PlayBgm,
    FadeoutBgm,
    PlayBgs,
    PlayMe,
    PlaySe,
    StopSe,
    // Party
    ChangeHp,
    ChangeMp,
    ChangeState,
    RecoverAll,
    ChangeExp,
    ChangeLevel,
    ChangeSkills,
    ChangeEquipment,
    ChangeName,
    ChangeWeapons,
    ChangeArmors,
    // Script
    Script,
    PluginCommand,
}

/// Broad grouping of command kinds, used to route pass-through commands
/// to the matching presentation hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandFamily {
    Message,
    Flow,
    State,
    Movement,
    Screen,
    Audio,
    Party,
    Script,
}

impl CommandKind {
    pub fn family(self) -> CommandFamily {
        use CommandKind::*;
        match self {
            ShowText | ShowScrollingText | ShowChoices | InputNumber => CommandFamily::Message,
            ConditionalBranch | Loop | BreakLoop | Label | JumpToLabel | ExitEvent
            | EraseEvent | Wait | Comment => CommandFamily::Flow,
            ControlSwitches | ControlVariables | ControlSelfSwitch | ChangeGold | ChangeItems
            | ChangePartyMember => CommandFamily::State,
            TransferPlayer | SetEventLocation | SetMovementRoute | ScrollMap
            | ChangeTransparency => CommandFamily::Movement,
            FadeoutScreen | FadeinScreen | TintScreen | FlashScreen | ShakeScreen
            | ShowPicture | ErasePicture | ShowAnimation | ShowBalloon | ChangeWeather => {
                CommandFamily::Screen
            }
            PlayBgm | FadeoutBgm | PlayBgs | PlayMe | PlaySe | StopSe => CommandFamily::Audio,
            ChangeHp | ChangeMp | ChangeState | RecoverAll | ChangeExp | ChangeLevel
            | ChangeSkills | ChangeEquipment | ChangeName | ChangeWeapons | ChangeArmors => {
                CommandFamily::Party
            }
            Script | PluginCommand => CommandFamily::Script,
        }
    }

    /// Commands whose body is the run of following commands with a deeper indent
    pub fn opens_block(self) -> bool {
        matches!(self, CommandKind::ConditionalBranch | CommandKind::Loop)
    }

    /// The persisted tag, e.g. `show_text`
    pub fn tag(self) -> String {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(s)) => s,
            _ => format!("{self:?}"),
        }
    }
}

/// A single authored command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCommand {
    #[serde(alias = "type")]
    pub command_type: CommandKind,
    #[serde(default)]
    pub parameters: Parameters,
    /// Block nesting hint; bodies of branches and loops sit one level deeper
    #[serde(default)]
    pub indent: u32,
}

impl EventCommand {
    pub fn new(command_type: CommandKind, indent: u32) -> Self {
        Self {
            command_type,
            parameters: Parameters::new(),
            indent,
        }
    }

    /// Build a command from a `json!({...})` object; non-object values give
    /// an empty parameter map
    pub fn with_params(command_type: CommandKind, indent: u32, params: serde_json::Value) -> Self {
        let parameters = match params {
            serde_json::Value::Object(map) => map,
            _ => Parameters::new(),
        };
        Self {
            command_type,
            parameters,
            indent,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.command_type
    }

    /// String parameter lookup
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }

    /// Integer parameter lookup
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.parameters.get(key).and_then(|v| v.as_i64())
    }

    /// Non-negative id parameter lookup
    pub fn param_id(&self, key: &str) -> Option<u32> {
        self.parameters
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
    }

    pub fn param_bool(&self, key: &str) -> Option<bool> {
        self.parameters.get(key).and_then(|v| v.as_bool())
    }
}
