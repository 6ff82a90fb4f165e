//! Typed views of the parameter maps the engine interprets itself

use crate::error::LogicError;
use crate::types::command::{CommandKind, EventCommand};
use crate::types::page::Comparison;
use crate::types::state::{GameState, SelfSwitch, SelfSwitchKey};
use rand::Rng;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::ops::RangeInclusive;

/// Deserialize a command's parameter map into `T`
pub fn parse<T: DeserializeOwned>(cmd: &EventCommand) -> Result<T, LogicError> {
    serde_json::from_value(serde_json::Value::Object(cmd.parameters.clone()))
        .map_err(|e| LogicError::malformed(cmd.kind(), e.to_string()))
}

fn default_true() -> bool {
    true
}

/// Most ids a single switch or variable range may write in one step
pub const MAX_RANGE: u32 = 5000;

/// Either a single id or an inclusive `start_id..=end_id` range of at most
/// [`MAX_RANGE`] ids
fn id_range(
    kind: CommandKind,
    single: Option<u32>,
    start: Option<u32>,
    end: Option<u32>,
) -> Result<RangeInclusive<u32>, LogicError> {
    match (single, start, end) {
        (Some(id), _, _) => Ok(id..=id),
        (None, Some(start), Some(end)) if start <= end && end - start < MAX_RANGE => {
            Ok(start..=end)
        }
        (None, Some(start), Some(end)) if start <= end => Err(LogicError::malformed(
            kind,
            format!("id range {start}..={end} exceeds {MAX_RANGE} ids"),
        )),
        (None, Some(start), Some(end)) => Err(LogicError::malformed(
            kind,
            format!("empty id range {start}..={end}"),
        )),
        _ => Err(LogicError::malformed(kind, "missing target id or id range")),
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlSwitches {
    switch_id: Option<u32>,
    start_id: Option<u32>,
    end_id: Option<u32>,
    pub value: bool,
}

impl ControlSwitches {
    pub fn targets(&self) -> Result<RangeInclusive<u32>, LogicError> {
        id_range(
            CommandKind::ControlSwitches,
            self.switch_id,
            self.start_id,
            self.end_id,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableOperation {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operand {
    Constant { value: i64 },
    Variable { variable_id: u32 },
    /// Inclusive on both ends
    Random { min: i64, max: i64 },
}

impl Operand {
    pub fn evaluate(&self, state: &dyn GameState, rng: &mut impl Rng) -> i64 {
        match *self {
            Operand::Constant { value } => value,
            Operand::Variable { variable_id } => state.variable(variable_id),
            Operand::Random { min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                rng.gen_range(lo..=hi)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlVariables {
    variable_id: Option<u32>,
    start_id: Option<u32>,
    end_id: Option<u32>,
    pub operation: VariableOperation,
    pub operand: Operand,
}

impl ControlVariables {
    pub fn targets(&self) -> Result<RangeInclusive<u32>, LogicError> {
        id_range(
            CommandKind::ControlVariables,
            self.variable_id,
            self.start_id,
            self.end_id,
        )
    }
}

impl VariableOperation {
    /// Combine the current value with the operand; arithmetic saturates
    pub fn apply(self, variable_id: u32, current: i64, operand: i64) -> Result<i64, LogicError> {
        let fault = |reason: &str| LogicError::ArithmeticFault {
            variable_id,
            reason: reason.to_string(),
        };
        match self {
            VariableOperation::Set => Ok(operand),
            VariableOperation::Add => Ok(current.saturating_add(operand)),
            VariableOperation::Sub => Ok(current.saturating_sub(operand)),
            VariableOperation::Mul => Ok(current.saturating_mul(operand)),
            VariableOperation::Div if operand == 0 => Err(fault("division by zero")),
            VariableOperation::Div => Ok(current.checked_div(operand).unwrap_or(i64::MAX)),
            VariableOperation::Mod if operand == 0 => Err(fault("modulo by zero")),
            VariableOperation::Mod => Ok(current.checked_rem(operand).unwrap_or(0)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ControlSelfSwitch {
    pub self_switch: SelfSwitch,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeGold {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangeItems {
    pub item_id: u32,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangePartyMember {
    pub actor_id: u32,
    #[serde(default = "default_true")]
    pub join: bool,
}

/// `wait` takes a frame count or a duration in seconds
#[derive(Debug, Deserialize)]
pub struct Wait {
    pub frames: Option<u32>,
    pub seconds: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct LabelName {
    pub name: String,
}

/// Where a choice or number answer is stored
#[derive(Debug, Default, Deserialize)]
pub struct AnswerTarget {
    pub variable_id: Option<u32>,
    #[serde(default)]
    pub choices: Vec<serde_json::Value>,
}

/// Condition of a `conditional_branch`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "condition_type", rename_all = "snake_case")]
pub enum BranchCondition {
    Switch {
        switch_id: u32,
        #[serde(default = "default_true")]
        value: bool,
    },
    Variable {
        variable_id: u32,
        operator: Comparison,
        value: Option<i64>,
        other_variable_id: Option<u32>,
    },
    SelfSwitch {
        self_switch: SelfSwitch,
        #[serde(default = "default_true")]
        value: bool,
    },
    Item {
        item_id: u32,
    },
    Actor {
        actor_id: u32,
    },
    Gold {
        operator: Comparison,
        amount: i64,
    },
}

impl BranchCondition {
    pub fn parse(cmd: &EventCommand) -> Result<Self, LogicError> {
        serde_json::from_value(serde_json::Value::Object(cmd.parameters.clone())).map_err(|e| {
            let message = e.to_string();
            if message.contains("unknown variant") || message.contains("missing field `condition_type`")
            {
                LogicError::unknown_condition(message)
            } else {
                LogicError::malformed(cmd.kind(), message)
            }
        })
    }

    pub fn evaluate(
        &self,
        state: &dyn GameState,
        map_id: u32,
        event_id: u32,
    ) -> Result<bool, LogicError> {
        match *self {
            BranchCondition::Switch { switch_id, value } => Ok(state.switch(switch_id) == value),
            BranchCondition::Variable {
                variable_id,
                operator,
                value,
                other_variable_id,
            } => {
                let rhs = match (value, other_variable_id) {
                    (_, Some(other)) => state.variable(other),
                    (Some(value), None) => value,
                    (None, None) => {
                        return Err(LogicError::malformed(
                            CommandKind::ConditionalBranch,
                            "variable condition needs 'value' or 'other_variable_id'",
                        ));
                    }
                };
                Ok(operator.compare(state.variable(variable_id), rhs))
            }
            BranchCondition::SelfSwitch { self_switch, value } => {
                Ok(state.self_switch(SelfSwitchKey::new(map_id, event_id, self_switch)) == value)
            }
            BranchCondition::Item { item_id } => Ok(state.has_item(item_id)),
            BranchCondition::Actor { actor_id } => Ok(state.has_actor(actor_id)),
            BranchCondition::Gold { operator, amount } => Ok(operator.compare(state.gold(), amount)),
        }
    }
}
