//! Widget descriptions.
//!
//! Handlers do not draw anything. They produce a [`Widget`]: a serializable
//! description of the input element a front end should show for a field,
//! together with the value it should display. Input coming back from the
//! front end is expressed as a [`WidgetValue`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::InputContext;

/// The picker overlay attached to a temporal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerKind {
    /// A calendar.
    Date,
    /// A clock.
    Time,
    /// A calendar and a clock.
    DateTime,
}

/// The class selector shown above a union-of-objects field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSwitcher {
    /// Class name to display title, in variant order.
    pub options: IndexMap<String, String>,
    /// The class of the current value.
    pub selected: String,
}

/// Enumerates the widget variants a handler can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKind {
    /// A single-line text input.
    TextInput {
        /// Hint text shown while empty.
        placeholder: Option<String>,
    },
    /// A multi-line text input.
    Textarea {
        /// Render the content as markdown.
        markdown: bool,
    },
    /// A numeric input.
    NumberInput {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
        /// Increment.
        step: Option<f64>,
    },
    /// A slider between two bounds.
    Slider {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Increment.
        step: Option<f64>,
    },
    /// An on/off toggle.
    Switch,
    /// A text input with a picker overlay.
    TemporalInput {
        /// Which picker to attach.
        picker: PickerKind,
    },
    /// A select or multiselect.
    Select {
        /// Option value to label.
        options: IndexMap<String, String>,
        /// Allow several values.
        multiple: bool,
        /// Show selected values as chips.
        chips: bool,
    },
    /// A nested object: a one-line summary with an edit button.
    NestedObject {
        /// Summary of the current object.
        summary: String,
        /// Present for union-of-objects fields.
        switcher: Option<ClassSwitcher>,
    },
    /// A list of objects with per-item edit and delete, and an add button.
    ObjectList {
        /// Summary of each item.
        items: Vec<String>,
    },
    /// A list of scalars edited as comma-delimited text.
    DelimitedList {
        /// Type key of the element type.
        element: String,
        /// Hint text shown while empty.
        placeholder: String,
    },
}

impl WidgetKind {
    /// Returns the variant name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TextInput { .. } => "TextInput",
            Self::Textarea { .. } => "Textarea",
            Self::NumberInput { .. } => "NumberInput",
            Self::Slider { .. } => "Slider",
            Self::Switch => "Switch",
            Self::TemporalInput { .. } => "TemporalInput",
            Self::Select { .. } => "Select",
            Self::NestedObject { .. } => "NestedObject",
            Self::ObjectList { .. } => "ObjectList",
            Self::DelimitedList { .. } => "DelimitedList",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value displayed by, or received from, a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetValue {
    /// Nothing entered.
    Empty,
    /// A toggle state.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text, or a single selected option.
    Text(String),
    /// Several selected options.
    Choices(Vec<String>),
}

impl WidgetValue {
    /// Returns the text, if this is [`WidgetValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for WidgetValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for WidgetValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for WidgetValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for WidgetValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// The rendered description of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Field name.
    pub field: String,
    /// Field title, or a label derived from the name.
    pub label: String,
    /// The input element.
    pub kind: WidgetKind,
    /// The value to display.
    pub value: WidgetValue,
    /// Whether the input offers a clear button.
    pub clearable: bool,
    /// Whether the input rejects edits.
    pub disabled: bool,
    /// Field description.
    pub tooltip: Option<String>,
    /// Name of the handler that produced the widget.
    pub handler: String,
}

impl Widget {
    /// Creates a widget for the field described by `ctx`.
    pub fn new(ctx: &InputContext<'_>, kind: WidgetKind, value: WidgetValue) -> Self {
        Self {
            field: ctx.field_name.to_string(),
            label: ctx.descriptor.label(),
            kind,
            value,
            clearable: false,
            disabled: ctx.disabled,
            tooltip: ctx.descriptor.description.clone(),
            handler: String::new(),
        }
    }

    /// Sets whether the input offers a clear button.
    #[must_use]
    pub const fn clearable(mut self, clearable: bool) -> Self {
        self.clearable = clearable;
        self
    }

    /// Replaces the tooltip.
    #[must_use]
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Records the producing handler.
    #[must_use]
    pub fn handler(mut self, name: impl Into<String>) -> Self {
        self.handler = name.into();
        self
    }
}
