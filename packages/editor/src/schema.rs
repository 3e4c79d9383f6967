//! # Property Schema Registry
//!
//! Per-component table of editable fields. The registry is a total mapping
//! from [`ComponentType`] to a static slice of [`FieldDescriptor`]s, so adding
//! a component kind without deciding its fields is a compile error.
//!
//! Every type's form starts with the same common block (background color,
//! text color, font size, padding, top and bottom margin).

use crate::node::ComponentType;
use serde::Serialize;

/// Which part of a node a field writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTarget {
    Style,
    Content,
    Attribute,
}

/// Input widget the host should render for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Number,
    Color,
    Select,
    /// URL text input that also accepts an uploaded file
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// Declarative description of one editable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub label: &'static str,
    pub target: FieldTarget,
    pub key: &'static str,
    pub input: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [SelectOption],
}

fn no_options(options: &&'static [SelectOption]) -> bool {
    options.is_empty()
}

impl FieldDescriptor {
    const fn style(label: &'static str, key: &'static str, input: InputKind) -> Self {
        Self {
            label,
            target: FieldTarget::Style,
            key,
            input,
            unit: None,
            options: &[],
        }
    }

    const fn style_with_unit(
        label: &'static str,
        key: &'static str,
        unit: &'static str,
    ) -> Self {
        Self {
            label,
            target: FieldTarget::Style,
            key,
            input: InputKind::Number,
            unit: Some(unit),
            options: &[],
        }
    }

    const fn content(label: &'static str) -> Self {
        Self {
            label,
            target: FieldTarget::Content,
            key: "content",
            input: InputKind::Text,
            unit: None,
            options: &[],
        }
    }

    const fn attribute(label: &'static str, key: &'static str, input: InputKind) -> Self {
        Self {
            label,
            target: FieldTarget::Attribute,
            key,
            input,
            unit: None,
            options: &[],
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.input == InputKind::Number
    }

    /// Whether `value` is one of this select field's option values
    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

/// Fields shown for every component, in order
pub static COMMON_FIELDS: [FieldDescriptor; 6] = [
    FieldDescriptor::style("Background Color", "background-color", InputKind::Color),
    FieldDescriptor::style("Text Color", "color", InputKind::Color),
    FieldDescriptor::style_with_unit("Font Size (px)", "font-size", "px"),
    FieldDescriptor::style_with_unit("Padding (px)", "padding", "px"),
    FieldDescriptor::style_with_unit("Margin Top (px)", "margin-top", "px"),
    FieldDescriptor::style_with_unit("Margin Bottom (px)", "margin-bottom", "px"),
];

static CONTENT_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::content("Content")];

static IMAGE_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::attribute("Image URL", "src", InputKind::File),
    FieldDescriptor::style("Width (px/%/auto)", "width", InputKind::Text),
    FieldDescriptor::style("Height (px/%/auto)", "height", InputKind::Text),
];

static BUTTON_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::content("Button Text"),
    FieldDescriptor::attribute("Button Link (URL)", "href", InputKind::Text),
    FieldDescriptor::style("Button Background", "--button-bg-color", InputKind::Color),
    FieldDescriptor::style("Button Text Color", "--button-text-color", InputKind::Color),
];

static NAVBAR_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::content("Logo Text")];

static FOOTER_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::content("Copyright Text")];

static COLUMN_LAYOUTS: [SelectOption; 5] = [
    SelectOption { label: "1 Column", value: "1fr" },
    SelectOption { label: "2 Columns (50/50)", value: "1fr 1fr" },
    SelectOption { label: "3 Columns (33/33/33)", value: "1fr 1fr 1fr" },
    SelectOption { label: "2 Columns (30/70)", value: "0.3fr 0.7fr" },
    SelectOption { label: "2 Columns (70/30)", value: "0.7fr 0.3fr" },
];

static COLUMNS_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
    label: "Column Layout",
    target: FieldTarget::Style,
    key: "grid-template-columns",
    input: InputKind::Select,
    unit: None,
    options: &COLUMN_LAYOUTS,
}];

static ICON_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::attribute("Icon Name", "icon", InputKind::Text),
    FieldDescriptor::style_with_unit("Icon Size (em)", "font-size", "em"),
    FieldDescriptor::style("Icon Color", "color", InputKind::Color),
];

static VIDEO_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::attribute(
    "Video URL (YouTube/Vimeo)",
    "url",
    InputKind::Text,
)];

static CAROUSEL_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::style_with_unit(
    "Carousel Height (px)",
    "height",
    "px",
)];

static SLIDE_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::attribute(
    "Current Slide Image URL",
    "src",
    InputKind::File,
)];

/// The single field of the slide image sub-editor
pub fn slide_image_field() -> &'static FieldDescriptor {
    &SLIDE_FIELDS[0]
}

/// Type-specific fields only, without the common block
pub fn type_fields(ty: ComponentType) -> &'static [FieldDescriptor] {
    match ty {
        ComponentType::Text | ComponentType::Heading => &CONTENT_FIELDS,
        ComponentType::Image => &IMAGE_FIELDS,
        ComponentType::Button => &BUTTON_FIELDS,
        ComponentType::Navbar => &NAVBAR_FIELDS,
        ComponentType::Footer => &FOOTER_FIELDS,
        ComponentType::Columns => &COLUMNS_FIELDS,
        ComponentType::Icon => &ICON_FIELDS,
        ComponentType::Video => &VIDEO_FIELDS,
        ComponentType::Carousel => &CAROUSEL_FIELDS,
        ComponentType::Slide => &SLIDE_FIELDS,
        ComponentType::Canvas | ComponentType::Section | ComponentType::Column => &[],
    }
}

/// Common block followed by the type's own fields
pub fn fields_for(ty: ComponentType) -> Vec<&'static FieldDescriptor> {
    COMMON_FIELDS.iter().chain(type_fields(ty)).collect()
}

/// Look up a field of `ty` by target and key
pub fn find_field(
    ty: ComponentType,
    target: FieldTarget,
    key: &str,
) -> Option<&'static FieldDescriptor> {
    fields_for(ty)
        .into_iter()
        .rev()
        .find(|field| field.target == target && field.key == key)
}
