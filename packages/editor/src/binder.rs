//! # Property Binder
//!
//! Turns the selected node into a form description for the host UI, and turns
//! raw input from that form back into a [`Mutation`].
//!
//! The binder never touches the document itself. [`bind_edit`] only decides
//! what an edit means; the session applies the resulting mutation and saves
//! history, so a rejected edit can never leave a half-applied change behind.
//!
//! ## Form modes
//!
//! ```text
//! Empty ──select──▶ Main(node) ──pick slide──▶ SlideSubEdit(carousel, slide)
//!   ▲                   │  ▲                            │
//!   └────deselect───────┘  └──────────── done ──────────┘
//! ```

use crate::document::Document;
use crate::mutations::Mutation;
use crate::node::{ComponentType, Node, NodeId, NodeKind};
use crate::schema::{self, FieldDescriptor, FieldTarget, InputKind};
use serde::Serialize;

/// Which form currently occupies the property panel
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormMode {
    #[default]
    Empty,
    Main(NodeId),
    SlideSubEdit { carousel: NodeId, slide: NodeId },
}

impl FormMode {
    /// Node whose fields the form edits
    pub fn target(&self) -> Option<&NodeId> {
        match self {
            FormMode::Empty => None,
            FormMode::Main(id) => Some(id),
            FormMode::SlideSubEdit { slide, .. } => Some(slide),
        }
    }
}

/// A field descriptor together with the node's current value for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundField {
    pub field: &'static FieldDescriptor,
    pub value: String,
}

/// One row in the carousel's slide list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSummary {
    pub index: usize,
    pub label: String,
    pub thumbnail: String,
    pub current: bool,
}

/// Form handed to the host UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "form", rename_all = "camelCase")]
pub enum FormDescription {
    /// Nothing selected
    Placeholder,

    Main {
        node_id: NodeId,
        component: ComponentType,
        fields: Vec<BoundField>,
        /// Only populated for carousels
        slides: Vec<SlideSummary>,
    },

    SlideImage {
        carousel_id: NodeId,
        slide_id: NodeId,
        slide_index: usize,
        field: BoundField,
    },
}

impl FormDescription {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, FormDescription::Placeholder)
    }

    /// Bound fields in display order
    pub fn fields(&self) -> Vec<&BoundField> {
        match self {
            FormDescription::Placeholder => Vec::new(),
            FormDescription::Main { fields, .. } => fields.iter().collect(),
            FormDescription::SlideImage { field, .. } => vec![field],
        }
    }

    /// Current value of the field with `label`, if present
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|bound| bound.field.label == label)
            .map(|bound| bound.value.as_str())
    }
}

/// What an edit should do to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Apply(Mutation),
    /// Input is invalid for the field (e.g. non-numeric text in a number field)
    Rejected,
    /// Input would not change anything
    Unchanged,
    /// Target node is no longer in the document
    Stale,
}

/// Build the form for `mode`
pub fn render(doc: &Document, mode: &FormMode) -> FormDescription {
    match mode {
        FormMode::Empty => FormDescription::Placeholder,
        FormMode::Main(id) => match doc.find(id) {
            Some(node) => render_main(node),
            None => FormDescription::Placeholder,
        },
        FormMode::SlideSubEdit { carousel, slide } => {
            let Some(carousel_node) = doc.find(carousel) else {
                return FormDescription::Placeholder;
            };
            let Some(slide_index) = carousel_node.children.iter().position(|c| &c.id == slide)
            else {
                return render_main(carousel_node);
            };
            let field = schema::slide_image_field();
            FormDescription::SlideImage {
                carousel_id: carousel.clone(),
                slide_id: slide.clone(),
                slide_index,
                field: BoundField {
                    field,
                    value: bound_value(&carousel_node.children[slide_index], field),
                },
            }
        }
    }
}

fn render_main(node: &Node) -> FormDescription {
    let fields = schema::fields_for(node.component_type())
        .into_iter()
        .map(|field| BoundField {
            field,
            value: bound_value(node, field),
        })
        .collect();

    let slides = match node.kind {
        NodeKind::Carousel { current_slide } => node
            .children
            .iter()
            .enumerate()
            .map(|(index, slide)| SlideSummary {
                index,
                label: format!("Slide {}", index + 1),
                thumbnail: slide.kind.attribute("src").unwrap_or_default().to_string(),
                current: index == current_slide,
            })
            .collect(),
        _ => Vec::new(),
    };

    FormDescription::Main {
        node_id: node.id.clone(),
        component: node.component_type(),
        fields,
        slides,
    }
}

/// Current value of `field` on `node`, formatted for the input widget
pub fn bound_value(node: &Node, field: &FieldDescriptor) -> String {
    match field.target {
        FieldTarget::Style => {
            let Some(value) = node.style.get(field.key) else {
                return String::new();
            };
            if field.is_numeric() {
                parse_leading_number(value)
                    .map(format_number)
                    .unwrap_or_default()
            } else {
                match field.unit {
                    Some(unit) => value.strip_suffix(unit).unwrap_or(value).to_string(),
                    None => value.clone(),
                }
            }
        }
        FieldTarget::Content => node.content.clone().unwrap_or_default(),
        FieldTarget::Attribute => node.kind.attribute(field.key).unwrap_or_default().to_string(),
    }
}

/// Decide what writing `raw` into `field` of `node_id` means
pub fn bind_edit(doc: &Document, node_id: &NodeId, field: &FieldDescriptor, raw: &str) -> Binding {
    let Some(node) = doc.find(node_id) else {
        return Binding::Stale;
    };

    // Fields from some other node's form don't apply here
    if !schema::fields_for(node.component_type())
        .iter()
        .any(|known| *known == field)
    {
        return Binding::Rejected;
    }

    let mutation = match field.target {
        FieldTarget::Style => {
            let Some(value) = style_value(field, raw) else {
                return Binding::Rejected;
            };
            if node.style.get(field.key) == value.as_ref() {
                return Binding::Unchanged;
            }
            Mutation::SetStyle {
                node_id: node_id.clone(),
                property: field.key.to_string(),
                value,
            }
        }
        FieldTarget::Content => {
            if node.content.as_deref() == Some(raw) {
                return Binding::Unchanged;
            }
            Mutation::SetContent {
                node_id: node_id.clone(),
                content: raw.to_string(),
            }
        }
        FieldTarget::Attribute => {
            let value = normalize_attribute(field.key, raw);
            if node.kind.attribute(field.key) == Some(value.as_str()) {
                return Binding::Unchanged;
            }
            Mutation::SetAttribute {
                node_id: node_id.clone(),
                key: field.key.to_string(),
                value,
            }
        }
    };

    Binding::Apply(mutation)
}

/// Style value to store, `Some(None)` to clear, `None` to reject
fn style_value(field: &FieldDescriptor, raw: &str) -> Option<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }

    let unit = field.unit.unwrap_or_default();
    match field.input {
        InputKind::Number => {
            let number = trimmed.parse::<f64>().ok().filter(|n| n.is_finite())?;
            Some(Some(format!("{}{}", format_number(number), unit)))
        }
        InputKind::Select if !field.allows_option(raw) => None,
        _ => Some(Some(format!("{raw}{unit}"))),
    }
}

fn normalize_attribute(key: &str, raw: &str) -> String {
    match key {
        "url" => normalize_video_url(raw),
        "icon" => raw.trim().to_string(),
        _ => raw.to_string(),
    }
}

/// Rewrite watch/share URLs into their embeddable form
pub fn normalize_video_url(raw: &str) -> String {
    let url = raw.trim();
    if url.contains("youtube.com/watch?v=") {
        url.replacen("watch?v=", "embed/", 1)
    } else if url.contains("vimeo.com/") && !url.contains("player.vimeo.com/") {
        url.replacen("vimeo.com/", "player.vimeo.com/video/", 1)
    } else {
        url.to_string()
    }
}

/// Numeric magnitude at the start of a CSS value (`"16px"` → 16)
pub fn parse_leading_number(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let end = value
        .char_indices()
        .take_while(|&(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    value[..end].parse().ok()
}

fn format_number(number: f64) -> String {
    format!("{number}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::COMMON_FIELDS;

    fn doc_with(ty: ComponentType) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root_id().clone();
        let node = doc.create_node(ty);
        let id = node.id.clone();
        doc.insert(node, &root, 0).unwrap();
        (doc, id)
    }

    fn field(ty: ComponentType, label: &str) -> &'static FieldDescriptor {
        schema::fields_for(ty)
            .into_iter()
            .find(|f| f.label == label)
            .unwrap()
    }

    #[test]
    fn test_empty_mode_renders_placeholder() {
        let (doc, _) = doc_with(ComponentType::Text);
        assert!(render(&doc, &FormMode::Empty).is_placeholder());
        assert!(render(&doc, &FormMode::Main(NodeId::new("gone"))).is_placeholder());
    }

    #[test]
    fn test_main_form_prepopulates_values() {
        let (mut doc, id) = doc_with(ComponentType::Button);
        doc.find_mut(&id)
            .unwrap()
            .style
            .insert("font-size".to_string(), "18px".to_string());

        let form = render(&doc, &FormMode::Main(id));
        assert_eq!(form.fields().len(), COMMON_FIELDS.len() + 4);
        assert_eq!(form.value_of("Font Size (px)"), Some("18"));
        assert_eq!(form.value_of("Padding (px)"), Some(""));
        assert_eq!(form.value_of("Button Text"), Some("Click Me"));
        assert_eq!(form.value_of("Button Link (URL)"), Some("#"));
        assert_eq!(form.value_of("Button Background"), Some("#3498db"));
    }

    #[test]
    fn test_unparseable_numeric_value_renders_empty() {
        let (mut doc, id) = doc_with(ComponentType::Text);
        doc.find_mut(&id)
            .unwrap()
            .style
            .insert("padding".to_string(), "auto".to_string());

        let form = render(&doc, &FormMode::Main(id));
        assert_eq!(form.value_of("Padding (px)"), Some(""));
    }

    #[test]
    fn test_numeric_edit_appends_unit() {
        let (doc, id) = doc_with(ComponentType::Text);
        let binding = bind_edit(&doc, &id, field(ComponentType::Text, "Font Size (px)"), "24");
        assert_eq!(
            binding,
            Binding::Apply(Mutation::SetStyle {
                node_id: id,
                property: "font-size".to_string(),
                value: Some("24px".to_string()),
            })
        );
    }

    #[test]
    fn test_non_numeric_input_is_rejected() {
        let (doc, id) = doc_with(ComponentType::Text);
        let binding = bind_edit(&doc, &id, field(ComponentType::Text, "Padding (px)"), "abc");
        assert_eq!(binding, Binding::Rejected);
    }

    #[test]
    fn test_edit_on_missing_node_is_stale() {
        let (doc, _) = doc_with(ComponentType::Text);
        let binding = bind_edit(
            &doc,
            &NodeId::new("gone"),
            field(ComponentType::Text, "Content"),
            "hi",
        );
        assert_eq!(binding, Binding::Stale);
    }

    #[test]
    fn test_field_from_other_type_is_rejected() {
        let (doc, id) = doc_with(ComponentType::Text);
        let binding = bind_edit(&doc, &id, field(ComponentType::Image, "Image URL"), "x.png");
        assert_eq!(binding, Binding::Rejected);
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let (doc, id) = doc_with(ComponentType::Columns);
        let layout = field(ComponentType::Columns, "Column Layout");
        assert_eq!(bind_edit(&doc, &id, layout, "9fr"), Binding::Rejected);
        assert!(matches!(bind_edit(&doc, &id, layout, "1fr 1fr 1fr"), Binding::Apply(_)));
        assert_eq!(bind_edit(&doc, &id, layout, "1fr 1fr"), Binding::Unchanged);
    }

    #[test]
    fn test_video_urls_are_normalized() {
        assert_eq!(
            normalize_video_url(" https://www.youtube.com/watch?v=abc "),
            "https://www.youtube.com/embed/abc"
        );
        assert_eq!(
            normalize_video_url("https://vimeo.com/123"),
            "https://player.vimeo.com/video/123"
        );
        assert_eq!(
            normalize_video_url("https://player.vimeo.com/video/123"),
            "https://player.vimeo.com/video/123"
        );
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("16px"), Some(16.0));
        assert_eq!(parse_leading_number("1.5em"), Some(1.5));
        assert_eq!(parse_leading_number("-4px"), Some(-4.0));
        assert_eq!(parse_leading_number("auto"), None);
        assert_eq!(parse_leading_number(""), None);
    }

    #[test]
    fn test_carousel_form_lists_slides() {
        let (doc, id) = doc_with(ComponentType::Carousel);
        let FormDescription::Main { slides, .. } = render(&doc, &FormMode::Main(id)) else {
            panic!("expected main form");
        };
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].label, "Slide 1");
        assert!(slides[0].current);
        assert!(!slides[1].current);
    }

    #[test]
    fn test_slide_sub_edit_form() {
        let (doc, carousel) = doc_with(ComponentType::Carousel);
        let slide = doc.find(&carousel).unwrap().children[1].id.clone();

        let form = render(
            &doc,
            &FormMode::SlideSubEdit {
                carousel: carousel.clone(),
                slide: slide.clone(),
            },
        );

        match form {
            FormDescription::SlideImage { slide_index, field, .. } => {
                assert_eq!(slide_index, 1);
                assert_eq!(field.field.label, "Current Slide Image URL");
                assert!(field.value.contains("Slide+2"));
            }
            other => panic!("expected slide form, got {other:?}"),
        }
    }
}
