//! Names of the built-in components and the closed set of input identifiers.

use crate::registry::component::ComponentType;
use crate::schema::fields::FieldKind;

/// Form container; the usual schema root.
pub const FORM: &str = "Form";
/// Section container; the usual direct child of the form root.
pub const SECTION: &str = "Section";
/// Group container.
pub const GROUP: &str = "Group";
/// Container holding several groups.
pub const GROUP_CONTAINER: &str = "GroupContainer";
/// Wrapper around exactly one input, supplying fallback `ui` metadata.
pub const FIELD_WRAPPER: &str = "FieldWrapper";
/// Content-only label.
pub const LABEL: &str = "Label";
/// Content-only paragraph.
pub const TEXT: &str = "Text";
/// Content-only heading.
pub const HEADING: &str = "Heading";
/// Decorative addon next to a field.
pub const ADDON: &str = "Addon";
/// Menu container.
pub const MENU: &str = "Menu";
/// Menu entry.
pub const MENU_ITEM: &str = "MenuItem";

/// Prefix shared by every input identifier.
pub const INPUT_PREFIX: &str = "Input";

/// The input identifiers and the kind of value each one edits.
pub const INPUTS: &[(&str, FieldKind)] = &[
    ("InputText", FieldKind::Text),
    ("InputTextarea", FieldKind::Text),
    ("InputPassword", FieldKind::Text),
    ("InputEmail", FieldKind::Text),
    ("InputNumber", FieldKind::Number),
    ("InputSlider", FieldKind::Number),
    ("InputCheckbox", FieldKind::Boolean),
    ("InputSwitch", FieldKind::Boolean),
    ("InputSelect", FieldKind::Text),
    ("InputMultiSelect", FieldKind::MultiSelect),
    ("InputRadio", FieldKind::Text),
    ("InputDate", FieldKind::Text),
];

/// Non-input built-ins with their component type.
pub(crate) const STRUCTURAL: &[(&str, ComponentType)] = &[
    (FORM, ComponentType::FormContainer),
    (SECTION, ComponentType::Container),
    (GROUP, ComponentType::Container),
    (GROUP_CONTAINER, ComponentType::Container),
    (FIELD_WRAPPER, ComponentType::FieldWrapper),
    (LABEL, ComponentType::Content),
    (TEXT, ComponentType::Content),
    (HEADING, ComponentType::Content),
    (ADDON, ComponentType::Addon),
    (MENU, ComponentType::MenuContainer),
    (MENU_ITEM, ComponentType::MenuItem),
];

/// The value kind of an input identifier, if `name` is one.
pub fn input_kind(name: &str) -> Option<FieldKind> {
    INPUTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
}

/// The component type the built-in catalog assigns to `name`.
pub fn builtin_type(name: &str) -> Option<ComponentType> {
    if input_kind(name).is_some() {
        return Some(ComponentType::Field);
    }
    STRUCTURAL
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ty)| *ty)
}
