use crate::registry::component::{ComponentSpec, ComponentType};
use crate::render::adapter::RuntimeAdapter;
use crate::render::props::Props;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-type wrapper deciding how props and children are threaded into a component.
pub trait Renderer<A: RuntimeAdapter>: Send + Sync {
    /// Produce the node for `spec`.
    fn render(
        &self,
        spec: &ComponentSpec,
        props: Props,
        adapter: &A,
        children: Vec<A::Output>,
    ) -> A::Output;
}

impl<A, F> Renderer<A> for F
where
    A: RuntimeAdapter,
    F: Fn(&ComponentSpec, Props, &A, Vec<A::Output>) -> A::Output + Send + Sync,
{
    fn render(
        &self,
        spec: &ComponentSpec,
        props: Props,
        adapter: &A,
        children: Vec<A::Output>,
    ) -> A::Output {
        self(spec, props, adapter, children)
    }
}

/// Shared renderer handle.
pub type SharedRenderer<A> = Arc<dyn Renderer<A>>;

/// Component type -> renderer, as supplied by a provider scope.
pub type RendererMap<A> = HashMap<ComponentType, SharedRenderer<A>>;

/// The renderer every type falls back to.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinRenderer(pub ComponentType);

impl<A: RuntimeAdapter> Renderer<A> for BuiltinRenderer {
    fn render(
        &self,
        spec: &ComponentSpec,
        mut props: Props,
        adapter: &A,
        children: Vec<A::Output>,
    ) -> A::Output {
        match self.0 {
            ComponentType::Field => {
                // Inputs show labels through their wrapper, not through `content`.
                props.remove("content");
                adapter.create(spec, props, children)
            }
            ComponentType::FieldWrapper => {
                if props.get("label").is_none() {
                    if let Some(label) = ui_field(&props, "label") {
                        props.insert("label", label);
                    }
                }
                adapter.create(spec, props, children)
            }
            ComponentType::Content => {
                if props.get("content").is_none() {
                    if let Some(label) = ui_field(&props, "label") {
                        props.insert("content", label);
                    }
                }
                adapter.create(spec, props, children)
            }
            ComponentType::Addon | ComponentType::MenuItem => {
                adapter.create(spec, props, children)
            }
            ComponentType::Container
            | ComponentType::FormContainer
            | ComponentType::MenuContainer => adapter.create(spec, props, children),
        }
    }
}

fn ui_field(props: &Props, key: &str) -> Option<Value> {
    props.get("ui")?.get(key).cloned()
}

/// One renderer per component type for a whole render pass.
pub struct RendererTable<A: RuntimeAdapter> {
    field: SharedRenderer<A>,
    field_wrapper: SharedRenderer<A>,
    container: SharedRenderer<A>,
    form_container: SharedRenderer<A>,
    content: SharedRenderer<A>,
    addon: SharedRenderer<A>,
    menu_item: SharedRenderer<A>,
    menu_container: SharedRenderer<A>,
}

impl<A: RuntimeAdapter> Clone for RendererTable<A> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            field_wrapper: self.field_wrapper.clone(),
            container: self.container.clone(),
            form_container: self.form_container.clone(),
            content: self.content.clone(),
            addon: self.addon.clone(),
            menu_item: self.menu_item.clone(),
            menu_container: self.menu_container.clone(),
        }
    }
}

impl<A: RuntimeAdapter + 'static> Default for RendererTable<A> {
    fn default() -> Self {
        let builtin = |ty| -> SharedRenderer<A> { Arc::new(BuiltinRenderer(ty)) };
        Self {
            field: builtin(ComponentType::Field),
            field_wrapper: builtin(ComponentType::FieldWrapper),
            container: builtin(ComponentType::Container),
            form_container: builtin(ComponentType::FormContainer),
            content: builtin(ComponentType::Content),
            addon: builtin(ComponentType::Addon),
            menu_item: builtin(ComponentType::MenuItem),
            menu_container: builtin(ComponentType::MenuContainer),
        }
    }
}

impl<A: RuntimeAdapter> RendererTable<A> {
    /// The renderer for `ty`.
    pub fn get(&self, ty: ComponentType) -> &SharedRenderer<A> {
        match ty {
            ComponentType::Field => &self.field,
            ComponentType::FieldWrapper => &self.field_wrapper,
            ComponentType::Container => &self.container,
            ComponentType::FormContainer => &self.form_container,
            ComponentType::Content => &self.content,
            ComponentType::Addon => &self.addon,
            ComponentType::MenuItem => &self.menu_item,
            ComponentType::MenuContainer => &self.menu_container,
        }
    }

    /// Replace the renderer for `ty`.
    pub fn set(&mut self, ty: ComponentType, renderer: SharedRenderer<A>) {
        let slot = match ty {
            ComponentType::Field => &mut self.field,
            ComponentType::FieldWrapper => &mut self.field_wrapper,
            ComponentType::Container => &mut self.container,
            ComponentType::FormContainer => &mut self.form_container,
            ComponentType::Content => &mut self.content,
            ComponentType::Addon => &mut self.addon,
            ComponentType::MenuItem => &mut self.menu_item,
            ComponentType::MenuContainer => &mut self.menu_container,
        };
        *slot = renderer;
    }

    /// Overlay every entry of `map` onto the table.
    pub fn layer(&mut self, map: &RendererMap<A>) {
        for (ty, renderer) in map {
            self.set(*ty, renderer.clone());
        }
    }
}

/// Three-tier renderer lookup keyed by component type.
pub struct RendererRegistry<A: RuntimeAdapter> {
    defaults: RendererTable<A>,
}

impl<A: RuntimeAdapter + 'static> Default for RendererRegistry<A> {
    fn default() -> Self {
        Self {
            defaults: RendererTable::default(),
        }
    }
}

impl<A: RuntimeAdapter> Clone for RendererRegistry<A> {
    fn clone(&self) -> Self {
        Self {
            defaults: self.defaults.clone(),
        }
    }
}

impl<A: RuntimeAdapter> RendererRegistry<A> {
    /// Replace the built-in renderer for `ty`.
    pub fn register_default(&mut self, ty: ComponentType, renderer: SharedRenderer<A>) {
        self.defaults.set(ty, renderer);
    }

    /// Resolve one type: local > global > default. Always succeeds since defaults are total.
    pub fn resolve(
        &self,
        ty: ComponentType,
        global: Option<&RendererMap<A>>,
        local: Option<&RendererMap<A>>,
    ) -> SharedRenderer<A> {
        [local, global]
            .into_iter()
            .flatten()
            .find_map(|tier| tier.get(&ty))
            .unwrap_or_else(|| self.defaults.get(ty))
            .clone()
    }

    /// One table for a render pass: defaults, then global, then local, per type.
    pub fn merged_registry(
        &self,
        global: Option<&RendererMap<A>>,
        local: Option<&RendererMap<A>>,
    ) -> RendererTable<A> {
        let mut table = self.defaults.clone();
        for tier in [global, local].into_iter().flatten() {
            table.layer(tier);
        }
        table
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/renderer.rs"]
mod tests;
