//! Adapter-wide shared props, template data and template functions.
//!
//! # Design Decisions
//! - Copy-on-write snapshot behind `ArcSwap`: requests read a consistent
//!   snapshot without locking, writers publish a fresh copy
//! - Writes are expected at setup time but stay safe while serving

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::props::{Prop, Props};
use crate::render::template::{TemplateData, TemplateFn, TemplateFuncs, TemplateValue};

/// One immutable snapshot of the shared state.
#[derive(Clone, Default)]
pub struct SharedState {
    pub props: Props,
    pub template_data: TemplateData,
    pub template_funcs: TemplateFuncs,
}

pub(crate) struct Shared {
    state: ArcSwap<SharedState>,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(SharedState::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<SharedState> {
        self.state.load_full()
    }

    fn update(&self, mut apply: impl FnMut(&mut SharedState)) {
        self.state.rcu(|current| {
            let mut next = SharedState::clone(current);
            apply(&mut next);
            next
        });
    }

    pub fn share_prop(&self, key: String, prop: Prop) {
        self.update(|state| {
            state.props.insert(key.clone(), prop.clone());
        });
    }

    pub fn flush_props(&self) {
        self.update(|state| state.props = Props::new());
    }

    pub fn share_template_data(&self, key: String, value: TemplateValue) {
        self.update(|state| {
            state.template_data.insert(key.clone(), value.clone());
        });
    }

    pub fn flush_template_data(&self) {
        self.update(|state| state.template_data.clear());
    }

    pub fn share_template_func(&self, name: String, func: TemplateFn) {
        self.update(|state| {
            state.template_funcs.insert(name.clone(), func.clone());
        });
    }

    pub fn flush_template_funcs(&self) {
        self.update(|state| state.template_funcs.clear());
    }
}
